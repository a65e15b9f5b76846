//! Resource configuration store
//!
//! Manages the `azion/azion.json` file which records the identifiers of the
//! remote resources created by the last successful deploy. The file lives in
//! the project repository and is committed after every run.

use crate::error::{CloudError, Result};
use crate::git::GitRepo;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;

pub const DEFAULT_CONFIG_PATH: &str = "azion/azion.json";

/// Last-known remote resource identifiers plus build provenance
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceConfig {
    /// Unique name generated when the application was created
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Environment label recorded at creation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub env: Option<String>,

    #[serde(default)]
    pub application: ApplicationRef,

    #[serde(default)]
    pub function: FunctionRef,

    #[serde(default)]
    pub domain: DomainRef,

    #[serde(rename = "version-id", default, skip_serializing_if = "Option::is_none")]
    pub version_id: Option<String>,

    /// Build preset
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub build_preset: Option<String>,

    /// Build mode
    #[serde(rename = "mode", default, skip_serializing_if = "Option::is_none")]
    pub build_mode: Option<String>,

    /// Keys written by other tools are kept as-is
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApplicationRef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FunctionRef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DomainRef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl ResourceConfig {
    /// Application id, treating `0` as absent
    pub fn application_id(&self) -> Option<u64> {
        self.application.id.filter(|id| *id != 0)
    }

    /// Function id, treating `0` as absent
    pub fn function_id(&self) -> Option<u64> {
        self.function.id.filter(|id| *id != 0)
    }

    /// Whether this config points at an already deployed application
    pub fn is_deployed(&self) -> bool {
        self.application_id().is_some()
    }

    /// Domain URL, if one was recorded
    pub fn domain_url(&self) -> Option<&str> {
        self.domain.url.as_deref().filter(|u| !u.is_empty())
    }
}

/// Reads and writes the resource configuration file
pub struct ConfigStore {
    /// Project root directory
    project_root: PathBuf,

    /// Config path relative to the project root
    relative_path: PathBuf,

    /// Commits the file after writing when set
    git: Option<GitRepo>,
}

impl ConfigStore {
    pub fn new(project_root: impl AsRef<Path>, relative_path: impl AsRef<Path>) -> Self {
        Self {
            project_root: project_root.as_ref().to_path_buf(),
            relative_path: relative_path.as_ref().to_path_buf(),
            git: None,
        }
    }

    /// Commit and push the config file after each save
    pub fn with_git(mut self, git: GitRepo) -> Self {
        self.git = Some(git);
        self
    }

    /// Absolute path of the config file
    pub fn path(&self) -> PathBuf {
        self.project_root.join(&self.relative_path)
    }

    pub fn relative_path(&self) -> &Path {
        &self.relative_path
    }

    /// Load the config as written, failing on missing or malformed files
    pub async fn read(&self) -> Result<ResourceConfig> {
        let content = fs::read_to_string(self.path()).await?;
        let config: ResourceConfig = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Load the config of an existing deployment
    ///
    /// A missing file, a file that does not parse, or an application id that
    /// is absent or `0` all mean "nothing deployed yet" and yield `None`.
    pub async fn load(&self) -> Option<ResourceConfig> {
        let path = self.path();
        match self.read().await {
            Ok(config) if config.is_deployed() => {
                tracing::debug!(
                    application_id = ?config.application.id,
                    "Loaded existing deployment config"
                );
                Some(config)
            }
            Ok(_) => {
                tracing::debug!("Config has no application id");
                None
            }
            Err(CloudError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "Config file not found");
                None
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Ignoring unreadable config");
                None
            }
        }
    }

    /// Write the config, creating its directory when needed
    pub async fn save(&self, config: &ResourceConfig) -> Result<()> {
        let path = self.path();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let content = serde_json::to_string_pretty(config)?;
        fs::write(&path, content).await?;

        tracing::debug!(path = %path.display(), "Saved config");
        Ok(())
    }

    /// Write the config and commit it when a repository is attached
    pub async fn persist(&self, config: &ResourceConfig) -> Result<()> {
        self.save(config).await?;
        if let Some(git) = &self.git {
            git.commit_file(&self.relative_path, "[bot] Automated Config")
                .await?;
        }
        Ok(())
    }
}
