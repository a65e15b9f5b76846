//! Run settings read from the CI environment
//!
//! Every value comes from an environment variable set by the workflow (the
//! `INPUT_*` action inputs plus the ambient `GITHUB_*` variables). The same
//! values can be passed as long flags for local runs.

use crate::utils::normalize_application_name;
use anyhow::{Context, bail};
use clap::Parser;
use jamdeploy_cloud_azion::{AZION_API_BASE, DEFAULT_ENTRY, VULCAN_COMMAND};
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[command(name = "jamdeploy")]
#[command(version, about = "Build a JAMStack project and publish it to the Azion edge", long_about = None)]
pub struct Settings {
    /// Display name of the edge application (defaults to the repository name)
    #[arg(long, env = "INPUT_APPLICATIONNAME")]
    pub application_name: Option<String>,

    /// Azion personal token
    #[arg(long, env = "INPUT_AZIONPERSONALTOKEN", hide_env_values = true)]
    pub azion_personal_token: String,

    /// JSON arguments file, relative to the workspace [default: args.json]
    #[arg(long, env = "INPUT_FUNCTIONARGSFILEPATH")]
    pub function_args_file_path: Option<String>,

    /// Build preset (vue, next, astro, ...)
    #[arg(long, env = "INPUT_BUILDPRESET")]
    pub build_preset: String,

    /// Build mode [default: deliver]
    #[arg(long, env = "INPUT_BUILDMODE")]
    pub build_mode: Option<String>,

    /// Entry point, used in compute mode only
    #[arg(long, env = "INPUT_BUILDENTRY", default_value = DEFAULT_ENTRY)]
    pub build_entry: String,

    /// Static assets folder, relative to the workspace [default: .edge/storage]
    #[arg(long, env = "INPUT_BUILDSTATICFOLDER")]
    pub build_static_folder: Option<String>,

    /// Enable the application acceleration module
    #[arg(long, env = "INPUT_EDGEMODULEACCELERATION")]
    pub edge_module_acceleration: Option<String>,

    /// Project root (defaults to the current directory)
    #[arg(long, env = "GITHUB_WORKSPACE")]
    pub workspace: Option<String>,

    /// `owner/name` repository slug
    #[arg(long, env = "GITHUB_REPOSITORY")]
    pub repository: Option<String>,

    /// Step output file
    #[arg(long, env = "GITHUB_OUTPUT")]
    pub github_output: Option<String>,

    /// Environment label stored with new deployments [default: production]
    #[arg(long, env = "_ENVIRONMENT")]
    pub environment: Option<String>,

    /// Resource API base URL [default: https://api-origin.azionapi.net]
    #[arg(long, env = "AZION_API_URL")]
    pub api_url: Option<String>,

    /// Build tool invocation [default: npx --yes edge-functions@1.7.0]
    #[arg(long, env = "VULCAN_COMMAND")]
    pub vulcan_command: Option<String>,
}

const DEFAULT_ARGS_FILE: &str = "args.json";
const DEFAULT_BUILD_MODE: &str = "deliver";
const DEFAULT_STATIC_FOLDER: &str = ".edge/storage";
const DEFAULT_ENVIRONMENT: &str = "production";

/// CI exports inputs that were not supplied as empty strings
fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

impl Settings {
    pub fn function_args_file_path(&self) -> PathBuf {
        PathBuf::from(non_empty(&self.function_args_file_path).unwrap_or(DEFAULT_ARGS_FILE))
    }

    pub fn build_mode(&self) -> &str {
        non_empty(&self.build_mode).unwrap_or(DEFAULT_BUILD_MODE)
    }

    pub fn build_static_folder(&self) -> PathBuf {
        PathBuf::from(non_empty(&self.build_static_folder).unwrap_or(DEFAULT_STATIC_FOLDER))
    }

    pub fn environment(&self) -> &str {
        non_empty(&self.environment).unwrap_or(DEFAULT_ENVIRONMENT)
    }

    /// Project root
    pub fn workspace_root(&self) -> anyhow::Result<PathBuf> {
        match non_empty(&self.workspace) {
            Some(path) => Ok(PathBuf::from(path)),
            None => std::env::current_dir().context("Failed to resolve the current directory"),
        }
    }

    /// Step output file, if the runner provides one
    pub fn github_output(&self) -> Option<PathBuf> {
        non_empty(&self.github_output).map(PathBuf::from)
    }

    pub fn api_url(&self) -> &str {
        non_empty(&self.api_url).unwrap_or(AZION_API_BASE)
    }

    pub fn vulcan_command(&self) -> &str {
        non_empty(&self.vulcan_command).unwrap_or(VULCAN_COMMAND)
    }

    /// Normalized application name, falling back to the repository name
    pub fn application_name(&self) -> anyhow::Result<String> {
        let raw = self
            .application_name
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .or_else(|| self.repository_name());

        let Some(raw) = raw else {
            bail!("application name is empty: set INPUT_APPLICATIONNAME or GITHUB_REPOSITORY");
        };

        let name = normalize_application_name(raw)?;
        if name.is_empty() {
            bail!("application name '{}' has no usable characters", raw);
        }
        Ok(name)
    }

    fn repository_name(&self) -> Option<&str> {
        let slug = self.repository.as_deref()?;
        let name = slug.rsplit('/').next().unwrap_or(slug);
        (!name.is_empty()).then_some(name)
    }

    /// Any value other than empty, `false` or `0` turns acceleration on
    pub fn acceleration(&self) -> bool {
        match self.edge_module_acceleration.as_deref().map(str::trim) {
            None | Some("") => false,
            Some(value) => !value.eq_ignore_ascii_case("false") && value != "0",
        }
    }
}
