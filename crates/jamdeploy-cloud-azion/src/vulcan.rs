//! Edge build tool wrapper
//!
//! Wraps the `edge-functions` CLI (Vulcan), invoked through `npx`, which
//! builds the project into `.edge/` and syncs static assets to edge storage.

use crate::error::Result;
use async_trait::async_trait;
use jamdeploy_cloud::{ProcessRunner, Reporter};
use std::path::Path;

pub const VULCAN_COMMAND: &str = "npx --yes edge-functions@1.7.0";
pub const DEFAULT_ENTRY: &str = "./main.js";

/// Build mode that takes an explicit entry point
const COMPUTE_MODE: &str = "compute";

/// Static asset upload used by the publisher
#[async_trait]
pub trait Toolchain: Send + Sync {
    /// Authenticate the tool and upload the static folder
    async fn sync_storage(&self, token: &str) -> Result<()>;
}

/// Vulcan CLI wrapper
pub struct Vulcan {
    command: String,
    runner: ProcessRunner,
    storage_runner: ProcessRunner,
}

impl Vulcan {
    pub fn new(project_root: impl AsRef<Path>, reporter: Reporter) -> Self {
        Self::with_command(project_root, reporter, VULCAN_COMMAND)
    }

    pub fn with_command(
        project_root: impl AsRef<Path>,
        reporter: Reporter,
        command: impl Into<String>,
    ) -> Self {
        let runner = ProcessRunner::new(project_root, reporter);
        let storage_runner = runner
            .clone()
            .env("AZION_ENV", "production")
            .env("DEBUG", "true");
        Self {
            command: command.into(),
            runner,
            storage_runner,
        }
    }

    /// `build --preset <p> --mode <m> [--entry <e>]`
    ///
    /// The entry is only passed in compute mode, defaulting to `./main.js`.
    pub fn build_command(&self, preset: &str, mode: &str, entry: Option<&str>) -> String {
        let mut command = format!("{} build --preset {} --mode {}", self.command, preset, mode);
        if mode == COMPUTE_MODE {
            let entry = entry.filter(|e| !e.is_empty()).unwrap_or(DEFAULT_ENTRY);
            command.push_str(&format!(" --entry {}", entry));
        }
        command
    }

    /// Build the project into `.edge/`
    pub async fn build(&self, preset: &str, mode: &str, entry: Option<&str>) -> Result<String> {
        let command = self.build_command(preset, mode, entry);
        Ok(self.runner.run(&command).await?)
    }

    /// Store the personal token for later tool invocations
    pub async fn auth(&self, token: &str) -> Result<()> {
        let command = format!("{} auth --token {}", self.command, token);
        self.storage_runner.run_masked(&command, &[token]).await?;
        Ok(())
    }

    /// Upload the static folder to edge storage
    pub async fn storage_sync(&self) -> Result<()> {
        let command = format!("{} storage sync", self.command);
        self.storage_runner.run(&command).await?;
        Ok(())
    }
}

#[async_trait]
impl Toolchain for Vulcan {
    async fn sync_storage(&self, token: &str) -> Result<()> {
        self.auth(token).await?;
        self.storage_sync().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_build_command() {
        let vulcan = Vulcan::new("/work", Reporter::default());

        assert_eq!(
            vulcan.build_command("next", "deliver", Some("./ignored.js")),
            "npx --yes edge-functions@1.7.0 build --preset next --mode deliver"
        );
        assert_eq!(
            vulcan.build_command("javascript", "compute", None),
            "npx --yes edge-functions@1.7.0 build --preset javascript --mode compute --entry ./main.js"
        );
        assert_eq!(
            vulcan.build_command("javascript", "compute", Some("./src/index.js")),
            "npx --yes edge-functions@1.7.0 build --preset javascript --mode compute --entry ./src/index.js"
        );
    }

    #[tokio::test]
    async fn test_storage_commands_get_env_overrides() {
        let temp_dir = tempdir().unwrap();
        // 実CLIの代わりに環境変数を書き出すコマンドを使う
        let vulcan = Vulcan::with_command(
            temp_dir.path(),
            Reporter::default(),
            "echo \"$AZION_ENV $DEBUG\" > env.txt; echo",
        );

        vulcan.storage_sync().await.unwrap();
        let written = std::fs::read_to_string(temp_dir.path().join("env.txt")).unwrap();
        assert_eq!(written.trim(), "production true");
    }

    #[tokio::test]
    async fn test_failed_auth_masks_token() {
        let temp_dir = tempdir().unwrap();
        let vulcan = Vulcan::with_command(temp_dir.path(), Reporter::default(), "false");

        let err = vulcan.auth("tok-123").await.unwrap_err();
        let message = err.to_string();
        assert!(message.contains("false auth --token ***"));
        assert!(!message.contains("tok-123"));
    }
}
