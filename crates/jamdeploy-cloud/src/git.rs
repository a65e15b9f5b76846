//! git commit automation for files produced by a deploy

use crate::error::Result;
use crate::process::ProcessRunner;
use std::path::Path;

const BOT_NAME: &str = "github-actions";
const BOT_EMAIL: &str = "noreply@github.com";

/// Repository in which deploy artifacts are committed and pushed
#[derive(Debug, Clone)]
pub struct GitRepo {
    runner: ProcessRunner,
}

impl GitRepo {
    pub fn new(runner: ProcessRunner) -> Self {
        Self { runner }
    }

    /// Commands that stage, commit and push `file`
    ///
    /// Commit and push are allowed to fail so that an unchanged file or a
    /// read-only checkout does not fail the run.
    pub fn commit_commands(&self, file: &Path, message: &str) -> Vec<String> {
        let root = self.runner.working_dir().display().to_string();
        let file = file.display().to_string();
        vec![
            format!("git config --global --add safe.directory {}", shell_escape(&root)),
            format!("git config user.name \"{}\"", BOT_NAME),
            format!("git config user.email \"{}\"", BOT_EMAIL),
            format!("git add {}", shell_escape(&file)),
            format!(
                "git commit -m {} || echo 'no changes commit'",
                shell_escape(message)
            ),
            "git push || echo 'no changes to push'".to_string(),
        ]
    }

    /// Stage, commit and push a single file
    pub async fn commit_file(&self, file: &Path, message: &str) -> Result<()> {
        for command in self.commit_commands(file, message) {
            self.runner.run(&command).await?;
        }
        tracing::debug!(file = %file.display(), "Committed file");
        Ok(())
    }
}

/// Quote for `sh`
pub fn shell_escape(s: &str) -> String {
    format!("'{}'", s.replace('\'', "'\\''"))
}
