//! Subprocess runner
//!
//! Runs a command line through `sh -c` in a fixed working directory and
//! streams its output to the reporter while it runs. Tools such as the edge
//! build CLI print ordinary progress on stderr, so only stderr lines that
//! contain `error:` are echoed.

use crate::error::{CloudError, Result};
use crate::reporter::Reporter;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;

const MASK: &str = "***";

/// Shell command runner bound to a working directory
#[derive(Debug, Clone)]
pub struct ProcessRunner {
    working_dir: PathBuf,
    envs: Vec<(String, String)>,
    reporter: Reporter,
}

impl ProcessRunner {
    pub fn new(working_dir: impl AsRef<Path>, reporter: Reporter) -> Self {
        Self {
            working_dir: working_dir.as_ref().to_path_buf(),
            envs: Vec::new(),
            reporter,
        }
    }

    /// Add an environment override applied to every command
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.envs.push((key.into(), value.into()));
        self
    }

    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    /// Run a command line and return the last line it printed
    pub async fn run(&self, command_line: &str) -> Result<String> {
        self.run_masked(command_line, &[]).await
    }

    /// Like [`run`](Self::run), but every occurrence of `secrets` is replaced
    /// in logs and error messages
    pub async fn run_masked(&self, command_line: &str, secrets: &[&str]) -> Result<String> {
        let shown = mask(command_line, secrets);

        let program = command_line.split_whitespace().next().ok_or_else(|| {
            CloudError::ProcessError {
                command: shown.clone(),
                source: std::io::Error::new(std::io::ErrorKind::InvalidInput, "empty command"),
            }
        })?;

        tracing::debug!(
            cwd = %self.working_dir.display(),
            program,
            command = %shown,
            "Running command"
        );

        let mut cmd = Command::new("sh");
        cmd.arg("-c")
            .arg(command_line)
            .current_dir(&self.working_dir)
            .envs(self.envs.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let mut child = cmd.spawn().map_err(|source| CloudError::ProcessError {
            command: shown.clone(),
            source,
        })?;

        let stdout = child.stdout.take().ok_or_else(|| pipe_error(&shown, "stdout"))?;
        let stderr = child.stderr.take().ok_or_else(|| pipe_error(&shown, "stderr"))?;
        let mut stdout = BufReader::new(stdout).lines();
        let mut stderr = BufReader::new(stderr).lines();

        let mut last = String::new();
        let mut stdout_open = true;
        let mut stderr_open = true;

        while stdout_open || stderr_open {
            tokio::select! {
                line = stdout.next_line(), if stdout_open => {
                    match line.map_err(|source| stream_error(&shown, source))? {
                        Some(line) => {
                            let line = mask(&line, secrets);
                            if !line.trim().is_empty() {
                                self.reporter.info(line.trim());
                                last = line;
                            }
                        }
                        None => stdout_open = false,
                    }
                }
                line = stderr.next_line(), if stderr_open => {
                    match line.map_err(|source| stream_error(&shown, source))? {
                        Some(line) => {
                            let line = mask(&line, secrets);
                            if line.to_lowercase().contains("error:") {
                                self.reporter.info(&line);
                            }
                            if !line.trim().is_empty() {
                                last = line;
                            }
                        }
                        None => stderr_open = false,
                    }
                }
            }
        }

        let status = child
            .wait()
            .await
            .map_err(|source| stream_error(&shown, source))?;

        if !status.success() {
            tracing::debug!(command = %shown, code = ?status.code(), "Command failed");
            return Err(CloudError::ProcessFailed {
                command: shown,
                exit_code: status.code(),
            });
        }

        Ok(last)
    }
}

fn mask(text: &str, secrets: &[&str]) -> String {
    secrets
        .iter()
        .filter(|s| !s.is_empty())
        .fold(text.to_string(), |acc, secret| acc.replace(secret, MASK))
}

fn pipe_error(command: &str, stream: &str) -> CloudError {
    CloudError::ProcessError {
        command: command.to_string(),
        source: std::io::Error::other(format!("{} was not captured", stream)),
    }
}

fn stream_error(command: &str, source: std::io::Error) -> CloudError {
    CloudError::ProcessError {
        command: command.to_string(),
        source,
    }
}
