//! Local deploy error types

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by the local side of a deploy: files, subprocesses and
/// the stored resource configuration.
#[derive(Error, Debug)]
pub enum CloudError {
    #[error("Command '{command}' failed with code {}", exit_code.map_or_else(|| "signal".to_string(), |c| c.to_string()))]
    ProcessFailed {
        command: String,
        exit_code: Option<i32>,
    },

    #[error("Command '{command}' could not be run: {source}")]
    ProcessError {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("config invalid: {0}")]
    ConfigInvalid(String),

    #[error("failed to read {}: {source}", path.display())]
    FileIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CloudError {
    pub fn file_io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        CloudError::FileIo {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, CloudError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_process_failed_message() {
        let err = CloudError::ProcessFailed {
            command: "yarn build".to_string(),
            exit_code: Some(2),
        };
        assert_eq!(err.to_string(), "Command 'yarn build' failed with code 2");

        let err = CloudError::ProcessFailed {
            command: "yarn".to_string(),
            exit_code: None,
        };
        assert!(err.to_string().ends_with("with code signal"));
    }
}
