//! Azion provider error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AzionError {
    /// Non-2xx response or transport failure from the resource API
    #[error("{message}")]
    Upstream {
        message: String,
        status: Option<u16>,
        body: String,
    },

    #[error("edge application {0} has no default request rule")]
    MissingDefaultRule(u64),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Cloud(#[from] jamdeploy_cloud::CloudError),
}

impl AzionError {
    /// HTTP status of an upstream failure, if a response was received
    pub fn status(&self) -> Option<u16> {
        match self {
            AzionError::Upstream { status, .. } => *status,
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, AzionError>;
