//! Deploy metadata written by the build step
//!
//! The build tool leaves a `.edge/.env` file with `KEY=VALUE` lines; the
//! `VERSION_ID` entry identifies the built artifact.

use std::collections::HashMap;
use std::path::Path;

const VERSION_ID: &str = "VERSION_ID";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeployMetadata {
    pub variables: HashMap<String, String>,
}

impl DeployMetadata {
    /// Parse a dotenv file; a missing or unreadable file yields no variables
    pub async fn load(path: &Path) -> Self {
        match tokio::fs::read_to_string(path).await {
            Ok(content) => Self::parse(&content),
            Err(e) => {
                tracing::debug!(path = %path.display(), error = %e, "No deploy metadata");
                Self::default()
            }
        }
    }

    pub fn parse(content: &str) -> Self {
        let mut variables = HashMap::new();
        for line in content.lines() {
            let line = line.trim();

            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            if let Some((key, value)) = line.split_once('=') {
                let key = key.trim().trim_start_matches("export ").trim();
                variables.insert(key.to_string(), strip_quotes(value.trim()).to_string());
            }
        }
        Self { variables }
    }

    pub fn version_id(&self) -> Option<String> {
        self.variables
            .get(VERSION_ID)
            .filter(|v| !v.is_empty())
            .cloned()
    }
}

fn strip_quotes(value: &str) -> &str {
    for quote in ['"', '\''] {
        if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
            return &value[1..value.len() - 1];
        }
    }
    value
}
