use anyhow::Context;
use jamdeploy_cloud::{Reporter, ResourceConfig};
use regex::Regex;
use serde_json::Value;
use std::path::Path;
use tokio::io::AsyncWriteExt;
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

/// Accents folded, other special characters and whitespace runs become `-`
pub fn normalize_application_name(name: &str) -> anyhow::Result<String> {
    let special = Regex::new(r"[^A-Za-z0-9_\s]").context("Failed to compile name pattern")?;
    let whitespace = Regex::new(r"\s+").context("Failed to compile name pattern")?;

    let folded: String = name.nfd().filter(|c| !is_combining_mark(*c)).collect();
    let spaced = special.replace_all(&folded, " ");
    let dashed = whitespace.replace_all(&spaced, "-");
    let dashed = dashed.strip_prefix('-').unwrap_or(&dashed);
    Ok(dashed.strip_suffix('-').unwrap_or(dashed).to_string())
}

/// Read the function arguments and write them back pretty-printed
///
/// An unreadable file is replaced by `{}`; invalid JSON is an error.
pub async fn prepare_function_args(path: &Path, reporter: &Reporter) -> anyhow::Result<Value> {
    let args = match tokio::fs::read_to_string(path).await {
        Ok(content) => serde_json::from_str(&content)
            .with_context(|| format!("Invalid JSON in args file: {}", path.display()))?,
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "Args file not readable");
            reporter.info("args file not found, using {}");
            Value::Object(Default::default())
        }
    };

    let content = serde_json::to_string_pretty(&args)?;
    tokio::fs::write(path, content)
        .await
        .with_context(|| format!("Failed to write args file: {}", path.display()))?;

    Ok(args)
}

/// Print the deployed resource summary
pub fn print_deploy_info(reporter: &Reporter, config: &ResourceConfig) {
    let show = |value: Option<String>| value.unwrap_or_else(|| "-".to_string());

    reporter.text("");
    reporter.text("DEPLOY INFO");
    reporter.text(&format!("Name: {}", show(config.application.name.clone())));
    if let Some(url) = config.domain_url() {
        reporter.deployed(&format!("Domain: https://{}", url));
    }
    reporter.text(&format!("Domain ID: {}", show(config.domain.id.map(|id| id.to_string()))));
    reporter.text(&format!(
        "Edge Application ID: {}",
        show(config.application.id.map(|id| id.to_string()))
    ));
    reporter.text(&format!("Function ID: {}", show(config.function.id.map(|id| id.to_string()))));
    if let Some(version_id) = &config.version_id {
        reporter.text(&format!("Version ID: {}", version_id));
    }
}

/// `key=value` lines appended to the step output file
pub fn github_output_lines(config: &ResourceConfig) -> String {
    let application_id = config
        .application
        .id
        .map(|id| id.to_string())
        .unwrap_or_default();
    let domain_url = config.domain_url().unwrap_or_default();
    format!("applicationId={}\ndomainUrl={}\n", application_id, domain_url)
}

/// Append the deploy outputs to `$GITHUB_OUTPUT`
pub async fn write_github_output(path: &Path, config: &ResourceConfig) -> anyhow::Result<()> {
    let mut file = tokio::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .await
        .with_context(|| format!("Failed to open step output: {}", path.display()))?;
    file.write_all(github_output_lines(config).as_bytes()).await?;
    file.flush().await?;
    Ok(())
}
