mod settings;
mod utils;

use clap::Parser;
use clap::error::ErrorKind;
use colored::Colorize;
use jamdeploy_cloud::{ConfigStore, DEFAULT_CONFIG_PATH, GitRepo, ProcessRunner, Reporter};
use jamdeploy_cloud_azion::{
    Auth, AzionApi, EdgeModules, HttpClient, PublishInput, Publisher, Vulcan,
};
use settings::Settings;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    // 進捗はstdout、ログはstderr
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let settings = match Settings::try_parse() {
        Ok(settings) => settings,
        Err(e) => match e.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => e.exit(),
            _ => {
                let _ = e.print();
                std::process::exit(1);
            }
        },
    };

    let reporter = Reporter::new("JAMStack");
    if let Err(e) = run(settings, &reporter).await {
        reporter.error(&format!("{:#}", e));
        std::process::exit(1);
    }
}

async fn run(settings: Settings, reporter: &Reporter) -> anyhow::Result<()> {
    let root = settings.workspace_root()?;
    let application_name = settings.application_name()?;

    reporter.title("Azion Edge Deploy");
    let init = reporter.scope("Init");
    init.info(&format!("application: {}", application_name.cyan()));
    init.info(&format!("workspace: {}", root.display()));

    // Build
    let build = reporter.scope("Build");
    if !root.join("node_modules").exists() {
        build.pending("install dependencies");
        ProcessRunner::new(&root, build.clone()).run("yarn").await?;
        build.success("install dependencies");
    }

    let vulcan = Vulcan::with_command(&root, build.clone(), settings.vulcan_command());
    let build_mode = settings.build_mode();
    build.pending(&format!(
        "build preset {} mode {}",
        settings.build_preset, build_mode
    ));
    vulcan
        .build(
            &settings.build_preset,
            build_mode,
            Some(settings.build_entry.as_str()),
        )
        .await?;
    build.success("build");

    // Deploy
    let deploy = reporter.scope("Deploy");
    let args_path = root.join(settings.function_args_file_path());
    utils::prepare_function_args(&args_path, &deploy).await?;

    let api = AzionApi::new(HttpClient::new(
        settings.api_url(),
        Auth::Token(settings.azion_personal_token.clone()),
    ));
    let git = GitRepo::new(ProcessRunner::new(&root, deploy.scope("Git")));
    let store = ConfigStore::new(&root, DEFAULT_CONFIG_PATH).with_git(git);

    let input = PublishInput {
        function_path: root.join(".edge/worker.js"),
        function_args_path: args_path,
        version_build_path: root.join(".edge/.env"),
        static_folder: root.join(settings.build_static_folder()),
        application_name,
        build_preset: settings.build_preset.clone(),
        build_mode: build_mode.to_string(),
        environment: settings.environment().to_string(),
    };
    let modules = EdgeModules {
        acceleration: settings.acceleration(),
    };

    let publisher = Publisher::new(&api, &vulcan, &store, deploy.clone());
    let config = publisher
        .publish_or_update(&settings.azion_personal_token, modules, &input)
        .await?;

    utils::print_deploy_info(&deploy, &config);
    if let Some(output) = settings.github_output() {
        utils::write_github_output(&output, &config).await?;
    }

    reporter.complete("deploy finished");
    Ok(())
}
