//! Publish orchestration
//!
//! Decides between creating a new edge deployment and updating the one
//! recorded in the config store, drives the remote calls in order, syncs
//! static assets and persists the resulting identifiers.
//!
//! Create sequence:
//!
//! 1. create the edge application under a unique name
//! 2. enable the functions (and optionally acceleration) modules
//! 3. create the edge function; if this fails the application is deleted
//! 4. bind the function to the application as a function instance
//! 5. point the default request rule at the instance
//! 6. create a domain for the application
//!
//! Update sequence: patch the function code, then patch the arguments of the
//! instance bound to it, then purge the domain's cached root.

use crate::api::{
    ApplicationModules, EdgeApi, FunctionUpdate, InstanceUpdate, NewDomain, NewFunction,
    NewInstance, PurgeKind,
};
use crate::error::{AzionError, Result};
use crate::metadata::DeployMetadata;
use crate::vulcan::Toolchain;
use jamdeploy_cloud::{
    ApplicationRef, CloudError, ConfigStore, DomainRef, FunctionRef, Reporter, ResourceConfig,
    UndoStack,
};
use rand::Rng;
use serde_json::Value;
use std::path::PathBuf;

const CREATE_STEPS: usize = 6;
const UPDATE_STEPS: usize = 4;

/// Optional edge application modules
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EdgeModules {
    pub acceleration: bool,
}

/// Everything one publish run needs from the built project
#[derive(Debug, Clone)]
pub struct PublishInput {
    /// Built function code, `.edge/worker.js`
    pub function_path: PathBuf,

    /// JSON arguments passed to the function
    pub function_args_path: PathBuf,

    /// Deploy metadata written by the build, `.edge/.env`
    pub version_build_path: PathBuf,

    /// Static assets to upload when present
    pub static_folder: PathBuf,

    /// Display name of the application
    pub application_name: String,

    pub build_preset: String,
    pub build_mode: String,

    /// Environment label stored with newly created deployments
    pub environment: String,
}

/// Create-or-update driver over an [`EdgeApi`] and a [`Toolchain`]
pub struct Publisher<'a, A, T> {
    api: &'a A,
    toolchain: &'a T,
    store: &'a ConfigStore,
    reporter: Reporter,
}

impl<'a, A, T> Publisher<'a, A, T>
where
    A: EdgeApi,
    T: Toolchain,
{
    pub fn new(api: &'a A, toolchain: &'a T, store: &'a ConfigStore, reporter: Reporter) -> Self {
        Self {
            api,
            toolchain,
            store,
            reporter,
        }
    }

    /// Publish the built project and return the persisted configuration
    pub async fn publish_or_update(
        &self,
        token: &str,
        modules: EdgeModules,
        input: &PublishInput,
    ) -> Result<ResourceConfig> {
        let code = read_source(&input.function_path).await?;
        let args = read_args(&input.function_args_path).await?;

        let mut result = match self.store.load().await {
            None => {
                self.reporter
                    .info("no existing deployment, creating a new edge application");
                let create = self.reporter.scope("Create");
                create.pending("create edge application");
                let config = self.create(modules, input, code, args).await?;
                create.success("create edge application");
                config
            }
            Some(existing) => {
                let update = self.reporter.scope("Update");
                update.pending("update edge application");
                let config = self.update(existing, code, args).await?;
                update.success("update edge application");
                self.purge_domain(&config).await;
                config
            }
        };

        if input.static_folder.is_dir() {
            let storage = self.reporter.scope("Storage");
            storage.pending("storage files");
            self.toolchain.sync_storage(token).await?;
            storage.success("storage files");
        }

        let metadata = DeployMetadata::load(&input.version_build_path).await;
        result.version_id = metadata.version_id();
        result.build_preset = Some(input.build_preset.clone());
        result.build_mode = Some(input.build_mode.clone());

        self.reporter.pending("commit config");
        self.store.persist(&result).await?;
        self.reporter.success("commit config");

        Ok(result)
    }

    async fn create(
        &self,
        modules: EdgeModules,
        input: &PublishInput,
        code: String,
        args: Value,
    ) -> Result<ResourceConfig> {
        let reporter = self.reporter.scope("Create");
        let unique_name = unique_name(&input.application_name);

        reporter.pending(&Reporter::step(1, CREATE_STEPS, "create edge application"));
        let application = self.api.create_application(&unique_name).await?;
        let application_modules = ApplicationModules {
            edge_functions: true,
            application_acceleration: modules.acceleration,
        };
        self.api
            .patch_application(application.id, &application_modules)
            .await?;
        reporter.success(&Reporter::step(2, CREATE_STEPS, "edge application"));

        reporter.pending(&Reporter::step(3, CREATE_STEPS, "create edge function"));
        let mut undo = UndoStack::new(reporter.clone());
        let api = self.api;
        let application_id = application.id;
        undo.push(
            format!("delete edge application {}", application_id),
            move || async move { api.delete_application(application_id).await },
        );
        let new_function = NewFunction::javascript(&unique_name, code, args.clone());
        let function = undo.guard(self.api.create_function(&new_function)).await?;
        undo.clear();

        let instance = self
            .api
            .create_instance(
                application.id,
                &NewInstance {
                    name: input.application_name.clone(),
                    edge_function_id: function.id,
                    args,
                },
            )
            .await?;

        let rules = self.api.request_rules(application.id).await?;
        let default_rule = rules
            .into_iter()
            .next()
            .ok_or(AzionError::MissingDefaultRule(application.id))?;
        let rule_id = default_rule
            .id
            .ok_or(AzionError::MissingDefaultRule(application.id))?;
        self.api
            .patch_request_rule(
                application.id,
                rule_id,
                &default_rule.routed_to_function(instance.id),
            )
            .await?;
        reporter.success(&Reporter::step(4, CREATE_STEPS, "create edge function"));

        reporter.pending(&Reporter::step(5, CREATE_STEPS, "create edge domain"));
        let domain = self
            .api
            .create_domain(&NewDomain::for_application(&unique_name, application.id))
            .await?;
        reporter.success(&Reporter::step(6, CREATE_STEPS, "create edge domain"));

        Ok(ResourceConfig {
            name: Some(unique_name),
            env: Some(input.environment.clone()),
            application: ApplicationRef {
                id: Some(application.id),
                name: Some(application.name),
            },
            function: FunctionRef {
                id: Some(function.id),
                name: Some(function.name),
            },
            domain: DomainRef {
                id: Some(domain.id),
                name: Some(domain.name),
                url: Some(domain.domain_name),
            },
            ..Default::default()
        })
    }

    async fn update(
        &self,
        existing: ResourceConfig,
        code: String,
        args: Value,
    ) -> Result<ResourceConfig> {
        let reporter = self.reporter.scope("Update");

        let application_id = existing.application_id().ok_or_else(|| {
            CloudError::ConfigInvalid("application.id is missing in the stored config".to_string())
        })?;
        let function_id = existing.function_id().ok_or_else(|| {
            CloudError::ConfigInvalid("function.id is missing in the stored config".to_string())
        })?;

        reporter.pending(&Reporter::step(1, UPDATE_STEPS, "update edge function"));
        self.api
            .patch_function(
                function_id,
                &FunctionUpdate {
                    code,
                    json_args: args.clone(),
                    active: true,
                },
            )
            .await?;
        reporter.success(&Reporter::step(2, UPDATE_STEPS, "update edge function"));

        reporter.pending(&Reporter::step(3, UPDATE_STEPS, "update edge function args"));
        let instances = self.api.list_instances(application_id).await?;
        match instances
            .iter()
            .find(|i| i.edge_function_id == Some(function_id))
        {
            Some(instance) => {
                let update = InstanceUpdate {
                    edge_function_id: function_id,
                    args,
                };
                if let Err(e) = self
                    .api
                    .patch_instance(application_id, instance.id, &update)
                    .await
                {
                    tracing::warn!(instance_id = instance.id, error = %e, "Instance args not updated");
                    reporter.warn(&Reporter::step(3, UPDATE_STEPS, "problem to update args"));
                }
            }
            None => {
                reporter.warn(&format!(
                    "no function instance bound to function {}, args not updated",
                    function_id
                ));
            }
        }
        reporter.success(&Reporter::step(4, UPDATE_STEPS, "update edge function"));

        Ok(existing)
    }

    /// Purge the domain root; failures are logged only
    async fn purge_domain(&self, config: &ResourceConfig) {
        let Some(url) = config.domain_url() else {
            return;
        };

        let reporter = self.reporter.scope("Update");
        reporter.pending("purge domain");
        let urls = vec![url.to_string(), format!("{}/", url)];
        match self.api.purge(PurgeKind::Url, &urls).await {
            Ok(()) => reporter.success("purge domain"),
            Err(e) => {
                tracing::warn!(url, error = %e, "Purge failed");
                reporter.info("problem to purge domain url");
            }
        }
    }
}

/// `<name>-<6 base36 chars>`
pub fn unique_name(name: &str) -> String {
    format!("{}-{}", name, short_id())
}

/// Six base36 characters, two independently drawn halves
pub fn short_id() -> String {
    let mut rng = rand::thread_rng();
    let first = to_base36(rng.gen_range(0..46656), 3);
    let second = to_base36(rng.gen_range(0..46656), 3);
    format!("{}{}", first, second)
}

fn to_base36(mut value: u32, width: usize) -> String {
    const DIGITS: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    let mut out = Vec::with_capacity(width);
    while value > 0 {
        out.push(DIGITS[(value % 36) as usize]);
        value /= 36;
    }
    while out.len() < width {
        out.push(b'0');
    }
    out.reverse();
    String::from_utf8_lossy(&out).into_owned()
}

async fn read_source(path: &std::path::Path) -> Result<String> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|e| CloudError::file_io(path, e).into())
}

async fn read_args(path: &std::path::Path) -> Result<Value> {
    let content = read_source(path).await?;
    Ok(serde_json::from_str(&content)?)
}
