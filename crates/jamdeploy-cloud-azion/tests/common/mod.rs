use async_trait::async_trait;
use jamdeploy_cloud::{ConfigStore, DEFAULT_CONFIG_PATH};
use jamdeploy_cloud_azion::{
    ApplicationModules, AzionError, Domain, EdgeApi, EdgeApplication, EdgeFunction,
    FunctionInstance, FunctionUpdate, InstanceUpdate, NewDomain, NewFunction, NewInstance,
    PublishInput, PurgeKind, RequestRule, Result, Toolchain,
};
use serde_json::json;
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::sync::Mutex;
use tempfile::TempDir;

pub struct TestProject {
    pub root: TempDir,
}

#[allow(dead_code)]
impl TestProject {
    /// Project with a built worker and an args file
    pub fn new() -> Self {
        let root = tempfile::tempdir().unwrap();
        let edge = root.path().join(".edge");
        fs::create_dir_all(&edge).unwrap();
        fs::write(edge.join("worker.js"), "addEventListener('fetch', () => {})").unwrap();
        fs::write(root.path().join("args.json"), r#"{"greeting":"hello"}"#).unwrap();
        Self { root }
    }

    pub fn path(&self) -> &Path {
        self.root.path()
    }

    pub fn write_config(&self, content: &str) {
        let path = self.path().join(DEFAULT_CONFIG_PATH);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    pub fn read_config(&self) -> serde_json::Value {
        let content = fs::read_to_string(self.path().join(DEFAULT_CONFIG_PATH)).unwrap();
        serde_json::from_str(&content).unwrap()
    }

    pub fn write_metadata(&self, content: &str) {
        fs::write(self.path().join(".edge/.env"), content).unwrap();
    }

    pub fn create_static_folder(&self) {
        let storage = self.path().join(".edge/storage");
        fs::create_dir_all(&storage).unwrap();
        fs::write(storage.join("index.html"), "<h1>hi</h1>").unwrap();
    }

    pub fn store(&self) -> ConfigStore {
        ConfigStore::new(self.path(), DEFAULT_CONFIG_PATH)
    }

    pub fn input(&self) -> PublishInput {
        let root = self.path();
        PublishInput {
            function_path: root.join(".edge/worker.js"),
            function_args_path: root.join("args.json"),
            version_build_path: root.join(".edge/.env"),
            static_folder: root.join(".edge/storage"),
            application_name: "my-site".to_string(),
            build_preset: "vue".to_string(),
            build_mode: "deliver".to_string(),
            environment: "production".to_string(),
        }
    }
}

fn upstream(op: &str) -> AzionError {
    AzionError::Upstream {
        message: format!("{} failed - injected", op),
        status: Some(500),
        body: String::new(),
    }
}

/// In-memory [`EdgeApi`] recording each call by name
#[derive(Default)]
pub struct FakeApi {
    calls: Mutex<Vec<String>>,
    failing: HashSet<&'static str>,
    pub instances: Vec<FunctionInstance>,
    pub rules: Option<Vec<RequestRule>>,
    pub patched_rule: Mutex<Option<RequestRule>>,
    pub created_function: Mutex<Option<NewFunction>>,
    pub updated_instance: Mutex<Option<InstanceUpdate>>,
    pub patched_modules: Mutex<Option<ApplicationModules>>,
    pub purged: Mutex<Vec<(PurgeKind, Vec<String>)>>,
}

#[allow(dead_code)]
impl FakeApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the named operation return an upstream error
    pub fn failing(mut self, op: &'static str) -> Self {
        self.failing.insert(op);
        self
    }

    pub fn with_instances(mut self, instances: Vec<FunctionInstance>) -> Self {
        self.instances = instances;
        self
    }

    pub fn with_rules(mut self, rules: Vec<RequestRule>) -> Self {
        self.rules = Some(rules);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, op: &str) -> usize {
        self.calls().iter().filter(|c| c.as_str() == op).count()
    }

    fn record(&self, op: &'static str) -> Result<()> {
        self.calls.lock().unwrap().push(op.to_string());
        if self.failing.contains(op) {
            return Err(upstream(op));
        }
        Ok(())
    }
}

#[async_trait]
impl EdgeApi for FakeApi {
    async fn create_application(&self, name: &str) -> Result<EdgeApplication> {
        self.record("create_application")?;
        Ok(EdgeApplication {
            id: 101,
            name: name.to_string(),
        })
    }

    async fn patch_application(
        &self,
        _application_id: u64,
        modules: &ApplicationModules,
    ) -> Result<()> {
        *self.patched_modules.lock().unwrap() = Some(modules.clone());
        self.record("patch_application")
    }

    async fn delete_application(&self, _application_id: u64) -> Result<()> {
        self.record("delete_application")
    }

    async fn create_function(&self, function: &NewFunction) -> Result<EdgeFunction> {
        self.record("create_function")?;
        *self.created_function.lock().unwrap() = Some(function.clone());
        Ok(EdgeFunction {
            id: 202,
            name: function.name.clone(),
        })
    }

    async fn patch_function(&self, _function_id: u64, _update: &FunctionUpdate) -> Result<()> {
        self.record("patch_function")
    }

    async fn create_instance(
        &self,
        _application_id: u64,
        instance: &NewInstance,
    ) -> Result<FunctionInstance> {
        self.record("create_instance")?;
        Ok(FunctionInstance {
            id: 303,
            name: instance.name.clone(),
            edge_function_id: Some(instance.edge_function_id),
        })
    }

    async fn list_instances(&self, _application_id: u64) -> Result<Vec<FunctionInstance>> {
        self.record("list_instances")?;
        Ok(self.instances.clone())
    }

    async fn patch_instance(
        &self,
        _application_id: u64,
        _instance_id: u64,
        update: &InstanceUpdate,
    ) -> Result<()> {
        self.record("patch_instance")?;
        *self.updated_instance.lock().unwrap() = Some(update.clone());
        Ok(())
    }

    async fn request_rules(&self, _application_id: u64) -> Result<Vec<RequestRule>> {
        self.record("request_rules")?;
        Ok(self.rules.clone().unwrap_or_else(|| {
            vec![RequestRule {
                id: Some(404),
                behaviors: vec![json!({"name": "deliver"})],
                fields: serde_json::from_value(json!({
                    "name": "Default Rule",
                    "phase": "default",
                }))
                .unwrap(),
            }]
        }))
    }

    async fn patch_request_rule(
        &self,
        _application_id: u64,
        _rule_id: u64,
        rule: &RequestRule,
    ) -> Result<()> {
        self.record("patch_request_rule")?;
        *self.patched_rule.lock().unwrap() = Some(rule.clone());
        Ok(())
    }

    async fn create_domain(&self, domain: &NewDomain) -> Result<Domain> {
        self.record("create_domain")?;
        Ok(Domain {
            id: 505,
            name: domain.name.clone(),
            domain_name: "abc123.map.azionedge.net".to_string(),
        })
    }

    async fn purge(&self, kind: PurgeKind, urls: &[String]) -> Result<()> {
        self.purged.lock().unwrap().push((kind, urls.to_vec()));
        self.record("purge")
    }
}

/// [`Toolchain`] counting storage syncs
#[derive(Default)]
pub struct FakeToolchain {
    pub tokens: Mutex<Vec<String>>,
}

#[allow(dead_code)]
impl FakeToolchain {
    pub fn syncs(&self) -> usize {
        self.tokens.lock().unwrap().len()
    }
}

#[async_trait]
impl Toolchain for FakeToolchain {
    async fn sync_storage(&self, token: &str) -> Result<()> {
        self.tokens.lock().unwrap().push(token.to_string());
        Ok(())
    }
}

