//! Azion resource client
//!
//! Typed operations over [`HttpClient`], one request per call. `PATCH` and
//! `DELETE` calls can be repeated safely; the `POST` create calls cannot, a
//! repeated create makes a second resource.

use crate::error::Result;
use crate::http::HttpClient;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

/// Remote operations used by the publisher
#[async_trait]
pub trait EdgeApi: Send + Sync {
    async fn create_application(&self, name: &str) -> Result<EdgeApplication>;

    async fn patch_application(
        &self,
        application_id: u64,
        modules: &ApplicationModules,
    ) -> Result<()>;

    async fn delete_application(&self, application_id: u64) -> Result<()>;

    async fn create_function(&self, function: &NewFunction) -> Result<EdgeFunction>;

    async fn patch_function(&self, function_id: u64, update: &FunctionUpdate) -> Result<()>;

    async fn create_instance(
        &self,
        application_id: u64,
        instance: &NewInstance,
    ) -> Result<FunctionInstance>;

    async fn list_instances(&self, application_id: u64) -> Result<Vec<FunctionInstance>>;

    async fn patch_instance(
        &self,
        application_id: u64,
        instance_id: u64,
        update: &InstanceUpdate,
    ) -> Result<()>;

    /// Rules of the application's request phase, default rule first
    async fn request_rules(&self, application_id: u64) -> Result<Vec<RequestRule>>;

    async fn patch_request_rule(
        &self,
        application_id: u64,
        rule_id: u64,
        rule: &RequestRule,
    ) -> Result<()>;

    async fn create_domain(&self, domain: &NewDomain) -> Result<Domain>;

    async fn purge(&self, kind: PurgeKind, urls: &[String]) -> Result<()>;
}

/// [`EdgeApi`] over the Azion REST API
pub struct AzionApi {
    http: HttpClient,
}

impl AzionApi {
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }

    fn decode<T: DeserializeOwned>(results: Value) -> Result<T> {
        Ok(serde_json::from_value(results)?)
    }
}

#[async_trait]
impl EdgeApi for AzionApi {
    async fn create_application(&self, name: &str) -> Result<EdgeApplication> {
        let body = serde_json::to_value(NewApplication::with_defaults(name))?;
        let response = self.http.post("/edge_applications", &body).await?;
        Self::decode(response.results)
    }

    async fn patch_application(
        &self,
        application_id: u64,
        modules: &ApplicationModules,
    ) -> Result<()> {
        let body = serde_json::to_value(modules)?;
        self.http
            .patch(&format!("/edge_applications/{}", application_id), &body)
            .await?;
        Ok(())
    }

    async fn delete_application(&self, application_id: u64) -> Result<()> {
        self.http
            .delete(&format!("/edge_applications/{}", application_id))
            .await?;
        Ok(())
    }

    async fn create_function(&self, function: &NewFunction) -> Result<EdgeFunction> {
        let body = serde_json::to_value(function)?;
        let response = self.http.post("/edge_functions", &body).await?;
        Self::decode(response.results)
    }

    async fn patch_function(&self, function_id: u64, update: &FunctionUpdate) -> Result<()> {
        let body = serde_json::to_value(update)?;
        self.http
            .patch(&format!("/edge_functions/{}", function_id), &body)
            .await?;
        Ok(())
    }

    async fn create_instance(
        &self,
        application_id: u64,
        instance: &NewInstance,
    ) -> Result<FunctionInstance> {
        let body = serde_json::to_value(instance)?;
        let response = self
            .http
            .post(
                &format!("/edge_applications/{}/functions_instances", application_id),
                &body,
            )
            .await?;
        Self::decode(response.results)
    }

    async fn list_instances(&self, application_id: u64) -> Result<Vec<FunctionInstance>> {
        let response = self
            .http
            .get(&format!(
                "/edge_applications/{}/functions_instances",
                application_id
            ))
            .await?;
        Self::decode(response.results)
    }

    async fn patch_instance(
        &self,
        application_id: u64,
        instance_id: u64,
        update: &InstanceUpdate,
    ) -> Result<()> {
        let body = serde_json::to_value(update)?;
        self.http
            .patch(
                &format!(
                    "/edge_applications/{}/functions_instances/{}",
                    application_id, instance_id
                ),
                &body,
            )
            .await?;
        Ok(())
    }

    async fn request_rules(&self, application_id: u64) -> Result<Vec<RequestRule>> {
        let response = self
            .http
            .get(&format!(
                "/edge_applications/{}/rules_engine/request/rules",
                application_id
            ))
            .await?;
        Self::decode(response.results)
    }

    async fn patch_request_rule(
        &self,
        application_id: u64,
        rule_id: u64,
        rule: &RequestRule,
    ) -> Result<()> {
        let body = serde_json::to_value(rule)?;
        self.http
            .patch(
                &format!(
                    "/edge_applications/{}/rules_engine/request/rules/{}",
                    application_id, rule_id
                ),
                &body,
            )
            .await?;
        Ok(())
    }

    async fn create_domain(&self, domain: &NewDomain) -> Result<Domain> {
        let body = serde_json::to_value(domain)?;
        let response = self.http.post("/domains", &body).await?;
        Self::decode(response.results)
    }

    async fn purge(&self, kind: PurgeKind, urls: &[String]) -> Result<()> {
        let body = json!({
            "urls": urls,
            "method": "delete",
            "layer": "edge_caching",
        });
        self.http
            .post(&format!("/purge/{}", kind.as_str()), &body)
            .await?;
        Ok(())
    }
}

// ============ Request Types ============

/// Body of `POST /edge_applications`
#[derive(Debug, Clone, Serialize)]
pub struct NewApplication {
    pub name: String,
    pub delivery_protocol: String,
    pub host_header: String,
    pub browser_cache_settings: String,
    pub cdn_cache_settings: String,
    pub cdn_cache_settings_maximum_ttl: u32,
}

impl NewApplication {
    /// HTTP+HTTPS delivery honoring browser and CDN cache, CDN max TTL 60s
    pub fn with_defaults(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            delivery_protocol: "http,https".to_string(),
            host_header: "host".to_string(),
            browser_cache_settings: "honor".to_string(),
            cdn_cache_settings: "honor".to_string(),
            cdn_cache_settings_maximum_ttl: 60,
        }
    }
}

/// Capability flags of an edge application
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApplicationModules {
    pub edge_functions: bool,
    pub application_acceleration: bool,
}

/// Body of `POST /edge_functions`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewFunction {
    pub name: String,
    pub code: String,
    pub language: String,
    pub initiator_type: String,
    pub json_args: Value,
    pub active: bool,
}

impl NewFunction {
    pub fn javascript(name: impl Into<String>, code: impl Into<String>, args: Value) -> Self {
        Self {
            name: name.into(),
            code: code.into(),
            language: "javascript".to_string(),
            initiator_type: "edge_application".to_string(),
            json_args: args,
            active: true,
        }
    }
}

/// Body of `PATCH /edge_functions/{id}`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FunctionUpdate {
    pub code: String,
    pub json_args: Value,
    pub active: bool,
}

/// Body of `POST /edge_applications/{id}/functions_instances`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewInstance {
    pub name: String,
    pub edge_function_id: u64,
    pub args: Value,
}

/// Body of `PATCH .../functions_instances/{instance_id}`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InstanceUpdate {
    pub edge_function_id: u64,
    pub args: Value,
}

/// Body of `POST /domains`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewDomain {
    pub name: String,
    pub cnames: Vec<String>,
    pub cname_access_only: bool,
    pub digital_certificate_id: Option<u64>,
    pub edge_application_id: u64,
    pub is_active: bool,
}

impl NewDomain {
    pub fn for_application(name: impl Into<String>, edge_application_id: u64) -> Self {
        Self {
            name: name.into(),
            cnames: Vec::new(),
            cname_access_only: false,
            digital_certificate_id: None,
            edge_application_id,
            is_active: true,
        }
    }
}

/// Purge target type, the `{type}` in `/purge/{type}`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PurgeKind {
    Url,
    CacheKey,
    Wildcard,
}

impl PurgeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PurgeKind::Url => "url",
            PurgeKind::CacheKey => "cachekey",
            PurgeKind::Wildcard => "wildcard",
        }
    }
}

// ============ Response Types ============

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EdgeApplication {
    pub id: u64,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EdgeFunction {
    pub id: u64,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FunctionInstance {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub edge_function_id: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Domain {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    /// Generated hostname, e.g. `xxxx.map.azionedge.net`
    #[serde(default)]
    pub domain_name: String,
}

/// Request-phase rule of the rules engine
///
/// Only `id` and `behaviors` are interpreted; every other field is sent back
/// unchanged when the rule is patched.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RequestRule {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    #[serde(default)]
    pub behaviors: Vec<Value>,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl RequestRule {
    /// Copy of this rule without its id, dispatching all matched traffic to
    /// `instance_id`
    pub fn routed_to_function(&self, instance_id: u64) -> Self {
        Self {
            id: None,
            behaviors: vec![json!({
                "name": "run_function",
                "target": instance_id,
            })],
            fields: self.fields.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_application_body() {
        let body = serde_json::to_value(NewApplication::with_defaults("site-a1b2c3")).unwrap();
        assert_eq!(
            body,
            json!({
                "name": "site-a1b2c3",
                "delivery_protocol": "http,https",
                "host_header": "host",
                "browser_cache_settings": "honor",
                "cdn_cache_settings": "honor",
                "cdn_cache_settings_maximum_ttl": 60,
            })
        );
    }

    #[test]
    fn test_new_function_body() {
        let body = serde_json::to_value(NewFunction::javascript(
            "site",
            "addEventListener()",
            json!({"key": "value"}),
        ))
        .unwrap();
        assert_eq!(body["language"], "javascript");
        assert_eq!(body["initiator_type"], "edge_application");
        assert_eq!(body["json_args"], json!({"key": "value"}));
        assert_eq!(body["active"], true);
    }

    #[test]
    fn test_new_domain_body() {
        let body = serde_json::to_value(NewDomain::for_application("site", 42)).unwrap();
        assert_eq!(
            body,
            json!({
                "name": "site",
                "cnames": [],
                "cname_access_only": false,
                "digital_certificate_id": null,
                "edge_application_id": 42,
                "is_active": true,
            })
        );
    }

    #[test]
    fn test_rule_routed_to_function() {
        let rule: RequestRule = serde_json::from_value(json!({
            "id": 1234,
            "name": "Default Rule",
            "phase": "default",
            "behaviors": [{"name": "set_origin", "target": "9"}],
            "criteria": [[{"variable": "${uri}", "operator": "starts_with"}]],
        }))
        .unwrap();

        let routed = serde_json::to_value(rule.routed_to_function(77)).unwrap();
        assert!(routed.get("id").is_none());
        assert_eq!(routed["name"], "Default Rule");
        assert_eq!(routed["phase"], "default");
        assert_eq!(
            routed["behaviors"],
            json!([{"name": "run_function", "target": 77}])
        );
        assert!(routed["criteria"].is_array());
    }

    #[test]
    fn test_purge_kind_path() {
        assert_eq!(PurgeKind::Url.as_str(), "url");
        assert_eq!(PurgeKind::CacheKey.as_str(), "cachekey");
        assert_eq!(PurgeKind::Wildcard.as_str(), "wildcard");
    }
}
