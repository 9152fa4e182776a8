//! Tool Registry - scanning, synthesis and the published listing.
//!
//! The registry owns the published snapshot of scanned tools and the schema
//! cache. A scan rebuilds everything from the route table and swaps the
//! snapshot in a single write, so readers see either the old listing or the
//! new one. Scans are serialized; concurrent callers queue behind the one in
//! progress.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

use crate::core::config::ToolsConfig;

use super::cache::SchemaCache;
use super::descriptor::{ToolDescriptor, ToolListing};
use super::error::ToolError;
use super::routes::RouteTable;
use super::scanner::{ScanIssue, ScannedTool, scan_routes};
use super::schema::synthesize;

#[derive(Debug, Default)]
struct Snapshot {
    tools: Vec<ScannedTool>,
    issues: Vec<ScanIssue>,
    scanned_at: Option<DateTime<Utc>>,
}

/// Central registry of published tools.
#[derive(Debug)]
pub struct ToolRegistry {
    routes: RouteTable,
    cache: SchemaCache,
    snapshot: RwLock<Arc<Snapshot>>,
    scan_lock: Mutex<()>,
    scan_on_startup: bool,
}

impl ToolRegistry {
    /// Create a registry over a route table.
    pub fn new(routes: RouteTable, cache_ttl: Duration, scan_on_startup: bool) -> Self {
        Self {
            routes,
            cache: SchemaCache::new(cache_ttl),
            snapshot: RwLock::new(Arc::new(Snapshot::default())),
            scan_lock: Mutex::new(()),
            scan_on_startup,
        }
    }

    pub fn from_config(routes: RouteTable, config: &ToolsConfig) -> Self {
        Self::new(routes, config.cache_ttl(), config.scan_on_startup)
    }

    /// The route table this registry scans.
    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    pub fn cache(&self) -> &SchemaCache {
        &self.cache
    }

    /// Scan once if the registry was configured to scan on startup.
    pub async fn startup(&self) -> Option<ToolListing> {
        if !self.scan_on_startup {
            info!("Scan on startup disabled; tools are published on the first manual scan");
            return None;
        }
        Some(self.scan().await)
    }

    pub async fn is_scanned(&self) -> bool {
        self.snapshot.read().await.scanned_at.is_some()
    }

    /// Rebuild the listing from the route table.
    pub async fn scan(&self) -> ToolListing {
        let _guard = self.scan_lock.lock().await;
        info!("Starting tool scan");

        let routes = self.routes.snapshot().await;
        let outcome = scan_routes(&routes);

        let mut descriptors = Vec::with_capacity(outcome.tools.len());
        let mut fresh = Vec::with_capacity(outcome.tools.len());
        for tool in &outcome.tools {
            let schemas = synthesize(&tool.meta, &tool.signature);
            fresh.push((tool.meta.name.clone(), tool.handler.clone(), schemas.clone()));
            descriptors.push(ToolDescriptor::new(tool, schemas));
        }

        self.cache.clear().await;
        for (name, handler, schemas) in fresh {
            self.cache.insert(&name, handler, schemas).await;
        }

        let scanned_at = Utc::now();
        let snapshot = Snapshot {
            tools: outcome.tools,
            issues: outcome.issues.clone(),
            scanned_at: Some(scanned_at),
        };
        *self.snapshot.write().await = Arc::new(snapshot);

        let degraded = descriptors
            .iter()
            .filter(|d| !d.errors.is_empty())
            .count();
        info!(
            "Tool scan complete: {} tools published ({} degraded), {} rejected",
            descriptors.len(),
            degraded,
            outcome.issues.len()
        );

        ToolListing::new(descriptors, outcome.issues, Some(scanned_at))
    }

    /// The current listing, resynthesizing expired schemas.
    pub async fn list(&self) -> ToolListing {
        let snapshot = self.snapshot.read().await.clone();
        if snapshot.scanned_at.is_none() {
            debug!("Listing requested before the first scan");
        }

        let mut descriptors = Vec::with_capacity(snapshot.tools.len());
        for tool in &snapshot.tools {
            descriptors.push(self.descriptor(tool).await);
        }
        ToolListing::new(descriptors, snapshot.issues.clone(), snapshot.scanned_at)
    }

    /// One tool by name.
    pub async fn get(&self, name: &str) -> Result<ToolDescriptor, ToolError> {
        let snapshot = self.snapshot.read().await.clone();
        let tool = snapshot
            .tools
            .iter()
            .find(|t| t.meta.name == name)
            .ok_or_else(|| ToolError::not_found(name))?;
        Ok(self.descriptor(tool).await)
    }

    async fn descriptor(&self, tool: &ScannedTool) -> ToolDescriptor {
        if let Some(schemas) = self.cache.get(&tool.meta.name, &tool.handler).await {
            return ToolDescriptor::new(tool, schemas);
        }

        let signature = match self.routes.get(&tool.handler).await {
            Some(route) => route.signature,
            None => {
                warn!(
                    "Route {} for tool {} is gone; using the signature from the last scan",
                    tool.handler, tool.meta.name
                );
                tool.signature.clone()
            }
        };

        debug!("Resynthesizing schemas for tool {}", tool.meta.name);
        let schemas = synthesize(&tool.meta, &signature);
        self.cache
            .insert(&tool.meta.name, tool.handler.clone(), schemas.clone())
            .await;
        ToolDescriptor::new(tool, schemas)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::tools::descriptor::ToolStatus;
    use crate::domains::tools::meta::ToolMeta;
    use crate::domains::tools::routes::{HandlerId, RouteInfo};
    use crate::domains::tools::scanner::ScanIssueKind;
    use crate::domains::tools::signature::{HandlerSignature, ModelSchema, ParamSpec, TypeHint};
    use axum::http::Method;
    use serde_json::json;
    use tokio_test::assert_ok;

    fn calculator_signature() -> HandlerSignature {
        HandlerSignature::new()
            .param(ParamSpec::new("operation", TypeHint::String))
            .param(ParamSpec::new("a", TypeHint::Number))
            .param(ParamSpec::new("b", TypeHint::Number))
    }

    fn route(method: Method, path: &str, tool: Option<ToolMeta>) -> RouteInfo {
        RouteInfo {
            method,
            path: path.to_string(),
            signature: HandlerSignature::default(),
            tool,
            internal: false,
        }
    }

    fn table() -> RouteTable {
        let mut calculator = route(
            Method::POST,
            "/calculate",
            Some(
                ToolMeta::new("calculator")
                    .example_input(json!({"operation": "add", "a": 5, "b": 3})),
            ),
        );
        calculator.signature = calculator_signature();

        RouteTable::new(vec![
            route(Method::GET, "/", Some(ToolMeta::new("health_check").tag("system"))),
            calculator,
            route(Method::GET, "/internal/stats", None),
        ])
    }

    fn registry(ttl: Duration) -> ToolRegistry {
        ToolRegistry::new(table(), ttl, true)
    }

    #[tokio::test]
    async fn test_scan_publishes_one_descriptor_per_tool() {
        let registry = registry(Duration::from_secs(60));
        let listing = registry.scan().await;

        assert_eq!(listing.count, 2);
        assert_eq!(listing.endpoints, vec!["/", "/calculate"]);
        assert!(listing.errors.is_empty());
        assert!(listing.scanned_at.is_some());

        let calculator = listing.get("calculator").unwrap();
        assert_eq!(calculator.status, ToolStatus::Ok);
        assert_eq!(
            calculator.input_schema["required"],
            json!(["operation", "a", "b"])
        );
        assert_eq!(
            calculator.input_schema["example"],
            json!({"operation": "add", "a": 5, "b": 3})
        );
        assert_eq!(registry.cache().len().await, 2);
    }

    #[tokio::test]
    async fn test_list_before_scan_is_empty() {
        let registry = registry(Duration::from_secs(60));
        let listing = registry.list().await;

        assert_eq!(listing.count, 0);
        assert!(listing.scanned_at.is_none());
        assert!(!registry.is_scanned().await);
    }

    #[tokio::test]
    async fn test_rescan_replaces_listing() {
        let registry = registry(Duration::from_secs(60));
        registry.scan().await;
        registry.scan().await;

        let listing = registry.list().await;
        assert_eq!(listing.count, 2);
        assert!(registry.is_scanned().await);
    }

    #[tokio::test]
    async fn test_duplicate_names_listed_once() {
        let routes = RouteTable::new(vec![
            route(Method::POST, "/calc/v1", Some(ToolMeta::new("calculator"))),
            route(Method::POST, "/calc/v2", Some(ToolMeta::new("calculator"))),
        ]);
        let registry = ToolRegistry::new(routes, Duration::from_secs(60), false);

        let listing = registry.scan().await;
        assert_eq!(listing.count, 1);
        assert_eq!(listing.tools[0].endpoint, "/calc/v1");
        assert_eq!(listing.errors.len(), 1);
        assert_eq!(listing.errors[0].kind, ScanIssueKind::DuplicateName);

        // Issues stay visible on later listings.
        assert_eq!(registry.list().await.errors.len(), 1);
    }

    #[tokio::test]
    async fn test_cached_schema_served_before_ttl() {
        let registry = registry(Duration::from_secs(60));
        registry.scan().await;

        let id = HandlerId::new(&Method::POST, "/calculate");
        let signature = calculator_signature().param(ParamSpec::new("precision", TypeHint::Integer));
        assert_ok!(registry.routes().redeclare(&id, signature).await);

        let tool = registry.get("calculator").await.unwrap();
        assert!(tool.input_schema["properties"].get("precision").is_none());
    }

    #[tokio::test]
    async fn test_expired_schema_reflects_new_signature() {
        let registry = registry(Duration::from_millis(50));
        registry.scan().await;

        let id = HandlerId::new(&Method::POST, "/calculate");
        let signature = calculator_signature().param(ParamSpec::new("precision", TypeHint::Integer));
        assert_ok!(registry.routes().redeclare(&id, signature).await);

        tokio::time::sleep(Duration::from_millis(80)).await;

        let tool = registry.get("calculator").await.unwrap();
        assert_eq!(
            tool.input_schema["properties"]["precision"],
            json!({"type": "integer"})
        );
    }

    #[tokio::test]
    async fn test_zero_ttl_always_resynthesizes() {
        let registry = registry(Duration::ZERO);
        registry.scan().await;
        assert!(registry.cache().is_empty().await);

        let id = HandlerId::new(&Method::GET, "/");
        let signature = HandlerSignature::new().doc("Check if the API is running");
        assert_ok!(registry.routes().redeclare(&id, signature).await);

        let tool = registry.get("health_check").await.unwrap();
        assert_eq!(tool.description, "Check if the API is running");
    }

    #[tokio::test]
    async fn test_degraded_tool_is_still_listed() {
        fn broken() -> schemars::Schema {
            panic!("broken model")
        }

        let mut degraded = route(Method::POST, "/broken", Some(ToolMeta::new("broken")));
        degraded.signature = HandlerSignature::new().param(ParamSpec::new(
            "payload",
            TypeHint::Model(ModelSchema::from_fn("Broken", broken)),
        ));
        let routes = RouteTable::new(vec![
            degraded,
            route(Method::GET, "/", Some(ToolMeta::new("health_check"))),
        ]);
        let registry = ToolRegistry::new(routes, Duration::from_secs(60), false);

        let listing = registry.scan().await;
        assert_eq!(listing.count, 2);
        assert_eq!(listing.get("broken").unwrap().status, ToolStatus::Degraded);
        assert_eq!(listing.get("health_check").unwrap().status, ToolStatus::Ok);
    }

    #[tokio::test]
    async fn test_get_unknown_tool() {
        let registry = registry(Duration::from_secs(60));
        registry.scan().await;
        let result = registry.get("missing").await;
        assert!(matches!(result, Err(ToolError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_concurrent_scans_agree() {
        let registry = Arc::new(registry(Duration::from_secs(60)));
        let (first, second) = tokio::join!(registry.scan(), registry.scan());

        assert_eq!(first.count, 2);
        assert_eq!(second.count, 2);
        assert_eq!(registry.list().await.count, 2);
    }

    #[tokio::test]
    async fn test_startup_respects_flag() {
        let enabled = ToolRegistry::new(table(), Duration::from_secs(60), true);
        assert!(enabled.startup().await.is_some());
        assert!(enabled.is_scanned().await);

        let disabled = ToolRegistry::new(table(), Duration::from_secs(60), false);
        assert!(disabled.startup().await.is_none());
        assert!(!disabled.is_scanned().await);
    }
}
