//! The host application's route table.
//!
//! [`ToolApp`] wraps an `axum::Router` and records every route mounted
//! through it, together with the declared [`HandlerSignature`] and optional
//! [`ToolMeta`]. The recorded table is what the scanner walks.

use axum::{
    Router,
    handler::Handler,
    http::Method,
    routing::{self, MethodRouter},
};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

use super::error::ToolError;
use super::meta::ToolMeta;
use super::signature::HandlerSignature;

// ============================================================================
// Handler identity
// ============================================================================

/// Identity of a mounted handler: `"METHOD /path"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct HandlerId(String);

impl HandlerId {
    pub fn new(method: &Method, path: &str) -> Self {
        Self(format!("{} {}", method, path))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for HandlerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One recorded route.
#[derive(Debug, Clone)]
pub struct RouteInfo {
    pub method: Method,
    pub path: String,
    pub signature: HandlerSignature,
    pub tool: Option<ToolMeta>,
    /// Routes mounted by the tools API itself.
    pub internal: bool,
}

impl RouteInfo {
    pub fn id(&self) -> HandlerId {
        HandlerId::new(&self.method, &self.path)
    }
}

// ============================================================================
// Route table
// ============================================================================

/// Shared, ordered view of every recorded route.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    routes: Arc<RwLock<Vec<RouteInfo>>>,
}

impl RouteTable {
    pub fn new(routes: Vec<RouteInfo>) -> Self {
        Self {
            routes: Arc::new(RwLock::new(routes)),
        }
    }

    /// Copy of the table in mount order.
    pub async fn snapshot(&self) -> Vec<RouteInfo> {
        self.routes.read().await.clone()
    }

    pub async fn get(&self, id: &HandlerId) -> Option<RouteInfo> {
        self.routes
            .read()
            .await
            .iter()
            .find(|route| &route.id() == id)
            .cloned()
    }

    pub async fn contains(&self, method: &Method, path: &str) -> bool {
        self.routes
            .read()
            .await
            .iter()
            .any(|route| route.method == *method && route.path == path)
    }

    pub async fn len(&self) -> usize {
        self.routes.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.routes.read().await.is_empty()
    }

    /// Replace the declared signature of a mounted handler.
    ///
    /// Cached schemas for the handler stay valid until their TTL runs out or
    /// the next scan.
    pub async fn redeclare(
        &self,
        id: &HandlerId,
        signature: HandlerSignature,
    ) -> Result<(), ToolError> {
        let mut routes = self.routes.write().await;
        let route = routes
            .iter_mut()
            .find(|route| &route.id() == id)
            .ok_or_else(|| ToolError::not_found(id.to_string()))?;
        route.signature = signature;
        debug!("Redeclared signature of {}", id);
        Ok(())
    }
}

// ============================================================================
// Endpoints
// ============================================================================

/// A handler plus everything declared about it.
pub struct Endpoint<S = ()> {
    method: Method,
    path: String,
    method_router: MethodRouter<S>,
    signature: HandlerSignature,
    tool: Option<ToolMeta>,
}

impl<S> Endpoint<S>
where
    S: Clone + Send + Sync + 'static,
{
    /// Wrap an already built method router.
    pub fn new(method: Method, path: impl Into<String>, method_router: MethodRouter<S>) -> Self {
        Self {
            method,
            path: path.into(),
            method_router,
            signature: HandlerSignature::default(),
            tool: None,
        }
    }

    pub fn get<H, T>(path: impl Into<String>, handler: H) -> Self
    where
        H: Handler<T, S>,
        T: 'static,
    {
        Self::new(Method::GET, path, routing::get(handler))
    }

    pub fn post<H, T>(path: impl Into<String>, handler: H) -> Self
    where
        H: Handler<T, S>,
        T: 'static,
    {
        Self::new(Method::POST, path, routing::post(handler))
    }

    pub fn put<H, T>(path: impl Into<String>, handler: H) -> Self
    where
        H: Handler<T, S>,
        T: 'static,
    {
        Self::new(Method::PUT, path, routing::put(handler))
    }

    pub fn patch<H, T>(path: impl Into<String>, handler: H) -> Self
    where
        H: Handler<T, S>,
        T: 'static,
    {
        Self::new(Method::PATCH, path, routing::patch(handler))
    }

    pub fn delete<H, T>(path: impl Into<String>, handler: H) -> Self
    where
        H: Handler<T, S>,
        T: 'static,
    {
        Self::new(Method::DELETE, path, routing::delete(handler))
    }

    pub fn signature(mut self, signature: HandlerSignature) -> Self {
        let doc = self.signature.doc.take();
        self.signature = signature;
        if self.signature.doc.is_none() {
            self.signature.doc = doc;
        }
        self
    }

    pub fn doc(mut self, doc: impl Into<String>) -> Self {
        self.signature.doc = Some(doc.into());
        self
    }

    /// Publish this endpoint as a tool.
    pub fn tool(mut self, meta: ToolMeta) -> Self {
        self.tool = Some(meta);
        self
    }
}

// ============================================================================
// Application builder
// ============================================================================

/// An axum router that records what is mounted on it.
pub struct ToolApp<S = ()> {
    router: Router<S>,
    routes: Vec<RouteInfo>,
}

impl<S> Default for ToolApp<S>
where
    S: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<S> ToolApp<S>
where
    S: Clone + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self {
            router: Router::new(),
            routes: Vec::new(),
        }
    }

    /// Mount an endpoint and record its declarations.
    pub fn endpoint(mut self, endpoint: Endpoint<S>) -> Self {
        self.router = self.router.route(&endpoint.path, endpoint.method_router);
        self.routes.push(RouteInfo {
            method: endpoint.method,
            path: endpoint.path,
            signature: endpoint.signature,
            tool: endpoint.tool,
            internal: false,
        });
        self
    }

    pub fn endpoints<I>(self, endpoints: I) -> Self
    where
        I: IntoIterator<Item = Endpoint<S>>,
    {
        endpoints.into_iter().fold(self, Self::endpoint)
    }

    /// Mount a plain route that is never published as a tool.
    pub fn route(mut self, method: Method, path: &str, method_router: MethodRouter<S>) -> Self {
        self.router = self.router.route(path, method_router);
        self.routes.push(RouteInfo {
            method,
            path: path.to_string(),
            signature: HandlerSignature::default(),
            tool: None,
            internal: false,
        });
        self
    }

    /// Record a route served by the tools API.
    pub(crate) fn record_internal(&mut self, method: Method, path: String) {
        self.routes.push(RouteInfo {
            method,
            path,
            signature: HandlerSignature::default(),
            tool: None,
            internal: true,
        });
    }

    pub fn routes(&self) -> &[RouteInfo] {
        &self.routes
    }

    /// Split into the axum router and the shared route table.
    pub fn into_parts(self) -> (Router<S>, RouteTable) {
        (self.router, RouteTable::new(self.routes))
    }
}
