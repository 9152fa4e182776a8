//! Route scanner.
//!
//! Walks a route table snapshot and builds the ordered worklist of routes
//! carrying tool metadata. Name conflicts are resolved here: the first route
//! in mount order keeps the name and every later claimant is excluded.

use axum::http::Method;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, info, warn};

use super::error::ToolError;
use super::meta::ToolMeta;
use super::routes::{HandlerId, RouteInfo};
use super::signature::HandlerSignature;

const MAX_NAME_LEN: usize = 128;

/// A route selected for publication.
#[derive(Debug, Clone)]
pub struct ScannedTool {
    pub meta: ToolMeta,
    pub handler: HandlerId,
    pub method: Method,
    pub endpoint: String,
    pub signature: HandlerSignature,
}

/// Kind of problem found while scanning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanIssueKind {
    DuplicateName,
    InvalidName,
}

/// A route that was excluded from the listing, and why.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanIssue {
    pub kind: ScanIssueKind,
    pub tool: String,
    pub handler: String,
    pub message: String,
}

/// Result of one pass over the route table.
#[derive(Debug, Clone, Default)]
pub struct ScanOutcome {
    pub tools: Vec<ScannedTool>,
    pub issues: Vec<ScanIssue>,
    pub route_count: usize,
}

/// Tool names are 1..=128 characters of `[A-Za-z0-9_.-]`.
pub fn is_valid_tool_name(name: &str) -> bool {
    !name.is_empty()
        && name.len() <= MAX_NAME_LEN
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
}

/// Select the routes to publish, in mount order.
pub fn scan_routes(routes: &[RouteInfo]) -> ScanOutcome {
    let mut outcome = ScanOutcome {
        route_count: routes.len(),
        ..Default::default()
    };
    let mut claimed: HashMap<String, HandlerId> = HashMap::new();

    for route in routes {
        let id = route.id();
        if route.internal {
            continue;
        }
        let Some(meta) = &route.tool else {
            debug!("Skipping non-tool route {}", id);
            continue;
        };

        if !is_valid_tool_name(&meta.name) {
            warn!("Rejecting tool on {}: invalid name '{}'", id, meta.name);
            outcome.issues.push(ScanIssue {
                kind: ScanIssueKind::InvalidName,
                tool: meta.name.clone(),
                handler: id.to_string(),
                message: format!(
                    "Invalid tool name '{}': use 1-{} characters from [A-Za-z0-9_.-]",
                    meta.name, MAX_NAME_LEN
                ),
            });
            continue;
        }

        if let Some(kept) = claimed.get(&meta.name) {
            let err = ToolError::duplicate(&meta.name, kept.as_str(), id.as_str());
            warn!("{}", err);
            outcome.issues.push(ScanIssue {
                kind: ScanIssueKind::DuplicateName,
                tool: meta.name.clone(),
                handler: id.to_string(),
                message: err.to_string(),
            });
            continue;
        }

        debug!("Found tool: {} at {}", meta.name, id);
        claimed.insert(meta.name.clone(), id.clone());
        outcome.tools.push(ScannedTool {
            meta: meta.clone(),
            handler: id,
            method: route.method.clone(),
            endpoint: route.path.clone(),
            signature: route.signature.clone(),
        });
    }

    info!(
        "Tool scan found {} tools out of {} routes ({} rejected)",
        outcome.tools.len(),
        outcome.route_count,
        outcome.issues.len()
    );
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;

    fn route(method: Method, path: &str, tool: Option<&str>) -> RouteInfo {
        RouteInfo {
            method,
            path: path.to_string(),
            signature: HandlerSignature::default(),
            tool: tool.map(ToolMeta::new),
            internal: false,
        }
    }

    #[test]
    fn test_scan_selects_tagged_routes_in_order() {
        let routes = vec![
            route(Method::GET, "/", Some("health_check")),
            route(Method::GET, "/internal/stats", None),
            route(Method::POST, "/extract", Some("text_extractor")),
        ];

        let outcome = scan_routes(&routes);
        let names: Vec<_> = outcome.tools.iter().map(|t| t.meta.name.as_str()).collect();
        assert_eq!(names, vec!["health_check", "text_extractor"]);
        assert_eq!(outcome.route_count, 3);
        assert!(outcome.issues.is_empty());
        assert_eq!(outcome.tools[1].handler.as_str(), "POST /extract");
    }

    #[test]
    fn test_first_registration_keeps_duplicate_name() {
        let routes = vec![
            route(Method::POST, "/calc/v1", Some("calculator")),
            route(Method::POST, "/calc/v2", Some("calculator")),
            route(Method::POST, "/calc/v3", Some("calculator")),
        ];

        let outcome = scan_routes(&routes);
        assert_eq!(outcome.tools.len(), 1);
        assert_eq!(outcome.tools[0].endpoint, "/calc/v1");
        assert_eq!(outcome.issues.len(), 2);
        assert!(
            outcome
                .issues
                .iter()
                .all(|issue| issue.kind == ScanIssueKind::DuplicateName)
        );
        assert_eq!(outcome.issues[0].handler, "POST /calc/v2");
    }

    #[test]
    fn test_internal_routes_are_skipped() {
        let mut api = route(Method::GET, "/tools/all", Some("tools_all"));
        api.internal = true;

        let outcome = scan_routes(&[api]);
        assert!(outcome.tools.is_empty());
        assert!(outcome.issues.is_empty());
    }

    #[test]
    fn test_invalid_names_are_rejected() {
        let routes = vec![
            route(Method::GET, "/a", Some("")),
            route(Method::GET, "/b", Some("has space")),
            route(Method::GET, "/c", Some("ok.name-1")),
        ];

        let outcome = scan_routes(&routes);
        assert_eq!(outcome.tools.len(), 1);
        assert_eq!(outcome.issues.len(), 2);
        assert!(
            outcome
                .issues
                .iter()
                .all(|issue| issue.kind == ScanIssueKind::InvalidName)
        );
    }
}
