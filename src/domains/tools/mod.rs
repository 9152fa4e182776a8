//! Tools domain module.
//!
//! This module turns annotated axum endpoints into published tools.
//!
//! ## Architecture
//!
//! - `meta.rs` - Registration metadata attached to an endpoint
//! - `signature.rs` - Declared parameters and response of a handler
//! - `docstring.rs` - Descriptions and examples pulled from handler docs
//! - `routes.rs` - `ToolApp` builder and the shared route table
//! - `scanner.rs` - Selects tool routes, rejects duplicate names
//! - `schema.rs` - Input/output JSON Schema synthesis
//! - `cache.rs` - TTL cache for synthesized schemas
//! - `descriptor.rs` - Published records and the MCP tool conversion
//! - `registry.rs` - Scan/list coordination and the published snapshot
//! - `definitions/` - Endpoints of the demo application
//!
//! ## Publishing an Endpoint
//!
//! 1. Write the axum handler as usual
//! 2. Mount it with `Endpoint::get`/`post`/... on a `ToolApp`
//! 3. Declare its parameters with `.signature(...)` and docs with `.doc(...)`
//! 4. Attach `.tool(ToolMeta::new("name"))`

mod cache;
pub mod definitions;
mod descriptor;
mod docstring;
mod error;
mod meta;
mod registry;
mod routes;
mod scanner;
mod schema;
mod signature;

pub use cache::SchemaCache;
pub use descriptor::{ToolDescriptor, ToolListing, ToolStatus};
pub use docstring::DocString;
pub use error::ToolError;
pub use meta::ToolMeta;
pub use registry::ToolRegistry;
pub use routes::{Endpoint, HandlerId, RouteInfo, RouteTable, ToolApp};
pub use scanner::{ScanIssue, ScanIssueKind, ScanOutcome, ScannedTool, is_valid_tool_name, scan_routes};
pub use schema::{SynthesizedSchemas, synthesize};
pub use signature::{Constraints, HandlerSignature, Location, ModelSchema, ParamSpec, TypeHint};
