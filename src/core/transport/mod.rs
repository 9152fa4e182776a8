//! HTTP transport for the tools server.
//!
//! The tools API is mounted next to the application's own routes, so the
//! only transport is the application's HTTP listener:
//!
//! - `GET  {prefix}/all` - full listing with scan issues
//! - `GET  {prefix}/list` - descriptors only
//! - `GET  {prefix}/tool/{name}` - one descriptor
//! - `POST {prefix}/scan` - rescan the route table
//! - `POST {prefix}/mcp` - MCP-compatible JSON-RPC listing

mod config;
mod error;
pub mod http;

pub use config::HttpConfig;
pub use error::{TransportError, TransportResult};
pub use http::HttpTransport;
