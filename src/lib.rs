//! Route Tools Library
//!
//! This crate publishes the HTTP endpoints of an axum application as tools.
//! Endpoints opt in with a small piece of metadata; the registry scans the
//! route table, synthesizes JSON Schemas for each tool's input and output,
//! caches them and serves the listing over a tools API.
//!
//! # Architecture
//!
//! - **core**: Configuration, error handling, the server and the HTTP transport
//! - **domains**: Business logic organized by bounded contexts
//!   - **tools**: Tool metadata, route scanning, schema synthesis and the registry
//!
//! # Example
//!
//! ```rust,no_run
//! use route_tools::core::{Config, HttpTransport, ToolServer};
//! use route_tools::domains::tools::definitions::demo_app;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env();
//!     let transport = HttpTransport::new(config.http.clone());
//!     let (server, router) = ToolServer::attach(config, demo_app());
//!     transport.run(server, router).await?;
//!     Ok(())
//! }
//! ```

pub mod core;
pub mod domains;

// Re-export commonly used types for convenience
pub use core::{Config, Error, Result, ToolServer};
pub use domains::tools::{Endpoint, HandlerSignature, ToolApp, ToolMeta, ToolRegistry};
