//! Core module containing shared infrastructure components.
//!
//! This module provides the foundational building blocks of the tools
//! server: error handling, configuration, the server that attaches the
//! tool registry to an application, and the HTTP transport.

pub mod config;
pub mod error;
pub mod server;
pub mod transport;

pub use config::{Config, ToolsConfig};
pub use error::{Error, Result};
pub use server::ToolServer;
pub use transport::{HttpConfig, HttpTransport};
