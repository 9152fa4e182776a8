//! Configuration management for the tools server.
//!
//! This module provides a centralized configuration structure that can be
//! populated from environment variables, a `.env` file, or defaults.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{info, warn};

use super::error::{Error, Result};
use super::transport::HttpConfig;

/// Main configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server identification and metadata.
    pub server: ServerConfig,

    /// Logging configuration.
    pub logging: LoggingConfig,

    /// Tool registry and API configuration.
    pub tools: ToolsConfig,

    /// HTTP listener configuration.
    pub http: HttpConfig,
}

/// Server identification configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// The name of the server as reported to clients.
    pub name: String,

    /// The version of the server.
    pub version: String,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "trace").
    pub level: String,

    /// Whether to include timestamps in log output.
    pub with_timestamps: bool,
}

/// Configuration of the tool registry and its HTTP API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolsConfig {
    /// Path prefix of the tools API.
    pub prefix: String,

    /// Scan the route table once when the server starts.
    pub scan_on_startup: bool,

    /// Mount the tools API. The registry stays usable when disabled.
    pub enable_api: bool,

    /// Seconds a synthesized schema is served before it is rebuilt.
    pub cache_ttl_secs: u64,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            prefix: "/tools".to_string(),
            scan_on_startup: true,
            enable_api: true,
            cache_ttl_secs: 60,
        }
    }
}

impl ToolsConfig {
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    /// Full path of an API route, e.g. `route("all")` -> `/tools/all`.
    pub fn route(&self, name: &str) -> String {
        format!("{}/{}", self.prefix, name)
    }
}

/// `tools/` -> `/tools`, `/` -> ``.
pub fn normalize_prefix(prefix: &str) -> String {
    let trimmed = prefix.trim().trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{}", trimmed)
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                name: "route-tools".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                with_timestamps: true,
            },
            tools: ToolsConfig::default(),
            http: HttpConfig::default(),
        }
    }
}

impl Config {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from environment variables.
    ///
    /// Environment variables are expected to be prefixed with `MCP_`.
    /// For example: `MCP_TOOLS_PREFIX`, `MCP_LOG_LEVEL`.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(name) = lookup("MCP_SERVER_NAME") {
            config.server.name = name;
        }

        if let Some(level) = lookup("MCP_LOG_LEVEL") {
            config.logging.level = level;
        }

        if let Some(prefix) = lookup("MCP_TOOLS_PREFIX") {
            config.tools.prefix = normalize_prefix(&prefix);
            info!("Tools API prefix set to {:?}", config.tools.prefix);
        }

        let flags = [
            ("MCP_TOOLS_SCAN_ON_STARTUP", &mut config.tools.scan_on_startup),
            ("MCP_TOOLS_ENABLE_API", &mut config.tools.enable_api),
            ("MCP_HTTP_CORS", &mut config.http.enable_cors),
        ];
        for (key, target) in flags {
            if let Some(value) = lookup(key) {
                match parse_bool(&value) {
                    Some(flag) => *target = flag,
                    None => warn!("Ignoring {}={:?}: expected a boolean", key, value),
                }
            }
        }

        if let Some(ttl) = lookup("MCP_TOOLS_CACHE_TTL") {
            match ttl.trim().parse() {
                Ok(secs) => config.tools.cache_ttl_secs = secs,
                Err(_) => warn!("Ignoring MCP_TOOLS_CACHE_TTL={:?}: expected seconds", ttl),
            }
        }

        if let Some(host) = lookup("MCP_HTTP_HOST") {
            config.http.host = host;
        }

        if let Some(port) = lookup("MCP_HTTP_PORT") {
            match port.trim().parse() {
                Ok(port) => config.http.port = port,
                Err(_) => warn!("Ignoring MCP_HTTP_PORT={:?}: expected a port number", port),
            }
        }

        config
    }

    /// Reject settings the server cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.tools.prefix.is_empty() {
            return Err(Error::config(
                "tools prefix must not be empty or '/': the API would shadow application routes",
            ));
        }
        if self.tools.prefix.contains(['{', '}', '*']) {
            return Err(Error::config(format!(
                "tools prefix {:?} must be a static path",
                self.tools.prefix
            )));
        }
        Ok(())
    }
}
