//! TTL cache for synthesized schemas.

use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::debug;

use super::routes::HandlerId;
use super::schema::SynthesizedSchemas;

#[derive(Debug, Clone)]
struct CacheEntry {
    schemas: SynthesizedSchemas,
    handler: HandlerId,
    stored_at: Instant,
}

/// Synthesized schemas keyed by tool name.
///
/// An entry is served until `ttl` has elapsed since it was stored. A zero
/// TTL disables caching.
#[derive(Debug)]
pub struct SchemaCache {
    ttl: Duration,
    entries: RwLock<HashMap<String, CacheEntry>>,
}

impl SchemaCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub async fn get(&self, name: &str, handler: &HandlerId) -> Option<SynthesizedSchemas> {
        self.get_at(name, handler, Instant::now()).await
    }

    /// Live entry for `name`, provided it was synthesized for `handler`.
    pub async fn get_at(
        &self,
        name: &str,
        handler: &HandlerId,
        now: Instant,
    ) -> Option<SynthesizedSchemas> {
        let entries = self.entries.read().await;
        let entry = entries.get(name)?;
        if &entry.handler != handler {
            debug!("Cache entry for {} belongs to another handler", name);
            return None;
        }
        if now.saturating_duration_since(entry.stored_at) >= self.ttl {
            debug!("Cache entry for {} expired", name);
            return None;
        }
        Some(entry.schemas.clone())
    }

    pub async fn insert(&self, name: &str, handler: HandlerId, schemas: SynthesizedSchemas) {
        self.insert_at(name, handler, schemas, Instant::now()).await;
    }

    pub async fn insert_at(
        &self,
        name: &str,
        handler: HandlerId,
        schemas: SynthesizedSchemas,
        now: Instant,
    ) {
        if self.ttl.is_zero() {
            return;
        }
        self.entries.write().await.insert(
            name.to_string(),
            CacheEntry {
                schemas,
                handler,
                stored_at: now,
            },
        );
    }

    pub async fn invalidate(&self, name: &str) -> bool {
        self.entries.write().await.remove(name).is_some()
    }

    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }

    /// Number of stored entries, expired ones included.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}
