// Security event storage backends

use super::types::{SecurityEvent, SecurityEventQuery};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// Trait for security event storage backends
#[async_trait]
pub trait EventStorage: Send + Sync {
    /// Store a security event
    async fn store(&self, event: SecurityEvent) -> Result<(), String>;

    /// Query stored events
    async fn query(&self, query: SecurityEventQuery) -> Result<Vec<SecurityEvent>, String>;
}

/// In-memory event storage implementation
/// Suitable for development and testing
pub struct MemoryEventStorage {
    events: Arc<RwLock<Vec<SecurityEvent>>>,
}

impl MemoryEventStorage {
    pub fn new() -> Self {
        Self {
            events: Arc::new(RwLock::new(Vec::new())),
        }
    }
}

impl Default for MemoryEventStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventStorage for MemoryEventStorage {
    async fn store(&self, event: SecurityEvent) -> Result<(), String> {
        let mut events = self.events.write().await;
        debug!("Storing security event: {:?}", event.kind);
        events.push(event);
        Ok(())
    }

    async fn query(&self, query: SecurityEventQuery) -> Result<Vec<SecurityEvent>, String> {
        let events = self.events.read().await;

        let mut results: Vec<SecurityEvent> = events
            .iter()
            .filter(|event| {
                if let Some(kind) = query.kind
                    && event.kind != kind
                {
                    return false;
                }

                if let Some(ref user_id) = query.user_id
                    && &event.user_id != user_id
                {
                    return false;
                }

                if let Some(ref session_id) = query.session_id
                    && event.session_id.as_ref() != Some(session_id)
                {
                    return false;
                }

                if let Some(min_level) = query.min_level
                    && event.level < min_level
                {
                    return false;
                }

                if let Some(start) = query.start_time
                    && event.timestamp < start
                {
                    return false;
                }

                if let Some(end) = query.end_time
                    && event.timestamp > end
                {
                    return false;
                }

                true
            })
            .cloned()
            .collect();

        // Most recent first
        results.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

        let offset = query.offset.unwrap_or(0);
        let limit = query.limit.unwrap_or(100);

        Ok(results.into_iter().skip(offset).take(limit).collect())
    }
}
