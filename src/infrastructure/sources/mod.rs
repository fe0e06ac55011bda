//! In-memory variable source.
//!
//! An in-process implementation of the `VariableSource` port: a registry
//! of known variables plus one shared update broadcast. The runtime side
//! of an integration publishes updates here; every attached cache filters
//! the broadcast down to its own variable.

use std::collections::HashSet;

use async_trait::async_trait;
use tokio::sync::{broadcast, RwLock};
use tracing::debug;

use crate::domain::models::{VariableId, VariableUpdate};
use crate::domain::ports::VariableSource;

/// Configuration for the in-memory source.
#[derive(Debug, Clone)]
pub struct InMemorySourceConfig {
    /// Capacity of the update broadcast channel.
    pub channel_capacity: usize,
}

impl Default for InMemorySourceConfig {
    fn default() -> Self {
        Self {
            channel_capacity: 256,
        }
    }
}

/// Variable source backed by an in-process registry.
///
/// `try_lookup` resolves against the set of registered variables;
/// `publish` fans an update out to every subscribed cache.
pub struct InMemoryVariableSource {
    registry: RwLock<HashSet<VariableId>>,
    updates: broadcast::Sender<VariableUpdate>,
}

impl InMemoryVariableSource {
    pub fn new(config: InMemorySourceConfig) -> Self {
        let (updates, _) = broadcast::channel(config.channel_capacity);
        Self {
            registry: RwLock::new(HashSet::new()),
            updates,
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(InMemorySourceConfig::default())
    }

    /// Declare a variable as served by this source.
    pub async fn register(&self, id: VariableId) {
        debug!(variable = %id, "variable registered");
        self.registry.write().await.insert(id);
    }

    /// Remove a variable from the registry.
    pub async fn unregister(&self, id: &VariableId) -> bool {
        self.registry.write().await.remove(id)
    }

    /// Broadcast an update to every subscriber.
    ///
    /// Returns the number of subscribers reached; zero is not an error,
    /// a source may outlive all of its caches.
    pub fn publish(&self, update: VariableUpdate) -> usize {
        self.updates.send(update).unwrap_or(0)
    }

    /// Number of attached subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.updates.receiver_count()
    }
}

impl Default for InMemoryVariableSource {
    fn default() -> Self {
        Self::with_defaults()
    }
}

#[async_trait]
impl VariableSource for InMemoryVariableSource {
    async fn try_lookup(&self, project: &str, variable: &str) -> bool {
        self.registry
            .read()
            .await
            .contains(&VariableId::new(project, variable))
    }

    fn updates(&self) -> broadcast::Receiver<VariableUpdate> {
        self.updates.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::VariableValue;

    #[tokio::test]
    async fn test_lookup_resolves_registered_variables() {
        let source = InMemoryVariableSource::with_defaults();
        source.register(VariableId::new("Plant1", "TankLevel")).await;

        assert!(source.try_lookup("Plant1", "TankLevel").await);
        assert!(!source.try_lookup("Plant1", "Unknown").await);
        assert!(!source.try_lookup("Plant2", "TankLevel").await);
    }

    #[tokio::test]
    async fn test_unregister() {
        let source = InMemoryVariableSource::with_defaults();
        let id = VariableId::new("Plant1", "TankLevel");
        source.register(id.clone()).await;
        assert!(source.unregister(&id).await);
        assert!(!source.unregister(&id).await);
        assert!(!source.try_lookup("Plant1", "TankLevel").await);
    }

    #[tokio::test]
    async fn test_publish_reaches_subscribers() {
        let source = InMemoryVariableSource::with_defaults();
        let mut rx = source.updates();

        let reached =
            source.publish(VariableUpdate::new("TankLevel", VariableValue::Float(42.5)));
        assert_eq!(reached, 1);

        let update = rx.recv().await.unwrap();
        assert_eq!(update.variable, "TankLevel");
    }

    #[tokio::test]
    async fn test_publish_without_subscribers() {
        let source = InMemoryVariableSource::with_defaults();
        assert_eq!(
            source.publish(VariableUpdate::new("TankLevel", VariableValue::Integer(1))),
            0
        );
    }
}
