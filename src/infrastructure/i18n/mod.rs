//! Catalog-backed label resolver.
//!
//! An in-process implementation of the `LabelResolver` port: per-language
//! key→label catalogs with an active-language cell. Switching the language
//! fires `LanguageChanged` so attached caches can invalidate their labels.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::{broadcast, RwLock};
use tracing::debug;

use crate::domain::ports::{LabelResolver, LanguageChanged};

type Catalog = HashMap<String, String>;

/// Configuration for the catalog resolver.
#[derive(Debug, Clone)]
pub struct CatalogResolverConfig {
    /// Language active at startup.
    pub default_language: String,
    /// Capacity of the language-change broadcast channel.
    pub channel_capacity: usize,
}

impl Default for CatalogResolverConfig {
    fn default() -> Self {
        Self {
            default_language: "en".to_string(),
            channel_capacity: 16,
        }
    }
}

/// Label resolver backed by in-memory translation catalogs.
pub struct CatalogLabelResolver {
    catalogs: RwLock<HashMap<String, Catalog>>,
    active_language: RwLock<String>,
    changes: broadcast::Sender<LanguageChanged>,
}

impl CatalogLabelResolver {
    pub fn new(config: CatalogResolverConfig) -> Self {
        let (changes, _) = broadcast::channel(config.channel_capacity);
        Self {
            catalogs: RwLock::new(HashMap::new()),
            active_language: RwLock::new(config.default_language),
            changes,
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(CatalogResolverConfig::default())
    }

    /// Install or replace the catalog for a language.
    pub async fn load_catalog(
        &self,
        language: impl Into<String>,
        entries: impl IntoIterator<Item = (String, String)>,
    ) {
        let language = language.into();
        let catalog: Catalog = entries.into_iter().collect();
        debug!(language = %language, entries = catalog.len(), "catalog loaded");
        self.catalogs.write().await.insert(language, catalog);
    }

    /// Currently active language.
    pub async fn language(&self) -> String {
        self.active_language.read().await.clone()
    }

    /// Switch the active language and announce the change.
    ///
    /// Fires even when the language is unchanged; label invalidation is
    /// cheap and listeners treat the signal as unconditional.
    pub async fn set_language(&self, language: impl Into<String>) {
        let language = language.into();
        *self.active_language.write().await = language.clone();
        debug!(language = %language, "active language switched");
        let _ = self.changes.send(LanguageChanged { language });
    }
}

impl Default for CatalogLabelResolver {
    fn default() -> Self {
        Self::with_defaults()
    }
}

#[async_trait]
impl LabelResolver for CatalogLabelResolver {
    async fn translate(&self, key: &str) -> String {
        let language = self.active_language.read().await;
        let catalogs = self.catalogs.read().await;
        catalogs
            .get(language.as_str())
            .and_then(|catalog| catalog.get(key))
            .cloned()
            // Unknown keys and missing catalogs degrade to the raw key.
            .unwrap_or_else(|| key.to_string())
    }

    fn language_changes(&self) -> broadcast::Receiver<LanguageChanged> {
        self.changes.subscribe()
    }
}
