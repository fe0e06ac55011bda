//! Port trait for localized label resolution.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Notification that the active display language switched.
///
/// The payload names the new language for diagnostics; label text is
/// recomputed by readers, so consumers only need the signal itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LanguageChanged {
    pub language: String,
}

/// Contract to the translation backend.
///
/// Resolvers map translation keys to localized strings for the active
/// language and announce language switches on a broadcast. Unknown keys
/// degrade to the raw key rather than erroring.
#[async_trait]
pub trait LabelResolver: Send + Sync {
    /// Localized string for `key` in the active language.
    async fn translate(&self, key: &str) -> String;

    /// Subscribe to language-switch notifications.
    fn language_changes(&self) -> broadcast::Receiver<LanguageChanged>;
}
