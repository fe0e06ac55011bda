//! Tagview - Display-Layer Value Cache
//!
//! Tagview is a thin adapter between a plant-control runtime's variable
//! store and a UI/display layer: each `ValueCache` caches one named
//! variable's value/unit pair, exposes a localized label, and republishes
//! change notifications to display observers.
//!
//! # Architecture
//!
//! This crate follows Clean Architecture / Hexagonal Architecture principles:
//!
//! - **Domain Layer** (`domain`): Value model, error taxonomy, and the
//!   `VariableSource`/`LabelResolver` port traits
//! - **Service Layer** (`services`): The `ValueCache` reactor
//! - **Infrastructure Layer** (`infrastructure`): In-process adapters,
//!   configuration, and logging
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use tagview::infrastructure::sources::InMemoryVariableSource;
//! use tagview::services::ValueCache;
//!
//! #[tokio::main]
//! async fn main() {
//!     let source = Arc::new(InMemoryVariableSource::with_defaults());
//!     let cache = ValueCache::connect_with_defaults(
//!         None,
//!         source,
//!         "Plant1",
//!         "TankLevel",
//!         "lbl.tanklevel",
//!     )
//!     .await;
//!     let mut notifications = cache.subscribe();
//!     // react to notifications, re-read cache.value() / cache.unit()
//! }
//! ```

pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::models::{DisplayHints, UpdateId, VariableId, VariableUpdate, VariableValue};
pub use domain::ports::{LabelResolver, LanguageChanged, VariableSource};
pub use domain::{DomainError, DomainResult};
pub use infrastructure::config::{Config, ConfigError, ConfigLoader};
pub use infrastructure::i18n::CatalogLabelResolver;
pub use infrastructure::sources::InMemoryVariableSource;
pub use services::{CacheEvent, ValueCache, ValueCacheConfig};
