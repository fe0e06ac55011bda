//! Port trait for the upstream variable store.

use async_trait::async_trait;
use tokio::sync::broadcast;

use crate::domain::models::VariableUpdate;

/// Contract to the plant-control runtime's variable store.
///
/// A source serves many variables at once: `updates()` is a shared
/// broadcast carrying changes for all of them, and consumers filter on
/// the variable name. `try_lookup` is the one-shot warm-up call that
/// registers interest in a `(project, variable)` pair; value population
/// always flows through the update broadcast afterwards.
#[async_trait]
pub trait VariableSource: Send + Sync {
    /// Attempt to resolve a `(project, variable)` pair with the runtime.
    ///
    /// Returns `false` when the pair is unknown. A `false` result is
    /// non-fatal; callers retry lazily on the next read.
    async fn try_lookup(&self, project: &str, variable: &str) -> bool;

    /// Subscribe to the shared change broadcast of this source.
    fn updates(&self) -> broadcast::Receiver<VariableUpdate>;
}
