//! Single-variable value cache with change-notification fan-out.
//!
//! `ValueCache` is the display layer's view of one plant variable: it
//! caches the last reported value/unit pair, resolves a localized label,
//! and republishes change notifications to UI observers. The cache never
//! polls — state moves only on inbound collaborator events, or lazily on
//! the first read of an unset value.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::{broadcast, Mutex, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, warn, Instrument};

use crate::domain::errors::DomainError;
use crate::domain::models::{DisplayHints, VariableUpdate, VariableValue};
use crate::domain::ports::{LabelResolver, VariableSource};

/// Outbound change signal for cache observers.
///
/// Signals carry no payload; observers respond by re-reading the
/// corresponding accessor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(clippy::enum_variant_names)]
pub enum CacheEvent {
    /// The cached value was overwritten (fired on every write).
    ValueChanged,
    /// The cached unit changed to a different one.
    UnitChanged,
    /// The active language switched; the label must be re-read.
    LabelChanged,
}

impl CacheEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ValueChanged => "value_changed",
            Self::UnitChanged => "unit_changed",
            Self::LabelChanged => "label_changed",
        }
    }
}

/// Configuration for a `ValueCache`.
#[derive(Debug, Clone)]
pub struct ValueCacheConfig {
    /// Capacity of the observer notification channel.
    pub channel_capacity: usize,
}

impl Default for ValueCacheConfig {
    fn default() -> Self {
        Self {
            channel_capacity: 64,
        }
    }
}

/// Handle to one collaborator subscription held by a cache.
///
/// Returned at subscribe time and released deterministically in the
/// cache's teardown path. Dropping the handle also detaches the
/// subscription, so an un-closed cache cannot leak its listener.
pub struct SubscriptionHandle {
    task: JoinHandle<()>,
}

impl SubscriptionHandle {
    fn new(task: JoinHandle<()>) -> Self {
        Self { task }
    }

    /// Detach the subscription by stopping its listener task.
    pub fn release(&self) {
        self.task.abort();
    }
}

impl Drop for SubscriptionHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Cached value/unit pair.
///
/// `value == None` means the cache was never populated; there is no path
/// back to unset once a value arrives.
#[derive(Debug, Default)]
struct CacheState {
    value: Option<VariableValue>,
    unit: Option<String>,
}

impl CacheState {
    /// Apply a matched update and report which signals it fires.
    ///
    /// The value write always fires; the unit write fires only when the
    /// incoming unit differs from the cached one.
    fn apply(&mut self, value: VariableValue, unit: Option<String>) -> Vec<CacheEvent> {
        let mut fired = vec![CacheEvent::ValueChanged];
        self.value = Some(value);
        if self.unit != unit {
            self.unit = unit;
            fired.push(CacheEvent::UnitChanged);
        }
        fired
    }
}

/// Display-layer cache for one named plant variable.
///
/// Construction wires the cache to the source's update broadcast and,
/// when a resolver is present, to its language-switch broadcast;
/// thereafter the cache is a pure reactor. Identity (`project_name`,
/// `variable_name`, `label_key`) is fixed for the cache's lifetime.
pub struct ValueCache {
    project_name: String,
    variable_name: String,
    label_key: String,
    state: Arc<RwLock<CacheState>>,
    hints: RwLock<DisplayHints>,
    source: Arc<dyn VariableSource>,
    resolver: Option<Arc<dyn LabelResolver>>,
    events: broadcast::Sender<CacheEvent>,
    subscriptions: Mutex<Vec<SubscriptionHandle>>,
    closed: AtomicBool,
    span: tracing::Span,
}

impl ValueCache {
    /// Create a cache and wire it to both collaborators.
    ///
    /// Performs one warm-up lookup against the source; a failed lookup is
    /// logged as a warning and never surfaces as an error, the cache just
    /// starts unset. With `resolver = None` the label degrades to the raw
    /// key and no language listener is installed.
    pub async fn connect(
        resolver: Option<Arc<dyn LabelResolver>>,
        source: Arc<dyn VariableSource>,
        project_name: impl Into<String>,
        variable_name: impl Into<String>,
        label_key: impl Into<String>,
        config: ValueCacheConfig,
    ) -> Arc<Self> {
        let project_name = project_name.into();
        let variable_name = variable_name.into();
        let span = tracing::info_span!(
            "value_cache",
            project = %project_name,
            variable = %variable_name
        );
        let (events, _) = broadcast::channel(config.channel_capacity);

        let cache = Arc::new(Self {
            project_name,
            variable_name,
            label_key: label_key.into(),
            state: Arc::new(RwLock::new(CacheState::default())),
            hints: RwLock::new(DisplayHints::default()),
            source,
            resolver,
            events,
            subscriptions: Mutex::new(Vec::new()),
            closed: AtomicBool::new(false),
            span,
        });

        cache.ensure_initialized().await;

        let mut subscriptions = Vec::with_capacity(2);
        subscriptions.push(cache.spawn_update_listener());
        if let Some(resolver) = cache.resolver.clone() {
            subscriptions.push(cache.spawn_language_listener(resolver));
        }
        *cache.subscriptions.lock().await = subscriptions;

        cache
    }

    /// Create a cache with the default configuration.
    pub async fn connect_with_defaults(
        resolver: Option<Arc<dyn LabelResolver>>,
        source: Arc<dyn VariableSource>,
        project_name: impl Into<String>,
        variable_name: impl Into<String>,
        label_key: impl Into<String>,
    ) -> Arc<Self> {
        Self::connect(
            resolver,
            source,
            project_name,
            variable_name,
            label_key,
            ValueCacheConfig::default(),
        )
        .await
    }

    /// Cached value, fetching lazily when unset.
    ///
    /// An unset read triggers exactly one lookup attempt against the
    /// source before returning; the result may still be `None` because
    /// population flows through the update broadcast, not the lookup.
    pub async fn value(&self) -> Option<VariableValue> {
        if self.state.read().await.value.is_none() {
            self.ensure_initialized().await;
        }
        self.state.read().await.value.clone()
    }

    /// Overwrite the cached value.
    ///
    /// Always fires `ValueChanged`, even when the new value equals the
    /// old one.
    pub async fn set_value(&self, value: VariableValue) {
        let mut state = self.state.write().await;
        state.value = Some(value);
        let _ = self.events.send(CacheEvent::ValueChanged);
    }

    /// Cached engineering unit.
    ///
    /// The unit is written solely by the update listener, which applies
    /// change-only dedup before firing `UnitChanged`.
    pub async fn unit(&self) -> Option<String> {
        self.state.read().await.unit.clone()
    }

    /// Localized label for this variable.
    ///
    /// Recomputed on every read so it always reflects the active
    /// language; without a resolver the raw key is returned unresolved.
    pub async fn label(&self) -> String {
        match &self.resolver {
            Some(resolver) => resolver.translate(&self.label_key).await,
            None => self.label_key.clone(),
        }
    }

    /// Subscribe to this cache's change signals.
    pub fn subscribe(&self) -> broadcast::Receiver<CacheEvent> {
        self.events.subscribe()
    }

    /// Number of active observers.
    pub fn subscriber_count(&self) -> usize {
        self.events.receiver_count()
    }

    pub fn project_name(&self) -> &str {
        &self.project_name
    }

    pub fn variable_name(&self) -> &str {
        &self.variable_name
    }

    pub fn label_key(&self) -> &str {
        &self.label_key
    }

    /// Current presentation hints.
    pub async fn display_hints(&self) -> DisplayHints {
        self.hints.read().await.clone()
    }

    pub async fn set_display_format(&self, format: Option<String>) {
        self.hints.write().await.display_format = format;
    }

    pub async fn set_string_format(&self, format: Option<String>) {
        self.hints.write().await.string_format = format;
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Detach the cache from both collaborators.
    ///
    /// Releases the source subscription first, then the resolver
    /// subscription. Safe to call multiple times; cached state stays
    /// readable after close, it just stops updating.
    pub async fn close(&self) {
        if self.closed.swap(true, Ordering::SeqCst) {
            return;
        }
        let mut subscriptions = self.subscriptions.lock().await;
        for subscription in subscriptions.drain(..) {
            subscription.release();
        }
        debug!(parent: &self.span, "value cache closed");
    }

    /// Warm the source registration for this cache's variable.
    ///
    /// No-op once a value has been cached. A successful lookup records
    /// the outcome only — population arrives via the update broadcast —
    /// while a failed lookup leaves the cache unset and is retried on
    /// the next unset read.
    async fn ensure_initialized(&self) {
        if self.state.read().await.value.is_some() {
            return;
        }
        if self
            .source
            .try_lookup(&self.project_name, &self.variable_name)
            .await
        {
            debug!(parent: &self.span, "variable registered with source");
        } else {
            let err = DomainError::LookupFailed {
                project: self.project_name.clone(),
                variable: self.variable_name.clone(),
            };
            warn!(parent: &self.span, error = %err, "cache stays uninitialized");
        }
    }

    fn spawn_update_listener(&self) -> SubscriptionHandle {
        let mut updates = self.source.updates();
        let state = Arc::clone(&self.state);
        let events = self.events.clone();
        let variable_name = self.variable_name.clone();
        let span = self.span.clone();

        let task = tokio::spawn(
            async move {
                loop {
                    match updates.recv().await {
                        Ok(update) => {
                            // The source broadcast is shared across variables;
                            // foreign updates are expected and skipped silently.
                            if update.variable != variable_name {
                                continue;
                            }
                            Self::apply_update(&state, &events, update).await;
                        }
                        Err(broadcast::error::RecvError::Lagged(missed)) => {
                            warn!(missed, "update listener lagged behind source broadcast");
                        }
                        Err(broadcast::error::RecvError::Closed) => break,
                    }
                }
            }
            .instrument(span),
        );

        SubscriptionHandle::new(task)
    }

    fn spawn_language_listener(&self, resolver: Arc<dyn LabelResolver>) -> SubscriptionHandle {
        let mut changes = resolver.language_changes();
        let events = self.events.clone();
        let span = self.span.clone();

        let task = tokio::spawn(
            async move {
                loop {
                    match changes.recv().await {
                        Ok(change) => {
                            debug!(language = %change.language, "language switched, label invalidated");
                            let _ = events.send(CacheEvent::LabelChanged);
                        }
                        Err(broadcast::error::RecvError::Lagged(_)) => {
                            // Missed switches collapse into one signal; readers
                            // recompute the label from the latest language anyway.
                            let _ = events.send(CacheEvent::LabelChanged);
                        }
                        Err(broadcast::error::RecvError::Closed) => break,
                    }
                }
            }
            .instrument(span),
        );

        SubscriptionHandle::new(task)
    }

    /// Apply a name-matched update under the state lock.
    ///
    /// Notifications fire while the lock is held so a concurrent delivery
    /// cannot interleave a value/unit pair out of order.
    async fn apply_update(
        state: &RwLock<CacheState>,
        events: &broadcast::Sender<CacheEvent>,
        update: VariableUpdate,
    ) {
        let update_id = update.id;
        let mut guard = state.write().await;
        let fired = guard.apply(update.value, update.unit);
        for event in &fired {
            let _ = events.send(*event);
        }
        drop(guard);
        debug!(update = %update_id, signals = fired.len(), "applied variable update");
    }
}

impl std::fmt::Debug for ValueCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValueCache")
            .field("project_name", &self.project_name)
            .field("variable_name", &self.variable_name)
            .field("label_key", &self.label_key)
            .field("closed", &self.is_closed())
            .finish_non_exhaustive()
    }
}
