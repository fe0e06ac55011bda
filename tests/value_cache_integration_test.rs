//! End-to-end tests wiring `ValueCache` to the real in-process adapters.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::time::timeout;

use tagview::infrastructure::i18n::CatalogLabelResolver;
use tagview::infrastructure::sources::InMemoryVariableSource;
use tagview::services::{CacheEvent, ValueCache};
use tagview::{VariableId, VariableUpdate, VariableValue};

async fn recv_event(rx: &mut broadcast::Receiver<CacheEvent>) -> CacheEvent {
    timeout(Duration::from_secs(1), rx.recv())
        .await
        .expect("timed out waiting for cache event")
        .expect("event channel closed")
}

fn entries(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
    pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect()
}

#[tokio::test]
async fn tank_level_display_scenario() {
    let source = Arc::new(InMemoryVariableSource::with_defaults());
    source
        .register(VariableId::new("Plant1", "TankLevel"))
        .await;

    let resolver = Arc::new(CatalogLabelResolver::with_defaults());
    resolver
        .load_catalog("en", entries(&[("lbl.tanklevel", "Tank Level")]))
        .await;
    resolver
        .load_catalog("de", entries(&[("lbl.tanklevel", "Tankstand")]))
        .await;

    let cache = ValueCache::connect_with_defaults(
        Some(resolver.clone()),
        source.clone(),
        "Plant1",
        "TankLevel",
        "lbl.tanklevel",
    )
    .await;
    let mut rx = cache.subscribe();

    assert_eq!(cache.label().await, "Tank Level");
    assert!(cache.value().await.is_none());

    // A matching update populates value and unit, firing both signals.
    source.publish(VariableUpdate::new("TankLevel", VariableValue::Float(42.5)).with_unit("L"));
    assert_eq!(recv_event(&mut rx).await, CacheEvent::ValueChanged);
    assert_eq!(recv_event(&mut rx).await, CacheEvent::UnitChanged);
    assert_eq!(cache.value().await, Some(VariableValue::Float(42.5)));
    assert_eq!(cache.unit().await.as_deref(), Some("L"));

    // An update for another variable leaves this cache untouched.
    source.publish(VariableUpdate::new("OtherVar", VariableValue::Integer(1)).with_unit("X"));
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(rx.try_recv().is_err());
    assert_eq!(cache.value().await, Some(VariableValue::Float(42.5)));
    assert_eq!(cache.unit().await.as_deref(), Some("L"));

    // Switching the language invalidates the label exactly once and the
    // next read resolves through the new catalog.
    resolver.set_language("de").await;
    assert_eq!(recv_event(&mut rx).await, CacheEvent::LabelChanged);
    assert!(rx.try_recv().is_err());
    assert_eq!(cache.label().await, "Tankstand");
}

#[tokio::test]
async fn repeated_updates_dedup_units_but_not_values() {
    let source = Arc::new(InMemoryVariableSource::with_defaults());
    source
        .register(VariableId::new("Plant1", "Pressure"))
        .await;

    let cache = ValueCache::connect_with_defaults(
        None,
        source.clone(),
        "Plant1",
        "Pressure",
        "lbl.pressure",
    )
    .await;
    let mut rx = cache.subscribe();

    source.publish(VariableUpdate::new("Pressure", VariableValue::Float(2.0)).with_unit("bar"));
    source.publish(VariableUpdate::new("Pressure", VariableValue::Float(2.0)).with_unit("bar"));

    // Identical value: two value signals. Identical unit: one unit signal.
    assert_eq!(recv_event(&mut rx).await, CacheEvent::ValueChanged);
    assert_eq!(recv_event(&mut rx).await, CacheEvent::UnitChanged);
    assert_eq!(recv_event(&mut rx).await, CacheEvent::ValueChanged);
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn unresolved_variable_stays_uninitialized_until_first_update() {
    let source = Arc::new(InMemoryVariableSource::with_defaults());

    // Not registered: construction's warm-up lookup fails silently.
    let cache = ValueCache::connect_with_defaults(
        None,
        source.clone(),
        "Plant1",
        "FlowRate",
        "lbl.flowrate",
    )
    .await;

    assert!(cache.value().await.is_none());
    assert!(cache.unit().await.is_none());

    // The source later learns the variable and reports a value.
    source
        .register(VariableId::new("Plant1", "FlowRate"))
        .await;
    let mut rx = cache.subscribe();
    source.publish(VariableUpdate::new("FlowRate", VariableValue::Float(3.5)).with_unit("m3/h"));
    assert_eq!(recv_event(&mut rx).await, CacheEvent::ValueChanged);
    assert_eq!(cache.value().await, Some(VariableValue::Float(3.5)));
}

#[tokio::test]
async fn label_degrades_to_raw_key_without_resolver() {
    let source = Arc::new(InMemoryVariableSource::with_defaults());
    source
        .register(VariableId::new("Plant1", "TankLevel"))
        .await;

    let cache = ValueCache::connect_with_defaults(
        None,
        source,
        "Plant1",
        "TankLevel",
        "lbl.tanklevel",
    )
    .await;

    assert_eq!(cache.label().await, "lbl.tanklevel");
}

#[tokio::test]
async fn closed_cache_detaches_from_source_and_resolver() {
    let source = Arc::new(InMemoryVariableSource::with_defaults());
    source
        .register(VariableId::new("Plant1", "TankLevel"))
        .await;
    let resolver = Arc::new(CatalogLabelResolver::with_defaults());

    let cache = ValueCache::connect_with_defaults(
        Some(resolver.clone()),
        source.clone(),
        "Plant1",
        "TankLevel",
        "lbl.tanklevel",
    )
    .await;
    let mut rx = cache.subscribe();

    source.publish(VariableUpdate::new("TankLevel", VariableValue::Integer(5)));
    assert_eq!(recv_event(&mut rx).await, CacheEvent::ValueChanged);

    cache.close().await;
    cache.close().await;

    source.publish(VariableUpdate::new("TankLevel", VariableValue::Integer(6)));
    resolver.set_language("de").await;
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(rx.try_recv().is_err());

    // Cached state stays readable after close, it just stops updating.
    assert_eq!(cache.value().await, Some(VariableValue::Integer(5)));
}
