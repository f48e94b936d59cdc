//! Integration tests for the persistence store on SQLite
//!
//! Runs the typed store against in-memory SQLite and a temporary database
//! file, including values left behind in the pre-envelope layout.

#![allow(clippy::disallowed_methods)] // Test code - unwrap is acceptable

use std::sync::Arc;

use mastercalc_calc::calculators::{divider, voltage_drop, DividerInput, DropInput};
use mastercalc_calc::tables::Material;
use mastercalc_calc::CalculatorId;
use mastercalc_store::{
    Backend, FixedClock, KvStore, MemoryStore, PersistenceStore, SlotStatus, SqliteStore,
    StoreError, StoreKey, Theme, HISTORY_LIMIT,
};
use sqlx::SqlitePool;

async fn sqlite_store() -> PersistenceStore<SqliteStore> {
    let pool = SqlitePool::connect("sqlite::memory:")
        .await
        .expect("Failed to create in-memory database");
    let backend = SqliteStore::from_pool(pool, ":memory:").await.unwrap();
    PersistenceStore::new(backend)
}

#[tokio::test]
async fn test_history_flow_on_sqlite() {
    let store = sqlite_store().await;

    for _ in 0..(HISTORY_LIMIT + 3) {
        store
            .record_calculation(|| {
                divider(DividerInput {
                    input_voltage: 12.0,
                    r1: 1000.0,
                    r2: 2000.0,
                })
            })
            .await
            .unwrap();
    }
    store
        .record_calculation(|| {
            voltage_drop(DropInput {
                current: 10.0,
                length: 50.0,
                section: 2.5,
                material: Material::Copper,
                voltage: 220.0,
            })
        })
        .await
        .unwrap();

    let history = store.history().await.unwrap();
    assert_eq!(history.len(), HISTORY_LIMIT);
    assert!(history[0].result.contains("ΔU = 7 В"));

    let mut ids: Vec<i64> = history.iter().map(|e| e.id).collect();
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), HISTORY_LIMIT);

    assert!(store.delete_history(history[3].id).await.unwrap());
    assert_eq!(store.history().await.unwrap().len(), HISTORY_LIMIT - 1);
}

#[tokio::test]
async fn test_favorites_templates_theme_on_sqlite() {
    let store = sqlite_store().await;

    store
        .add_calculator_favorite(CalculatorId::VoltageDrop)
        .await
        .unwrap();
    store
        .add_calculator_favorite(CalculatorId::Breaker)
        .await
        .unwrap();
    store
        .add_calculator_favorite(CalculatorId::VoltageDrop)
        .await
        .unwrap();

    let favorites = store.favorites().await.unwrap();
    assert_eq!(favorites.len(), 2);
    assert_eq!(favorites[0].id, "voltage-drop");
    assert_eq!(favorites[0].screen, CalculatorId::VoltageDrop.screen().id());

    store.save_template("Квартира 1").await.unwrap();
    let err = store.delete_template(5).await.unwrap_err();
    assert!(matches!(err, StoreError::IndexOutOfRange { len: 1, .. }));

    assert_eq!(store.theme().await.unwrap(), Theme::Dark);
    store.toggle_theme().await.unwrap();
    assert_eq!(store.theme().await.unwrap(), Theme::Light);
}

#[tokio::test]
async fn test_legacy_layout_is_migrated() {
    let store = sqlite_store().await;
    let backend = store.backend();

    backend
        .set(
            StoreKey::Favorites.key(),
            r#"[{"id":"ohm","name":"Закон Ома","description":"U = I × R","screen":"electrical"}]"#,
        )
        .await
        .unwrap();
    backend
        .set(
            StoreKey::Stats.key(),
            r#"{"firstLaunch":"2024-01-01T08:00:00.000Z","launchCount":41,"lastLaunch":"2024-03-01T08:00:00.000Z"}"#,
        )
        .await
        .unwrap();
    backend
        .set(StoreKey::Draft.key(), "L1: 16A, L2: 10A")
        .await
        .unwrap();

    assert!(store.is_favorite("ohm").await.unwrap());
    assert_eq!(store.draft().await.unwrap(), "L1: 16A, L2: 10A");

    let stats = store.record_launch().await.unwrap();
    assert_eq!(stats.launch_count, 42);
    assert_eq!(
        stats.first_launch.as_deref(),
        Some("2024-01-01T08:00:00.000Z")
    );

    for key in [StoreKey::Favorites, StoreKey::Stats, StoreKey::Draft] {
        assert_eq!(
            store.inspect(key).await.unwrap(),
            SlotStatus::Present { version: 1 }
        );
    }
}

#[tokio::test]
async fn test_corrupt_history_recovers() {
    let store = sqlite_store().await;
    store
        .backend()
        .set(StoreKey::History.key(), "not json at all")
        .await
        .unwrap();

    assert!(matches!(
        store.inspect(StoreKey::History).await.unwrap(),
        SlotStatus::Recovered { .. }
    ));
    assert!(store.history().await.unwrap().is_empty());
    assert!(store.verify(StoreKey::History).await.is_err());
    assert_eq!(
        store.inspect(StoreKey::Templates).await.unwrap(),
        SlotStatus::Missing
    );
}

#[tokio::test]
async fn test_file_backend_persists_across_sessions() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("mastercalc.db");

    {
        let backend = SqliteStore::open(&path).await.unwrap();
        let store = PersistenceStore::with_clock(backend.clone(), FixedClock::from_millis(0));
        store.record_launch().await.unwrap();
        store.save_draft("черновик").await.unwrap();
        store.toggle_favorite(CalculatorId::Grounding).await.unwrap();
        backend.close().await;
    }

    let backend = SqliteStore::open(&path).await.unwrap();
    let store = PersistenceStore::new(Backend::from(backend));
    assert_eq!(store.backend().name(), "sqlite");
    assert_eq!(store.draft().await.unwrap(), "черновик");
    assert!(store.is_favorite("grounding").await.unwrap());
    assert_eq!(store.record_launch().await.unwrap().launch_count, 2);
}

#[tokio::test]
async fn test_backends_behave_alike() {
    let memory = PersistenceStore::new(Backend::from(MemoryStore::new()));
    let sqlite = PersistenceStore::new(Backend::from(SqliteStore::in_memory().await.unwrap()));

    for store in [Arc::new(memory), Arc::new(sqlite)] {
        assert!(store.toggle_favorite(CalculatorId::Motor).await.unwrap());
        store.save_template("A").await.unwrap();
        store.save_template("B").await.unwrap();
        assert_eq!(store.template(1).await.unwrap().name, "B");
        store.clear_templates().await.unwrap();
        assert!(store.templates().await.unwrap().is_empty());
        assert_eq!(store.favorites().await.unwrap().len(), 1);
    }
}
