use realm_database::Database;
use realm_kernel::domain::config::RegistryConfig;
use realm_kernel::domain::{KingdomId, SpatialKey};
use realm_kernel::safe_nanoid;
use realm_registry::{KingdomRegistry, RegistryError, StoreError};
use std::time::Duration;

/// Each test gets its own in-memory database and worker pool.
async fn fresh_registry() -> KingdomRegistry {
    KingdomRegistry::connect(&RegistryConfig::default())
        .await
        .unwrap()
}

fn new_id() -> KingdomId {
    safe_nanoid!().into()
}

#[tokio::test]
async fn unknown_name_resolves_to_none() {
    let registry = fresh_registry().await;

    let found = registry.kingdom_by_name("Nowhere").await.unwrap();
    assert!(found.is_none());

    registry.shutdown();
}

#[tokio::test]
async fn created_kingdom_is_resolvable_by_name() {
    let registry = fresh_registry().await;
    let id = new_id();

    let created = registry
        .create_kingdom(id.clone(), "Aldmere", "A quiet river kingdom")
        .await
        .unwrap();
    assert!(created);

    let kingdom = registry.kingdom_by_name("Aldmere").await.unwrap().unwrap();
    assert_eq!(kingdom.id, id);
    assert_eq!(kingdom.name, "Aldmere");
    assert_eq!(kingdom.description, "A quiet river kingdom");

    // Exact match only, no case folding.
    assert!(registry.kingdom_by_name("aldmere").await.unwrap().is_none());

    registry.shutdown();
}

#[tokio::test]
async fn duplicate_name_creates_only_once() {
    let registry = fresh_registry().await;
    let first = new_id();
    let second = new_id();

    assert!(registry.create_kingdom(first.clone(), "Aldmere", "").await.unwrap());
    assert!(!registry.create_kingdom(second, "Aldmere", "").await.unwrap());

    // The losing create left no trace; the original row is untouched.
    let kingdom = registry.kingdom_by_name("Aldmere").await.unwrap().unwrap();
    assert_eq!(kingdom.id, first);

    registry.shutdown();
}

#[tokio::test]
async fn fresh_kingdom_holds_nothing() {
    let registry = fresh_registry().await;
    let id = new_id();

    assert!(registry.create_kingdom(id.clone(), "Aldmere", "").await.unwrap());

    let holdings = registry.holdings(id).await.unwrap();
    assert!(holdings.is_empty());

    registry.shutdown();
}

#[tokio::test]
async fn unclaimed_position_has_no_owner() {
    let registry = fresh_registry().await;

    let owner = registry
        .kingdom_at(SpatialKey::new("overworld", 12, -7))
        .await
        .unwrap();
    assert!(owner.is_none());

    registry.shutdown();
}

#[tokio::test]
async fn claim_and_release_round_trip() {
    let registry = fresh_registry().await;
    let id = new_id();
    let key = SpatialKey::new("overworld", 4, 4);

    assert!(registry.create_kingdom(id.clone(), "Aldmere", "").await.unwrap());
    assert!(registry.claim(id.clone(), key.clone()).await.unwrap());

    let owner = registry.kingdom_at(key.clone()).await.unwrap().unwrap();
    assert_eq!(owner.id, id);

    let holdings = registry.holdings(id.clone()).await.unwrap();
    assert_eq!(holdings.len(), 1);
    assert!(holdings.iter().all(|h| h.owner == id && h.key == key));

    // A second claim on the same position loses to the unique index.
    assert!(!registry.claim(id.clone(), key.clone()).await.unwrap());

    assert!(registry.release(key.clone()).await.unwrap());
    assert!(registry.kingdom_at(key.clone()).await.unwrap().is_none());

    // Releasing a free position reports that nothing existed.
    assert!(!registry.release(key).await.unwrap());

    registry.shutdown();
}

#[tokio::test]
async fn removing_kingdom_releases_its_holdings() {
    let registry = fresh_registry().await;
    let id = new_id();
    let key = SpatialKey::new("overworld", -3, 9);

    assert!(registry.create_kingdom(id.clone(), "Aldmere", "").await.unwrap());
    assert!(registry.claim(id.clone(), key.clone()).await.unwrap());

    assert!(registry.remove_kingdom(id.clone()).await.unwrap());

    // The kingdom and every one of its holdings are gone together.
    assert!(registry.kingdom_by_name("Aldmere").await.unwrap().is_none());
    assert!(registry.kingdom_at(key).await.unwrap().is_none());

    // Removing again reports that nothing existed.
    assert!(!registry.remove_kingdom(id).await.unwrap());

    registry.shutdown();
}

#[tokio::test]
async fn concurrent_same_name_creates_admit_exactly_one() {
    let registry = fresh_registry().await;

    let ids: Vec<_> = (0..8).map(|_| new_id()).collect();
    let pending: Vec<_> = ids
        .iter()
        .map(|id| registry.create_kingdom(id.clone(), "Aldmere", ""))
        .collect();

    let mut winners = Vec::new();
    for (id, request) in ids.iter().zip(pending) {
        if request.await.unwrap() {
            winners.push(id.clone());
        }
    }
    assert_eq!(winners.len(), 1);

    // Exactly one row survives, and it belongs to the winning create.
    let kingdom = registry.kingdom_by_name("Aldmere").await.unwrap().unwrap();
    assert_eq!(kingdom.id, winners[0]);

    registry.shutdown();
}

#[tokio::test]
async fn dropped_pending_leaves_registry_usable() {
    let registry = fresh_registry().await;
    let id = new_id();

    // Abandon the result; the worker still runs the create to completion.
    drop(registry.create_kingdom(id, "Aldmere", ""));

    let kingdom = tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            if let Some(kingdom) = registry.kingdom_by_name("Aldmere").await.unwrap() {
                break kingdom;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("abandoned create should still land within the deadline");
    assert_eq!(kingdom.name, "Aldmere");

    registry.shutdown();
}

#[tokio::test]
async fn claim_for_unknown_kingdom_is_rejected() {
    let registry = fresh_registry().await;
    let key = SpatialKey::new("overworld", 77, 77);

    // No kingdom row exists for this id; the claim must not leave a holding
    // behind, and the position must stay cleanly resolvable and claimable.
    assert!(!registry.claim(KingdomId::new("ghost"), key.clone()).await.unwrap());
    assert!(registry.kingdom_at(key.clone()).await.unwrap().is_none());

    let id = new_id();
    assert!(registry.create_kingdom(id.clone(), "Aldmere", "").await.unwrap());
    assert!(registry.claim(id.clone(), key.clone()).await.unwrap());
    assert_eq!(registry.kingdom_at(key).await.unwrap().unwrap().id, id);

    registry.shutdown();
}

#[tokio::test]
async fn expired_deadline_surfaces_as_timeout() {
    let database = Database::builder()
        .url("mem://")
        .session("realm", "registry")
        .init()
        .await
        .unwrap();
    let registry = KingdomRegistry::builder()
        .database(database)
        .timeout(Duration::from_nanos(1))
        .build()
        .unwrap();

    let error = registry.kingdom_by_name("Aldmere").await.unwrap_err();
    assert!(matches!(
        error,
        RegistryError::Store { source: StoreError::Timeout { .. }, .. }
    ));

    registry.shutdown();
}

#[tokio::test]
async fn configured_timeout_still_completes_fast_requests() {
    let mut config = RegistryConfig::default();
    config.request_timeout_ms = Some(5_000);
    let registry = KingdomRegistry::connect(&config).await.unwrap();

    assert!(registry.create_kingdom(new_id(), "Aldmere", "").await.unwrap());
    assert!(registry.kingdom_by_name("Aldmere").await.unwrap().is_some());

    registry.shutdown();
}

#[test]
fn building_without_database_is_rejected() {
    let error = KingdomRegistry::builder().build().unwrap_err();
    assert!(matches!(error, RegistryError::Validation { .. }));
}
