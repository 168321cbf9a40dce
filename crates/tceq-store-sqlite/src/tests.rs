//! Integration tests for `SqliteStore` against an in-memory database.

use chrono::{TimeZone, Utc};
use tceq_core::{
  record::Record,
  relationship::NewRelationship,
  store::{UpsertOutcome, WaterStore},
  water_system::{WaterSystem, WaterSystemNo},
};

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn no(s: &str) -> WaterSystemNo { WaterSystemNo::new(s).unwrap() }

fn system(number: &str, name: &str) -> WaterSystem {
  WaterSystem {
    water_system_no: no(number),
    name:            name.into(),
    state_code:      "TX".into(),
    is_no:           false,
  }
}

/// A store with code "A" seeded (id 1), plus two water systems.
async fn seeded() -> SqliteStore {
  let s = store().await;
  s.seed_availability_codes(vec!["A".into(), "B".into()])
    .await
    .unwrap();
  s.upsert_water_system(&system("TX0010001", "Example City"))
    .await
    .unwrap();
  s.upsert_water_system(&system("TX0010002", "Example Rural WSC"))
    .await
    .unwrap();
  s
}

// ─── Water systems ───────────────────────────────────────────────────────────

#[tokio::test]
async fn new_water_system_is_inserted() {
  let s = store().await;
  let ws = system("TX0010001", "Example City");

  let outcome = s.upsert_water_system(&ws).await.unwrap();
  assert_eq!(outcome, UpsertOutcome::Inserted);

  let fetched = s.get_water_system(&ws.water_system_no).await.unwrap();
  assert_eq!(fetched, Some(ws));
}

#[tokio::test]
async fn inserting_same_water_system_twice_leaves_one_row() {
  let s = store().await;
  let ws = system("TX0010001", "Example City");

  s.upsert_water_system(&ws).await.unwrap();
  let second = s.upsert_water_system(&ws).await.unwrap();
  assert_eq!(second, UpsertOutcome::Unchanged);

  let all = s.list_water_systems().await.unwrap();
  assert_eq!(all.len(), 1);
}

#[tokio::test]
async fn existing_water_system_is_never_overwritten() {
  let s = store().await;
  s.upsert_water_system(&system("TX0010001", "Example City"))
    .await
    .unwrap();

  let drifted = WaterSystem {
    water_system_no: no("TX0010001"),
    name:            "Renamed City".into(),
    state_code:      "OK".into(),
    is_no:           true,
  };
  let outcome = s.upsert_water_system(&drifted).await.unwrap();
  assert_eq!(outcome, UpsertOutcome::Unchanged);

  let stored = s.get_water_system(&no("TX0010001")).await.unwrap().unwrap();
  assert_eq!(stored.name, "Example City");
  assert_eq!(stored.state_code, "TX");
  assert!(!stored.is_no);
}

#[tokio::test]
async fn padded_number_matches_trimmed_row() {
  let s = store().await;
  s.upsert_water_system(&system("TX2270001", "Austin"))
    .await
    .unwrap();

  let outcome = s
    .upsert_water_system(&system("TX2270001   ", "Austin"))
    .await
    .unwrap();
  assert_eq!(outcome, UpsertOutcome::Unchanged);
}

#[tokio::test]
async fn missing_water_system_returns_none() {
  let s = store().await;
  assert!(s.get_water_system(&no("TX9999999")).await.unwrap().is_none());
}

// ─── Availability codes ──────────────────────────────────────────────────────

#[tokio::test]
async fn seeding_assigns_ids_in_order_and_is_idempotent() {
  let s = store().await;

  let first = s
    .seed_availability_codes(vec!["A".into(), "B".into()])
    .await
    .unwrap();
  assert_eq!(first.len(), 2);
  assert_eq!(first[0].code, "A");
  assert_eq!(first[0].id, 1);

  let again = s
    .seed_availability_codes(vec!["B".into(), " C ".into(), "".into()])
    .await
    .unwrap();
  let codes: Vec<_> = again.iter().map(|c| c.code.as_str()).collect();
  assert_eq!(codes, ["A", "B", "C"]);
  assert_eq!(again[0].id, 1);

  assert_eq!(s.resolve_availability("C").await.unwrap(), Some(again[2].id));
  assert_eq!(s.resolve_availability("Z").await.unwrap(), None);
  assert_eq!(s.list_availability_codes().await.unwrap(), again);
}

// ─── Relationships ───────────────────────────────────────────────────────────

#[tokio::test]
async fn relationship_resolves_availability_id() {
  let s = seeded().await;
  let rel = NewRelationship::new(no("TX0010001"), no("TX0010002"), 500, "A");

  let outcome = s.upsert_relationship(&rel).await.unwrap();
  assert_eq!(outcome, UpsertOutcome::Inserted);

  let stored = s
    .get_relationship(&rel.seller, &rel.buyer)
    .await
    .unwrap()
    .unwrap();
  assert_eq!(stored.population, 500);
  assert_eq!(stored.availability, Some(1));
  assert!(stored.created.is_none());
}

#[tokio::test]
async fn second_relationship_upsert_replaces_payload() {
  let s = seeded().await;
  let seller = no("TX0010001");
  let buyer = no("TX0010002");

  s.upsert_relationship(&NewRelationship::new(seller.clone(), buyer.clone(), 500, "A"))
    .await
    .unwrap();
  let outcome = s
    .upsert_relationship(&NewRelationship::new(seller.clone(), buyer.clone(), 600, "A"))
    .await
    .unwrap();
  assert_eq!(outcome, UpsertOutcome::Replaced);

  let rels = s.relationships_for(&seller).await.unwrap();
  assert_eq!(rels.len(), 1);
  assert_eq!(rels[0].population, 600);
  assert_eq!(rels[0].availability, Some(1));
}

#[tokio::test]
async fn padded_code_resolves_to_seeded_code() {
  let s = seeded().await;
  let table = s.seed_availability_codes(vec![" Z ".into()]).await.unwrap();
  let z = table.iter().find(|c| c.code == "Z").unwrap().id;

  assert_eq!(s.resolve_availability(" Z ").await.unwrap(), Some(z));

  let rel = NewRelationship::new(no("TX0010001"), no("TX0010002"), 75, " Z ");
  s.upsert_relationship(&rel).await.unwrap();

  let stored = s
    .get_relationship(&rel.seller, &rel.buyer)
    .await
    .unwrap()
    .unwrap();
  assert_eq!(stored.availability, Some(z));
}

#[tokio::test]
async fn replacement_takes_new_availability() {
  let s = seeded().await;
  let seller = no("TX0010001");
  let buyer = no("TX0010002");

  s.upsert_relationship(&NewRelationship::new(seller.clone(), buyer.clone(), 500, "A"))
    .await
    .unwrap();
  s.upsert_relationship(&NewRelationship::new(seller.clone(), buyer.clone(), 500, "B"))
    .await
    .unwrap();

  let stored = s.get_relationship(&seller, &buyer).await.unwrap().unwrap();
  assert_eq!(stored.availability, Some(2));
}

#[tokio::test]
async fn unknown_availability_code_is_stored_as_null() {
  let s = seeded().await;
  let rel = NewRelationship::new(no("TX0010001"), no("TX0010002"), 120, "NOPE");

  s.upsert_relationship(&rel).await.unwrap();

  let stored = s
    .get_relationship(&rel.seller, &rel.buyer)
    .await
    .unwrap()
    .unwrap();
  assert_eq!(stored.population, 120);
  assert_eq!(stored.availability, None);
}

#[tokio::test]
async fn unknown_code_on_replace_clears_previous_availability() {
  let s = seeded().await;
  let seller = no("TX0010001");
  let buyer = no("TX0010002");

  s.upsert_relationship(&NewRelationship::new(seller.clone(), buyer.clone(), 500, "A"))
    .await
    .unwrap();
  s.upsert_relationship(&NewRelationship::new(seller.clone(), buyer.clone(), 500, "NOPE"))
    .await
    .unwrap();

  let stored = s.get_relationship(&seller, &buyer).await.unwrap().unwrap();
  assert_eq!(stored.availability, None);
}

#[tokio::test]
async fn created_keeps_first_observation() {
  let s = seeded().await;
  let seller = no("TX0010001");
  let buyer = no("TX0010002");
  let first_seen = Utc.with_ymd_and_hms(2024, 1, 15, 8, 0, 0).unwrap();
  let later = Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap();

  s.upsert_relationship(
    &NewRelationship::new(seller.clone(), buyer.clone(), 500, "A").with_created(first_seen),
  )
  .await
  .unwrap();

  // Without a timestamp the recorded one survives.
  s.upsert_relationship(&NewRelationship::new(seller.clone(), buyer.clone(), 550, "A"))
    .await
    .unwrap();
  let stored = s.get_relationship(&seller, &buyer).await.unwrap().unwrap();
  assert_eq!(stored.population, 550);
  assert_eq!(stored.created, Some(first_seen));

  // A later timestamp does not move it forward either.
  s.upsert_relationship(
    &NewRelationship::new(seller.clone(), buyer.clone(), 600, "A").with_created(later),
  )
  .await
  .unwrap();
  let stored = s.get_relationship(&seller, &buyer).await.unwrap().unwrap();
  assert_eq!(stored.population, 600);
  assert_eq!(stored.created, Some(first_seen));
}

#[tokio::test]
async fn created_is_filled_when_previously_absent() {
  let s = seeded().await;
  let seller = no("TX0010001");
  let buyer = no("TX0010002");
  let seen = Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap();

  s.upsert_relationship(&NewRelationship::new(seller.clone(), buyer.clone(), 500, "A"))
    .await
    .unwrap();
  s.upsert_relationship(
    &NewRelationship::new(seller.clone(), buyer.clone(), 500, "A").with_created(seen),
  )
  .await
  .unwrap();

  let stored = s.get_relationship(&seller, &buyer).await.unwrap().unwrap();
  assert_eq!(stored.created, Some(seen));
}

#[tokio::test]
async fn relationship_to_unknown_water_system_is_a_storage_error() {
  let s = seeded().await;
  let rel = NewRelationship::new(no("TX0010001"), no("TX0099999"), 10, "A");

  let err = s.upsert_relationship(&rel).await.unwrap_err();
  assert!(err.is_constraint_violation(), "unexpected error: {err}");
  assert!(s.get_relationship(&rel.seller, &rel.buyer).await.unwrap().is_none());
}

#[tokio::test]
async fn relationships_for_matches_seller_and_buyer() {
  let s = seeded().await;
  s.upsert_water_system(&system("TX0010003", "Third WSC"))
    .await
    .unwrap();

  s.upsert_relationship(&NewRelationship::new(no("TX0010001"), no("TX0010002"), 1, "A"))
    .await
    .unwrap();
  s.upsert_relationship(&NewRelationship::new(no("TX0010003"), no("TX0010001"), 2, "A"))
    .await
    .unwrap();
  s.upsert_relationship(&NewRelationship::new(no("TX0010002"), no("TX0010003"), 3, "A"))
    .await
    .unwrap();

  let rels = s.relationships_for(&no("TX0010001")).await.unwrap();
  let pops: Vec<_> = rels.iter().map(|r| r.population).collect();
  assert_eq!(pops, [1, 2]);
}

// ─── Batch ingest ────────────────────────────────────────────────────────────

#[tokio::test]
async fn ingest_counts_outcomes() {
  let s = store().await;
  s.seed_availability_codes(vec!["A".into()]).await.unwrap();

  let records: Vec<Record> = vec![
    system("TX0010001", "Example City").into(),
    system("TX0010002", "Example Rural WSC").into(),
    system("TX0010001", "Example City").into(),
    NewRelationship::new(no("TX0010001"), no("TX0010002"), 500, "A").into(),
    NewRelationship::new(no("TX0010001"), no("TX0010002"), 600, "A").into(),
  ];

  let summary = s.ingest(records).await.unwrap();
  assert_eq!(summary.water_systems_inserted, 2);
  assert_eq!(summary.water_systems_unchanged, 1);
  assert_eq!(summary.relationships_inserted, 1);
  assert_eq!(summary.relationships_replaced, 1);
  assert_eq!(summary.total(), 5);

  let stored = s
    .get_relationship(&no("TX0010001"), &no("TX0010002"))
    .await
    .unwrap()
    .unwrap();
  assert_eq!(stored.population, 600);
}

#[tokio::test]
async fn failed_ingest_rolls_back_whole_batch() {
  let s = store().await;

  let records: Vec<Record> = vec![
    system("TX0010001", "Example City").into(),
    NewRelationship::new(no("TX0010001"), no("TX0099999"), 500, "A").into(),
  ];

  let err = s.ingest(records).await.unwrap_err();
  assert!(err.is_constraint_violation());
  assert!(s.list_water_systems().await.unwrap().is_empty());
}

// ─── Persistence ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn reopening_file_store_keeps_rows() {
  let path = std::env::temp_dir().join(format!(
    "tceq-store-test-{}-{}.sqlite",
    std::process::id(),
    Utc::now().timestamp_nanos_opt().unwrap_or_default(),
  ));

  {
    let s = SqliteStore::open(&path).await.unwrap();
    s.upsert_water_system(&system("TX0010001", "Example City"))
      .await
      .unwrap();
  }

  let s = SqliteStore::open(&path).await.unwrap();
  let all = s.list_water_systems().await.unwrap();
  assert_eq!(all.len(), 1);
  assert_eq!(all[0].name, "Example City");

  drop(s);
  for suffix in ["", "-wal", "-shm"] {
    let _ = std::fs::remove_file(format!("{}{suffix}", path.display()));
  }
}

#[tokio::test]
async fn two_handles_on_one_file_agree_on_outcome() {
  let path = std::env::temp_dir().join(format!(
    "tceq-store-shared-{}-{}.sqlite",
    std::process::id(),
    Utc::now().timestamp_nanos_opt().unwrap_or_default(),
  ));

  let first = SqliteStore::open(&path).await.unwrap();
  let second = SqliteStore::open(&path).await.unwrap();
  first.seed_availability_codes(vec!["A".into()]).await.unwrap();
  first
    .upsert_water_system(&system("TX0010001", "Example City"))
    .await
    .unwrap();
  first
    .upsert_water_system(&system("TX0010002", "Example Rural WSC"))
    .await
    .unwrap();

  let rel = NewRelationship::new(no("TX0010001"), no("TX0010002"), 500, "A");
  assert_eq!(first.upsert_relationship(&rel).await.unwrap(), UpsertOutcome::Inserted);

  let update = NewRelationship::new(no("TX0010001"), no("TX0010002"), 650, "A");
  assert_eq!(second.upsert_relationship(&update).await.unwrap(), UpsertOutcome::Replaced);

  let stored = first
    .get_relationship(&rel.seller, &rel.buyer)
    .await
    .unwrap()
    .unwrap();
  assert_eq!(stored.population, 650);

  drop(first);
  drop(second);
  for suffix in ["", "-wal", "-shm"] {
    let _ = std::fs::remove_file(format!("{}{suffix}", path.display()));
  }
}
