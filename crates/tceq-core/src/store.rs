//! The `WaterStore` trait and the outcome types it reports.
//!
//! Implemented by storage backends (e.g. `tceq-store-sqlite`). The ingest
//! driver depends on this abstraction, not on a concrete backend.

use std::future::Future;

use serde::Serialize;

use crate::{
  record::Record,
  relationship::{AvailabilityCode, BuyerSellerRelationship, NewRelationship},
  water_system::{WaterSystem, WaterSystemNo},
};

// ─── Outcomes ────────────────────────────────────────────────────────────────

/// What an upsert did to the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UpsertOutcome {
  /// A new row was written.
  Inserted,
  /// An existing row was overwritten with the new payload.
  Replaced,
  /// The row already existed and was left untouched.
  Unchanged,
}

/// Per-kind counts for a batch of ingested records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IngestSummary {
  pub water_systems_inserted:  usize,
  pub water_systems_unchanged: usize,
  pub relationships_inserted:  usize,
  pub relationships_replaced:  usize,
}

impl IngestSummary {
  pub fn record(&mut self, record: &Record, outcome: UpsertOutcome) {
    match (record, outcome) {
      (Record::WaterSystem(_), UpsertOutcome::Inserted) => self.water_systems_inserted += 1,
      (Record::WaterSystem(_), _) => self.water_systems_unchanged += 1,
      (Record::Relationship(_), UpsertOutcome::Inserted) => self.relationships_inserted += 1,
      (Record::Relationship(_), _) => self.relationships_replaced += 1,
    }
  }

  pub fn total(&self) -> usize {
    self.water_systems_inserted
      + self.water_systems_unchanged
      + self.relationships_inserted
      + self.relationships_replaced
  }
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a water-system store backend.
///
/// Water systems are insert-once. Relationships are keyed on
/// `(seller, buyer)` and replaced by each new observation, except for
/// `created`, which records the first observation only.
///
/// Nothing is ever deleted through this trait.
pub trait WaterStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Writes ────────────────────────────────────────────────────────────

  /// Insert `system` unless a row with the same number already exists.
  ///
  /// Returns [`UpsertOutcome::Unchanged`] when the number was already known,
  /// regardless of whether the other attributes differ.
  fn upsert_water_system<'a>(
    &'a self,
    system: &'a WaterSystem,
  ) -> impl Future<Output = Result<UpsertOutcome, Self::Error>> + Send + 'a;

  /// Write the relationship for `(seller, buyer)`, replacing any previous
  /// population and availability.
  ///
  /// An availability code with no entry in the lookup table is stored as a
  /// null reference, not rejected.
  fn upsert_relationship<'a>(
    &'a self,
    rel: &'a NewRelationship,
  ) -> impl Future<Output = Result<UpsertOutcome, Self::Error>> + Send + 'a;

  /// Apply `records` atomically: either every record is written or none is.
  fn ingest(
    &self,
    records: Vec<Record>,
  ) -> impl Future<Output = Result<IngestSummary, Self::Error>> + Send + '_;

  /// Add any missing codes to the lookup table and return the whole table.
  fn seed_availability_codes(
    &self,
    codes: Vec<String>,
  ) -> impl Future<Output = Result<Vec<AvailabilityCode>, Self::Error>> + Send + '_;

  // ── Reads ─────────────────────────────────────────────────────────────

  fn get_water_system<'a>(
    &'a self,
    no: &'a WaterSystemNo,
  ) -> impl Future<Output = Result<Option<WaterSystem>, Self::Error>> + Send + 'a;

  fn list_water_systems(
    &self,
  ) -> impl Future<Output = Result<Vec<WaterSystem>, Self::Error>> + Send + '_;

  fn get_relationship<'a>(
    &'a self,
    seller: &'a WaterSystemNo,
    buyer: &'a WaterSystemNo,
  ) -> impl Future<Output = Result<Option<BuyerSellerRelationship>, Self::Error>> + Send + 'a;

  /// All relationships where `no` is either the seller or the buyer.
  fn relationships_for<'a>(
    &'a self,
    no: &'a WaterSystemNo,
  ) -> impl Future<Output = Result<Vec<BuyerSellerRelationship>, Self::Error>> + Send + 'a;

  fn list_availability_codes(
    &self,
  ) -> impl Future<Output = Result<Vec<AvailabilityCode>, Self::Error>> + Send + '_;

  /// Look up the id of `code`. Returns `None` if the code is not seeded.
  fn resolve_availability<'a>(
    &'a self,
    code: &'a str,
  ) -> impl Future<Output = Result<Option<i64>, Self::Error>> + Send + 'a;
}
