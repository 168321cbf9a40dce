//! Buyer/seller relationships and the availability codes that classify them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::water_system::WaterSystemNo;

/// An entry in the availability-code lookup table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilityCode {
  pub id:   i64,
  pub code: String,
}

/// A relationship as submitted for persistence.
///
/// `availability` is the human-readable code; the store resolves it to an
/// [`AvailabilityCode::id`] at write time, ignoring surrounding whitespace
/// the same way seeding does.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewRelationship {
  pub seller:       WaterSystemNo,
  pub buyer:        WaterSystemNo,
  pub population:   i64,
  pub availability: String,
  /// When the relationship was first observed. Only the first non-null value
  /// is ever kept.
  #[serde(default)]
  pub created:      Option<DateTime<Utc>>,
}

impl NewRelationship {
  pub fn new(
    seller: WaterSystemNo,
    buyer: WaterSystemNo,
    population: i64,
    availability: impl Into<String>,
  ) -> Self {
    Self {
      seller,
      buyer,
      population,
      availability: availability.into(),
      created: None,
    }
  }

  pub fn with_created(mut self, created: DateTime<Utc>) -> Self {
    self.created = Some(created);
    self
  }
}

/// A relationship as stored: one row per `(seller, buyer)` pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuyerSellerRelationship {
  pub seller:       WaterSystemNo,
  pub buyer:        WaterSystemNo,
  pub population:   i64,
  /// Resolved availability id, or `None` when the submitted code was unknown.
  pub availability: Option<i64>,
  pub created:      Option<DateTime<Utc>>,
}
