//! Encoding and decoding helpers between domain types and the plain
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings. Water system numbers are stored
//! trimmed, exactly as [`WaterSystemNo`] holds them.

use chrono::{DateTime, Utc};
use tceq_core::{
  relationship::{AvailabilityCode, BuyerSellerRelationship},
  water_system::{WaterSystem, WaterSystemNo},
};

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── WaterSystemNo ───────────────────────────────────────────────────────────

pub fn decode_no(s: &str) -> Result<WaterSystemNo> { Ok(WaterSystemNo::new(s)?) }

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw values read directly from a `water_systems` row.
pub struct RawWaterSystem {
  pub water_system_no: String,
  pub name:            String,
  pub state_code:      String,
  pub is_no:           bool,
}

impl RawWaterSystem {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      water_system_no: row.get(0)?,
      name:            row.get(1)?,
      state_code:      row.get(2)?,
      is_no:           row.get(3)?,
    })
  }

  pub fn into_water_system(self) -> Result<WaterSystem> {
    Ok(WaterSystem {
      water_system_no: decode_no(&self.water_system_no)?,
      name:            self.name,
      state_code:      self.state_code,
      is_no:           self.is_no,
    })
  }
}

/// Raw values read directly from a `water_buyer_relationships` row.
pub struct RawRelationship {
  pub seller:       String,
  pub buyer:        String,
  pub population:   i64,
  pub availability: Option<i64>,
  pub created:      Option<String>,
}

impl RawRelationship {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      seller:       row.get(0)?,
      buyer:        row.get(1)?,
      population:   row.get(2)?,
      availability: row.get(3)?,
      created:      row.get(4)?,
    })
  }

  pub fn into_relationship(self) -> Result<BuyerSellerRelationship> {
    Ok(BuyerSellerRelationship {
      seller:       decode_no(&self.seller)?,
      buyer:        decode_no(&self.buyer)?,
      population:   self.population,
      availability: self.availability,
      created:      self.created.as_deref().map(decode_dt).transpose()?,
    })
  }
}

pub fn availability_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<AvailabilityCode> {
  Ok(AvailabilityCode {
    id:   row.get(0)?,
    code: row.get(1)?,
  })
}
