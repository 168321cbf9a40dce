//! Ingest records, the tagged envelope handed over by the scraper.

use serde::{Deserialize, Serialize};

use crate::{relationship::NewRelationship, water_system::WaterSystem, Result};

/// One scraped record, as it appears on a line of an ingest file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Record {
  WaterSystem(WaterSystem),
  Relationship(NewRelationship),
}

impl Record {
  /// Parse a single JSON-encoded record.
  pub fn from_json(line: &str) -> Result<Self> { Ok(serde_json::from_str(line)?) }

  pub fn kind(&self) -> &'static str {
    match self {
      Record::WaterSystem(_) => "water_system",
      Record::Relationship(_) => "relationship",
    }
  }
}

impl From<WaterSystem> for Record {
  fn from(ws: WaterSystem) -> Self { Record::WaterSystem(ws) }
}

impl From<NewRelationship> for Record {
  fn from(rel: NewRelationship) -> Self { Record::Relationship(rel) }
}
