//! Water systems: utilities identified by their regulatory number.
//!
//! A water system row is written once, the first time its number is seen.
//! Later observations with different attributes are ignored.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

// ─── Identifier ──────────────────────────────────────────────────────────────

/// A regulatory water system number such as `TX0010001`.
///
/// Surrounding whitespace is stripped on construction; the DWW detail pages
/// pad the number with trailing spaces. The empty string is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct WaterSystemNo(String);

impl WaterSystemNo {
  pub fn new(raw: impl AsRef<str>) -> Result<Self> {
    let trimmed = raw.as_ref().trim();
    if trimmed.is_empty() {
      return Err(Error::EmptyWaterSystemNo);
    }
    Ok(Self(trimmed.to_owned()))
  }

  pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for WaterSystemNo {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

impl AsRef<str> for WaterSystemNo {
  fn as_ref(&self) -> &str { &self.0 }
}

impl FromStr for WaterSystemNo {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> { Self::new(s) }
}

impl TryFrom<String> for WaterSystemNo {
  type Error = Error;

  fn try_from(s: String) -> Result<Self> { Self::new(s) }
}

impl From<WaterSystemNo> for String {
  fn from(no: WaterSystemNo) -> Self { no.0 }
}

// ─── Record ──────────────────────────────────────────────────────────────────

/// A water system as scraped from its detail page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaterSystem {
  pub water_system_no: WaterSystemNo,
  pub name:            String,
  pub state_code:      String,
  /// Stored as `0`/`1`.
  pub is_no:           bool,
}
