//! [`SqliteStore`], the SQLite implementation of [`WaterStore`].

use std::path::Path;

use rusqlite::{named_params, OptionalExtension as _};

use tceq_core::{
  record::Record,
  relationship::{AvailabilityCode, BuyerSellerRelationship, NewRelationship},
  store::{IngestSummary, UpsertOutcome, WaterStore},
  water_system::{WaterSystem, WaterSystemNo},
};

use crate::{
  encode::{availability_from_row, encode_dt, RawRelationship, RawWaterSystem},
  queries::*,
  schema::SCHEMA,
  Error, Result,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A water-system store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let path = path.as_ref();
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    tracing::info!(path = %path.display(), "opened water-system store");
    Ok(store)
  }

  /// Open an in-memory store, useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── Write helpers ───────────────────────────────────────────────────────────
//
// These run on the connection thread and take a plain `rusqlite::Connection`
// so the same code serves single calls and transactional batches.

fn write_water_system(
  conn: &rusqlite::Connection,
  ws: &WaterSystem,
) -> rusqlite::Result<UpsertOutcome> {
  let changed = conn.execute(
    INSERT_WATER_SYSTEM,
    named_params! {
      ":water_system_no": ws.water_system_no.as_str(),
      ":name":            ws.name,
      ":state_code":      ws.state_code,
      ":is_no":           ws.is_no,
    },
  )?;

  let outcome = if changed == 0 {
    UpsertOutcome::Unchanged
  } else {
    UpsertOutcome::Inserted
  };
  tracing::debug!(water_system_no = %ws.water_system_no, ?outcome, "water system upsert");
  Ok(outcome)
}

fn write_relationship(
  conn: &rusqlite::Connection,
  rel: &NewRelationship,
) -> rusqlite::Result<UpsertOutcome> {
  let existed = conn
    .query_row(
      RELATIONSHIP_EXISTS,
      named_params! {
        ":seller": rel.seller.as_str(),
        ":buyer":  rel.buyer.as_str(),
      },
      |_| Ok(()),
    )
    .optional()?
    .is_some();

  let created = rel.created.map(encode_dt);
  let availability: Option<i64> = conn.query_row(
    UPSERT_RELATIONSHIP,
    named_params! {
      ":seller":            rel.seller.as_str(),
      ":buyer":             rel.buyer.as_str(),
      ":population":        rel.population,
      ":availability":      rel.availability.trim(),
      ":created_timestamp": created,
    },
    |row| row.get(0),
  )?;

  if availability.is_none() {
    tracing::warn!(
      seller = %rel.seller,
      buyer = %rel.buyer,
      code = %rel.availability,
      "unknown availability code; stored as null"
    );
  }

  let outcome = if existed {
    UpsertOutcome::Replaced
  } else {
    UpsertOutcome::Inserted
  };
  tracing::debug!(seller = %rel.seller, buyer = %rel.buyer, ?outcome, "relationship upsert");
  Ok(outcome)
}

fn write_record(conn: &rusqlite::Connection, record: &Record) -> rusqlite::Result<UpsertOutcome> {
  match record {
    Record::WaterSystem(ws) => write_water_system(conn, ws),
    Record::Relationship(rel) => write_relationship(conn, rel),
  }
}

// ─── WaterStore impl ─────────────────────────────────────────────────────────

impl WaterStore for SqliteStore {
  type Error = Error;

  // ── Writes ────────────────────────────────────────────────────────────────

  async fn upsert_water_system(&self, system: &WaterSystem) -> Result<UpsertOutcome> {
    let system = system.clone();
    let outcome = self
      .conn
      .call(move |conn| Ok(write_water_system(conn, &system)?))
      .await?;
    Ok(outcome)
  }

  async fn upsert_relationship(&self, rel: &NewRelationship) -> Result<UpsertOutcome> {
    let rel = rel.clone();
    let outcome = self
      .conn
      .call(move |conn| {
        // Immediate, so the existence check and the upsert see the same row.
        let tx = conn.transaction_with_behavior(rusqlite::TransactionBehavior::Immediate)?;
        let outcome = write_relationship(&tx, &rel)?;
        tx.commit()?;
        Ok(outcome)
      })
      .await?;
    Ok(outcome)
  }

  async fn ingest(&self, records: Vec<Record>) -> Result<IngestSummary> {
    let summary = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let mut summary = IngestSummary::default();
        for record in &records {
          let outcome = write_record(&tx, record)?;
          summary.record(record, outcome);
        }
        tx.commit()?;
        Ok(summary)
      })
      .await?;

    tracing::info!(records = summary.total(), "ingested batch");
    Ok(summary)
  }

  async fn seed_availability_codes(&self, codes: Vec<String>) -> Result<Vec<AvailabilityCode>> {
    let codes: Vec<String> = codes
      .into_iter()
      .map(|c| c.trim().to_owned())
      .filter(|c| !c.is_empty())
      .collect();

    let table = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        {
          let mut insert = tx.prepare(INSERT_AVAILABILITY_CODE)?;
          for code in &codes {
            insert.execute(rusqlite::params![code])?;
          }
        }
        let table = {
          let mut select = tx.prepare(SELECT_AVAILABILITY_CODES)?;
          select
            .query_map([], availability_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?
        };
        tx.commit()?;
        Ok(table)
      })
      .await?;

    tracing::debug!(codes = table.len(), "availability codes seeded");
    Ok(table)
  }

  // ── Reads ─────────────────────────────────────────────────────────────────

  async fn get_water_system(&self, no: &WaterSystemNo) -> Result<Option<WaterSystem>> {
    let no_str = no.as_str().to_owned();

    let raw: Option<RawWaterSystem> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(SELECT_WATER_SYSTEM, rusqlite::params![no_str], RawWaterSystem::from_row)
            .optional()?,
        )
      })
      .await?;

    raw.map(RawWaterSystem::into_water_system).transpose()
  }

  async fn list_water_systems(&self) -> Result<Vec<WaterSystem>> {
    let raws: Vec<RawWaterSystem> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(SELECT_WATER_SYSTEMS)?;
        let rows = stmt
          .query_map([], RawWaterSystem::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawWaterSystem::into_water_system).collect()
  }

  async fn get_relationship(
    &self,
    seller: &WaterSystemNo,
    buyer:  &WaterSystemNo,
  ) -> Result<Option<BuyerSellerRelationship>> {
    let seller_str = seller.as_str().to_owned();
    let buyer_str  = buyer.as_str().to_owned();

    let raw: Option<RawRelationship> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              SELECT_RELATIONSHIP,
              rusqlite::params![seller_str, buyer_str],
              RawRelationship::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawRelationship::into_relationship).transpose()
  }

  async fn relationships_for(&self, no: &WaterSystemNo) -> Result<Vec<BuyerSellerRelationship>> {
    let no_str = no.as_str().to_owned();

    let raws: Vec<RawRelationship> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(SELECT_RELATIONSHIPS_FOR)?;
        let rows = stmt
          .query_map(rusqlite::params![no_str], RawRelationship::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawRelationship::into_relationship).collect()
  }

  async fn list_availability_codes(&self) -> Result<Vec<AvailabilityCode>> {
    let codes = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(SELECT_AVAILABILITY_CODES)?;
        let rows = stmt
          .query_map([], availability_from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(codes)
  }

  async fn resolve_availability(&self, code: &str) -> Result<Option<i64>> {
    let code = code.trim().to_owned();

    let id: Option<i64> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(SELECT_AVAILABILITY_ID, rusqlite::params![code], |row| row.get(0))
            .optional()?,
        )
      })
      .await?;
    Ok(id)
  }
}
