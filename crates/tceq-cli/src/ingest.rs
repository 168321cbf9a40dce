//! Drives the store from a JSON-lines file of scraped records.
//!
//! Each non-blank line is one [`Record`]. By default the first failing line
//! aborts the run; with `keep_going` failures are logged, collected and the
//! remaining lines are still applied.

use std::io::BufRead;

use anyhow::Context as _;
use serde::Serialize;
use tceq_core::{
  record::Record,
  store::{IngestSummary, WaterStore},
};

#[derive(Debug, Clone, Copy, Default)]
pub struct IngestOptions {
  /// Skip failing lines instead of aborting.
  pub keep_going: bool,
  /// Apply all records in one transaction.
  pub batch:      bool,
}

/// A line that could not be parsed or persisted.
#[derive(Debug, Clone, Serialize)]
pub struct FailedLine {
  pub line:  usize,
  pub error: String,
}

#[derive(Debug, Default, Serialize)]
pub struct IngestReport {
  pub summary: IngestSummary,
  pub failed:  Vec<FailedLine>,
}

impl IngestReport {
  fn fail(&mut self, line: usize, error: impl std::fmt::Display) {
    tracing::warn!(line, %error, "skipping record");
    self.failed.push(FailedLine { line, error: error.to_string() });
  }
}

pub async fn run<S: WaterStore>(
  store: &S,
  input: impl BufRead,
  opts: IngestOptions,
) -> anyhow::Result<IngestReport> {
  let mut report = IngestReport::default();
  let mut parsed: Vec<Record> = Vec::new();

  for (idx, line) in input.lines().enumerate() {
    let line_no = idx + 1;
    let line = line.with_context(|| format!("failed to read line {line_no}"))?;
    if line.trim().is_empty() {
      continue;
    }

    let record = match Record::from_json(&line) {
      Ok(record) => record,
      Err(e) if opts.keep_going => {
        report.fail(line_no, e);
        continue;
      }
      Err(e) => return Err(e).with_context(|| format!("invalid record on line {line_no}")),
    };

    if opts.batch {
      parsed.push(record);
      continue;
    }

    let outcome = match &record {
      Record::WaterSystem(ws) => store.upsert_water_system(ws).await,
      Record::Relationship(rel) => store.upsert_relationship(rel).await,
    };
    match outcome {
      Ok(outcome) => report.summary.record(&record, outcome),
      Err(e) if opts.keep_going => report.fail(line_no, e),
      Err(e) => {
        return Err(e).with_context(|| format!("failed to store {} on line {line_no}", record.kind()));
      }
    }
  }

  if opts.batch {
    report.summary = store
      .ingest(parsed)
      .await
      .context("batch ingest failed; nothing was written")?;
  }

  tracing::info!(
    stored = report.summary.total(),
    failed = report.failed.len(),
    "ingest finished"
  );
  Ok(report)
}
