//! `tceq`: loads scraped TCEQ water-system records into a local SQLite store.
//!
//! Reads `tceq.toml` (or the path given with `--config`); any key can be
//! overridden with a `TCEQ_` environment variable, e.g. `TCEQ_STORE_PATH`.
//!
//! ```text
//! tceq init
//! tceq ingest records.jsonl --keep-going
//! tceq show TX0010001
//! ```

mod ingest;
mod settings;

use std::{fs::File, io::BufReader, path::PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use ingest::IngestOptions;
use serde::Serialize;
use settings::StoreConfig;
use tceq_core::{
  relationship::BuyerSellerRelationship,
  store::WaterStore,
  water_system::{WaterSystem, WaterSystemNo},
};
use tceq_store_sqlite::SqliteStore;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Water system record loader for TCEQ drinking water data")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "tceq.toml")]
  config: PathBuf,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// Create the store and seed the availability codes listed in the config.
  Init,
  /// Add availability codes to the lookup table.
  Seed {
    #[arg(required = true)]
    codes: Vec<String>,
  },
  /// Load a JSON-lines file of water system and relationship records.
  Ingest {
    file:       PathBuf,
    /// Log and skip failing records instead of aborting.
    #[arg(long)]
    keep_going: bool,
    /// Write all records in a single transaction.
    #[arg(long, conflicts_with = "keep_going")]
    batch:      bool,
  },
  /// Print a water system and its buyer/seller relationships.
  Show { water_system_no: WaterSystemNo },
}

#[derive(Serialize)]
struct SystemView {
  water_system:  WaterSystem,
  relationships: Vec<BuyerSellerRelationship>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .with_writer(std::io::stderr)
    .init();

  let cli = Cli::parse();
  let cfg = StoreConfig::load(&cli.config)?;

  let store = SqliteStore::open(&cfg.store_path)
    .await
    .with_context(|| format!("failed to open store at {:?}", cfg.store_path))?;

  match cli.command {
    Command::Init => {
      let codes = store
        .seed_availability_codes(cfg.availability_codes.clone())
        .await
        .context("failed to seed availability codes")?;
      tracing::info!(codes = codes.len(), "store initialised");
    }
    Command::Seed { codes } => {
      let table = store
        .seed_availability_codes(codes)
        .await
        .context("failed to seed availability codes")?;
      println!("{}", serde_json::to_string_pretty(&table)?);
    }
    Command::Ingest { file, keep_going, batch } => {
      let reader = File::open(&file)
        .map(BufReader::new)
        .with_context(|| format!("failed to open {file:?}"))?;
      let report = ingest::run(&store, reader, IngestOptions { keep_going, batch }).await?;
      println!("{}", serde_json::to_string_pretty(&report)?);
      if !report.failed.is_empty() {
        anyhow::bail!("{} record(s) failed", report.failed.len());
      }
    }
    Command::Show { water_system_no } => {
      let water_system = store
        .get_water_system(&water_system_no)
        .await?
        .with_context(|| format!("no water system {water_system_no}"))?;
      let relationships = store.relationships_for(&water_system_no).await?;
      let view = SystemView { water_system, relationships };
      println!("{}", serde_json::to_string_pretty(&view)?);
    }
  }

  Ok(())
}
