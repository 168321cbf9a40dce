//! Runtime configuration, layered from an optional TOML file and `TCEQ_*`
//! environment variables.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use serde::Deserialize;

fn default_store_path() -> PathBuf { PathBuf::from("water_systems.sqlite") }

#[derive(Deserialize, Clone, Debug)]
pub struct StoreConfig {
  /// SQLite file holding the store. A leading `~/` is expanded.
  #[serde(default = "default_store_path")]
  pub store_path:         PathBuf,
  /// Codes seeded into `availability_codes` by `tceq init`.
  #[serde(default)]
  pub availability_codes: Vec<String>,
}

impl StoreConfig {
  pub fn load(path: &Path) -> anyhow::Result<Self> {
    Self::load_with_env(path, config::Environment::with_prefix("TCEQ"))
  }

  fn load_with_env(path: &Path, env: config::Environment) -> anyhow::Result<Self> {
    let settings = config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(env)
      .build()
      .context("failed to read config file")?;

    let mut cfg: StoreConfig = settings
      .try_deserialize()
      .context("failed to deserialise StoreConfig")?;
    cfg.store_path = expand_tilde(&cfg.store_path);
    Ok(cfg)
  }
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
