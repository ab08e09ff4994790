//! CLI configuration: an optional TOML file layered under `GRADEBOOK_*`
//! environment variables.

use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use serde::Deserialize;

/// Default database file, relative to the working directory.
pub const DEFAULT_STORE_PATH: &str = "education.db";

#[derive(Debug, Clone, Deserialize)]
pub struct CliConfig {
  /// SQLite database file. A leading `~/` is expanded.
  #[serde(default = "default_store_path")]
  pub store_path: PathBuf,
}

fn default_store_path() -> PathBuf { PathBuf::from(DEFAULT_STORE_PATH) }

impl CliConfig {
  /// Read `path` (if it exists) and the environment. `GRADEBOOK_STORE_PATH`
  /// wins over the file.
  pub fn load(path: &Path) -> Result<Self> {
    let settings = ::config::Config::builder()
      .add_source(::config::File::from(path).required(false))
      .add_source(::config::Environment::with_prefix("GRADEBOOK"))
      .build()
      .with_context(|| format!("failed to read config file {}", path.display()))?;

    let mut cfg: CliConfig = settings
      .try_deserialize()
      .context("failed to deserialise CliConfig")?;
    cfg.store_path = expand_tilde(&cfg.store_path);
    Ok(cfg)
  }
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn missing_file_falls_back_to_default() {
    let dir = tempfile::tempdir().expect("tempdir");
    let cfg = CliConfig::load(&dir.path().join("absent.toml")).unwrap();
    if std::env::var_os("GRADEBOOK_STORE_PATH").is_none() {
      assert_eq!(cfg.store_path, PathBuf::from(DEFAULT_STORE_PATH));
    }
  }

  #[test]
  fn file_sets_store_path() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("gradebook.toml");
    std::fs::write(&path, "store_path = \"/var/lib/gradebook/records.db\"\n").unwrap();

    let cfg = CliConfig::load(&path).unwrap();
    if std::env::var_os("GRADEBOOK_STORE_PATH").is_none() {
      assert_eq!(cfg.store_path, PathBuf::from("/var/lib/gradebook/records.db"));
    }
  }

  #[test]
  fn tilde_expands_only_as_a_prefix() {
    let plain = Path::new("data/~/education.db");
    assert_eq!(expand_tilde(plain), plain);

    if let Ok(home) = std::env::var("HOME") {
      assert_eq!(
        expand_tilde(Path::new("~/education.db")),
        PathBuf::from(home).join("education.db")
      );
    }
  }
}
