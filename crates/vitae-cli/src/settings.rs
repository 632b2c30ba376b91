//! Layered settings: defaults, an optional TOML file, then `VITAE_*`
//! environment variables.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use serde::Deserialize;

pub const DEFAULT_CONFIG_PATH: &str = "~/.config/vitae/config.toml";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
  /// Root of the resume API, e.g. `http://localhost:8000`.
  pub base_url:   String,
  /// File holding the bearer token written by `vitae login`.
  pub token_path: PathBuf,
}

impl Default for Settings {
  fn default() -> Self {
    Self {
      base_url:   "http://localhost:8000".to_string(),
      token_path: PathBuf::from("~/.config/vitae/token"),
    }
  }
}

impl Settings {
  /// Read `path` if it exists, then apply `VITAE_BASE_URL` and
  /// `VITAE_TOKEN_PATH`.
  pub fn load(path: &Path) -> anyhow::Result<Self> {
    let settings: Self = config::Config::builder()
      .add_source(config::File::from(expand_tilde(path)).required(false))
      .add_source(config::Environment::with_prefix("VITAE"))
      .build()
      .context("failed to read config file")?
      .try_deserialize()
      .context("failed to deserialise settings")?;
    Ok(Self {
      token_path: expand_tilde(&settings.token_path),
      ..settings
    })
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
  fn missing_file_gives_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let settings = Settings::load(&dir.path().join("absent.toml")).unwrap();
    assert_eq!(settings.base_url, Settings::default().base_url);
    assert!(settings.token_path.ends_with(".config/vitae/token"));
  }

  #[test]
  fn file_values_override_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(
      &path,
      "base_url = \"https://cv.example.com\"\ntoken_path = \"/tmp/vitae-token\"\n",
    )
    .unwrap();

    let settings = Settings::load(&path).unwrap();
    assert_eq!(settings, Settings {
      base_url:   "https://cv.example.com".into(),
      token_path: PathBuf::from("/tmp/vitae-token"),
    });
  }

  #[test]
  fn tilde_is_expanded_only_at_the_start() {
    assert_eq!(expand_tilde(Path::new("/etc/vitae")), PathBuf::from("/etc/vitae"));
    assert_eq!(expand_tilde(Path::new("a/~/b")), PathBuf::from("a/~/b"));
  }
}
