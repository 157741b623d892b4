use color_eyre::{eyre::eyre, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::portfolio::{PageSizes, WindowSelector};

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
  /// Header title
  pub title: String,
  pub store: StoreConfig,
  pub layout: LayoutConfig,
  pub fetch: FetchConfig,
  pub debounce: DebounceConfig,
  /// Card descriptions are cut after this many characters
  pub description_limit: usize,
}

impl Default for Config {
  fn default() -> Self {
    Self {
      title: "Portfolio".to_string(),
      store: StoreConfig::default(),
      layout: LayoutConfig::default(),
      fetch: FetchConfig::default(),
      debounce: DebounceConfig::default(),
      description_limit: 100,
    }
  }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
  /// Database file (default: $XDG_DATA_HOME/folio/projects.db)
  pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
  /// Terminals narrower than this many columns use the mobile layout
  pub mobile_breakpoint: u16,
  pub desktop_page_size: usize,
  pub mobile_page_size: usize,
}

impl Default for LayoutConfig {
  fn default() -> Self {
    Self {
      mobile_breakpoint: 100,
      desktop_page_size: 3,
      mobile_page_size: 4,
    }
  }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
  /// Page size used while fetching the whole collection
  pub batch_size: usize,
}

impl Default for FetchConfig {
  fn default() -> Self {
    Self { batch_size: 20 }
  }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DebounceConfig {
  pub search_ms: u64,
  pub resize_ms: u64,
}

impl Default for DebounceConfig {
  fn default() -> Self {
    Self {
      search_ms: 300,
      resize_ms: 300,
    }
  }
}

impl DebounceConfig {
  pub fn search(&self) -> Duration {
    Duration::from_millis(self.search_ms)
  }

  pub fn resize(&self) -> Duration {
    Duration::from_millis(self.resize_ms)
  }
}

impl Config {
  /// Load configuration from file, falling back to defaults.
  ///
  /// Search order:
  /// 1. Explicit path if provided (must exist)
  /// 2. ./folio.yaml (current directory)
  /// 3. $XDG_CONFIG_HOME/folio/config.yaml
  pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
    let path = if let Some(p) = explicit_path {
      if p.exists() {
        Some(p.to_path_buf())
      } else {
        return Err(eyre!("Config file not found: {}", p.display()));
      }
    } else {
      Self::find_config_file()
    };

    match path {
      Some(p) => Self::load_from_path(&p),
      None => Ok(Self::default()),
    }
  }

  fn find_config_file() -> Option<PathBuf> {
    let local = PathBuf::from("folio.yaml");
    if local.exists() {
      return Some(local);
    }

    if let Some(config_dir) = dirs::config_dir() {
      let xdg_path = config_dir.join("folio").join("config.yaml");
      if xdg_path.exists() {
        return Some(xdg_path);
      }
    }

    None
  }

  fn load_from_path(path: &Path) -> Result<Self> {
    let contents = std::fs::read_to_string(path)
      .map_err(|e| eyre!("Failed to read config file {}: {}", path.display(), e))?;

    let config: Config = serde_yaml::from_str(&contents)
      .map_err(|e| eyre!("Failed to parse config file {}: {}", path.display(), e))?;

    Ok(config)
  }

  /// Directory for the database and log file.
  pub fn data_dir() -> PathBuf {
    dirs::data_dir()
      .unwrap_or_else(|| PathBuf::from("."))
      .join("folio")
  }

  pub fn store_path(&self) -> PathBuf {
    self
      .store
      .path
      .clone()
      .unwrap_or_else(|| Self::data_dir().join("projects.db"))
  }

  pub fn window_selector(&self) -> WindowSelector {
    WindowSelector::new(PageSizes {
      desktop: self.layout.desktop_page_size,
      mobile: self.layout.mobile_page_size,
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::portfolio::Viewport;

  #[test]
  fn test_partial_file_keeps_defaults() {
    let config: Config = serde_yaml::from_str(
      r#"
title: My Work
layout:
  mobile_page_size: 6
debounce:
  search_ms: 150
"#,
    )
    .unwrap();

    assert_eq!(config.title, "My Work");
    assert_eq!(config.layout.mobile_page_size, 6);
    assert_eq!(config.layout.desktop_page_size, 3);
    assert_eq!(config.layout.mobile_breakpoint, 100);
    assert_eq!(config.fetch.batch_size, 20);
    assert_eq!(config.debounce.search(), Duration::from_millis(150));
    assert_eq!(config.debounce.resize(), Duration::from_millis(300));
    assert_eq!(config.description_limit, 100);

    let selector = config.window_selector();
    assert_eq!(selector.page_size(Viewport::Mobile, false), 6);
  }

  #[test]
  fn test_missing_explicit_path_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    assert!(Config::load(Some(&dir.path().join("absent.yaml"))).is_err());
  }

  #[test]
  fn test_explicit_store_path_wins() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("folio.yaml");
    std::fs::write(&file, "store:\n  path: /tmp/folio-test.db\n").unwrap();

    let config = Config::load(Some(&file)).unwrap();
    assert_eq!(config.store_path(), PathBuf::from("/tmp/folio-test.db"));
  }
}
