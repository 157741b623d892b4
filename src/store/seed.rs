//! YAML seed import for an empty or fresh store.
//!
//! ```yaml
//! projects:
//!   - title: Folio
//!     description: Terminal portfolio
//!     tech: [Rust, SQLite]
//!     priority: 10
//! admins:
//!   - name: ada
//!     email: ada@example.com
//!     secret: enable_admin
//! ```

use color_eyre::{eyre::eyre, Result};
use serde::Deserialize;
use std::path::Path;
use tracing::info;

use super::{RecordStore, SqliteStore};
use crate::portfolio::ProjectData;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Seed {
  #[serde(default)]
  pub projects: Vec<ProjectData>,
  #[serde(default)]
  pub admins: Vec<SeedAdmin>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SeedAdmin {
  pub name: String,
  pub email: String,
  pub secret: String,
}

impl Seed {
  pub fn load(path: &Path) -> Result<Self> {
    let contents = std::fs::read_to_string(path)
      .map_err(|e| eyre!("Failed to read seed file {}: {}", path.display(), e))?;
    Self::parse(&contents).map_err(|e| eyre!("Failed to parse seed file {}: {}", path.display(), e))
  }

  pub fn parse(contents: &str) -> Result<Self, serde_yaml::Error> {
    serde_yaml::from_str(contents)
  }

  /// Insert every project and admin. Returns the number of projects added.
  pub async fn apply(&self, store: &SqliteStore) -> Result<usize> {
    for admin in &self.admins {
      store.upsert_admin(&admin.name, &admin.email, &admin.secret)?;
    }
    for project in &self.projects {
      store.insert(project).await?;
    }
    info!(
      projects = self.projects.len(),
      admins = self.admins.len(),
      "seed imported"
    );
    Ok(self.projects.len())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::admin::AdminDirectory;
  use crate::store::ListOrder;

  const SEED: &str = r#"
projects:
  - title: Folio
    tech: [Rust, SQLite]
    priority: 10
  - title: Sketchbook
    date: "2023-04-01"
admins:
  - name: ada
    email: ada@example.com
    secret: enable_admin
"#;

  #[test]
  fn test_parse_defaults_missing_fields() {
    let seed = Seed::parse(SEED).unwrap();
    assert_eq!(seed.projects.len(), 2);
    assert_eq!(seed.projects[1].priority, None);
    assert!(seed.projects[1].tech.is_empty());
    assert_eq!(seed.admins[0].name, "ada");

    let empty = Seed::parse("{}").unwrap();
    assert!(empty.projects.is_empty());
  }

  #[tokio::test]
  async fn test_apply_populates_store() {
    let dir = tempfile::tempdir().unwrap();
    let store = SqliteStore::open(&dir.path().join("seed.db")).unwrap();

    let added = Seed::parse(SEED).unwrap().apply(&store).await.unwrap();
    assert_eq!(added, 2);

    let page = store
      .list_page(ListOrder::priority_desc(), 10, None)
      .await
      .unwrap();
    assert_eq!(page.records[0].title, "Folio");
    assert_eq!(page.records[1].date.as_deref(), Some("2023-04-01"));
    assert!(store
      .verify_admin("ada", "ada@example.com", "enable_admin")
      .await
      .unwrap());
  }
}
