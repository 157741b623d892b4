//! SQLite-backed record store.

use async_trait::async_trait;
use chrono::Utc;
use color_eyre::{eyre::eyre, Result};
use rusqlite::{params, Connection, OptionalExtension};
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use tracing::{debug, warn};

use super::{Cursor, ListOrder, Page, Position, RecordStore, StoreError};
use crate::admin::AdminDirectory;
use crate::portfolio::{ProjectData, ProjectPatch, ProjectRecord};

/// Schema for the projects collection and admin credentials.
const SCHEMA: &str = r#"
-- One row per project; the body is the JSON document
CREATE TABLE IF NOT EXISTS projects (
    seq INTEGER PRIMARY KEY AUTOINCREMENT,
    id TEXT NOT NULL UNIQUE,
    priority INTEGER,
    data TEXT NOT NULL,
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX IF NOT EXISTS idx_projects_priority
    ON projects(priority DESC, seq);

-- Contact-form admin credentials (plaintext, matched by equality)
CREATE TABLE IF NOT EXISTS admins (
    name TEXT NOT NULL,
    email TEXT NOT NULL,
    secret TEXT NOT NULL,
    PRIMARY KEY (name, email)
);
"#;

const SELECT_PROJECTS: &str = "SELECT seq, id, priority, data FROM projects";
const ORDER_PRIORITY_DESC: &str = "ORDER BY priority IS NULL, priority DESC, seq ASC LIMIT ?";

/// Projects collection stored in a local SQLite database.
pub struct SqliteStore {
  conn: Mutex<Connection>,
  ids: AtomicU64,
}

impl SqliteStore {
  /// Open (or create) the store at `path`.
  pub fn open(path: &Path) -> Result<Self> {
    if let Some(parent) = path.parent() {
      if !parent.as_os_str().is_empty() {
        std::fs::create_dir_all(parent)
          .map_err(|e| eyre!("Failed to create store directory: {}", e))?;
      }
    }

    let conn = Connection::open(path)
      .map_err(|e| eyre!("Failed to open project store at {}: {}", path.display(), e))?;

    let store = Self {
      conn: Mutex::new(conn),
      ids: AtomicU64::new(0),
    };
    store.run_migrations()?;
    debug!(path = %path.display(), "opened project store");

    Ok(store)
  }

  fn run_migrations(&self) -> Result<()> {
    let conn = self
      .conn
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;

    conn
      .execute_batch(SCHEMA)
      .map_err(|e| eyre!("Failed to run store migrations: {}", e))?;

    Ok(())
  }

  fn conn(&self) -> Result<std::sync::MutexGuard<'_, Connection>, StoreError> {
    self
      .conn
      .lock()
      .map_err(|e| StoreError::StoreUnavailable(format!("lock poisoned: {}", e)))
  }

  /// Register contact-form credentials, replacing an existing secret.
  pub fn upsert_admin(&self, name: &str, email: &str, secret: &str) -> Result<(), StoreError> {
    let conn = self.conn()?;
    conn
      .execute(
        "INSERT OR REPLACE INTO admins (name, email, secret) VALUES (?, ?, ?)",
        params![name, email, secret],
      )
      .map_err(unavailable("store admin"))?;
    Ok(())
  }

  /// Store-assigned id: 20 hex characters of a hash over time, a counter,
  /// and the title.
  fn new_id(&self, data: &ProjectData) -> String {
    let counter = self.ids.fetch_add(1, Ordering::Relaxed);
    let nanos = Utc::now().timestamp_nanos_opt().unwrap_or_default();

    let mut hasher = Sha256::new();
    hasher.update(format!("{}:{}:{}:{}", nanos, counter, std::process::id(), data.title).as_bytes());
    let mut id = hex::encode(hasher.finalize());
    id.truncate(20);
    id
  }
}

fn unavailable(context: &'static str) -> impl Fn(rusqlite::Error) -> StoreError {
  move |e| StoreError::StoreUnavailable(format!("failed to {}: {}", context, e))
}

/// Decode a stored row; the `priority` column is authoritative.
fn decode_row(id: String, priority: Option<i64>, data: &str) -> ProjectRecord {
  let doc = serde_json::from_str::<Value>(data).unwrap_or_else(|e| {
    warn!(error = %StoreError::MalformedRecord(format!("{}: {}", id, e)), "unreadable project body");
    Value::Null
  });
  let mut record = ProjectRecord::from_document(id, &doc);
  record.priority = priority;
  record
}

#[async_trait]
impl RecordStore for SqliteStore {
  async fn list_page(
    &self,
    _order: ListOrder,
    page_size: usize,
    cursor: Option<&Cursor>,
  ) -> Result<Page, StoreError> {
    let after = cursor.map(Position::from_cursor).transpose()?;
    let conn = self.conn()?;
    let limit = page_size as i64;

    let (sql, args): (String, Vec<rusqlite::types::Value>) = match after {
      None => (
        format!("{} {}", SELECT_PROJECTS, ORDER_PRIORITY_DESC),
        vec![limit.into()],
      ),
      Some(Position {
        priority: Some(priority),
        seq,
      }) => (
        format!(
          "{} WHERE (priority IS NOT NULL AND (priority < ?1 OR (priority = ?1 AND seq > ?2)))
             OR priority IS NULL {}",
          SELECT_PROJECTS,
          ORDER_PRIORITY_DESC.replace("LIMIT ?", "LIMIT ?3")
        ),
        vec![priority.into(), seq.into(), limit.into()],
      ),
      Some(Position {
        priority: None,
        seq,
      }) => (
        format!(
          "{} WHERE priority IS NULL AND seq > ?1 {}",
          SELECT_PROJECTS,
          ORDER_PRIORITY_DESC.replace("LIMIT ?", "LIMIT ?2")
        ),
        vec![seq.into(), limit.into()],
      ),
    };

    let mut stmt = conn.prepare(&sql).map_err(unavailable("prepare page query"))?;
    let rows: Vec<(i64, String, Option<i64>, String)> = stmt
      .query_map(rusqlite::params_from_iter(args), |row| {
        Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
      })
      .map_err(unavailable("list projects"))?
      .collect::<rusqlite::Result<_>>()
      .map_err(unavailable("read project row"))?;

    let cursor = rows.last().map(|(seq, _, priority, _)| {
      Position {
        priority: *priority,
        seq: *seq,
      }
      .to_cursor()
    });
    let records = rows
      .into_iter()
      .map(|(_, id, priority, data)| decode_row(id, priority, &data))
      .collect();

    Ok(Page { records, cursor })
  }

  async fn insert(&self, data: &ProjectData) -> Result<String, StoreError> {
    let id = self.new_id(data);
    let body = data.to_document().to_string();
    let conn = self.conn()?;
    conn
      .execute(
        "INSERT INTO projects (id, priority, data) VALUES (?, ?, ?)",
        params![id, data.priority, body],
      )
      .map_err(unavailable("insert project"))?;
    Ok(id)
  }

  async fn update(&self, id: &str, patch: &ProjectPatch) -> Result<(), StoreError> {
    let mut conn = self.conn()?;
    let tx = conn.transaction().map_err(unavailable("begin update"))?;

    let current: Option<(Option<i64>, String)> = tx
      .query_row(
        "SELECT priority, data FROM projects WHERE id = ?",
        params![id],
        |row| Ok((row.get(0)?, row.get(1)?)),
      )
      .optional()
      .map_err(unavailable("load project"))?;
    let (priority, data) = current.ok_or_else(|| StoreError::NotFound(id.to_string()))?;

    let mut doc = match serde_json::from_str::<Value>(&data) {
      Ok(Value::Object(fields)) => fields,
      _ => Map::new(),
    };
    patch.apply_to_document(&mut doc);
    let priority = patch.priority.unwrap_or(priority);

    tx.execute(
      "UPDATE projects SET priority = ?, data = ? WHERE id = ?",
      params![priority, Value::Object(doc).to_string(), id],
    )
    .map_err(unavailable("update project"))?;
    tx.commit().map_err(unavailable("commit update"))?;
    Ok(())
  }

  async fn remove(&self, id: &str) -> Result<(), StoreError> {
    let conn = self.conn()?;
    let removed = conn
      .execute("DELETE FROM projects WHERE id = ?", params![id])
      .map_err(unavailable("delete project"))?;
    if removed == 0 {
      return Err(StoreError::NotFound(id.to_string()));
    }
    Ok(())
  }
}

#[async_trait]
impl AdminDirectory for SqliteStore {
  async fn verify_admin(&self, name: &str, email: &str, secret: &str) -> Result<bool, StoreError> {
    let conn = self.conn()?;
    let matches: i64 = conn
      .query_row(
        "SELECT COUNT(*) FROM admins WHERE name = ? AND email = ? AND secret = ?",
        params![name, email, secret],
        |row| row.get(0),
      )
      .map_err(unavailable("check admin"))?;
    Ok(matches > 0)
  }
}
