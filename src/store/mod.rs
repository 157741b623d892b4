//! Record store abstraction for the "projects" collection.
//!
//! The store is the authoritative owner of project records. The rest of the
//! application only talks to it through [`RecordStore`]:
//! - paginated reads ordered by priority (descending, absent priority last)
//! - inserts that assign ids, shallow-merge updates, and removals
//!
//! Transport and query execution are entirely the adapter's concern.

#[cfg(test)]
pub mod memory;
pub mod seed;
pub mod sqlite;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::portfolio::{ProjectData, ProjectPatch, ProjectRecord};

pub use sqlite::SqliteStore;

/// Errors surfaced by store operations.
///
/// Cloneable so one shared in-flight fetch can hand the same failure to
/// every caller awaiting it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
  /// Transient failure reaching or executing against the store.
  #[error("record store unavailable: {0}")]
  StoreUnavailable(String),

  /// A mutation referenced an id the store (or cache) does not know.
  #[error("project not found: {0}")]
  NotFound(String),

  /// A fetched record did not have the expected shape.
  #[error("malformed project record: {0}")]
  MalformedRecord(String),
}

/// Field a page listing is ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderField {
  Priority,
}

/// Direction of a page listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
  Ascending,
  Descending,
}

/// Ordering requested from [`RecordStore::list_page`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListOrder {
  pub field: OrderField,
  pub direction: Direction,
}

impl ListOrder {
  /// Priority descending, records without a priority last.
  pub const fn priority_desc() -> Self {
    Self {
      field: OrderField::Priority,
      direction: Direction::Descending,
    }
  }
}

impl Default for ListOrder {
  fn default() -> Self {
    Self::priority_desc()
  }
}

/// Opaque pagination token marking the last record of a fetched page.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Cursor(String);

impl Cursor {
  pub fn new(token: impl Into<String>) -> Self {
    Self(token.into())
  }

  pub fn as_str(&self) -> &str {
    &self.0
  }
}

/// One page of records plus the cursor to continue after it.
///
/// An empty `records` signals end-of-collection; `cursor` is then `None`.
#[derive(Debug, Clone, Default)]
pub struct Page {
  pub records: Vec<ProjectRecord>,
  pub cursor: Option<Cursor>,
}

/// Paginated read/write access to the projects collection.
#[async_trait]
pub trait RecordStore: Send + Sync + 'static {
  /// List up to `page_size` records strictly after `cursor`.
  async fn list_page(
    &self,
    order: ListOrder,
    page_size: usize,
    cursor: Option<&Cursor>,
  ) -> Result<Page, StoreError>;

  /// Insert a new record, returning the store-assigned id.
  async fn insert(&self, data: &ProjectData) -> Result<String, StoreError>;

  /// Shallow-merge `patch` into the record `id`.
  async fn update(&self, id: &str, patch: &ProjectPatch) -> Result<(), StoreError>;

  /// Remove the record `id`.
  async fn remove(&self, id: &str) -> Result<(), StoreError>;
}

/// Position of a record in priority order, used by the bundled adapters to
/// encode cursors: `(priority, insertion sequence)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct Position {
  #[serde(rename = "p")]
  pub priority: Option<i64>,
  #[serde(rename = "s")]
  pub seq: i64,
}

impl Position {
  pub fn to_cursor(self) -> Cursor {
    // Two plain integers always serialize.
    Cursor::new(serde_json::to_string(&self).unwrap_or_default())
  }

  pub fn from_cursor(cursor: &Cursor) -> Result<Self, StoreError> {
    serde_json::from_str(cursor.as_str())
      .map_err(|e| StoreError::StoreUnavailable(format!("invalid cursor {:?}: {}", cursor, e)))
  }

  /// Total order of the listing: priority descending with absent priority
  /// last, then insertion order.
  pub fn order(&self, other: &Self) -> Ordering {
    compare_priority_desc(self.priority, other.priority).then(self.seq.cmp(&other.seq))
  }
}

/// Descending priority comparison where `None` sorts after every `Some`.
pub fn compare_priority_desc(a: Option<i64>, b: Option<i64>) -> Ordering {
  match (a, b) {
    (Some(a), Some(b)) => b.cmp(&a),
    (Some(_), None) => Ordering::Less,
    (None, Some(_)) => Ordering::Greater,
    (None, None) => Ordering::Equal,
  }
}
