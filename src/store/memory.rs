//! In-memory record store used as a test double.
//!
//! Holds documents in insertion order and lists them with the same ordering
//! and cursor encoding as the SQLite adapter. Failures, latency, and
//! overlapping pages can be injected to exercise the cache layer.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use super::{Cursor, ListOrder, Page, Position, RecordStore, StoreError};
use crate::portfolio::{ProjectData, ProjectPatch, ProjectRecord};

struct Doc {
  id: String,
  seq: i64,
  body: Value,
}

impl Doc {
  fn position(&self) -> Position {
    Position {
      priority: self.body.get("priority").and_then(Value::as_i64),
      seq: self.seq,
    }
  }
}

#[derive(Default)]
struct Inner {
  docs: Vec<Doc>,
  next_seq: i64,
  failures: VecDeque<StoreError>,
  delay: Option<Duration>,
  overlap: bool,
}

#[derive(Default)]
pub struct MemoryStore {
  inner: Mutex<Inner>,
  list_calls: AtomicUsize,
  write_calls: AtomicUsize,
}

impl MemoryStore {
  pub fn new() -> Self {
    Self::default()
  }

  fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
    self.inner.lock().unwrap_or_else(|e| e.into_inner())
  }

  /// Insert directly, bypassing failure injection.
  pub fn seed(&self, data: ProjectData) -> String {
    self.seed_document(data.to_document())
  }

  /// Insert a raw document, e.g. one with a malformed shape.
  pub fn seed_document(&self, body: Value) -> String {
    let mut inner = self.lock();
    inner.next_seq += 1;
    let seq = inner.next_seq;
    let id = format!("doc{:04}", seq);
    inner.docs.push(Doc {
      id: id.clone(),
      seq,
      body,
    });
    id
  }

  /// Fail the next store call with `error`.
  pub fn fail_next(&self, error: StoreError) {
    self.lock().failures.push_back(error);
  }

  /// Make every list call wait before answering. The page is read before
  /// the wait, so writes made meanwhile are not in it.
  pub fn set_delay(&self, delay: Duration) {
    self.lock().delay = Some(delay);
  }

  /// Re-send the record at the cursor at the start of each following page.
  pub fn set_overlap(&self, overlap: bool) {
    self.lock().overlap = overlap;
  }

  pub fn list_calls(&self) -> usize {
    self.list_calls.load(Ordering::SeqCst)
  }

  pub fn write_calls(&self) -> usize {
    self.write_calls.load(Ordering::SeqCst)
  }

  pub fn len(&self) -> usize {
    self.lock().docs.len()
  }

  pub fn get(&self, id: &str) -> Option<ProjectRecord> {
    self
      .lock()
      .docs
      .iter()
      .find(|d| d.id == id)
      .map(|d| ProjectRecord::from_document(d.id.clone(), &d.body))
  }

  fn read_page(
    &self,
    page_size: usize,
    cursor: Option<&Cursor>,
  ) -> Result<(Page, Option<Duration>), StoreError> {
    let after = cursor.map(Position::from_cursor).transpose()?;
    let inner = self.lock();
    let mut ordered: Vec<&Doc> = inner.docs.iter().collect();
    ordered.sort_by(|a, b| a.position().order(&b.position()));

    let mut page: Vec<&Doc> = ordered
      .iter()
      .copied()
      .filter(|d| after.map_or(true, |p| p.order(&d.position()).is_lt()))
      .take(page_size)
      .collect();

    if inner.overlap && !page.is_empty() {
      let boundary = after.and_then(|p| ordered.iter().find(|d| d.position() == p).copied());
      if let Some(boundary) = boundary {
        page.insert(0, boundary);
      }
    }

    let cursor = page.last().map(|d| d.position().to_cursor());
    let page = Page {
      records: page
        .into_iter()
        .map(|d| ProjectRecord::from_document(d.id.clone(), &d.body))
        .collect(),
      cursor,
    };
    Ok((page, inner.delay))
  }

  fn take_failure(&self) -> Result<(), StoreError> {
    match self.lock().failures.pop_front() {
      Some(error) => Err(error),
      None => Ok(()),
    }
  }
}

#[async_trait]
impl RecordStore for MemoryStore {
  async fn list_page(
    &self,
    _order: ListOrder,
    page_size: usize,
    cursor: Option<&Cursor>,
  ) -> Result<Page, StoreError> {
    self.list_calls.fetch_add(1, Ordering::SeqCst);
    self.take_failure()?;
    let (page, delay) = self.read_page(page_size, cursor)?;
    if let Some(delay) = delay {
      tokio::time::sleep(delay).await;
    }
    Ok(page)
  }

  async fn insert(&self, data: &ProjectData) -> Result<String, StoreError> {
    self.write_calls.fetch_add(1, Ordering::SeqCst);
    self.take_failure()?;
    Ok(self.seed(data.clone()))
  }

  async fn update(&self, id: &str, patch: &ProjectPatch) -> Result<(), StoreError> {
    self.write_calls.fetch_add(1, Ordering::SeqCst);
    self.take_failure()?;
    let mut inner = self.lock();
    let doc = inner
      .docs
      .iter_mut()
      .find(|d| d.id == id)
      .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
    if !doc.body.is_object() {
      doc.body = Value::Object(serde_json::Map::new());
    }
    if let Some(fields) = doc.body.as_object_mut() {
      patch.apply_to_document(fields);
    }
    Ok(())
  }

  async fn remove(&self, id: &str) -> Result<(), StoreError> {
    self.write_calls.fetch_add(1, Ordering::SeqCst);
    self.take_failure()?;
    let mut inner = self.lock();
    let before = inner.docs.len();
    inner.docs.retain(|d| d.id != id);
    if inner.docs.len() == before {
      return Err(StoreError::NotFound(id.to_string()));
    }
    Ok(())
  }
}
