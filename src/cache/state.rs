//! Cache contents and the merge rules applied to them.

use std::collections::{BTreeMap, HashMap};

use super::traits::Cacheable;
use crate::store::Cursor;

/// What a fetch saw when it started.
///
/// Captured before the store is awaited and handed back on merge, so a
/// completion can tell whether the cache moved underneath it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
  pub generation: u64,
  pub cursor: Option<Cursor>,
  pub revision: u64,
}

/// How a fetched page was folded into the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageOutcome {
  /// Records merged and the cursor moved past the page
  Advanced,
  /// Empty page at the current cursor: collection exhausted
  Exhausted,
  /// Another fetch moved the cursor first; records merged, cursor kept
  Overlapped,
  /// The cache was reset since the fetch started; page dropped
  Stale,
}

/// Authoritative local mirror of the records fetched so far.
///
/// Records keep their first-seen position; later snapshots of the same id
/// replace the earlier value in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheState<T> {
  records: Vec<T>,
  index: HashMap<String, usize>,
  cursor: Option<Cursor>,
  all_fetched: bool,
  /// Bumped on every reset
  generation: u64,
  /// Bumped on every local mutation patch
  revision: u64,
  /// Revision of the latest local mutation per id (including removals)
  touched: HashMap<String, u64>,
  /// Tickets handed out and not yet settled, counted by revision
  open_fetches: BTreeMap<u64, usize>,
}

impl<T> Default for CacheState<T> {
  fn default() -> Self {
    Self {
      records: Vec::new(),
      index: HashMap::new(),
      cursor: None,
      all_fetched: false,
      generation: 0,
      revision: 0,
      touched: HashMap::new(),
      open_fetches: BTreeMap::new(),
    }
  }
}

impl<T: Cacheable> CacheState<T> {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn records(&self) -> &[T] {
    &self.records
  }

  #[cfg(test)]
  pub fn len(&self) -> usize {
    self.records.len()
  }

  #[cfg(test)]
  pub fn is_empty(&self) -> bool {
    self.records.is_empty()
  }

  #[cfg(test)]
  pub fn cursor(&self) -> Option<&Cursor> {
    self.cursor.as_ref()
  }

  #[cfg(test)]
  pub fn get(&self, key: &str) -> Option<&T> {
    self.index.get(key).map(|&i| &self.records[i])
  }

  #[cfg(test)]
  pub fn touched_len(&self) -> usize {
    self.touched.len()
  }

  pub fn all_fetched(&self) -> bool {
    self.all_fetched
  }

  pub fn generation(&self) -> u64 {
    self.generation
  }

  pub fn contains(&self, key: &str) -> bool {
    self.index.contains_key(key)
  }

  /// Drop everything and start pagination over.
  ///
  /// Tickets taken before the reset can no longer write to the cache, so
  /// neither the mutation log nor their open-fetch entries are needed.
  pub fn reset(&mut self) {
    self.records.clear();
    self.index.clear();
    self.cursor = None;
    self.all_fetched = false;
    self.generation += 1;
    self.touched.clear();
    self.open_fetches.clear();
  }

  /// Record that a fetch is starting. Settle the ticket with
  /// [`CacheState::apply_page`] or [`CacheState::release`].
  pub fn ticket(&mut self) -> FetchTicket {
    *self.open_fetches.entry(self.revision).or_default() += 1;
    FetchTicket {
      generation: self.generation,
      cursor: self.cursor.clone(),
      revision: self.revision,
    }
  }

  /// Settle a ticket whose fetch failed.
  pub fn release(&mut self, ticket: &FetchTicket) {
    if ticket.generation != self.generation {
      return;
    }
    if let Some(count) = self.open_fetches.get_mut(&ticket.revision) {
      *count -= 1;
      if *count == 0 {
        self.open_fetches.remove(&ticket.revision);
      }
    }
    self.prune_touched();
  }

  /// Merge records, deduplicating by id; returns how many were new.
  ///
  /// Records patched or removed locally after `since_revision` are skipped
  /// so a slow fetch cannot undo a confirmed mutation.
  pub fn merge(&mut self, incoming: Vec<T>, since_revision: u64) -> usize {
    let mut added = 0;
    for record in incoming {
      let key = record.cache_key();
      if self
        .touched
        .get(key)
        .is_some_and(|&revision| revision > since_revision)
      {
        continue;
      }
      match self.index.get(key) {
        Some(&i) => self.records[i] = record,
        None => {
          self.index.insert(key.to_string(), self.records.len());
          self.records.push(record);
          added += 1;
        }
      }
    }
    added
  }

  /// Fold a fetched page in: merge its records, then advance pagination
  /// only if nothing moved since `ticket` was taken.
  ///
  /// A page from before the last reset is dropped whole. It may hold
  /// records deleted or patched since, and the mutation log that would
  /// filter them went away with the reset.
  pub fn apply_page(
    &mut self,
    ticket: &FetchTicket,
    records: Vec<T>,
    next_cursor: Option<Cursor>,
  ) -> PageOutcome {
    if ticket.generation != self.generation {
      return PageOutcome::Stale;
    }
    let exhausted = records.is_empty();
    self.merge(records, ticket.revision);
    self.release(ticket);

    if ticket.cursor != self.cursor || self.all_fetched {
      return PageOutcome::Overlapped;
    }
    if exhausted {
      self.all_fetched = true;
      PageOutcome::Exhausted
    } else {
      if next_cursor.is_some() {
        self.cursor = next_cursor;
      }
      PageOutcome::Advanced
    }
  }

  /// Add or replace a record after a confirmed insert.
  pub fn upsert(&mut self, record: T) {
    let key = record.cache_key().to_string();
    self.touch(&key);
    match self.index.get(&key) {
      Some(&i) => self.records[i] = record,
      None => {
        self.index.insert(key, self.records.len());
        self.records.push(record);
      }
    }
  }

  /// Modify a cached record in place after a confirmed update.
  pub fn patch(&mut self, key: &str, apply: impl FnOnce(&mut T)) -> bool {
    match self.index.get(key).copied() {
      Some(i) => {
        self.touch(key);
        apply(&mut self.records[i]);
        true
      }
      None => false,
    }
  }

  /// Remove a record after a confirmed delete.
  pub fn remove(&mut self, key: &str) -> Option<T> {
    self.touch(key);
    let i = self.index.remove(key)?;
    let removed = self.records.remove(i);
    for position in self.index.values_mut() {
      if *position > i {
        *position -= 1;
      }
    }
    Some(removed)
  }

  fn touch(&mut self, key: &str) {
    self.revision += 1;
    self.touched.insert(key.to_string(), self.revision);
    self.prune_touched();
  }

  /// Forget mutations no open fetch started before.
  fn prune_touched(&mut self) {
    match self.open_fetches.keys().next().copied() {
      Some(oldest) => self.touched.retain(|_, revision| *revision > oldest),
      None => self.touched.clear(),
    }
  }
}
