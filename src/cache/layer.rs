//! Cache layer that coordinates pagination against the record store.

use futures::future::{BoxFuture, FutureExt, Shared};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use super::state::{CacheState, PageOutcome};
use crate::portfolio::ProjectRecord;
use crate::store::{ListOrder, RecordStore, StoreError};

type FetchAll = Shared<BoxFuture<'static, Result<(), StoreError>>>;

/// The fetch-all currently running, if any
struct InFlight {
  id: u64,
  future: FetchAll,
}

/// Cache layer that manages the local project cache and store fetching.
///
/// This layer sits between the render pipeline and the record store:
/// - serves renders from the cache and fetches only what is missing
/// - funnels fetch merges and mutation patches through [`CacheLayer::update`]
/// - never touches the cache when a store read fails
pub struct CacheLayer<S: RecordStore> {
  store: Arc<S>,
  state: Arc<Mutex<CacheState<ProjectRecord>>>,
  fetch_all: Arc<std::sync::Mutex<Option<InFlight>>>,
  next_fetch_id: Arc<AtomicU64>,
  order: ListOrder,
}

impl<S: RecordStore> CacheLayer<S> {
  /// Create a new, empty cache layer over the given store.
  pub fn new(store: Arc<S>) -> Self {
    Self {
      store,
      state: Arc::new(Mutex::new(CacheState::new())),
      fetch_all: Arc::new(std::sync::Mutex::new(None)),
      next_fetch_id: Arc::new(AtomicU64::new(0)),
      order: ListOrder::priority_desc(),
    }
  }

  pub fn store(&self) -> &Arc<S> {
    &self.store
  }

  /// Apply a change to the cache.
  ///
  /// Every write goes through here, so a fetch merge and a mutation patch
  /// can never interleave.
  pub async fn update<R>(&self, apply: impl FnOnce(&mut CacheState<ProjectRecord>) -> R) -> R {
    let mut state = self.state.lock().await;
    apply(&mut state)
  }

  /// Copy of the current cache contents.
  pub async fn snapshot(&self) -> CacheState<ProjectRecord> {
    self.state.lock().await.clone()
  }

  pub async fn all_fetched(&self) -> bool {
    self.state.lock().await.all_fetched()
  }

  /// Empty the cache and restart pagination from the beginning.
  ///
  /// A fetch-all still running for the old contents is detached; the page
  /// it is waiting on is dropped when it lands and it fetches no more.
  pub async fn reset(&self) {
    self.update(|state| state.reset()).await;
    self.slot().take();
    debug!("project cache reset");
  }

  /// Reset, then fetch the first page.
  pub async fn initial_load(&self, page_size: usize) -> Result<(), StoreError> {
    self.reset().await;
    self.report(self.fetch_next_page(page_size).await.map(|_| ()))
  }

  /// Make sure the cache holds enough data for the caller.
  ///
  /// With `fetch_all` every remaining page is fetched before returning;
  /// otherwise at most one more page is. A no-op once the collection has
  /// been exhausted. If a fetch-all is already running the caller waits on
  /// that one instead of starting another.
  pub async fn ensure_loaded(&self, page_size: usize, fetch_all: bool) -> Result<(), StoreError> {
    if let Some(running) = self.running_fetch_all() {
      debug!("joining in-flight fetch-all");
      return self.report(running.await);
    }
    if self.all_fetched().await {
      return Ok(());
    }

    if fetch_all {
      let (id, future) = self.start_fetch_all(page_size);
      let result = future.await;
      self.finish_fetch_all(id);
      self.report(result)
    } else {
      self.report(self.fetch_next_page(page_size).await.map(|_| ()))
    }
  }

  /// Fetch one page after the stored cursor and fold it in.
  async fn fetch_next_page(&self, page_size: usize) -> Result<PageOutcome, StoreError> {
    let ticket = self.state.lock().await.ticket();
    let page = match self
      .store
      .list_page(self.order, page_size.max(1), ticket.cursor.as_ref())
      .await
    {
      Ok(page) => page,
      Err(e) => {
        self.update(|state| state.release(&ticket)).await;
        return Err(e);
      }
    };

    let count = page.records.len();
    let outcome = self
      .update(|state| state.apply_page(&ticket, page.records, page.cursor))
      .await;
    debug!(count, ?outcome, "merged project page");
    Ok(outcome)
  }

  /// Page through the rest of the collection, stopping at a reset.
  async fn exhaust(self, page_size: usize) -> Result<(), StoreError> {
    let generation = self.state.lock().await.generation();
    loop {
      {
        let state = self.state.lock().await;
        if state.all_fetched() || state.generation() != generation {
          return Ok(());
        }
      }
      match self.fetch_next_page(page_size).await? {
        PageOutcome::Advanced | PageOutcome::Overlapped => {}
        PageOutcome::Exhausted | PageOutcome::Stale => return Ok(()),
      }
    }
  }

  fn slot(&self) -> std::sync::MutexGuard<'_, Option<InFlight>> {
    self.fetch_all.lock().unwrap_or_else(|e| e.into_inner())
  }

  fn running_fetch_all(&self) -> Option<FetchAll> {
    self.slot().as_ref().map(|running| running.future.clone())
  }

  fn start_fetch_all(&self, page_size: usize) -> (u64, FetchAll) {
    let mut slot = self.slot();
    if let Some(running) = slot.as_ref() {
      return (running.id, running.future.clone());
    }

    let id = self.next_fetch_id.fetch_add(1, Ordering::Relaxed);
    let future = self.clone().exhaust(page_size).boxed().shared();
    *slot = Some(InFlight {
      id,
      future: future.clone(),
    });
    debug!(id, page_size, "starting fetch-all");
    (id, future)
  }

  fn finish_fetch_all(&self, id: u64) {
    let mut slot = self.slot();
    if slot.as_ref().is_some_and(|running| running.id == id) {
      *slot = None;
    }
  }

  /// Log store failures at the coordinator boundary and pass them on.
  fn report(&self, result: Result<(), StoreError>) -> Result<(), StoreError> {
    if let Err(e) = &result {
      warn!(error = %e, "project fetch failed; keeping cached projects");
    }
    result
  }
}

impl<S: RecordStore> Clone for CacheLayer<S> {
  fn clone(&self) -> Self {
    Self {
      store: Arc::clone(&self.store),
      state: Arc::clone(&self.state),
      fetch_all: Arc::clone(&self.fetch_all),
      next_fetch_id: Arc::clone(&self.next_fetch_id),
      order: self.order,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::portfolio::ProjectData;
  use crate::store::memory::MemoryStore;
  use std::time::Duration;

  fn data(title: &str, priority: Option<i64>) -> ProjectData {
    ProjectData {
      title: title.to_string(),
      priority,
      ..Default::default()
    }
  }

  async fn store_with(count: usize) -> Arc<MemoryStore> {
    let store = MemoryStore::new();
    for i in 0..count {
      store.seed(data(&format!("P{}", i), Some((count - i) as i64)));
    }
    Arc::new(store)
  }

  fn titles(state: &CacheState<ProjectRecord>) -> Vec<String> {
    state.records().iter().map(|r| r.title.clone()).collect()
  }

  #[tokio::test]
  async fn test_initial_load_fetches_first_page_in_priority_order() {
    let store = MemoryStore::new();
    store.seed(data("low", Some(1)));
    store.seed(data("none", None));
    store.seed(data("high", Some(9)));
    let layer = CacheLayer::new(Arc::new(store));

    layer.initial_load(2).await.unwrap();
    let state = layer.snapshot().await;
    assert_eq!(titles(&state), vec!["high", "low"]);
    assert!(!state.all_fetched());
  }

  #[tokio::test]
  async fn test_next_page_appends_then_empty_page_sets_all_fetched() {
    let store = store_with(3).await;
    let layer = CacheLayer::new(store.clone());

    layer.initial_load(2).await.unwrap();
    layer.ensure_loaded(2, false).await.unwrap();
    assert_eq!(layer.snapshot().await.len(), 3);
    assert!(!layer.all_fetched().await);

    layer.ensure_loaded(2, false).await.unwrap();
    assert!(layer.all_fetched().await);

    let calls = store.list_calls();
    layer.ensure_loaded(2, true).await.unwrap();
    layer.ensure_loaded(2, false).await.unwrap();
    assert_eq!(store.list_calls(), calls);
  }

  #[tokio::test]
  async fn test_fetch_all_exhausts_collection() {
    let store = store_with(7).await;
    let layer = CacheLayer::new(store.clone());

    layer.initial_load(2).await.unwrap();
    layer.ensure_loaded(2, true).await.unwrap();

    let state = layer.snapshot().await;
    assert_eq!(state.len(), 7);
    assert!(state.all_fetched());
    // 1 initial + 3 more pages + 1 empty page
    assert_eq!(store.list_calls(), 5);
  }

  #[tokio::test]
  async fn test_concurrent_fetch_all_is_single_flight() {
    let store = store_with(6).await;
    store.set_delay(Duration::from_millis(20));
    let layer = CacheLayer::new(store.clone());

    let (a, b, c) = tokio::join!(
      layer.ensure_loaded(2, true),
      layer.ensure_loaded(2, true),
      layer.ensure_loaded(2, false),
    );
    a.unwrap();
    b.unwrap();
    c.unwrap();

    let state = layer.snapshot().await;
    assert_eq!(state.len(), 6);
    assert!(state.all_fetched());
    // 3 pages + 1 empty page, fetched once
    assert_eq!(store.list_calls(), 4);
  }

  #[tokio::test]
  async fn test_read_failure_leaves_cache_untouched() {
    let store = store_with(4).await;
    let layer = CacheLayer::new(store.clone());
    layer.initial_load(2).await.unwrap();
    let before = layer.snapshot().await;

    store.fail_next(StoreError::StoreUnavailable("offline".to_string()));
    let err = layer.ensure_loaded(2, true).await.unwrap_err();
    assert!(matches!(err, StoreError::StoreUnavailable(_)));
    assert_eq!(layer.snapshot().await, before);

    // Retrying by calling again works once the store recovers.
    layer.ensure_loaded(2, true).await.unwrap();
    assert_eq!(layer.snapshot().await.len(), 4);
  }

  #[tokio::test]
  async fn test_overlapping_pages_are_deduplicated() {
    let store = store_with(5).await;
    store.set_overlap(true);
    let layer = CacheLayer::new(store.clone());

    layer.initial_load(2).await.unwrap();
    layer.ensure_loaded(2, true).await.unwrap();

    let state = layer.snapshot().await;
    let mut ids: Vec<&str> = state.records().iter().map(|r| r.id.as_str()).collect();
    let total = ids.len();
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), total);
    assert_eq!(total, 5);
  }

  #[tokio::test(start_paused = true)]
  async fn test_page_in_flight_across_reset_is_dropped() {
    let store = store_with(3).await;
    let layer = CacheLayer::new(store.clone());
    layer.initial_load(1).await.unwrap();
    let deleted = store
      .list_page(ListOrder::priority_desc(), 3, None)
      .await
      .unwrap()
      .records[1]
      .id
      .clone();
    store.set_delay(Duration::from_millis(20));

    // The fetch-all reads P1 and P2, then P1 is deleted and the cache
    // reloaded before that page arrives.
    let (expanded, reloaded) = tokio::join!(layer.ensure_loaded(10, true), async {
      tokio::time::sleep(Duration::from_millis(5)).await;
      store.remove(&deleted).await.unwrap();
      layer.update(|state| state.remove(&deleted)).await;
      layer.initial_load(10).await
    });
    expanded.unwrap();
    reloaded.unwrap();

    let state = layer.snapshot().await;
    assert!(!state.contains(&deleted));
    assert_eq!(titles(&state), vec!["P0", "P2"]);
  }

  #[tokio::test]
  async fn test_failed_fetch_settles_its_ticket() {
    let store = store_with(2).await;
    let layer = CacheLayer::new(store.clone());
    layer.initial_load(1).await.unwrap();
    let before = layer.snapshot().await;

    store.fail_next(StoreError::StoreUnavailable("offline".to_string()));
    assert!(layer.ensure_loaded(1, false).await.is_err());
    assert_eq!(layer.snapshot().await, before);
  }

  #[tokio::test]
  async fn test_reset_restarts_pagination() {
    let store = store_with(3).await;
    let layer = CacheLayer::new(store.clone());
    layer.initial_load(1).await.unwrap();
    layer.ensure_loaded(1, true).await.unwrap();
    assert!(layer.all_fetched().await);

    layer.initial_load(1).await.unwrap();
    let state = layer.snapshot().await;
    assert_eq!(titles(&state), vec!["P0"]);
    assert!(!state.all_fetched());
  }
}
