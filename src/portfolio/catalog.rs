//! Portfolio facade: the cache, mutations, and the render pipeline in one
//! handle the presentation layer can clone into background tasks.

use std::sync::Arc;
use tracing::debug;

use super::filter::filter_sort;
use super::reconciler::Reconciler;
use super::types::{ProjectData, ProjectPatch, ProjectRecord, ViewState};
use super::window::{layout_slots, Slot, WindowSelector};
use crate::cache::{CacheLayer, CacheState};
use crate::store::{RecordStore, StoreError};

/// Everything the presentation layer needs to draw the project section
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectView {
  pub slots: Vec<Slot>,
  pub hidden_count: usize,
  /// Records matching the current search
  pub matching: usize,
  pub expanded: bool,
  pub all_fetched: bool,
}

impl ProjectView {
  /// The toggle is offered while something is hidden, or to collapse again.
  pub fn shows_toggle(&self) -> bool {
    self.hidden_count > 0 || self.expanded
  }
}

/// Project list backed by a record store and a local cache.
pub struct Portfolio<S: RecordStore> {
  cache: CacheLayer<S>,
  reconciler: Reconciler<S>,
  selector: WindowSelector,
  batch_size: usize,
}

impl<S: RecordStore> Portfolio<S> {
  pub fn new(store: Arc<S>, selector: WindowSelector, batch_size: usize) -> Self {
    let cache = CacheLayer::new(store);
    Self {
      reconciler: Reconciler::new(cache.clone()),
      cache,
      selector,
      batch_size: batch_size.max(1),
    }
  }

  /// Start over from an empty cache and fetch the first page.
  ///
  /// Used on startup and whenever admin mode flips.
  pub async fn reload(&self, view: &ViewState) -> Result<(), StoreError> {
    // One past the window so the toggle knows more exist without a second fetch
    let page_size = self.selector.page_size(view.viewport, view.is_admin) + 1;
    self.cache.initial_load(page_size).await
  }

  /// Compute the view for `view`, fetching whatever it is missing first.
  ///
  /// Fails when the store cannot supply the missing records. Filtering a
  /// partial cache would show wrong matches, so no view is built then and
  /// the cache is left as it was.
  pub async fn render(&self, view: &ViewState) -> Result<ProjectView, StoreError> {
    self.prefetch(view).await?;
    let state = self.cache.snapshot().await;
    Ok(self.build_view(&state, view))
  }

  fn build_view(&self, state: &CacheState<ProjectRecord>, view: &ViewState) -> ProjectView {
    let ordered = filter_sort(state.records(), &view.search, view.sort);
    let matching = ordered.len();
    let (visible, hidden_count) =
      self
        .selector
        .select_visible(&ordered, view.expanded, view.is_admin, view.viewport);
    let visible = visible.into_iter().cloned().collect();

    ProjectView {
      slots: layout_slots(visible, view.is_admin, view.viewport),
      hidden_count,
      matching,
      expanded: view.expanded,
      all_fetched: state.all_fetched(),
    }
  }

  async fn prefetch(&self, view: &ViewState) -> Result<(), StoreError> {
    if view.requires_full_data() {
      return self.cache.ensure_loaded(self.batch_size, true).await;
    }

    let page_size = self.selector.page_size(view.viewport, view.is_admin);
    loop {
      let state = self.cache.snapshot().await;
      let ordered_len = filter_sort(state.records(), &view.search, view.sort).len();
      if !self
        .selector
        .needs_more_data(ordered_len, view.viewport, view.is_admin, state.all_fetched())
      {
        return Ok(());
      }
      debug!(ordered_len, page_size, "window short of records, fetching a page");
      self.cache.ensure_loaded(page_size + 1, false).await?;
    }
  }

  pub async fn create(&self, data: ProjectData) -> Result<String, StoreError> {
    self.reconciler.create(data).await
  }

  pub async fn update(&self, id: &str, patch: ProjectPatch) -> Result<(), StoreError> {
    self.reconciler.update(id, patch).await
  }

  pub async fn delete(&self, id: &str) -> Result<(), StoreError> {
    self.reconciler.delete(id).await
  }
}

impl<S: RecordStore> Clone for Portfolio<S> {
  fn clone(&self) -> Self {
    Self {
      cache: self.cache.clone(),
      reconciler: self.reconciler.clone(),
      selector: self.selector,
      batch_size: self.batch_size,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::portfolio::types::{SortKey, Viewport};
  use crate::store::memory::MemoryStore;

  fn portfolio(titles: &[(&str, &[&str], Option<i64>)]) -> (Arc<MemoryStore>, Portfolio<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    for (title, tech, priority) in titles {
      store.seed(ProjectData {
        title: title.to_string(),
        tech: tech.iter().map(|t| t.to_string()).collect(),
        priority: *priority,
        ..Default::default()
      });
    }
    let portfolio = Portfolio::new(store.clone(), WindowSelector::default(), 2);
    (store, portfolio)
  }

  fn titles(view: &ProjectView) -> Vec<String> {
    view
      .slots
      .iter()
      .filter_map(|slot| match slot {
        Slot::Project(record) => Some(record.title.clone()),
        _ => None,
      })
      .collect()
  }

  fn five() -> Vec<(&'static str, &'static [&'static str], Option<i64>)> {
    vec![
      ("Alpha", &["Rust"], Some(50)),
      ("Bravo", &["Go"], Some(40)),
      ("Charlie", &["Rust", "WASM"], Some(30)),
      ("Delta", &["Python"], Some(20)),
      ("Echo", &["Rust"], None),
    ]
  }

  #[tokio::test]
  async fn test_initial_render_shows_first_page_and_toggle() {
    let (store, portfolio) = portfolio(&five());
    let view = ViewState::default();
    portfolio.reload(&view).await.unwrap();

    let rendered = portfolio.render(&view).await.unwrap();
    assert_eq!(titles(&rendered), vec!["Alpha", "Bravo", "Charlie"]);
    assert_eq!(rendered.hidden_count, 1);
    assert!(rendered.shows_toggle());
    assert!(!rendered.all_fetched);
    // Page of 4 covers the window plus one, no extra fetch on render
    assert_eq!(store.list_calls(), 1);
  }

  #[tokio::test]
  async fn test_search_fetches_everything_before_filtering() {
    let (_store, portfolio) = portfolio(&five());
    let mut view = ViewState::default();
    portfolio.reload(&view).await.unwrap();

    view.search = "rust".to_string();
    view.expanded = true;
    let rendered = portfolio.render(&view).await.unwrap();
    assert_eq!(titles(&rendered), vec!["Alpha", "Charlie", "Echo"]);
    assert!(rendered.all_fetched);
    assert_eq!(rendered.hidden_count, 0);
  }

  #[tokio::test]
  async fn test_sort_change_sees_unfetched_records() {
    let (_store, portfolio) = portfolio(&five());
    let mut view = ViewState::default();
    portfolio.reload(&view).await.unwrap();

    view.sort = SortKey::NameDesc;
    let rendered = portfolio.render(&view).await.unwrap();
    assert_eq!(titles(&rendered), vec!["Echo", "Delta", "Charlie"]);
  }

  #[tokio::test]
  async fn test_admin_reserves_slot_for_add_card() {
    let (_store, portfolio) = portfolio(&five());
    let view = ViewState {
      is_admin: true,
      ..Default::default()
    };
    portfolio.reload(&view).await.unwrap();

    let rendered = portfolio.render(&view).await.unwrap();
    assert_eq!(rendered.slots.len(), 3);
    assert_eq!(rendered.slots[2], Slot::AddProject);
    assert_eq!(rendered.hidden_count, 1);
  }

  #[tokio::test]
  async fn test_resize_to_mobile_fetches_missing_records() {
    let (_store, portfolio) = portfolio(&five());
    let mut view = ViewState::default();
    portfolio.reload(&view).await.unwrap();

    view.viewport = Viewport::Mobile;
    let rendered = portfolio.render(&view).await.unwrap();
    assert_eq!(titles(&rendered).len(), 4);
    assert_eq!(rendered.hidden_count, 1);
  }

  #[tokio::test]
  async fn test_failed_search_builds_no_view() {
    let (store, portfolio) = portfolio(&five());
    let mut view = ViewState::default();
    portfolio.reload(&view).await.unwrap();
    portfolio.render(&view).await.unwrap();
    let calls = store.list_calls();

    store.fail_next(StoreError::StoreUnavailable("offline".to_string()));
    view.search = "echo".to_string();
    let err = portfolio.render(&view).await.unwrap_err();
    assert!(matches!(err, StoreError::StoreUnavailable(_)));
    assert_eq!(store.list_calls(), calls + 1);

    // The next attempt fetches what was missing and finds the match
    let rendered = portfolio.render(&view).await.unwrap();
    assert_eq!(titles(&rendered), vec!["Echo"]);
    assert_eq!(rendered.matching, 1);
  }

  #[tokio::test]
  async fn test_mutations_show_up_without_refetch() {
    let (store, portfolio) = portfolio(&five());
    let view = ViewState {
      expanded: true,
      ..Default::default()
    };
    portfolio.reload(&view).await.unwrap();
    portfolio.render(&view).await.unwrap();
    let calls = store.list_calls();

    let id = portfolio
      .create(ProjectData {
        title: "Foxtrot".to_string(),
        priority: Some(45),
        ..Default::default()
      })
      .await
      .unwrap();
    let rendered = portfolio.render(&view).await.unwrap();
    assert_eq!(
      titles(&rendered),
      vec!["Alpha", "Foxtrot", "Bravo", "Charlie", "Delta", "Echo"]
    );

    portfolio.delete(&id).await.unwrap();
    let rendered = portfolio.render(&view).await.unwrap();
    assert!(!titles(&rendered).contains(&"Foxtrot".to_string()));
    assert_eq!(store.list_calls(), calls);
  }
}
