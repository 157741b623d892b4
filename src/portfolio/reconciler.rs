//! Applies create/update/delete to the store, then patches the cache.

use tracing::info;

use super::types::{ProjectData, ProjectPatch, ProjectRecord};
use crate::cache::CacheLayer;
use crate::store::{RecordStore, StoreError};

/// Mutation front-end for the projects collection.
///
/// Each operation writes to the store first and patches the cache only once
/// the store has confirmed. A failed write leaves the cache as it was.
pub struct Reconciler<S: RecordStore> {
  cache: CacheLayer<S>,
}

impl<S: RecordStore> Reconciler<S> {
  pub fn new(cache: CacheLayer<S>) -> Self {
    Self { cache }
  }

  /// Insert a project and append it to the cache under the store's id.
  pub async fn create(&self, data: ProjectData) -> Result<String, StoreError> {
    let id = self.cache.store().insert(&data).await?;
    let record = ProjectRecord::from_data(id.clone(), data);
    self.cache.update(|state| state.upsert(record)).await;
    info!(%id, "project created");
    Ok(id)
  }

  /// Update a cached project.
  ///
  /// Fails with `NotFound` without calling the store when `id` is not in
  /// the cache.
  pub async fn update(&self, id: &str, patch: ProjectPatch) -> Result<(), StoreError> {
    let known = self.cache.update(|state| state.contains(id)).await;
    if !known {
      return Err(StoreError::NotFound(id.to_string()));
    }

    self.cache.store().update(id, &patch).await?;
    let patched = self
      .cache
      .update(|state| state.patch(id, |record| patch.apply_to(record)))
      .await;
    info!(%id, patched, "project updated");
    Ok(())
  }

  /// Delete a project and drop it from the cache.
  pub async fn delete(&self, id: &str) -> Result<(), StoreError> {
    self.cache.store().remove(id).await?;
    self.cache.update(|state| state.remove(id)).await;
    info!(%id, "project deleted");
    Ok(())
  }
}

impl<S: RecordStore> Clone for Reconciler<S> {
  fn clone(&self) -> Self {
    Self {
      cache: self.cache.clone(),
    }
  }
}
