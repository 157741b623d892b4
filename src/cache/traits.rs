//! Core traits for cached entities.

/// Trait for entities that can be held in a [`CacheState`](super::CacheState).
///
/// The cache key must be stable for the lifetime of the entity; two values
/// with the same key are two snapshots of the same store record.
pub trait Cacheable: Clone + Send + Sync + 'static {
  /// Unique identifier for this entity (the store-assigned id)
  fn cache_key(&self) -> &str;
}
