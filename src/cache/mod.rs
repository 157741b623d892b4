//! Local mirror of the projects collection.
//!
//! This module owns the client-side cache and the logic that fills it:
//! - `CacheState` holds fetched records, the pagination cursor, and the
//!   "everything fetched" flag, merging pages idempotently by record id
//! - `CacheLayer` decides when the store must be asked for more pages and
//!   serializes every write to the cache through one entry point
//! - at most one fetch-all runs at a time; concurrent callers share it

mod layer;
mod state;
mod traits;

pub use layer::CacheLayer;
pub use state::CacheState;
pub use traits::Cacheable;
