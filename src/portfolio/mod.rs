//! Project list domain: records, filtering and sorting, the visible window,
//! and mutations reconciled against the cache.

mod catalog;
mod filter;
mod reconciler;
mod types;
mod window;

pub use catalog::{Portfolio, ProjectView};
pub use filter::parse_date;
pub use types::{
  parse_tech_list, ProjectData, ProjectPatch, ProjectRecord, ViewState, Viewport, UNTITLED,
};
pub use window::{PageSizes, Slot, WindowSelector};
