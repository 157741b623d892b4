//! Render trigger ordering.
//!
//! Every trigger takes a ticket before its render starts. Renders finish
//! out of order (some fetch, some don't), so a finished view is applied
//! only if no later ticket has been applied already.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Why a render was requested
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderTrigger {
  InitialLoad,
  Search,
  Sort,
  Resize,
  AdminModeChanged,
  Toggle,
  Mutation,
  Reload,
}

impl RenderTrigger {
  pub fn label(&self) -> &'static str {
    match self {
      RenderTrigger::InitialLoad => "initial load",
      RenderTrigger::Search => "search",
      RenderTrigger::Sort => "sort",
      RenderTrigger::Resize => "resize",
      RenderTrigger::AdminModeChanged => "admin mode",
      RenderTrigger::Toggle => "toggle",
      RenderTrigger::Mutation => "mutation",
      RenderTrigger::Reload => "reload",
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderTicket {
  pub seq: u64,
  pub trigger: RenderTrigger,
}

/// Issues tickets and decides which finished renders are still current
#[derive(Debug, Clone, Default)]
pub struct RenderSequencer {
  issued: Arc<AtomicU64>,
  applied: Arc<AtomicU64>,
}

impl RenderSequencer {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn issue(&self, trigger: RenderTrigger) -> RenderTicket {
    let seq = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
    RenderTicket { seq, trigger }
  }

  /// Claim the screen for `ticket`. False if a later ticket got there first.
  pub fn accept(&self, ticket: &RenderTicket) -> bool {
    self.applied.fetch_max(ticket.seq, Ordering::SeqCst) < ticket.seq
  }

  /// Whether a later trigger has been issued since `ticket`
  pub fn is_superseded(&self, ticket: &RenderTicket) -> bool {
    self.issued.load(Ordering::SeqCst) > ticket.seq
  }
}
