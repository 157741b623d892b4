use crossterm::event::{self, Event as CrosstermEvent, KeyEvent, KeyEventKind};
use std::time::Duration;
use tokio::sync::mpsc;

use crate::admin::ContactOutcome;
use crate::portfolio::ProjectView;
use crate::render::RenderTicket;
use crate::store::StoreError;

/// Which mutation finished
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
  Created { title: String },
  Updated { title: String },
  Deleted,
}

/// Application events
#[derive(Debug)]
pub enum Event {
  /// Terminal key press
  Key(KeyEvent),
  /// Raw terminal resize, before debouncing
  Resize(u16),
  /// Periodic tick for UI refresh
  Tick,
  /// Search term after the debounce window
  SearchSettled(String),
  /// Terminal width after the debounce window
  ResizeSettled(u16),
  AdminModeChanged(bool),
  /// A background render finished, or the store failed it
  Rendered(RenderTicket, Result<ProjectView, StoreError>),
  Mutated(Result<Mutation, StoreError>),
  ContactSubmitted(Result<ContactOutcome, StoreError>),
}

/// Event handler that produces events from terminal input and a tick timer
pub struct EventHandler {
  tx: mpsc::UnboundedSender<Event>,
  rx: mpsc::UnboundedReceiver<Event>,
}

impl EventHandler {
  /// Create a new event handler with the given tick rate
  pub fn new(tick_rate: Duration) -> Self {
    let (tx, rx) = mpsc::unbounded_channel();

    // crossterm polling blocks, keep it off the async workers
    let input_tx = tx.clone();
    tokio::task::spawn_blocking(move || loop {
      let event = if event::poll(tick_rate).unwrap_or(false) {
        match event::read() {
          Ok(CrosstermEvent::Key(key)) if key.kind == KeyEventKind::Press => Event::Key(key),
          Ok(CrosstermEvent::Resize(width, _)) => Event::Resize(width),
          _ => continue,
        }
      } else {
        Event::Tick
      };
      if input_tx.send(event).is_err() {
        break;
      }
    });

    Self { tx, rx }
  }

  /// Sender for background tasks reporting back to the app
  pub fn sender(&self) -> mpsc::UnboundedSender<Event> {
    self.tx.clone()
  }

  /// Receive the next event
  pub async fn next(&mut self) -> Option<Event> {
    self.rx.recv().await
  }
}
