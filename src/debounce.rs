//! Timer-based coalescing of bursty input.
//!
//! A [`Debouncer`] forwards only the last value pushed during a burst, once
//! no new value has arrived for the quiescence window. It knows nothing
//! about where values come from; the app feeds it search keystrokes and
//! terminal resizes.

use std::time::Duration;
use tokio::sync::mpsc;

/// Handle for pushing values into a running debounce task.
///
/// Dropping the handle flushes any pending value and ends the task.
#[derive(Debug, Clone)]
pub struct Debouncer<T> {
  tx: mpsc::UnboundedSender<T>,
}

impl<T: Send + 'static> Debouncer<T> {
  /// Spawn the debounce task. `on_settle` runs on the task for each value
  /// that survives a burst.
  pub fn spawn<F>(window: Duration, on_settle: F) -> Self
  where
    F: Fn(T) + Send + 'static,
  {
    let (tx, mut rx) = mpsc::unbounded_channel::<T>();

    tokio::spawn(async move {
      let mut pending: Option<T> = None;
      loop {
        match pending.take() {
          None => match rx.recv().await {
            Some(value) => pending = Some(value),
            None => break,
          },
          Some(value) => {
            tokio::select! {
              next = rx.recv() => match next {
                Some(newer) => pending = Some(newer),
                None => {
                  on_settle(value);
                  break;
                }
              },
              _ = tokio::time::sleep(window) => on_settle(value),
            }
          }
        }
      }
    });

    Self { tx }
  }

  /// Queue a value; it replaces anything still waiting.
  pub fn push(&self, value: T) {
    // Send only fails once the task has exited.
    let _ = self.tx.send(value);
  }
}
