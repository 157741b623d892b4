//! Admin mode signal.
//!
//! Admin mode is an opaque boolean owned by whoever grants it; the project
//! list only reads it and reacts to changes. Subscribers are kept in a list,
//! so registering a second handler never replaces the first.

use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use tracing::info;

use crate::store::StoreError;

/// Message that turns a contact-form submission into an admin login
pub const ADMIN_TRIGGER: &str = "enable_admin";

type Callback = Arc<dyn Fn(bool) + Send + Sync>;

/// Handle returned by [`AdminMode::on_admin_mode_change`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriptionId(u64);

#[derive(Default)]
struct Inner {
  enabled: bool,
  next_id: u64,
  subscribers: Vec<(SubscriptionId, Callback)>,
}

/// Shared admin-mode flag with change notification
#[derive(Clone, Default)]
pub struct AdminMode {
  inner: Arc<Mutex<Inner>>,
}

impl AdminMode {
  pub fn new(enabled: bool) -> Self {
    let mode = Self::default();
    mode.lock().enabled = enabled;
    mode
  }

  fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
    self.inner.lock().unwrap_or_else(|e| e.into_inner())
  }

  pub fn is_admin_mode(&self) -> bool {
    self.lock().enabled
  }

  /// Set the flag. Subscribers run synchronously, and only if the value
  /// actually flipped.
  pub fn set_admin_mode(&self, enabled: bool) {
    let callbacks: Vec<Callback> = {
      let mut inner = self.lock();
      if inner.enabled == enabled {
        return;
      }
      inner.enabled = enabled;
      inner.subscribers.iter().map(|(_, cb)| Arc::clone(cb)).collect()
    };

    info!(enabled, "admin mode changed");
    for callback in callbacks {
      callback(enabled);
    }
  }

  pub fn on_admin_mode_change<F>(&self, callback: F) -> SubscriptionId
  where
    F: Fn(bool) + Send + Sync + 'static,
  {
    let mut inner = self.lock();
    let id = SubscriptionId(inner.next_id);
    inner.next_id += 1;
    inner.subscribers.push((id, Arc::new(callback)));
    id
  }

  pub fn unsubscribe(&self, id: SubscriptionId) {
    self.lock().subscribers.retain(|(sub, _)| *sub != id);
  }
}

/// Source of truth for contact-form admin credentials
#[async_trait]
pub trait AdminDirectory: Send + Sync + 'static {
  async fn verify_admin(&self, name: &str, email: &str, secret: &str) -> Result<bool, StoreError>;
}

/// What a contact-form submission amounted to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContactOutcome {
  /// Ordinary message
  Sent,
  AdminEnabled,
  InvalidCredentials,
}

/// Handle a contact-form submission.
///
/// Only the trigger message reaches the directory; everything else is an
/// ordinary message.
pub async fn submit_contact<D: AdminDirectory + ?Sized>(
  directory: &D,
  admin: &AdminMode,
  name: &str,
  email: &str,
  message: &str,
) -> Result<ContactOutcome, StoreError> {
  let message = message.trim();
  if message != ADMIN_TRIGGER {
    return Ok(ContactOutcome::Sent);
  }

  if directory
    .verify_admin(name.trim(), email.trim(), message)
    .await?
  {
    admin.set_admin_mode(true);
    Ok(ContactOutcome::AdminEnabled)
  } else {
    Ok(ContactOutcome::InvalidCredentials)
  }
}
