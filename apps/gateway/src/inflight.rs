use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};

use tracing::debug;

use crate::errors::AppError;

type Key = (String, &'static str);

/// Per-user registry of single-shot actions that are currently running.
/// A second request for the same action is refused until the first settles.
#[derive(Clone, Default)]
pub struct InFlight {
    active: Arc<Mutex<HashSet<Key>>>,
}

impl InFlight {
    pub fn acquire(&self, user_id: &str, action: &'static str) -> Result<InFlightGuard, AppError> {
        let key = (user_id.to_string(), action);
        let mut active = self.active.lock().unwrap_or_else(PoisonError::into_inner);
        if !active.insert(key.clone()) {
            return Err(AppError::Conflict(format!(
                "A {action} request is already in progress"
            )));
        }
        debug!(user_id, action, "In-flight action started");
        Ok(InFlightGuard {
            active: self.active.clone(),
            key,
        })
    }
}

/// Releases the action when dropped, whether the request succeeded, failed
/// or was cancelled.
pub struct InFlightGuard {
    active: Arc<Mutex<HashSet<Key>>>,
    key: Key,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.active
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.key);
    }
}
