//! Trailing-edge debouncing on the local task set.
use std::{cell::RefCell, time::Duration};

use log::trace;
use tokio::task::JoinHandle;

/// Runs only the last scheduled action of a burst, once `delay` has passed without a new one.
///
/// Tasks are spawned with [`tokio::task::spawn_local`], so the debouncer must be used
/// from inside a [`tokio::task::LocalSet`].
#[derive(Debug)]
pub struct Debouncer {
    delay: Duration,
    pending: RefCell<Option<JoinHandle<()>>>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: RefCell::new(None),
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Cancels any pending action and schedules `action` to run after the delay.
    pub fn schedule<F>(&self, action: F)
    where
        F: FnOnce() + 'static,
    {
        self.cancel();
        let delay = self.delay;
        let handle = tokio::task::spawn_local(async move {
            tokio::time::sleep(delay).await;
            action();
        });
        *self.pending.borrow_mut() = Some(handle);
    }

    /// Drops the pending action, if any.
    pub fn cancel(&self) {
        if let Some(handle) = self.pending.borrow_mut().take() {
            if !handle.is_finished() {
                trace!("Cancelling pending debounced action");
            }
            handle.abort();
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending
            .borrow()
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Waits for the pending action to run.
    pub async fn settle(&self) {
        let handle = self.pending.borrow_mut().take();
        if let Some(handle) = handle {
            // An aborted task is the only way this fails, and then there is nothing to wait for
            let _ = handle.await;
        }
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}
