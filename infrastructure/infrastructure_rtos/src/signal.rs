//! Signal Module
//!
//! A one-shot rendezvous between a thread that waits and a callback that
//! delivers a value. It behaves like an RTOS thread flag: a signal raised before
//! the waiter arrives is not lost, and the wait consumes it.
//!
//! Each rendezvous is owned by the call that created it, so there is no shared
//! "pending request" slot for an unrelated caller to corrupt.

use std::time::Duration;

use parking_lot::{Condvar, Mutex};

/// One-shot wait/signal cell
#[derive(Debug, Default)]
pub struct Rendezvous<T> {
    slot: Mutex<Option<T>>,
    ready: Condvar,
}

impl<T> Rendezvous<T> {
    pub fn new() -> Self {
        Self {
            slot: Mutex::new(None),
            ready: Condvar::new(),
        }
    }

    /// Deliver `value` and wake the waiter. Only the first signal is kept.
    pub fn signal(&self, value: T) {
        let mut slot = self.slot.lock();
        if slot.is_none() {
            *slot = Some(value);
            self.ready.notify_one();
        }
    }

    /// Block until a value has been signaled, with no timeout.
    pub fn wait(&self) -> T {
        let mut slot = self.slot.lock();
        loop {
            if let Some(value) = slot.take() {
                return value;
            }
            self.ready.wait(&mut slot);
        }
    }

    /// Block for at most `timeout`; `None` if nothing was signaled in time.
    pub fn wait_timeout(&self, timeout: Duration) -> Option<T> {
        let mut slot = self.slot.lock();
        if slot.is_none() {
            let _ = self.ready.wait_for(&mut slot, timeout);
        }
        slot.take()
    }

    pub fn is_signaled(&self) -> bool {
        self.slot.lock().is_some()
    }
}
