/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 14/10/26
******************************************************************************/

//! Park/unpark registry for blocking journal reads.
//!
//! Readers waiting for a sequence that has not been written yet park on the
//! journal's [`WaitKey`]. Any write to that journal unparks every waiter,
//! which then re-checks availability. Wake-ups may be spurious; the
//! re-check, not the wake-up, decides readiness.
//!
//! Parking suspends an async task, not a thread. Timeouts and cancellation
//! belong to the caller (`tokio::time::timeout`, dropping the future).
//!
//! The wake-up cannot be lost between the check and the park as long as
//! the waiter follows this order:
//!
//! ```
//! # use map_event_journal::parker::WaitRegistry;
//! # use map_event_journal::namespace::WaitKey;
//! # async fn wait(registry: &WaitRegistry, key: &WaitKey, ready: impl Fn() -> bool) {
//! let waiter = registry.waiter(key);
//! loop {
//!     // register interest first ...
//!     let notified = waiter.notified();
//!     // ... then re-check
//!     if ready() {
//!         break;
//!     }
//!     notified.await;
//! }
//! # }
//! ```

use crate::namespace::WaitKey;
use dashmap::DashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Notify;
use tokio::sync::futures::Notified;
use tracing::trace;

/// Something writers unpark readers for, identified by its wait key.
pub trait Notifier {
    /// The key readers of this object park on.
    fn notified_key(&self) -> &WaitKey;
}

#[derive(Debug, Default)]
struct Channel {
    notify: Notify,
    cancelled: AtomicBool,
}

/// Registry of parked readers, one notification channel per wait key.
///
/// A key has a channel only while some [`Waiter`] holds it. The last waiter
/// to drop removes the channel.
#[derive(Debug, Default)]
pub struct WaitRegistry {
    channels: DashMap<WaitKey, Arc<Channel>>,
}

impl WaitRegistry {
    /// An empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a waiter for `key`, registering the key if needed.
    #[must_use]
    pub fn waiter(&self, key: &WaitKey) -> Waiter<'_> {
        let channel = self
            .channels
            .entry(key.clone())
            .or_insert_with(|| Arc::new(Channel::default()));
        Waiter {
            registry: self,
            key: key.clone(),
            channel: Arc::clone(channel.value()),
        }
    }

    /// Wakes every reader parked on `notifier`'s key.
    pub fn unpark<N>(&self, notifier: &N)
    where
        N: Notifier + ?Sized,
    {
        self.unpark_key(notifier.notified_key());
    }

    /// Wakes every reader parked on `key`. A no-op if nobody is parked.
    pub fn unpark_key(&self, key: &WaitKey) {
        if let Some(channel) = self.channels.get(key) {
            trace!(key = %key, "unparking journal readers");
            channel.notify.notify_waiters();
        }
    }

    /// Wakes every reader parked on `key`, marks their waiters cancelled and
    /// forgets the key.
    ///
    /// Used when a journal is torn down. Waiters registered afterwards get a
    /// fresh channel.
    pub fn cancel(&self, key: &WaitKey) {
        if let Some((_, channel)) = self.channels.remove(key) {
            trace!(key = %key, "cancelling journal readers");
            channel.cancelled.store(true, Ordering::Release);
            channel.notify.notify_waiters();
        }
    }

    /// Number of keys that currently have a channel.
    #[must_use]
    pub fn registered_keys(&self) -> usize {
        self.channels.len()
    }
}

/// A reader's registration on one wait key.
///
/// Dropping the last waiter of a key unregisters the key.
#[derive(Debug)]
pub struct Waiter<'a> {
    registry: &'a WaitRegistry,
    key: WaitKey,
    channel: Arc<Channel>,
}

impl Waiter<'_> {
    /// A future that completes on the next unpark or cancel of this key.
    ///
    /// It receives wake-ups from the moment it is created, even before it
    /// is first polled.
    pub fn notified(&self) -> Notified<'_> {
        self.channel.notify.notified()
    }

    /// Returns `true` once the key was cancelled after this waiter
    /// registered.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.channel.cancelled.load(Ordering::Acquire)
    }

    /// The key this waiter is registered on.
    #[must_use]
    pub fn key(&self) -> &WaitKey {
        &self.key
    }
}

impl Drop for Waiter<'_> {
    fn drop(&mut self) {
        // the registry's reference plus ours
        self.registry.channels.remove_if(&self.key, |_, channel| {
            Arc::ptr_eq(channel, &self.channel) && Arc::strong_count(channel) == 2
        });
    }
}
