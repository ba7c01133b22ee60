//! Bounded ring-buffer storage engine for journal records.
//!
//! The coordinator depends only on the operations exposed here:
//!
//! - [`JournalStore`]: per-member registry of containers with atomic
//!   get-or-create, lookup and destroy
//! - [`JournalContainer`]: one `(namespace, partition)` log with head/tail
//!   tracking, capacity and TTL eviction, and batched reads
//! - [`ReadResultSet`]: accumulator filled by batched reads
//! - [`StoreHandle`]: late-bound access to the store during start-up and
//!   shutdown

pub mod container;
pub mod read_result;
mod ringbuffer;
pub mod service;

pub use container::JournalContainer;
pub use read_result::ReadResultSet;
pub use service::{JOURNAL_STORE_SERVICE_NAME, JournalStore, StoreHandle};
