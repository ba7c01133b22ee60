//! Journal coordination layer.
//!
//! This module ties the storage engine, the configuration registry, the
//! cluster collaborators and the wait registry together:
//!
//! - [`EventRecord`]: one logged map mutation
//! - [`ConfigResolver`]: version-gated config lookup and per-partition
//!   storage config derivation
//! - [`MapEventJournal`]: the journal contract the map and its consumers use
//! - [`JournalCoordinator`]: the ring-buffer backed implementation
//! - [`InitialSubscriberState`]: sequence range returned by subscriptions
//! - [`JournalError`]: error type for all journal operations

pub mod coordinator;
pub mod error;
pub mod event;
pub mod reader;
pub mod resolver;

pub use coordinator::{EventContainer, JournalCoordinator, MapEventJournal};
pub use error::JournalError;
pub use event::{EventRecord, EventType, MapEvent};
pub use reader::InitialSubscriberState;
pub use resolver::{ConfigResolver, MIN_EVENT_JOURNAL_VERSION, to_storage_config};
