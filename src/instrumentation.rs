//! Counters exported through the `metrics` facade.
//!
//! With the `metrics` feature disabled every recorder compiles to nothing.

use crate::journal::event::EventType;

/// Counter: journal records appended, labelled by `event_type`.
pub const WRITES_TOTAL: &str = "event_journal_writes_total";
/// Counter: journal containers created.
pub const CONTAINERS_CREATED_TOTAL: &str = "event_journal_containers_created_total";
/// Counter: journal containers destroyed.
pub const CONTAINERS_DESTROYED_TOTAL: &str = "event_journal_containers_destroyed_total";

#[cfg(feature = "metrics")]
#[inline]
pub(crate) fn record_write(event_type: EventType) {
    ::metrics::counter!(WRITES_TOTAL, "event_type" => event_type.as_str()).increment(1);
}

#[cfg(not(feature = "metrics"))]
#[inline]
pub(crate) fn record_write(_event_type: EventType) {}

#[cfg(feature = "metrics")]
#[inline]
pub(crate) fn record_container_created() {
    ::metrics::counter!(CONTAINERS_CREATED_TOTAL).increment(1);
}

#[cfg(not(feature = "metrics"))]
#[inline]
pub(crate) fn record_container_created() {}

#[cfg(feature = "metrics")]
#[inline]
pub(crate) fn record_container_destroyed() {
    ::metrics::counter!(CONTAINERS_DESTROYED_TOTAL).increment(1);
}

#[cfg(not(feature = "metrics"))]
#[inline]
pub(crate) fn record_container_destroyed() {}
