//! Error types for the event journal.
//!
//! [`JournalError`] covers every failure surfaced by the coordinator and the
//! storage engine: missing or destroyed journals, out-of-range sequences,
//! an unregistered store, invalid storage configuration and serialization
//! failures.

use crate::namespace::PartitionId;
use crate::serialization::SerializationError;
use std::fmt;

/// Errors that can occur within the event journal.
#[derive(Debug)]
#[non_exhaustive]
pub enum JournalError {
    /// No journal exists for the object and none can be created, because
    /// it is disabled, unregistered, or the cluster is below the minimum
    /// version for event journals.
    NotConfigured {
        /// Name of the object whose journal was requested.
        object_name: String,
    },

    /// The requested sequence is beyond `tail + 1`, so it cannot be
    /// reached by waiting.
    SequenceTooLarge {
        /// The requested sequence.
        sequence: i64,
        /// The tail sequence at the time of the check.
        tail_sequence: i64,
    },

    /// The requested sequence has already been evicted from the head.
    StaleSequence {
        /// The requested sequence.
        sequence: i64,
        /// The head sequence at the time of the check.
        head_sequence: i64,
    },

    /// The journal was destroyed while a blocking reader waited on it.
    Destroyed {
        /// Name of the object whose journal was destroyed.
        object_name: String,
        /// Partition of the destroyed journal.
        partition_id: PartitionId,
    },

    /// A collaborating service has not been registered yet.
    ServiceUnavailable {
        /// Name of the missing service.
        service: &'static str,
    },

    /// The journal or storage configuration cannot be used.
    InvalidConfig {
        /// Description of the problem.
        message: String,
    },

    /// A read request is malformed (for example `min_size > max_size`).
    InvalidReadRequest {
        /// Description of the problem.
        message: String,
    },

    /// A key or value could not be converted to or from wire form.
    Serialization {
        /// The underlying serialization error message.
        message: String,
    },

    /// An internal lock was poisoned (another thread panicked while
    /// holding it).
    LockPoisoned,
}

impl JournalError {
    /// Returns `true` for the two out-of-range sequence conditions.
    ///
    /// A caller receiving one of these must adjust the sequence before
    /// retrying.
    #[must_use]
    pub fn is_out_of_range(&self) -> bool {
        matches!(
            self,
            JournalError::SequenceTooLarge { .. } | JournalError::StaleSequence { .. }
        )
    }
}

impl fmt::Display for JournalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JournalError::NotConfigured { object_name } => {
                write!(
                    f,
                    "there is no event journal configured for map with name: {object_name}"
                )
            }
            JournalError::SequenceTooLarge {
                sequence,
                tail_sequence,
            } => {
                write!(
                    f,
                    "sequence {sequence} is too large: the current tail sequence is {tail_sequence}"
                )
            }
            JournalError::StaleSequence {
                sequence,
                head_sequence,
            } => {
                write!(
                    f,
                    "sequence {sequence} is too small: the current head sequence is {head_sequence}"
                )
            }
            JournalError::Destroyed {
                object_name,
                partition_id,
            } => {
                write!(
                    f,
                    "event journal of map {object_name} on partition {partition_id} was destroyed"
                )
            }
            JournalError::ServiceUnavailable { service } => {
                write!(f, "service {service} is not available")
            }
            JournalError::InvalidConfig { message } => {
                write!(f, "invalid journal configuration: {message}")
            }
            JournalError::InvalidReadRequest { message } => {
                write!(f, "invalid journal read request: {message}")
            }
            JournalError::Serialization { message } => {
                write!(f, "journal serialization error: {message}")
            }
            JournalError::LockPoisoned => {
                write!(f, "journal internal lock poisoned")
            }
        }
    }
}

impl std::error::Error for JournalError {}

impl From<SerializationError> for JournalError {
    #[cold]
    fn from(err: SerializationError) -> Self {
        JournalError::Serialization {
            message: err.message,
        }
    }
}
