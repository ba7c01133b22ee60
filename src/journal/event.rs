//! Journal event records.
//!
//! An [`EventRecord`] is one logged map mutation. Its shape is fixed by the
//! event type: `Added` carries only the new value, `Removed` and `Evicted`
//! carry only the old value, and `Updated` carries both. The constructors
//! are the only way to build a record, so a malformed shape cannot exist.

use crate::serialization::{Data, SerializationError, WireSerializer};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of map mutation recorded in the journal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventType {
    /// An entry was added.
    Added,
    /// An entry was removed explicitly.
    Removed,
    /// An existing entry's value was replaced.
    Updated,
    /// An entry was evicted by the map's eviction policy.
    Evicted,
}

impl EventType {
    /// Stable numeric identifier of the event type.
    #[must_use]
    pub const fn type_id(self) -> i32 {
        match self {
            EventType::Added => 1,
            EventType::Removed => 1 << 1,
            EventType::Updated => 1 << 2,
            EventType::Evicted => 1 << 3,
        }
    }

    /// Looks an event type up by its numeric identifier.
    #[must_use]
    pub const fn from_type_id(type_id: i32) -> Option<Self> {
        match type_id {
            1 => Some(EventType::Added),
            2 => Some(EventType::Removed),
            4 => Some(EventType::Updated),
            8 => Some(EventType::Evicted),
            _ => None,
        }
    }

    /// Upper-case name, used as a log field and metric label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            EventType::Added => "ADDED",
            EventType::Removed => "REMOVED",
            EventType::Updated => "UPDATED",
            EventType::Evicted => "EVICTED",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One logged map mutation, with key and values in wire form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventRecord {
    key: Data,
    new_value: Option<Data>,
    old_value: Option<Data>,
    event_type: EventType,
}

impl EventRecord {
    /// A new entry `key -> new_value`.
    #[must_use]
    pub fn added(key: Data, new_value: Data) -> Self {
        Self {
            key,
            new_value: Some(new_value),
            old_value: None,
            event_type: EventType::Added,
        }
    }

    /// `key` changed from `old_value` to `new_value`.
    #[must_use]
    pub fn updated(key: Data, old_value: Data, new_value: Data) -> Self {
        Self {
            key,
            new_value: Some(new_value),
            old_value: Some(old_value),
            event_type: EventType::Updated,
        }
    }

    /// `key` was removed; `old_value` is what it held.
    #[must_use]
    pub fn removed(key: Data, old_value: Data) -> Self {
        Self {
            key,
            new_value: None,
            old_value: Some(old_value),
            event_type: EventType::Removed,
        }
    }

    /// `key` was evicted; `old_value` is what it held.
    #[must_use]
    pub fn evicted(key: Data, old_value: Data) -> Self {
        Self {
            key,
            new_value: None,
            old_value: Some(old_value),
            event_type: EventType::Evicted,
        }
    }

    /// Serialized key.
    #[must_use]
    #[inline]
    pub fn key(&self) -> &Data {
        &self.key
    }

    /// Serialized value after the mutation, if any.
    #[must_use]
    #[inline]
    pub fn new_value(&self) -> Option<&Data> {
        self.new_value.as_ref()
    }

    /// Serialized value before the mutation, if any.
    #[must_use]
    #[inline]
    pub fn old_value(&self) -> Option<&Data> {
        self.old_value.as_ref()
    }

    /// Kind of mutation.
    #[must_use]
    #[inline]
    pub fn event_type(&self) -> EventType {
        self.event_type
    }

    /// Deserializes the key and values into a typed [`MapEvent`].
    ///
    /// # Errors
    ///
    /// Returns [`SerializationError`] if any field does not decode as the
    /// requested type.
    pub fn deserialize<K, V, S>(&self, serializer: &S) -> Result<MapEvent<K, V>, SerializationError>
    where
        K: DeserializeOwned,
        V: DeserializeOwned,
        S: WireSerializer,
    {
        Ok(MapEvent {
            key: serializer.to_object(&self.key)?,
            new_value: self
                .new_value
                .as_ref()
                .map(|data| serializer.to_object(data))
                .transpose()?,
            old_value: self
                .old_value
                .as_ref()
                .map(|data| serializer.to_object(data))
                .transpose()?,
            event_type: self.event_type,
        })
    }
}

/// A journal event with its key and values deserialized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapEvent<K, V> {
    /// The entry key.
    pub key: K,
    /// The value after the mutation, if any.
    pub new_value: Option<V>,
    /// The value before the mutation, if any.
    pub old_value: Option<V>,
    /// Kind of mutation.
    pub event_type: EventType,
}
