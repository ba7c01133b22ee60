//! Wire-form serialization for journal keys and values.
//!
//! Every key, old value and new value is converted to [`Data`] before it is
//! stored, so the journal never holds references into live map entries.
//! The [`WireSerializer`] trait has two built-in implementations:
//!
//! - [`JsonWireSerializer`]: human-readable JSON (always available)
//! - `BincodeWireSerializer`: compact binary format (requires the
//!   `bincode` feature)
//!
//! # Feature Gate
//!
//! ```toml
//! [dependencies]
//! map-event-journal = { version = "0.1", features = ["bincode"] }
//! ```

use bytes::Bytes;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fmt;

/// Serialized wire form of a key or value.
///
/// Backed by [`Bytes`], so clones share the same buffer. Two `Data` values
/// are equal iff their bytes are equal, which is what makes serialized keys
/// comparable across members.
#[derive(Clone, PartialEq, Eq, Hash, Default)]
pub struct Data(Bytes);

impl Data {
    /// Wraps an already serialized buffer.
    #[must_use]
    pub fn new(bytes: impl Into<Bytes>) -> Self {
        Self(bytes.into())
    }

    /// The raw serialized bytes.
    #[must_use]
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Length of the serialized form in bytes.
    #[must_use]
    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` when the serialized form is empty.
    #[must_use]
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Consumes the wrapper, returning the underlying buffer.
    #[must_use]
    pub fn into_bytes(self) -> Bytes {
        self.0
    }
}

impl AsRef<[u8]> for Data {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<Vec<u8>> for Data {
    fn from(bytes: Vec<u8>) -> Self {
        Self(Bytes::from(bytes))
    }
}

impl fmt::Debug for Data {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Data").field("len", &self.0.len()).finish()
    }
}

/// Errors that can occur while converting values to or from wire form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerializationError {
    /// Human-readable description of the failure.
    pub message: String,
}

impl fmt::Display for SerializationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "wire serialization error: {}", self.message)
    }
}

impl std::error::Error for SerializationError {}

/// Converts values to and from their wire form.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync`; one serializer is shared by every
/// partition's writer and by blocking readers.
pub trait WireSerializer: Send + Sync + fmt::Debug {
    /// Serialize `value` into its wire form.
    ///
    /// # Errors
    ///
    /// Returns [`SerializationError`] if the value cannot be serialized.
    fn to_data<V>(&self, value: &V) -> Result<Data, SerializationError>
    where
        V: Serialize + ?Sized;

    /// Deserialize a value previously produced by [`to_data`](Self::to_data).
    ///
    /// # Errors
    ///
    /// Returns [`SerializationError`] if the bytes are malformed or do not
    /// match the expected type.
    fn to_object<V>(&self, data: &Data) -> Result<V, SerializationError>
    where
        V: DeserializeOwned;

    /// Returns the MIME-like content type identifier for this format.
    #[must_use]
    fn content_type(&self) -> &'static str;
}

// ─── JSON ───────────────────────────────────────────────────────────────────

/// JSON wire serializer using `serde_json`.
///
/// # Content Type
///
/// `"application/json"`
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonWireSerializer;

impl JsonWireSerializer {
    /// Create a new JSON wire serializer.
    #[must_use]
    #[inline]
    pub fn new() -> Self {
        Self
    }
}

impl WireSerializer for JsonWireSerializer {
    fn to_data<V>(&self, value: &V) -> Result<Data, SerializationError>
    where
        V: Serialize + ?Sized,
    {
        serde_json::to_vec(value)
            .map(Data::from)
            .map_err(|e| SerializationError {
                message: e.to_string(),
            })
    }

    fn to_object<V>(&self, data: &Data) -> Result<V, SerializationError>
    where
        V: DeserializeOwned,
    {
        serde_json::from_slice(data.as_bytes()).map_err(|e| SerializationError {
            message: e.to_string(),
        })
    }

    #[inline]
    fn content_type(&self) -> &'static str {
        "application/json"
    }
}

// ─── Bincode ────────────────────────────────────────────────────────────────

/// Bincode wire serializer for compact binary payloads.
///
/// # Feature Gate
///
/// Requires the `bincode` feature.
///
/// # Content Type
///
/// `"application/x-bincode"`
#[cfg(feature = "bincode")]
#[derive(Debug, Clone, Copy, Default)]
pub struct BincodeWireSerializer;

#[cfg(feature = "bincode")]
impl BincodeWireSerializer {
    /// Create a new Bincode wire serializer.
    #[must_use]
    #[inline]
    pub fn new() -> Self {
        Self
    }
}

#[cfg(feature = "bincode")]
impl WireSerializer for BincodeWireSerializer {
    fn to_data<V>(&self, value: &V) -> Result<Data, SerializationError>
    where
        V: Serialize + ?Sized,
    {
        bincode::serde::encode_to_vec(value, bincode::config::standard())
            .map(Data::from)
            .map_err(|e| SerializationError {
                message: e.to_string(),
            })
    }

    fn to_object<V>(&self, data: &Data) -> Result<V, SerializationError>
    where
        V: DeserializeOwned,
    {
        bincode::serde::decode_from_slice(data.as_bytes(), bincode::config::standard())
            .map(|(value, _read)| value)
            .map_err(|e| SerializationError {
                message: e.to_string(),
            })
    }

    #[inline]
    fn content_type(&self) -> &'static str {
        "application/x-bincode"
    }
}
