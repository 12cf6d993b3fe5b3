//! Error types for reader operations.
//!
//! One taxonomy covers every adapter. Argument problems are reported as
//! [`Error::Configuration`] before any vendor call is made, precondition
//! violations (`NotConnected`, `AlreadyReading`, ...) are surfaced as-is and
//! never retried, and vendor SDK failures are wrapped with their cause in
//! [`Error::Connection`] or [`Error::Device`].

use crate::types::FrequencyRegion;

/// Boxed error cause coming out of a vendor SDK.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result type alias for reader operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while driving a reader.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// Missing or invalid option supplied by the caller.
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// The vendor SDK refused or failed to open a session.
    #[error("Connection failed: {message}")]
    Connection {
        message: String,
        #[source]
        source: Option<BoxError>,
    },

    /// Operation requires an open connection.
    #[error("Device is not connected")]
    NotConnected,

    /// Connect was called while a session is already open.
    #[error("Device is already connected")]
    AlreadyConnected,

    /// Inventory was started twice without a stop in between.
    #[error("Device is already reading")]
    AlreadyReading,

    /// Inventory stop was requested while no inventory is running.
    #[error("Device is not reading")]
    NotReading,

    /// The vendor has no such capability.
    #[error("Unsupported operation: {operation}")]
    Unsupported { operation: String },

    /// The region has no mapping in this vendor's table.
    #[error("Unsupported region: {0}")]
    UnsupportedRegion(FrequencyRegion),

    /// The power value has no exact match in the device power table.
    #[error("Unsupported power level: {0} dBm")]
    UnsupportedPowerLevel(i32),

    /// A vendor-native value has no vendor-neutral counterpart.
    #[error("Unknown {kind} value reported by device: {value:#x}")]
    UnknownVendorValue { kind: &'static str, value: i64 },

    /// A vendor payload could not be turned into a tag record.
    #[error("Invalid tag data: {message}")]
    InvalidTag { message: String },

    /// Runtime failure inside the vendor SDK during an operation.
    #[error("Device error: {message}")]
    Device {
        message: String,
        #[source]
        source: Option<BoxError>,
    },

    /// A native library could not be loaded.
    #[error("Native library '{resource}' failed to load: {source}")]
    NativeLibrary {
        resource: String,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    /// Create a new configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create a connection error without an underlying cause.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
            source: None,
        }
    }

    /// Create a connection error wrapping the SDK cause.
    pub fn connection_with(
        message: impl Into<String>,
        source: impl Into<BoxError>,
    ) -> Self {
        Self::Connection {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Create a new unsupported operation error.
    pub fn unsupported(operation: impl Into<String>) -> Self {
        Self::Unsupported {
            operation: operation.into(),
        }
    }

    /// Create a new unknown vendor value error.
    pub fn unknown_vendor_value(kind: &'static str, value: impl Into<i64>) -> Self {
        Self::UnknownVendorValue {
            kind,
            value: value.into(),
        }
    }

    /// Create a new invalid tag error.
    pub fn invalid_tag(message: impl Into<String>) -> Self {
        Self::InvalidTag {
            message: message.into(),
        }
    }

    /// Create a device error without an underlying cause.
    pub fn device(message: impl Into<String>) -> Self {
        Self::Device {
            message: message.into(),
            source: None,
        }
    }

    /// Create a device error wrapping the SDK cause.
    pub fn device_with(message: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self::Device {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Create a native library error.
    pub fn native_library(resource: impl Into<String>, source: std::io::Error) -> Self {
        Self::NativeLibrary {
            resource: resource.into(),
            source,
        }
    }

    /// Whether the error is a caller-side precondition or argument problem.
    pub fn is_caller_error(&self) -> bool {
        matches!(
            self,
            Self::Configuration { .. }
                | Self::NotConnected
                | Self::AlreadyConnected
                | Self::AlreadyReading
                | Self::NotReading
                | Self::UnsupportedRegion(_)
                | Self::UnsupportedPowerLevel(_)
        )
    }
}
