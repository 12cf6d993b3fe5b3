//! Zebra RFID API failures.

/// Failure reported by the Zebra RFID API.
#[derive(Debug, thiserror::Error)]
pub enum ZebraError {
    /// The reader failed to carry out a request.
    #[error("operation failed: {message}")]
    OperationFailure { message: String },

    /// The API was called in a state or with arguments it does not accept.
    #[error("invalid usage: {message}")]
    InvalidUsage { message: String },
}

impl ZebraError {
    pub fn operation_failure(message: impl Into<String>) -> Self {
        Self::OperationFailure {
            message: message.into(),
        }
    }

    pub fn invalid_usage(message: impl Into<String>) -> Self {
        Self::InvalidUsage {
            message: message.into(),
        }
    }
}
