//! Octane SDK failures.

/// Failure reported by the Octane SDK.
#[derive(Debug, thiserror::Error)]
pub enum OctaneError {
    /// The reader rejected a request.
    #[error("Octane SDK error: {0}")]
    Sdk(String),

    /// The LLRP connection is gone.
    #[error("connection to reader lost")]
    ConnectionLost,
}

impl OctaneError {
    pub fn sdk(message: impl Into<String>) -> Self {
        Self::Sdk(message.into())
    }
}
