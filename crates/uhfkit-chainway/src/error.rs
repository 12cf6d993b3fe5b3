//! Chainway SDK failures.

/// Failure reported by the Chainway SDK.
///
/// The SDK signals failure with a `false` return or a missing value; this
/// type names the call so the wrapped [`uhfkit_core::Error`] carries it.
#[derive(Debug, thiserror::Error)]
pub enum ChainwayError {
    /// A call returned `false`.
    #[error("SDK call '{call}' was rejected")]
    Rejected { call: &'static str },

    /// A query returned no value.
    #[error("SDK call '{call}' returned no value")]
    NoValue { call: &'static str },
}

impl ChainwayError {
    pub fn rejected(call: &'static str) -> Self {
        Self::Rejected { call }
    }

    pub fn no_value(call: &'static str) -> Self {
        Self::NoValue { call }
    }
}
