//! Acura SDK and transport failures.

use std::io;

/// Failure reported by the Mercury API.
#[derive(Debug, thiserror::Error)]
pub enum MercuryError {
    /// The module answered with an error status.
    #[error("reader status {code:#06x}: {message}")]
    Reader { code: u16, message: String },

    /// The transport to the module failed.
    #[error("communication failed: {0}")]
    Communication(#[from] io::Error),
}

impl MercuryError {
    pub fn reader(code: u16, message: impl Into<String>) -> Self {
        Self::Reader {
            code,
            message: message.into(),
        }
    }
}

/// Failure on the HexaPad serial link.
#[derive(Debug, thiserror::Error)]
pub enum HexaPadError {
    #[error("serial port error: {0}")]
    Serial(#[from] serialport::Error),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The pad answered a command with an error line.
    #[error("command '{command}' failed: {response}")]
    Command { command: String, response: String },

    /// The pad's answer could not be interpreted.
    #[error("unexpected response to '{command}': '{response}'")]
    UnexpectedResponse { command: String, response: String },
}
