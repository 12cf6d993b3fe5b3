//! Events delivered to the registered consumer of a reader.

use crate::{error::Error, tag::TagRecord, types::ConnectionStatus};
use std::sync::Arc;

/// Event emitted by a reader.
///
/// The variant set is closed: consumers can match exhaustively.
#[derive(Debug, Clone)]
pub enum ReaderEvent {
    /// A tag identifier was seen for the first time in this session.
    Tag(TagRecord),

    /// The connection status changed.
    Status(ConnectionStatus),

    /// Battery level reported by a handheld reader, in percent.
    Battery(u8),

    /// A failure happened off the caller's thread (read loop, SDK callback).
    Error(Arc<Error>),
}

impl ReaderEvent {
    /// Get the tag record if this is a tag event.
    pub fn as_tag(&self) -> Option<&TagRecord> {
        match self {
            Self::Tag(tag) => Some(tag),
            _ => None,
        }
    }

    /// Check if this is a tag event.
    pub fn is_tag(&self) -> bool {
        matches!(self, Self::Tag(_))
    }
}

impl From<TagRecord> for ReaderEvent {
    fn from(tag: TagRecord) -> Self {
        Self::Tag(tag)
    }
}

impl From<ConnectionStatus> for ReaderEvent {
    fn from(status: ConnectionStatus) -> Self {
        Self::Status(status)
    }
}

impl From<Error> for ReaderEvent {
    fn from(error: Error) -> Self {
        Self::Error(Arc::new(error))
    }
}
