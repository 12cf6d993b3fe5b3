//! Vendor-neutral value types shared by every UHF reader adapter.
//!
//! Nothing in this crate talks to hardware. It defines what a tag read looks
//! like once it has left a vendor SDK, which events a consumer can receive,
//! the regulatory regions and power units adapters translate to, and the
//! error taxonomy every adapter reports through.

pub mod clock;
pub mod error;
pub mod events;
pub mod options;
pub mod tag;
pub mod types;

pub use clock::capture_timestamp;
pub use error::{Error, Result};
pub use events::ReaderEvent;
pub use options::{ConnectionOptions, InventoryParams, SearchTarget};
pub use tag::{Rssi, TagId, TagRecord, TagRecordBuilder};
pub use types::*;

/// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
