//! Zebra FX7500 network reader adapter.
//!
//! [`ZebraReader`] drives the reader through a [`ZebraFactory`] binding of
//! the Zebra RFID API. The LLRP port defaults to 5084. Power is set by index
//! into the transmit power table the reader reports at connect, so only
//! levels present in that table are accepted.

pub mod api;
pub mod error;
pub mod reader;
pub mod tables;

pub use api::{ZebraEvent, ZebraFactory, ZebraSession};
pub use error::ZebraError;
pub use reader::{DEFAULT_PORT, EVENT_FLAGS, ZebraReader, focus_settings, tag_storage};
pub use tables::regions;
