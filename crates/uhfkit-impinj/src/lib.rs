//! Impinj network reader adapter.
//!
//! [`ImpinjReader`] drives a reader through an [`OctaneSdk`] binding over
//! LLRP. Connecting applies the reader's default settings; starting
//! inventory turns on peak RSSI and antenna port reporting, selects RF mode
//! 1003 and enables ports `1..=antennas`. Tag reports arrive in batches and
//! every new tag of a batch is delivered by a single dispatcher job.
//!
//! Only the Brazilian frequency list is mapped. Tag kill and frequency
//! queries are not available.

pub mod error;
pub mod octane;
pub mod reader;
pub mod tables;

pub use error::OctaneError;
pub use octane::{OctaneSdk, SearchMode, Settings};
pub use reader::{ImpinjReader, RF_MODE, focus_mode};
pub use tables::frequencies;
