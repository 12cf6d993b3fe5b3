//! Device abstraction and event pipeline for UHF RFID readers.
//!
//! This crate defines the [`RfidReader`] contract every vendor adapter
//! implements, and the machinery adapters share so that radically different
//! SDKs present the same observable behavior:
//!
//! - [`DeviceState`]: connection status and reading flag, with the guards
//!   that enforce the lifecycle (`NotConnected`, `AlreadyReading`, ...).
//! - [`TagBuffer`]: per-reader deduplication. A tag identifier produces one
//!   event per session, however often the SDK re-reports it.
//! - [`Dispatcher`]: a single worker thread that delivers events to the
//!   consumer in submission order, off the SDK's callback thread.
//! - [`ReadPipeline`]: the three above bundled for one reader.
//! - [`tables`]: region, channel and power-level tables that translate
//!   vendor-neutral values to each SDK's representation.
//! - [`native`]: an explicit registry for vendor shared libraries.
//!
//! # Data Flow
//!
//! ```text
//! vendor SDK thread           adapter               pipeline              dispatcher
//! ─────────────────           ───────               ────────              ──────────
//!  read callback ──► normalize into TagRecord ──► TagBuffer::accept ──► consumer(Tag)
//!  status callback ─────────────────────────────► DeviceState ───────► consumer(Status)
//! ```
//!
//! # Simulated Reader
//!
//! With the default `simulator` feature, [`mock::SimulatedReader`] implements
//! the contract without hardware:
//!
//! ```
//! use uhfkit_core::ConnectionOptions;
//! use uhfkit_hardware::mock::SimulatedReader;
//! use uhfkit_hardware::{Dispatcher, RfidReader};
//!
//! let (mut reader, handle) = SimulatedReader::new(Dispatcher::new("docs").unwrap());
//! reader.connect(&ConnectionOptions::default()).unwrap();
//! reader.start_inventory().unwrap();
//!
//! handle.present("E200");
//! handle.present("E200");
//! handle.present("E300");
//!
//! assert_eq!(reader.buffer().epcs(), vec!["E200", "E300"]);
//! ```

pub mod buffer;
pub mod dispatch;
#[cfg(feature = "simulator")]
pub mod mock;
pub mod native;
pub mod pipeline;
pub mod reader;
pub mod state;
pub mod tables;

pub use uhfkit_core::{Error, Result};

pub use buffer::{BufferView, TagBuffer};
pub use dispatch::{ConsumerSlot, Dispatcher, EventCallback, event_callback};
pub use native::{LoadOutcome, NativeLibraries, Os, Platform};
pub use pipeline::ReadPipeline;
pub use reader::RfidReader;
pub use state::{DeviceState, Lifecycle};
pub use tables::{ChannelPlan, LookupTable, PowerLevelTable, RegionTable, VendorCode};
