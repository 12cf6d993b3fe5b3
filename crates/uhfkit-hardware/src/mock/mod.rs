//! Simulated reader for testing and development.
//!
//! The simulator satisfies the full [`RfidReader`](crate::RfidReader)
//! contract without hardware. Reads, status changes, battery levels and
//! failures are injected through a [`SimulatorHandle`] and travel the same
//! pipeline a vendor adapter uses.

pub mod sgtin;
pub mod simulated;

pub use sgtin::{Sgtin96, generate_sgtin};
pub use simulated::{SimulatedReader, SimulatorHandle};
