//! Reader capability contract.
//!
//! Every vendor adapter implements [`RfidReader`]. Callers can drive a
//! Chainway handheld, an Impinj portal or the simulator through the same
//! calls and observe the same state machine, deduplication and event
//! delivery.
//!
//! # Object Safety and Dynamic Dispatch
//!
//! The trait is object-safe, so applications that pick a vendor at runtime
//! can hold a `Box<dyn RfidReader>`:
//!
//! ```
//! use uhfkit_core::ConnectionOptions;
//! use uhfkit_hardware::mock::SimulatedReader;
//! use uhfkit_hardware::{Dispatcher, RfidReader};
//!
//! let dispatcher = Dispatcher::new("docs").unwrap();
//! let (reader, _handle) = SimulatedReader::new(dispatcher);
//! let mut reader: Box<dyn RfidReader> = Box::new(reader);
//!
//! reader.connect(&ConnectionOptions::default()).unwrap();
//! assert!(reader.is_connected());
//! reader.close();
//! assert!(!reader.is_connected());
//! ```
//!
//! # Error Policy
//!
//! `connect`, `start_inventory`, `kill_tag` and `disconnect` fail fast with
//! an [`Error`]. `stop_inventory`, `close` and the capability setters run on
//! teardown paths: they log vendor failures and report them as `false`
//! instead. Argument problems (power out of range, region without mapping)
//! are still errors, reported before any vendor call.
//!
//! # Threading
//!
//! All calls are blocking and return once the vendor SDK returns. Tag and
//! status events are delivered on the pipeline's dispatcher thread, never
//! on the caller's thread nor on the SDK's own callback thread.

use crate::Result;
use crate::buffer::BufferView;
use crate::dispatch::EventCallback;
use crate::pipeline::ReadPipeline;
use tracing::{debug, error};
use uhfkit_core::{
    ConnectionOptions, Error, FrequencyRegion, InventoryParams, KillPassword, PowerRange, TagId,
};

/// Common contract of UHF RFID readers.
pub trait RfidReader: Send {
    /// Pipeline holding this reader's buffer, state and consumer.
    fn pipeline(&self) -> &ReadPipeline;

    /// Open a session.
    ///
    /// Validates the options the transport needs, then opens the vendor
    /// session. Calling it on an open session fails with
    /// `Error::AlreadyConnected` and leaves the open session untouched.
    ///
    /// # Errors
    ///
    /// `Error::Configuration` for missing or invalid options,
    /// `Error::AlreadyConnected`, or `Error::Connection` wrapping the SDK
    /// failure.
    fn connect(&mut self, options: &ConnectionOptions) -> Result<bool>;

    /// Unregister vendor callbacks, stop inventory if running, and close the
    /// session.
    ///
    /// # Errors
    ///
    /// `Error::NotConnected` on adapters that reject a disconnect without a
    /// session, or `Error::Device` if the SDK fails to close.
    fn disconnect(&mut self) -> Result<()>;

    /// Last known connection status. Never touches hardware.
    fn is_connected(&self) -> bool {
        self.pipeline().state().is_connected()
    }

    /// Current Gen2 query parameters, when the vendor exposes them.
    fn inventory_params(&self) -> Option<InventoryParams> {
        None
    }

    /// Apply Gen2 query parameters. Returns `false` when unsupported or
    /// rejected.
    fn set_inventory_params(&mut self, params: InventoryParams) -> bool {
        debug!(device = self.pipeline().device(), ?params, "Inventory parameters not supported");
        false
    }

    /// Register the event consumer, replacing any previous one.
    fn set_callback(&mut self, callback: EventCallback) {
        self.pipeline().set_consumer(Some(callback));
    }

    /// Remove the event consumer.
    fn clear_callback(&mut self) {
        self.pipeline().set_consumer(None);
    }

    /// Start continuous inventory.
    ///
    /// The read listener is registered before the start command is sent.
    ///
    /// # Errors
    ///
    /// `Error::NotConnected`, `Error::AlreadyReading`, or `Error::Device`
    /// when the SDK refuses to start.
    fn start_inventory(&mut self) -> Result<bool>;

    /// Stop inventory. Best-effort: failures are logged and reported as
    /// `false`. Events already queued are still delivered.
    fn stop_inventory(&mut self) -> bool;

    /// Whether inventory is running. Never touches hardware.
    fn is_reading(&self) -> bool {
        self.pipeline().state().is_reading()
    }

    /// Permanently disable the tag with identifier `epc`.
    ///
    /// # Errors
    ///
    /// `Error::Unsupported` on vendors without tag kill, `Error::NotConnected`,
    /// or `Error::Device` when the tag refuses.
    fn kill_tag(&mut self, epc: &TagId, password: KillPassword) -> Result<bool>;

    /// Current frequency region.
    ///
    /// # Errors
    ///
    /// `Error::Unsupported` on vendors whose state cannot be mapped back to
    /// a region, `Error::NotConnected`, or `Error::UnknownVendorValue`.
    fn frequency(&self) -> Result<FrequencyRegion>;

    /// Switch to `region`. Vendor failures are reported as `false`.
    ///
    /// # Errors
    ///
    /// `Error::UnsupportedRegion` when the vendor has no mapping for
    /// `region`, or `Error::NotConnected`.
    fn set_frequency(&mut self, region: FrequencyRegion) -> Result<bool>;

    /// Current transmit power, in dBm.
    ///
    /// # Errors
    ///
    /// `Error::NotConnected` or `Error::Device`.
    fn power(&self) -> Result<i32>;

    /// Power range accepted by [`set_power`](Self::set_power), in dBm.
    fn power_range(&self) -> PowerRange;

    /// Set transmit power in dBm after checking it against
    /// [`power_range`](Self::power_range).
    ///
    /// # Errors
    ///
    /// `Error::Configuration` when `dbm` is out of range; the adapter is not
    /// called in that case. Otherwise whatever
    /// [`apply_power`](Self::apply_power) returns.
    fn set_power(&mut self, dbm: i32) -> Result<bool> {
        self.power_range().check(dbm)?;
        self.apply_power(dbm)
    }

    /// Send an already range-checked power value to the device.
    ///
    /// # Errors
    ///
    /// `Error::NotConnected`, or `Error::UnsupportedPowerLevel` when the
    /// device has no matching level.
    fn apply_power(&mut self, dbm: i32) -> Result<bool>;

    /// Whether the reader beeps on reads.
    fn beep(&self) -> bool {
        false
    }

    /// Enable or disable the read beep. Returns `false` when unsupported.
    fn set_beep(&mut self, _enabled: bool) -> bool {
        false
    }

    /// Enable or disable hardware tag focus.
    ///
    /// # Errors
    ///
    /// `Error::Unsupported` on vendors with no such feature.
    fn set_tag_focus(&mut self, enabled: bool) -> Result<bool>;

    /// Snapshot of the records accepted in this session.
    fn buffer(&self) -> BufferView {
        self.pipeline().view()
    }

    /// Forget every accepted identifier.
    fn clear_buffer(&mut self) {
        self.pipeline().clear_buffer();
    }

    /// Stop inventory, then disconnect. Never fails; errors are logged.
    fn close(&mut self) {
        if self.is_reading() && !self.stop_inventory() {
            error!(device = self.pipeline().device(), "Failed to stop inventory while closing");
        }
        match self.disconnect() {
            Ok(()) | Err(Error::NotConnected) => {}
            Err(e) => error!(device = self.pipeline().device(), error = %e, "Failed to disconnect while closing"),
        }
    }
}
