//! Reader lifecycle state.
//!
//! ```text
//!              connect                  start_inventory
//! Unconnected ─────────► Connected ───────────────────► Reading
//!      ▲                  │   ▲                            │
//!      │    disconnect    │   └──────── stop_inventory ────┘
//!      └──────────────────┴──── disconnect (stops first) ──┘
//! ```
//!
//! The status and the reading flag live in atomics so SDK callback threads
//! can report an unsolicited disconnect without taking a lock, and so
//! `is_connected`/`is_reading` never touch hardware.

use crate::Result;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use uhfkit_core::{ConnectionStatus, Error};

/// Coarse lifecycle position of a reader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Lifecycle {
    Unconnected,
    Connected,
    Reading,
}

/// Connection status and reading flag of one reader.
#[derive(Debug)]
pub struct DeviceState {
    status: AtomicU8,
    reading: AtomicBool,
}

impl Default for DeviceState {
    fn default() -> Self {
        Self::new()
    }
}

impl DeviceState {
    /// New state: disconnected, not reading.
    pub fn new() -> Self {
        Self {
            status: AtomicU8::new(ConnectionStatus::Disconnected.as_u8()),
            reading: AtomicBool::new(false),
        }
    }

    /// Current connection status.
    pub fn status(&self) -> ConnectionStatus {
        ConnectionStatus::from_u8(self.status.load(Ordering::Acquire))
    }

    /// Record a new status and return the previous one.
    ///
    /// Any status other than `Connected` or `Connecting` also clears the
    /// reading flag: a reader that lost its session is not reading.
    pub fn set_status(&self, status: ConnectionStatus) -> ConnectionStatus {
        let previous = ConnectionStatus::from_u8(self.status.swap(status.as_u8(), Ordering::AcqRel));
        if matches!(status, ConnectionStatus::Disconnected | ConnectionStatus::Unknown) {
            self.reading.store(false, Ordering::Release);
        }
        previous
    }

    /// Whether the last known status is `Connected`.
    pub fn is_connected(&self) -> bool {
        self.status() == ConnectionStatus::Connected
    }

    /// Whether inventory is running.
    pub fn is_reading(&self) -> bool {
        self.reading.load(Ordering::Acquire)
    }

    /// Set the reading flag.
    pub fn set_reading(&self, reading: bool) {
        self.reading.store(reading, Ordering::Release);
    }

    /// Lifecycle position derived from status and reading flag.
    pub fn lifecycle(&self) -> Lifecycle {
        match (self.is_connected(), self.is_reading()) {
            (false, _) => Lifecycle::Unconnected,
            (true, false) => Lifecycle::Connected,
            (true, true) => Lifecycle::Reading,
        }
    }

    /// Fail unless connected.
    ///
    /// # Errors
    /// Returns `Error::NotConnected`.
    pub fn ensure_connected(&self) -> Result<()> {
        if !self.is_connected() {
            return Err(Error::NotConnected);
        }
        Ok(())
    }

    /// Fail if a session is already open.
    ///
    /// # Errors
    /// Returns `Error::AlreadyConnected`.
    pub fn ensure_not_connected(&self) -> Result<()> {
        if self.is_connected() {
            return Err(Error::AlreadyConnected);
        }
        Ok(())
    }

    /// Fail unless inventory may start now.
    ///
    /// # Errors
    /// Returns `Error::NotConnected` when no session is open and
    /// `Error::AlreadyReading` when inventory is already running.
    pub fn ensure_can_start(&self) -> Result<()> {
        self.ensure_connected()?;
        if self.is_reading() {
            return Err(Error::AlreadyReading);
        }
        Ok(())
    }

    /// Back to the initial state.
    pub fn reset(&self) {
        self.reading.store(false, Ordering::Release);
        self.status
            .store(ConnectionStatus::Disconnected.as_u8(), Ordering::Release);
    }
}
