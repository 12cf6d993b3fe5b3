//! Connection and inventory configuration.
//!
//! All fields are optional at the type level. Each adapter validates the
//! subset its transport needs through the `require_*` helpers, so a missing
//! serial port on a serial reader is a configuration error raised before
//! any SDK call.

use crate::{Result, error::Error};
use serde::{Deserialize, Serialize};

/// Default number of antennas when none is configured.
pub const DEFAULT_ANTENNA_COUNT: u8 = 1;

/// Options accepted by `connect` on every reader.
///
/// # Examples
///
/// ```
/// use uhfkit_core::ConnectionOptions;
///
/// let opts = ConnectionOptions::network("192.168.0.50", 8888).with_antennas(4);
/// assert_eq!(opts.require_host().unwrap(), "192.168.0.50");
/// assert_eq!(opts.antennas, 4);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionOptions {
    /// Serial port name (`ttyUSB0`, `COM3`).
    pub serial_port: Option<String>,

    /// Network host name or address.
    pub host: Option<String>,

    /// Network port.
    pub port: Option<u16>,

    /// Number of antennas attached to the reader.
    pub antennas: u8,

    /// Enable verbose vendor tracing.
    pub verbose: bool,

    /// Serial baud rate.
    pub baud_rate: Option<u32>,

    /// USB vendor id.
    pub vendor_id: Option<u16>,

    /// USB product id.
    pub product_id: Option<u16>,
}

impl Default for ConnectionOptions {
    fn default() -> Self {
        Self {
            serial_port: None,
            host: None,
            port: None,
            antennas: DEFAULT_ANTENNA_COUNT,
            verbose: false,
            baud_rate: None,
            vendor_id: None,
            product_id: None,
        }
    }
}

impl ConnectionOptions {
    /// Options for a serial-attached reader.
    pub fn serial(port: impl Into<String>) -> Self {
        Self {
            serial_port: Some(port.into()),
            ..Self::default()
        }
    }

    /// Options for a network-attached reader.
    pub fn network(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: Some(host.into()),
            port: Some(port),
            ..Self::default()
        }
    }

    /// Options for a USB reader, optionally pinned to a vendor/product id.
    pub fn usb() -> Self {
        Self::default()
    }

    /// Set the antenna count.
    pub fn with_antennas(mut self, antennas: u8) -> Self {
        self.antennas = antennas;
        self
    }

    /// Enable or disable verbose vendor tracing.
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Set the serial baud rate.
    pub fn with_baud_rate(mut self, baud_rate: u32) -> Self {
        self.baud_rate = Some(baud_rate);
        self
    }

    /// Set the USB vendor and product ids.
    pub fn with_usb_ids(mut self, vendor_id: u16, product_id: u16) -> Self {
        self.vendor_id = Some(vendor_id);
        self.product_id = Some(product_id);
        self
    }

    /// Serial port, required by serial transports.
    ///
    /// # Errors
    /// Returns `Error::Configuration` if the port is missing or blank.
    pub fn require_serial_port(&self) -> Result<&str> {
        self.serial_port
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .ok_or_else(|| Error::configuration("serial port is required"))
    }

    /// Host, required by network transports.
    ///
    /// # Errors
    /// Returns `Error::Configuration` if the host is missing or blank.
    pub fn require_host(&self) -> Result<&str> {
        self.host
            .as_deref()
            .map(str::trim)
            .filter(|h| !h.is_empty())
            .ok_or_else(|| Error::configuration("network host is required"))
    }

    /// Port, required by network transports without a vendor default.
    ///
    /// # Errors
    /// Returns `Error::Configuration` if the port is missing or zero.
    pub fn require_port(&self) -> Result<u16> {
        self.port
            .filter(|p| *p != 0)
            .ok_or_else(|| Error::configuration("network port is required"))
    }

    /// Port, or the vendor default when none is given.
    #[must_use]
    pub fn port_or(&self, default: u16) -> u16 {
        self.port.filter(|p| *p != 0).unwrap_or(default)
    }

    /// Baud rate, which must equal the vendor-mandated value.
    ///
    /// # Errors
    /// Returns `Error::Configuration` if the baud rate is missing or differs.
    pub fn require_baud_rate(&self, expected: u32) -> Result<u32> {
        match self.baud_rate {
            None => Err(Error::configuration("baud rate is required")),
            Some(rate) if rate != expected => Err(Error::configuration(format!(
                "baud rate must be {expected}, got {rate}"
            ))),
            Some(rate) => Ok(rate),
        }
    }

    /// Antenna count, which must be at least one.
    ///
    /// # Errors
    /// Returns `Error::Configuration` if the count is zero.
    pub fn require_antennas(&self) -> Result<u8> {
        if self.antennas == 0 {
            return Err(Error::configuration("antenna count must be at least 1"));
        }
        Ok(self.antennas)
    }
}

/// Maximum Gen2 Q value.
pub const MAX_Q: u8 = 15;

/// Maximum Gen2 session number.
pub const MAX_SESSION: u8 = 3;

/// Gen2 inventoried-flag target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SearchTarget {
    A,
    B,
}

/// Gen2 query parameters.
///
/// Fields left as `None` keep whatever the reader currently uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InventoryParams {
    /// Q value (slot count exponent), 0-15.
    pub q: Option<u8>,

    /// Session, 0-3.
    pub session: Option<u8>,

    /// Inventoried flag target.
    pub target: Option<SearchTarget>,
}

impl InventoryParams {
    /// Return a copy with the Q value replaced.
    #[must_use]
    pub fn with_q(mut self, q: u8) -> Self {
        self.q = Some(q);
        self
    }

    /// Return a copy with the session replaced.
    #[must_use]
    pub fn with_session(mut self, session: u8) -> Self {
        self.session = Some(session);
        self
    }

    /// Return a copy with the target replaced.
    #[must_use]
    pub fn with_target(mut self, target: SearchTarget) -> Self {
        self.target = Some(target);
        self
    }

    /// Check field ranges.
    ///
    /// # Errors
    /// Returns `Error::Configuration` for a Q above 15 or a session above 3.
    pub fn validate(&self) -> Result<()> {
        if let Some(q) = self.q
            && q > MAX_Q
        {
            return Err(Error::configuration(format!(
                "Q must be 0-{MAX_Q}, got {q}"
            )));
        }
        if let Some(session) = self.session
            && session > MAX_SESSION
        {
            return Err(Error::configuration(format!(
                "session must be 0-{MAX_SESSION}, got {session}"
            )));
        }
        Ok(())
    }
}
