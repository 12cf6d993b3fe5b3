//! Acura UHF reader adapters.
//!
//! - [`AcuraReader`]: modules driven through the Mercury API over a serial
//!   port (`tmr:///dev/ttyUSB0`).
//! - [`HexaPad`]: the HexaPad desktop pad, driven with text commands over a
//!   serial port at 115200 baud.
//!
//! Both report power in whole dBm. Mercury modules take hundredths of a dBm
//! internally, and setting the Brazilian region loads the OPEN preset with a
//! 250 kHz channel plan over 902-905 MHz and 915-927.5 MHz.

pub mod error;
pub mod hexapad;
pub mod mercury;
pub mod reader;
pub mod serial;
pub mod tables;

pub use error::{HexaPadError, MercuryError};
pub use hexapad::{BAUD_RATE, HexaPad, HexaPadTiming, device_path};
pub use mercury::{MercuryFactory, MercurySession, Region};
pub use reader::{AcuraReader, mercury_uri};
pub use serial::{LineFramer, SerialLink, SerialOpener, SystemSerial};
pub use tables::{RegionSetting, regions};
