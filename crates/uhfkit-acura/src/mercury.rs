//! Call and listener surface of the Mercury API used by Acura modules.
//!
//! A binding implements [`MercuryFactory`] to create sessions from a reader
//! URI such as `tmr:///dev/ttyUSB0`. Listeners are invoked on the API's
//! background reading thread.

use crate::error::MercuryError;

/// Regulatory region preset of the module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Region {
    Na,
    Eu,
    Kr,
    Jp,
    Tw,
    Vn,
    My,
    Ru,
    Hk,
    /// No preset; channels come from the hop table.
    Open,
}

/// Air protocol of a read plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagProtocol {
    Gen2,
}

/// Antennas, protocol and weight of a background read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadPlan {
    pub antennas: Vec<u16>,
    pub protocol: TagProtocol,
    pub weight: u32,
}

/// One tag report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagReadData {
    pub epc: String,
    /// Signal strength in whole dBm.
    pub rssi: i32,
    pub antenna: u16,
}

pub type ReadListener = Box<dyn Fn(TagReadData) + Send + Sync>;
pub type ReadExceptionListener = Box<dyn Fn(MercuryError) + Send + Sync>;

/// Opens sessions.
pub trait MercuryFactory: Send {
    type Session: MercurySession;

    /// Create a session for `uri`. Nothing is opened until `connect`.
    fn create(&mut self, uri: &str) -> Result<Self::Session, MercuryError>;
}

/// An open module.
pub trait MercurySession: Send {
    fn connect(&mut self) -> Result<(), MercuryError>;

    /// Close the transport and release the session.
    fn destroy(&mut self);

    /// Ports with an antenna attached.
    fn connected_antennas(&self) -> Result<Vec<u16>, MercuryError>;

    fn set_read_plan(&mut self, plan: &ReadPlan) -> Result<(), MercuryError>;

    fn set_read_listener(&mut self, listener: Option<ReadListener>);

    fn set_read_exception_listener(&mut self, listener: Option<ReadExceptionListener>);

    fn start_reading(&mut self) -> Result<(), MercuryError>;

    fn stop_reading(&mut self) -> Result<(), MercuryError>;

    fn set_region(&mut self, region: Region) -> Result<(), MercuryError>;

    fn set_quantization_step(&mut self, step_khz: u32) -> Result<(), MercuryError>;

    /// Channels in kHz.
    fn set_hop_table(&mut self, channels: &[u32]) -> Result<(), MercuryError>;

    /// Read power in hundredths of a dBm.
    fn read_power(&self) -> Result<i32, MercuryError>;

    fn set_read_power(&mut self, centi_dbm: i32) -> Result<(), MercuryError>;

    /// Gen2 kill of the tag whose EPC equals `epc`.
    fn kill(&mut self, password: u32, epc: &str) -> Result<(), MercuryError>;
}
