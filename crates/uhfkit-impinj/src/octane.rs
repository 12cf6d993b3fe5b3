//! Call and listener surface of the Impinj Octane SDK.
//!
//! Settings are read, modified and written back as a whole, the way the SDK
//! works: `query_settings`, change fields, `apply_settings`. Listeners run on
//! the SDK's LLRP thread.

use crate::error::OctaneError;

/// Inventory search mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchMode {
    #[default]
    ReaderSelected,
    SingleTarget,
    DualTarget,
    TagFocus,
}

/// Fields included in tag reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReportConfig {
    pub include_antenna_port_number: bool,
    pub include_peak_rssi: bool,
}

/// Per-port antenna settings.
#[derive(Debug, Clone, PartialEq)]
pub struct AntennaConfig {
    pub port_number: u16,
    pub enabled: bool,
    pub tx_power_dbm: f64,
}

/// Reader settings.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Settings {
    pub report: ReportConfig,
    pub rf_mode: u32,
    pub search_mode: SearchMode,
    pub session: u16,
    pub antennas: Vec<AntennaConfig>,
    /// Transmit frequencies in MHz. Empty lets the reader hop over its
    /// regulatory default.
    pub tx_frequencies_mhz: Vec<f64>,
}

/// One tag of a report.
#[derive(Debug, Clone, PartialEq)]
pub struct Tag {
    pub epc: String,
    pub tid: Option<String>,
    pub peak_rssi_dbm: f64,
    pub antenna_port: u16,
}

/// Tags reported together.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TagReport {
    pub tags: Vec<Tag>,
}

pub type TagReportListener = Box<dyn Fn(TagReport) + Send + Sync>;
pub type ConnectionLostListener = Box<dyn Fn() + Send + Sync>;

/// An Impinj reader session.
pub trait OctaneSdk: Send {
    fn connect(&mut self, host: &str, port: u16) -> Result<(), OctaneError>;

    fn disconnect(&mut self);

    fn query_default_settings(&self) -> Result<Settings, OctaneError>;

    fn query_settings(&self) -> Result<Settings, OctaneError>;

    fn apply_settings(&mut self, settings: &Settings) -> Result<(), OctaneError>;

    fn set_tag_report_listener(&mut self, listener: Option<TagReportListener>);

    fn set_connection_lost_listener(&mut self, listener: Option<ConnectionLostListener>);

    fn start(&mut self) -> Result<(), OctaneError>;

    fn stop(&mut self) -> Result<(), OctaneError>;
}
