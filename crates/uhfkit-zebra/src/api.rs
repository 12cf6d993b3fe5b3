//! Call and event surface of the Zebra RFID API (FX series).
//!
//! Events from the reader arrive on the API's notification thread through
//! a single listener.

use crate::error::ZebraError;

/// Fields of a tag read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagData {
    pub tag_id: String,
    /// Peak signal strength in dBm.
    pub peak_rssi: i16,
    pub antenna_id: u16,
}

/// Notification from the reader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ZebraEvent {
    Read(TagData),
    InventoryStarted,
    InventoryStopped,
    Disconnected,
}

pub type EventsListener = Box<dyn Fn(ZebraEvent) + Send + Sync>;

/// Which notifications the reader sends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EventFlags {
    pub inventory_start: bool,
    pub inventory_stop: bool,
    pub access_start: bool,
    pub access_stop: bool,
    pub tag_read: bool,
    pub antenna: bool,
    pub buffer_full: bool,
    pub buffer_full_warning: bool,
    pub gpi: bool,
    pub reader_disconnect: bool,
    /// Carry tag data inside read events instead of leaving it in the
    /// reader's buffer.
    pub attach_tag_data: bool,
}

/// Optional tag fields stored by the reader.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagField {
    PeakRssi,
    AntennaId,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TagStorageSettings {
    pub discard_tags_on_inventory_stop: bool,
    pub enable_access_reports: bool,
    pub tag_fields: Vec<TagField>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TraceLevel {
    #[default]
    Off,
    Verbose,
}

/// Per-antenna settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AntennaConfig {
    /// Index into the transmit power level table.
    pub transmit_power_index: u16,
    pub rf_mode_table_index: u32,
    pub tag_population: u16,
}

/// Creates reader sessions.
pub trait ZebraFactory: Send {
    type Session: ZebraSession;

    fn create(&mut self, host: &str, port: u16) -> Result<Self::Session, ZebraError>;
}

/// A reader session.
pub trait ZebraSession: Send {
    fn connect(&mut self) -> Result<(), ZebraError>;

    fn disconnect(&mut self) -> Result<(), ZebraError>;

    /// Drop tags held in the reader's buffer.
    fn purge_tags(&mut self) -> Result<(), ZebraError>;

    fn set_events_listener(&mut self, listener: Option<EventsListener>);

    fn set_event_flags(&mut self, flags: &EventFlags) -> Result<(), ZebraError>;

    fn set_tag_storage_settings(&mut self, settings: &TagStorageSettings) -> Result<(), ZebraError>;

    fn set_trace_level(&mut self, level: TraceLevel) -> Result<(), ZebraError>;

    fn perform_inventory(&mut self) -> Result<(), ZebraError>;

    fn stop_inventory(&mut self) -> Result<(), ZebraError>;

    fn available_antennas(&self) -> Result<Vec<u16>, ZebraError>;

    /// Transmit power levels, in hundredths of a dBm.
    fn transmit_power_levels(&self) -> Result<Vec<i32>, ZebraError>;

    fn antenna_config(&self, antenna: u16) -> Result<AntennaConfig, ZebraError>;

    fn set_antenna_config(&mut self, antenna: u16, config: &AntennaConfig) -> Result<(), ZebraError>;

    fn set_regulatory_region(&mut self, index: u16) -> Result<(), ZebraError>;
}
