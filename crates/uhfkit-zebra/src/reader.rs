//! Zebra FX7500 reader.

use crate::api::{
    AntennaConfig, EventFlags, TagData, TagField, TagStorageSettings, TraceLevel, ZebraEvent,
    ZebraFactory, ZebraSession,
};
use crate::error::ZebraError;
use crate::tables::regions;
use tracing::{debug, error, info, warn};
use uhfkit_core::{
    ConnectionOptions, ConnectionStatus, Error, FrequencyRegion, KillPassword, PowerRange, Result,
    Rssi, TagId, TagRecord,
};
use uhfkit_hardware::{Dispatcher, PowerLevelTable, ReadPipeline, RfidReader};

const DEVICE: &str = "zebra-fx7500";

/// LLRP port used when the options carry none.
pub const DEFAULT_PORT: u16 = 5084;

/// Range assumed until the reader has reported its power levels.
const DEFAULT_POWER_RANGE: PowerRange = PowerRange::new(10, 31);

/// Antenna whose power is reported by `power()`.
const POWER_ANTENNA: u16 = 1;

const FOCUS_RF_MODE: u32 = 23;
const DEFAULT_RF_MODE: u32 = 1;
const FOCUS_TAG_POPULATION: u16 = 100;
const DEFAULT_TAG_POPULATION: u16 = 300;

/// Notifications requested on connect. Tag data stays in the reader's
/// buffer; with it attached the reader stops calling the listener.
pub const EVENT_FLAGS: EventFlags = EventFlags {
    inventory_start: true,
    inventory_stop: true,
    access_start: true,
    access_stop: true,
    tag_read: true,
    antenna: true,
    buffer_full: true,
    buffer_full_warning: true,
    gpi: true,
    reader_disconnect: true,
    attach_tag_data: false,
};

/// Reader-side tag storage requested on connect.
pub fn tag_storage() -> TagStorageSettings {
    TagStorageSettings {
        discard_tags_on_inventory_stop: true,
        enable_access_reports: true,
        tag_fields: vec![TagField::PeakRssi, TagField::AntennaId],
    }
}

/// RF mode table index and tag population for a tag focus setting.
pub fn focus_settings(enabled: bool) -> (u32, u16) {
    if enabled {
        (FOCUS_RF_MODE, FOCUS_TAG_POPULATION)
    } else {
        (DEFAULT_RF_MODE, DEFAULT_TAG_POPULATION)
    }
}

/// Zebra FX7500 driven through a Zebra RFID API binding.
pub struct ZebraReader<F: ZebraFactory> {
    factory: F,
    session: Option<F::Session>,
    power_levels: PowerLevelTable,
    pipeline: ReadPipeline,
}

impl<F: ZebraFactory> ZebraReader<F> {
    pub fn new(factory: F, dispatcher: Dispatcher) -> Self {
        Self {
            factory,
            session: None,
            power_levels: PowerLevelTable::default(),
            pipeline: ReadPipeline::new(DEVICE, dispatcher),
        }
    }

    /// Power levels reported by the reader at connect.
    pub fn power_levels(&self) -> &PowerLevelTable {
        &self.power_levels
    }

    fn session(&self) -> Result<&F::Session> {
        self.pipeline.state().ensure_connected()?;
        self.session.as_ref().ok_or(Error::NotConnected)
    }

    fn session_mut(&mut self) -> Result<&mut F::Session> {
        self.pipeline.state().ensure_connected()?;
        self.session.as_mut().ok_or(Error::NotConnected)
    }

    fn configure(&self, session: &mut F::Session, verbose: bool) -> std::result::Result<(), ZebraError> {
        session.purge_tags()?;

        let pipeline = self.pipeline.clone();
        session.set_events_listener(Some(Box::new(move |event| handle_event(&pipeline, event))));
        session.set_event_flags(&EVENT_FLAGS)?;
        session.set_tag_storage_settings(&tag_storage())?;

        let level = if verbose { TraceLevel::Verbose } else { TraceLevel::Off };
        session.set_trace_level(level)
    }

    /// Apply `change` to the config of every available antenna.
    fn update_antennas(
        &mut self,
        change: impl Fn(&mut AntennaConfig),
    ) -> Result<std::result::Result<(), ZebraError>> {
        let session = self.session_mut()?;
        Ok(session.available_antennas().and_then(|antennas| {
            antennas.into_iter().try_for_each(|antenna| {
                let mut config = session.antenna_config(antenna)?;
                change(&mut config);
                session.set_antenna_config(antenna, &config)
            })
        }))
    }
}

fn to_record(data: TagData) -> Result<TagRecord> {
    TagRecord::builder(&data.tag_id)
        .rssi(Rssi::from_dbm(f64::from(data.peak_rssi)))
        .antenna(data.antenna_id)
        .build()
}

fn handle_event(pipeline: &ReadPipeline, event: ZebraEvent) {
    match event {
        ZebraEvent::Read(data) => {
            if !pipeline.ingest(to_record(data)) {
                debug!(device = DEVICE, "Tag already seen");
            }
        }
        ZebraEvent::InventoryStarted => debug!(device = DEVICE, "Inventory start event"),
        ZebraEvent::InventoryStopped => debug!(device = DEVICE, "Inventory stop event"),
        ZebraEvent::Disconnected => {
            warn!(device = DEVICE, "Reader disconnected");
            pipeline.report_status(ConnectionStatus::Disconnected);
        }
    }
}

impl<F: ZebraFactory> RfidReader for ZebraReader<F> {
    fn pipeline(&self) -> &ReadPipeline {
        &self.pipeline
    }

    fn connect(&mut self, options: &ConnectionOptions) -> Result<bool> {
        let host = options.require_host()?;
        let port = options.port_or(DEFAULT_PORT);
        self.pipeline.state().ensure_not_connected()?;

        // A session left over from a lost link.
        if let Some(mut stale) = self.session.take() {
            stale.set_events_listener(None);
            if let Err(e) = stale.disconnect() {
                debug!(device = DEVICE, error = %e, "Stale session did not close cleanly");
            }
        }

        let mut session = self
            .factory
            .create(host, port)
            .map_err(|e| Error::connection_with(format!("failed to create reader for {host}:{port}"), e))?;
        session
            .connect()
            .map_err(|e| Error::connection_with(format!("failed to connect to {host}:{port}"), e))?;

        if let Err(e) = self.configure(&mut session, options.verbose) {
            session.set_events_listener(None);
            if let Err(close) = session.disconnect() {
                warn!(device = DEVICE, error = %close, "Failed to close session after setup failure");
            }
            return Err(Error::connection_with("failed to configure reader", e));
        }

        self.power_levels = match session.transmit_power_levels() {
            Ok(levels) => PowerLevelTable::from_centi_dbm(levels),
            Err(e) => {
                warn!(device = DEVICE, error = %e, "Reader did not report power levels");
                PowerLevelTable::default()
            }
        };

        self.session = Some(session);
        self.pipeline.report_status(ConnectionStatus::Connected);
        info!(device = DEVICE, %host, port, levels = self.power_levels.len(), "Device connected");
        Ok(true)
    }

    fn disconnect(&mut self) -> Result<()> {
        if self.is_reading() {
            self.stop_inventory();
        }
        let Some(mut session) = self.session.take() else {
            return Ok(());
        };

        session.set_events_listener(None);
        let closed = session.disconnect();
        if self.is_connected() {
            self.pipeline.report_status(ConnectionStatus::Disconnected);
        }
        info!(device = DEVICE, "Device disconnected");

        closed.map_err(|e| Error::device_with("failed to disconnect", e))
    }

    fn start_inventory(&mut self) -> Result<bool> {
        self.pipeline.state().ensure_can_start()?;
        self.session_mut()?
            .perform_inventory()
            .map_err(|e| Error::device_with("failed to start inventory", e))?;

        self.pipeline.state().set_reading(true);
        debug!(device = DEVICE, "Inventory started");
        Ok(true)
    }

    fn stop_inventory(&mut self) -> bool {
        if !self.is_reading() {
            debug!(device = DEVICE, "Inventory is not running");
            return false;
        }
        let Some(session) = self.session.as_mut() else {
            return false;
        };

        if let Err(e) = session.stop_inventory() {
            error!(device = DEVICE, error = %e, "Failed to stop inventory");
            return false;
        }
        if let Err(e) = session.purge_tags() {
            warn!(device = DEVICE, error = %e, "Failed to purge tags");
        }

        self.pipeline.state().set_reading(false);
        debug!(device = DEVICE, "Inventory stopped");
        true
    }

    fn kill_tag(&mut self, _epc: &TagId, _password: KillPassword) -> Result<bool> {
        Err(Error::unsupported("kill tag"))
    }

    fn frequency(&self) -> Result<FrequencyRegion> {
        Err(Error::unsupported("frequency query"))
    }

    fn set_frequency(&mut self, region: FrequencyRegion) -> Result<bool> {
        let index = *regions()?.vendor_value(region)?;

        if let Err(e) = self.session_mut()?.set_regulatory_region(index) {
            warn!(device = DEVICE, %region, error = %e, "Failed to set regulatory region");
            return Ok(false);
        }
        debug!(device = DEVICE, %region, index, "Frequency region applied");
        Ok(true)
    }

    fn power(&self) -> Result<i32> {
        let config = self
            .session()?
            .antenna_config(POWER_ANTENNA)
            .map_err(|e| Error::device_with("failed to read antenna config", e))?;
        let index = usize::from(config.transmit_power_index);

        self.power_levels
            .dbm_at(index)
            .ok_or_else(|| Error::device(format!("power index {index} is outside the reader's table")))
    }

    fn power_range(&self) -> PowerRange {
        self.power_levels.range().unwrap_or(DEFAULT_POWER_RANGE)
    }

    fn apply_power(&mut self, dbm: i32) -> Result<bool> {
        self.pipeline.state().ensure_connected()?;
        let index = self.power_levels.index_for_dbm(dbm)?;
        let index = u16::try_from(index).map_err(|_| Error::UnsupportedPowerLevel(dbm))?;

        if let Err(e) = self.update_antennas(|config| config.transmit_power_index = index)? {
            warn!(device = DEVICE, dbm, error = %e, "Failed to set power");
            return Ok(false);
        }
        Ok(true)
    }

    fn set_tag_focus(&mut self, enabled: bool) -> Result<bool> {
        let (rf_mode, population) = focus_settings(enabled);

        let result = self.update_antennas(|config| {
            config.rf_mode_table_index = rf_mode;
            config.tag_population = population;
        })?;
        if let Err(e) = result {
            warn!(device = DEVICE, enabled, error = %e, "Failed to set tag focus");
            return Ok(false);
        }
        Ok(true)
    }
}
