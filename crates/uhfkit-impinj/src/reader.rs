//! Impinj reader over the Octane SDK.

use crate::error::OctaneError;
use crate::octane::{OctaneSdk, SearchMode, Settings, Tag};
use crate::tables::{frequencies, to_mhz};
use tracing::{debug, error, info, warn};
use uhfkit_core::{
    ConnectionOptions, ConnectionStatus, Error, FrequencyRegion, KillPassword, PowerRange, Result,
    Rssi, TagId, TagRecord,
};
use uhfkit_hardware::{Dispatcher, ReadPipeline, RfidReader};

const DEVICE: &str = "impinj";

const POWER_RANGE: PowerRange = PowerRange::new(10, 32);

/// RF mode used for inventory.
pub const RF_MODE: u32 = 1003;

/// Session used with tag focus.
const FOCUS_SESSION: u16 = 1;

/// Session used without tag focus.
const DUAL_TARGET_SESSION: u16 = 2;

/// Impinj reader driven through an Octane SDK binding.
pub struct ImpinjReader<S: OctaneSdk> {
    sdk: S,
    /// An SDK session is open, even if the link has since been lost.
    open: bool,
    antennas: u8,
    pipeline: ReadPipeline,
}

impl<S: OctaneSdk> ImpinjReader<S> {
    pub fn new(sdk: S, dispatcher: Dispatcher) -> Self {
        Self {
            sdk,
            open: false,
            antennas: 1,
            pipeline: ReadPipeline::new(DEVICE, dispatcher),
        }
    }

    /// The underlying SDK.
    pub fn sdk(&self) -> &S {
        &self.sdk
    }

    /// Read the current settings, change them and write them back.
    fn update(&mut self, change: impl FnOnce(&mut Settings)) -> std::result::Result<(), OctaneError> {
        let mut settings = self.sdk.query_settings()?;
        change(&mut settings);
        self.sdk.apply_settings(&settings)
    }

    fn release(&mut self) {
        self.sdk.set_tag_report_listener(None);
        self.sdk.set_connection_lost_listener(None);
        if self.open {
            self.sdk.disconnect();
            self.open = false;
        }
    }

    fn inventory_settings(&self, settings: &mut Settings) {
        settings.report.include_antenna_port_number = true;
        settings.report.include_peak_rssi = true;
        settings.rf_mode = RF_MODE;

        let enabled = 1..=u16::from(self.antennas);
        for antenna in &mut settings.antennas {
            antenna.enabled = enabled.contains(&antenna.port_number);
        }
    }
}

fn to_record(tag: Tag) -> Result<TagRecord> {
    let mut builder = TagRecord::builder(&tag.epc)
        .rssi(Rssi::from_dbm(tag.peak_rssi_dbm))
        .antenna(tag.antenna_port);
    if let Some(tid) = tag.tid.as_deref() {
        builder = builder.tid(tid);
    }
    builder.build()
}

/// Search mode and session for a tag focus setting.
pub fn focus_mode(enabled: bool) -> (SearchMode, u16) {
    if enabled {
        (SearchMode::TagFocus, FOCUS_SESSION)
    } else {
        (SearchMode::DualTarget, DUAL_TARGET_SESSION)
    }
}

impl<S: OctaneSdk> RfidReader for ImpinjReader<S> {
    fn pipeline(&self) -> &ReadPipeline {
        &self.pipeline
    }

    fn connect(&mut self, options: &ConnectionOptions) -> Result<bool> {
        let host = options.require_host()?;
        let port = options.require_port()?;
        let antennas = options.require_antennas()?;
        self.pipeline.state().ensure_not_connected()?;

        // A session left over from a lost link.
        self.release();

        self.sdk
            .connect(host, port)
            .map_err(|e| Error::connection_with(format!("failed to connect to {host}:{port}"), e))?;
        self.open = true;

        let defaults = self
            .sdk
            .query_default_settings()
            .and_then(|settings| self.sdk.apply_settings(&settings));
        if let Err(e) = defaults {
            self.release();
            return Err(Error::connection_with("failed to apply default settings", e));
        }

        let pipeline = self.pipeline.clone();
        self.sdk.set_connection_lost_listener(Some(Box::new(move || {
            warn!(device = DEVICE, "Connection to reader lost");
            pipeline.report_status(ConnectionStatus::Disconnected);
        })));

        self.antennas = antennas;
        self.pipeline.report_status(ConnectionStatus::Connected);
        info!(device = DEVICE, %host, port, antennas, "Device connected");
        Ok(true)
    }

    fn disconnect(&mut self) -> Result<()> {
        if self.is_reading() {
            self.stop_inventory();
        }
        let was_connected = self.is_connected();
        self.release();

        if was_connected {
            self.pipeline.report_status(ConnectionStatus::Disconnected);
            info!(device = DEVICE, "Device disconnected");
        }
        Ok(())
    }

    fn start_inventory(&mut self) -> Result<bool> {
        self.pipeline.state().ensure_can_start()?;

        let mut settings = self
            .sdk
            .query_settings()
            .map_err(|e| Error::device_with("failed to query settings", e))?;
        self.inventory_settings(&mut settings);
        self.sdk
            .apply_settings(&settings)
            .map_err(|e| Error::device_with("failed to apply inventory settings", e))?;

        let pipeline = self.pipeline.clone();
        self.sdk.set_tag_report_listener(Some(Box::new(move |report| {
            let reported = report.tags.len();
            let accepted = pipeline.ingest_batch(report.tags.into_iter().map(to_record));
            debug!(device = DEVICE, reported, accepted, "Tag report");
        })));

        if let Err(e) = self.sdk.start() {
            self.sdk.set_tag_report_listener(None);
            return Err(Error::device_with("failed to start inventory", e));
        }

        self.pipeline.state().set_reading(true);
        debug!(device = DEVICE, rf_mode = RF_MODE, antennas = self.antennas, "Inventory started");
        Ok(true)
    }

    fn stop_inventory(&mut self) -> bool {
        if !self.is_reading() {
            warn!(device = DEVICE, "Reader is not reading");
            return false;
        }

        if let Err(e) = self.sdk.stop() {
            error!(device = DEVICE, error = %e, "Failed to stop inventory");
            return false;
        }
        self.sdk.set_tag_report_listener(None);

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
        let channels = to_mhz(frequencies()?.vendor_value(region)?);
        self.pipeline.state().ensure_connected()?;

        match self.update(|settings| settings.tx_frequencies_mhz = channels) {
            Ok(()) => {
                debug!(device = DEVICE, %region, "Frequency region applied");
                Ok(true)
            }
            Err(e) => {
                warn!(device = DEVICE, %region, error = %e, "Failed to set frequency");
                Ok(false)
            }
        }
    }

    fn power(&self) -> Result<i32> {
        self.pipeline.state().ensure_connected()?;
        let settings = self
            .sdk
            .query_settings()
            .map_err(|e| Error::device_with("failed to query settings", e))?;

        settings
            .antennas
            .first()
            .map(|antenna| antenna.tx_power_dbm as i32)
            .ok_or_else(|| Error::device("reader reported no antenna power"))
    }

    fn power_range(&self) -> PowerRange {
        POWER_RANGE
    }

    fn apply_power(&mut self, dbm: i32) -> Result<bool> {
        self.pipeline.state().ensure_connected()?;
        let result = self.update(|settings| {
            for antenna in &mut settings.antennas {
                antenna.tx_power_dbm = f64::from(dbm);
            }
        });

        if let Err(e) = result {
            warn!(device = DEVICE, dbm, error = %e, "Failed to set power");
            return Ok(false);
        }
        Ok(true)
    }

    fn set_tag_focus(&mut self, enabled: bool) -> Result<bool> {
        self.pipeline.state().ensure_connected()?;
        let (mode, session) = focus_mode(enabled);

        let result = self.update(|settings| {
            settings.search_mode = mode;
            settings.session = session;
        });

        if let Err(e) = result {
            warn!(device = DEVICE, enabled, error = %e, "Failed to set tag focus");
            return Ok(false);
        }
        Ok(true)
    }
}
