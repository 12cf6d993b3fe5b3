//! Acura reader over the Mercury API.

use crate::mercury::{MercuryFactory, MercurySession, ReadPlan, TagProtocol, TagReadData};
use crate::tables::regions;
use tracing::{debug, error, info, warn};
use uhfkit_core::{
    ConnectionOptions, ConnectionStatus, Error, FrequencyRegion, KillPassword, PowerRange, Result,
    Rssi, TagId, TagRecord, centi_to_dbm, dbm_to_centi,
};
use uhfkit_hardware::{Dispatcher, Os, Platform, ReadPipeline, RfidReader};

const DEVICE: &str = "acura";

const POWER_RANGE: PowerRange = PowerRange::new(0, 100);

/// Weight of the single Gen2 read plan.
const READ_PLAN_WEIGHT: u32 = 1_000;

/// Mercury reader URI for a serial port.
pub fn mercury_uri(serial_port: &str, os: Os) -> String {
    match os {
        Os::Linux => format!("tmr:///dev/{serial_port}"),
        _ => format!("tmr:///{serial_port}"),
    }
}

/// Acura module driven through a Mercury API binding.
pub struct AcuraReader<F: MercuryFactory> {
    factory: F,
    session: Option<F::Session>,
    platform: Platform,
    pipeline: ReadPipeline,
}

impl<F: MercuryFactory> AcuraReader<F> {
    pub fn new(factory: F, dispatcher: Dispatcher) -> Self {
        Self::with_platform(factory, dispatcher, Platform::current())
    }

    /// Build reader URIs as if running on `platform`.
    pub fn with_platform(factory: F, dispatcher: Dispatcher, platform: Platform) -> Self {
        Self {
            factory,
            session: None,
            platform,
            pipeline: ReadPipeline::new(DEVICE, dispatcher),
        }
    }

    fn session(&self) -> Result<&F::Session> {
        self.pipeline.state().ensure_connected()?;
        self.session.as_ref().ok_or(Error::NotConnected)
    }

    fn session_mut(&mut self) -> Result<&mut F::Session> {
        self.pipeline.state().ensure_connected()?;
        self.session.as_mut().ok_or(Error::NotConnected)
    }
}

fn to_record(data: TagReadData) -> Result<TagRecord> {
    TagRecord::builder(&data.epc)
        .rssi(Rssi::from_dbm(f64::from(data.rssi)))
        .antenna(data.antenna)
        .build()
}

impl<F: MercuryFactory> RfidReader for AcuraReader<F> {
    fn pipeline(&self) -> &ReadPipeline {
        &self.pipeline
    }

    fn connect(&mut self, options: &ConnectionOptions) -> Result<bool> {
        let port = options.require_serial_port()?;
        self.pipeline.state().ensure_not_connected()?;

        let uri = mercury_uri(port, self.platform.os);
        let mut session = self
            .factory
            .create(&uri)
            .map_err(|e| Error::connection_with(format!("failed to create reader for {uri}"), e))?;

        if let Err(e) = session.connect() {
            session.destroy();
            return Err(Error::connection_with(
                format!("failed to open reader on {uri}"),
                e,
            ));
        }

        self.session = Some(session);
        self.pipeline.report_status(ConnectionStatus::Connected);
        info!(device = DEVICE, %uri, "Device connected");
        Ok(true)
    }

    fn disconnect(&mut self) -> Result<()> {
        if !self.is_connected() {
            return Err(Error::NotConnected);
        }
        if self.is_reading() {
            self.stop_inventory();
        }

        if let Some(mut session) = self.session.take() {
            // A failed stop leaves the listeners registered.
            session.set_read_listener(None);
            session.set_read_exception_listener(None);
            session.destroy();
        }
        self.pipeline.report_status(ConnectionStatus::Disconnected);
        info!(device = DEVICE, "Device disconnected");
        Ok(())
    }

    fn start_inventory(&mut self) -> Result<bool> {
        self.pipeline.state().ensure_can_start()?;
        let pipeline = self.pipeline.clone();
        let session = self.session_mut()?;

        let antennas = session
            .connected_antennas()
            .map_err(|e| Error::device_with("failed to list connected antennas", e))?;
        debug!(device = DEVICE, ?antennas, "Building read plan");

        let plan = ReadPlan {
            antennas,
            protocol: TagProtocol::Gen2,
            weight: READ_PLAN_WEIGHT,
        };
        session
            .set_read_plan(&plan)
            .map_err(|e| Error::device_with("failed to set read plan", e))?;

        let reads = pipeline.clone();
        session.set_read_listener(Some(Box::new(move |data| {
            reads.ingest(to_record(data));
        })));
        let failures = pipeline.clone();
        session.set_read_exception_listener(Some(Box::new(move |e| {
            failures.report_error(Error::device_with("background read failed", e));
        })));

        if let Err(e) = session.start_reading() {
            session.set_read_listener(None);
            session.set_read_exception_listener(None);
            return Err(Error::device_with("failed to start reading", e));
        }

        pipeline.state().set_reading(true);
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

        if let Err(e) = session.stop_reading() {
            error!(device = DEVICE, error = %e, "Failed to stop inventory");
            return false;
        }
        session.set_read_listener(None);
        session.set_read_exception_listener(None);

        self.pipeline.state().set_reading(false);
        debug!(device = DEVICE, "Inventory stopped");
        true
    }

    fn kill_tag(&mut self, epc: &TagId, password: KillPassword) -> Result<bool> {
        self.session_mut()?
            .kill(password.value(), epc.as_str())
            .map_err(|e| Error::device_with(format!("failed to kill tag {epc}"), e))?;
        info!(device = DEVICE, %epc, "Tag killed");
        Ok(true)
    }

    fn frequency(&self) -> Result<FrequencyRegion> {
        Err(Error::unsupported("frequency query"))
    }

    fn set_frequency(&mut self, region: FrequencyRegion) -> Result<bool> {
        let setting = regions()?.vendor_value(region)?;
        let session = self.session_mut()?;

        let applied = session.set_region(setting.region).and_then(|()| match &setting.plan {
            Some(plan) => {
                session.set_quantization_step(plan.step_khz())?;
                session.set_hop_table(plan.channels())
            }
            None => Ok(()),
        });
        if let Err(e) = applied {
            warn!(device = DEVICE, %region, error = %e, "Failed to set frequency");
            return Ok(false);
        }

        debug!(device = DEVICE, %region, preset = ?setting.region, "Frequency region applied");
        Ok(true)
    }

    fn power(&self) -> Result<i32> {
        let centi = self
            .session()?
            .read_power()
            .map_err(|e| Error::device_with("failed to read power", e))?;
        Ok(centi_to_dbm(centi))
    }

    fn power_range(&self) -> PowerRange {
        POWER_RANGE
    }

    fn apply_power(&mut self, dbm: i32) -> Result<bool> {
        if let Err(e) = self.session_mut()?.set_read_power(dbm_to_centi(dbm)) {
            warn!(device = DEVICE, dbm, error = %e, "Failed to set power");
            return Ok(false);
        }
        Ok(true)
    }

    fn set_tag_focus(&mut self, _enabled: bool) -> Result<bool> {
        Err(Error::unsupported("tag focus"))
    }
}
