//! Simulated UHF reader.

use crate::dispatch::Dispatcher;
use crate::mock::sgtin::generate_sgtin;
use crate::pipeline::ReadPipeline;
use crate::{Result, RfidReader};
use rand::Rng;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;
use std::time::Duration;
use tracing::{debug, info, warn};
use uhfkit_core::{
    ConnectionOptions, ConnectionStatus, Error, FrequencyRegion, InventoryParams, KillPassword,
    PowerRange, TagId, TagRecord,
};

/// Size of the simulated tag population.
pub const POPULATION: u64 = 10_000;

/// Item reference shared by every simulated tag.
pub const POPULATION_ITEM_REFERENCE: &str = "101010";

/// Default delay between generated reads.
pub const DEFAULT_READ_INTERVAL: Duration = Duration::from_millis(100);

const POWER_RANGE: PowerRange = PowerRange::new(0, 100);

/// Reader that needs no hardware.
///
/// Reads are only processed while inventory is running. With
/// [`with_generator`](Self::with_generator) the reader also produces reads
/// on its own, picking random tags from a population of
/// [`POPULATION`] SGTIN-96 identifiers.
///
/// # Examples
///
/// ```
/// use std::sync::{Arc, Mutex};
/// use uhfkit_core::{ConnectionOptions, ReaderEvent};
/// use uhfkit_hardware::mock::SimulatedReader;
/// use uhfkit_hardware::{Dispatcher, RfidReader, event_callback};
///
/// let (mut reader, handle) = SimulatedReader::new(Dispatcher::new("docs").unwrap());
/// let seen = Arc::new(Mutex::new(Vec::new()));
/// let sink = seen.clone();
/// reader.set_callback(event_callback(move |event| {
///     if let ReaderEvent::Tag(tag) = event {
///         sink.lock().unwrap().push(tag.epc.to_string());
///     }
/// }));
///
/// reader.connect(&ConnectionOptions::default()).unwrap();
/// reader.start_inventory().unwrap();
/// handle.present("E200");
/// handle.present("E200");
/// handle.flush();
///
/// assert_eq!(*seen.lock().unwrap(), vec!["E200"]);
/// ```
pub struct SimulatedReader {
    pipeline: ReadPipeline,
    power: i32,
    frequency: FrequencyRegion,
    beep: bool,
    params: Option<InventoryParams>,
    interval: Option<Duration>,
    generator: Option<Generator>,
}

struct Generator {
    stop: Arc<AtomicBool>,
    handle: JoinHandle<()>,
}

impl SimulatedReader {
    /// Create a reader and the handle that feeds it.
    pub fn new(dispatcher: Dispatcher) -> (Self, SimulatorHandle) {
        let pipeline = ReadPipeline::new("simulated", dispatcher);
        let reader = Self {
            pipeline: pipeline.clone(),
            power: 0,
            frequency: FrequencyRegion::Brazil,
            beep: true,
            params: None,
            interval: None,
            generator: None,
        };
        (reader, SimulatorHandle { pipeline })
    }

    /// Generate a random read every `interval` while inventory runs.
    pub fn with_generator(mut self, interval: Duration) -> Self {
        self.interval = Some(interval);
        self
    }

    fn spawn_generator(&mut self, interval: Duration) -> Result<()> {
        let stop = Arc::new(AtomicBool::new(false));
        let flag = stop.clone();
        let pipeline = self.pipeline.clone();

        let handle = std::thread::Builder::new()
            .name("uhfkit-simulator".to_string())
            .spawn(move || {
                let mut rng = rand::rng();
                while !flag.load(Ordering::Acquire) && pipeline.state().is_reading() {
                    let serial = rng.random_range(0..POPULATION);
                    match generate_sgtin(POPULATION_ITEM_REFERENCE, serial) {
                        Ok(epc) => {
                            pipeline.ingest(TagRecord::new(&epc));
                        }
                        Err(e) => warn!(error = %e, "Failed to generate simulated tag"),
                    }
                    std::thread::sleep(interval);
                }
            })
            .map_err(|e| Error::device_with("failed to spawn tag generator", e))?;

        self.generator = Some(Generator { stop, handle });
        Ok(())
    }

    fn stop_generator(&mut self) {
        if let Some(generator) = self.generator.take() {
            generator.stop.store(true, Ordering::Release);
            if generator.handle.join().is_err() {
                warn!("Tag generator thread panicked");
            }
        }
    }
}

impl RfidReader for SimulatedReader {
    fn pipeline(&self) -> &ReadPipeline {
        &self.pipeline
    }

    fn connect(&mut self, _options: &ConnectionOptions) -> Result<bool> {
        self.pipeline.state().ensure_not_connected()?;
        self.pipeline.report_status(ConnectionStatus::Connected);
        info!("Simulated reader connected");
        Ok(true)
    }

    fn disconnect(&mut self) -> Result<()> {
        if self.is_reading() {
            self.stop_inventory();
        }
        if self.is_connected() {
            self.pipeline.report_status(ConnectionStatus::Disconnected);
            info!("Simulated reader disconnected");
        }
        Ok(())
    }

    fn inventory_params(&self) -> Option<InventoryParams> {
        self.params
    }

    fn set_inventory_params(&mut self, params: InventoryParams) -> bool {
        if let Err(e) = params.validate() {
            warn!(error = %e, "Rejected inventory parameters");
            return false;
        }
        self.params = Some(params);
        true
    }

    fn start_inventory(&mut self) -> Result<bool> {
        self.pipeline.state().ensure_can_start()?;
        self.pipeline.state().set_reading(true);

        if let Some(interval) = self.interval
            && let Err(e) = self.spawn_generator(interval)
        {
            self.pipeline.state().set_reading(false);
            return Err(e);
        }

        debug!("Simulated inventory started");
        Ok(true)
    }

    fn stop_inventory(&mut self) -> bool {
        if !self.is_reading() {
            return false;
        }
        self.pipeline.state().set_reading(false);
        self.stop_generator();
        debug!("Simulated inventory stopped");
        true
    }

    fn kill_tag(&mut self, _epc: &TagId, _password: KillPassword) -> Result<bool> {
        Err(Error::unsupported("kill tag"))
    }

    fn frequency(&self) -> Result<FrequencyRegion> {
        Ok(self.frequency)
    }

    fn set_frequency(&mut self, region: FrequencyRegion) -> Result<bool> {
        self.frequency = region;
        Ok(true)
    }

    fn power(&self) -> Result<i32> {
        Ok(self.power)
    }

    fn power_range(&self) -> PowerRange {
        POWER_RANGE
    }

    fn apply_power(&mut self, dbm: i32) -> Result<bool> {
        self.power = dbm;
        Ok(true)
    }

    fn beep(&self) -> bool {
        self.beep
    }

    fn set_beep(&mut self, enabled: bool) -> bool {
        self.beep = enabled;
        true
    }

    fn set_tag_focus(&mut self, _enabled: bool) -> Result<bool> {
        Ok(false)
    }
}

impl Drop for SimulatedReader {
    fn drop(&mut self) {
        self.stop_generator();
    }
}

/// Handle for feeding a [`SimulatedReader`].
///
/// Calls behave like callbacks from a vendor SDK thread: they go through
/// normalization, deduplication and the dispatcher.
#[derive(Debug, Clone)]
pub struct SimulatorHandle {
    pipeline: ReadPipeline,
}

impl SimulatorHandle {
    /// Simulate a read of `epc`.
    ///
    /// Returns `true` when the read carried a new identifier. Reads while
    /// inventory is stopped are ignored.
    pub fn present(&self, epc: &str) -> bool {
        self.present_read(TagRecord::new(epc))
    }

    /// Simulate a read with every field under the caller's control.
    ///
    /// A malformed read is skipped, as a vendor adapter would.
    pub fn present_read(&self, read: Result<TagRecord>) -> bool {
        if !self.pipeline.state().is_reading() {
            debug!("Simulated read ignored, inventory is stopped");
            return false;
        }
        self.pipeline.ingest(read)
    }

    /// Simulate an unsolicited status change.
    pub fn set_status(&self, status: ConnectionStatus) {
        self.pipeline.report_status(status);
    }

    /// Simulate the reader dropping its session.
    pub fn lose_connection(&self) {
        self.set_status(ConnectionStatus::Disconnected);
    }

    /// Simulate a battery report.
    pub fn battery(&self, level: u8) {
        self.pipeline.report_battery(level);
    }

    /// Simulate an asynchronous failure.
    pub fn fail(&self, error: Error) {
        self.pipeline.report_error(error);
    }

    /// Wait until every queued event has been delivered.
    pub fn flush(&self) -> bool {
        self.pipeline.flush()
    }
}
