//! Acura HexaPad desktop reader.
//!
//! The pad has no SDK: it is driven with text commands over a serial port.
//! While inventory runs a polling thread drains the port, frames lines and
//! feeds them to the read pipeline. Commands issued meanwhile (power queries)
//! share the link through a mutex, so a command never interleaves with a
//! poll.

use crate::error::HexaPadError;
use crate::serial::{
    LINE_END, LineFramer, SerialLink, SerialOpener, SystemSerial, is_error_response, parse_number,
    parse_tag_line,
};
use bytes::BytesMut;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, error, info, trace, warn};
use uhfkit_core::{
    ConnectionOptions, ConnectionStatus, Error, FrequencyRegion, KillPassword, PowerRange, Result,
    TagId,
};
use uhfkit_hardware::{Dispatcher, Os, Platform, ReadPipeline, RfidReader};

const DEVICE: &str = "acura-hexapad";

/// The only baud rate the pad accepts.
pub const BAUD_RATE: u32 = 115_200;

const POWER_RANGE: PowerRange = PowerRange::new(0, 100);

const CMD_READ_TAG_ON: &str = "readtag on";
const CMD_READ_TAG_OFF: &str = "readtag off";
const CMD_GET_POWER: &str = "readpower";

/// Serial device path for a port name.
pub fn device_path(serial_port: &str, os: Os) -> String {
    match os {
        Os::Linux => format!("/dev/{serial_port}"),
        _ => serial_port.to_string(),
    }
}

/// Timing of the command and polling loops.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HexaPadTiming {
    /// Wait between writing a command and reading its answer.
    pub response_delay: Duration,
    /// Sleep when a poll finds nothing to read.
    pub poll_interval: Duration,
}

impl Default for HexaPadTiming {
    fn default() -> Self {
        Self {
            response_delay: Duration::from_millis(100),
            poll_interval: Duration::from_millis(20),
        }
    }
}

struct Poller {
    running: Arc<AtomicBool>,
    handle: JoinHandle<()>,
}

/// HexaPad reader over serial link opener `O`.
pub struct HexaPad<O: SerialOpener = SystemSerial> {
    opener: O,
    link: Option<Arc<Mutex<O::Link>>>,
    poller: Option<Poller>,
    platform: Platform,
    timing: HexaPadTiming,
    pipeline: ReadPipeline,
}

impl HexaPad<SystemSerial> {
    /// Reader on the host's serial ports.
    pub fn system(dispatcher: Dispatcher) -> Self {
        Self::new(SystemSerial::default(), dispatcher)
    }
}

impl<O: SerialOpener> HexaPad<O> {
    pub fn new(opener: O, dispatcher: Dispatcher) -> Self {
        Self {
            opener,
            link: None,
            poller: None,
            platform: Platform::current(),
            timing: HexaPadTiming::default(),
            pipeline: ReadPipeline::new(DEVICE, dispatcher),
        }
    }

    /// Build device paths as if running on `platform`.
    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    pub fn with_timing(mut self, timing: HexaPadTiming) -> Self {
        self.timing = timing;
        self
    }

    fn link(&self) -> Result<&Arc<Mutex<O::Link>>> {
        self.pipeline.state().ensure_connected()?;
        self.link.as_ref().ok_or(Error::NotConnected)
    }

    /// Send one command and return the trimmed answer.
    fn send_command(&self, command: &str) -> std::result::Result<String, HexaPadError> {
        let Some(link) = self.link.as_ref() else {
            return Err(std::io::Error::from(std::io::ErrorKind::NotConnected).into());
        };
        let mut link = link.lock().unwrap_or_else(PoisonError::into_inner);

        link.discard_input()?;
        let mut line = Vec::with_capacity(command.len() + LINE_END.len());
        line.extend_from_slice(command.as_bytes());
        line.extend_from_slice(LINE_END);
        link.write_all(&line)?;

        if !self.timing.response_delay.is_zero() {
            thread::sleep(self.timing.response_delay);
        }

        let mut answer = BytesMut::new();
        link.read_available(&mut answer)?;
        let answer = String::from_utf8_lossy(&answer).trim().to_string();
        debug!(device = DEVICE, command, %answer, "Command answered");
        Ok(answer)
    }

    fn checked_command(&self, command: &str) -> std::result::Result<String, HexaPadError> {
        let answer = self.send_command(command)?;
        if is_error_response(&answer) {
            return Err(HexaPadError::Command {
                command: command.to_string(),
                response: answer,
            });
        }
        Ok(answer)
    }

    fn spawn_poller(&mut self) -> Result<()> {
        let link = self.link()?.clone();
        let pipeline = self.pipeline.clone();
        let running = Arc::new(AtomicBool::new(true));
        let flag = running.clone();
        let interval = self.timing.poll_interval;

        let handle = thread::Builder::new()
            .name("uhfkit-hexapad".to_string())
            .spawn(move || poll(link, pipeline, flag, interval))
            .map_err(|e| Error::device_with("failed to start polling thread", e))?;

        self.poller = Some(Poller { running, handle });
        Ok(())
    }

    fn join_poller(&mut self) {
        if let Some(poller) = self.poller.take() {
            poller.running.store(false, Ordering::Release);
            if poller.handle.join().is_err() {
                error!(device = DEVICE, "Polling thread panicked");
            }
        }
    }
}

fn poll<L: SerialLink>(
    link: Arc<Mutex<L>>,
    pipeline: ReadPipeline,
    running: Arc<AtomicBool>,
    interval: Duration,
) {
    let mut framer = LineFramer::new();
    let mut chunk = BytesMut::new();

    while running.load(Ordering::Acquire) {
        let read = {
            let mut link = link.lock().unwrap_or_else(PoisonError::into_inner);
            link.read_available(&mut chunk)
        };

        match read {
            Ok(0) => thread::sleep(interval),
            Ok(n) => {
                trace!(device = DEVICE, bytes = n, "Polled serial data");
                framer.feed(&chunk);
                chunk.clear();
                while let Some(line) = framer.next_line() {
                    if !pipeline.ingest(parse_tag_line(&line)) {
                        trace!(device = DEVICE, %line, "Line produced no new tag");
                    }
                }
            }
            Err(e) => {
                error!(device = DEVICE, error = %e, "Failed to read serial data");
                thread::sleep(interval);
            }
        }
    }
}

impl<O: SerialOpener> RfidReader for HexaPad<O> {
    fn pipeline(&self) -> &ReadPipeline {
        &self.pipeline
    }

    fn connect(&mut self, options: &ConnectionOptions) -> Result<bool> {
        let port = options.require_serial_port()?;
        let baud_rate = options.require_baud_rate(BAUD_RATE)?;
        self.pipeline.state().ensure_not_connected()?;

        let path = device_path(port, self.platform.os);
        let link = self
            .opener
            .open(&path, baud_rate)
            .map_err(|e| Error::connection_with(format!("failed to open {path}"), e))?;

        self.link = Some(Arc::new(Mutex::new(link)));
        self.pipeline.report_status(ConnectionStatus::Connected);
        info!(device = DEVICE, %path, "Device connected");
        Ok(true)
    }

    fn disconnect(&mut self) -> Result<()> {
        if self.is_reading() {
            self.stop_inventory();
        }
        self.join_poller();

        if self.link.take().is_some() {
            self.pipeline.report_status(ConnectionStatus::Disconnected);
            info!(device = DEVICE, "Serial port closed");
        }
        Ok(())
    }

    fn start_inventory(&mut self) -> Result<bool> {
        self.pipeline.state().ensure_can_start()?;

        let answer = self
            .checked_command(CMD_READ_TAG_ON)
            .map_err(|e| Error::device_with("failed to start reading", e))?;
        debug!(device = DEVICE, %answer, "Read tag on");

        self.pipeline.state().set_reading(true);
        if let Err(e) = self.spawn_poller() {
            self.pipeline.state().set_reading(false);
            return Err(e);
        }
        Ok(true)
    }

    fn stop_inventory(&mut self) -> bool {
        if !self.is_reading() && self.poller.is_none() {
            return false;
        }

        // Polling stops locally even when the pad misses the command.
        if let Err(e) = self.send_command(CMD_READ_TAG_OFF) {
            warn!(device = DEVICE, error = %e, "Failed to send read tag off");
        }
        self.join_poller();
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
        debug!(device = DEVICE, %region, "Pad has no region selection");
        Ok(false)
    }

    fn power(&self) -> Result<i32> {
        self.link()?;
        let answer = self
            .checked_command(CMD_GET_POWER)
            .map_err(|e| Error::device_with("failed to read power", e))?;

        parse_number(&answer).ok_or_else(|| {
            Error::device_with(
                "failed to read power",
                HexaPadError::UnexpectedResponse {
                    command: CMD_GET_POWER.to_string(),
                    response: answer,
                },
            )
        })
    }

    fn power_range(&self) -> PowerRange {
        POWER_RANGE
    }

    fn apply_power(&mut self, dbm: i32) -> Result<bool> {
        self.link()?;
        if let Err(e) = self.checked_command(&format!("{CMD_GET_POWER}{dbm}")) {
            warn!(device = DEVICE, dbm, error = %e, "Failed to set power");
            return Ok(false);
        }
        Ok(true)
    }

    fn set_tag_focus(&mut self, _enabled: bool) -> Result<bool> {
        Err(Error::unsupported("tag focus"))
    }
}

impl<O: SerialOpener> Drop for HexaPad<O> {
    fn drop(&mut self) {
        self.join_poller();
    }
}
