//! Scripted Mercury API and serial link for adapter tests.

#![allow(dead_code)]

use bytes::BytesMut;
use std::collections::VecDeque;
use std::io;
use std::sync::{Arc, Mutex, MutexGuard, Once};
use std::thread;
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;
use uhfkit_acura::error::{HexaPadError, MercuryError};
use uhfkit_acura::mercury::{
    MercuryFactory, MercurySession, ReadExceptionListener, ReadListener, ReadPlan, Region,
    TagReadData,
};
use uhfkit_acura::serial::{SerialLink, SerialOpener};
use uhfkit_core::{ConnectionStatus, ReaderEvent};
use uhfkit_hardware::{EventCallback, event_callback};

static TRACING: Once = Once::new();

pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
            )
            .with_test_writer()
            .try_init();
    });
}

// Mercury

#[derive(Default)]
pub struct MercuryState {
    pub fail_connect: bool,
    pub fail_start: bool,
    pub fail_stop: bool,
    pub fail_region: bool,
    pub fail_power: bool,
    pub fail_kill: bool,
    pub uris: Vec<String>,
    pub destroyed: usize,
    pub antennas: Vec<u16>,
    pub plan: Option<ReadPlan>,
    pub reading: bool,
    pub region: Option<Region>,
    pub step_khz: Option<u32>,
    pub hop_table: Vec<u32>,
    pub read_power: i32,
    pub kills: Vec<(u32, String)>,
    listener: Option<Arc<dyn Fn(TagReadData) + Send + Sync>>,
    exception_listener: Option<Arc<dyn Fn(MercuryError) + Send + Sync>>,
}

#[derive(Clone, Default)]
pub struct MercuryControl {
    state: Arc<Mutex<MercuryState>>,
}

pub struct FakeFactory {
    state: Arc<Mutex<MercuryState>>,
}

pub struct FakeSession {
    state: Arc<Mutex<MercuryState>>,
}

pub fn mercury() -> (FakeFactory, MercuryControl) {
    init_tracing();
    let control = MercuryControl::default();
    control.state().antennas = vec![1, 2];
    control.state().read_power = 2500;
    (
        FakeFactory {
            state: control.state.clone(),
        },
        control,
    )
}

impl MercuryControl {
    pub fn state(&self) -> MutexGuard<'_, MercuryState> {
        self.state.lock().unwrap()
    }

    pub fn read(&self, epc: &str, rssi: i32, antenna: u16) -> bool {
        let listener = self.state().listener.clone();
        listener
            .map(|listener| {
                listener(TagReadData {
                    epc: epc.to_string(),
                    rssi,
                    antenna,
                })
            })
            .is_some()
    }

    pub fn fail_read(&self, message: &str) -> bool {
        let listener = self.state().exception_listener.clone();
        listener
            .map(|listener| listener(MercuryError::reader(0x0400, message)))
            .is_some()
    }

    pub fn has_listener(&self) -> bool {
        self.state().listener.is_some()
    }

    pub fn has_exception_listener(&self) -> bool {
        self.state().exception_listener.is_some()
    }
}

impl MercuryFactory for FakeFactory {
    type Session = FakeSession;

    fn create(&mut self, uri: &str) -> Result<FakeSession, MercuryError> {
        self.state.lock().unwrap().uris.push(uri.to_string());
        Ok(FakeSession {
            state: self.state.clone(),
        })
    }
}

impl FakeSession {
    fn lock(&self) -> MutexGuard<'_, MercuryState> {
        self.state.lock().unwrap()
    }
}

impl MercurySession for FakeSession {
    fn connect(&mut self) -> Result<(), MercuryError> {
        if self.lock().fail_connect {
            return Err(MercuryError::reader(0x0101, "no response from module"));
        }
        Ok(())
    }

    fn destroy(&mut self) {
        self.lock().destroyed += 1;
    }

    fn connected_antennas(&self) -> Result<Vec<u16>, MercuryError> {
        Ok(self.lock().antennas.clone())
    }

    fn set_read_plan(&mut self, plan: &ReadPlan) -> Result<(), MercuryError> {
        self.lock().plan = Some(plan.clone());
        Ok(())
    }

    fn set_read_listener(&mut self, listener: Option<ReadListener>) {
        self.lock().listener = listener.map(Arc::from);
    }

    fn set_read_exception_listener(&mut self, listener: Option<ReadExceptionListener>) {
        self.lock().exception_listener = listener.map(Arc::from);
    }

    fn start_reading(&mut self) -> Result<(), MercuryError> {
        let mut state = self.lock();
        if state.fail_start {
            return Err(MercuryError::reader(0x0504, "antenna not connected"));
        }
        state.reading = true;
        Ok(())
    }

    fn stop_reading(&mut self) -> Result<(), MercuryError> {
        let mut state = self.lock();
        if state.fail_stop {
            return Err(MercuryError::reader(0x0500, "module busy"));
        }
        state.reading = false;
        Ok(())
    }

    fn set_region(&mut self, region: Region) -> Result<(), MercuryError> {
        let mut state = self.lock();
        if state.fail_region {
            return Err(MercuryError::reader(0x0105, "region not permitted"));
        }
        state.region = Some(region);
        Ok(())
    }

    fn set_quantization_step(&mut self, step_khz: u32) -> Result<(), MercuryError> {
        self.lock().step_khz = Some(step_khz);
        Ok(())
    }

    fn set_hop_table(&mut self, channels: &[u32]) -> Result<(), MercuryError> {
        self.lock().hop_table = channels.to_vec();
        Ok(())
    }

    fn read_power(&self) -> Result<i32, MercuryError> {
        Ok(self.lock().read_power)
    }

    fn set_read_power(&mut self, centi_dbm: i32) -> Result<(), MercuryError> {
        let mut state = self.lock();
        if state.fail_power {
            return Err(MercuryError::reader(0x0105, "power out of range"));
        }
        state.read_power = centi_dbm;
        Ok(())
    }

    fn kill(&mut self, password: u32, epc: &str) -> Result<(), MercuryError> {
        let mut state = self.lock();
        if state.fail_kill {
            return Err(MercuryError::reader(0x0406, "kill failed"));
        }
        state.kills.push((password, epc.to_string()));
        Ok(())
    }
}

// Serial

#[derive(Default)]
pub struct SerialState {
    pub fail_open: bool,
    pub fail_write: bool,
    pub opened: Vec<(String, u32)>,
    pub closed: usize,
    pub written: Vec<String>,
    /// Answer queued after each written command, keyed by command.
    pub answers: Vec<(String, String)>,
    pub input: VecDeque<u8>,
    pub discarded: usize,
}

#[derive(Clone, Default)]
pub struct SerialControl {
    state: Arc<Mutex<SerialState>>,
}

pub struct FakeOpener {
    state: Arc<Mutex<SerialState>>,
}

pub struct FakeLink {
    state: Arc<Mutex<SerialState>>,
}

pub fn serial() -> (FakeOpener, SerialControl) {
    init_tracing();
    let control = SerialControl::default();
    control.answer("readtag on", "OK");
    control.answer("readtag off", "OK");
    (
        FakeOpener {
            state: control.state.clone(),
        },
        control,
    )
}

impl SerialControl {
    pub fn state(&self) -> MutexGuard<'_, SerialState> {
        self.state.lock().unwrap()
    }

    /// Answer `command` with `response` from now on.
    pub fn answer(&self, command: &str, response: &str) {
        let mut state = self.state();
        state.answers.retain(|(c, _)| c != command);
        state.answers.push((command.to_string(), response.to_string()));
    }

    /// Queue bytes the pad sends unprompted.
    pub fn stream(&self, data: &str) {
        self.state().input.extend(data.bytes());
    }

    /// Wait until every streamed byte has been read.
    pub fn wait_drained(&self) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while !self.state().input.is_empty() {
            assert!(Instant::now() < deadline, "serial input was never drained");
            thread::sleep(Duration::from_millis(2));
        }
    }

    pub fn written(&self) -> Vec<String> {
        self.state().written.clone()
    }
}

impl SerialOpener for FakeOpener {
    type Link = FakeLink;

    fn open(&mut self, path: &str, baud_rate: u32) -> Result<FakeLink, HexaPadError> {
        let mut state = self.state.lock().unwrap();
        if state.fail_open {
            return Err(io::Error::new(io::ErrorKind::NotFound, "no such port").into());
        }
        state.opened.push((path.to_string(), baud_rate));
        Ok(FakeLink {
            state: self.state.clone(),
        })
    }
}

impl SerialLink for FakeLink {
    fn write_all(&mut self, data: &[u8]) -> io::Result<()> {
        let mut state = self.state.lock().unwrap();
        if state.fail_write {
            return Err(io::Error::from(io::ErrorKind::BrokenPipe));
        }
        let command = String::from_utf8_lossy(data).trim_end().to_string();
        let answer = state
            .answers
            .iter()
            .find(|(c, _)| *c == command)
            .map(|(_, a)| a.clone());
        if let Some(answer) = answer {
            state.input.extend(answer.bytes());
            state.input.extend(b"\r\n".iter().copied());
        }
        state.written.push(command);
        Ok(())
    }

    fn read_available(&mut self, buf: &mut BytesMut) -> io::Result<usize> {
        let mut state = self.state.lock().unwrap();
        let n = state.input.len();
        buf.extend(state.input.drain(..));
        Ok(n)
    }

    fn discard_input(&mut self) -> io::Result<()> {
        let mut state = self.state.lock().unwrap();
        state.discarded += state.input.len();
        state.input.clear();
        Ok(())
    }
}

impl Drop for FakeLink {
    fn drop(&mut self) {
        if let Ok(mut state) = self.state.lock() {
            state.closed += 1;
        }
    }
}

// Events

#[derive(Clone, Default)]
pub struct EventLog {
    events: Arc<Mutex<Vec<ReaderEvent>>>,
}

impl EventLog {
    pub fn callback(&self) -> EventCallback {
        let events = self.events.clone();
        event_callback(move |event| events.lock().unwrap().push(event))
    }

    pub fn events(&self) -> Vec<ReaderEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn tag_epcs(&self) -> Vec<String> {
        self.events()
            .iter()
            .filter_map(ReaderEvent::as_tag)
            .map(|t| t.epc.to_string())
            .collect()
    }

    pub fn statuses(&self) -> Vec<ConnectionStatus> {
        self.events()
            .iter()
            .filter_map(|e| match e {
                ReaderEvent::Status(s) => Some(*s),
                _ => None,
            })
            .collect()
    }
}
