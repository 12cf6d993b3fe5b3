//! Scripted Octane SDK for adapter tests.

#![allow(dead_code)]

use std::sync::{Arc, Mutex, MutexGuard, Once};
use tracing_subscriber::EnvFilter;
use uhfkit_core::{ConnectionStatus, ReaderEvent};
use uhfkit_hardware::{Dispatcher, EventCallback, event_callback};
use uhfkit_impinj::ImpinjReader;
use uhfkit_impinj::error::OctaneError;
use uhfkit_impinj::octane::{
    AntennaConfig, ConnectionLostListener, OctaneSdk, Settings, Tag, TagReport, TagReportListener,
};

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

#[derive(Default)]
pub struct OctaneState {
    pub fail_connect: bool,
    pub fail_defaults: bool,
    pub fail_apply: bool,
    pub fail_start: bool,
    pub fail_stop: bool,
    pub connected_to: Vec<(String, u16)>,
    pub disconnects: usize,
    pub settings: Settings,
    pub applied: usize,
    pub running: bool,
    report_listener: Option<Arc<dyn Fn(TagReport) + Send + Sync>>,
    lost_listener: Option<Arc<dyn Fn() + Send + Sync>>,
}

#[derive(Clone, Default)]
pub struct OctaneControl {
    state: Arc<Mutex<OctaneState>>,
}

pub struct FakeOctane {
    state: Arc<Mutex<OctaneState>>,
}

/// Four-port reader at 30 dBm.
pub fn default_settings() -> Settings {
    Settings {
        antennas: (1..=4)
            .map(|port_number| AntennaConfig {
                port_number,
                enabled: true,
                tx_power_dbm: 30.0,
            })
            .collect(),
        ..Settings::default()
    }
}

pub fn octane() -> (FakeOctane, OctaneControl) {
    init_tracing();
    let control = OctaneControl::default();
    (
        FakeOctane {
            state: control.state.clone(),
        },
        control,
    )
}

pub fn reader(name: &str) -> (ImpinjReader<FakeOctane>, OctaneControl) {
    let (sdk, control) = octane();
    (ImpinjReader::new(sdk, Dispatcher::new(name).unwrap()), control)
}

pub fn tag(epc: &str, rssi: f64, port: u16) -> Tag {
    Tag {
        epc: epc.to_string(),
        tid: None,
        peak_rssi_dbm: rssi,
        antenna_port: port,
    }
}

impl OctaneControl {
    pub fn state(&self) -> MutexGuard<'_, OctaneState> {
        self.state.lock().unwrap()
    }

    /// Deliver a tag report. Returns `false` when no listener is set.
    pub fn report(&self, tags: Vec<Tag>) -> bool {
        let listener = self.state().report_listener.clone();
        listener.map(|listener| listener(TagReport { tags })).is_some()
    }

    /// Drop the link as the SDK would.
    pub fn lose_connection(&self) -> bool {
        let listener = self.state().lost_listener.clone();
        listener.map(|listener| listener()).is_some()
    }

    pub fn has_report_listener(&self) -> bool {
        self.state().report_listener.is_some()
    }

    pub fn has_lost_listener(&self) -> bool {
        self.state().lost_listener.is_some()
    }
}

impl FakeOctane {
    fn lock(&self) -> MutexGuard<'_, OctaneState> {
        self.state.lock().unwrap()
    }
}

impl OctaneSdk for FakeOctane {
    fn connect(&mut self, host: &str, port: u16) -> Result<(), OctaneError> {
        let mut state = self.lock();
        if state.fail_connect {
            return Err(OctaneError::sdk("connection refused"));
        }
        state.connected_to.push((host.to_string(), port));
        Ok(())
    }

    fn disconnect(&mut self) {
        self.lock().disconnects += 1;
    }

    fn query_default_settings(&self) -> Result<Settings, OctaneError> {
        if self.lock().fail_defaults {
            return Err(OctaneError::sdk("no default settings"));
        }
        Ok(default_settings())
    }

    fn query_settings(&self) -> Result<Settings, OctaneError> {
        Ok(self.lock().settings.clone())
    }

    fn apply_settings(&mut self, settings: &Settings) -> Result<(), OctaneError> {
        let mut state = self.lock();
        if state.fail_apply {
            return Err(OctaneError::sdk("settings rejected"));
        }
        state.settings = settings.clone();
        state.applied += 1;
        Ok(())
    }

    fn set_tag_report_listener(&mut self, listener: Option<TagReportListener>) {
        self.lock().report_listener = listener.map(Arc::from);
    }

    fn set_connection_lost_listener(&mut self, listener: Option<ConnectionLostListener>) {
        self.lock().lost_listener = listener.map(Arc::from);
    }

    fn start(&mut self) -> Result<(), OctaneError> {
        let mut state = self.lock();
        if state.fail_start {
            return Err(OctaneError::sdk("reader busy"));
        }
        state.running = true;
        Ok(())
    }

    fn stop(&mut self) -> Result<(), OctaneError> {
        let mut state = self.lock();
        if state.fail_stop {
            return Err(OctaneError::ConnectionLost);
        }
        state.running = false;
        Ok(())
    }
}

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
