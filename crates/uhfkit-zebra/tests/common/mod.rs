//! Scripted Zebra RFID API for adapter tests.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, Once};
use tracing_subscriber::EnvFilter;
use uhfkit_core::{ConnectionStatus, ReaderEvent};
use uhfkit_hardware::{Dispatcher, EventCallback, event_callback};
use uhfkit_zebra::ZebraReader;
use uhfkit_zebra::api::{
    AntennaConfig, EventFlags, EventsListener, TagData, TagStorageSettings, TraceLevel, ZebraEvent,
    ZebraFactory, ZebraSession,
};
use uhfkit_zebra::error::ZebraError;

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
pub struct ZebraState {
    pub fail_connect: bool,
    pub fail_flags: bool,
    pub fail_levels: bool,
    pub fail_perform: bool,
    pub fail_stop: bool,
    pub fail_antenna: bool,
    pub fail_disconnect: bool,
    pub created: Vec<(String, u16)>,
    pub disconnects: usize,
    pub purges: usize,
    pub flags: Option<EventFlags>,
    pub storage: Option<TagStorageSettings>,
    pub trace_level: Option<TraceLevel>,
    pub running: bool,
    pub power_levels: Vec<i32>,
    pub antennas: BTreeMap<u16, AntennaConfig>,
    pub region_index: Option<u16>,
    listener: Option<Arc<dyn Fn(ZebraEvent) + Send + Sync>>,
}

#[derive(Clone, Default)]
pub struct ZebraControl {
    state: Arc<Mutex<ZebraState>>,
}

pub struct FakeFactory {
    state: Arc<Mutex<ZebraState>>,
}

pub struct FakeSession {
    state: Arc<Mutex<ZebraState>>,
}

/// Two antennas at index 0, levels 10.0..=31.0 dBm in whole-dB steps.
pub fn zebra() -> (FakeFactory, ZebraControl) {
    init_tracing();
    let control = ZebraControl::default();
    {
        let mut state = control.state();
        state.power_levels = (10..=31).map(|dbm| dbm * 100).collect();
        state.antennas = [1, 2]
            .into_iter()
            .map(|antenna| (antenna, AntennaConfig::default()))
            .collect();
    }
    (
        FakeFactory {
            state: control.state.clone(),
        },
        control,
    )
}

pub fn reader(name: &str) -> (ZebraReader<FakeFactory>, ZebraControl) {
    let (factory, control) = zebra();
    (ZebraReader::new(factory, Dispatcher::new(name).unwrap()), control)
}

impl ZebraControl {
    pub fn state(&self) -> MutexGuard<'_, ZebraState> {
        self.state.lock().unwrap()
    }

    /// Raise an event on the listener. Returns `false` when none is set.
    pub fn raise(&self, event: ZebraEvent) -> bool {
        let listener = self.state().listener.clone();
        listener.map(|listener| listener(event)).is_some()
    }

    pub fn read(&self, epc: &str, rssi: i16, antenna: u16) -> bool {
        self.raise(ZebraEvent::Read(TagData {
            tag_id: epc.to_string(),
            peak_rssi: rssi,
            antenna_id: antenna,
        }))
    }

    pub fn has_listener(&self) -> bool {
        self.state().listener.is_some()
    }
}

impl ZebraFactory for FakeFactory {
    type Session = FakeSession;

    fn create(&mut self, host: &str, port: u16) -> Result<FakeSession, ZebraError> {
        self.state.lock().unwrap().created.push((host.to_string(), port));
        Ok(FakeSession {
            state: self.state.clone(),
        })
    }
}

impl FakeSession {
    fn lock(&self) -> MutexGuard<'_, ZebraState> {
        self.state.lock().unwrap()
    }
}

impl ZebraSession for FakeSession {
    fn connect(&mut self) -> Result<(), ZebraError> {
        if self.lock().fail_connect {
            return Err(ZebraError::operation_failure("reader unreachable"));
        }
        Ok(())
    }

    fn disconnect(&mut self) -> Result<(), ZebraError> {
        let mut state = self.lock();
        state.disconnects += 1;
        if state.fail_disconnect {
            return Err(ZebraError::operation_failure("socket already closed"));
        }
        Ok(())
    }

    fn purge_tags(&mut self) -> Result<(), ZebraError> {
        self.lock().purges += 1;
        Ok(())
    }

    fn set_events_listener(&mut self, listener: Option<EventsListener>) {
        self.lock().listener = listener.map(Arc::from);
    }

    fn set_event_flags(&mut self, flags: &EventFlags) -> Result<(), ZebraError> {
        let mut state = self.lock();
        if state.fail_flags {
            return Err(ZebraError::invalid_usage("events not supported"));
        }
        state.flags = Some(*flags);
        Ok(())
    }

    fn set_tag_storage_settings(&mut self, settings: &TagStorageSettings) -> Result<(), ZebraError> {
        self.lock().storage = Some(settings.clone());
        Ok(())
    }

    fn set_trace_level(&mut self, level: TraceLevel) -> Result<(), ZebraError> {
        self.lock().trace_level = Some(level);
        Ok(())
    }

    fn perform_inventory(&mut self) -> Result<(), ZebraError> {
        let mut state = self.lock();
        if state.fail_perform {
            return Err(ZebraError::operation_failure("inventory already running"));
        }
        state.running = true;
        Ok(())
    }

    fn stop_inventory(&mut self) -> Result<(), ZebraError> {
        let mut state = self.lock();
        if state.fail_stop {
            return Err(ZebraError::operation_failure("no inventory running"));
        }
        state.running = false;
        Ok(())
    }

    fn available_antennas(&self) -> Result<Vec<u16>, ZebraError> {
        Ok(self.lock().antennas.keys().copied().collect())
    }

    fn transmit_power_levels(&self) -> Result<Vec<i32>, ZebraError> {
        let state = self.lock();
        if state.fail_levels {
            return Err(ZebraError::operation_failure("capabilities unavailable"));
        }
        Ok(state.power_levels.clone())
    }

    fn antenna_config(&self, antenna: u16) -> Result<AntennaConfig, ZebraError> {
        let state = self.lock();
        if state.fail_antenna {
            return Err(ZebraError::operation_failure("antenna config unavailable"));
        }
        state
            .antennas
            .get(&antenna)
            .copied()
            .ok_or_else(|| ZebraError::invalid_usage(format!("no antenna {antenna}")))
    }

    fn set_antenna_config(&mut self, antenna: u16, config: &AntennaConfig) -> Result<(), ZebraError> {
        self.lock().antennas.insert(antenna, *config);
        Ok(())
    }

    fn set_regulatory_region(&mut self, index: u16) -> Result<(), ZebraError> {
        self.lock().region_index = Some(index);
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
