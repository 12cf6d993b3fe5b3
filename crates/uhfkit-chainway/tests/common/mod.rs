//! In-memory Chainway SDK for adapter tests.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, Once};
use tracing_subscriber::EnvFilter;
use uhfkit_chainway::sdk::{
    AntennaState, Bank, ChainwaySdk, ConnectionState, ConnectionStateCallback, Gen2Settings,
    InventoryCallback, KeyEvent, KeyEventCallback, NetworkSdk, UhfTagInfo, UsbDeviceId, UsbSdk,
};
use uhfkit_chainway::{ChainwayR3, ChainwayUr4};
use uhfkit_core::{ConnectionStatus, ReaderEvent};
use uhfkit_hardware::{Dispatcher, EventCallback, NativeLibraries, event_callback};

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

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KillCall {
    pub password: String,
    pub bank: Bank,
    pub ptr: u32,
    pub bit_count: u32,
    pub data: String,
}

pub struct FakeState {
    pub accept_init: bool,
    pub accept_start: bool,
    pub accept_stop: bool,
    pub accept_free: bool,
    pub accept_kill: bool,

    pub usb_init: Vec<Option<UsbDeviceId>>,
    pub network_init: Vec<(String, u16)>,
    pub freed: usize,
    pub inventory_running: bool,

    pub frequency_mask: Option<u8>,
    pub gen2: Option<Gen2Settings>,
    pub beep: bool,
    pub tag_focus: bool,
    pub protocol: u8,
    pub rf_link: u8,
    pub read_mode: &'static str,
    pub cw: bool,
    pub fast_id: bool,
    pub pwm: (u32, u32),
    pub temperature: Option<i32>,
    pub power: Option<i32>,
    pub antenna_power: BTreeMap<u8, i32>,
    pub antennas: Vec<AntennaState>,
    pub resets: usize,
    pub kills: Vec<KillCall>,

    inventory_callback: Option<Arc<dyn Fn(UhfTagInfo) + Send + Sync>>,
    state_callback: Option<Arc<dyn Fn(ConnectionState) + Send + Sync>>,
    key_callback: Option<Arc<dyn Fn(KeyEvent) + Send + Sync>>,
}

impl Default for FakeState {
    fn default() -> Self {
        Self {
            accept_init: true,
            accept_start: true,
            accept_stop: true,
            accept_free: true,
            accept_kill: true,
            usb_init: Vec::new(),
            network_init: Vec::new(),
            freed: 0,
            inventory_running: false,
            frequency_mask: Some(0x3C),
            gen2: Some(Gen2Settings {
                q: 4,
                session: 0,
                target: 0,
            }),
            beep: true,
            tag_focus: false,
            protocol: 0x00,
            rf_link: 2,
            read_mode: "epc",
            cw: false,
            fast_id: false,
            pwm: (2000, 0),
            temperature: Some(38),
            power: Some(30),
            antenna_power: BTreeMap::new(),
            antennas: Vec::new(),
            resets: 0,
            kills: Vec::new(),
            inventory_callback: None,
            state_callback: None,
            key_callback: None,
        }
    }
}

/// SDK binding backed by shared state.
pub struct FakeChainway {
    state: Arc<Mutex<FakeState>>,
}

/// Test-side view of a [`FakeChainway`].
#[derive(Clone)]
pub struct FakeControl {
    state: Arc<Mutex<FakeState>>,
}

pub fn fake() -> (FakeChainway, FakeControl) {
    let state = Arc::new(Mutex::new(FakeState::default()));
    (
        FakeChainway {
            state: state.clone(),
        },
        FakeControl { state },
    )
}

pub fn libraries() -> NativeLibraries {
    NativeLibraries::new(|_| Ok(()))
}

pub fn r3(name: &str) -> (ChainwayR3<FakeChainway>, FakeControl) {
    init_tracing();
    let (sdk, control) = fake();
    let reader = ChainwayR3::r3(sdk, Dispatcher::new(name).unwrap(), &libraries()).unwrap();
    (reader, control)
}

pub fn ur4(name: &str) -> (ChainwayUr4<FakeChainway>, FakeControl) {
    init_tracing();
    let (sdk, control) = fake();
    let reader = ChainwayUr4::ur4(sdk, Dispatcher::new(name).unwrap(), &libraries()).unwrap();
    (reader, control)
}

impl FakeChainway {
    fn lock(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap()
    }
}

impl FakeControl {
    pub fn state(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap()
    }

    /// Report a tag through the inventory callback, if one is registered.
    pub fn report(&self, info: UhfTagInfo) -> bool {
        let callback = self.state().inventory_callback.clone();
        match callback {
            Some(callback) => {
                callback(info);
                true
            }
            None => false,
        }
    }

    pub fn present(&self, epc: &str) -> bool {
        self.report(UhfTagInfo {
            epc: epc.to_string(),
            tid: None,
            rssi: Some("-60.50".to_string()),
            ant: Some("1".to_string()),
        })
    }

    pub fn change_state(&self, state: ConnectionState) -> bool {
        let callback = self.state().state_callback.clone();
        callback.map(|callback| callback(state)).is_some()
    }

    pub fn press_key(&self, key: i32) -> bool {
        let callback = self.state().key_callback.clone();
        callback
            .map(|callback| {
                callback(KeyEvent::Down(key));
                callback(KeyEvent::Up(key));
            })
            .is_some()
    }

    pub fn has_inventory_callback(&self) -> bool {
        self.state().inventory_callback.is_some()
    }

    pub fn has_state_callback(&self) -> bool {
        self.state().state_callback.is_some()
    }

    pub fn has_key_callback(&self) -> bool {
        self.state().key_callback.is_some()
    }
}

impl ChainwaySdk for FakeChainway {
    fn free(&mut self) -> bool {
        let mut state = self.lock();
        state.freed += 1;
        state.accept_free
    }

    fn set_connection_state_callback(&mut self, callback: Option<ConnectionStateCallback>) {
        self.lock().state_callback = callback.map(Arc::from);
    }

    fn set_inventory_callback(&mut self, callback: Option<InventoryCallback>) {
        self.lock().inventory_callback = callback.map(Arc::from);
    }

    fn start_inventory_tag(&mut self) -> bool {
        let mut state = self.lock();
        state.inventory_running = state.accept_start;
        state.accept_start
    }

    fn stop_inventory(&mut self) -> bool {
        let mut state = self.lock();
        if state.accept_stop {
            state.inventory_running = false;
        }
        state.accept_stop
    }

    fn frequency_mode(&self) -> Option<u8> {
        self.lock().frequency_mask
    }

    fn set_frequency_mode(&mut self, mask: u8) -> bool {
        self.lock().frequency_mask = Some(mask);
        true
    }

    fn gen2(&self) -> Option<Gen2Settings> {
        self.lock().gen2
    }

    fn set_gen2(&mut self, settings: &Gen2Settings) -> bool {
        self.lock().gen2 = Some(*settings);
        true
    }

    fn beep(&self) -> Option<bool> {
        Some(self.lock().beep)
    }

    fn set_beep(&mut self, enabled: bool) -> bool {
        self.lock().beep = enabled;
        true
    }

    fn set_tag_focus(&mut self, enabled: bool) -> bool {
        self.lock().tag_focus = enabled;
        true
    }

    fn protocol(&self) -> Option<u8> {
        Some(self.lock().protocol)
    }

    fn set_protocol(&mut self, mask: u8) -> bool {
        self.lock().protocol = mask;
        true
    }

    fn rf_link(&self) -> Option<u8> {
        Some(self.lock().rf_link)
    }

    fn set_rf_link(&mut self, mask: u8) -> bool {
        self.lock().rf_link = mask;
        true
    }

    fn set_epc_mode(&mut self) -> bool {
        self.lock().read_mode = "epc";
        true
    }

    fn set_epc_and_tid_mode(&mut self) -> bool {
        self.lock().read_mode = "epc+tid";
        true
    }

    fn set_epc_tid_user_mode(&mut self, _user_ptr: u32, user_len: u32) -> bool {
        if user_len == 0 {
            return false;
        }
        self.lock().read_mode = "epc+tid+user";
        true
    }

    fn cw(&self) -> Option<bool> {
        Some(self.lock().cw)
    }

    fn set_cw(&mut self, enabled: bool) -> bool {
        self.lock().cw = enabled;
        true
    }

    fn set_fast_id(&mut self, enabled: bool) -> bool {
        self.lock().fast_id = enabled;
        true
    }

    fn pwm(&self) -> Option<(u32, u32)> {
        Some(self.lock().pwm)
    }

    fn set_pwm(&mut self, work_ms: u32, wait_ms: u32) -> bool {
        self.lock().pwm = (work_ms, wait_ms);
        true
    }

    fn temperature(&self) -> Option<i32> {
        self.lock().temperature
    }

    fn kill_tag(
        &mut self,
        password: &str,
        bank: Bank,
        ptr: u32,
        bit_count: u32,
        data: &str,
    ) -> bool {
        let mut state = self.lock();
        state.kills.push(KillCall {
            password: password.to_string(),
            bank,
            ptr,
            bit_count,
            data: data.to_string(),
        });
        state.accept_kill
    }
}

impl UsbSdk for FakeChainway {
    fn init(&mut self, device: Option<UsbDeviceId>) -> bool {
        let mut state = self.lock();
        state.usb_init.push(device);
        state.accept_init
    }

    fn set_key_event_callback(&mut self, callback: Option<KeyEventCallback>) {
        self.lock().key_callback = callback.map(Arc::from);
    }

    fn power(&self) -> Option<i32> {
        self.lock().power
    }

    fn set_power(&mut self, dbm: u8) -> bool {
        self.lock().power = Some(i32::from(dbm));
        true
    }
}

impl NetworkSdk for FakeChainway {
    fn init(&mut self, host: &str, port: u16) -> bool {
        let mut state = self.lock();
        state.network_init.push((host.to_string(), port));
        state.accept_init
    }

    fn antenna_power(&self, antenna: u8) -> Option<i32> {
        self.lock().antenna_power.get(&antenna).copied()
    }

    fn set_antenna_power(&mut self, antenna: u8, dbm: u8) -> bool {
        self.lock().antenna_power.insert(antenna, i32::from(dbm));
        true
    }

    fn set_antennas(&mut self, states: &[AntennaState]) -> bool {
        self.lock().antennas = states.to_vec();
        true
    }

    fn reset_soft(&mut self) -> bool {
        self.lock().resets += 1;
        true
    }
}

/// Consumer that records every event it receives.
#[derive(Clone, Default)]
pub struct EventLog {
    events: Arc<Mutex<Vec<ReaderEvent>>>,
}

impl EventLog {
    pub fn callback(&self) -> EventCallback {
        let events = self.events.clone();
        event_callback(move |event| events.lock().unwrap().push(event))
    }

    pub fn tag_epcs(&self) -> Vec<String> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter_map(ReaderEvent::as_tag)
            .map(|t| t.epc.to_string())
            .collect()
    }

    pub fn statuses(&self) -> Vec<ConnectionStatus> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter_map(|e| match e {
                ReaderEvent::Status(s) => Some(*s),
                _ => None,
            })
            .collect()
    }
}
