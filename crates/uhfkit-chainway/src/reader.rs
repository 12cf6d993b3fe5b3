//! Chainway reader adapter.
//!
//! One generic adapter drives every Chainway module. The parts that differ
//! between the USB handheld (R3) and the network reader (UR4), namely how
//! the session is opened and how transmit power is read and written, live
//! in a [`ChainwayModel`]. Everything else goes through [`ChainwaySdk`].

use crate::error::ChainwayError;
use crate::sdk::{
    AntennaState, Bank, ChainwaySdk, ConnectionState, Gen2Settings, KeyEvent, NetworkSdk,
    UhfTagInfo, UsbDeviceId, UsbSdk,
};
use crate::tables::{Protocol, RfLink, frequency_masks};
use tracing::{debug, error, info, warn};
use uhfkit_core::{
    ConnectionOptions, ConnectionStatus, Error, FrequencyRegion, InventoryParams, KillPassword,
    PowerRange, Result, Rssi, SearchTarget, TagId, TagRecord,
};
use uhfkit_hardware::{Dispatcher, NativeLibraries, ReadPipeline, RfidReader};

/// Native libraries the Chainway SDK needs before its first call.
pub const NATIVE_LIBRARIES: [&str; 2] = ["files/libTagReader.so", "files/UHFAPI.dll"];

const POWER_RANGE: PowerRange = PowerRange::new(0, 33);

/// Bit offset of the EPC inside the EPC bank (after CRC and PC words).
const EPC_BANK_OFFSET_BITS: u32 = 32;

/// Model-specific part of a Chainway reader.
pub trait ChainwayModel<S>: Send {
    /// Model name used in logs.
    const NAME: &'static str;

    /// Validate `options` and open the session. Returns the SDK verdict.
    ///
    /// # Errors
    /// Returns `Error::Configuration` for missing options.
    fn open(&mut self, sdk: &mut S, options: &ConnectionOptions) -> Result<bool>;

    /// Current transmit power in dBm.
    ///
    /// # Errors
    /// Returns `Error::Device` if the SDK reports nothing.
    fn power(&self, sdk: &S) -> Result<i32>;

    /// Apply transmit power. Returns the SDK verdict.
    fn set_power(&self, sdk: &mut S, dbm: u8) -> bool;

    /// Drop model-specific callbacks registered by [`open`](Self::open).
    fn release(&mut self, _sdk: &mut S) {}
}

/// USB handheld module.
#[derive(Debug, Clone, Copy, Default)]
pub struct R3;

impl<S: UsbSdk> ChainwayModel<S> for R3 {
    const NAME: &'static str = "chainway-r3";

    fn open(&mut self, sdk: &mut S, options: &ConnectionOptions) -> Result<bool> {
        let device = match (options.vendor_id, options.product_id) {
            (Some(vendor_id), Some(product_id)) => Some(UsbDeviceId {
                vendor_id,
                product_id,
            }),
            (None, None) => None,
            _ => {
                return Err(Error::configuration(
                    "vendor id and product id must be given together",
                ));
            }
        };

        let opened = sdk.init(device);
        if opened {
            sdk.set_key_event_callback(Some(Box::new(|event| match event {
                KeyEvent::Down(key) => debug!(key, "Key down"),
                KeyEvent::Up(key) => debug!(key, "Key up"),
            })));
        }
        Ok(opened)
    }

    fn power(&self, sdk: &S) -> Result<i32> {
        sdk.power()
            .ok_or_else(|| Error::device_with("failed to read power", ChainwayError::no_value("getPower")))
    }

    fn set_power(&self, sdk: &mut S, dbm: u8) -> bool {
        sdk.set_power(dbm)
    }

    fn release(&mut self, sdk: &mut S) {
        sdk.set_key_event_callback(None);
    }
}

/// Network reader with up to eight antennas.
#[derive(Debug, Clone, Copy, Default)]
pub struct Ur4 {
    antennas: u8,
}

impl Ur4 {
    /// Antenna count taken from the connection options.
    pub fn antennas(&self) -> u8 {
        self.antennas
    }
}

impl<S: NetworkSdk> ChainwayModel<S> for Ur4 {
    const NAME: &'static str = "chainway-ur4";

    fn open(&mut self, sdk: &mut S, options: &ConnectionOptions) -> Result<bool> {
        let host = options.require_host()?;
        let port = options.require_port()?;
        self.antennas = options.require_antennas()?;

        let opened = sdk.init(host, port);
        if opened {
            debug!(host, port, "UR4 session opened");
        } else {
            error!(host, port, "UR4 refused connection");
        }
        Ok(opened)
    }

    fn power(&self, sdk: &S) -> Result<i32> {
        let levels: Vec<i32> = (1..=self.antennas)
            .filter_map(|antenna| sdk.antenna_power(antenna))
            .collect();

        if levels.is_empty() {
            return Err(Error::device_with(
                "no antenna reported its power",
                ChainwayError::no_value("getPower"),
            ));
        }
        Ok(levels.iter().sum::<i32>() / levels.len() as i32)
    }

    fn set_power(&self, sdk: &mut S, dbm: u8) -> bool {
        (1..=self.antennas).all(|antenna| sdk.set_antenna_power(antenna, dbm))
    }
}

/// Which fields the module reports in each read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadMode {
    Epc,
    EpcTid,
    /// EPC, TID and `len` words of user memory from word `ptr`.
    EpcTidUser { ptr: u32, len: u32 },
}

/// Duty cycle, in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DutyCycle {
    pub work_ms: u32,
    pub wait_ms: u32,
}

/// Chainway reader over SDK binding `S` and model `M`.
pub struct ChainwayReader<S, M> {
    sdk: S,
    model: M,
    /// `init` succeeded and `free` has not run yet, even if the link is gone.
    open: bool,
    pipeline: ReadPipeline,
}

/// USB handheld reader.
pub type ChainwayR3<S> = ChainwayReader<S, R3>;

/// Network reader.
pub type ChainwayUr4<S> = ChainwayReader<S, Ur4>;

impl<S: UsbSdk> ChainwayReader<S, R3> {
    /// Create an R3 adapter.
    ///
    /// # Errors
    /// Returns `Error::NativeLibrary` if the SDK libraries fail to load.
    pub fn r3(sdk: S, dispatcher: Dispatcher, libraries: &NativeLibraries) -> Result<Self> {
        Self::with_model(sdk, R3, dispatcher, libraries)
    }
}

impl<S: NetworkSdk> ChainwayReader<S, Ur4> {
    /// Create a UR4 adapter.
    ///
    /// # Errors
    /// Returns `Error::NativeLibrary` if the SDK libraries fail to load.
    pub fn ur4(sdk: S, dispatcher: Dispatcher, libraries: &NativeLibraries) -> Result<Self> {
        Self::with_model(sdk, Ur4::default(), dispatcher, libraries)
    }

    /// Enable or disable antennas; index 0 is antenna 1.
    pub fn set_antennas(&mut self, enabled: &[bool]) -> bool {
        let states: Vec<AntennaState> = enabled
            .iter()
            .zip(1u8..)
            .map(|(enabled, antenna)| AntennaState {
                antenna,
                enabled: *enabled,
            })
            .collect();
        Self::check(self.sdk.set_antennas(&states), "setAntenna")
    }

    /// Restore factory settings.
    pub fn reset(&mut self) -> bool {
        Self::check(self.sdk.reset_soft(), "resetUHFSoft")
    }
}

impl<S, M> ChainwayReader<S, M>
where
    S: ChainwaySdk,
    M: ChainwayModel<S>,
{
    fn with_model(
        sdk: S,
        model: M,
        dispatcher: Dispatcher,
        libraries: &NativeLibraries,
    ) -> Result<Self> {
        libraries.load_all(&NATIVE_LIBRARIES)?;
        Ok(Self {
            sdk,
            model,
            open: false,
            pipeline: ReadPipeline::new(M::NAME, dispatcher),
        })
    }

    /// Underlying SDK binding.
    pub fn sdk(&self) -> &S {
        &self.sdk
    }

    fn check(ok: bool, call: &'static str) -> bool {
        if !ok {
            warn!(device = M::NAME, call, "SDK call failed");
        }
        ok
    }

    fn query<T>(&self, call: &'static str, read: impl FnOnce(&S) -> Option<T>) -> Result<T> {
        self.pipeline.state().ensure_connected()?;
        read(&self.sdk).ok_or_else(|| {
            Error::device_with(format!("'{call}' returned nothing"), ChainwayError::no_value(call))
        })
    }

    /// Current air protocol.
    ///
    /// # Errors
    /// `Error::NotConnected`, `Error::Device`, or `Error::UnknownVendorValue`.
    pub fn protocol(&self) -> Result<Protocol> {
        Protocol::from_mask(self.query("getProtocol", S::protocol)?)
    }

    /// Switch air protocol.
    ///
    /// # Errors
    /// `Error::NotConnected`.
    pub fn set_protocol(&mut self, protocol: Protocol) -> Result<bool> {
        self.pipeline.state().ensure_connected()?;
        let mask = protocol.mask()?;
        Ok(Self::check(self.sdk.set_protocol(mask), "setProtocol"))
    }

    /// Current RF link profile.
    ///
    /// # Errors
    /// `Error::NotConnected`, `Error::Device`, or `Error::UnknownVendorValue`.
    pub fn rf_link(&self) -> Result<RfLink> {
        RfLink::from_mask(self.query("getRFLink", S::rf_link)?)
    }

    /// Switch RF link profile.
    ///
    /// # Errors
    /// `Error::NotConnected`.
    pub fn set_rf_link(&mut self, link: RfLink) -> Result<bool> {
        self.pipeline.state().ensure_connected()?;
        let mask = link.mask()?;
        Ok(Self::check(self.sdk.set_rf_link(mask), "setRFLink"))
    }

    /// Choose which memory banks each read reports.
    pub fn set_read_mode(&mut self, mode: ReadMode) -> bool {
        let ok = match mode {
            ReadMode::Epc => self.sdk.set_epc_mode(),
            ReadMode::EpcTid => self.sdk.set_epc_and_tid_mode(),
            ReadMode::EpcTidUser { ptr, len } => self.sdk.set_epc_tid_user_mode(ptr, len),
        };
        Self::check(ok, "setReadMode")
    }

    /// Whether continuous wave is on.
    ///
    /// # Errors
    /// `Error::NotConnected` or `Error::Device`.
    pub fn continuous_wave(&self) -> Result<bool> {
        self.query("getCW", S::cw)
    }

    /// Turn continuous wave on or off.
    pub fn set_continuous_wave(&mut self, enabled: bool) -> bool {
        let ok = Self::check(self.sdk.set_cw(enabled), "setCW");
        if ok {
            debug!(device = M::NAME, enabled, "Continuous wave updated");
        }
        ok
    }

    /// Turn FastID on or off.
    pub fn set_fast_id(&mut self, enabled: bool) -> bool {
        Self::check(self.sdk.set_fast_id(enabled), "setFastID")
    }

    /// Current duty cycle.
    ///
    /// # Errors
    /// `Error::NotConnected` or `Error::Device`.
    pub fn duty_cycle(&self) -> Result<DutyCycle> {
        let (work_ms, wait_ms) = self.query("getPwm", S::pwm)?;
        Ok(DutyCycle { work_ms, wait_ms })
    }

    /// Set the duty cycle.
    pub fn set_duty_cycle(&mut self, cycle: DutyCycle) -> bool {
        Self::check(self.sdk.set_pwm(cycle.work_ms, cycle.wait_ms), "setPwm")
    }

    /// Module temperature in degrees Celsius.
    ///
    /// # Errors
    /// `Error::NotConnected` or `Error::Device`.
    pub fn temperature(&self) -> Result<i32> {
        self.query("getTemperature", S::temperature)
    }

    fn release_callbacks(&mut self) {
        self.sdk.set_connection_state_callback(None);
        self.sdk.set_inventory_callback(None);
        self.model.release(&mut self.sdk);
    }

    /// Free the SDK handle if one is open. Returns the SDK verdict.
    fn free(&mut self) -> bool {
        if !std::mem::take(&mut self.open) {
            return true;
        }
        Self::check(self.sdk.free(), "free")
    }
}

fn to_record(info: UhfTagInfo) -> Result<TagRecord> {
    let mut builder = TagRecord::builder(&info.epc);
    if let Some(tid) = info.tid.as_deref() {
        builder = builder.tid(tid);
    }
    if let Some(rssi) = info.rssi.as_deref().filter(|r| !r.trim().is_empty()) {
        builder = builder.rssi(Rssi::parse(rssi)?);
    }
    if let Some(ant) = info.ant.as_deref().filter(|a| !a.trim().is_empty()) {
        let antenna = ant
            .trim()
            .parse()
            .map_err(|_| Error::invalid_tag(format!("invalid antenna '{ant}'")))?;
        builder = builder.antenna(antenna);
    }
    builder.build()
}

fn to_status(state: ConnectionState) -> ConnectionStatus {
    match state {
        ConnectionState::Connected => ConnectionStatus::Connected,
        ConnectionState::Disconnected => ConnectionStatus::Disconnected,
        ConnectionState::Connecting => ConnectionStatus::Connecting,
        ConnectionState::Other => ConnectionStatus::Unknown,
    }
}

fn to_gen2(params: InventoryParams, current: Gen2Settings) -> Gen2Settings {
    Gen2Settings {
        q: params.q.unwrap_or(current.q),
        session: params.session.unwrap_or(current.session),
        target: match params.target {
            Some(SearchTarget::A) => 0,
            Some(SearchTarget::B) => 1,
            None => current.target,
        },
    }
}

fn from_gen2(settings: Gen2Settings) -> InventoryParams {
    InventoryParams {
        q: Some(settings.q),
        session: Some(settings.session),
        target: Some(if settings.target == 0 {
            SearchTarget::A
        } else {
            SearchTarget::B
        }),
    }
}

impl<S, M> RfidReader for ChainwayReader<S, M>
where
    S: ChainwaySdk,
    M: ChainwayModel<S>,
{
    fn pipeline(&self) -> &ReadPipeline {
        &self.pipeline
    }

    fn connect(&mut self, options: &ConnectionOptions) -> Result<bool> {
        self.pipeline.state().ensure_not_connected()?;

        // A handle left over from a lost link.
        if self.open {
            self.release_callbacks();
            self.free();
        }

        if !self.model.open(&mut self.sdk, options)? {
            return Err(Error::connection_with(
                format!("{} refused connection", M::NAME),
                ChainwayError::rejected("init"),
            ));
        }
        self.open = true;

        let pipeline = self.pipeline.clone();
        self.sdk
            .set_connection_state_callback(Some(Box::new(move |state| {
                debug!(device = pipeline.device(), ?state, "Connection state changed");
                pipeline.report_status(to_status(state));
            })));

        self.pipeline.report_status(ConnectionStatus::Connected);
        info!(device = M::NAME, "Device connected");
        Ok(true)
    }

    fn disconnect(&mut self) -> Result<()> {
        if self.is_reading() {
            self.stop_inventory();
        }
        self.release_callbacks();

        if !self.open {
            return Ok(());
        }

        let freed = self.free();
        if self.is_connected() {
            self.pipeline.report_status(ConnectionStatus::Disconnected);
        }
        if !freed {
            return Err(Error::device_with(
                "failed to release device",
                ChainwayError::rejected("free"),
            ));
        }
        info!(device = M::NAME, "Device disconnected");
        Ok(())
    }

    fn inventory_params(&self) -> Option<InventoryParams> {
        if !self.is_connected() {
            return None;
        }
        self.sdk.gen2().map(from_gen2)
    }

    fn set_inventory_params(&mut self, params: InventoryParams) -> bool {
        if let Err(e) = params.validate() {
            warn!(device = M::NAME, error = %e, "Rejected inventory parameters");
            return false;
        }
        if !self.is_connected() {
            warn!(device = M::NAME, "Cannot set inventory parameters while disconnected");
            return false;
        }
        let Some(current) = self.sdk.gen2() else {
            warn!(device = M::NAME, "Failed to read current Gen2 settings");
            return false;
        };
        let settings = to_gen2(params, current);
        Self::check(self.sdk.set_gen2(&settings), "setGen2")
    }

    fn start_inventory(&mut self) -> Result<bool> {
        self.pipeline.state().ensure_can_start()?;

        let pipeline = self.pipeline.clone();
        self.sdk.set_inventory_callback(Some(Box::new(move |info| {
            pipeline.ingest(to_record(info));
        })));

        if !self.sdk.start_inventory_tag() {
            self.sdk.set_inventory_callback(None);
            return Err(Error::device_with(
                "failed to start inventory",
                ChainwayError::rejected("startInventoryTag"),
            ));
        }

        self.pipeline.state().set_reading(true);
        debug!(device = M::NAME, "Inventory started");
        Ok(true)
    }

    fn stop_inventory(&mut self) -> bool {
        if !self.is_reading() {
            debug!(device = M::NAME, "Inventory is not running");
            return false;
        }
        if !self.sdk.stop_inventory() {
            error!(device = M::NAME, "Failed to stop inventory");
            return false;
        }
        self.sdk.set_inventory_callback(None);
        self.pipeline.state().set_reading(false);
        debug!(device = M::NAME, "Inventory stopped");
        true
    }

    fn kill_tag(&mut self, epc: &TagId, password: KillPassword) -> Result<bool> {
        self.pipeline.state().ensure_connected()?;
        let data = epc.as_str();
        let bits = (data.len() * 4) as u32;

        if !self
            .sdk
            .kill_tag(&password.to_hex(), Bank::Epc, EPC_BANK_OFFSET_BITS, bits, data)
        {
            return Err(Error::device_with(
                format!("failed to kill tag {epc}"),
                ChainwayError::rejected("killTag"),
            ));
        }
        info!(device = M::NAME, %epc, "Tag killed");
        Ok(true)
    }

    fn frequency(&self) -> Result<FrequencyRegion> {
        let mask = self.query("getFrequencyMode", S::frequency_mode)?;
        frequency_masks()?.region_for(&mask)
    }

    fn set_frequency(&mut self, region: FrequencyRegion) -> Result<bool> {
        let mask = *frequency_masks()?.vendor_value(region)?;
        self.pipeline.state().ensure_connected()?;
        Ok(Self::check(self.sdk.set_frequency_mode(mask), "setFrequencyMode"))
    }

    fn power(&self) -> Result<i32> {
        self.pipeline.state().ensure_connected()?;
        self.model.power(&self.sdk)
    }

    fn power_range(&self) -> PowerRange {
        POWER_RANGE
    }

    fn apply_power(&mut self, dbm: i32) -> Result<bool> {
        self.pipeline.state().ensure_connected()?;
        let dbm = u8::try_from(dbm).map_err(|_| Error::UnsupportedPowerLevel(dbm))?;
        let ok = self.model.set_power(&mut self.sdk, dbm);
        Ok(Self::check(ok, "setPower"))
    }

    fn beep(&self) -> bool {
        self.is_connected() && self.sdk.beep().unwrap_or(false)
    }

    fn set_beep(&mut self, enabled: bool) -> bool {
        Self::check(self.sdk.set_beep(enabled), "setBeep")
    }

    fn set_tag_focus(&mut self, enabled: bool) -> Result<bool> {
        self.pipeline.state().ensure_connected()?;
        Ok(Self::check(self.sdk.set_tag_focus(enabled), "setTagFocus"))
    }
}
