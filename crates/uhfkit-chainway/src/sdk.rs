//! Call and callback surface of the Chainway UHF SDK.
//!
//! The SDK reports most failures as a `false` return or a missing value.
//! Bindings implement these traits over the vendor library; the adapter
//! never calls the library directly.
//!
//! Callbacks are invoked on a thread owned by the SDK.

/// Raw tag report from the inventory callback.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UhfTagInfo {
    pub epc: String,
    pub tid: Option<String>,
    /// Signal strength as text, for example `"-65.30"`.
    pub rssi: Option<String>,
    /// Antenna number as text, for example `"1"`.
    pub ant: Option<String>,
}

/// Connection state reported by the SDK.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Connected,
    Disconnected,
    Connecting,
    Other,
}

/// Gen2 settings as held by the module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Gen2Settings {
    pub q: u8,
    pub session: u8,
    /// 0 for target A, 1 for target B.
    pub target: u8,
}

/// Tag memory bank.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Bank {
    Reserved = 0,
    Epc = 1,
    Tid = 2,
    User = 3,
}

/// USB vendor and product id of an R3 module.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UsbDeviceId {
    pub vendor_id: u16,
    pub product_id: u16,
}

/// Antenna enable state of a UR4 reader. Antennas are numbered from 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AntennaState {
    pub antenna: u8,
    pub enabled: bool,
}

pub type InventoryCallback = Box<dyn Fn(UhfTagInfo) + Send + Sync>;
pub type ConnectionStateCallback = Box<dyn Fn(ConnectionState) + Send + Sync>;
pub type KeyEventCallback = Box<dyn Fn(KeyEvent) + Send + Sync>;

/// Trigger key event of a handheld module.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyEvent {
    Down(i32),
    Up(i32),
}

/// Operations shared by every Chainway module.
pub trait ChainwaySdk: Send {
    /// Release the module.
    fn free(&mut self) -> bool;

    fn set_connection_state_callback(&mut self, callback: Option<ConnectionStateCallback>);

    fn set_inventory_callback(&mut self, callback: Option<InventoryCallback>);

    fn start_inventory_tag(&mut self) -> bool;

    fn stop_inventory(&mut self) -> bool;

    /// Frequency mask, `None` on failure.
    fn frequency_mode(&self) -> Option<u8>;

    fn set_frequency_mode(&mut self, mask: u8) -> bool;

    fn gen2(&self) -> Option<Gen2Settings>;

    fn set_gen2(&mut self, settings: &Gen2Settings) -> bool;

    fn beep(&self) -> Option<bool>;

    fn set_beep(&mut self, enabled: bool) -> bool;

    fn set_tag_focus(&mut self, enabled: bool) -> bool;

    fn protocol(&self) -> Option<u8>;

    fn set_protocol(&mut self, mask: u8) -> bool;

    fn rf_link(&self) -> Option<u8>;

    fn set_rf_link(&mut self, mask: u8) -> bool;

    fn set_epc_mode(&mut self) -> bool;

    fn set_epc_and_tid_mode(&mut self) -> bool;

    fn set_epc_tid_user_mode(&mut self, user_ptr: u32, user_len: u32) -> bool;

    /// Continuous wave state.
    fn cw(&self) -> Option<bool>;

    fn set_cw(&mut self, enabled: bool) -> bool;

    fn set_fast_id(&mut self, enabled: bool) -> bool;

    /// Duty cycle as (work, wait) in milliseconds.
    fn pwm(&self) -> Option<(u32, u32)>;

    fn set_pwm(&mut self, work_ms: u32, wait_ms: u32) -> bool;

    /// Module temperature in degrees Celsius.
    fn temperature(&self) -> Option<i32>;

    /// Kill the tag matching the filter. `password` is eight hex characters.
    fn kill_tag(
        &mut self,
        password: &str,
        bank: Bank,
        ptr: u32,
        bit_count: u32,
        data: &str,
    ) -> bool;
}

/// USB-attached handheld module (R3).
pub trait UsbSdk: ChainwaySdk {
    /// Open the first module, or the one matching `device`.
    fn init(&mut self, device: Option<UsbDeviceId>) -> bool;

    fn set_key_event_callback(&mut self, callback: Option<KeyEventCallback>);

    /// Transmit power in dBm.
    fn power(&self) -> Option<i32>;

    fn set_power(&mut self, dbm: u8) -> bool;
}

/// Network-attached fixed reader (UR4).
pub trait NetworkSdk: ChainwaySdk {
    fn init(&mut self, host: &str, port: u16) -> bool;

    /// Transmit power of one antenna in dBm.
    fn antenna_power(&self, antenna: u8) -> Option<i32>;

    fn set_antenna_power(&mut self, antenna: u8, dbm: u8) -> bool;

    fn set_antennas(&mut self, states: &[AntennaState]) -> bool;

    /// Restore factory settings.
    fn reset_soft(&mut self) -> bool;
}
