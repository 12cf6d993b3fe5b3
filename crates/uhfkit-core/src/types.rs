use crate::{Result, error::Error};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Connection status reported by a reader.
///
/// A reader reports `Connected` only between a successful connect and the
/// next disconnect or loss event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum ConnectionStatus {
    Connected = 0,
    Connecting = 1,
    Disconnected = 2,
    Unknown = 3,
}

impl ConnectionStatus {
    /// Raw discriminant, used to keep the status in an atomic.
    #[must_use]
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Inverse of [`as_u8`](Self::as_u8). Out-of-range values map to `Unknown`.
    #[must_use]
    pub fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::Connected,
            1 => Self::Connecting,
            2 => Self::Disconnected,
            _ => Self::Unknown,
        }
    }
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            Self::Connected => "connected",
            Self::Connecting => "connecting",
            Self::Disconnected => "disconnected",
            Self::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

/// Regulatory frequency region.
///
/// A symbolic region, not a frequency value. Adapters translate it to
/// whatever their SDK expects (bit mask, region id, channel list).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FrequencyRegion {
    ChinaLower,
    ChinaUpper,
    Europe,
    UnitedStates,
    Korea,
    Japan,
    SouthAfrica,
    Taiwan,
    Vietnam,
    Peru,
    Russia,
    Morocco,
    Malaysia,
    Brazil,
    HongKong,
}

impl FrequencyRegion {
    /// Every region, in declaration order.
    pub const ALL: [FrequencyRegion; 15] = [
        Self::ChinaLower,
        Self::ChinaUpper,
        Self::Europe,
        Self::UnitedStates,
        Self::Korea,
        Self::Japan,
        Self::SouthAfrica,
        Self::Taiwan,
        Self::Vietnam,
        Self::Peru,
        Self::Russia,
        Self::Morocco,
        Self::Malaysia,
        Self::Brazil,
        Self::HongKong,
    ];

    /// Human-readable label with the band edges.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::ChinaLower => "China (840 ~ 845 MHz)",
            Self::ChinaUpper => "China (920 ~ 925 MHz)",
            Self::Europe => "Europe (865 ~ 868 MHz)",
            Self::UnitedStates => "United States (902 ~ 928 MHz)",
            Self::Korea => "Korea (917 ~ 923 MHz)",
            Self::Japan => "Japan (916.8 ~ 920.8 MHz)",
            Self::SouthAfrica => "South Africa (915 ~ 919 MHz)",
            Self::Taiwan => "Taiwan (920 ~ 928 MHz)",
            Self::Vietnam => "Vietnam (918 ~ 923 MHz)",
            Self::Peru => "Peru (915 ~ 928 MHz)",
            Self::Russia => "Russia (860 ~ 867.6 MHz)",
            Self::Morocco => "Morocco (914 ~ 921 MHz)",
            Self::Malaysia => "Malaysia (919 ~ 923 MHz)",
            Self::Brazil => "Brazil (902 ~ 907.5 MHz)",
            Self::HongKong => "Hong Kong (920 ~ 925 MHz)",
        }
    }
}

impl fmt::Display for FrequencyRegion {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Inclusive transmit power range of a reader, in dBm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PowerRange {
    pub min: i32,
    pub max: i32,
}

impl PowerRange {
    /// Create a new power range.
    #[must_use]
    pub const fn new(min: i32, max: i32) -> Self {
        Self { min, max }
    }

    /// Whether `dbm` lies inside the range.
    #[must_use]
    pub fn contains(&self, dbm: i32) -> bool {
        (self.min..=self.max).contains(&dbm)
    }

    /// Validate a caller-supplied power value.
    ///
    /// # Errors
    /// Returns `Error::Configuration` when `dbm` is outside the range.
    pub fn check(&self, dbm: i32) -> Result<()> {
        if !self.contains(dbm) {
            return Err(Error::configuration(format!(
                "'power' must be between '{}' and '{}', got '{dbm}'",
                self.min, self.max
            )));
        }
        Ok(())
    }
}

/// Multiply dBm by 100, the unit several SDKs use for transmit power.
#[must_use]
pub fn dbm_to_centi(dbm: i32) -> i32 {
    dbm * 100
}

/// Inverse of [`dbm_to_centi`], truncating towards zero.
#[must_use]
pub fn centi_to_dbm(centi: i32) -> i32 {
    centi / 100
}

/// 32-bit Gen2 kill password.
///
/// Parsed from exactly eight hexadecimal characters. Note that many tags
/// refuse to be killed with the all-zero password.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct KillPassword(u32);

impl KillPassword {
    /// Create a password from its numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Numeric value of the password.
    #[must_use]
    pub fn value(&self) -> u32 {
        self.0
    }

    /// Password as eight upper-case hex characters.
    #[must_use]
    pub fn to_hex(&self) -> String {
        format!("{:08X}", self.0)
    }
}

impl fmt::Debug for KillPassword {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("KillPassword(********)")
    }
}

impl std::str::FromStr for KillPassword {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.len() != 8 || !s.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(Error::configuration(
                "kill password must be exactly 8 hexadecimal characters",
            ));
        }
        let value = u32::from_str_radix(s, 16)
            .map_err(|e| Error::configuration(format!("invalid kill password: {e}")))?;
        Ok(Self(value))
    }
}
