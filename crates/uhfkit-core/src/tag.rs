//! Tag read records.
//!
//! A [`TagRecord`] is what a vendor read callback becomes after
//! normalization. Two records are equal when identifier, TID, signal and
//! antenna match; the capture timestamp is deliberately left out so repeated
//! reads of the same physical situation compare equal.

use crate::{Result, clock::capture_timestamp, error::Error};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};

/// Tag identifier (EPC or TID) as an upper-case hexadecimal string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TagId(String);

impl TagId {
    /// Normalize and validate a vendor identifier.
    ///
    /// The value is trimmed and upper-cased before validation.
    ///
    /// # Errors
    /// Returns `Error::InvalidTag` if the identifier is empty or contains
    /// anything other than hexadecimal digits.
    pub fn new(raw: &str) -> Result<Self> {
        let normalized = raw.trim().to_ascii_uppercase();

        if normalized.is_empty() {
            return Err(Error::invalid_tag("tag identifier is empty"));
        }

        if !normalized.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(Error::invalid_tag(format!(
                "tag identifier '{normalized}' is not hexadecimal"
            )));
        }

        Ok(Self(normalized))
    }

    /// Build an identifier from raw bytes.
    #[must_use]
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.is_empty() {
            return None;
        }
        Some(Self(bytes.iter().map(|b| format!("{b:02X}")).collect()))
    }

    /// Get the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TagId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for TagId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        TagId::new(s)
    }
}

impl TryFrom<String> for TagId {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        TagId::new(&value)
    }
}

impl From<TagId> for String {
    fn from(value: TagId) -> Self {
        value.0
    }
}

/// Received signal strength, stored in hundredths of a dBm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Rssi(i32);

impl Rssi {
    /// Create from hundredths of a dBm.
    #[must_use]
    pub const fn from_centi_dbm(centi: i32) -> Self {
        Self(centi)
    }

    /// Create from a dBm value, rounded to two decimals.
    #[must_use]
    pub fn from_dbm(dbm: f64) -> Self {
        Self((dbm * 100.0).round() as i32)
    }

    /// Parse vendor text such as `"-65.3"` or `"-70"`.
    ///
    /// # Errors
    /// Returns `Error::InvalidTag` if the text is not a finite number.
    pub fn parse(text: &str) -> Result<Self> {
        let value: f64 = text
            .trim()
            .parse()
            .map_err(|_| Error::invalid_tag(format!("invalid RSSI value '{text}'")))?;
        if !value.is_finite() {
            return Err(Error::invalid_tag(format!("invalid RSSI value '{text}'")));
        }
        Ok(Self::from_dbm(value))
    }

    /// Signal strength in dBm.
    #[must_use]
    pub fn dbm(&self) -> f64 {
        f64::from(self.0) / 100.0
    }

    /// Signal strength in hundredths of a dBm.
    #[must_use]
    pub fn centi_dbm(&self) -> i32 {
        self.0
    }
}

impl fmt::Display for Rssi {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{sign}{}.{:02}", abs / 100, abs % 100)
    }
}

/// A normalized tag read.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TagRecord {
    /// Tag identifier read from EPC memory.
    pub epc: TagId,

    /// Optional TID memory contents.
    pub tid: Option<TagId>,

    /// Optional signal strength of the read.
    pub rssi: Option<Rssi>,

    /// Optional antenna port the tag was seen on.
    pub antenna: Option<u16>,

    /// Capture time, assigned at normalization.
    pub timestamp: DateTime<Utc>,
}

impl TagRecord {
    /// Create a record for `epc` with no optional fields.
    ///
    /// # Errors
    /// Returns `Error::InvalidTag` if `epc` is not a hexadecimal identifier.
    ///
    /// # Examples
    ///
    /// ```
    /// use uhfkit_core::TagRecord;
    ///
    /// let tag = TagRecord::new("e200 ").unwrap();
    /// assert_eq!(tag.epc.as_str(), "E200");
    /// ```
    pub fn new(epc: &str) -> Result<Self> {
        TagRecordBuilder::new(epc).build()
    }

    /// Create a builder for a record with optional fields.
    ///
    /// # Examples
    ///
    /// ```
    /// use uhfkit_core::{Rssi, TagRecord};
    ///
    /// let tag = TagRecord::builder("3074257BF7194E4000001A85")
    ///     .rssi(Rssi::from_dbm(-61.5))
    ///     .antenna(2)
    ///     .build()
    ///     .unwrap();
    /// assert_eq!(tag.antenna, Some(2));
    /// ```
    pub fn builder(epc: &str) -> TagRecordBuilder {
        TagRecordBuilder::new(epc)
    }
}

impl PartialEq for TagRecord {
    fn eq(&self, other: &Self) -> bool {
        self.epc == other.epc
            && self.tid == other.tid
            && self.rssi == other.rssi
            && self.antenna == other.antenna
    }
}

impl Eq for TagRecord {}

impl Hash for TagRecord {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.epc.hash(state);
        self.tid.hash(state);
        self.rssi.hash(state);
        self.antenna.hash(state);
    }
}

impl fmt::Display for TagRecord {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.epc)?;
        if let Some(rssi) = self.rssi {
            write!(f, " rssi={rssi}")?;
        }
        if let Some(antenna) = self.antenna {
            write!(f, " ant={antenna}")?;
        }
        Ok(())
    }
}

/// Builder for [`TagRecord`].
#[derive(Debug, Clone)]
pub struct TagRecordBuilder {
    epc: String,
    tid: Option<String>,
    rssi: Option<Rssi>,
    antenna: Option<u16>,
    timestamp: Option<DateTime<Utc>>,
}

impl TagRecordBuilder {
    /// Create a builder with the required identifier.
    pub fn new(epc: &str) -> Self {
        Self {
            epc: epc.to_string(),
            tid: None,
            rssi: None,
            antenna: None,
            timestamp: None,
        }
    }

    /// Set the TID. Empty strings are treated as absent.
    pub fn tid(mut self, tid: &str) -> Self {
        self.tid = Some(tid.to_string()).filter(|t| !t.trim().is_empty());
        self
    }

    /// Set the signal strength.
    pub fn rssi(mut self, rssi: Rssi) -> Self {
        self.rssi = Some(rssi);
        self
    }

    /// Set the antenna port.
    pub fn antenna(mut self, antenna: u16) -> Self {
        self.antenna = Some(antenna);
        self
    }

    /// Override the capture timestamp (replaying recorded reads).
    pub fn timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Build and validate the record.
    ///
    /// # Errors
    /// Returns `Error::InvalidTag` if the EPC or TID is not hexadecimal.
    pub fn build(self) -> Result<TagRecord> {
        let epc = TagId::new(&self.epc)?;
        let tid = self.tid.as_deref().map(TagId::new).transpose()?;

        Ok(TagRecord {
            epc,
            tid,
            rssi: self.rssi,
            antenna: self.antenna,
            timestamp: self.timestamp.unwrap_or_else(capture_timestamp),
        })
    }
}
