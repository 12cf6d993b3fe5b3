//! Vendor parameter normalization tables.
//!
//! Every vendor spells regions and power differently: a bit mask, a region
//! id, a list of channels, a dBm value scaled by 100, or an index into a
//! power table the reader reports at runtime. Adapters declare their mapping
//! once as a list of rows and query it through the lookups here, which return
//! an explicit error instead of passing a missing value on to the SDK.
//!
//! # Examples
//!
//! ```
//! use uhfkit_core::FrequencyRegion;
//! use uhfkit_hardware::tables::RegionTable;
//!
//! let table = RegionTable::from_rows(
//!     "frequency mask",
//!     [(FrequencyRegion::Europe, 0x04u8), (FrequencyRegion::UnitedStates, 0x08)],
//! )
//! .unwrap();
//!
//! assert_eq!(*table.vendor_value(FrequencyRegion::Europe).unwrap(), 0x04);
//! assert_eq!(table.region_for(&0x08).unwrap(), FrequencyRegion::UnitedStates);
//! assert!(table.vendor_value(FrequencyRegion::Brazil).is_err());
//! ```

use crate::Result;
use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;
use std::sync::LazyLock;
use uhfkit_core::{Error, FrequencyRegion, PowerRange, dbm_to_centi};

/// Borrow a table built once in a `LazyLock`.
///
/// # Errors
///
/// Returns `Error::Configuration` if the table failed to build.
pub fn static_table<T>(table: &'static LazyLock<Result<T>>) -> Result<&'static T> {
    table
        .as_ref()
        .map_err(|e| Error::configuration(format!("static table is invalid: {e}")))
}

/// Immutable bidirectional table.
#[derive(Debug, Clone)]
pub struct LookupTable<K, V> {
    forward: HashMap<K, V>,
    reverse: HashMap<V, K>,
}

impl<K, V> LookupTable<K, V>
where
    K: Eq + Hash + Clone + Debug,
    V: Eq + Hash + Clone + Debug,
{
    /// Build from rows.
    ///
    /// # Errors
    ///
    /// Returns `Error::Configuration` if a key or a value appears twice,
    /// since the reverse lookup would be ambiguous.
    pub fn from_rows(rows: impl IntoIterator<Item = (K, V)>) -> Result<Self> {
        let mut forward = HashMap::new();
        let mut reverse = HashMap::new();

        for (key, value) in rows {
            if forward.contains_key(&key) {
                return Err(Error::configuration(format!("duplicate table key {key:?}")));
            }
            if reverse.contains_key(&value) {
                return Err(Error::configuration(format!(
                    "duplicate table value {value:?}"
                )));
            }
            forward.insert(key.clone(), value.clone());
            reverse.insert(value, key);
        }

        Ok(Self { forward, reverse })
    }

    /// Value for `key`.
    pub fn forward(&self, key: &K) -> Option<&V> {
        self.forward.get(key)
    }

    /// Key for `value`.
    pub fn reverse(&self, value: &V) -> Option<&K> {
        self.reverse.get(value)
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.forward.len()
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.forward.is_empty()
    }

    /// Iterate over keys.
    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.forward.keys()
    }

    /// Iterate over rows.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.forward.iter()
    }
}

/// Mapping between [`FrequencyRegion`] and a vendor-native value.
#[derive(Debug, Clone)]
pub struct RegionTable<V> {
    kind: &'static str,
    table: LookupTable<FrequencyRegion, V>,
}

impl<V> RegionTable<V>
where
    V: Eq + Hash + Clone + Debug,
{
    /// Build from rows. `kind` names the vendor value in error messages.
    ///
    /// # Errors
    ///
    /// Returns `Error::Configuration` on a duplicate region or value.
    pub fn from_rows(
        kind: &'static str,
        rows: impl IntoIterator<Item = (FrequencyRegion, V)>,
    ) -> Result<Self> {
        Ok(Self {
            kind,
            table: LookupTable::from_rows(rows)?,
        })
    }

    /// Vendor value for `region`.
    ///
    /// # Errors
    ///
    /// Returns `Error::UnsupportedRegion` if the vendor has no mapping.
    pub fn vendor_value(&self, region: FrequencyRegion) -> Result<&V> {
        self.table
            .forward(&region)
            .ok_or(Error::UnsupportedRegion(region))
    }

    /// Whether `region` has a mapping.
    pub fn supports(&self, region: FrequencyRegion) -> bool {
        self.table.forward(&region).is_some()
    }

    /// Supported regions, in declaration order of [`FrequencyRegion`].
    pub fn regions(&self) -> Vec<FrequencyRegion> {
        FrequencyRegion::ALL
            .into_iter()
            .filter(|r| self.supports(*r))
            .collect()
    }
}

impl<V> RegionTable<V>
where
    V: Eq + Hash + Clone + Debug + VendorCode,
{
    /// Region for a value reported by the device.
    ///
    /// # Errors
    ///
    /// Returns `Error::UnknownVendorValue` if the value has no mapping.
    pub fn region_for(&self, value: &V) -> Result<FrequencyRegion> {
        self.table
            .reverse(value)
            .copied()
            .ok_or_else(|| Error::unknown_vendor_value(self.kind, value.code()))
    }
}

/// Numeric form of a vendor value, used in error reports.
pub trait VendorCode {
    fn code(&self) -> i64;
}

macro_rules! impl_vendor_code {
    ($($t:ty),*) => {
        $(impl VendorCode for $t {
            fn code(&self) -> i64 {
                i64::from(*self)
            }
        })*
    };
}

impl_vendor_code!(u8, u16, u32, i8, i16, i32);

/// Channel list generated from (lower, upper) bounds and a step, in kHz.
///
/// # Examples
///
/// ```
/// use uhfkit_hardware::tables::ChannelPlan;
///
/// let plan = ChannelPlan::generate(250, &[902_000, 905_000]).unwrap();
/// assert_eq!(plan.len(), 13);
/// assert_eq!(plan.channels()[1], 902_250);
/// assert_eq!(plan.channels().last(), Some(&905_000));
///
/// assert!(ChannelPlan::generate(250, &[902_000]).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ChannelPlan {
    step_khz: u32,
    channels: Vec<u32>,
}

impl ChannelPlan {
    /// Enumerate `lower, lower + step, ...` up to and including `upper` for
    /// each pair in `bounds`.
    ///
    /// # Errors
    ///
    /// Returns `Error::Configuration` if `bounds` has an odd length, the step
    /// is zero, or a pair has its lower bound above its upper bound.
    pub fn generate(step_khz: u32, bounds: &[u32]) -> Result<Self> {
        if step_khz == 0 {
            return Err(Error::configuration("channel step must be positive"));
        }
        if bounds.len() % 2 != 0 {
            return Err(Error::configuration(format!(
                "channel bounds must be (lower, upper) pairs, got {} values",
                bounds.len()
            )));
        }

        let mut channels = Vec::new();
        for pair in bounds.chunks_exact(2) {
            let (lower, upper) = (pair[0], pair[1]);
            if lower > upper {
                return Err(Error::configuration(format!(
                    "channel lower bound {lower} is above upper bound {upper}"
                )));
            }
            channels.extend((lower..=upper).step_by(step_khz as usize));
        }

        Ok(Self { step_khz, channels })
    }

    /// Step between channels, in kHz.
    pub fn step_khz(&self) -> u32 {
        self.step_khz
    }

    /// Channel frequencies, in kHz.
    pub fn channels(&self) -> &[u32] {
        &self.channels
    }

    /// Channel frequencies, in MHz.
    pub fn channels_mhz(&self) -> Vec<f64> {
        self.channels.iter().map(|c| f64::from(*c) / 1000.0).collect()
    }

    /// Number of channels.
    pub fn len(&self) -> usize {
        self.channels.len()
    }

    /// Whether the plan has no channels.
    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }
}

/// Transmit power levels reported by a reader, in hundredths of a dBm.
///
/// The SDK is driven by index into this list.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PowerLevelTable {
    levels: Vec<i32>,
}

impl PowerLevelTable {
    /// Wrap the levels reported by the device.
    pub fn from_centi_dbm(levels: Vec<i32>) -> Self {
        Self { levels }
    }

    /// Index of the level equal to `dbm`.
    ///
    /// # Errors
    ///
    /// Returns `Error::UnsupportedPowerLevel` if no level matches exactly.
    pub fn index_for_dbm(&self, dbm: i32) -> Result<usize> {
        let target = dbm_to_centi(dbm);
        self.levels
            .iter()
            .position(|level| *level == target)
            .ok_or(Error::UnsupportedPowerLevel(dbm))
    }

    /// Level at `index`, in whole dBm.
    pub fn dbm_at(&self, index: usize) -> Option<i32> {
        self.levels.get(index).map(|centi| centi / 100)
    }

    /// Smallest and largest level, in whole dBm.
    pub fn range(&self) -> Option<PowerRange> {
        let min = self.levels.iter().min()?;
        let max = self.levels.iter().max()?;
        Some(PowerRange::new(min / 100, max / 100))
    }

    /// Number of levels.
    pub fn len(&self) -> usize {
        self.levels.len()
    }

    /// Whether the device reported no levels.
    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }
}
