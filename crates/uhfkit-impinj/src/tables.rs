//! Impinj transmit frequency lists.

use std::sync::LazyLock;
use uhfkit_core::{FrequencyRegion, Result};
use uhfkit_hardware::tables::{RegionTable, static_table};

/// Brazilian transmit frequencies, in kHz.
pub const BRAZIL_KHZ: [u32; 4] = [902_000, 905_000, 915_000, 927_500];

pub static FREQUENCIES: LazyLock<Result<RegionTable<&'static [u32]>>> = LazyLock::new(|| {
    RegionTable::from_rows("tx frequency list", [(FrequencyRegion::Brazil, &BRAZIL_KHZ[..])])
});

/// Transmit frequency lists by region.
///
/// # Errors
/// Returns `Error::Configuration` if the table failed to build.
pub fn frequencies() -> Result<&'static RegionTable<&'static [u32]>> {
    static_table(&FREQUENCIES)
}

/// Frequencies in MHz, as the SDK takes them.
pub fn to_mhz(khz: &[u32]) -> Vec<f64> {
    khz.iter().map(|f| f64::from(*f) / 1000.0).collect()
}
