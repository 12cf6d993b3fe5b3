//! Zebra regulatory regions.

use std::sync::LazyLock;
use uhfkit_core::{FrequencyRegion, Result};
use uhfkit_hardware::tables::{RegionTable, static_table};

pub static REGIONS: LazyLock<Result<RegionTable<u16>>> =
    LazyLock::new(|| RegionTable::from_rows("regulatory index", [(FrequencyRegion::Brazil, 0)]));

/// Regulatory index by region.
///
/// # Errors
/// Returns `Error::Configuration` if the table failed to build.
pub fn regions() -> Result<&'static RegionTable<u16>> {
    static_table(&REGIONS)
}
