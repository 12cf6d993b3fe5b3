//! Mercury region presets.

use crate::mercury::Region;
use std::sync::LazyLock;
use uhfkit_core::{FrequencyRegion, Result};
use uhfkit_hardware::tables::{ChannelPlan, RegionTable, static_table};

/// Brazilian channel step, in kHz.
pub const BRAZIL_STEP_KHZ: u32 = 250;

/// Brazilian bands as (lower, upper) pairs, in kHz.
pub const BRAZIL_BANDS_KHZ: [u32; 4] = [902_000, 905_000, 915_000, 927_500];

/// Region preset plus, for open regions, the channel plan to load.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RegionSetting {
    pub region: Region,
    pub plan: Option<ChannelPlan>,
}

impl RegionSetting {
    fn preset(region: Region) -> Self {
        Self { region, plan: None }
    }
}

pub static REGIONS: LazyLock<Result<RegionTable<RegionSetting>>> = LazyLock::new(|| {
    let brazil = ChannelPlan::generate(BRAZIL_STEP_KHZ, &BRAZIL_BANDS_KHZ)?;
    RegionTable::from_rows(
        "region",
        [
            (FrequencyRegion::UnitedStates, RegionSetting::preset(Region::Na)),
            (FrequencyRegion::Europe, RegionSetting::preset(Region::Eu)),
            (FrequencyRegion::Korea, RegionSetting::preset(Region::Kr)),
            (FrequencyRegion::Japan, RegionSetting::preset(Region::Jp)),
            (FrequencyRegion::Taiwan, RegionSetting::preset(Region::Tw)),
            (FrequencyRegion::Vietnam, RegionSetting::preset(Region::Vn)),
            (FrequencyRegion::Malaysia, RegionSetting::preset(Region::My)),
            (FrequencyRegion::Russia, RegionSetting::preset(Region::Ru)),
            (FrequencyRegion::HongKong, RegionSetting::preset(Region::Hk)),
            (
                FrequencyRegion::Brazil,
                RegionSetting {
                    region: Region::Open,
                    plan: Some(brazil),
                },
            ),
        ],
    )
});

/// Region table.
///
/// # Errors
/// Returns `Error::Configuration` if the table failed to build.
pub fn regions() -> Result<&'static RegionTable<RegionSetting>> {
    static_table(&REGIONS)
}
