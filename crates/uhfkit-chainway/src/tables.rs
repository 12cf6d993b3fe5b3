//! Chainway register values.

use std::fmt;
use std::sync::LazyLock;
use uhfkit_core::{Error, FrequencyRegion, Result};
use uhfkit_hardware::tables::{LookupTable, RegionTable, static_table};

/// Frequency masks of the `setFrequencyMode` register.
pub static FREQUENCY_MASKS: LazyLock<Result<RegionTable<u8>>> = LazyLock::new(|| {
    RegionTable::from_rows(
        "frequency mask",
        [
            (FrequencyRegion::ChinaLower, 0x01),
            (FrequencyRegion::ChinaUpper, 0x02),
            (FrequencyRegion::Europe, 0x04),
            (FrequencyRegion::UnitedStates, 0x08),
            (FrequencyRegion::Korea, 0x16),
            (FrequencyRegion::Japan, 0x32),
            (FrequencyRegion::SouthAfrica, 0x33),
            (FrequencyRegion::Taiwan, 0x34),
            (FrequencyRegion::Vietnam, 0x35),
            (FrequencyRegion::Peru, 0x36),
            (FrequencyRegion::Russia, 0x37),
            (FrequencyRegion::Morocco, 0x80),
            (FrequencyRegion::Malaysia, 0x3B),
            (FrequencyRegion::Brazil, 0x3C),
        ],
    )
});

/// Frequency mask table.
///
/// # Errors
/// Returns `Error::Configuration` if the table failed to build.
pub fn frequency_masks() -> Result<&'static RegionTable<u8>> {
    static_table(&FREQUENCY_MASKS)
}

/// Air protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Protocol {
    Iso18000_6C,
    GbT29768,
    Gjb7377_1,
    Iso18000_6B,
}

static PROTOCOLS: LazyLock<Result<LookupTable<Protocol, u8>>> = LazyLock::new(|| {
    LookupTable::from_rows([
        (Protocol::Iso18000_6C, 0x00),
        (Protocol::GbT29768, 0x01),
        (Protocol::Gjb7377_1, 0x02),
        (Protocol::Iso18000_6B, 0x03),
    ])
});

impl Protocol {
    /// Register value.
    ///
    /// # Errors
    /// Returns `Error::Configuration` if the table failed to build.
    pub fn mask(self) -> Result<u8> {
        static_table(&PROTOCOLS)?
            .forward(&self)
            .copied()
            .ok_or_else(|| Error::configuration(format!("no mask for protocol {self}")))
    }

    /// Protocol for a register value.
    ///
    /// # Errors
    /// Returns `Error::UnknownVendorValue` for an unmapped value.
    pub fn from_mask(mask: u8) -> Result<Self> {
        static_table(&PROTOCOLS)?
            .reverse(&mask)
            .copied()
            .ok_or_else(|| Error::unknown_vendor_value("protocol mask", mask))
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            Self::Iso18000_6C => "ISO18000-6C",
            Self::GbT29768 => "GB/T 29768",
            Self::Gjb7377_1 => "GJB 7377.1",
            Self::Iso18000_6B => "ISO18000-6B",
        };
        f.write_str(name)
    }
}

/// RF link profile: modulation, encoding and link frequency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RfLink {
    DsbAskFm0_40Khz,
    PrAskMiller4_250Khz,
    PrAskMiller4_300Khz,
    DsbAskFm0_400Khz,
}

static RF_LINKS: LazyLock<Result<LookupTable<RfLink, u8>>> = LazyLock::new(|| {
    LookupTable::from_rows([
        (RfLink::DsbAskFm0_40Khz, 0),
        (RfLink::PrAskMiller4_250Khz, 1),
        (RfLink::PrAskMiller4_300Khz, 2),
        (RfLink::DsbAskFm0_400Khz, 3),
    ])
});

impl RfLink {
    /// Register value.
    ///
    /// # Errors
    /// Returns `Error::Configuration` if the table failed to build.
    pub fn mask(self) -> Result<u8> {
        static_table(&RF_LINKS)?
            .forward(&self)
            .copied()
            .ok_or_else(|| Error::configuration(format!("no mask for RF link {self}")))
    }

    /// Link profile for a register value.
    ///
    /// # Errors
    /// Returns `Error::UnknownVendorValue` for an unmapped value.
    pub fn from_mask(mask: u8) -> Result<Self> {
        static_table(&RF_LINKS)?
            .reverse(&mask)
            .copied()
            .ok_or_else(|| Error::unknown_vendor_value("RF link mask", mask))
    }
}

impl fmt::Display for RfLink {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            Self::DsbAskFm0_40Khz => "DSB_ASK/FM0/40KHz",
            Self::PrAskMiller4_250Khz => "PR_ASK/Miller4/250KHz",
            Self::PrAskMiller4_300Khz => "PR_ASK/Miller4/300KHz",
            Self::DsbAskFm0_400Khz => "DSB_ASK/FM0/400KHz",
        };
        f.write_str(name)
    }
}
