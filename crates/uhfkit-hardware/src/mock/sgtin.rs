//! SGTIN-96 EPC encoding, used to give simulated tags realistic identifiers.

use crate::Result;
use uhfkit_core::Error;

const HEADER: u128 = 0x30;
const SERIAL_BITS: u32 = 38;

/// Company prefix bits, indexed by partition.
const COMPANY_BITS: [u32; 7] = [40, 37, 34, 30, 27, 24, 20];
/// Item reference bits, indexed by partition.
const ITEM_BITS: [u32; 7] = [4, 7, 10, 14, 17, 20, 24];
/// Company prefix decimal digits, indexed by partition.
const COMPANY_DIGITS: [usize; 7] = [12, 11, 10, 9, 8, 7, 6];

/// Fields of an SGTIN-96 identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sgtin96 {
    pub filter: u8,
    pub partition: u8,
    pub company_prefix: String,
    pub item_reference: u32,
    pub serial: u64,
}

impl Sgtin96 {
    /// Encode as 24 upper-case hex characters.
    ///
    /// The item reference and serial are truncated to their field widths.
    ///
    /// # Errors
    ///
    /// Returns `Error::Configuration` if the filter does not fit in three
    /// bits, the partition is above 6, or the company prefix does not have
    /// the digit count the partition requires.
    pub fn encode(&self) -> Result<String> {
        if self.filter > 7 {
            return Err(Error::configuration(format!(
                "SGTIN filter must be 0-7, got {}",
                self.filter
            )));
        }
        let partition = usize::from(self.partition);
        if partition >= COMPANY_BITS.len() {
            return Err(Error::configuration(format!(
                "SGTIN partition must be 0-6, got {}",
                self.partition
            )));
        }

        let digits = COMPANY_DIGITS[partition];
        if self.company_prefix.len() != digits
            || !self.company_prefix.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(Error::configuration(format!(
                "company prefix must have {digits} digits for partition {partition}"
            )));
        }
        let company: u128 = self
            .company_prefix
            .parse()
            .map_err(|_| Error::configuration("company prefix is not numeric"))?;

        let company_bits = COMPANY_BITS[partition];
        let item_bits = ITEM_BITS[partition];
        let item = u128::from(self.item_reference) & ((1u128 << item_bits) - 1);
        let serial = u128::from(self.serial) & ((1u128 << SERIAL_BITS) - 1);

        let epc = (HEADER << 88)
            | (u128::from(self.filter) << 85)
            | (u128::from(self.partition) << 82)
            | (company << (82 - company_bits))
            | (item << SERIAL_BITS)
            | serial;

        Ok(format!("{epc:024X}"))
    }
}

/// SGTIN-96 with filter 3, partition 5 and company prefix `0614141`.
///
/// # Errors
///
/// Returns `Error::Configuration` if `item_reference` is not a decimal
/// number.
///
/// # Examples
///
/// ```
/// use uhfkit_hardware::mock::generate_sgtin;
///
/// assert_eq!(
///     generate_sgtin("812345", 6789).unwrap(),
///     "3074257BF7194E4000001A85"
/// );
/// ```
pub fn generate_sgtin(item_reference: &str, serial: u64) -> Result<String> {
    let item_reference = item_reference.trim().parse().map_err(|_| {
        Error::configuration(format!("item reference '{item_reference}' is not numeric"))
    })?;

    Sgtin96 {
        filter: 3,
        partition: 5,
        company_prefix: "0614141".to_string(),
        item_reference,
        serial,
    }
    .encode()
}
