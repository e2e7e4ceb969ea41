// src/common/address.rs

use core::convert::TryFrom;
use core::fmt;
use core::str::FromStr;

/// Error produced when user text or a raw value is not a valid 7-bit I2C address.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AddressError {
    /// Not a decimal number at all.
    #[error("invalid I2C address: '{0}'")]
    Invalid(String),
    /// A number, but outside the 7-bit address space.
    #[error("I2C address {0} is out of range (0-127)")]
    OutOfRange(u16),
}

/// A 7-bit I2C address of an EZO circuit (or any other device on the bus).
///
/// Atlas Scientific documents its circuits with decimal addresses
/// (pH = 99, ORP = 98, ...), so parsing and display are decimal.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub struct EzoAddr(u8);

impl EzoAddr {
    /// Highest valid 7-bit address.
    pub const MAX: u8 = 0x7F;

    /// First and last addresses probed by a bus scan. 0x00-0x02 and
    /// 0x78-0x7F are reserved by the I2C specification.
    pub const SCAN_FIRST: EzoAddr = EzoAddr(0x03);
    pub const SCAN_LAST: EzoAddr = EzoAddr(0x77);

    /// Factory addresses of the circuits this shell is usually wired to.
    pub const ORP_DEFAULT: EzoAddr = EzoAddr(98);
    pub const PH_DEFAULT: EzoAddr = EzoAddr(99);
    /// The Sensirion SCD30 sharing the bus.
    pub const SCD30_DEFAULT: EzoAddr = EzoAddr(0x61);

    pub fn new(raw: u8) -> Result<Self, AddressError> {
        if raw <= Self::MAX {
            Ok(EzoAddr(raw))
        } else {
            Err(AddressError::OutOfRange(raw as u16))
        }
    }

    #[inline]
    pub const fn value(&self) -> u8 {
        self.0
    }

    /// Iterator over every address a bus scan should probe.
    pub fn scan_range() -> impl Iterator<Item = EzoAddr> {
        (Self::SCAN_FIRST.0..=Self::SCAN_LAST.0).map(EzoAddr)
    }
}

impl TryFrom<u8> for EzoAddr {
    type Error = AddressError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl FromStr for EzoAddr {
    type Err = AddressError;

    /// Parses decimal text such as `"99"` or `" 102 "`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let value: u16 = trimmed
            .parse()
            .map_err(|_| AddressError::Invalid(trimmed.to_string()))?;
        if value > Self::MAX as u16 {
            return Err(AddressError::OutOfRange(value));
        }
        Ok(EzoAddr(value as u8))
    }
}

impl From<EzoAddr> for u8 {
    fn from(value: EzoAddr) -> Self {
        value.0
    }
}

impl fmt::Display for EzoAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
