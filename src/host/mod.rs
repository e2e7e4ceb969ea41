// src/host/mod.rs

mod io_helpers;
#[cfg(test)]
pub(crate) mod sim;
mod transaction;

use crate::common::{address::EzoAddr, error::EzoError};
use core::time::Duration;
use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;

/// Bus master for EZO circuits, synchronous.
///
/// Owns the I2C bus handle and a delay provider. Every method blocks until
/// the transfer (and any processing wait) is done.
#[derive(Debug)]
pub struct EzoHost<I2C, D> {
    i2c: I2C,
    delay: D,
}

impl<I2C, D> EzoHost<I2C, D>
where
    I2C: I2c,
    D: DelayNs,
{
    pub fn new(i2c: I2C, delay: D) -> Self {
        EzoHost { i2c, delay }
    }

    /// Checks whether a device acknowledges its address with a one-byte read.
    pub fn probe(&mut self, address: EzoAddr) -> bool {
        let mut byte = [0u8; 1];
        self.i2c.read(address.value(), &mut byte).is_ok()
    }

    /// Probes every non-reserved address and returns those that answered.
    pub fn scan(&mut self, skip: &[EzoAddr]) -> Vec<EzoAddr> {
        let found: Vec<EzoAddr> = EzoAddr::scan_range()
            .filter(|addr| !skip.contains(addr))
            .filter(|addr| self.probe(*addr))
            .collect();
        log::debug!("bus scan found {} device(s): {:?}", found.len(), found);
        found
    }

    /// Blocks for `duration`.
    pub fn pause(&mut self, duration: Duration) {
        self.delay.delay_ms(duration.as_millis() as u32);
    }

    /// Gives back the bus and delay provider.
    pub fn release(self) -> (I2C, D) {
        (self.i2c, self.delay)
    }
}

/// Shorthand for results carrying the host's bus error.
pub type HostResult<T, I2C> = Result<T, EzoError<<I2C as embedded_hal::i2c::ErrorType>::Error>>;
