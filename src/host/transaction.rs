// src/host/transaction.rs

use super::{EzoHost, HostResult};
use crate::common::{
    address::EzoAddr, command::Command, response::Response, timing::CommandTimeouts,
};
use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;

impl<I2C, D> EzoHost<I2C, D>
where
    I2C: I2c,
    D: DelayNs,
{
    /// Full command/response exchange: write, wait the command's processing
    /// time, read.
    ///
    /// Returns `Ok(None)` for commands that never answer (`Sleep`).
    pub fn query(
        &mut self,
        address: EzoAddr,
        command: &Command,
        timeouts: &CommandTimeouts,
    ) -> HostResult<Option<Response>, I2C> {
        self.write(address, command)?;

        let Some(wait) = command.timing_class().wait(timeouts) else {
            return Ok(None);
        };
        self.pause(wait);

        self.read(address, timeouts.short).map(Some)
    }
}
