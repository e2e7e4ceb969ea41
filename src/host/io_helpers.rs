// src/host/io_helpers.rs

use super::{EzoHost, HostResult};
use crate::common::{
    address::EzoAddr,
    command::{Command, MAX_COMMAND_LEN},
    error::EzoError,
    response::{Response, ResponseCode, RESPONSE_LEN},
    timing,
};
use core::time::Duration;
use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;
use nb::Result as NbResult;

impl<I2C, D> EzoHost<I2C, D>
where
    I2C: I2c,
    D: DelayNs,
{
    /// Sends a command, NUL-terminated, in a single write.
    pub fn write(&mut self, address: EzoAddr, command: &Command) -> HostResult<(), I2C> {
        let text = command.format_into()?;
        let mut frame = [0u8; MAX_COMMAND_LEN + 1];
        let len = text.len();
        frame[..len].copy_from_slice(text.as_bytes());
        // frame[len] is already the NUL terminator

        log::debug!("-> {}: {:?}", address, text.as_str());
        self.i2c
            .write(address.value(), &frame[..=len])
            .map_err(EzoError::Io)
    }

    /// A single read attempt. A circuit that is still processing yields `WouldBlock`.
    pub fn try_read(&mut self, address: EzoAddr) -> NbResult<Response, EzoError<I2C::Error>> {
        let mut raw = [0u8; RESPONSE_LEN];
        self.i2c
            .read(address.value(), &mut raw)
            .map_err(|e| nb::Error::Other(EzoError::Io(e)))?;

        let response =
            Response::parse(&raw).map_err(|e| nb::Error::Other(EzoError::Response(e)))?;
        log::debug!("<- {}: {} {:?}", address, response.code.code(), response.payload);

        if response.code == ResponseCode::Pending {
            Err(nb::Error::WouldBlock)
        } else {
            Ok(response)
        }
    }

    /// Reads a response, re-reading while the circuit reports it is still
    /// processing, for at most `grace`.
    pub fn read(&mut self, address: EzoAddr, grace: Duration) -> HostResult<Response, I2C> {
        self.execute_blocking_io_with_timeout(grace, |host| host.try_read(address))
    }

    /// Executes a non-blocking operation (`f`) repeatedly until it stops
    /// returning `WouldBlock`, returning the final result or a timeout error.
    ///
    /// Elapsed time is counted from the delays issued here, so no clock is needed.
    pub(super) fn execute_blocking_io_with_timeout<FN, T>(
        &mut self,
        timeout: Duration,
        mut f: FN,
    ) -> HostResult<T, I2C>
    where
        FN: FnMut(&mut Self) -> NbResult<T, EzoError<I2C::Error>>,
    {
        let step = timing::PENDING_RETRY_INTERVAL;
        let mut waited = Duration::ZERO;

        loop {
            match f(self) {
                Ok(result) => return Ok(result),
                Err(nb::Error::WouldBlock) => {
                    if waited >= timeout {
                        return Err(EzoError::Timeout);
                    }
                    self.pause(step);
                    waited += step;
                }
                Err(nb::Error::Other(e)) => return Err(e),
            }
        }
    }
}
