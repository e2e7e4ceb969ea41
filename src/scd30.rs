//! Sensirion SCD30 CO2/temperature/humidity driver.
//!
//! Commands are 16-bit big-endian words. Every 16-bit data word (sent or
//! received) is followed by a CRC-8 (polynomial 0x31, init 0xFF).
//! See the Sensirion "Interface Description Sensirion SCD30 Sensor Module".

use crc::{Crc, CRC_8_NRSC_5};
use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;

use crate::ambient::{AmbientReading, AmbientSensor};
use crate::common::address::EzoAddr;

/// Fixed I2C address of the SCD30.
pub const DEFAULT_ADDRESS: EzoAddr = EzoAddr::SCD30_DEFAULT;

const CRC8: Crc<u8> = Crc::<u8>::new(&CRC_8_NRSC_5);

/// Time the sensor needs between a read command and the data read.
const COMMAND_DELAY_MS: u32 = 3;

const CMD_START_CONTINUOUS: u16 = 0x0010;
const CMD_STOP_CONTINUOUS: u16 = 0x0104;
const CMD_SET_INTERVAL: u16 = 0x4600;
const CMD_DATA_READY: u16 = 0x0202;
const CMD_READ_MEASUREMENT: u16 = 0x0300;
const CMD_FIRMWARE_VERSION: u16 = 0xD100;
const CMD_SOFT_RESET: u16 = 0xD304;

#[derive(Debug, thiserror::Error)]
pub enum Scd30Error<E>
where
    E: core::fmt::Debug,
{
    #[error("SCD30 I/O error: {0:?}")]
    Io(E),
    /// A received word did not match its CRC byte.
    #[error("SCD30 checksum mismatch")]
    Checksum,
    /// No measurement has completed yet.
    #[error("SCD30 has no measurement yet")]
    NotReady,
    #[error("SCD30 argument out of range: {0}")]
    InvalidArgument(u16),
}

/// CRC-8 of a 16-bit word as the SCD30 computes it.
pub fn crc8(word: [u8; 2]) -> u8 {
    CRC8.checksum(&word)
}

pub struct Scd30<I2C, D> {
    i2c: I2C,
    delay: D,
    address: EzoAddr,
    last: Option<AmbientReading>,
}

impl<I2C, D> Scd30<I2C, D>
where
    I2C: I2c,
    D: DelayNs,
{
    pub fn new(i2c: I2C, delay: D) -> Self {
        Self::with_address(i2c, delay, DEFAULT_ADDRESS)
    }

    pub fn with_address(i2c: I2C, delay: D, address: EzoAddr) -> Self {
        Scd30 {
            i2c,
            delay,
            address,
            last: None,
        }
    }

    pub fn address(&self) -> EzoAddr {
        self.address
    }

    /// Starts continuous measurement. `pressure_mbar` is 0 (no compensation)
    /// or 700-1400.
    pub fn start_continuous(&mut self, pressure_mbar: u16) -> Result<(), Scd30Error<I2C::Error>> {
        if pressure_mbar != 0 && !(700..=1400).contains(&pressure_mbar) {
            return Err(Scd30Error::InvalidArgument(pressure_mbar));
        }
        self.write_with_arg(CMD_START_CONTINUOUS, pressure_mbar)
    }

    pub fn stop_continuous(&mut self) -> Result<(), Scd30Error<I2C::Error>> {
        self.write_command(CMD_STOP_CONTINUOUS)
    }

    /// Sets the measurement interval, 2-1800 seconds.
    pub fn set_measurement_interval(&mut self, seconds: u16) -> Result<(), Scd30Error<I2C::Error>> {
        if !(2..=1800).contains(&seconds) {
            return Err(Scd30Error::InvalidArgument(seconds));
        }
        self.write_with_arg(CMD_SET_INTERVAL, seconds)
    }

    pub fn data_ready(&mut self) -> Result<bool, Scd30Error<I2C::Error>> {
        let mut buf = [0u8; 3];
        self.read_words(CMD_DATA_READY, &mut buf)?;
        Ok(u16::from_be_bytes([buf[0], buf[1]]) == 1)
    }

    /// Reads the current measurement. Call only when [`Self::data_ready`] is true.
    pub fn read_measurement(&mut self) -> Result<AmbientReading, Scd30Error<I2C::Error>> {
        let mut buf = [0u8; 18];
        self.read_words(CMD_READ_MEASUREMENT, &mut buf)?;

        // Each float spans two words: [hi hi crc lo lo crc]
        let float_at = |i: usize| f32::from_be_bytes([buf[i], buf[i + 1], buf[i + 3], buf[i + 4]]);
        Ok(AmbientReading {
            co2_ppm: float_at(0),
            temperature_c: float_at(6),
            humidity_pct: float_at(12),
        })
    }

    /// Firmware version as (major, minor).
    pub fn firmware_version(&mut self) -> Result<(u8, u8), Scd30Error<I2C::Error>> {
        let mut buf = [0u8; 3];
        self.read_words(CMD_FIRMWARE_VERSION, &mut buf)?;
        Ok((buf[0], buf[1]))
    }

    pub fn soft_reset(&mut self) -> Result<(), Scd30Error<I2C::Error>> {
        self.write_command(CMD_SOFT_RESET)
    }

    pub fn release(self) -> (I2C, D) {
        (self.i2c, self.delay)
    }

    fn write_command(&mut self, command: u16) -> Result<(), Scd30Error<I2C::Error>> {
        self.i2c
            .write(self.address.value(), &command.to_be_bytes())
            .map_err(Scd30Error::Io)
    }

    fn write_with_arg(&mut self, command: u16, arg: u16) -> Result<(), Scd30Error<I2C::Error>> {
        let [c0, c1] = command.to_be_bytes();
        let word = arg.to_be_bytes();
        let frame = [c0, c1, word[0], word[1], crc8(word)];
        self.i2c.write(self.address.value(), &frame).map_err(Scd30Error::Io)
    }

    /// Sends a read command, waits, then reads and verifies `buf.len() / 3` words.
    fn read_words(&mut self, command: u16, buf: &mut [u8]) -> Result<(), Scd30Error<I2C::Error>> {
        self.write_command(command)?;
        self.delay.delay_ms(COMMAND_DELAY_MS);
        self.i2c.read(self.address.value(), buf).map_err(Scd30Error::Io)?;

        for chunk in buf.chunks_exact(3) {
            if crc8([chunk[0], chunk[1]]) != chunk[2] {
                return Err(Scd30Error::Checksum);
            }
        }
        Ok(())
    }
}

impl<I2C, D> AmbientSensor for Scd30<I2C, D>
where
    I2C: I2c,
    D: DelayNs,
{
    type Error = Scd30Error<I2C::Error>;

    /// Reads a fresh measurement when one is ready, otherwise returns the last one.
    fn measure(&mut self) -> Result<AmbientReading, Self::Error> {
        if self.data_ready()? {
            let reading = self.read_measurement()?;
            log::debug!("scd30: {:?}", reading);
            self.last = Some(reading);
        }
        self.last.ok_or(Scd30Error::NotReady)
    }
}
