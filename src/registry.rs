//! Device registry: the EZO circuits found on the bus and the active target.

use core::fmt;
use core::time::Duration;

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;

use crate::common::{
    address::EzoAddr,
    command::Command,
    response::{parse_device_info, parse_name},
    timing::CommandTimeouts,
};
use crate::host::{EzoHost, HostResult};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("No EZO devices found")]
    Empty,
    #[error("No device found at address {0}")]
    NotFound(EzoAddr),
}

/// One discovered EZO circuit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Device {
    pub address: EzoAddr,
    /// Module type as reported by the circuit (`pH`, `ORP`, `EC`, ...).
    pub module: String,
    /// User-assigned name, empty when unset.
    pub name: String,
    /// Firmware version from the identity answer, empty when not reported.
    pub firmware: String,
    pub timeouts: CommandTimeouts,
}

impl Device {
    pub fn new(address: EzoAddr, module: &str, name: &str, timeouts: CommandTimeouts) -> Self {
        Device {
            address,
            module: module.to_string(),
            name: name.to_string(),
            firmware: String::new(),
            timeouts,
        }
    }

    /// Wait needed before reading the answer to `command`; `None` for sleep.
    pub fn command_timeout(&self, command: &Command) -> Option<Duration> {
        command.timing_class().wait(&self.timeouts)
    }

    /// Minimum poll interval for this circuit.
    pub fn long_timeout(&self) -> Duration {
        self.timeouts.long
    }

    pub fn is_module(&self, module: &str) -> bool {
        self.module.eq_ignore_ascii_case(module)
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.name.is_empty() {
            write!(f, "{} {}", self.module, self.address)
        } else {
            write!(f, "{} {} {}", self.module, self.address, self.name)
        }
    }
}

/// Scans the bus and identifies every EZO circuit on it.
///
/// Addresses in `skip` are not probed (the SCD30 shares the bus and must not
/// receive EZO text commands). A device that does not answer the identity
/// queries is left out rather than failing discovery.
pub fn discover<I2C, D>(
    host: &mut EzoHost<I2C, D>,
    skip: &[EzoAddr],
    timeouts: CommandTimeouts,
) -> Vec<Device>
where
    I2C: I2c,
    D: DelayNs,
{
    let mut devices = Vec::new();
    for address in host.scan(skip) {
        match identify(host, address, timeouts) {
            Ok(Some(device)) => {
                log::info!("found {} (firmware {})", device, device.firmware);
                devices.push(device);
            }
            Ok(None) => log::debug!("address {} is not an EZO device", address),
            Err(e) => log::debug!("address {} failed identification: {}", address, e),
        }
    }
    devices
}

fn identify<I2C, D>(
    host: &mut EzoHost<I2C, D>,
    address: EzoAddr,
    timeouts: CommandTimeouts,
) -> HostResult<Option<Device>, I2C>
where
    I2C: I2c,
    D: DelayNs,
{
    let info = host
        .query(address, &Command::Info, &timeouts)?
        .filter(|r| r.is_success())
        .and_then(|r| parse_device_info(&r.payload));
    let Some(info) = info else {
        return Ok(None);
    };

    let name = host
        .query(address, &Command::NameQuery, &timeouts)?
        .filter(|r| r.is_success())
        .and_then(|r| parse_name(&r.payload))
        .unwrap_or_default();

    Ok(Some(Device {
        address,
        module: info.module,
        name,
        firmware: info.firmware,
        timeouts,
    }))
}

/// The discovered devices plus the one receiving un-prefixed commands.
#[derive(Debug, Clone)]
pub struct Registry {
    devices: Vec<Device>,
    active: usize,
}

impl Registry {
    /// Builds a registry with the first device active.
    pub fn new(devices: Vec<Device>) -> Result<Self, RegistryError> {
        if devices.is_empty() {
            return Err(RegistryError::Empty);
        }
        Ok(Registry { devices, active: 0 })
    }

    pub fn devices(&self) -> &[Device] {
        &self.devices
    }

    pub fn active(&self) -> &Device {
        &self.devices[self.active]
    }

    pub fn get(&self, address: EzoAddr) -> Option<&Device> {
        self.devices.iter().find(|d| d.address == address)
    }

    pub fn resolve(&self, address: EzoAddr) -> Result<&Device, RegistryError> {
        self.get(address).ok_or(RegistryError::NotFound(address))
    }

    /// Makes the device at `address` active. The active device is unchanged on error.
    pub fn select(&mut self, address: EzoAddr) -> Result<&Device, RegistryError> {
        let index = self
            .devices
            .iter()
            .position(|d| d.address == address)
            .ok_or(RegistryError::NotFound(address))?;
        self.active = index;
        Ok(&self.devices[index])
    }

    /// One line per device, the active one marked with `-->`.
    pub fn listing(&self) -> Vec<String> {
        self.devices
            .iter()
            .enumerate()
            .map(|(i, d)| {
                if i == self.active {
                    format!("--> {}", d)
                } else {
                    format!(" - {}", d)
                }
            })
            .collect()
    }
}
