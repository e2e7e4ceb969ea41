// src/host/sim.rs

//! Simulated I2C bus with EZO circuits on it, for registry and shell tests.
//!
//! Every transfer is appended to a shared log so tests can check ordering
//! after the bus has been moved into a host.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use embedded_hal::i2c::{ErrorKind, ErrorType, I2c, NoAcknowledgeSource, Operation};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BusOp {
    Write(u8, String),
    Read(u8),
}

#[derive(Debug, Clone)]
pub struct SimDevice {
    address: u8,
    ezo: bool,
    module: String,
    name: String,
    /// Payload returned for `R`.
    pub reading: String,
    /// Every transfer to this device fails when set.
    pub broken: bool,
    pending: Option<(u8, String)>,
}

impl SimDevice {
    pub fn ezo(address: u8, module: &str, name: &str) -> Self {
        SimDevice {
            address,
            ezo: true,
            module: module.to_string(),
            name: name.to_string(),
            reading: "0.00".to_string(),
            broken: false,
            pending: None,
        }
    }

    /// A device that acknowledges but does not speak the EZO protocol.
    pub fn foreign(address: u8) -> Self {
        SimDevice {
            ezo: false,
            ..Self::ezo(address, "", "")
        }
    }

    pub fn reading(mut self, payload: &str) -> Self {
        self.reading = payload.to_string();
        self
    }

    pub fn broken(mut self) -> Self {
        self.broken = true;
        self
    }

    fn handle_command(&mut self, text: &str) {
        if !self.ezo {
            self.pending = Some((0xFF, "\u{7f}\u{7f}".to_string()));
            return;
        }
        let upper = text.to_ascii_uppercase();
        self.pending = if upper == "I" {
            Some((1, format!("?I,{},2.10", self.module)))
        } else if upper == "NAME,?" {
            Some((1, format!("?Name,{}", self.name)))
        } else if upper == "R" {
            Some((1, self.reading.clone()))
        } else if upper.starts_with("CAL") {
            Some((1, String::new()))
        } else if upper == "STATUS" {
            Some((1, "?Status,P,5.03".to_string()))
        } else if upper == "SLEEP" {
            None
        } else {
            Some((2, String::new()))
        };
    }

    fn fill_response(&self, buffer: &mut [u8]) {
        buffer.fill(0);
        let Some(first) = buffer.first_mut() else {
            return;
        };
        match &self.pending {
            Some((code, payload)) => {
                *first = *code;
                for (slot, byte) in buffer[1..].iter_mut().zip(payload.bytes()) {
                    *slot = byte;
                }
            }
            None => *first = 255,
        }
    }
}

#[derive(Debug, Default)]
pub struct SimBus {
    devices: BTreeMap<u8, SimDevice>,
    log: Rc<RefCell<Vec<BusOp>>>,
}

impl SimBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_device(mut self, device: SimDevice) -> Self {
        self.devices.insert(device.address, device);
        self
    }

    /// Handle on the transfer log that stays valid after the bus is moved.
    pub fn log(&self) -> Rc<RefCell<Vec<BusOp>>> {
        Rc::clone(&self.log)
    }

    fn device(&mut self, address: u8) -> Result<&mut SimDevice, ErrorKind> {
        match self.devices.get_mut(&address) {
            Some(dev) if !dev.broken => Ok(dev),
            Some(_) => Err(ErrorKind::Other),
            None => Err(ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address)),
        }
    }
}

impl ErrorType for SimBus {
    type Error = ErrorKind;
}

impl I2c for SimBus {
    fn transaction(
        &mut self,
        address: u8,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        for op in operations.iter_mut() {
            match op {
                Operation::Write(bytes) => {
                    let text: String = bytes
                        .iter()
                        .take_while(|&&b| b != 0)
                        .map(|&b| b as char)
                        .collect();
                    self.log.borrow_mut().push(BusOp::Write(address, text.clone()));
                    self.device(address)?.handle_command(&text);
                }
                Operation::Read(buffer) => {
                    self.log.borrow_mut().push(BusOp::Read(address));
                    self.device(address)?.fill_response(buffer);
                }
            }
        }
        Ok(())
    }
}
