//! Interactive command shell over the discovered EZO circuits.
//!
//! [`Shell::execute`] runs a single line and [`Shell::run`] drives the
//! prompt loop. All user-facing text goes to the writer passed in, so the
//! shell can be driven from tests the same way it is from a terminal.

mod help;
mod interrupt;
pub mod parser;
mod poll;

pub use help::{help_text, CALIBRATION_TEXT};
pub use interrupt::Interrupt;
pub use parser::{parse_line, ParseError, ShellCommand};

use std::io::{self, BufRead, Write};
use std::time::Duration;

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;

use crate::ambient::AmbientSensor;
use crate::common::{
    address::EzoAddr, command::Command, error::EzoError, response::Response,
};
use crate::host::EzoHost;
use crate::publisher::Publisher;
use crate::registry::{Device, Registry};

pub const PROMPT: &str = ">> Enter command: ";

const LIST_HINT: &str = "Address may be invalid, use list command to see available addresses";

/// What the caller should do after a line has been executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

pub struct Shell<I2C, D, A, P> {
    host: EzoHost<I2C, D>,
    registry: Registry,
    ambient: Option<A>,
    publisher: Option<P>,
    interrupt: Interrupt,
}

impl<I2C, D, A, P> Shell<I2C, D, A, P>
where
    I2C: I2c,
    D: DelayNs,
    A: AmbientSensor,
    P: Publisher,
{
    pub fn new(host: EzoHost<I2C, D>, registry: Registry, interrupt: Interrupt) -> Self {
        Shell {
            host,
            registry,
            ambient: None,
            publisher: None,
            interrupt,
        }
    }

    pub fn with_ambient(mut self, sensor: A) -> Self {
        self.ambient = Some(sensor);
        self
    }

    pub fn with_publisher(mut self, publisher: P) -> Self {
        self.publisher = Some(publisher);
        self
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn interrupt(&self) -> &Interrupt {
        &self.interrupt
    }

    /// Prompt loop: reads lines from `input` until end of input or `exit`.
    ///
    /// A line that is not valid UTF-8 is reported and skipped.
    pub fn run<R, W>(&mut self, mut input: R, out: &mut W) -> io::Result<()>
    where
        R: BufRead,
        W: Write,
    {
        let mut buf = Vec::new();
        loop {
            write!(out, "{}", PROMPT)?;
            out.flush()?;

            buf.clear();
            if input.read_until(b'\n', &mut buf)? == 0 {
                writeln!(out)?;
                return Ok(());
            }
            let Ok(line) = std::str::from_utf8(&buf) else {
                log::debug!("non UTF-8 input: {:?}", String::from_utf8_lossy(&buf));
                writeln!(out, "Invalid input: not UTF-8 text, line ignored")?;
                continue;
            };
            if self.execute(line, out)? == Flow::Exit {
                return Ok(());
            }
        }
    }

    /// Runs one line of input.
    pub fn execute<W: Write>(&mut self, line: &str, out: &mut W) -> io::Result<Flow> {
        let command = match parse_line(line) {
            Ok(command) => command,
            Err(e) => {
                writeln!(out, "{}", e)?;
                return Ok(Flow::Continue);
            }
        };

        match command {
            ShellCommand::Empty => {}
            ShellCommand::List => self.print_devices(out)?,
            ShellCommand::Help => {
                writeln!(out, "{}", help_text(self.registry.active().long_timeout()))?
            }
            ShellCommand::CalInfo => writeln!(out, "{}", CALIBRATION_TEXT)?,
            ShellCommand::Exit => return Ok(Flow::Exit),
            ShellCommand::Poll { interval } => {
                let interval = self.poll_interval(interval, out)?;
                self.poll(interval, out)?;
            }
            ShellCommand::All { command } => self.broadcast(command, out)?,
            ShellCommand::Addressed { address, command } => {
                self.send_addressed(address, command, out)?
            }
            ShellCommand::Passthrough(command) => self.send_active(command, out)?,
        }
        Ok(Flow::Continue)
    }

    pub fn print_devices<W: Write>(&self, out: &mut W) -> io::Result<()> {
        for line in self.registry.listing() {
            writeln!(out, "{}", line)?;
        }
        Ok(())
    }

    /// Requested poll interval, raised to the active device's long timeout.
    fn poll_interval<W: Write>(
        &self,
        requested: Option<Duration>,
        out: &mut W,
    ) -> io::Result<Duration> {
        let minimum = self.registry.active().long_timeout();
        match requested {
            None => Ok(minimum),
            Some(interval) if interval < minimum => {
                writeln!(
                    out,
                    "Polling time is shorter than timeout, setting polling time to {:.2}",
                    minimum.as_secs_f32()
                )?;
                Ok(minimum)
            }
            Some(interval) => Ok(interval),
        }
    }

    fn send_addressed<W: Write>(
        &mut self,
        address: EzoAddr,
        text: &str,
        out: &mut W,
    ) -> io::Result<()> {
        match self.registry.select(address) {
            Ok(device) => {
                log::debug!("active device is now {}", device);
                self.send_active(text, out)
            }
            Err(e) => writeln!(out, "{}", e),
        }
    }

    fn send_active<W: Write>(&mut self, text: &str, out: &mut W) -> io::Result<()> {
        let command = match Command::raw(text) {
            Ok(command) => command,
            Err(e) => return writeln!(out, "{}", e),
        };
        let device = self.registry.active().clone();

        match self.host.query(device.address, &command, &device.timeouts) {
            Ok(Some(response)) => print_response(out, &device, &response),
            Ok(None) => writeln!(out, "sleep mode"),
            Err(e) => report_failure(out, &e),
        }
    }

    /// Writes `text` to every device, then collects all the answers.
    fn broadcast<W: Write>(&mut self, text: &str, out: &mut W) -> io::Result<()> {
        let command = match Command::raw(text) {
            Ok(command) => command,
            Err(e) => return writeln!(out, "{}", e),
        };
        let devices = self.registry.devices().to_vec();

        let mut written = Vec::with_capacity(devices.len());
        for device in &devices {
            match self.host.write(device.address, &command) {
                Ok(()) => written.push(device),
                Err(e) => {
                    log::warn!("write to {} failed: {}", device, e);
                    writeln!(out, "Error {}: {}", device, e)?;
                }
            }
        }

        let Some(wait) = devices[0].command_timeout(&command) else {
            return writeln!(out, "sleep mode");
        };
        self.host.pause(wait);

        for device in written {
            match self.host.read(device.address, device.timeouts.short) {
                Ok(response) => print_response(out, device, &response)?,
                Err(e) => {
                    log::warn!("read from {} failed: {}", device, e);
                    writeln!(out, "Error {}: {}", device, e)?;
                }
            }
        }
        Ok(())
    }
}

fn print_response<W: Write>(out: &mut W, device: &Device, response: &Response) -> io::Result<()> {
    if response.is_success() {
        writeln!(out, "Success {}: {}", device, response.payload)
    } else {
        writeln!(out, "Error {}: {}", device, response.code)
    }
}

fn report_failure<W, E>(out: &mut W, error: &EzoError<E>) -> io::Result<()>
where
    W: Write,
    E: core::fmt::Debug,
{
    log::warn!("query failed: {}", error);
    if error.is_io() {
        writeln!(out, "Query failed\n - {}", LIST_HINT)
    } else {
        writeln!(out, "Query failed: {}", error)
    }
}
