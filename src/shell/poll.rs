// src/shell/poll.rs

use std::io::{self, Write};
use std::time::Duration;

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;

use super::Shell;
use crate::ambient::AmbientSensor;
use crate::common::{command::Command, response::parse_reading, timing::SLEEP_SLICE};
use crate::publisher::{Publisher, Snapshot};
use crate::registry::Device;

impl<I2C, D, A, P> Shell<I2C, D, A, P>
where
    I2C: I2c,
    D: DelayNs,
    A: AmbientSensor,
    P: Publisher,
{
    /// Polls every device until the interrupt fires, then prints the listing.
    pub(super) fn poll<W: Write>(&mut self, interval: Duration, out: &mut W) -> io::Result<()> {
        log::info!("polling {} device(s) every {:?}", self.registry.devices().len(), interval);
        self.interrupt.arm();
        let result = self.poll_until_interrupted(interval, out);
        self.interrupt.disarm();
        result?;

        writeln!(out, "Continuous polling stopped")?;
        self.print_devices(out)
    }

    fn poll_until_interrupted<W: Write>(
        &mut self,
        interval: Duration,
        out: &mut W,
    ) -> io::Result<()> {
        while !self.interrupt.is_requested() {
            writeln!(out, "-------press ctrl-c to stop the polling")?;
            let triggered = self.trigger_reads(out)?;

            if !self.sleep_interruptible(interval) {
                break;
            }

            let mut snapshot = Snapshot::default();
            for device in &triggered {
                self.collect_reading(device, &mut snapshot, out)?;
            }
            self.collect_ambient(&mut snapshot, out)?;
            self.publish(&snapshot, out)?;
        }
        Ok(())
    }

    /// Sends `R` to every device; returns those that accepted it.
    fn trigger_reads<W: Write>(&mut self, out: &mut W) -> io::Result<Vec<Device>> {
        let mut triggered = Vec::with_capacity(self.registry.devices().len());
        for device in self.registry.devices() {
            match self.host.write(device.address, &Command::Read) {
                Ok(()) => triggered.push(device.clone()),
                Err(e) => {
                    log::warn!("poll: write to {} failed: {}", device, e);
                    writeln!(out, "Error {}: {}", device, e)?;
                }
            }
        }
        Ok(triggered)
    }

    /// Sleeps in slices so an interrupt is noticed quickly. Returns `false`
    /// when interrupted.
    fn sleep_interruptible(&mut self, total: Duration) -> bool {
        let mut remaining = total;
        while !remaining.is_zero() {
            if self.interrupt.is_requested() {
                return false;
            }
            let step = remaining.min(SLEEP_SLICE);
            self.host.pause(step);
            remaining -= step;
        }
        !self.interrupt.is_requested()
    }

    fn collect_reading<W: Write>(
        &mut self,
        device: &Device,
        snapshot: &mut Snapshot,
        out: &mut W,
    ) -> io::Result<()> {
        let response = match self.host.read(device.address, device.timeouts.short) {
            Ok(response) => response,
            Err(e) => {
                log::warn!("poll: read from {} failed: {}", device, e);
                return writeln!(out, "Error {}: {}", device, e);
            }
        };
        if !response.is_success() {
            return writeln!(out, "Error {}: {}", device, response.code);
        }

        match parse_reading(&response.payload) {
            Ok(value) => {
                if device.is_module("ORP") {
                    snapshot.orp = Some(value);
                } else if device.is_module("pH") {
                    snapshot.ph = Some(value);
                }
                writeln!(out, "Success {}: {}", device, response.payload)
            }
            Err(e) => {
                log::warn!("poll: {} sent {:?}", device, response.payload);
                writeln!(out, "Error {}: {}", device, e)
            }
        }
    }

    fn collect_ambient<W: Write>(
        &mut self,
        snapshot: &mut Snapshot,
        out: &mut W,
    ) -> io::Result<()> {
        let Some(sensor) = self.ambient.as_mut() else {
            return Ok(());
        };
        match sensor.measure() {
            Ok(reading) => {
                snapshot.set_ambient(&reading);
                writeln!(out, "Success CO2 : {:.1} ppm", reading.co2_ppm)?;
                writeln!(out, "Success Temperature : {:.2} °C", reading.temperature_c)?;
                writeln!(out, "Success Humidity : {:.2} % rel", reading.humidity_pct)
            }
            Err(e) => {
                log::warn!("poll: ambient sensor: {}", e);
                writeln!(out, "Error SCD30: {}", e)
            }
        }
    }

    fn publish<W: Write>(&mut self, snapshot: &Snapshot, out: &mut W) -> io::Result<()> {
        let Some(publisher) = self.publisher.as_mut() else {
            return Ok(());
        };
        if let Err(e) = publisher.publish(snapshot) {
            log::warn!("poll: upload failed: {}", e);
            writeln!(out, "Upload failed: {}", e)?;
        }
        Ok(())
    }
}
