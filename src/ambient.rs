//! Ambient sensor port: CO2, temperature and humidity next to the probes.

use core::fmt;

/// One ambient measurement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AmbientReading {
    /// CO2 concentration in ppm.
    pub co2_ppm: f32,
    /// Temperature in degrees Celsius.
    pub temperature_c: f32,
    /// Relative humidity in percent.
    pub humidity_pct: f32,
}

/// Port for reading the ambient sensor, so the poll loop does not depend on
/// a specific driver.
pub trait AmbientSensor {
    type Error: fmt::Display;

    /// Latest available measurement.
    fn measure(&mut self) -> Result<AmbientReading, Self::Error>;
}
