// src/lib.rs

//! Interactive shell for Atlas Scientific EZO circuits on an I2C bus, with
//! an SCD30 ambient sensor on the same bus and optional ThingSpeak upload.

pub mod ambient;
pub mod common;
pub mod config;
pub mod host;
pub mod publisher;
pub mod registry;
pub mod scd30;
pub mod shell;

// Re-export key types for convenience
pub use common::EzoAddr;
pub use common::EzoError;
pub use host::EzoHost;
pub use registry::{Device, Registry};
pub use shell::{Interrupt, Shell};
