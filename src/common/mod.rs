// src/common/mod.rs

pub mod address;
pub mod command;
pub mod error;
pub mod response;
pub mod timing;

// From address.rs
pub use address::{AddressError, EzoAddr};

// From command.rs
pub use command::{Command, CommandTooLong, TimingClass, MAX_COMMAND_LEN};

// From error.rs
pub use error::EzoError;

// From response/mod.rs
pub use response::{
    parse_device_info, parse_name, parse_reading, DeviceInfo, Response, ResponseCode,
    ResponseParseError, RESPONSE_LEN,
};

// From timing.rs
pub use timing::CommandTimeouts;
