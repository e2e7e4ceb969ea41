// src/common/response/mod.rs

mod error;
pub mod parse;

pub use error::ResponseParseError;
pub use parse::{parse_device_info, parse_name, parse_reading, DeviceInfo};

use core::fmt;

/// Number of bytes requested on every EZO read: status code plus up to 30 characters.
pub const RESPONSE_LEN: usize = 31;

/// Status byte leading every EZO I2C response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseCode {
    /// 1: command processed, payload follows.
    Success,
    /// 2: the circuit did not understand the command.
    SyntaxError,
    /// 254: still processing, read again later.
    Pending,
    /// 255: nothing to send.
    NoData,
    Unknown(u8),
}

impl ResponseCode {
    pub const fn code(self) -> u8 {
        match self {
            ResponseCode::Success => 1,
            ResponseCode::SyntaxError => 2,
            ResponseCode::Pending => 254,
            ResponseCode::NoData => 255,
            ResponseCode::Unknown(code) => code,
        }
    }
}

impl From<u8> for ResponseCode {
    fn from(value: u8) -> Self {
        match value {
            1 => ResponseCode::Success,
            2 => ResponseCode::SyntaxError,
            254 => ResponseCode::Pending,
            255 => ResponseCode::NoData,
            other => ResponseCode::Unknown(other),
        }
    }
}

impl fmt::Display for ResponseCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ResponseCode::Success => "success",
            ResponseCode::SyntaxError => "syntax error",
            ResponseCode::Pending => "still processing",
            ResponseCode::NoData => "no data",
            ResponseCode::Unknown(_) => "unknown",
        };
        write!(f, "{} ({})", self.code(), label)
    }
}

/// A decoded EZO response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub code: ResponseCode,
    /// Text after the status byte. Only meaningful when `code` is `Success`.
    pub payload: String,
}

impl Response {
    /// Decodes a raw read buffer.
    ///
    /// NUL padding is dropped and bit 7 of every payload byte is cleared;
    /// the Raspberry Pi I2C controller sets it on clock-stretched reads.
    pub fn parse(raw: &[u8]) -> Result<Self, ResponseParseError> {
        let (&status, rest) = raw.split_first().ok_or(ResponseParseError::EmptyInput)?;
        let payload = rest
            .iter()
            .filter(|&&b| b != 0)
            .map(|&b| (b & 0x7F) as char)
            .collect();
        Ok(Response {
            code: ResponseCode::from(status),
            payload,
        })
    }

    pub fn is_success(&self) -> bool {
        self.code == ResponseCode::Success
    }
}
