// src/common/error.rs

use super::command::CommandTooLong;
use super::response::ResponseParseError;

/// Errors from talking to an EZO circuit, generic over the bus error `E`.
#[derive(Debug, thiserror::Error)]
pub enum EzoError<E = ()>
where
    E: core::fmt::Debug,
{
    /// Underlying I2C error from the HAL implementation.
    #[error("I/O error: {0:?}")]
    Io(E),

    /// The circuit kept answering "still processing" past the retry window.
    #[error("operation timed out")]
    Timeout,

    #[error(transparent)]
    CommandTooLong(#[from] CommandTooLong),

    #[error(transparent)]
    Response(#[from] ResponseParseError),
}

impl<E: core::fmt::Debug> EzoError<E> {
    /// True for bus-level failures, as opposed to protocol or parse errors.
    pub fn is_io(&self) -> bool {
        matches!(self, EzoError::Io(_))
    }
}
