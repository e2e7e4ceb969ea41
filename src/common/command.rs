//! EZO command definitions.
//!
//! EZO circuits in I2C mode take plain ASCII commands (`R`, `i`, `Cal,mid,7.00`,
//! ...) terminated by a NUL byte. The shell passes most user input straight
//! through, so the only structure a command needs is its text and the amount
//! of time the circuit needs before its answer can be read.

use core::fmt;

use arrayvec::ArrayString;

use super::timing::CommandTimeouts;
use core::time::Duration;

/// Maximum command length accepted by the EZO I2C interface.
pub const MAX_COMMAND_LEN: usize = 31;

/// A command bounded to the EZO length limit, without the NUL terminator.
pub type CommandBuffer = ArrayString<MAX_COMMAND_LEN>;

/// Command text exceeded [`MAX_COMMAND_LEN`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("command too long: {len} bytes (max {MAX_COMMAND_LEN})")]
pub struct CommandTooLong {
    pub len: usize,
}

/// How long a circuit needs to process a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimingClass {
    /// Readings and calibration.
    Long,
    /// Everything else that answers.
    Short,
    /// `Sleep`: the circuit powers down and never answers.
    NoResponse,
}

impl TimingClass {
    /// The wait for this class, or `None` when no response should be read.
    pub fn wait(self, timeouts: &CommandTimeouts) -> Option<Duration> {
        match self {
            TimingClass::Long => Some(timeouts.long),
            TimingClass::Short => Some(timeouts.short),
            TimingClass::NoResponse => None,
        }
    }
}

/// Represents an EZO command.
///
/// The `Display` implementation produces the exact text sent on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Single reading (`R`).
    Read,
    /// Device information (`i`), answered with `?I,<module>,<firmware>`.
    Info,
    /// Name query (`name,?`), answered with `?Name,<name>`.
    NameQuery,
    /// Enter low-power sleep (`Sleep`).
    Sleep,
    /// Any other command, passed through verbatim.
    Raw(CommandBuffer),
}

impl Command {
    /// Wraps user text as a command. Surrounding whitespace is dropped.
    pub fn raw(text: &str) -> Result<Self, CommandTooLong> {
        let text = text.trim();
        CommandBuffer::from(text)
            .map(Command::Raw)
            .map_err(|_| CommandTooLong { len: text.len() })
    }

    /// Formats the command into a fixed-capacity buffer.
    pub fn format_into(&self) -> Result<CommandBuffer, CommandTooLong> {
        let text = match self {
            Command::Read => "R",
            Command::Info => "i",
            Command::NameQuery => "name,?",
            Command::Sleep => "Sleep",
            Command::Raw(buf) => return Ok(*buf),
        };
        CommandBuffer::from(text).map_err(|_| CommandTooLong { len: text.len() })
    }

    /// Classifies the command by case-insensitive prefix.
    pub fn timing_class(&self) -> TimingClass {
        match self {
            Command::Read => TimingClass::Long,
            Command::Info | Command::NameQuery => TimingClass::Short,
            Command::Sleep => TimingClass::NoResponse,
            Command::Raw(buf) => classify_text(buf.as_str()),
        }
    }
}

/// Long for `R...` and `CAL...`, no response for `SLEEP...`, short otherwise.
pub fn classify_text(text: &str) -> TimingClass {
    let upper = text.trim().to_ascii_uppercase();
    if upper.starts_with('R') || upper.starts_with("CAL") {
        TimingClass::Long
    } else if upper.starts_with("SLEEP") {
        TimingClass::NoResponse
    } else {
        TimingClass::Short
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.format_into() {
            Ok(buf) => f.write_str(buf.as_str()),
            Err(_) => Err(fmt::Error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_formatting() {
        assert_eq!(Command::Read.to_string(), "R");
        assert_eq!(Command::Info.to_string(), "i");
        assert_eq!(Command::NameQuery.to_string(), "name,?");
        assert_eq!(Command::Sleep.to_string(), "Sleep");
        assert_eq!(Command::raw("  Cal,mid,7.00 ").unwrap().to_string(), "Cal,mid,7.00");
    }

    #[test]
    fn test_raw_command_too_long() {
        let long = "X".repeat(MAX_COMMAND_LEN + 1);
        assert_eq!(Command::raw(&long), Err(CommandTooLong { len: 32 }));
        assert!(Command::raw(&"X".repeat(MAX_COMMAND_LEN)).is_ok());
    }

    #[test]
    fn test_timing_classes() {
        assert_eq!(Command::Read.timing_class(), TimingClass::Long);
        assert_eq!(Command::Info.timing_class(), TimingClass::Short);
        assert_eq!(Command::Sleep.timing_class(), TimingClass::NoResponse);
        assert_eq!(classify_text("r"), TimingClass::Long);
        assert_eq!(classify_text("cal,mid,7.00"), TimingClass::Long);
        assert_eq!(classify_text("Cal,clear"), TimingClass::Long);
        assert_eq!(classify_text("sleep"), TimingClass::NoResponse);
        assert_eq!(classify_text("Status"), TimingClass::Short);
        assert_eq!(classify_text("T,25.0"), TimingClass::Short);
    }

    #[test]
    fn test_timing_class_wait() {
        let timeouts = CommandTimeouts::default();
        assert_eq!(TimingClass::Long.wait(&timeouts), Some(timeouts.long));
        assert_eq!(TimingClass::Short.wait(&timeouts), Some(timeouts.short));
        assert_eq!(TimingClass::NoResponse.wait(&timeouts), None);
    }
}
