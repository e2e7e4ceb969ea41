//! Command line classifier.
//!
//! Keywords are matched case-insensitively as prefixes, so `list devices`
//! still lists. Anything that is not a keyword goes to a device.

use core::time::Duration;

use crate::common::address::{AddressError, EzoAddr};

/// A classified line of user input.
#[derive(Debug, Clone, PartialEq)]
pub enum ShellCommand<'a> {
    Empty,
    List,
    Help,
    CalInfo,
    Exit,
    /// `POLL[,seconds]`
    Poll { interval: Option<Duration> },
    /// `ALL:<command>`
    All { command: &'a str },
    /// `<address>:<command>`
    Addressed { address: EzoAddr, command: &'a str },
    /// Sent to the active device as is.
    Passthrough(&'a str),
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParseError {
    #[error(transparent)]
    InvalidAddress(#[from] AddressError),
    #[error("invalid polling time: '{0}'")]
    InvalidInterval(String),
}

/// Classifies one line of input.
pub fn parse_line(line: &str) -> Result<ShellCommand<'_>, ParseError> {
    let line = line.trim();
    let upper = line.to_ascii_uppercase();

    if line.is_empty() {
        return Ok(ShellCommand::Empty);
    }
    if upper.starts_with("LIST") {
        return Ok(ShellCommand::List);
    }
    if upper.starts_with("HELP") {
        return Ok(ShellCommand::Help);
    }
    if upper.starts_with("CALINFO") {
        return Ok(ShellCommand::CalInfo);
    }
    if upper == "EXIT" || upper == "QUIT" {
        return Ok(ShellCommand::Exit);
    }
    if upper.starts_with("POLL") {
        return parse_poll(line);
    }
    if upper.starts_with("ALL:") {
        return Ok(ShellCommand::All {
            command: line["ALL:".len()..].trim(),
        });
    }

    match line.split_once(':') {
        Some((address, command)) => Ok(ShellCommand::Addressed {
            address: address.parse()?,
            command: command.trim(),
        }),
        None => Ok(ShellCommand::Passthrough(line)),
    }
}

fn parse_poll(line: &str) -> Result<ShellCommand<'_>, ParseError> {
    let interval = match line.split(',').nth(1).map(str::trim) {
        None => None,
        Some(text) => {
            let invalid = || ParseError::InvalidInterval(text.to_string());
            let secs: f32 = text.parse().map_err(|_| invalid())?;
            Some(Duration::try_from_secs_f32(secs).map_err(|_| invalid())?)
        }
    };
    Ok(ShellCommand::Poll { interval })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(raw: u8) -> EzoAddr {
        EzoAddr::new(raw).unwrap()
    }

    #[test]
    fn test_keywords_case_insensitive() {
        assert_eq!(parse_line("list"), Ok(ShellCommand::List));
        assert_eq!(parse_line("  LIST devices "), Ok(ShellCommand::List));
        assert_eq!(parse_line("Help"), Ok(ShellCommand::Help));
        assert_eq!(parse_line("calinfo"), Ok(ShellCommand::CalInfo));
        assert_eq!(parse_line("exit"), Ok(ShellCommand::Exit));
        assert_eq!(parse_line("QUIT"), Ok(ShellCommand::Exit));
        assert_eq!(parse_line(""), Ok(ShellCommand::Empty));
        assert_eq!(parse_line("   "), Ok(ShellCommand::Empty));
    }

    #[test]
    fn test_poll() {
        assert_eq!(parse_line("poll"), Ok(ShellCommand::Poll { interval: None }));
        assert_eq!(
            parse_line("POLL,5.5"),
            Ok(ShellCommand::Poll {
                interval: Some(Duration::from_millis(5500))
            })
        );
        assert_eq!(
            parse_line("poll, 2 "),
            Ok(ShellCommand::Poll {
                interval: Some(Duration::from_secs(2))
            })
        );
        assert_eq!(
            parse_line("poll,fast"),
            Err(ParseError::InvalidInterval("fast".to_string()))
        );
        assert!(parse_line("poll,-1").is_err());
        assert!(parse_line("poll,inf").is_err());
    }

    #[test]
    fn test_all() {
        assert_eq!(parse_line("all:R"), Ok(ShellCommand::All { command: "R" }));
        assert_eq!(
            parse_line("ALL: sleep"),
            Ok(ShellCommand::All { command: "sleep" })
        );
    }

    #[test]
    fn test_addressed() {
        assert_eq!(
            parse_line("99:cal,mid,7.00"),
            Ok(ShellCommand::Addressed {
                address: addr(99),
                command: "cal,mid,7.00"
            })
        );
        assert_eq!(
            parse_line("102: status"),
            Ok(ShellCommand::Addressed {
                address: addr(102),
                command: "status"
            })
        );
    }

    #[test]
    fn test_addressed_bad_address() {
        assert_eq!(
            parse_line("ph:R"),
            Err(ParseError::InvalidAddress(AddressError::Invalid("ph".to_string())))
        );
        assert_eq!(
            parse_line("200:R"),
            Err(ParseError::InvalidAddress(AddressError::OutOfRange(200)))
        );
    }

    #[test]
    fn test_passthrough() {
        assert_eq!(parse_line("R"), Ok(ShellCommand::Passthrough("R")));
        assert_eq!(
            parse_line(" Cal,clear "),
            Ok(ShellCommand::Passthrough("Cal,clear"))
        );
    }
}
