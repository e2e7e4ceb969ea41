// src/common/response/parse.rs

use super::error::ResponseParseError;

/// Identity of an EZO circuit, from the `?I,<module>,<firmware>` answer to `i`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceInfo {
    pub module: String,
    pub firmware: String,
}

/// Parses an `i` payload. Returns `None` for anything that is not an EZO identity
/// string, which is how non-EZO devices on the bus are filtered out.
pub fn parse_device_info(payload: &str) -> Option<DeviceInfo> {
    let mut fields = payload.trim().split(',');
    let tag = fields.next()?;
    if !tag.ends_with("?I") {
        return None;
    }
    let module = fields.next()?.trim();
    if module.is_empty() {
        return None;
    }
    let firmware = fields.next().unwrap_or("").trim();
    Some(DeviceInfo {
        module: module.to_string(),
        firmware: firmware.to_string(),
    })
}

/// Parses a `name,?` payload (`?Name,<name>`). An unnamed circuit answers `?Name,`.
pub fn parse_name(payload: &str) -> Option<String> {
    let (tag, name) = payload.trim().split_once(',')?;
    if !tag.eq_ignore_ascii_case("?name") {
        return None;
    }
    Some(name.trim().to_string())
}

/// Parses the numeric reading of an `R` payload.
///
/// Multi-parameter circuits (EC, DO) answer with comma-separated values; the
/// first one is the primary reading.
pub fn parse_reading(payload: &str) -> Result<f32, ResponseParseError> {
    let first = payload.split(',').next().unwrap_or("").trim();
    first
        .parse::<f32>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| ResponseParseError::MalformedReading(payload.trim().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_info() {
        assert_eq!(
            parse_device_info("?I,pH,2.10"),
            Some(DeviceInfo { module: "pH".into(), firmware: "2.10".into() })
        );
        assert_eq!(parse_device_info("?I,ORP,2.12").unwrap().module, "ORP");
        assert_eq!(parse_device_info("?I,RTD").unwrap().firmware, "");
    }

    #[test]
    fn test_device_info_rejects_non_ezo() {
        assert_eq!(parse_device_info(""), None);
        assert_eq!(parse_device_info("7.00"), None);
        assert_eq!(parse_device_info("?I"), None);
        assert_eq!(parse_device_info("?I,,1.0"), None);
        assert_eq!(parse_device_info("?Name,tank"), None);
    }

    #[test]
    fn test_name() {
        assert_eq!(parse_name("?Name,tank_ph"), Some("tank_ph".to_string()));
        assert_eq!(parse_name("?NAME,"), Some(String::new()));
        assert_eq!(parse_name("?I,pH,2.10"), None);
        assert_eq!(parse_name("garbage"), None);
    }

    #[test]
    fn test_reading() {
        assert_eq!(parse_reading("7.00").unwrap(), 7.0);
        assert_eq!(parse_reading(" 225.4 ").unwrap(), 225.4);
        assert_eq!(parse_reading("-12.5").unwrap(), -12.5);
        assert_eq!(parse_reading("1413,691,0.68,1.000").unwrap(), 1413.0);
    }

    #[test]
    fn test_malformed_reading_is_an_error() {
        assert_eq!(
            parse_reading("*OK"),
            Err(ResponseParseError::MalformedReading("*OK".to_string()))
        );
        assert!(parse_reading("").is_err());
        assert!(parse_reading("NaN").is_err());
    }
}
