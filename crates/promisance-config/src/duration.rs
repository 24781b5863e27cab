//! Human-readable durations ("7d", "30m", "1h 30m").

use crate::error::ConfigError;

/// Parse a humantime duration into a `chrono::Duration`.
///
/// `field` names the setting in error messages.
pub fn parse_duration(field: &str, value: &str) -> Result<chrono::Duration, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidDuration {
        field: field.to_string(),
        value: value.to_string(),
        reason,
    };
    let std = humantime::parse_duration(value.trim()).map_err(|e| invalid(e.to_string()))?;
    chrono::Duration::from_std(std).map_err(|e| invalid(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_common_forms() {
        assert_eq!(parse_duration("ttl", "7d").unwrap(), chrono::Duration::days(7));
        assert_eq!(parse_duration("ttl", "30m").unwrap(), chrono::Duration::minutes(30));
        assert_eq!(
            parse_duration("ttl", " 1h 30m ").unwrap(),
            chrono::Duration::minutes(90)
        );
    }

    #[test]
    fn test_error_names_the_field() {
        let err = parse_duration("jot.token_ttl", "soon").unwrap_err();
        assert!(err.to_string().contains("jot.token_ttl"));
        assert!(err.to_string().contains("soon"));
    }
}
