//! Error types for configuration loading and validation.

/// Errors that can occur when loading or validating a `noc.toml`.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// An I/O error occurred while reading the configuration file.
    #[error("failed to read configuration: {0}")]
    IoError(#[from] std::io::Error),

    /// The TOML content could not be parsed.
    #[error("failed to parse configuration: {0}")]
    ParseError(String),

    /// A configuration value is out of its legal range.
    #[error("invalid value for '{field}': {reason}")]
    ValidationError {
        /// Dotted path of the offending field (e.g. `noc.swap_percentage`).
        field: String,
        /// Why the value was rejected.
        reason: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_validation_error() {
        let err = ConfigError::ValidationError {
            field: "noc.swap_percentage".to_string(),
            reason: "must be at most 100, got 140".to_string(),
        };
        assert_eq!(
            format!("{err}"),
            "invalid value for 'noc.swap_percentage': must be at most 100, got 140"
        );
    }

    #[test]
    fn display_parse_error() {
        let err = ConfigError::ParseError("expected '=' at line 3".to_string());
        assert_eq!(
            format!("{err}"),
            "failed to parse configuration: expected '=' at line 3"
        );
    }

    #[test]
    fn display_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err = ConfigError::IoError(io_err);
        assert!(format!("{err}").starts_with("failed to read configuration:"));
    }
}
