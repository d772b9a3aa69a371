//! Configuration file loading and validation.

use crate::error::ConfigError;
use crate::types::{NocConfig, NocOpts};
use std::path::Path;

/// Name of the configuration file looked up in a project directory.
pub const CONFIG_FILE_NAME: &str = "noc.toml";

/// Loads and validates `<project_dir>/noc.toml`.
pub fn load_config(project_dir: &Path) -> Result<NocConfig, ConfigError> {
    let content = std::fs::read_to_string(project_dir.join(CONFIG_FILE_NAME))?;
    load_config_from_str(&content)
}

/// Parses and validates a `noc.toml` from a string.
pub fn load_config_from_str(content: &str) -> Result<NocConfig, ConfigError> {
    let config: NocConfig =
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
    validate_opts(&config.noc)?;
    Ok(config)
}

fn invalid(field: &str, reason: String) -> ConfigError {
    ConfigError::ValidationError {
        field: format!("noc.{field}"),
        reason,
    }
}

fn check_weight(field: &str, value: f64) -> Result<(), ConfigError> {
    if !value.is_finite() || value < 0.0 {
        return Err(invalid(
            field,
            format!("must be a finite non-negative number, got {value}"),
        ));
    }
    Ok(())
}

/// Checks that every option is within its legal range.
fn validate_opts(opts: &NocOpts) -> Result<(), ConfigError> {
    check_weight("placement_weighting", opts.placement_weighting)?;
    check_weight(
        "aggregate_bandwidth_weighting",
        opts.aggregate_bandwidth_weighting,
    )?;
    check_weight("latency_weighting", opts.latency_weighting)?;
    check_weight(
        "latency_constraints_weighting",
        opts.latency_constraints_weighting,
    )?;

    if opts.swap_percentage > 100 {
        return Err(invalid(
            "swap_percentage",
            format!("must be at most 100, got {}", opts.swap_percentage),
        ));
    }
    if !opts.cost_tolerance.is_finite() || opts.cost_tolerance <= 0.0 {
        return Err(invalid(
            "cost_tolerance",
            format!("must be a positive number, got {}", opts.cost_tolerance),
        ));
    }
    if opts.placement_file.as_deref().is_some_and(str::is_empty) {
        return Err(invalid("placement_file", "must not be empty".to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{RoutingAlgorithm, TieBreak};

    #[test]
    fn empty_file_uses_defaults() {
        let config = load_config_from_str("").unwrap();
        assert_eq!(config.noc, NocOpts::default());
        assert_eq!(
            config.noc.routing_algorithm,
            RoutingAlgorithm::NegativeFirst
        );
        assert_eq!(config.noc.tie_break, TieBreak::Priority);
        assert!(config.noc.placement_file.is_none());
    }

    #[test]
    fn parse_full_config() {
        let toml = r#"
[noc]
routing_algorithm = "odd_even"
tie_break = "hashed"
placement_weighting = 1.0
aggregate_bandwidth_weighting = 0.5
latency_weighting = 0.1
latency_constraints_weighting = 0.9
swap_percentage = 25
cost_tolerance = 0.001
placement_file = "out.noc.place"
"#;
        let opts = load_config_from_str(toml).unwrap().noc;
        assert_eq!(opts.routing_algorithm, RoutingAlgorithm::OddEven);
        assert_eq!(opts.tie_break, TieBreak::Hashed);
        assert_eq!(opts.placement_weighting, 1.0);
        assert_eq!(opts.aggregate_bandwidth_weighting, 0.5);
        assert_eq!(opts.latency_weighting, 0.1);
        assert_eq!(opts.latency_constraints_weighting, 0.9);
        assert_eq!(opts.swap_percentage, 25);
        assert_eq!(opts.cost_tolerance, 0.001);
        assert_eq!(opts.placement_file.as_deref(), Some("out.noc.place"));
    }

    #[test]
    fn partial_table_keeps_other_defaults() {
        let opts = load_config_from_str("[noc]\nswap_percentage = 40\n")
            .unwrap()
            .noc;
        assert_eq!(opts.swap_percentage, 40);
        assert_eq!(opts.latency_weighting, NocOpts::default().latency_weighting);
    }

    #[test]
    fn swap_percentage_over_100_rejected() {
        let err = load_config_from_str("[noc]\nswap_percentage = 101\n").unwrap_err();
        match err {
            ConfigError::ValidationError { field, .. } => {
                assert_eq!(field, "noc.swap_percentage")
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn negative_weight_rejected() {
        let err = load_config_from_str("[noc]\nlatency_weighting = -0.5\n").unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError { .. }));
    }

    #[test]
    fn zero_tolerance_rejected() {
        let err = load_config_from_str("[noc]\ncost_tolerance = 0.0\n").unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError { .. }));
    }

    #[test]
    fn empty_placement_file_rejected() {
        let err = load_config_from_str("[noc]\nplacement_file = \"\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError { .. }));
    }

    #[test]
    fn invalid_toml_errors() {
        let err = load_config_from_str("this is not valid toml {{{}}}").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn load_from_project_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            "[noc]\nrouting_algorithm = \"west_first\"\n",
        )
        .unwrap();
        let config = load_config(dir.path()).unwrap();
        assert_eq!(config.noc.routing_algorithm, RoutingAlgorithm::WestFirst);
    }

    #[test]
    fn io_error_from_nonexistent_dir() {
        let err = load_config(Path::new("/nonexistent/dir")).unwrap_err();
        assert!(matches!(err, ConfigError::IoError(_)));
    }
}
