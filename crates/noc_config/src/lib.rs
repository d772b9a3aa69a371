//! Parsing and validation of `noc.toml` NoC placement options.
//!
//! The options select the turn-model routing algorithm and its tie-break
//! rule, weight the cost terms, and carry the knobs the outer placer reads
//! (router swap percentage, placement file name). Every field has a default,
//! so an empty file is a valid configuration.

#![warn(missing_docs)]

pub mod error;
pub mod loader;
pub mod types;

pub use error::ConfigError;
pub use loader::{load_config, load_config_from_str, CONFIG_FILE_NAME};
pub use types::*;
