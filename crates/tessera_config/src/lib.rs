//! Parsing and validation of `tessera.toml` mapping configuration files.
//!
//! This crate reads the configuration file and produces a strongly-typed
//! [`TesseraConfig`] holding the partitioning defaults, the filter-region
//! options and the routing-key layout.

#![warn(missing_docs)]

pub mod error;
pub mod loader;
pub mod types;

pub use error::ConfigError;
pub use loader::{load_config, load_config_from_str, CONFIG_FILE};
pub use types::*;
