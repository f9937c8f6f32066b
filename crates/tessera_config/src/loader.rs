//! Configuration file loading and validation.

use crate::error::ConfigError;
use crate::types::TesseraConfig;
use std::path::Path;

/// Name of the configuration file inside a project directory.
pub const CONFIG_FILE: &str = "tessera.toml";

/// Loads and validates a `tessera.toml` configuration from a project directory.
///
/// Reads `<project_dir>/tessera.toml`, parses it, and validates its values.
pub fn load_config(project_dir: &Path) -> Result<TesseraConfig, ConfigError> {
    let config_path = project_dir.join(CONFIG_FILE);
    let content = std::fs::read_to_string(&config_path)?;
    load_config_from_str(&content)
}

/// Parses and validates a `tessera.toml` configuration from a string.
///
/// Useful for testing without filesystem dependencies.
pub fn load_config_from_str(content: &str) -> Result<TesseraConfig, ConfigError> {
    let config: TesseraConfig =
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
    validate_config(&config)?;
    Ok(config)
}

/// Validates value ranges and the consistency of the keyspace with the
/// filter settings.
fn validate_config(config: &TesseraConfig) -> Result<(), ConfigError> {
    let target = config.partition.target;
    if !(target > 0.0 && target <= 1.0) {
        return Err(ConfigError::ValidationError(format!(
            "partition.target must be in (0, 1], got {target}"
        )));
    }

    let filters = &config.filters;
    if !(filters.dt.is_finite() && filters.dt > 0.0) {
        return Err(ConfigError::ValidationError(format!(
            "filters.dt must be positive, got {}",
            filters.dt
        )));
    }
    if filters.width == Some(0) {
        return Err(ConfigError::ValidationError(
            "filters.width must be at least 1".to_string(),
        ));
    }
    if filters.filter_routing_tag.is_empty() {
        return Err(ConfigError::ValidationError(
            "filters.filter_routing_tag must not be empty".to_string(),
        ));
    }
    if filters.index_field.is_empty() {
        return Err(ConfigError::ValidationError(
            "filters.index_field must not be empty".to_string(),
        ));
    }

    let format = config
        .keyspace
        .build()
        .map_err(|e| ConfigError::ValidationError(format!("keyspace: {e}")))?;
    if !format.has_field(&filters.index_field) {
        return Err(ConfigError::ValidationError(format!(
            "keyspace `{}` does not declare index field `{}`",
            format.name(),
            filters.index_field
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn parse_empty_config() {
        let config = load_config_from_str("").unwrap();
        assert_eq!(config.partition.target, 1.0);
        assert_eq!(config.filters.dt, 0.001);
        assert!(!config.filters.minimise);
        assert_eq!(config.filters.width, None);
        assert_eq!(config.filters.filter_routing_tag, "filter_routing");
        assert_eq!(config.filters.index_field, "index");
        assert_eq!(config.keyspace.name, "nengo");
        assert!(config.keyspace.fields.is_empty());
    }

    #[test]
    fn parse_full_config() {
        let toml = r#"
[partition]
target = 0.9

[filters]
dt = 0.0005
minimise = true
width = 16
filter_routing_tag = "filter_routing"
index_field = "index"

[keyspace]
name = "custom"

[[keyspace.fields]]
name = "object"
offset = 24
length = 8
tags = ["routing", "filter_routing"]

[[keyspace.fields]]
name = "cluster"
offset = 16
length = 8
tags = ["routing", "filter_routing"]

[[keyspace.fields]]
name = "index"
offset = 0
length = 16
"#;
        let config = load_config_from_str(toml).unwrap();
        assert_eq!(config.partition.target, 0.9);
        assert_eq!(config.filters.dt, 0.0005);
        assert!(config.filters.minimise);
        assert_eq!(config.filters.width, Some(16));
        assert_eq!(config.keyspace.fields.len(), 3);

        let format = config.keyspace.build().unwrap();
        assert_eq!(format.name(), "custom");
        assert_eq!(format.mask_for_tag("filter_routing"), 0xffff_0000);
        assert!(format.field("index").unwrap().tags.is_empty());

        let options = config.filters.options();
        assert!(options.minimise);
        assert_eq!(options.width, Some(16));
    }

    #[test]
    fn invalid_toml_errors() {
        let err = load_config_from_str("this is not valid toml {{{}}}").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn bad_values_rejected() {
        for toml in [
            "[partition]\ntarget = 0.0",
            "[partition]\ntarget = 1.5",
            "[filters]\ndt = 0.0",
            "[filters]\ndt = -0.001",
            "[filters]\nwidth = 0",
            "[filters]\nfilter_routing_tag = \"\"",
            "[filters]\nindex_field = \"\"",
        ] {
            let err = load_config_from_str(toml).unwrap_err();
            assert!(matches!(err, ConfigError::ValidationError(_)), "{toml}");
        }
    }

    #[test]
    fn overlapping_fields_rejected() {
        let toml = r#"
[[keyspace.fields]]
name = "a"
offset = 0
length = 8

[[keyspace.fields]]
name = "index"
offset = 4
length = 8
"#;
        let err = load_config_from_str(toml).unwrap_err();
        match err {
            ConfigError::ValidationError(msg) => assert!(msg.starts_with("keyspace:")),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn field_at_end_of_u32_range_rejected() {
        let toml = r#"
[[keyspace.fields]]
name = "index"
offset = 4294967295
length = 1
"#;
        let err = load_config_from_str(toml).unwrap_err();
        match err {
            ConfigError::ValidationError(msg) => {
                assert!(msg.contains("4294967295..4294967296"), "{msg}")
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn index_field_must_exist() {
        let toml = r#"
[[keyspace.fields]]
name = "object"
offset = 0
length = 8
"#;
        let err = load_config_from_str(toml).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn load_from_directory() {
        let dir = tempfile::tempdir().unwrap();
        let mut file = std::fs::File::create(dir.path().join(CONFIG_FILE)).unwrap();
        writeln!(file, "[filters]\nminimise = true").unwrap();

        let config = load_config(dir.path()).unwrap();
        assert!(config.filters.minimise);
    }

    #[test]
    fn io_error_from_nonexistent_dir() {
        let err = load_config(Path::new("/nonexistent/dir")).unwrap_err();
        assert!(matches!(err, ConfigError::IoError(_)));
    }
}
