//! Configuration types deserialized from `tessera.toml`.

use serde::Deserialize;
use std::sync::Arc;
use tessera_keyspace::{KeyField, KeyFormat, KeyspaceError, FILTER_ROUTING_TAG, INDEX_FIELD};
use tessera_pnr::{Constraint, ConstraintError};
use tessera_regions::FilterRegionOptions;

/// The top-level mapping configuration parsed from `tessera.toml`.
///
/// Every section is optional.
#[derive(Debug, Default, Deserialize)]
pub struct TesseraConfig {
    /// Partitioning defaults.
    #[serde(default)]
    pub partition: PartitionConfig,
    /// Filter and filter-routing region settings.
    #[serde(default)]
    pub filters: FiltersConfig,
    /// Routing-key layout.
    #[serde(default)]
    pub keyspace: KeyspaceConfig,
}

/// Partitioning defaults.
#[derive(Debug, Deserialize)]
pub struct PartitionConfig {
    /// Fraction of each resource maximum that partitions may use.
    #[serde(default = "default_target")]
    pub target: f64,
}

fn default_target() -> f64 {
    1.0
}

impl Default for PartitionConfig {
    fn default() -> Self {
        Self {
            target: default_target(),
        }
    }
}

impl PartitionConfig {
    /// Creates a constraint on a resource of the given size using the
    /// configured target.
    pub fn constraint(&self, maximum: f64) -> Result<Constraint, ConstraintError> {
        Constraint::with_target(maximum, self.target)
    }
}

/// Filter region settings.
#[derive(Debug, Deserialize)]
pub struct FiltersConfig {
    /// Simulation timestep in seconds.
    #[serde(default = "default_dt")]
    pub dt: f64,
    /// Merge equal filters into one table entry.
    #[serde(default)]
    pub minimise: bool,
    /// Forces the width of every filter.
    #[serde(default)]
    pub width: Option<u32>,
    /// Key tag matched by filter routing entries.
    #[serde(default = "default_filter_routing_tag")]
    pub filter_routing_tag: String,
    /// Key field holding the value index.
    #[serde(default = "default_index_field")]
    pub index_field: String,
}

fn default_dt() -> f64 {
    0.001
}

fn default_filter_routing_tag() -> String {
    FILTER_ROUTING_TAG.to_string()
}

fn default_index_field() -> String {
    INDEX_FIELD.to_string()
}

impl Default for FiltersConfig {
    fn default() -> Self {
        Self {
            dt: default_dt(),
            minimise: false,
            width: None,
            filter_routing_tag: default_filter_routing_tag(),
            index_field: default_index_field(),
        }
    }
}

impl FiltersConfig {
    /// The region builder options described by this section.
    pub fn options(&self) -> FilterRegionOptions {
        FilterRegionOptions {
            minimise: self.minimise,
            width: self.width,
            filter_routing_tag: self.filter_routing_tag.clone(),
            index_field: self.index_field.clone(),
        }
    }
}

/// Routing-key layout. With no fields the standard layout is used.
#[derive(Debug, Deserialize)]
pub struct KeyspaceConfig {
    /// Name of the key format.
    #[serde(default = "default_keyspace_name")]
    pub name: String,
    /// Declared fields.
    #[serde(default)]
    pub fields: Vec<KeyField>,
}

fn default_keyspace_name() -> String {
    "nengo".to_string()
}

impl Default for KeyspaceConfig {
    fn default() -> Self {
        Self {
            name: default_keyspace_name(),
            fields: Vec::new(),
        }
    }
}

impl KeyspaceConfig {
    /// Builds the configured key format.
    pub fn build(&self) -> Result<Arc<KeyFormat>, KeyspaceError> {
        if self.fields.is_empty() {
            return Ok(KeyFormat::standard());
        }
        self.fields
            .iter()
            .cloned()
            .fold(KeyFormat::builder(self.name.clone()), |builder, field| {
                builder.with_field(field)
            })
            .build()
    }
}
