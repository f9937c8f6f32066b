//! Routing keys for the accelerator's packet interconnect.
//!
//! A [`KeyFormat`] declares named bit fields inside a 32-bit key, each field
//! carrying zero or more tags. A [`RoutingKey`] is one value of a format: it
//! holds a value per declared field and produces key/mask pairs either for a
//! whole tag (e.g. every field the router looks at) or for a single field.
//!
//! Formats are immutable and shared through `Arc`; keys are owned, mutable
//! values carried by nets and signals through the mapping pipeline.

#![warn(missing_docs)]

pub mod error;
pub mod format;
pub mod key;

pub use error::KeyspaceError;
pub use format::{KeyField, KeyFormat, KeyFormatBuilder};
pub use key::RoutingKey;

/// Tag carried by fields the on-chip router matches on.
pub const ROUTING_TAG: &str = "routing";

/// Tag carried by fields a receiving core matches on to select a filter.
pub const FILTER_ROUTING_TAG: &str = "filter_routing";

/// Field holding the cluster id of the emitting instance.
pub const CLUSTER_FIELD: &str = "cluster";

/// Field holding the component index within a packet stream.
pub const INDEX_FIELD: &str = "index";
