//! Signals received by a core and how each should be filtered.

use crate::filters::FilterKind;
use serde::{Deserialize, Serialize};
use tessera_keyspace::RoutingKey;

/// A stream of packets arriving at a core, identified by its routing key.
#[derive(Debug, Clone, PartialEq)]
pub struct Signal {
    /// Key and mask the packets carry.
    pub key: RoutingKey,
    /// Whether the receiver holds the last value until new packets arrive.
    pub latching: bool,
}

impl Signal {
    /// Creates a non-latching signal.
    pub fn new(key: RoutingKey) -> Self {
        Self {
            key,
            latching: false,
        }
    }

    /// Marks the signal as latching.
    pub fn latching(mut self) -> Self {
        self.latching = true;
        self
    }
}

/// Receiver-side parameters of one connection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReceptionParams {
    /// The synapse applied to the incoming values.
    pub filter: FilterKind,
    /// Number of values carried by the signal.
    pub width: u32,
}

impl ReceptionParams {
    /// Creates reception parameters.
    pub fn new(filter: FilterKind, width: u32) -> Self {
        Self { filter, width }
    }
}

/// One received signal with its reception parameters.
pub type ReceptionSpec = (Signal, ReceptionParams);
