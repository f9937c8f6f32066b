//! The filter table and its builder.

use crate::error::{FilterError, RegionError};
use crate::filters::Filter;
use crate::reception::ReceptionSpec;
use crate::routing_region::FilterRoutingRegion;
use crate::{count_word, words_to_bytes, Region, WORD_BYTES};
use serde::{Deserialize, Serialize};
use tessera_diagnostics::{Category, Diagnostic, DiagnosticCode, DiagnosticSink};
use tessera_keyspace::{FILTER_ROUTING_TAG, INDEX_FIELD};
use tracing::debug;

/// Error: a linear filter keeps a direct feed-through term after
/// discretization.
pub const E_NOT_STRICTLY_PROPER: DiagnosticCode = DiagnosticCode::new(Category::Error, 401);

/// Error: a filter's parameters or the timestep are invalid.
pub const E_INVALID_FILTER: DiagnosticCode = DiagnosticCode::new(Category::Error, 402);

/// Options controlling how filter regions are built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterRegionOptions {
    /// Share one table entry between equal filters.
    pub minimise: bool,
    /// Overrides the width of every filter.
    pub width: Option<u32>,
    /// Key tag selecting the bits matched by the routing entries.
    pub filter_routing_tag: String,
    /// Key field carrying the value index within a packet.
    pub index_field: String,
}

impl Default for FilterRegionOptions {
    fn default() -> Self {
        Self {
            minimise: false,
            width: None,
            filter_routing_tag: FILTER_ROUTING_TAG.to_string(),
            index_field: INDEX_FIELD.to_string(),
        }
    }
}

/// The ordered filter table of one core.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterRegion {
    /// Filters in table order.
    pub filters: Vec<Filter>,
    /// Simulation timestep in seconds.
    pub dt: f64,
}

impl FilterRegion {
    /// Creates a filter region.
    pub fn new(filters: Vec<Filter>, dt: f64) -> Self {
        Self { filters, dt }
    }

    /// Number of filters in the table.
    pub fn len(&self) -> usize {
        self.filters.len()
    }

    /// Returns whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }
}

impl Region for FilterRegion {
    fn size_bytes(&self) -> usize {
        let words: usize = self.filters.iter().map(Filter::size_words).sum();
        WORD_BYTES * (1 + words)
    }

    fn encode(&self) -> Result<Vec<u8>, RegionError> {
        let mut words = Vec::with_capacity(self.size_bytes() / WORD_BYTES);
        words.push(count_word("filter count", self.filters.len())?);
        for (index, filter) in self.filters.iter().enumerate() {
            filter
                .pack_into(self.dt, &mut words)
                .map_err(|source| RegionError::Filter { index, source })?;
        }
        Ok(words_to_bytes(&words))
    }
}

/// Builds the filter table and routing table for a set of received signals.
///
/// Each signal gets one routing entry, in input order. With
/// `options.minimise` a signal whose filter equals one already in the table
/// reuses that entry; otherwise every signal appends a new filter.
pub fn make_filter_regions(
    specs: &[ReceptionSpec],
    dt: f64,
    options: &FilterRegionOptions,
) -> (FilterRegion, FilterRoutingRegion) {
    let mut filters: Vec<Filter> = Vec::new();
    let mut routes = Vec::with_capacity(specs.len());

    for (signal, params) in specs {
        let filter = Filter::new(
            options.width.unwrap_or(params.width),
            signal.latching,
            params.filter.clone(),
        );

        let existing = if options.minimise {
            filters.iter().position(|f| *f == filter)
        } else {
            None
        };
        let index = existing.unwrap_or_else(|| {
            filters.push(filter);
            filters.len() - 1
        });
        routes.push((signal.key.clone(), index));
    }

    debug!(
        signals = specs.len(),
        filters = filters.len(),
        minimise = options.minimise,
        "built filter table"
    );

    (
        FilterRegion::new(filters, dt),
        FilterRoutingRegion::new(
            routes,
            options.filter_routing_tag.clone(),
            options.index_field.clone(),
        ),
    )
}

/// The two encoded regions for one core.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedFilterRegions {
    /// The filter table.
    pub filter_region: FilterRegion,
    /// The routing table.
    pub routing_region: FilterRoutingRegion,
    /// Encoded filter table bytes.
    pub filter_bytes: Vec<u8>,
    /// Encoded routing table bytes.
    pub routing_bytes: Vec<u8>,
}

/// Builds and encodes the filter and routing regions, reporting filter
/// failures to `sink`.
pub fn encode_filter_regions(
    specs: &[ReceptionSpec],
    dt: f64,
    options: &FilterRegionOptions,
    sink: &DiagnosticSink,
) -> Result<EncodedFilterRegions, RegionError> {
    let (filter_region, routing_region) = make_filter_regions(specs, dt, options);

    let filter_bytes = match filter_region.encode() {
        Ok(bytes) => bytes,
        Err(err) => {
            if let RegionError::Filter { index, source } = &err {
                sink.emit(filter_diagnostic(&filter_region.filters[*index], *index, source));
            }
            return Err(err);
        }
    };
    let routing_bytes = routing_region.encode()?;

    debug!(
        filter_bytes = filter_bytes.len(),
        routing_bytes = routing_bytes.len(),
        "encoded filter regions"
    );
    Ok(EncodedFilterRegions {
        filter_region,
        routing_region,
        filter_bytes,
        routing_bytes,
    })
}

fn filter_diagnostic(filter: &Filter, index: usize, err: &FilterError) -> Diagnostic {
    let subject = format!("filter {index} (method {})", filter.kind.method_index());
    match err {
        FilterError::NotStrictlyProper { .. } => Diagnostic::error(
            E_NOT_STRICTLY_PROPER,
            "linear filter is not strictly proper after discretization",
        )
        .with_subject(subject)
        .with_note(err.to_string())
        .with_help("the numerator must have lower order than the denominator"),
        _ => Diagnostic::error(E_INVALID_FILTER, "invalid filter parameters")
            .with_subject(subject)
            .with_note(err.to_string()),
    }
}
