//! Conformance test helpers for the Tessera mapping backend.
//!
//! Provides a small pipeline that maps populations and their connections
//! through partition → place → cluster → encode and returns everything the
//! integration tests assert on.

#![warn(missing_docs)]

use std::collections::HashMap;
use tessera_config::TesseraConfig;
use tessera_diagnostics::{Diagnostic, DiagnosticSink, Severity};
use tessera_keyspace::{KeyspaceError, RoutingKey};
use tessera_pnr::{
    identify_clusters, partition_vertex, ClusterError, ClusterReport, ConstraintError,
    ConstraintSet, NetId, Netlist, PartitionError, SliceId,
};
use tessera_regions::{
    encode_filter_regions, EncodedFilterRegions, FilterKind, ReceptionParams, ReceptionSpec,
    RegionError, RegionImage, Signal,
};

/// Bytes of data memory available on one core.
pub const DTCM_BYTES: f64 = 64.0 * 1024.0;

/// Processor cycles available per simulation step on one core.
pub const CYCLES_PER_STEP: f64 = 200_000.0;

/// Key field identifying the source object of a net.
pub const OBJECT_FIELD: &str = "object";

/// Key field identifying the connection a net belongs to.
pub const CONNECTION_FIELD: &str = "connection";

/// A group of atoms with a linear resource model.
#[derive(Debug, Clone)]
pub struct PopulationSpec {
    /// Population name.
    pub name: String,
    /// Number of atoms.
    pub size: u32,
    /// Fixed data memory per slice.
    pub fixed_bytes: f64,
    /// Data memory per atom.
    pub bytes_per_atom: f64,
    /// Cycles per atom per step.
    pub cycles_per_atom: f64,
}

impl PopulationSpec {
    /// Creates a population with the default per-atom costs.
    pub fn new(name: &str, size: u32) -> Self {
        Self {
            name: name.to_string(),
            size,
            fixed_bytes: 1024.0,
            bytes_per_atom: 256.0,
            cycles_per_atom: 1000.0,
        }
    }
}

/// A filtered connection between two populations.
#[derive(Debug, Clone)]
pub struct ConnectionSpec {
    /// Index of the source population.
    pub source: usize,
    /// Index of the target population.
    pub target: usize,
    /// Synapse applied at the target.
    pub filter: FilterKind,
    /// Number of values carried.
    pub width: u32,
    /// Whether the target latches received values.
    pub latching: bool,
}

/// Errors that stop the pipeline.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// The configuration produced an invalid constraint.
    #[error(transparent)]
    Constraint(#[from] ConstraintError),
    /// A population could not be partitioned.
    #[error(transparent)]
    Partition(#[from] PartitionError),
    /// Cluster assignment failed.
    #[error(transparent)]
    Cluster(#[from] ClusterError),
    /// A routing key could not be built.
    #[error(transparent)]
    Keyspace(#[from] KeyspaceError),
    /// A region could not be encoded.
    #[error(transparent)]
    Region(#[from] RegionError),
}

/// The regions generated for one receiving slice.
#[derive(Debug)]
pub struct SliceRegions {
    /// The receiving slice.
    pub slice: SliceId,
    /// The filter and routing regions.
    pub regions: EncodedFilterRegions,
    /// The two regions laid out as one image.
    pub image: RegionImage,
}

/// Result of running the full pipeline.
#[derive(Debug)]
pub struct PipelineResult {
    /// The partitioned and clustered netlist.
    pub netlist: Netlist,
    /// Slices of each population, in population order.
    pub slices: Vec<Vec<SliceId>>,
    /// Nets of each connection, one per source slice.
    pub nets: Vec<Vec<NetId>>,
    /// Summary of cluster assignment.
    pub clusters: ClusterReport,
    /// Regions of every slice that receives at least one connection.
    pub regions: Vec<SliceRegions>,
    /// All diagnostics emitted during the pipeline.
    pub diagnostics: Vec<Diagnostic>,
}

impl PipelineResult {
    /// Number of warning-severity diagnostics.
    pub fn warning_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Warning)
            .count()
    }

    /// The regions generated for `slice`.
    pub fn regions_of(&self, slice: SliceId) -> Option<&SliceRegions> {
        self.regions.iter().find(|r| r.slice == slice)
    }
}

/// Parses a configuration for tests, panicking on invalid input.
pub fn make_config(toml_str: &str) -> TesseraConfig {
    tessera_config::load_config_from_str(toml_str).unwrap()
}

/// Runs partition → place → cluster → encode.
///
/// `place` maps each slice to a chip location. Diagnostics emitted before a
/// failure are returned in the sink passed by the caller.
pub fn run_pipeline<L, P>(
    populations: &[PopulationSpec],
    connections: &[ConnectionSpec],
    config: &TesseraConfig,
    place: P,
    sink: &DiagnosticSink,
) -> Result<PipelineResult, PipelineError>
where
    L: Eq + std::hash::Hash,
    P: Fn(&Netlist, SliceId) -> L,
{
    let format = config.keyspace.build()?;
    let mut netlist = Netlist::new();

    let mut slices = Vec::with_capacity(populations.len());
    for pop in populations {
        let vertex = netlist.add_vertex(pop.name.clone(), pop.size);
        let constraints = ConstraintSet::new()
            .with(
                config.partition.constraint(DTCM_BYTES)?.named("dtcm"),
                |r| pop.fixed_bytes + pop.bytes_per_atom * r.len() as f64,
            )
            .with(
                config.partition.constraint(CYCLES_PER_STEP)?.named("cpu"),
                |r| pop.cycles_per_atom * r.len() as f64,
            );
        slices.push(partition_vertex(&mut netlist, vertex, &constraints, sink)?);
    }

    let mut nets = Vec::with_capacity(connections.len());
    for (index, conn) in connections.iter().enumerate() {
        let mut key = RoutingKey::new(format.clone());
        if key.has_field(OBJECT_FIELD) {
            key.set_field(OBJECT_FIELD, conn.source as u32)?;
        }
        if key.has_field(CONNECTION_FIELD) {
            key.set_field(CONNECTION_FIELD, index as u32)?;
        }
        let sinks = slices[conn.target].clone();
        let conn_nets = slices[conn.source]
            .iter()
            .map(|&source| netlist.add_net(source, sinks.clone(), conn.width, key.clone()))
            .collect::<Vec<_>>();
        nets.push(conn_nets);
    }

    let placements: HashMap<SliceId, L> = slices
        .iter()
        .flatten()
        .map(|&slice| (slice, place(&netlist, slice)))
        .collect();
    let groups = netlist.groups.clone();
    let clusters = identify_clusters(&mut netlist, &placements, &groups, sink)?;

    let options = config.filters.options();
    let mut regions = Vec::new();
    for &slice in slices.iter().flatten() {
        let specs: Vec<ReceptionSpec> = connections
            .iter()
            .zip(&nets)
            .filter(|(conn, _)| slices[conn.target].contains(&slice))
            .flat_map(|(conn, conn_nets)| {
                conn_nets.iter().map(|&net| {
                    let signal = Signal {
                        key: netlist.net(net).key.clone(),
                        latching: conn.latching,
                    };
                    (signal, ReceptionParams::new(conn.filter.clone(), conn.width))
                })
            })
            .collect();
        if specs.is_empty() {
            continue;
        }

        let encoded = encode_filter_regions(&specs, config.filters.dt, &options, sink)?;
        let image = RegionImage::build(&[&encoded.filter_region, &encoded.routing_region])?;
        regions.push(SliceRegions {
            slice,
            regions: encoded,
            image,
        });
    }

    Ok(PipelineResult {
        netlist,
        slices,
        nets,
        clusters,
        regions,
        diagnostics: sink.diagnostics(),
    })
}
