//! Partitioning and cluster assignment for the Tessera mapping backend.
//!
//! This crate splits oversized vertices into slices that fit one core
//! ([`partition`]) and, once an external placer has put the slices on chips,
//! labels the instances of each partitioned vertex so their packets can be
//! told apart ([`identify_clusters`]).
//!
//! # Pipeline
//!
//! 1. **Partition**: [`partition_vertex`] cuts each vertex into slices and
//!    records them as one group
//! 2. **Place**: external; produces `HashMap<SliceId, Location>`
//! 3. **Cluster**: [`identify_clusters`] assigns cluster ids and writes them
//!    into the routing keys of the slices' nets
//!
//! # Usage
//!
//! ```ignore
//! use tessera_pnr::{identify_clusters, partition_vertex, Constraint, ConstraintSet};
//!
//! let constraints = ConstraintSet::new().with(Constraint::new(64.0)?, |r| r.len() as f64);
//! partition_vertex(&mut netlist, ensemble, &constraints, &sink)?;
//! let placements = placer.place(&netlist);
//! let groups = netlist.groups.clone();
//! identify_clusters(&mut netlist, &placements, &groups, &sink)?;
//! ```

#![warn(missing_docs)]

pub mod cluster;
pub mod data;
pub mod ids;
pub mod partition;

pub use cluster::{identify_clusters, ClusterError, ClusterReport};
pub use data::{Net, Netlist, Vertex, VertexSlice};
pub use ids::{NetId, SliceId, VertexId};
pub use partition::{
    partition, partition_all, Constraint, ConstraintError, ConstraintSet, Partition,
    PartitionError, UsageFn,
};

use tessera_diagnostics::{Category, Diagnostic, DiagnosticCode, DiagnosticSink};
use tracing::debug;

/// Error: a vertex cannot be partitioned under its constraints.
pub const E_UNPARTITIONABLE: DiagnosticCode = DiagnosticCode::new(Category::Error, 301);

/// Partitions a vertex's atoms into slices and records them as one group.
///
/// Returns the new slices in atom order. On failure nothing is added to the
/// netlist, an `E301` diagnostic naming the vertex is emitted, and the
/// partition error is returned.
pub fn partition_vertex(
    netlist: &mut Netlist,
    vertex: VertexId,
    constraints: &ConstraintSet<'_>,
    sink: &DiagnosticSink,
) -> Result<Vec<SliceId>, PartitionError> {
    let atoms = netlist.vertex(vertex).atoms();
    let chunks = match partition_all(atoms, constraints) {
        Ok(chunks) => chunks,
        Err(err) => {
            let PartitionError::Unpartitionable {
                constraint,
                position,
            } = &err;
            sink.emit(
                Diagnostic::error(E_UNPARTITIONABLE, "vertex cannot be partitioned")
                    .with_subject(format!("vertex `{}`", netlist.vertex(vertex).name))
                    .with_note(format!(
                        "a chunk holding only atom {position} exceeds constraint {constraint}"
                    ))
                    .with_help("reduce the vertex size or raise the constraint target"),
            );
            return Err(err);
        }
    };

    let slices: Vec<SliceId> = chunks
        .into_iter()
        .map(|atoms| netlist.add_slice(vertex, atoms))
        .collect();
    debug!(
        vertex = %netlist.vertex(vertex).name,
        slices = slices.len(),
        "partitioned vertex"
    );
    netlist.add_group(slices.clone());
    Ok(slices)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::ops::Range;
    use tessera_keyspace::{KeyFormat, RoutingKey, CLUSTER_FIELD};

    fn len(r: &Range<u32>) -> f64 {
        (r.end - r.start) as f64
    }

    #[test]
    fn partition_vertex_creates_group() {
        let mut nl = Netlist::new();
        let v = nl.add_vertex("ens", 100);
        let constraints = ConstraintSet::new()
            .with(Constraint::with_target(100.0, 0.7).unwrap(), |r| len(r) + 10.0)
            .with(Constraint::new(50.0).unwrap(), len);
        let sink = DiagnosticSink::new();

        let slices = partition_vertex(&mut nl, v, &constraints, &sink).unwrap();

        assert_eq!(slices.len(), 2);
        assert_eq!(nl.slice(slices[0]).atoms, 0..50);
        assert_eq!(nl.slice(slices[1]).atoms, 50..100);
        assert_eq!(nl.groups, vec![slices]);
        assert!(!sink.has_errors());
    }

    #[test]
    fn partition_vertex_reports_failure() {
        let mut nl = Netlist::new();
        let v = nl.add_vertex("big", 10);
        let constraints = ConstraintSet::new()
            .with(Constraint::new(50.0).unwrap().named("dtcm"), |r| len(r) + 100.0);
        let sink = DiagnosticSink::new();

        let err = partition_vertex(&mut nl, v, &constraints, &sink).unwrap_err();

        assert!(matches!(err, PartitionError::Unpartitionable { position: 0, .. }));
        assert_eq!(nl.slice_count(), 0);
        assert!(nl.groups.is_empty());
        let diags = sink.diagnostics();
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].code, E_UNPARTITIONABLE);
        assert_eq!(diags[0].subject.as_deref(), Some("vertex `big`"));
        assert!(diags[0].notes[0].contains("`dtcm`"));
    }

    #[test]
    fn partition_then_cluster() {
        let mut nl = Netlist::new();
        let pre = nl.add_vertex("pre", 40);
        let constraints = ConstraintSet::new().with(Constraint::new(10.0).unwrap(), len);
        let sink = DiagnosticSink::new();
        let slices = partition_vertex(&mut nl, pre, &constraints, &sink).unwrap();
        assert_eq!(slices.len(), 4);

        let nets: Vec<_> = slices
            .iter()
            .map(|&s| nl.add_net(s, vec![], 1, RoutingKey::new(KeyFormat::standard())))
            .collect();

        // Two slices per chip.
        let placements: HashMap<_, _> = slices
            .iter()
            .enumerate()
            .map(|(i, &s)| (s, (i as u32 / 2, 0u32)))
            .collect();
        let groups = nl.groups.clone();
        identify_clusters(&mut nl, &placements, &groups, &sink).unwrap();

        let written: Vec<u32> = nets
            .iter()
            .map(|&n| nl.net(n).key.get_field(CLUSTER_FIELD).unwrap())
            .collect();
        assert_eq!(written, vec![0, 0, 1, 1]);
    }
}
