//! Cluster assignment for partitioned vertices.
//!
//! When a vertex is split over several cores, every instance emits packets
//! for the same logical signal. Receivers tell the instances apart by a
//! cluster id carried in the routing key: within one group of slices, all
//! slices placed on the same chip share an id, and ids are allocated
//! sequentially in order of first occurrence of each location.

use crate::data::Netlist;
use crate::ids::SliceId;
use std::collections::{HashMap, HashSet};
use std::hash::Hash;
use tessera_diagnostics::{Category, Diagnostic, DiagnosticCode, DiagnosticSink};
use tessera_keyspace::{KeyspaceError, CLUSTER_FIELD};
use tracing::{debug, trace};

/// Warning: several instances of a source emit keys that cannot carry a cluster id.
pub const W_NO_CLUSTER_FIELD: DiagnosticCode = DiagnosticCode::new(Category::Warning, 302);

/// Errors raised by [`identify_clusters`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClusterError {
    /// A group member has no entry in the placement map.
    #[error("slice {0} is in a cluster group but has not been placed")]
    Unplaced(SliceId),

    /// A slice appears in more than one group, or twice in one group.
    #[error("slice {0} is listed in more than one cluster group")]
    AlreadyClustered(SliceId),

    /// A group refers to a slice that is not in the netlist.
    #[error("slice {0} does not exist in the netlist")]
    UnknownSlice(SliceId),

    /// Writing the cluster id into a net key failed.
    #[error(transparent)]
    Keyspace(#[from] KeyspaceError),
}

/// Summary of a cluster assignment pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClusterReport {
    /// Number of distinct clusters in each group, in group order.
    pub clusters_per_group: Vec<u32>,
    /// Number of net keys that received a cluster id.
    pub keys_written: usize,
}

/// Assigns cluster ids to grouped slices and writes them into net keys.
///
/// For each group, in member order, each distinct location in `placements`
/// receives the next id starting from 0, and each slice takes the id of its
/// location. Slices outside every group keep cluster 0. Every net whose
/// source is grouped gets the source's id in its key's `cluster` field when
/// the key declares one; other keys are left untouched.
///
/// Nothing is modified when an error is returned.
pub fn identify_clusters<L>(
    netlist: &mut Netlist,
    placements: &HashMap<SliceId, L>,
    groups: &[Vec<SliceId>],
    sink: &DiagnosticSink,
) -> Result<ClusterReport, ClusterError>
where
    L: Eq + Hash,
{
    let mut seen = HashSet::new();
    let mut cluster_of: HashMap<SliceId, (usize, u32)> = HashMap::new();
    let mut report = ClusterReport::default();

    for (group_index, group) in groups.iter().enumerate() {
        let mut ids: HashMap<&L, u32> = HashMap::new();
        for &slice in group {
            if !netlist.contains_slice(slice) {
                return Err(ClusterError::UnknownSlice(slice));
            }
            if !seen.insert(slice) {
                return Err(ClusterError::AlreadyClustered(slice));
            }
            let location = placements
                .get(&slice)
                .ok_or(ClusterError::Unplaced(slice))?;
            let next = ids.len() as u32;
            let cluster = *ids.entry(location).or_insert(next);
            trace!(%slice, cluster, group = group_index, "assigned cluster");
            cluster_of.insert(slice, (group_index, cluster));
        }
        report.clusters_per_group.push(ids.len() as u32);
    }

    // Check every key write before touching the netlist.
    for net in &netlist.nets {
        if let Some(&(_, cluster)) = cluster_of.get(&net.source) {
            if net.key.has_field(CLUSTER_FIELD) {
                net.key.clone().set_field(CLUSTER_FIELD, cluster)?;
            }
        }
    }

    for (&slice, &(_, cluster)) in &cluster_of {
        netlist.slice_mut(slice).cluster = cluster;
    }

    let mut warned = HashSet::new();
    for index in 0..netlist.nets.len() {
        let source = netlist.nets[index].source;
        let Some(&(group_index, cluster)) = cluster_of.get(&source) else {
            continue;
        };
        let key = &mut netlist.nets[index].key;
        if key.has_field(CLUSTER_FIELD) {
            key.set_field(CLUSTER_FIELD, cluster)?;
            report.keys_written += 1;
        } else if report.clusters_per_group[group_index] > 1 && warned.insert(group_index) {
            let vertex = netlist.vertex(netlist.slice(source).vertex);
            sink.emit(
                Diagnostic::warning(
                    W_NO_CLUSTER_FIELD,
                    "instances of a partitioned source cannot be told apart",
                )
                .with_subject(format!("vertex `{}`", vertex.name))
                .with_note(format!(
                    "its slices occupy {} locations but key format `{}` has no `{CLUSTER_FIELD}` field",
                    report.clusters_per_group[group_index],
                    netlist.nets[index].key.format().name()
                )),
            );
        }
    }

    debug!(
        groups = groups.len(),
        keys_written = report.keys_written,
        "identified clusters"
    );
    Ok(report)
}
