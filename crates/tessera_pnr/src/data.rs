//! Core netlist data structures.
//!
//! Defines the mapping netlist: logical vertices, the vertex slices they are
//! partitioned into, and the nets carrying signals between slices. Each net
//! owns the [`RoutingKey`] its source will emit; the cluster assigner writes
//! into those keys through `&mut Netlist`, so no key can be read before the
//! write has happened.

use crate::ids::{NetId, SliceId, VertexId};
use serde::{Deserialize, Serialize};
use std::ops::Range;
use tessera_keyspace::RoutingKey;

/// The netlist flowing through partitioning and cluster assignment.
#[derive(Debug, Clone)]
pub struct Netlist {
    /// All logical vertices.
    pub vertices: Vec<Vertex>,
    /// All vertex slices.
    pub slices: Vec<VertexSlice>,
    /// All nets.
    pub nets: Vec<Net>,
    /// Groups of slices that are alternative instances of one vertex.
    pub groups: Vec<Vec<SliceId>>,
}

impl Netlist {
    /// Creates an empty netlist.
    pub fn new() -> Self {
        Self {
            vertices: Vec::new(),
            slices: Vec::new(),
            nets: Vec::new(),
            groups: Vec::new(),
        }
    }

    /// Adds a vertex with `n_atoms` atoms and returns its ID.
    pub fn add_vertex(&mut self, name: impl Into<String>, n_atoms: u32) -> VertexId {
        let id = VertexId::from_raw(self.vertices.len() as u32);
        self.vertices.push(Vertex {
            id,
            name: name.into(),
            n_atoms,
        });
        id
    }

    /// Adds a slice covering `atoms` of `vertex` and returns its ID.
    pub fn add_slice(&mut self, vertex: VertexId, atoms: Range<u32>) -> SliceId {
        let id = SliceId::from_raw(self.slices.len() as u32);
        self.slices.push(VertexSlice {
            id,
            vertex,
            atoms,
            cluster: 0,
        });
        id
    }

    /// Adds a net and returns its ID.
    pub fn add_net(
        &mut self,
        source: SliceId,
        sinks: Vec<SliceId>,
        weight: u32,
        key: RoutingKey,
    ) -> NetId {
        let id = NetId::from_raw(self.nets.len() as u32);
        self.nets.push(Net {
            id,
            source,
            sinks,
            weight,
            key,
        });
        id
    }

    /// Records a group of interchangeable slices. Empty groups are dropped.
    pub fn add_group(&mut self, slices: Vec<SliceId>) {
        if !slices.is_empty() {
            self.groups.push(slices);
        }
    }

    /// Returns the vertex with the given ID.
    pub fn vertex(&self, id: VertexId) -> &Vertex {
        &self.vertices[id.index()]
    }

    /// Returns the slice with the given ID.
    pub fn slice(&self, id: SliceId) -> &VertexSlice {
        &self.slices[id.index()]
    }

    /// Returns a mutable reference to the slice with the given ID.
    pub fn slice_mut(&mut self, id: SliceId) -> &mut VertexSlice {
        &mut self.slices[id.index()]
    }

    /// Returns the net with the given ID.
    pub fn net(&self, id: NetId) -> &Net {
        &self.nets[id.index()]
    }

    /// Returns whether `id` names a slice of this netlist.
    pub fn contains_slice(&self, id: SliceId) -> bool {
        id.index() < self.slices.len()
    }

    /// Slices of the given vertex, in creation order.
    pub fn slices_of(&self, vertex: VertexId) -> impl Iterator<Item = &VertexSlice> {
        self.slices.iter().filter(move |s| s.vertex == vertex)
    }

    /// Returns the number of vertices.
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Returns the number of slices.
    pub fn slice_count(&self) -> usize {
        self.slices.len()
    }

    /// Returns the number of nets.
    pub fn net_count(&self) -> usize {
        self.nets.len()
    }
}

impl Default for Netlist {
    fn default() -> Self {
        Self::new()
    }
}

/// A logical computational unit (e.g. an ensemble of neurons).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vertex {
    /// Unique ID of this vertex.
    pub id: VertexId,
    /// Name used in diagnostics.
    pub name: String,
    /// Size of the vertex's index space.
    pub n_atoms: u32,
}

impl Vertex {
    /// The vertex's full atom range.
    pub fn atoms(&self) -> Range<u32> {
        0..self.n_atoms
    }
}

/// The part of a vertex realized on a single core.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VertexSlice {
    /// Unique ID of this slice.
    pub id: SliceId,
    /// The vertex this slice belongs to.
    pub vertex: VertexId,
    /// Atoms of the vertex covered by the slice.
    pub atoms: Range<u32>,
    /// Cluster id assigned by [`identify_clusters`](crate::identify_clusters).
    pub cluster: u32,
}

/// A directed signal from one slice to an ordered list of sinks.
#[derive(Debug, Clone)]
pub struct Net {
    /// Unique ID of this net.
    pub id: NetId,
    /// The emitting slice.
    pub source: SliceId,
    /// The receiving slices.
    pub sinks: Vec<SliceId>,
    /// Relative packet rate of the net.
    pub weight: u32,
    /// The key packets on this net carry.
    pub key: RoutingKey,
}
