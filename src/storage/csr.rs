//! CSR (Compressed Sparse Row) graph representation
//!
//! Immutable during kernel execution and shared by reference across all kernel
//! calls. Directed graphs carry a reverse CSR for in-neighbor (pull) access;
//! undirected graphs store every edge in both directions and answer
//! in-neighbor queries from the forward arrays.
//!
//! # CSR Format
//!
//! ```text
//! Graph: 0 → 1, 0 → 2, 1 → 2
//!
//! CSR:
//!   row_offsets: [0, 2, 3, 3]  // Node 0: arcs [0..2), Node 1: [2..3), Node 2: [3..3)
//!   col_indices: [1, 2, 2]      // Arc 0 → node 1, arc 1 → node 2, arc 2 → node 2
//!   edge_weights: [1, 1, 1]
//! ```

use anyhow::{anyhow, bail, Result};
use serde::{Deserialize, Serialize};
use std::ops::Range;

use super::builder::{assemble, Adjacency, GraphBuilder};

/// Node identifier (zero-indexed)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub u32);

impl NodeId {
    /// Index of this node in per-vertex arrays
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Edge weight (non-negative by type); distances share the type
pub type Weight = u32;

/// CSR (Compressed Sparse Row) graph
///
/// # Example
///
/// ```
/// use trueno_gap::{CsrGraph, NodeId};
///
/// let graph = CsrGraph::from_edge_list(&[
///     (NodeId(0), NodeId(1), 1),
///     (NodeId(0), NodeId(2), 1),
/// ])
/// .unwrap();
///
/// assert_eq!(graph.outgoing_neighbors(NodeId(0)).unwrap(), &[1, 2]);
/// assert_eq!(graph.incoming_neighbors(NodeId(2)).unwrap(), &[0]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsrGraph {
    /// Forward CSR: node i's arcs start at `row_offsets`[i]
    /// Length: `num_nodes` + 1
    row_offsets: Vec<usize>,

    /// Forward CSR: arc targets
    col_indices: Vec<u32>,

    /// Forward CSR: arc weights
    edge_weights: Vec<Weight>,

    /// Reverse CSR (directed graphs only; empty otherwise)
    rev_row_offsets: Vec<usize>,
    rev_col_indices: Vec<u32>,
    rev_edge_weights: Vec<Weight>,

    directed: bool,
    num_nodes: usize,
}

impl CsrGraph {
    /// Create new empty directed graph
    #[must_use]
    pub fn new() -> Self {
        Self {
            row_offsets: vec![0],
            col_indices: Vec::new(),
            edge_weights: Vec::new(),
            rev_row_offsets: vec![0],
            rev_col_indices: Vec::new(),
            rev_edge_weights: Vec::new(),
            directed: true,
            num_nodes: 0,
        }
    }

    /// Create a directed graph from an edge list
    ///
    /// The vertex count is one past the largest endpoint. Arcs of each source
    /// keep their input order; duplicates and self-loops are preserved.
    ///
    /// # Errors
    ///
    /// Returns error if the edge list is too large for the vertex id type
    pub fn from_edge_list(edges: &[(NodeId, NodeId, Weight)]) -> Result<Self> {
        GraphBuilder::new().build(edges)
    }

    /// Create an undirected graph from an edge list
    ///
    /// Every edge is stored in both directions; neighbor lists are sorted with
    /// duplicates and self-loops removed.
    ///
    /// # Errors
    ///
    /// Returns error if the edge list is too large for the vertex id type
    pub fn from_edge_list_undirected(edges: &[(NodeId, NodeId, Weight)]) -> Result<Self> {
        GraphBuilder::new().undirected().squish(true).build(edges)
    }

    pub(crate) fn from_adjacency(
        num_nodes: usize,
        directed: bool,
        forward: Adjacency,
        reverse: Option<Adjacency>,
    ) -> Self {
        let reverse = reverse.unwrap_or_else(|| Adjacency {
            offsets: vec![0],
            targets: Vec::new(),
            weights: Vec::new(),
        });
        Self {
            row_offsets: forward.offsets,
            col_indices: forward.targets,
            edge_weights: forward.weights,
            rev_row_offsets: reverse.offsets,
            rev_col_indices: reverse.targets,
            rev_edge_weights: reverse.weights,
            directed,
            num_nodes,
        }
    }

    /// Whether edges are directed
    #[must_use]
    pub const fn is_directed(&self) -> bool {
        self.directed
    }

    /// Get number of nodes
    #[must_use]
    pub const fn num_nodes(&self) -> usize {
        self.num_nodes
    }

    /// Number of edges (undirected edges are counted once)
    #[must_use]
    pub fn num_edges(&self) -> usize {
        if self.directed {
            self.col_indices.len()
        } else {
            self.col_indices.len() / 2
        }
    }

    /// Number of stored arcs (both directions of an undirected edge)
    #[must_use]
    pub fn num_edges_directed(&self) -> usize {
        self.col_indices.len()
    }

    /// Out-degree of vertex `u`
    #[inline]
    #[must_use]
    pub fn out_degree(&self, u: usize) -> usize {
        self.row_offsets[u + 1] - self.row_offsets[u]
    }

    /// In-degree of vertex `u`
    #[inline]
    #[must_use]
    pub fn in_degree(&self, u: usize) -> usize {
        if self.directed {
            self.rev_row_offsets[u + 1] - self.rev_row_offsets[u]
        } else {
            self.out_degree(u)
        }
    }

    /// Arc positions of `u`'s out-edges
    #[inline]
    #[must_use]
    pub fn out_edge_range(&self, u: usize) -> Range<usize> {
        self.row_offsets[u]..self.row_offsets[u + 1]
    }

    /// Out-neighbors of `u` (unchecked hot-path accessor)
    #[inline]
    #[must_use]
    pub fn out_neigh(&self, u: usize) -> &[u32] {
        &self.col_indices[self.out_edge_range(u)]
    }

    /// In-neighbors of `u` (unchecked hot-path accessor)
    #[inline]
    #[must_use]
    pub fn in_neigh(&self, u: usize) -> &[u32] {
        if self.directed {
            &self.rev_col_indices[self.rev_row_offsets[u]..self.rev_row_offsets[u + 1]]
        } else {
            self.out_neigh(u)
        }
    }

    /// Out-neighbors of `u` paired with arc weights
    #[inline]
    pub fn out_weighted(&self, u: usize) -> impl Iterator<Item = (u32, Weight)> + '_ {
        let range = self.out_edge_range(u);
        self.col_indices[range.clone()]
            .iter()
            .copied()
            .zip(self.edge_weights[range].iter().copied())
    }

    /// In-neighbors of `u` paired with arc weights
    pub fn in_weighted(&self, u: usize) -> impl Iterator<Item = (u32, Weight)> + '_ {
        let (targets, weights) = if self.directed {
            let range = self.rev_row_offsets[u]..self.rev_row_offsets[u + 1];
            (&self.rev_col_indices[range.clone()], &self.rev_edge_weights[range])
        } else {
            let range = self.out_edge_range(u);
            (&self.col_indices[range.clone()], &self.edge_weights[range])
        };
        targets.iter().copied().zip(weights.iter().copied())
    }

    /// Get outgoing neighbors of a node
    ///
    /// # Errors
    ///
    /// Returns error if node ID is out of bounds
    pub fn outgoing_neighbors(&self, node: NodeId) -> Result<&[u32]> {
        if node.index() >= self.num_nodes {
            return Err(anyhow!("Node ID {} out of bounds", node.0));
        }
        Ok(self.out_neigh(node.index()))
    }

    /// Get incoming neighbors of a node
    ///
    /// # Errors
    ///
    /// Returns error if node ID is out of bounds
    pub fn incoming_neighbors(&self, target: NodeId) -> Result<&[u32]> {
        if target.index() >= self.num_nodes {
            return Err(anyhow!("Node ID {} out of bounds", target.0));
        }
        Ok(self.in_neigh(target.index()))
    }

    /// Iterate over all stored arcs as (source, target, weight)
    pub fn iter_edges(&self) -> impl Iterator<Item = (u32, u32, Weight)> + '_ {
        (0..self.num_nodes).flat_map(move |u| {
            #[allow(clippy::cast_possible_truncation)] // ids fit u32 by construction
            let src = u as u32;
            self.out_weighted(u).map(move |(v, w)| (src, v, w))
        })
    }

    /// First vertex whose neighbor list is not strictly ascending or holds a
    /// self-loop, if any
    #[must_use]
    pub fn first_unsorted_vertex(&self) -> Option<u32> {
        (0..self.num_nodes)
            .find(|&u| {
                let neigh = self.out_neigh(u);
                neigh.windows(2).any(|w| w[0] >= w[1]) || neigh.iter().any(|&v| v as usize == u)
            })
            .and_then(|u| u32::try_from(u).ok())
    }

    /// Whether every neighbor list is strictly ascending and loop-free
    #[must_use]
    pub fn is_simple_sorted(&self) -> bool {
        self.first_unsorted_vertex().is_none()
    }

    /// Relabel vertices by descending degree
    ///
    /// The highest-degree vertex becomes 0; ties keep their relative order.
    /// Neighbor lists of the result are sorted ascending.
    ///
    /// # Errors
    ///
    /// Returns error for directed graphs
    pub fn relabel_by_degree(&self) -> Result<Self> {
        if self.directed {
            bail!("relabel_by_degree requires an undirected graph");
        }
        let n = self.num_nodes;
        let mut order: Vec<usize> = (0..n).collect();
        order.sort_by(|&a, &b| self.out_degree(b).cmp(&self.out_degree(a)).then(a.cmp(&b)));

        let mut new_ids = vec![0_u32; n];
        for (rank, &old) in order.iter().enumerate() {
            new_ids[old] = u32::try_from(rank)?;
        }

        let arcs: Vec<(u32, u32, Weight)> = self
            .iter_edges()
            .map(|(u, v, w)| (new_ids[u as usize], new_ids[v as usize], w))
            .collect();
        let forward = assemble(n, &arcs, true);
        tracing::debug!(num_nodes = n, "relabelled graph by degree");
        Ok(Self::from_adjacency(n, false, forward, None))
    }

    /// Get CSR components
    #[must_use]
    pub fn csr_components(&self) -> (&[usize], &[u32], &[Weight]) {
        (&self.row_offsets, &self.col_indices, &self.edge_weights)
    }
}

impl Default for CsrGraph {
    fn default() -> Self {
        Self::new()
    }
}
