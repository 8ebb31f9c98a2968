//! Edge list → CSR construction
//!
//! Counting-sort assembly keeps each source's arcs in input order. "Squishing"
//! sorts every neighbor list, drops duplicate targets (keeping the lightest
//! arc) and removes self-loops, which is what triangle counting expects.

use anyhow::{bail, Result};

use super::csr::{CsrGraph, NodeId, Weight};

/// One direction of a CSR
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct Adjacency {
    pub(crate) offsets: Vec<usize>,
    pub(crate) targets: Vec<u32>,
    pub(crate) weights: Vec<Weight>,
}

/// Builder for [`CsrGraph`]
///
/// # Example
///
/// ```
/// use trueno_gap::{GraphBuilder, NodeId};
///
/// let graph = GraphBuilder::new()
///     .undirected()
///     .squish(true)
///     .num_nodes(4)
///     .build(&[(NodeId(0), NodeId(1), 1), (NodeId(1), NodeId(2), 1)])
///     .unwrap();
///
/// assert_eq!(graph.num_nodes(), 4); // vertex 3 is isolated
/// assert_eq!(graph.num_edges(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct GraphBuilder {
    directed: bool,
    squish: bool,
    num_nodes: Option<usize>,
}

impl GraphBuilder {
    /// Directed, unsquished builder with inferred vertex count
    #[must_use]
    pub const fn new() -> Self {
        Self {
            directed: true,
            squish: false,
            num_nodes: None,
        }
    }

    /// Symmetrize the input: every edge is stored in both directions
    #[must_use]
    pub const fn undirected(mut self) -> Self {
        self.directed = false;
        self
    }

    /// Sort neighbor lists, drop duplicates and self-loops
    #[must_use]
    pub const fn squish(mut self, squish: bool) -> Self {
        self.squish = squish;
        self
    }

    /// Fix the vertex count instead of inferring it from the largest endpoint
    #[must_use]
    pub const fn num_nodes(mut self, num_nodes: usize) -> Self {
        self.num_nodes = Some(num_nodes);
        self
    }

    /// Build the graph
    ///
    /// # Errors
    ///
    /// Returns error if an endpoint is outside an explicit vertex count or the
    /// vertex count does not fit the id type
    pub fn build(&self, edges: &[(NodeId, NodeId, Weight)]) -> Result<CsrGraph> {
        let inferred = edges
            .iter()
            .map(|(src, dst, _)| src.index().max(dst.index()) + 1)
            .max()
            .unwrap_or(0);
        let num_nodes = match self.num_nodes {
            Some(n) if n < inferred => {
                bail!("edge endpoint {} out of bounds for {n} vertices", inferred - 1)
            }
            Some(n) => n,
            None => inferred,
        };
        if u32::try_from(num_nodes).is_err() {
            bail!("{num_nodes} vertices exceed the u32 id space");
        }

        let mut arcs: Vec<(u32, u32, Weight)> = edges.iter().map(|(s, d, w)| (s.0, d.0, *w)).collect();
        if !self.directed {
            arcs.extend(edges.iter().map(|(s, d, w)| (d.0, s.0, *w)));
        }

        let forward = assemble(num_nodes, &arcs, self.squish);
        let reverse = self.directed.then(|| transpose(&forward));

        tracing::debug!(
            num_nodes,
            arcs = forward.targets.len(),
            directed = self.directed,
            "built CSR graph"
        );
        Ok(CsrGraph::from_adjacency(num_nodes, self.directed, forward, reverse))
    }
}

impl Default for GraphBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn forward_arcs(adj: &Adjacency) -> impl Iterator<Item = (u32, u32, Weight)> + '_ {
    adj.offsets.windows(2).enumerate().flat_map(move |(u, w)| {
        #[allow(clippy::cast_possible_truncation)] // checked against u32 in build()
        let src = u as u32;
        (w[0]..w[1]).map(move |e| (src, adj.targets[e], adj.weights[e]))
    })
}

/// Reverse CSR of `forward`
///
/// Sources are visited in ascending order, so a sorted, duplicate-free
/// forward side yields a sorted, duplicate-free reverse side.
pub(crate) fn transpose(forward: &Adjacency) -> Adjacency {
    let num_nodes = forward.offsets.len() - 1;
    let flipped: Vec<(u32, u32, Weight)> = forward_arcs(forward).map(|(s, d, w)| (d, s, w)).collect();
    assemble(num_nodes, &flipped, false)
}

/// Counting-sort `arcs` into a CSR over `num_nodes` vertices
pub(crate) fn assemble(num_nodes: usize, arcs: &[(u32, u32, Weight)], squish: bool) -> Adjacency {
    let mut offsets = vec![0_usize; num_nodes + 1];
    for &(src, _, _) in arcs {
        offsets[src as usize + 1] += 1;
    }
    for u in 0..num_nodes {
        offsets[u + 1] += offsets[u];
    }

    let mut cursor = offsets.clone();
    let mut targets = vec![0_u32; arcs.len()];
    let mut weights: Vec<Weight> = vec![0; arcs.len()];
    for &(src, dst, w) in arcs {
        let slot = &mut cursor[src as usize];
        targets[*slot] = dst;
        weights[*slot] = w;
        *slot += 1;
    }

    let adj = Adjacency {
        offsets,
        targets,
        weights,
    };
    if squish {
        squish_adjacency(&adj)
    } else {
        adj
    }
}

fn squish_adjacency(adj: &Adjacency) -> Adjacency {
    let num_nodes = adj.offsets.len() - 1;
    let mut out = Adjacency {
        offsets: Vec::with_capacity(num_nodes + 1),
        targets: Vec::with_capacity(adj.targets.len()),
        weights: Vec::with_capacity(adj.weights.len()),
    };
    out.offsets.push(0);

    let mut row: Vec<(u32, Weight)> = Vec::new();
    for u in 0..num_nodes {
        row.clear();
        row.extend(
            (adj.offsets[u]..adj.offsets[u + 1])
                .map(|e| (adj.targets[e], adj.weights[e]))
                .filter(|&(v, _)| v as usize != u),
        );
        row.sort_unstable();
        row.dedup_by_key(|&mut (v, _)| v);
        for &(v, w) in &row {
            out.targets.push(v);
            out.weights.push(w);
        }
        out.offsets.push(out.targets.len());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assemble_preserves_input_order() {
        let arcs = vec![(0, 2, 1), (1, 0, 1), (0, 1, 1)];
        let adj = assemble(3, &arcs, false);

        assert_eq!(adj.offsets, vec![0, 2, 3, 3]);
        assert_eq!(adj.targets, vec![2, 1, 0]);
    }

    #[test]
    fn test_squish_keeps_lightest_duplicate() {
        let arcs = vec![(0, 2, 9), (0, 1, 1), (0, 2, 3), (0, 0, 1)];
        let adj = assemble(3, &arcs, true);

        assert_eq!(adj.offsets, vec![0, 2, 2, 2]);
        assert_eq!(adj.targets, vec![1, 2]);
        assert_eq!(adj.weights, vec![1, 3]);
    }

    #[test]
    fn test_explicit_node_count() {
        let graph = GraphBuilder::new()
            .num_nodes(5)
            .build(&[(NodeId(0), NodeId(1), 1)])
            .unwrap();
        assert_eq!(graph.num_nodes(), 5);
        assert_eq!(graph.out_degree(4), 0);
        assert_eq!(graph.in_degree(1), 1);
    }

    #[test]
    fn test_explicit_node_count_too_small() {
        let result = GraphBuilder::new()
            .num_nodes(1)
            .build(&[(NodeId(0), NodeId(3), 1)]);
        assert!(result.is_err());
    }

    #[test]
    fn test_undirected_is_symmetric() {
        let graph = GraphBuilder::new()
            .undirected()
            .build(&[(NodeId(0), NodeId(1), 2), (NodeId(1), NodeId(2), 5)])
            .unwrap();

        for u in 0..graph.num_nodes() {
            for &v in graph.out_neigh(u) {
                assert!(graph.out_neigh(v as usize).contains(&(u as u32)));
            }
        }
    }
}
