//! Source vertex selection for multi-source kernels

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::storage::{CsrGraph, NodeId};

/// Picks traversal sources: a fixed vertex, or random vertices with at least
/// one out-edge
///
/// # Example
///
/// ```
/// use trueno_gap::{CsrGraph, NodeId, SourcePicker};
///
/// let graph = CsrGraph::from_edge_list(&[(NodeId(0), NodeId(1), 1)]).unwrap();
/// let mut picker = SourcePicker::new(&graph, None, 7);
///
/// assert_eq!(picker.pick_next(), Some(NodeId(0))); // only vertex with out-edges
/// ```
#[derive(Debug)]
pub struct SourcePicker<'a> {
    graph: &'a CsrGraph,
    fixed: Option<NodeId>,
    rng: StdRng,
}

impl<'a> SourcePicker<'a> {
    /// Picker over `graph`; `fixed` overrides random selection
    #[must_use]
    pub fn new(graph: &'a CsrGraph, fixed: Option<NodeId>, seed: u64) -> Self {
        Self {
            graph,
            fixed,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Next source, or `None` when no vertex has an out-edge
    pub fn pick_next(&mut self) -> Option<NodeId> {
        if let Some(source) = self.fixed {
            return Some(source);
        }
        if self.graph.num_edges_directed() == 0 {
            return None;
        }
        let n = u32::try_from(self.graph.num_nodes()).ok()?;
        loop {
            let candidate = self.rng.gen_range(0..n);
            if self.graph.out_degree(candidate as usize) != 0 {
                return Some(NodeId(candidate));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_source() {
        let graph = CsrGraph::from_edge_list(&[(NodeId(0), NodeId(1), 1)]).unwrap();
        let mut picker = SourcePicker::new(&graph, Some(NodeId(1)), 0);
        assert_eq!(picker.pick_next(), Some(NodeId(1)));
        assert_eq!(picker.pick_next(), Some(NodeId(1)));
    }

    #[test]
    fn test_random_sources_have_out_edges() {
        let edges: Vec<_> = (0..50).map(|i| (NodeId(i * 2), NodeId(i * 2 + 1), 1)).collect();
        let graph = CsrGraph::from_edge_list(&edges).unwrap();
        let mut picker = SourcePicker::new(&graph, None, 27_491_095);

        for _ in 0..100 {
            let source = picker.pick_next().unwrap();
            assert!(graph.out_degree(source.index()) > 0);
        }
    }

    #[test]
    fn test_same_seed_same_sequence() {
        let graph = CsrGraph::from_edge_list_undirected(&[
            (NodeId(0), NodeId(1), 1),
            (NodeId(2), NodeId(3), 1),
        ])
        .unwrap();
        let mut a = SourcePicker::new(&graph, None, 9);
        let mut b = SourcePicker::new(&graph, None, 9);
        for _ in 0..10 {
            assert_eq!(a.pick_next(), b.pick_next());
        }
    }

    #[test]
    fn test_edgeless_graph() {
        let graph = crate::GraphBuilder::new().num_nodes(3).build(&[]).unwrap();
        let mut picker = SourcePicker::new(&graph, None, 1);
        assert_eq!(picker.pick_next(), None);
    }
}
