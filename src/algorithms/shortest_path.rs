//! Shortest path algorithms: Dijkstra's algorithm
//!
//! Serial single-source shortest paths over non-negative integer weights.
//! This is the oracle the parallel delta-stepping kernel is checked against.
//!
//! # Example
//!
//! ```
//! use trueno_gap::{dijkstra, CsrGraph, NodeId};
//!
//! // Build a weighted graph
//! let edges = vec![
//!     (NodeId(0), NodeId(1), 1),
//!     (NodeId(1), NodeId(2), 2),
//!     (NodeId(0), NodeId(2), 5),
//! ];
//! let graph = CsrGraph::from_edge_list(&edges).unwrap();
//!
//! // Find shortest paths from node 0
//! let distances = dijkstra(&graph, NodeId(0)).unwrap();
//! assert_eq!(distances, vec![0, 1, 3]); // 0→1→2 = 3, not 0→2 = 5
//! ```

use super::sssp::DIST_INF;
use crate::storage::{CsrGraph, NodeId, Weight};
use anyhow::{bail, Result};
use std::cmp::Reverse;
use std::collections::BinaryHeap;

/// Compute single-source shortest paths using Dijkstra's algorithm
///
/// # Arguments
///
/// * `graph` - The CSR graph with edge weights as distances
/// * `source` - The starting node
///
/// # Returns
///
/// Distance to every vertex; unreachable vertices hold [`DIST_INF`].
///
/// # Complexity
///
/// O((V + E) log V) using a binary heap
///
/// # Errors
///
/// Returns an error if `source` is not a vertex of the graph
pub fn dijkstra(graph: &CsrGraph, source: NodeId) -> Result<Vec<Weight>> {
    let n = graph.num_nodes();
    if source.index() >= n {
        bail!("Node ID {} out of bounds", source.0);
    }

    let mut distances = vec![DIST_INF; n];
    let mut heap = BinaryHeap::new();

    distances[source.index()] = 0;
    heap.push(Reverse((0, source.0)));

    while let Some(Reverse((cost, node))) = heap.pop() {
        // Skip stale heap entries
        if cost > distances[node as usize] {
            continue;
        }

        for (neighbor, weight) in graph.out_weighted(node as usize) {
            let new_cost = cost.saturating_add(weight).min(DIST_INF);
            if new_cost < distances[neighbor as usize] {
                distances[neighbor as usize] = new_cost;
                heap.push(Reverse((new_cost, neighbor)));
            }
        }
    }

    Ok(distances)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dijkstra_single_node() {
        let graph = crate::GraphBuilder::new().num_nodes(1).build(&[]).unwrap();
        assert_eq!(dijkstra(&graph, NodeId(0)).unwrap(), vec![0]);
    }

    #[test]
    fn test_dijkstra_prefers_cheaper_detour() {
        let edges = vec![
            (NodeId(0), NodeId(1), 4),
            (NodeId(0), NodeId(2), 1),
            (NodeId(2), NodeId(1), 2),
        ];
        let graph = CsrGraph::from_edge_list(&edges).unwrap();

        let distances = dijkstra(&graph, NodeId(0)).unwrap();
        assert_eq!(distances[1], 3); // 0→2→1, not 0→1
    }

    #[test]
    fn test_dijkstra_unreachable() {
        // 0 → 1, 2 isolated, 3 → 0
        let edges = vec![(NodeId(0), NodeId(1), 1), (NodeId(3), NodeId(0), 1)];
        let graph = crate::GraphBuilder::new().num_nodes(4).build(&edges).unwrap();

        let distances = dijkstra(&graph, NodeId(0)).unwrap();
        assert_eq!(distances, vec![0, 1, DIST_INF, DIST_INF]);
    }

    #[test]
    fn test_dijkstra_zero_weight_edges() {
        let edges = vec![(NodeId(0), NodeId(1), 0), (NodeId(1), NodeId(2), 0)];
        let graph = CsrGraph::from_edge_list(&edges).unwrap();

        assert_eq!(dijkstra(&graph, NodeId(0)).unwrap(), vec![0, 0, 0]);
    }

    #[test]
    fn test_dijkstra_invalid_source() {
        let graph = CsrGraph::from_edge_list(&[(NodeId(0), NodeId(1), 1)]).unwrap();
        assert!(dijkstra(&graph, NodeId(100)).is_err());
    }
}
