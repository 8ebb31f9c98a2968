//! Graph structure algorithms: weakly connected components
//!
//! Serial component labelling used as the connected-components oracle.
//!
//! # Example
//!
//! ```
//! use trueno_gap::{component_labels, connected_components, CsrGraph, NodeId};
//!
//! // Build a graph with two components: 0 → 1, 2 → 3
//! let edges = vec![
//!     (NodeId(0), NodeId(1), 1),
//!     (NodeId(2), NodeId(3), 1),
//! ];
//! let graph = CsrGraph::from_edge_list(&edges).unwrap();
//!
//! assert_eq!(connected_components(&graph), 2);
//! assert_eq!(component_labels(&graph), vec![0, 0, 2, 2]);
//! ```

use crate::storage::CsrGraph;

/// Count the number of weakly connected components in the graph
///
/// Treats the graph as undirected for connectivity purposes.
/// Two nodes are in the same component if there's a path between them
/// (ignoring edge direction).
#[must_use]
pub fn connected_components(graph: &CsrGraph) -> usize {
    component_labels(graph)
        .iter()
        .enumerate()
        .filter(|&(u, &label)| label as usize == u)
        .count()
}

/// Label every vertex with the smallest vertex id of its weak component
#[must_use]
pub fn component_labels(graph: &CsrGraph) -> Vec<u32> {
    const UNLABELLED: u32 = u32::MAX;

    let n = graph.num_nodes();
    let mut labels = vec![UNLABELLED; n];
    let mut stack = Vec::new();

    for start in 0..n {
        if labels[start] != UNLABELLED {
            continue;
        }
        #[allow(clippy::cast_possible_truncation)] // ids fit u32 by construction
        let label = start as u32;
        labels[start] = label;
        stack.push(start);

        // Iterative DFS over out- and in-edges (treat as undirected)
        while let Some(node) = stack.pop() {
            let neighbors = graph.out_neigh(node).iter().chain(graph.in_neigh(node));
            for &neighbor in neighbors {
                let idx = neighbor as usize;
                if labels[idx] == UNLABELLED {
                    labels[idx] = label;
                    stack.push(idx);
                }
            }
        }
    }

    labels
}
