//! Serial breadth-first traversal
//!
//! Reference level-by-level BFS used to check the parallel BFS tree and the
//! Brandes shortest-path DAG.

use crate::storage::{CsrGraph, NodeId};
use anyhow::{bail, Result};
use std::collections::VecDeque;

/// Hop distance from `source` to every vertex (`None` if unreachable)
///
/// # Arguments
///
/// * `graph` - CSR graph representation
/// * `source` - Starting node for BFS
///
/// # Errors
///
/// Returns an error if `source` is not a vertex of the graph
///
/// # Example
///
/// ```
/// use trueno_gap::{bfs_depths, CsrGraph, NodeId};
///
/// let graph = CsrGraph::from_edge_list(&[
///     (NodeId(0), NodeId(1), 1),
///     (NodeId(1), NodeId(2), 1),
/// ])
/// .unwrap();
///
/// let depths = bfs_depths(&graph, NodeId(0)).unwrap();
/// assert_eq!(depths, vec![Some(0), Some(1), Some(2)]);
/// ```
pub fn bfs_depths(graph: &CsrGraph, source: NodeId) -> Result<Vec<Option<u32>>> {
    if source.index() >= graph.num_nodes() {
        bail!("Node ID {} out of bounds", source.0);
    }

    let mut depths = vec![None; graph.num_nodes()];
    let mut queue = VecDeque::new();

    depths[source.index()] = Some(0);
    queue.push_back(source.0);

    while let Some(current) = queue.pop_front() {
        let next_depth = depths[current as usize].map(|d: u32| d + 1);
        for &neighbor in graph.out_neigh(current as usize) {
            if depths[neighbor as usize].is_none() {
                depths[neighbor as usize] = next_depth;
                queue.push_back(neighbor);
            }
        }
    }

    Ok(depths)
}
