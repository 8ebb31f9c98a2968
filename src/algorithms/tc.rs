//! Triangle counting by ordered neighbor-list intersection
//!
//! Every triangle `w < v < u` is found once, from its largest vertex: walk
//! `v ∈ N(u)` with `v < u`, then `w ∈ N(v)` with `w < v`, and test `w ∈ N(u)`
//! with a cursor that only moves forward. Requires an undirected graph with
//! sorted, duplicate-free and loop-free neighbor lists.
//!
//! On skewed degree distributions the graph is first relabelled by
//! descending degree, so hubs get small ids and their long lists are cut
//! short by the ordering.

use rayon::prelude::*;

use crate::config::DEFAULT_SOURCE_SEED;
use crate::error::KernelError;
use crate::storage::CsrGraph;

use super::source::SourcePicker;

const COUNT_CHUNK: usize = 64;

/// Degree samples taken by the relabelling heuristic
const RELABEL_SAMPLES: usize = 1000;

/// Count the triangles of an undirected graph
///
/// # Errors
///
/// Returns [`KernelError::DirectedGraph`] for directed input and
/// [`KernelError::UnsortedNeighbors`] when a neighbor list is unsorted,
/// repeats a vertex or holds a self-loop
///
/// # Example
///
/// ```
/// use trueno_gap::{triangle_count, CsrGraph, NodeId};
///
/// // Square 0-1-2-3 with diagonal 0-2
/// let graph = CsrGraph::from_edge_list_undirected(&[
///     (NodeId(0), NodeId(1), 1),
///     (NodeId(1), NodeId(2), 1),
///     (NodeId(2), NodeId(3), 1),
///     (NodeId(3), NodeId(0), 1),
///     (NodeId(0), NodeId(2), 1),
/// ])
/// .unwrap();
///
/// assert_eq!(triangle_count(&graph).unwrap(), 2);
/// ```
pub fn triangle_count(graph: &CsrGraph) -> Result<u64, KernelError> {
    if graph.is_directed() {
        return Err(KernelError::DirectedGraph);
    }
    if let Some(vertex) = graph.first_unsorted_vertex() {
        return Err(KernelError::UnsortedNeighbors { vertex });
    }

    let triangles = if worth_relabelling(graph) {
        match graph.relabel_by_degree() {
            Ok(relabelled) => ordered_count(&relabelled),
            Err(err) => {
                tracing::warn!(error = %err, "relabelling failed, counting on original ids");
                ordered_count(graph)
            }
        }
    } else {
        ordered_count(graph)
    };

    tracing::info!(num_nodes = graph.num_nodes(), triangles, "triangle count complete");
    Ok(triangles)
}

/// Count triangles without checking preconditions or relabelling
#[must_use]
pub fn ordered_count(graph: &CsrGraph) -> u64 {
    (0..graph.num_nodes())
        .into_par_iter()
        .with_min_len(COUNT_CHUNK)
        .map(|u| {
            let neigh_u = graph.out_neigh(u);
            let mut found = 0_u64;
            for &v in neigh_u.iter().take_while(|&&v| (v as usize) < u) {
                let mut cursor = 0;
                for &w in graph.out_neigh(v as usize).iter().take_while(|&&w| w < v) {
                    while cursor < neigh_u.len() && neigh_u[cursor] < w {
                        cursor += 1;
                    }
                    if neigh_u.get(cursor) == Some(&w) {
                        found += 1;
                    }
                }
            }
            found
        })
        .sum()
}

/// Whether degree relabelling should pay off
///
/// Dense enough (at least 10 edges per vertex) and skewed: the mean of a
/// degree sample exceeds its median by more than 30%.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn worth_relabelling(graph: &CsrGraph) -> bool {
    let n = graph.num_nodes();
    if n == 0 || graph.num_edges() / n < 10 {
        return false;
    }

    let mut picker = SourcePicker::new(graph, None, DEFAULT_SOURCE_SEED);
    let num_samples = RELABEL_SAMPLES.min(n);
    let Some(mut samples) = (0..num_samples)
        .map(|_| picker.pick_next().map(|v| graph.out_degree(v.index())))
        .collect::<Option<Vec<usize>>>()
    else {
        return false;
    };
    samples.sort_unstable();

    let average = samples.iter().sum::<usize>() as f64 / num_samples as f64;
    let median = samples[num_samples / 2] as f64;
    let relabel = average / 1.3 > median;
    tracing::debug!(average, median, relabel, "sampled degree distribution");
    relabel
}

/// Check a triangle count by summing neighbor-set intersections over every
/// arc; each triangle is seen six times
#[must_use]
pub fn verify_triangle_count(graph: &CsrGraph, count: u64) -> bool {
    if graph.is_directed() {
        tracing::warn!("triangle counts are only defined for undirected graphs");
        return false;
    }

    let mut total = 0_u64;
    for u in 0..graph.num_nodes() {
        let neigh_u = graph.out_neigh(u);
        for &v in neigh_u {
            total += intersection_size(neigh_u, graph.out_neigh(v as usize));
        }
    }
    let expected = total / 6;
    if expected == count {
        true
    } else {
        tracing::warn!(got = count, expected, "triangle count mismatch");
        false
    }
}

fn intersection_size(a: &[u32], b: &[u32]) -> u64 {
    let (mut i, mut j, mut common) = (0, 0, 0);
    while i < a.len() && j < b.len() {
        match a[i].cmp(&b[j]) {
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
            std::cmp::Ordering::Equal => {
                common += 1;
                i += 1;
                j += 1;
            }
        }
    }
    common
}
