//! Afforest connected components
//!
//! Based on Sutton, Ben-Nun & Barak, "Optimizing Parallel Graph Connectivity
//! Computation via Subgraph Sampling" (IPDPS 2018).
//!
//! An implicit union-find forest in `comp`: `link` always points the higher
//! root at the lower label, `compress` halves paths until every vertex points
//! at its root. A few sampled neighbor rounds settle most of the graph into
//! one large component, which the final full link pass then skips.
//!
//! Labels only ever decrease, so the final label of every vertex is the
//! smallest vertex id in its component.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};

use crate::config::CcConfig;
use crate::error::KernelError;
use crate::frontier::atomics::{cas_u32, load_all_u32};
use crate::storage::{CsrGraph, NodeId};

use super::structure::component_labels;

const LINK_CHUNK: usize = 16_384;

/// Weakly connected components via Afforest
///
/// Directed graphs are treated as undirected. Every vertex is labelled with
/// the smallest vertex id of its component.
///
/// # Errors
///
/// Returns [`KernelError::InvalidParameter`] if `num_samples` is zero
///
/// # Example
///
/// ```
/// use trueno_gap::{afforest, CcConfig, CsrGraph, NodeId};
///
/// let graph = CsrGraph::from_edge_list_undirected(&[
///     (NodeId(0), NodeId(3), 1),
///     (NodeId(1), NodeId(2), 1),
/// ])
/// .unwrap();
///
/// let comp = afforest(&graph, &CcConfig::default()).unwrap();
/// assert_eq!(comp, vec![NodeId(0), NodeId(1), NodeId(1), NodeId(0)]);
/// ```
pub fn afforest(graph: &CsrGraph, config: &CcConfig) -> Result<Vec<NodeId>, KernelError> {
    config.validate()?;
    let n = graph.num_nodes();
    if n == 0 {
        return Ok(Vec::new());
    }

    let comp: Vec<AtomicU32> = (0..n)
        .into_par_iter()
        .with_min_len(LINK_CHUNK)
        .map(|u| {
            #[allow(clippy::cast_possible_truncation)] // ids fit u32 by construction
            let id = u as u32;
            AtomicU32::new(id)
        })
        .collect();

    // Sparse sampled subgraph: the r-th out-neighbor of every vertex
    for r in 0..config.neighbor_rounds {
        (0..n).into_par_iter().with_min_len(LINK_CHUNK).for_each(|u| {
            if let Some(&v) = graph.out_neigh(u).get(r) {
                #[allow(clippy::cast_possible_truncation)]
                link(u as u32, v, &comp);
            }
        });
        compress(&comp);
    }

    let c = sample_frequent_element(&comp, config);

    (0..n).into_par_iter().with_min_len(LINK_CHUNK).for_each(|u| {
        if comp[u].load(Ordering::Relaxed) == c {
            return;
        }
        #[allow(clippy::cast_possible_truncation)]
        let u32_id = u as u32;
        let out = graph.out_neigh(u);
        for &v in out.get(config.neighbor_rounds..).unwrap_or(&[]) {
            link(u32_id, v, &comp);
        }
        if graph.is_directed() {
            for &v in graph.in_neigh(u) {
                link(u32_id, v, &comp);
            }
        }
    });
    compress(&comp);

    let labels: Vec<NodeId> = load_all_u32(&comp).into_iter().map(NodeId).collect();
    tracing::info!(
        num_nodes = n,
        components = labels.iter().enumerate().filter(|&(u, l)| l.index() == u).count(),
        "afforest complete"
    );
    Ok(labels)
}

/// Merge the trees of `u` and `v`, pointing the higher root at the lower label
fn link(u: u32, v: u32, comp: &[AtomicU32]) {
    let load = |x: u32| comp[x as usize].load(Ordering::Relaxed);
    let mut p1 = load(u);
    let mut p2 = load(v);
    while p1 != p2 {
        let high = p1.max(p2);
        let low = p1.min(p2);
        let p_high = load(high);
        // Already `low`, or this call wrote `low`
        if p_high == low || (p_high == high && cas_u32(&comp[high as usize], high, low)) {
            break;
        }
        p1 = load(load(high));
        p2 = load(low);
    }
}

/// Path halving until every vertex points at its root
fn compress(comp: &[AtomicU32]) {
    comp.par_iter().with_min_len(LINK_CHUNK).for_each(|slot| loop {
        let parent = slot.load(Ordering::Relaxed);
        let grandparent = comp[parent as usize].load(Ordering::Relaxed);
        if parent == grandparent {
            break;
        }
        slot.store(grandparent, Ordering::Relaxed);
    });
}

/// Most frequent label among `num_samples` random vertices (ties go to the
/// smaller label)
fn sample_frequent_element(comp: &[AtomicU32], config: &CcConfig) -> u32 {
    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut counts: HashMap<u32, usize> = HashMap::with_capacity(32);
    for _ in 0..config.num_samples {
        let u = rng.gen_range(0..comp.len());
        *counts.entry(comp[u].load(Ordering::Relaxed)).or_default() += 1;
    }

    let (label, count) = counts
        .into_iter()
        .max_by(|a, b| a.1.cmp(&b.1).then(b.0.cmp(&a.0)))
        .unwrap_or((0, 0));

    #[allow(clippy::cast_precision_loss)] // percentage for logging only
    let share = count as f64 / config.num_samples as f64;
    tracing::debug!(
        component = label,
        percent = (share * 100.0).round(),
        "skipping largest intermediate component"
    );
    label
}

/// Check that `comp` partitions the vertices exactly like the weakly
/// connected components
#[must_use]
pub fn verify_components(graph: &CsrGraph, comp: &[NodeId]) -> bool {
    if comp.len() != graph.num_nodes() {
        tracing::warn!(len = comp.len(), num_nodes = graph.num_nodes(), "label array has wrong length");
        return false;
    }

    let oracle = component_labels(graph);
    let mut oracle_to_label: HashMap<u32, NodeId> = HashMap::new();
    let mut label_to_oracle: HashMap<NodeId, u32> = HashMap::new();

    for (u, (&label, &expected)) in comp.iter().zip(&oracle).enumerate() {
        let seen_label = *oracle_to_label.entry(expected).or_insert(label);
        let seen_oracle = *label_to_oracle.entry(label).or_insert(expected);
        if seen_label != label || seen_oracle != expected {
            tracing::warn!(vertex = u, label = label.0, "component label disagrees with connectivity");
            return false;
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::generator::{kronecker, uniform_random};

    #[test]
    fn test_cc_two_components() {
        let edges = vec![
            (NodeId(0), NodeId(1), 1),
            (NodeId(1), NodeId(2), 1),
            (NodeId(3), NodeId(4), 1),
        ];
        let graph = CsrGraph::from_edge_list_undirected(&edges).unwrap();

        let comp = afforest(&graph, &CcConfig::default()).unwrap();
        assert_eq!(comp, vec![NodeId(0), NodeId(0), NodeId(0), NodeId(3), NodeId(3)]);
        assert!(verify_components(&graph, &comp));
    }

    #[test]
    fn test_cc_isolated_vertices_keep_own_label() {
        let graph = crate::GraphBuilder::new()
            .undirected()
            .num_nodes(4)
            .build(&[(NodeId(1), NodeId(2), 1)])
            .unwrap();

        let comp = afforest(&graph, &CcConfig::default()).unwrap();
        assert_eq!(comp, vec![NodeId(0), NodeId(1), NodeId(1), NodeId(3)]);
    }

    #[test]
    fn test_cc_directed_uses_in_edges() {
        // Only reachable against edge direction: 2 → 0, 3 → 2
        let edges = vec![
            (NodeId(2), NodeId(0), 1),
            (NodeId(3), NodeId(2), 1),
            (NodeId(1), NodeId(4), 1),
        ];
        let graph = CsrGraph::from_edge_list(&edges).unwrap();

        let comp = afforest(&graph, &CcConfig::default()).unwrap();
        assert_eq!(comp, vec![NodeId(0), NodeId(1), NodeId(0), NodeId(0), NodeId(1)]);
        assert!(verify_components(&graph, &comp));
    }

    #[test]
    fn test_cc_no_sampling_rounds() {
        let graph = CsrGraph::from_edge_list_undirected(&uniform_random(8, 2, 4).unwrap()).unwrap();
        let config = CcConfig {
            neighbor_rounds: 0,
            ..CcConfig::default()
        };

        let comp = afforest(&graph, &config).unwrap();
        assert!(verify_components(&graph, &comp));
    }

    #[test]
    fn test_cc_labels_are_component_minimum() {
        let graph = CsrGraph::from_edge_list(&kronecker(10, 4, 9).unwrap()).unwrap();
        let comp = afforest(&graph, &CcConfig::default()).unwrap();

        let expected: Vec<NodeId> = component_labels(&graph).into_iter().map(NodeId).collect();
        assert_eq!(comp, expected);
    }

    #[test]
    fn test_cc_empty_graph() {
        let comp = afforest(&CsrGraph::new(), &CcConfig::default()).unwrap();
        assert!(comp.is_empty());
    }

    #[test]
    fn test_verifier_rejects_merged_components() {
        let edges = vec![(NodeId(0), NodeId(1), 1), (NodeId(2), NodeId(3), 1)];
        let graph = CsrGraph::from_edge_list_undirected(&edges).unwrap();

        let merged = vec![NodeId(0); 4];
        assert!(!verify_components(&graph, &merged));

        let split = vec![NodeId(0), NodeId(1), NodeId(2), NodeId(2)];
        assert!(!verify_components(&graph, &split));

        // Any consistent relabelling is accepted
        let renamed = vec![NodeId(7), NodeId(7), NodeId(9), NodeId(9)];
        assert!(verify_components(&graph, &renamed));
    }
}
