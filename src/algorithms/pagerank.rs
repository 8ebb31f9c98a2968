//! `PageRank` via pull-direction Gauss–Seidel iteration
//!
//! Based on Page et al. (1999) "The `PageRank` Citation Ranking: Bringing Order to the Web"
//!
//! Each vertex pulls the contributions of its in-neighbors and publishes its
//! own new contribution straight away, so later vertices of the same sweep
//! already see it. Only `u` writes `score[u]`; the contributions are atomic
//! because other workers read them mid-sweep.

use rayon::prelude::*;

use crate::config::PageRankConfig;
use crate::error::KernelError;
use crate::frontier::AtomicF32;
use crate::storage::CsrGraph;

use super::bc::Score;

const PULL_CHUNK: usize = 16_384;

/// Compute `PageRank` scores for all nodes in the graph
///
/// ```text
/// PR(u) = (1-d)/N + d * Σ(PR(v) / outdegree(v))
/// ```
///
/// Stops after the first sweep whose L1 change is below `epsilon`, or after
/// `max_iters` sweeps. Hitting the cap is not an error; the latest scores are
/// returned. Vertices without out-edges contribute nothing.
///
/// # Errors
///
/// Returns [`KernelError::InvalidParameter`] for a damping factor outside
/// `[0, 1]` or a negative epsilon
///
/// # Example
///
/// ```
/// use trueno_gap::{pagerank, CsrGraph, NodeId, PageRankConfig};
///
/// let edges = vec![
///     (NodeId(0), NodeId(1), 1),
///     (NodeId(1), NodeId(2), 1),
///     (NodeId(2), NodeId(0), 1), // Cycle
/// ];
/// let graph = CsrGraph::from_edge_list(&edges).unwrap();
///
/// let scores = pagerank(&graph, &PageRankConfig::default()).unwrap();
/// assert_eq!(scores.len(), 3);
/// assert!((scores.iter().sum::<f32>() - 1.0).abs() < 1e-5); // Sum = 1.0
/// ```
#[allow(clippy::cast_precision_loss)] // Graphs >16M nodes unlikely
pub fn pagerank(graph: &CsrGraph, config: &PageRankConfig) -> Result<Vec<Score>, KernelError> {
    config.validate()?;
    let n = graph.num_nodes();
    if n == 0 {
        return Ok(Vec::new());
    }

    let damping = config.damping;
    let init_score = 1.0 / n as f32;
    let base_score = (1.0 - damping) / n as f32;

    let mut scores = vec![init_score; n];
    let contrib: Vec<AtomicF32> = (0..n)
        .into_par_iter()
        .with_min_len(PULL_CHUNK)
        .map(|u| AtomicF32::new(share(init_score, graph.out_degree(u))))
        .collect();

    let mut iters = 0;
    let mut error = f64::INFINITY;
    while iters < config.max_iters {
        error = scores
            .par_iter_mut()
            .enumerate()
            .with_min_len(PULL_CHUNK)
            .map(|(u, score)| {
                let incoming: f32 = graph
                    .in_neigh(u)
                    .iter()
                    .map(|&v| contrib[v as usize].load())
                    .sum();
                let old = *score;
                *score = base_score + damping * incoming;
                contrib[u].store(share(*score, graph.out_degree(u)));
                f64::from((*score - old).abs())
            })
            .sum();
        iters += 1;
        tracing::debug!(iteration = iters, error, "pagerank sweep");
        if error < config.epsilon {
            break;
        }
    }

    tracing::info!(
        num_nodes = n,
        iterations = iters,
        error,
        converged = error < config.epsilon,
        "pagerank complete"
    );
    Ok(scores)
}

#[allow(clippy::cast_precision_loss)]
fn share(score: f32, out_degree: usize) -> f32 {
    if out_degree == 0 {
        0.0
    } else {
        score / out_degree as f32
    }
}

/// Check scores against one serial push-direction power iteration
///
/// Recomputes every score from `scores` and accepts when the total absolute
/// change stays below `target_error`.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn verify_pagerank(
    graph: &CsrGraph,
    config: &PageRankConfig,
    scores: &[Score],
    target_error: f64,
) -> bool {
    let n = graph.num_nodes();
    if scores.len() != n {
        tracing::warn!(len = scores.len(), num_nodes = n, "score array has wrong length");
        return false;
    }
    if n == 0 {
        return true;
    }

    let base_score = (1.0 - config.damping) / n as f32;
    let mut incoming = vec![0.0_f32; n];
    for (u, &score) in scores.iter().enumerate() {
        let contribution = share(score, graph.out_degree(u));
        for &v in graph.out_neigh(u) {
            incoming[v as usize] += contribution;
        }
    }

    let error: f64 = incoming
        .iter()
        .zip(scores)
        .map(|(&sum, &score)| f64::from((base_score + config.damping * sum - score).abs()))
        .sum();
    if error < target_error {
        true
    } else {
        tracing::warn!(error, target_error, "pagerank scores are not a fixed point");
        false
    }
}
