//! Parallel Brandes betweenness centrality
//!
//! Based on Brandes, "A faster algorithm for betweenness centrality"
//! (J. Math. Sociology 2001), with the level-synchronous parallel formulation
//! of Madduri et al. (IPDPS 2009).
//!
//! Per source:
//!
//! 1. Parallel BFS counting shortest paths. An arc `u → v` with
//!    `depth[v] == depth[u] + 1` is a *successor* arc; its position in the CSR
//!    is marked in a bitmap and `path_counts[v] += path_counts[u]`. The queue
//!    position where each level starts is kept in `depth_index`.
//! 2. Back-propagation from the farthest level to the source:
//!    `delta[u] = Σ (path_counts[u] / path_counts[v]) · (1 + delta[v])` over
//!    successor arcs, and `score[u] += delta[u]`.
//!
//! Scores are normalized by the largest one at the end. Path counts are `f64`
//! holding integers, so their accumulation order never changes the result.

use rayon::prelude::*;
use std::sync::atomic::{AtomicI32, Ordering};

use crate::config::{BcConfig, BcSources};
use crate::error::KernelError;
use crate::frontier::atomics::atomic_vec_i32;
use crate::frontier::{AtomicF32, AtomicF64, Bitmap, QueueBuffer, SlidingQueue};
use crate::storage::{CsrGraph, NodeId};

use super::source::SourcePicker;
use super::traversal::bfs_depths;

/// Centrality score
pub type Score = f32;

const LEVEL_CHUNK: usize = 64;

/// Betweenness centrality with sources chosen by `config`
///
/// # Errors
///
/// Returns [`KernelError::InvalidParameter`] for an empty sample and
/// [`KernelError::SourceOutOfBounds`] for a bad fixed source
pub fn betweenness_centrality(graph: &CsrGraph, config: &BcConfig) -> Result<Vec<Score>, KernelError> {
    let sources = bc_sources(graph, config)?;
    brandes(graph, &sources)
}

/// Resolve the source list `config` describes
///
/// Sampling draws from vertices with non-zero out-degree; on a graph without
/// edges it yields no sources.
///
/// # Errors
///
/// Returns [`KernelError::InvalidParameter`] for an empty sample
pub fn bc_sources(graph: &CsrGraph, config: &BcConfig) -> Result<Vec<NodeId>, KernelError> {
    config.validate()?;
    Ok(match &config.sources {
        BcSources::All => (0..graph.num_nodes())
            .filter_map(|u| u32::try_from(u).ok().map(NodeId))
            .collect(),
        BcSources::Sampled { count, seed } => {
            let mut picker = SourcePicker::new(graph, None, *seed);
            (0..*count).map_while(|_| picker.pick_next()).collect()
        }
        BcSources::Fixed(sources) => sources.clone(),
    })
}

/// Accumulate Brandes dependencies from every source in `sources`
///
/// Returns scores in `[0, 1]` with the maximum at exactly 1, or all zeros when
/// no vertex lies on a shortest path.
///
/// # Errors
///
/// Returns [`KernelError::SourceOutOfBounds`] if any source is not a vertex
///
/// # Example
///
/// ```
/// use trueno_gap::{brandes, CsrGraph, NodeId};
///
/// // Path 0 - 1 - 2: the middle vertex carries every shortest path
/// let graph = CsrGraph::from_edge_list_undirected(&[
///     (NodeId(0), NodeId(1), 1),
///     (NodeId(1), NodeId(2), 1),
/// ])
/// .unwrap();
///
/// let sources = [NodeId(0), NodeId(1), NodeId(2)];
/// let scores = brandes(&graph, &sources).unwrap();
/// assert_eq!(scores[1], 1.0);
/// ```
pub fn brandes(graph: &CsrGraph, sources: &[NodeId]) -> Result<Vec<Score>, KernelError> {
    let n = graph.num_nodes();
    if let Some(bad) = sources.iter().find(|s| s.index() >= n) {
        return Err(KernelError::SourceOutOfBounds {
            vertex: bad.0,
            num_nodes: n,
        });
    }

    let scores: Vec<AtomicF32> = (0..n).map(|_| AtomicF32::new(0.0)).collect();
    let deltas: Vec<AtomicF32> = (0..n).map(|_| AtomicF32::new(0.0)).collect();
    let path_counts: Vec<AtomicF64> = (0..n).map(|_| AtomicF64::new(0.0)).collect();
    let mut succ = Bitmap::new(graph.num_edges_directed());
    let mut queue = SlidingQueue::with_capacity(n);
    let mut depth_index = Vec::new();

    for &source in sources {
        path_counts.par_iter().for_each(|pc| pc.store(0.0));
        depth_index.clear();
        queue.reset();
        succ.reset();

        path_counts_bfs(graph, source, &path_counts, &succ, &mut depth_index, &mut queue);
        tracing::debug!(source = source.0, levels = depth_index.len() - 1, "path counting done");

        deltas.par_iter().for_each(|d| d.store(0.0));
        for level in depth_index.windows(2).rev() {
            queue
                .par_range(level[0], level[1])
                .with_min_len(LEVEL_CHUNK)
                .for_each(|u| {
                    let u = u as usize;
                    let pc_u = path_counts[u].load();
                    let mut delta_u: Score = 0.0;
                    for (e, &v) in graph.out_edge_range(u).zip(graph.out_neigh(u)) {
                        if succ.get_bit(e) {
                            let ratio = pc_u / path_counts[v as usize].load();
                            delta_u = dependency(delta_u, ratio, deltas[v as usize].load());
                        }
                    }
                    deltas[u].store(delta_u);
                    scores[u].store(scores[u].load() + delta_u);
                });
        }
    }

    let scores: Vec<Score> = scores.iter().map(AtomicF32::load).collect();
    let normalized = normalize(scores);
    tracing::info!(num_sources = sources.len(), num_nodes = n, "betweenness complete");
    Ok(normalized)
}

/// `delta_u + ratio · (1 + delta_v)`, evaluated in `f64` and stored as `f32`
#[inline]
#[allow(clippy::cast_possible_truncation)] // scores are f32 by contract
fn dependency(delta_u: Score, ratio: f64, delta_v: Score) -> Score {
    (f64::from(delta_u) + ratio * (1.0 + f64::from(delta_v))) as Score
}

fn normalize(mut scores: Vec<Score>) -> Vec<Score> {
    let biggest = scores.iter().copied().fold(0.0, Score::max);
    if biggest > 0.0 {
        for score in &mut scores {
            *score /= biggest;
        }
    }
    scores
}

/// Level-synchronous BFS from `source` marking successor arcs and counting
/// shortest paths
///
/// On return `depth_index[d]..depth_index[d + 1]` are the queue positions of
/// the vertices at depth `d`.
fn path_counts_bfs(
    graph: &CsrGraph,
    source: NodeId,
    path_counts: &[AtomicF64],
    succ: &Bitmap,
    depth_index: &mut Vec<usize>,
    queue: &mut SlidingQueue,
) {
    let depths: Vec<AtomicI32> = atomic_vec_i32(graph.num_nodes(), -1);
    depths[source.index()].store(0, Ordering::Relaxed);
    path_counts[source.index()].store(1.0);
    queue.push_back(source.0);
    queue.slide_window();

    let mut depth = 0;
    while !queue.is_empty() {
        depth_index.push(queue.window_start());
        depth += 1;
        let shared = &*queue;
        shared
            .par_window()
            .with_min_len(LEVEL_CHUNK)
            .for_each_init(
                || QueueBuffer::new(shared),
                |buffer, u| {
                    let u = u as usize;
                    for (e, &v) in graph.out_edge_range(u).zip(graph.out_neigh(u)) {
                        let slot = &depths[v as usize];
                        if slot.load(Ordering::Relaxed) == -1
                            && slot
                                .compare_exchange(-1, depth, Ordering::Relaxed, Ordering::Relaxed)
                                .is_ok()
                        {
                            buffer.push_back(v);
                        }
                        if slot.load(Ordering::Relaxed) == depth {
                            succ.set_bit_atomic(e);
                            path_counts[v as usize].fetch_add(path_counts[u].load());
                        }
                    }
                },
            );
        queue.slide_window();
    }
    depth_index.push(queue.window_start());
}

/// Check scores against a serial Brandes over the same sources
///
/// Accepts a per-vertex difference up to `f32::EPSILON`.
#[must_use]
pub fn verify_betweenness(graph: &CsrGraph, sources: &[NodeId], scores: &[Score]) -> bool {
    let n = graph.num_nodes();
    if scores.len() != n {
        tracing::warn!(len = scores.len(), num_nodes = n, "score array has wrong length");
        return false;
    }

    let mut expected: Vec<Score> = vec![0.0; n];
    for &source in sources {
        let Ok(depths) = bfs_depths(graph, source) else {
            tracing::warn!(source = source.0, "source out of bounds");
            return false;
        };

        let mut verts_at_depth: Vec<Vec<usize>> = Vec::new();
        for (u, depth) in depths.iter().enumerate() {
            if let Some(d) = depth {
                let d = *d as usize;
                if d >= verts_at_depth.len() {
                    verts_at_depth.resize_with(d + 1, Vec::new);
                }
                verts_at_depth[d].push(u);
            }
        }

        let mut path_counts = vec![0.0_f64; n];
        path_counts[source.index()] = 1.0;
        for level in &verts_at_depth {
            for &u in level {
                for &v in graph.out_neigh(u) {
                    if is_successor(&depths, u, v as usize) {
                        path_counts[v as usize] += path_counts[u];
                    }
                }
            }
        }

        let mut deltas: Vec<Score> = vec![0.0; n];
        for level in verts_at_depth.iter().rev() {
            for &u in level {
                for &v in graph.out_neigh(u) {
                    let v = v as usize;
                    if is_successor(&depths, u, v) {
                        deltas[u] = dependency(deltas[u], path_counts[u] / path_counts[v], deltas[v]);
                    }
                }
                expected[u] += deltas[u];
            }
        }
    }
    let expected = normalize(expected);

    let mut ok = true;
    for (u, (&got, &want)) in scores.iter().zip(&expected).enumerate() {
        if (got - want).abs() > Score::EPSILON {
            tracing::warn!(vertex = u, got, want, "betweenness mismatch");
            ok = false;
        }
    }
    ok
}

fn is_successor(depths: &[Option<u32>], u: usize, v: usize) -> bool {
    matches!((depths[u], depths[v]), (Some(du), Some(dv)) if dv == du + 1)
}
