//! Direction-optimizing breadth-first search
//!
//! Based on Beamer, Asanović & Patterson, "Direction-Optimizing Breadth-First
//! Search" (SC 2012).
//!
//! Top-down steps expand a [`SlidingQueue`] frontier by claiming unvisited
//! out-neighbors with a CAS on `parent`. Bottom-up steps scan every unvisited
//! vertex for an in-neighbor in the [`Bitmap`] frontier. The switch is driven
//! by edge counts, which is why `parent` starts out as `-out_degree(v)`:
//!
//! ```text
//! parent[v] < 0   unvisited, parent[v] = -out_degree(v)  (-1 for degree 0)
//! parent[v] >= 0  visited, parent[v] is the tree parent
//! ```
//!
//! Top-down to bottom-up when `scout_count > edges_to_check / alpha`; stay
//! bottom-up while the frontier keeps growing or exceeds `num_nodes / beta`.

use rayon::prelude::*;
use std::sync::atomic::{AtomicI64, Ordering};

use crate::config::BfsConfig;
use crate::error::KernelError;
use crate::frontier::atomics::cas_i64;
use crate::frontier::{Bitmap, QueueBuffer, SlidingQueue};
use crate::storage::{CsrGraph, NodeId};

use super::traversal::bfs_depths;

const TOP_DOWN_CHUNK: usize = 64;
const BOTTOM_UP_CHUNK: usize = 1024;
const INIT_CHUNK: usize = 16_384;

/// Parallel BFS returning the parent of every vertex in a BFS tree
///
/// `parent[source] == Some(source)`; unreachable vertices are `None`. The
/// depth of every vertex in the tree is deterministic, the chosen parent among
/// equally deep in-neighbors is not.
///
/// # Errors
///
/// Returns [`KernelError::SourceOutOfBounds`] for a bad source and
/// [`KernelError::InvalidParameter`] for zero thresholds
///
/// # Example
///
/// ```
/// use trueno_gap::{direction_optimizing_bfs, BfsConfig, CsrGraph, NodeId};
///
/// let graph = CsrGraph::from_edge_list(&[
///     (NodeId(0), NodeId(1), 1),
///     (NodeId(1), NodeId(2), 1),
/// ])
/// .unwrap();
///
/// let parent = direction_optimizing_bfs(&graph, NodeId(0), &BfsConfig::default()).unwrap();
/// assert_eq!(parent, vec![Some(NodeId(0)), Some(NodeId(0)), Some(NodeId(1))]);
/// ```
pub fn direction_optimizing_bfs(
    graph: &CsrGraph,
    source: NodeId,
    config: &BfsConfig,
) -> Result<Vec<Option<NodeId>>, KernelError> {
    config.validate()?;
    let n = graph.num_nodes();
    if source.index() >= n {
        return Err(KernelError::SourceOutOfBounds {
            vertex: source.0,
            num_nodes: n,
        });
    }

    let parent = init_parent(graph);
    parent[source.index()].store(i64::from(source.0), Ordering::Relaxed);

    let mut queue = SlidingQueue::with_capacity(n);
    queue.push_back(source.0);
    queue.slide_window();

    let mut curr = Bitmap::new(n);
    let mut front = Bitmap::new(n);

    let alpha = i64::from(config.alpha);
    let beta = config.beta as usize;
    #[allow(clippy::cast_possible_wrap)] // arc counts stay far below i64::MAX
    let mut edges_to_check = graph.num_edges_directed() as i64;
    #[allow(clippy::cast_possible_wrap)]
    let mut scout_count = graph.out_degree(source.index()) as i64;
    let mut levels = 0_usize;

    while !queue.is_empty() {
        if scout_count > edges_to_check / alpha {
            queue_to_bitmap(&queue, &mut front);
            tracing::debug!(step = "e", frontier = queue.len(), "queue to bitmap");
            let mut awake_count = queue.len();
            queue.slide_window();

            loop {
                let old_awake_count = awake_count;
                awake_count = bottom_up_step(graph, &parent, &front, &mut curr);
                front.swap(&mut curr);
                levels += 1;
                tracing::debug!(step = "bu", awake = awake_count, "bottom-up step");
                if awake_count < old_awake_count && awake_count <= n / beta {
                    break;
                }
            }

            bitmap_to_queue(n, &front, &mut queue);
            tracing::debug!(step = "c", frontier = queue.len(), "bitmap to queue");
            scout_count = 1;
        } else {
            edges_to_check -= scout_count;
            scout_count = top_down_step(graph, &parent, &mut queue);
            levels += 1;
            tracing::debug!(step = "td", frontier = queue.len(), scout_count, "top-down step");
        }
    }

    let tree: Vec<Option<NodeId>> = parent
        .par_iter()
        .with_min_len(INIT_CHUNK)
        .map(|p| u32::try_from(p.load(Ordering::Relaxed)).ok().map(NodeId))
        .collect();

    tracing::info!(
        source = source.0,
        levels,
        reached = tree.iter().filter(|p| p.is_some()).count(),
        "bfs complete"
    );
    Ok(tree)
}

fn init_parent(graph: &CsrGraph) -> Vec<AtomicI64> {
    (0..graph.num_nodes())
        .into_par_iter()
        .with_min_len(INIT_CHUNK)
        .map(|u| {
            let degree = graph.out_degree(u);
            #[allow(clippy::cast_possible_wrap)] // degrees stay far below i64::MAX
            let encoded = if degree == 0 { -1 } else { -(degree as i64) };
            AtomicI64::new(encoded)
        })
        .collect()
}

/// Expand the queue window; returns the out-degree sum of newly claimed
/// vertices. The new frontier is visible after the slide.
fn top_down_step(graph: &CsrGraph, parent: &[AtomicI64], queue: &mut SlidingQueue) -> i64 {
    let shared = &*queue;
    let scout_count = shared
        .par_window()
        .with_min_len(TOP_DOWN_CHUNK)
        .map_init(
            || QueueBuffer::new(shared),
            |buffer, u| {
                let mut scout = 0;
                for &v in graph.out_neigh(u as usize) {
                    let curr = parent[v as usize].load(Ordering::Relaxed);
                    if curr < 0 && cas_i64(&parent[v as usize], curr, i64::from(u)) {
                        buffer.push_back(v);
                        scout -= curr;
                    }
                }
                scout
            },
        )
        .sum::<i64>();
    queue.slide_window();
    scout_count
}

/// Adopt a frontier in-neighbor for every unvisited vertex; returns the
/// number of vertices woken
fn bottom_up_step(graph: &CsrGraph, parent: &[AtomicI64], front: &Bitmap, next: &mut Bitmap) -> usize {
    next.reset();
    let next = &*next;
    (0..graph.num_nodes())
        .into_par_iter()
        .with_min_len(BOTTOM_UP_CHUNK)
        .filter(|&u| {
            if parent[u].load(Ordering::Relaxed) >= 0 {
                return false;
            }
            match graph.in_neigh(u).iter().find(|&&v| front.get_bit(v as usize)) {
                Some(&v) => {
                    parent[u].store(i64::from(v), Ordering::Relaxed);
                    next.set_bit_atomic(u);
                    true
                }
                None => false,
            }
        })
        .count()
}

fn queue_to_bitmap(queue: &SlidingQueue, bitmap: &mut Bitmap) {
    bitmap.reset();
    let bitmap = &*bitmap;
    queue.par_window().for_each(|u| bitmap.set_bit_atomic(u as usize));
}

fn bitmap_to_queue(num_nodes: usize, bitmap: &Bitmap, queue: &mut SlidingQueue) {
    let shared = &*queue;
    (0..num_nodes)
        .into_par_iter()
        .with_min_len(BOTTOM_UP_CHUNK)
        .for_each_init(
            || QueueBuffer::new(shared),
            |buffer, u| {
                if bitmap.get_bit(u) {
                    #[allow(clippy::cast_possible_truncation)] // ids fit u32 by construction
                    buffer.push_back(u as u32);
                }
            },
        );
    queue.slide_window();
}

/// Check a BFS tree against a serial BFS
///
/// Every reached vertex other than `source` must have a parent that is one of
/// its in-neighbors exactly one level closer to `source`; `source` must be its
/// own parent; reachability must match exactly.
#[must_use]
pub fn verify_bfs_tree(graph: &CsrGraph, source: NodeId, parent: &[Option<NodeId>]) -> bool {
    if parent.len() != graph.num_nodes() {
        tracing::warn!(len = parent.len(), num_nodes = graph.num_nodes(), "parent array has wrong length");
        return false;
    }
    let Ok(depths) = bfs_depths(graph, source) else {
        tracing::warn!(source = source.0, "source out of bounds");
        return false;
    };

    let mut ok = true;
    for (u, (&depth, &p)) in depths.iter().zip(parent).enumerate() {
        match (depth, p) {
            (Some(_), Some(p)) if u == source.index() => {
                if p != source {
                    tracing::warn!(source = source.0, parent = p.0, "source is not its own parent");
                    ok = false;
                }
            }
            (Some(d), Some(p)) => {
                let is_in_neighbor = graph.in_neigh(u).contains(&p.0);
                let parent_depth = depths.get(p.index()).copied().flatten();
                if !is_in_neighbor || parent_depth != d.checked_sub(1) {
                    tracing::warn!(vertex = u, parent = p.0, depth = d, "parent is not an in-neighbor one level up");
                    ok = false;
                }
            }
            (None, None) => {}
            _ => {
                tracing::warn!(vertex = u, "reachability mismatch");
                ok = false;
            }
        }
    }
    ok
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::generator::kronecker;

    fn tree_depths(parent: &[Option<NodeId>], source: NodeId) -> Vec<Option<u32>> {
        (0..parent.len())
            .map(|u| {
                let mut depth = 0;
                let mut v = u;
                loop {
                    let p = parent[v]?;
                    if v == source.index() {
                        return Some(depth);
                    }
                    v = p.index();
                    depth += 1;
                }
            })
            .collect()
    }

    #[test]
    fn test_bfs_path() {
        let edges = vec![
            (NodeId(0), NodeId(1), 1),
            (NodeId(1), NodeId(2), 1),
            (NodeId(2), NodeId(3), 1),
        ];
        let graph = CsrGraph::from_edge_list(&edges).unwrap();

        let parent = direction_optimizing_bfs(&graph, NodeId(0), &BfsConfig::default()).unwrap();
        assert_eq!(
            parent,
            vec![Some(NodeId(0)), Some(NodeId(0)), Some(NodeId(1)), Some(NodeId(2))]
        );
        assert!(verify_bfs_tree(&graph, NodeId(0), &parent));
    }

    #[test]
    fn test_bfs_unreachable_and_isolated() {
        // 0 → 1, 2 → 0, 3 isolated
        let edges = vec![(NodeId(0), NodeId(1), 1), (NodeId(2), NodeId(0), 1)];
        let graph = crate::GraphBuilder::new().num_nodes(4).build(&edges).unwrap();

        let parent = direction_optimizing_bfs(&graph, NodeId(0), &BfsConfig::default()).unwrap();
        assert_eq!(parent, vec![Some(NodeId(0)), Some(NodeId(0)), None, None]);
        assert!(verify_bfs_tree(&graph, NodeId(0), &parent));
    }

    #[test]
    fn test_bfs_source_without_edges() {
        let graph = crate::GraphBuilder::new()
            .num_nodes(3)
            .build(&[(NodeId(0), NodeId(1), 1)])
            .unwrap();
        let parent = direction_optimizing_bfs(&graph, NodeId(2), &BfsConfig::default()).unwrap();
        assert_eq!(parent, vec![None, None, Some(NodeId(2))]);
    }

    #[test]
    fn test_bfs_bad_source() {
        let graph = CsrGraph::from_edge_list(&[(NodeId(0), NodeId(1), 1)]).unwrap();
        let err = direction_optimizing_bfs(&graph, NodeId(2), &BfsConfig::default()).unwrap_err();
        assert_eq!(err, KernelError::SourceOutOfBounds { vertex: 2, num_nodes: 2 });
    }

    #[test]
    fn test_bfs_bottom_up_matches_top_down_depths() {
        let graph = CsrGraph::from_edge_list_undirected(&kronecker(10, 8, 5).unwrap()).unwrap();
        let hub = (0..graph.num_nodes()).max_by_key(|&u| graph.out_degree(u)).unwrap();
        let source = NodeId(u32::try_from(hub).unwrap());

        // A huge alpha switches to bottom-up at once; alpha = 1 never does
        let eager = BfsConfig { alpha: u32::MAX, beta: 18 };
        let lazy = BfsConfig { alpha: 1, beta: 18 };

        let bottom_up = direction_optimizing_bfs(&graph, source, &eager).unwrap();
        let top_down = direction_optimizing_bfs(&graph, source, &lazy).unwrap();

        assert!(verify_bfs_tree(&graph, source, &bottom_up));
        assert!(verify_bfs_tree(&graph, source, &top_down));
        assert_eq!(tree_depths(&bottom_up, source), tree_depths(&top_down, source));
        assert_eq!(tree_depths(&top_down, source), bfs_depths(&graph, source).unwrap());
    }

    #[test]
    fn test_bfs_directed_bottom_up_uses_in_edges() {
        // Directed star: 0 → 1..50, 1..50 → 51
        let mut edges: Vec<_> = (1..=50).map(|i| (NodeId(0), NodeId(i), 1)).collect();
        edges.extend((1..=50).map(|i| (NodeId(i), NodeId(51), 1)));
        let graph = CsrGraph::from_edge_list(&edges).unwrap();

        let parent = direction_optimizing_bfs(&graph, NodeId(0), &BfsConfig { alpha: u32::MAX, beta: 1 }).unwrap();
        assert!(verify_bfs_tree(&graph, NodeId(0), &parent));
        assert!(parent[51].is_some_and(|p| (1..=50).contains(&p.0)));
    }

    #[test]
    fn test_verifier_rejects_bad_parent() {
        let edges = vec![
            (NodeId(0), NodeId(1), 1),
            (NodeId(1), NodeId(2), 1),
            (NodeId(0), NodeId(2), 1),
        ];
        let graph = CsrGraph::from_edge_list(&edges).unwrap();

        // 2 is one hop from 0, so parent 1 is a level too deep
        let wrong = vec![Some(NodeId(0)), Some(NodeId(0)), Some(NodeId(1))];
        assert!(!verify_bfs_tree(&graph, NodeId(0), &wrong));

        let missing = vec![Some(NodeId(0)), Some(NodeId(0)), None];
        assert!(!verify_bfs_tree(&graph, NodeId(0), &missing));
    }
}
