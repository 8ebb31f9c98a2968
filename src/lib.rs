//! trueno-gap: shared-memory parallel graph kernels
//!
//! # Overview
//!
//! trueno-gap runs the GAP benchmark kernels over an immutable CSR graph using
//! every core of one machine: direction-optimizing BFS, delta-stepping SSSP,
//! Afforest connected components, Brandes betweenness centrality,
//! Gauss–Seidel `PageRank` and ordered triangle counting. Every kernel has a
//! matching serial verifier.
//!
//! # Quick Start
//!
//! ```
//! use trueno_gap::{direction_optimizing_bfs, verify_bfs_tree, BfsConfig, CsrGraph, NodeId};
//!
//! // Build graph from edge list
//! let graph = CsrGraph::from_edge_list_undirected(&[
//!     (NodeId(0), NodeId(1), 1),
//!     (NodeId(1), NodeId(2), 1),
//!     (NodeId(0), NodeId(3), 1),
//! ])?;
//!
//! let parent = direction_optimizing_bfs(&graph, NodeId(0), &BfsConfig::default())?;
//! assert_eq!(parent[2], Some(NodeId(1)));
//! assert!(verify_bfs_tree(&graph, NodeId(0), &parent));
//! # Ok::<(), trueno_gap::Error>(())
//! ```
//!
//! # Architecture
//!
//! - **Storage**: forward and reverse CSR, builders, generators, Parquet persistence
//! - **Frontier**: atomic bitmap, sliding queue with per-job buffers, atomic floats
//! - **Algorithms**: parallel kernels on the ambient `rayon` pool, plus serial oracles
//! - **Config**: serde-loadable per-kernel parameters

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod algorithms;
pub mod config;
pub mod error;
pub mod frontier;
pub mod storage;

// Re-export core types
pub use algorithms::{
    afforest, bc_sources, betweenness_centrality, bfs_depths, brandes, component_labels,
    connected_components, delta_stepping, dijkstra, direction_optimizing_bfs, ordered_count,
    pagerank, triangle_count, verify_betweenness, verify_bfs_tree, verify_components,
    verify_pagerank, verify_sssp, verify_triangle_count, worth_relabelling, Score, SourcePicker,
    DIST_INF,
};
pub use config::{BcConfig, BcSources, BfsConfig, CcConfig, PageRankConfig, SsspConfig};
pub use error::KernelError;
pub use storage::{CsrGraph, GraphBuilder, NodeId, Weight};

// Error type
pub use anyhow::{Error, Result};
