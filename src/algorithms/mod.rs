//! Graph kernels (BFS, SSSP, connected components, betweenness, `PageRank`,
//! triangle counting)
//!
//! Each parallel kernel comes with a `verify_*` function that checks its
//! output against an independent serial algorithm from `traversal`,
//! `shortest_path` or `structure`.

pub mod bc;
pub mod bfs;
pub mod cc;
pub mod pagerank;
pub mod shortest_path;
pub mod source;
pub mod sssp;
pub mod structure;
pub mod tc;
pub mod traversal;

pub use bc::{bc_sources, betweenness_centrality, brandes, verify_betweenness, Score};
pub use bfs::{direction_optimizing_bfs, verify_bfs_tree};
pub use cc::{afforest, verify_components};
pub use pagerank::{pagerank, verify_pagerank};
pub use shortest_path::dijkstra;
pub use source::SourcePicker;
pub use sssp::{delta_stepping, verify_sssp, DIST_INF};
pub use structure::{component_labels, connected_components};
pub use tc::{ordered_count, triangle_count, verify_triangle_count, worth_relabelling};
pub use traversal::bfs_depths;
