//! Kernel precondition errors
//!
//! Kernels reject bad input before any parallel work starts. Numeric edge cases
//! (unreachable vertices, degree-zero vertices) and `PageRank` non-convergence are
//! not errors.

use thiserror::Error;

/// Precondition violations reported by the graph kernels
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KernelError {
    /// Source vertex is not a vertex of the graph
    #[error("source vertex {vertex} out of bounds for graph with {num_nodes} vertices")]
    SourceOutOfBounds {
        /// Requested source
        vertex: u32,
        /// Number of vertices in the graph
        num_nodes: usize,
    },

    /// Kernel requires an undirected graph
    #[error("input graph is directed but the kernel requires an undirected graph")]
    DirectedGraph,

    /// Neighbor list is not strictly ascending or contains a self-loop
    #[error("neighbors of vertex {vertex} are not sorted, unique and loop-free")]
    UnsortedNeighbors {
        /// First offending vertex
        vertex: u32,
    },

    /// Numeric parameter outside its valid range
    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter {
        /// Parameter name
        name: &'static str,
        /// Why it was rejected
        reason: String,
    },
}

impl KernelError {
    pub(crate) fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }
}
