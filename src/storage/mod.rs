//! Graph storage layer
//!
//! Provides CSR (Compressed Sparse Row) graph representation, edge-list
//! construction, synthetic generators and Parquet persistence.

pub mod builder;
pub mod csr;
pub mod generator;
#[cfg(feature = "storage")]
pub mod parquet;

pub use builder::GraphBuilder;
pub use csr::{CsrGraph, NodeId, Weight};
