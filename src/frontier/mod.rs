//! Parallel frontier primitives
//!
//! Shared building blocks of the kernels: a bitmap for bottom-up BFS steps,
//! a sliding queue with per-job buffers for top-down frontiers, and atomic
//! helpers for per-vertex state.

pub mod atomics;
pub mod bitmap;
pub mod sliding_queue;

pub use atomics::{AtomicF32, AtomicF64};
pub use bitmap::Bitmap;
pub use sliding_queue::{QueueBuffer, SlidingQueue};
