//! Double-buffered frontier queue
//!
//! One shared array holds every vertex ever enqueued. The *window*
//! `[window_start, window_end)` is the current frontier; appends land past
//! `window_end` and become the next frontier on [`SlidingQueue::slide_window`].
//!
//! Workers never append one vertex at a time. Each rayon job owns a
//! [`QueueBuffer`] that batches pushes locally and reserves space in the
//! shared array with a single `fetch_add` per flush.
//!
//! ```text
//! shared:  [ 0 | 4 7 2 | 9 5 ... ]
//!                ^window  ^appended (next frontier)
//! ```

use crossbeam_utils::CachePadded;
use rayon::prelude::*;
use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};

/// Local batch size of a [`QueueBuffer`]
pub const LOCAL_BUFFER_CAPACITY: usize = 16_384;

/// Frontier queue with a sliding read window
#[derive(Debug)]
pub struct SlidingQueue {
    shared: Box<[AtomicU32]>,
    shared_in: CachePadded<AtomicUsize>,
    window_start: usize,
    window_end: usize,
}

impl SlidingQueue {
    /// Empty queue able to hold `capacity` vertices between resets
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            shared: (0..capacity).map(|_| AtomicU32::new(0)).collect(),
            shared_in: CachePadded::new(AtomicUsize::new(0)),
            window_start: 0,
            window_end: 0,
        }
    }

    /// Total slots available between resets
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.shared.len()
    }

    /// Append `v` with exclusive access
    pub fn push_back(&mut self, v: u32) {
        let slot = self.shared_in.get_mut();
        *self.shared[*slot].get_mut() = v;
        *slot += 1;
    }

    /// Append a batch from any thread
    ///
    /// Space is reserved with one `fetch_add`; the caller guarantees the
    /// queue has capacity for everything appended before the next reset.
    pub fn append(&self, items: &[u32]) {
        if items.is_empty() {
            return;
        }
        let start = self.shared_in.fetch_add(items.len(), Ordering::Relaxed);
        for (slot, &v) in self.shared[start..start + items.len()].iter().zip(items) {
            slot.store(v, Ordering::Relaxed);
        }
    }

    /// Make everything appended since the last slide the new window
    pub fn slide_window(&mut self) {
        self.window_start = self.window_end;
        self.window_end = *self.shared_in.get_mut();
    }

    /// Drop all contents
    pub fn reset(&mut self) {
        *self.shared_in.get_mut() = 0;
        self.window_start = 0;
        self.window_end = 0;
    }

    /// Grow to at least `capacity` slots, keeping contents
    pub fn ensure_capacity(&mut self, capacity: usize) {
        if capacity <= self.shared.len() {
            return;
        }
        let used = *self.shared_in.get_mut();
        let mut grown: Vec<AtomicU32> = Vec::with_capacity(capacity);
        grown.extend(self.shared[..used].iter_mut().map(|v| AtomicU32::new(*v.get_mut())));
        grown.extend((used..capacity).map(|_| AtomicU32::new(0)));
        self.shared = grown.into_boxed_slice();
    }

    /// Whether the current window is empty
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.window_start == self.window_end
    }

    /// Size of the current window
    #[must_use]
    pub const fn len(&self) -> usize {
        self.window_end - self.window_start
    }

    /// First position of the current window
    #[must_use]
    pub const fn window_start(&self) -> usize {
        self.window_start
    }

    /// One past the last position of the current window
    #[must_use]
    pub const fn window_end(&self) -> usize {
        self.window_end
    }

    /// Vertex at absolute queue position `pos`
    #[inline]
    #[must_use]
    pub fn get(&self, pos: usize) -> u32 {
        self.shared[pos].load(Ordering::Relaxed)
    }

    /// Current window, serially
    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        self.shared[self.window_start..self.window_end]
            .iter()
            .map(|v| v.load(Ordering::Relaxed))
    }

    /// Current window, in parallel
    pub fn par_window(&self) -> impl IndexedParallelIterator<Item = u32> + '_ {
        self.par_range(self.window_start, self.window_end)
    }

    /// Absolute positions `[start, end)`, in parallel
    pub fn par_range(&self, start: usize, end: usize) -> impl IndexedParallelIterator<Item = u32> + '_ {
        self.shared[start..end]
            .par_iter()
            .map(|v| v.load(Ordering::Relaxed))
    }
}

/// Per-job batching buffer in front of a [`SlidingQueue`]
///
/// Flushes when full and on drop, so everything pushed inside a rayon
/// `for_each_init` reaches the shared queue before the parallel loop returns.
#[derive(Debug)]
pub struct QueueBuffer<'a> {
    queue: &'a SlidingQueue,
    local: Vec<u32>,
}

impl<'a> QueueBuffer<'a> {
    /// Buffer feeding `queue`
    #[must_use]
    pub fn new(queue: &'a SlidingQueue) -> Self {
        Self {
            queue,
            local: Vec::with_capacity(LOCAL_BUFFER_CAPACITY),
        }
    }

    /// Stage `v` for the shared queue
    #[inline]
    pub fn push_back(&mut self, v: u32) {
        if self.local.len() == LOCAL_BUFFER_CAPACITY {
            self.flush();
        }
        self.local.push(v);
    }

    /// Publish everything staged so far
    pub fn flush(&mut self) {
        self.queue.append(&self.local);
        self.local.clear();
    }
}

impl Drop for QueueBuffer<'_> {
    fn drop(&mut self) {
        self.flush();
    }
}
