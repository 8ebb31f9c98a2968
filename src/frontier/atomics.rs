//! Atomic helpers for per-vertex arrays
//!
//! Kernel state lives in `Vec<Atomic*>` slices shared by reference across
//! rayon workers. Every access is `Relaxed`: rayon's fork-join boundaries
//! order each step against the next, and within a step the kernels only
//! need per-location atomicity.

use std::sync::atomic::{AtomicI32, AtomicI64, AtomicU32, AtomicU64, Ordering};

/// Allocate `len` atomics initialised to `init`
#[must_use]
pub fn atomic_vec_u32(len: usize, init: u32) -> Vec<AtomicU32> {
    (0..len).map(|_| AtomicU32::new(init)).collect()
}

/// Allocate `len` atomics initialised to `init`
#[must_use]
pub fn atomic_vec_i32(len: usize, init: i32) -> Vec<AtomicI32> {
    (0..len).map(|_| AtomicI32::new(init)).collect()
}

/// Compare-and-swap returning whether `slot` went from `old` to `new`
#[inline]
pub fn cas_u32(slot: &AtomicU32, old: u32, new: u32) -> bool {
    slot.compare_exchange(old, new, Ordering::Relaxed, Ordering::Relaxed)
        .is_ok()
}

/// Compare-and-swap returning whether `slot` went from `old` to `new`
#[inline]
pub fn cas_i64(slot: &AtomicI64, old: i64, new: i64) -> bool {
    slot.compare_exchange(old, new, Ordering::Relaxed, Ordering::Relaxed)
        .is_ok()
}

/// Snapshot an atomic slice into plain values
#[must_use]
pub fn load_all_u32(values: &[AtomicU32]) -> Vec<u32> {
    values.iter().map(|v| v.load(Ordering::Relaxed)).collect()
}

/// `f32` stored as its bit pattern in an [`AtomicU32`]
#[derive(Debug, Default)]
#[repr(transparent)]
pub struct AtomicF32(AtomicU32);

impl AtomicF32 {
    /// New atomic holding `value`
    #[must_use]
    pub fn new(value: f32) -> Self {
        Self(AtomicU32::new(value.to_bits()))
    }

    /// Current value
    #[inline]
    pub fn load(&self) -> f32 {
        f32::from_bits(self.0.load(Ordering::Relaxed))
    }

    /// Overwrite the value
    #[inline]
    pub fn store(&self, value: f32) {
        self.0.store(value.to_bits(), Ordering::Relaxed);
    }

    /// Atomically add `delta`, returning the previous value
    #[inline]
    pub fn fetch_add(&self, delta: f32) -> f32 {
        let mut current = self.0.load(Ordering::Relaxed);
        loop {
            let next = (f32::from_bits(current) + delta).to_bits();
            match self.0.compare_exchange_weak(current, next, Ordering::Relaxed, Ordering::Relaxed) {
                Ok(prev) => return f32::from_bits(prev),
                Err(actual) => current = actual,
            }
        }
    }
}

/// `f64` stored as its bit pattern in an [`AtomicU64`]
#[derive(Debug, Default)]
#[repr(transparent)]
pub struct AtomicF64(AtomicU64);

impl AtomicF64 {
    /// New atomic holding `value`
    #[must_use]
    pub fn new(value: f64) -> Self {
        Self(AtomicU64::new(value.to_bits()))
    }

    /// Current value
    #[inline]
    pub fn load(&self) -> f64 {
        f64::from_bits(self.0.load(Ordering::Relaxed))
    }

    /// Overwrite the value
    #[inline]
    pub fn store(&self, value: f64) {
        self.0.store(value.to_bits(), Ordering::Relaxed);
    }

    /// Atomically add `delta`, returning the previous value
    #[inline]
    pub fn fetch_add(&self, delta: f64) -> f64 {
        let mut current = self.0.load(Ordering::Relaxed);
        loop {
            let next = (f64::from_bits(current) + delta).to_bits();
            match self.0.compare_exchange_weak(current, next, Ordering::Relaxed, Ordering::Relaxed) {
                Ok(prev) => return f64::from_bits(prev),
                Err(actual) => current = actual,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rayon::prelude::*;

    #[test]
    fn test_cas() {
        let slot = AtomicI64::new(-1);
        assert!(cas_i64(&slot, -1, 3));
        assert!(!cas_i64(&slot, -1, 5));
        assert_eq!(slot.load(Ordering::Relaxed), 3);
    }

    #[test]
    fn test_concurrent_float_adds() {
        let total = AtomicF64::new(0.0);
        let partial = AtomicF32::new(0.0);
        (0..1000).into_par_iter().for_each(|_| {
            total.fetch_add(1.0);
            partial.fetch_add(0.5);
        });
        assert_eq!(total.load(), 1000.0); // integers are exact in f64
        assert_eq!(partial.load(), 500.0); // halves are exact in f32 at this size
    }

    #[test]
    fn test_concurrent_cas_single_winner() {
        let slot = AtomicU32::new(0);
        let winners = (1..=64_u32).into_par_iter().filter(|&v| cas_u32(&slot, 0, v)).count();
        assert_eq!(winners, 1);
        assert_ne!(slot.load(Ordering::Relaxed), 0);
    }
}
