//! Fixed-size bit set over vertex ids
//!
//! Concurrent `set_bit_atomic` goes through `fetch_or`; bulk operations that
//! need exclusive access (`reset`, `set_bit`, `swap`) take `&mut self`, so a
//! reset can never race a concurrent set.

use rayon::prelude::*;
use std::sync::atomic::{AtomicU64, Ordering};

const BITS_PER_WORD: usize = 64;

/// Bitmap with one bit per vertex
#[derive(Debug)]
pub struct Bitmap {
    words: Box<[AtomicU64]>,
    len: usize,
}

impl Bitmap {
    /// All-clear bitmap holding `len` bits
    #[must_use]
    pub fn new(len: usize) -> Self {
        Self {
            words: (0..len.div_ceil(BITS_PER_WORD)).map(|_| AtomicU64::new(0)).collect(),
            len,
        }
    }

    /// Number of addressable bits
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Whether the bitmap addresses no bits
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Clear every bit
    pub fn reset(&mut self) {
        self.words.par_iter_mut().for_each(|word| *word.get_mut() = 0);
    }

    /// Set bit `pos` with exclusive access
    #[inline]
    pub fn set_bit(&mut self, pos: usize) {
        *self.words[pos / BITS_PER_WORD].get_mut() |= 1 << (pos % BITS_PER_WORD);
    }

    /// Set bit `pos` from any thread
    #[inline]
    pub fn set_bit_atomic(&self, pos: usize) {
        self.words[pos / BITS_PER_WORD].fetch_or(1 << (pos % BITS_PER_WORD), Ordering::Relaxed);
    }

    /// Whether bit `pos` is set
    #[inline]
    #[must_use]
    pub fn get_bit(&self, pos: usize) -> bool {
        self.words[pos / BITS_PER_WORD].load(Ordering::Relaxed) & (1 << (pos % BITS_PER_WORD)) != 0
    }

    /// Exchange contents with `other`
    pub fn swap(&mut self, other: &mut Self) {
        std::mem::swap(self, other);
    }

    /// Number of set bits
    #[must_use]
    pub fn count_ones(&self) -> usize {
        self.words
            .par_iter()
            .map(|word| word.load(Ordering::Relaxed).count_ones() as usize)
            .sum()
    }
}
