//! Synthetic graph generators
//!
//! Uniform-random (Erdős–Rényi style) and Kronecker (RMAT) edge lists for
//! tests and benchmarks. Both produce `2^scale` vertices, `degree * 2^scale`
//! edges and integer weights in `[1, 255]`, and are deterministic per seed.

use anyhow::{bail, Result};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use super::csr::{NodeId, Weight};

/// RMAT quadrant probabilities (A, B, C; D is the remainder)
const RMAT_A: f64 = 0.57;
const RMAT_B: f64 = 0.19;
const RMAT_C: f64 = 0.19;

const MAX_WEIGHT: Weight = 255;

fn vertex_count(scale: u32) -> Result<u32> {
    if scale > 31 {
        bail!("scale {scale} exceeds the u32 id space");
    }
    Ok(1_u32 << scale)
}

/// Uniformly random edge list
///
/// # Errors
///
/// Returns error if `scale > 31`
pub fn uniform_random(scale: u32, degree: usize, seed: u64) -> Result<Vec<(NodeId, NodeId, Weight)>> {
    let n = vertex_count(scale)?;
    let mut rng = StdRng::seed_from_u64(seed);
    let num_edges = degree * n as usize;

    Ok((0..num_edges)
        .map(|_| {
            let src = rng.gen_range(0..n);
            let dst = rng.gen_range(0..n);
            (NodeId(src), NodeId(dst), rng.gen_range(1..=MAX_WEIGHT))
        })
        .collect())
}

/// Kronecker (RMAT) edge list with randomly permuted vertex ids
///
/// Produces the skewed degree distribution that makes degree relabelling and
/// bottom-up BFS steps worthwhile.
///
/// # Errors
///
/// Returns error if `scale > 31`
pub fn kronecker(scale: u32, degree: usize, seed: u64) -> Result<Vec<(NodeId, NodeId, Weight)>> {
    let n = vertex_count(scale)?;
    let mut rng = StdRng::seed_from_u64(seed);
    let num_edges = degree * n as usize;

    let mut permutation: Vec<u32> = (0..n).collect();
    permutation.shuffle(&mut rng);

    Ok((0..num_edges)
        .map(|_| {
            let (mut src, mut dst) = (0_u32, 0_u32);
            for depth in 0..scale {
                let bit = 1_u32 << depth;
                let p: f64 = rng.gen();
                if p < RMAT_A {
                    // top-left quadrant: neither bit set
                } else if p < RMAT_A + RMAT_B {
                    dst |= bit;
                } else if p < RMAT_A + RMAT_B + RMAT_C {
                    src |= bit;
                } else {
                    src |= bit;
                    dst |= bit;
                }
            }
            (
                NodeId(permutation[src as usize]),
                NodeId(permutation[dst as usize]),
                rng.gen_range(1..=MAX_WEIGHT),
            )
        })
        .collect())
}
