//! Kernel parameters
//!
//! Each kernel takes one of these structs. All of them deserialize from
//! partial documents (missing fields take their defaults) and are validated
//! at kernel entry.

use serde::{Deserialize, Serialize};

use crate::error::KernelError;
use crate::storage::NodeId;

/// Default seed for random source selection
pub const DEFAULT_SOURCE_SEED: u64 = 27_491_095;

/// Direction-optimizing BFS thresholds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BfsConfig {
    /// Switch to bottom-up once frontier out-edges exceed `unexplored / alpha`
    pub alpha: u32,
    /// Stay bottom-up while the frontier exceeds `num_nodes / beta`
    pub beta: u32,
}

impl Default for BfsConfig {
    fn default() -> Self {
        Self { alpha: 15, beta: 18 }
    }
}

impl BfsConfig {
    /// Check parameter ranges
    ///
    /// # Errors
    ///
    /// Returns [`KernelError::InvalidParameter`] if either threshold is zero
    pub fn validate(&self) -> Result<(), KernelError> {
        if self.alpha == 0 {
            return Err(KernelError::invalid("alpha", "must be positive"));
        }
        if self.beta == 0 {
            return Err(KernelError::invalid("beta", "must be positive"));
        }
        Ok(())
    }
}

/// Delta-stepping bucket width
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SsspConfig {
    /// Bucket `k` holds tentative distances in `[k * delta, (k + 1) * delta)`
    pub delta: u32,
}

impl Default for SsspConfig {
    fn default() -> Self {
        Self { delta: 1 }
    }
}

impl SsspConfig {
    /// Check parameter ranges
    ///
    /// # Errors
    ///
    /// Returns [`KernelError::InvalidParameter`] if `delta` is zero
    pub fn validate(&self) -> Result<(), KernelError> {
        if self.delta == 0 {
            return Err(KernelError::invalid("delta", "must be positive"));
        }
        Ok(())
    }
}

/// Afforest sampling parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CcConfig {
    /// Neighbor-sampling rounds before the final link pass
    pub neighbor_rounds: usize,
    /// Vertices sampled to find the largest intermediate component
    pub num_samples: usize,
    /// Seed of the component sampler
    pub seed: u64,
}

impl Default for CcConfig {
    fn default() -> Self {
        Self {
            neighbor_rounds: 2,
            num_samples: 1024,
            seed: DEFAULT_SOURCE_SEED,
        }
    }
}

impl CcConfig {
    /// Check parameter ranges
    ///
    /// # Errors
    ///
    /// Returns [`KernelError::InvalidParameter`] if `num_samples` is zero
    pub fn validate(&self) -> Result<(), KernelError> {
        if self.num_samples == 0 {
            return Err(KernelError::invalid("num_samples", "must be positive"));
        }
        Ok(())
    }
}

/// Which sources betweenness centrality accumulates over
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BcSources {
    /// Every vertex (exact centrality)
    All,
    /// `count` random vertices with non-zero out-degree
    Sampled {
        /// Number of sources
        count: usize,
        /// Seed of the source picker
        seed: u64,
    },
    /// An explicit source list
    Fixed(Vec<NodeId>),
}

/// Betweenness centrality parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BcConfig {
    /// Source selection
    pub sources: BcSources,
}

impl Default for BcConfig {
    fn default() -> Self {
        Self {
            sources: BcSources::Sampled {
                count: 1,
                seed: DEFAULT_SOURCE_SEED,
            },
        }
    }
}

impl BcConfig {
    /// Check parameter ranges
    ///
    /// # Errors
    ///
    /// Returns [`KernelError::InvalidParameter`] if a sampled run asks for no
    /// sources
    pub fn validate(&self) -> Result<(), KernelError> {
        if let BcSources::Sampled { count: 0, .. } = self.sources {
            return Err(KernelError::invalid("sources.count", "must be positive"));
        }
        Ok(())
    }
}

/// `PageRank` parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageRankConfig {
    /// Damping factor
    pub damping: f32,
    /// Stop once the L1 change of one iteration drops below this
    pub epsilon: f64,
    /// Iteration cap; hitting it is not an error
    pub max_iters: usize,
}

impl Default for PageRankConfig {
    fn default() -> Self {
        Self {
            damping: 0.85,
            epsilon: 1e-4,
            max_iters: 20,
        }
    }
}

impl PageRankConfig {
    /// Check parameter ranges
    ///
    /// # Errors
    ///
    /// Returns [`KernelError::InvalidParameter`] if `damping` is outside
    /// `[0, 1]` or `epsilon` is negative or NaN
    pub fn validate(&self) -> Result<(), KernelError> {
        if !(0.0..=1.0).contains(&self.damping) {
            return Err(KernelError::invalid(
                "damping",
                format!("{} is outside [0, 1]", self.damping),
            ));
        }
        if self.epsilon.is_nan() || self.epsilon < 0.0 {
            return Err(KernelError::invalid("epsilon", "must be non-negative"));
        }
        Ok(())
    }
}
