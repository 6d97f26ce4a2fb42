//! Pseudo-random fallback embedding provider.
//!
//! When no real embedding capability is configured, the pipeline still has
//! to produce "any vector of the right shape". This provider draws every
//! component from a uniform distribution in [0,1).
//!
//! With a fixed seed the provider is fully reproducible: the per-text RNG
//! is seeded from `seed ^ hash(text)`, so the same (seed, text) pair always
//! yields the same vector while distinct texts yield distinct vectors.
//! Unseeded, it uses the thread-local RNG.

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use crate::error::Result;
use crate::traits::EmbeddingProvider;

/// Default embedding dimensionality (all-MiniLM class models).
pub const DEFAULT_DIMENSION: usize = 384;

/// Fallback provider producing uniform random vectors in [0,1).
#[derive(Debug, Clone)]
pub struct RandomProvider {
    dimension: usize,
    seed: Option<u64>,
}

impl RandomProvider {
    /// Create an unseeded provider with the default dimensionality.
    pub fn new() -> Self {
        Self {
            dimension: DEFAULT_DIMENSION,
            seed: None,
        }
    }

    /// Create a deterministic provider for reproducible runs and tests.
    pub fn seeded(seed: u64) -> Self {
        Self {
            dimension: DEFAULT_DIMENSION,
            seed: Some(seed),
        }
    }

    /// Override the embedding dimensionality.
    pub fn with_dimension(mut self, dimension: usize) -> Self {
        self.dimension = dimension;
        self
    }

    fn vector_for(&self, text: &str) -> Vec<f32> {
        match self.seed {
            Some(seed) => {
                let mut hasher = DefaultHasher::new();
                text.hash(&mut hasher);
                let mut rng = StdRng::seed_from_u64(seed ^ hasher.finish());
                (0..self.dimension).map(|_| rng.gen::<f32>()).collect()
            }
            None => {
                let mut rng = rand::thread_rng();
                (0..self.dimension).map(|_| rng.gen::<f32>()).collect()
            }
        }
    }
}

impl Default for RandomProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EmbeddingProvider for RandomProvider {
    fn name(&self) -> &str {
        "random"
    }

    fn model(&self) -> &str {
        "uniform-fallback"
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn max_tokens(&self) -> usize {
        8192
    }

    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|text| self.vector_for(text)).collect())
    }
}
