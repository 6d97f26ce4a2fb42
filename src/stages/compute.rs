//! Test-time compute enhancement.

use crate::error::Result;
use crate::stages::scale_and_clamp;

/// Deterministic boost applied after refinement.
pub const COMPUTE_BOOST: f32 = 1.02;

/// Applies the compute boost and clamps every component to [0,1].
///
/// Deterministic; has no failure modes beyond upstream ones.
#[derive(Debug, Clone, Copy, Default)]
pub struct ComputeEnhancer;

impl ComputeEnhancer {
    /// Scale by [`COMPUTE_BOOST`] and clamp to [0,1].
    pub async fn enhance(&self, vector: Vec<f32>) -> Result<Vec<f32>> {
        Ok(scale_and_clamp(vector, COMPUTE_BOOST))
    }
}
