//! Vector refinement: normalization plus optional reasoning boost.

use tracing::trace;

use crate::error::{Result, VectorError};
use crate::traits::ProcessingOptions;

/// Multiplier applied when `reasoning_enhanced` is set.
pub const REASONING_BOOST: f32 = 1.01;

/// Normalizes a raw embedding to unit length.
///
/// Zero-norm policy: a zero-norm input yields
/// [`VectorError::DegenerateVector`] rather than a silent pass-through.
/// The error is non-retryable and is absorbed by the pipeline's fallback
/// path.
#[derive(Debug, Clone, Copy, Default)]
pub struct Refiner;

impl Refiner {
    /// Normalize `vector` to unit Euclidean length, then apply the
    /// reasoning boost when requested.
    pub async fn refine(
        &self,
        vector: Vec<f32>,
        options: &ProcessingOptions,
    ) -> Result<Vec<f32>> {
        let norm = vector
            .iter()
            .map(|component| component * component)
            .sum::<f32>()
            .sqrt();
        if norm == 0.0 {
            return Err(VectorError::DegenerateVector);
        }

        let boost = if options.reasoning_enhanced {
            REASONING_BOOST
        } else {
            1.0
        };
        trace!(norm, boost, "refining vector");

        Ok(vector
            .into_iter()
            .map(|component| component / norm * boost)
            .collect())
    }
}
