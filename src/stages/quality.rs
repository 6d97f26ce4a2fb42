//! Quality scoring.

use tracing::debug;

use crate::error::Result;

/// Reduces a vector to a scalar quality score in [0,1].
///
/// The score is the arithmetic mean of the components, clamped. It is not
/// invertible and has no identity beyond the vector it was computed from.
#[derive(Debug, Clone, Copy, Default)]
pub struct QualityEvaluator;

impl QualityEvaluator {
    /// Mean of the components, clamped to [0,1]. An empty vector scores
    /// 0.0.
    pub async fn evaluate(&self, vector: &[f32]) -> Result<f32> {
        if vector.is_empty() {
            return Ok(0.0);
        }
        let mean = vector.iter().sum::<f32>() / vector.len() as f32;
        let quality = mean.clamp(0.0, 1.0);
        debug!(quality, "quality evaluated");
        Ok(quality)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mean_of_components() {
        let quality = QualityEvaluator.evaluate(&[0.2, 0.4, 0.6]).await.unwrap();
        assert!((quality - 0.4).abs() < 1e-6);
    }

    #[tokio::test]
    async fn test_clamped_to_unit_interval() {
        assert_eq!(QualityEvaluator.evaluate(&[2.0, 2.0]).await.unwrap(), 1.0);
        assert_eq!(QualityEvaluator.evaluate(&[-1.0, -3.0]).await.unwrap(), 0.0);
    }

    #[tokio::test]
    async fn test_empty_vector_scores_zero() {
        assert_eq!(QualityEvaluator.evaluate(&[]).await.unwrap(), 0.0);
    }
}
