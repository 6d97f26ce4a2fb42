//! Embedding provider trait and shared pipeline data types.
//!
//! # WHY: Trait-Based Capability Abstraction
//!
//! Using a trait instead of a concrete embedding backend enables:
//! - **Testing**: [`crate::providers::MockProvider`] for unit tests
//! - **Fallback**: [`crate::providers::RandomProvider`] when no real
//!   capability is configured, selected once at construction instead of a
//!   runtime existence check scattered through call sites
//! - **Flexibility**: real capabilities (ONNX runtimes, HTTP embedding
//!   APIs) implement the same trait out of crate
//!
//! # Key Types
//!
//! - [`EmbeddingProvider`]: vector embedding generation
//! - [`ProcessingOptions`]: per-run refinement flags
//! - [`PipelineResult`]: the (vector, quality) pair returned per text

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

// ============================================================================
// Processing Options
// ============================================================================

/// Boolean flags controlling refinement behavior.
///
/// Only `reasoning_enhanced` currently affects the pipeline; the other
/// flags are accepted and carried through so that callers can set them
/// today without an API break when they gain behavior.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessingOptions {
    /// Apply the reasoning boost (x1.01) during refinement.
    pub reasoning_enhanced: bool,

    /// Reserved for extension.
    pub domain_specific: bool,

    /// Reserved for extension.
    pub synthetic_augmented: bool,
}

impl ProcessingOptions {
    /// The enriched option set: every flag on. This is the pipeline's
    /// default processing mode.
    pub fn enriched() -> Self {
        Self {
            reasoning_enhanced: true,
            domain_specific: true,
            synthetic_augmented: true,
        }
    }
}

// ============================================================================
// Pipeline Result
// ============================================================================

/// The quality-scored vector produced for one text.
///
/// Ownership transfers to the caller; the pipeline retains no reference
/// after returning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineResult {
    /// Domain-adjusted embedding, every component in [0,1].
    pub vector: Vec<f32>,

    /// Scalar quality score in [0,1], derived from the vector before
    /// final enhancement. Not invertible.
    pub quality: f32,
}

impl PipelineResult {
    /// The documented fail-soft result: a zero vector of the configured
    /// dimensionality paired with quality 0.0.
    pub fn fallback(dimension: usize) -> Self {
        Self {
            vector: vec![0.0; dimension],
            quality: 0.0,
        }
    }

    /// Whether this result is indistinguishable from the fallback.
    pub fn is_fallback(&self) -> bool {
        self.quality == 0.0 && self.vector.iter().all(|c| *c == 0.0)
    }
}

// ============================================================================
// Embedding Provider Trait
// ============================================================================

/// Trait for vector embedding generation.
///
/// Implementations must not block the cooperative scheduler: CPU-bound
/// or blocking inference belongs on a blocking task
/// (`tokio::task::spawn_blocking`), network calls in a true async client.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Get the name of this provider.
    fn name(&self) -> &str;

    /// Get the embedding model identifier.
    fn model(&self) -> &str;

    /// Get the dimension of the embeddings.
    fn dimension(&self) -> usize;

    /// Get the maximum number of tokens per input.
    fn max_tokens(&self) -> usize;

    /// Generate embeddings for a batch of texts.
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    /// Generate embedding for a single text.
    async fn embed_one(&self, text: &str) -> Result<Vec<f32>> {
        let results = self.embed(&[text.to_string()]).await?;
        results
            .into_iter()
            .next()
            .ok_or_else(|| crate::error::VectorError::Provider("empty embedding result".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_options_default_is_neutral() {
        let options = ProcessingOptions::default();
        assert!(!options.reasoning_enhanced);
        assert!(!options.domain_specific);
        assert!(!options.synthetic_augmented);
    }

    #[test]
    fn test_options_enriched() {
        let options = ProcessingOptions::enriched();
        assert!(options.reasoning_enhanced);
        assert!(options.domain_specific);
        assert!(options.synthetic_augmented);
    }

    #[test]
    fn test_fallback_result_shape() {
        let result = PipelineResult::fallback(384);
        assert_eq!(result.vector.len(), 384);
        assert!(result.vector.iter().all(|c| *c == 0.0));
        assert_eq!(result.quality, 0.0);
        assert!(result.is_fallback());
    }

    #[test]
    fn test_non_fallback_result() {
        let result = PipelineResult {
            vector: vec![0.2, 0.4],
            quality: 0.3,
        };
        assert!(!result.is_fallback());
    }

    #[test]
    fn test_result_serde_round_trip() {
        let result = PipelineResult {
            vector: vec![0.25, 0.5],
            quality: 0.375,
        };
        let json = serde_json::to_string(&result).unwrap();
        let back: PipelineResult = serde_json::from_str(&json).unwrap();
        assert_eq!(result, back);
    }

    #[test]
    fn test_options_serde_defaults_missing_fields() {
        let options: ProcessingOptions =
            serde_json::from_str(r#"{"reasoning_enhanced": true}"#).unwrap();
        assert!(options.reasoning_enhanced);
        assert!(!options.domain_specific);
    }
}
