//! Embedding provider factory for environment-based selection.
//!
//! # Environment Variables
//!
//! - `VECFLOW_EMBEDDING_PROVIDER`: provider selection (`random` | `mock`)
//! - `VECFLOW_EMBEDDING_DIM`: embedding dimensionality override
//! - `VECFLOW_EMBEDDING_SEED`: fixed seed for the random provider
//!   (reproducible runs)
//!
//! When `VECFLOW_EMBEDDING_PROVIDER` is not set, the random fallback
//! provider is used: this crate deliberately ships no real inference
//! backend, so "no capability configured" is the expected state and maps
//! to the documented fallback. Applications with a real capability
//! construct the pipeline with their own [`EmbeddingProvider`] instead of
//! going through the factory.
//!
//! # Example
//!
//! ```rust,ignore
//! use vecflow::ProviderFactory;
//!
//! // Auto-detect from environment
//! let provider = ProviderFactory::from_env()?;
//! ```

use std::sync::Arc;

use tracing::debug;

use crate::error::{Result, VectorError};
use crate::providers::{MockProvider, RandomProvider};
use crate::traits::EmbeddingProvider;

/// Supported provider types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderType {
    /// Uniform random fallback (optionally seeded).
    Random,
    /// Mock provider (testing only).
    Mock,
}

impl ProviderType {
    /// Parse provider type from string (case-insensitive).
    ///
    /// # Examples
    ///
    /// ```
    /// use vecflow::ProviderType;
    ///
    /// assert_eq!(ProviderType::from_str("random"), Some(ProviderType::Random));
    /// assert_eq!(ProviderType::from_str("MOCK"), Some(ProviderType::Mock));
    /// assert_eq!(ProviderType::from_str("onnx"), None);
    /// ```
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "random" | "uniform" | "fallback" => Some(Self::Random),
            "mock" => Some(Self::Mock),
            _ => None,
        }
    }
}

/// Provider factory for creating embedding providers.
pub struct ProviderFactory;

impl ProviderFactory {
    /// Create a provider from environment configuration.
    pub fn from_env() -> Result<Arc<dyn EmbeddingProvider>> {
        let requested = std::env::var("VECFLOW_EMBEDDING_PROVIDER")
            .unwrap_or_else(|_| "random".to_string());
        let provider_type = ProviderType::from_str(&requested).ok_or_else(|| {
            VectorError::Config(format!("unknown embedding provider '{requested}'"))
        })?;

        let dimension = match std::env::var("VECFLOW_EMBEDDING_DIM") {
            Ok(raw) => Some(raw.parse::<usize>().map_err(|_| {
                VectorError::Config(format!("invalid VECFLOW_EMBEDDING_DIM '{raw}'"))
            })?),
            Err(_) => None,
        };
        let seed = match std::env::var("VECFLOW_EMBEDDING_SEED") {
            Ok(raw) => Some(raw.parse::<u64>().map_err(|_| {
                VectorError::Config(format!("invalid VECFLOW_EMBEDDING_SEED '{raw}'"))
            })?),
            Err(_) => None,
        };

        debug!(?provider_type, ?dimension, ?seed, "creating provider from env");
        Ok(Self::create(provider_type, dimension, seed))
    }

    /// Create a provider explicitly.
    pub fn create(
        provider_type: ProviderType,
        dimension: Option<usize>,
        seed: Option<u64>,
    ) -> Arc<dyn EmbeddingProvider> {
        match provider_type {
            ProviderType::Random => {
                let mut provider = match seed {
                    Some(seed) => RandomProvider::seeded(seed),
                    None => RandomProvider::new(),
                };
                if let Some(dimension) = dimension {
                    provider = provider.with_dimension(dimension);
                }
                Arc::new(provider)
            }
            ProviderType::Mock => {
                let provider = match dimension {
                    Some(dimension) => MockProvider::with_dimension(dimension),
                    None => MockProvider::new(),
                };
                Arc::new(provider)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_type_parsing() {
        assert_eq!(ProviderType::from_str("random"), Some(ProviderType::Random));
        assert_eq!(ProviderType::from_str("Uniform"), Some(ProviderType::Random));
        assert_eq!(ProviderType::from_str("mock"), Some(ProviderType::Mock));
        assert_eq!(ProviderType::from_str("openai"), None);
    }

    #[test]
    fn test_create_random_with_overrides() {
        let provider = ProviderFactory::create(ProviderType::Random, Some(128), Some(42));
        assert_eq!(provider.name(), "random");
        assert_eq!(provider.dimension(), 128);
    }

    #[test]
    fn test_create_mock() {
        let provider = ProviderFactory::create(ProviderType::Mock, None, None);
        assert_eq!(provider.name(), "mock");
        assert_eq!(provider.dimension(), 384);
    }
}
