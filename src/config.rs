//! Pipeline configuration.
//!
//! TOML-based configuration for the pipeline: dimensionality, retry
//! policy, optional per-call deadline, and the adaptive-enhancement
//! thresholds.
//!
//! # Configuration File Location
//!
//! [`PipelineConfig::load`] resolves the file from (in order of priority):
//! 1. `VECFLOW_CONFIG` environment variable
//! 2. `./vecflow.toml` (current working directory)
//! 3. Built-in defaults
//!
//! # Example Configuration
//!
//! ```toml
//! dimension = 384
//! deadline_ms = 2000
//!
//! [retry]
//! max_attempts = 3
//! base_delay_ms = 100
//! max_delay_ms = 5000
//!
//! [adaptive]
//! variance_threshold = 0.05
//! boost = 1.1
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::debug;

use crate::error::{Result, RetryStrategy, VectorError};

/// Retry policy knobs, realized as a [`RetryStrategy`] per stage call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Maximum attempts per stage call, including the first.
    pub max_attempts: u32,
    /// Initial backoff delay in milliseconds.
    pub base_delay_ms: u64,
    /// Backoff delay cap in milliseconds.
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 100,
            max_delay_ms: 5_000,
        }
    }
}

impl RetryConfig {
    /// Build the backoff strategy stage calls are wrapped with.
    pub fn strategy(&self) -> RetryStrategy {
        RetryStrategy::ExponentialBackoff {
            base_delay: Duration::from_millis(self.base_delay_ms),
            max_delay: Duration::from_millis(self.max_delay_ms),
            max_attempts: self.max_attempts,
        }
    }
}

/// Adaptive enhancement knobs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdaptiveConfig {
    /// Variance below which a vector counts as low-information.
    pub variance_threshold: f32,
    /// Extra multiplier applied to the enhancement factor for
    /// low-variance vectors.
    pub boost: f32,
}

impl Default for AdaptiveConfig {
    fn default() -> Self {
        Self {
            variance_threshold: 0.05,
            boost: 1.1,
        }
    }
}

/// Top-level pipeline configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Embedding dimensionality; constant across all stages of a run.
    pub dimension: usize,
    /// Optional per-call deadline in milliseconds. Expiry is treated
    /// identically to stage failure (fallback result).
    pub deadline_ms: Option<u64>,
    /// Retry policy for stage calls.
    pub retry: RetryConfig,
    /// Adaptive enhancement thresholds.
    pub adaptive: AdaptiveConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            dimension: crate::providers::random::DEFAULT_DIMENSION,
            deadline_ms: None,
            retry: RetryConfig::default(),
            adaptive: AdaptiveConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Parse a configuration from a TOML string.
    pub fn from_toml_str(toml_str: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(toml_str).map_err(|e| VectorError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to a TOML string.
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| VectorError::Config(e.to_string()))
    }

    /// Load configuration from a file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path.as_ref())
            .map_err(|e| VectorError::Config(format!("failed to read config file: {e}")))?;
        Self::from_toml_str(&contents)
    }

    /// Load configuration from the standard locations, falling back to
    /// defaults when no file is found.
    pub fn load() -> Result<Self> {
        if let Ok(path) = std::env::var("VECFLOW_CONFIG") {
            debug!(path, "loading config from VECFLOW_CONFIG");
            return Self::from_path(path);
        }
        let local = Path::new("vecflow.toml");
        if local.exists() {
            debug!("loading config from ./vecflow.toml");
            return Self::from_path(local);
        }
        Ok(Self::default())
    }

    /// Validate invariants the type system cannot express.
    pub fn validate(&self) -> Result<()> {
        if self.dimension == 0 {
            return Err(VectorError::Config("dimension must be positive".to_string()));
        }
        if self.retry.max_attempts == 0 {
            return Err(VectorError::Config(
                "retry.max_attempts must be at least 1".to_string(),
            ));
        }
        if self.adaptive.variance_threshold < 0.0 {
            return Err(VectorError::Config(
                "adaptive.variance_threshold must be non-negative".to_string(),
            ));
        }
        if self.adaptive.boost <= 0.0 {
            return Err(VectorError::Config(
                "adaptive.boost must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
