//! vecflow - Quality-Scored Text Embedding Pipeline
//!
//! A multi-stage asynchronous pipeline that turns raw text into a
//! quality-scored, domain-adjusted numeric embedding.
//!
//! # Stages
//!
//! | Stage | Transform | Failure handling |
//! |-------|-----------|------------------|
//! | Embedding | text to raw vector (capability or random fallback) | retried, then fallback |
//! | Refining | unit-length normalization, optional x1.01 boost | zero-norm is a deliberate error |
//! | Compute enhancement | x1.02, clamp to [0,1] | deterministic |
//! | Quality evaluation | mean of components, clamp | concurrent with rule lookup |
//! | Rule lookup | domain to enhancement factor | concurrent with quality |
//! | Final enhancement | x factor, clamp to [0,1] | joins both branches |
//!
//! # Fail-Soft Contract
//!
//! [`VectorPipeline::process`] and [`VectorPipeline::batch_process`]
//! never return errors. Stage failures are retried with exponential
//! backoff; once retries are exhausted the call degrades to a zero
//! vector with quality 0.0 and the failure is logged and reported to the
//! registered middleware.
//!
//! # Architecture
//!
//! The crate uses trait-based abstraction for the embedding capability:
//! - [`RandomProvider`]: seeded/unseeded uniform fallback
//! - [`MockProvider`]: scriptable test double
//! - real capabilities implement [`EmbeddingProvider`] out of crate
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use vecflow::{RandomProvider, VectorPipeline, DEFAULT_DOMAIN};
//!
//! let pipeline = VectorPipeline::builder()
//!     .provider(Arc::new(RandomProvider::seeded(42)))
//!     .build();
//!
//! let result = pipeline.process("Rust embeds well.", DEFAULT_DOMAIN).await;
//! println!("quality = {:.3}", result.quality);
//! ```
//!
//! # See Also
//!
//! - [`crate::traits`] for the provider trait and shared types
//! - [`crate::pipeline`] for the orchestrator and its fail-soft boundary
//! - [`crate::security`] for the out-of-core security collaborator

pub mod config;
pub mod error;
pub mod factory;
pub mod middleware;
pub mod pipeline;
pub mod providers;
pub mod retry;
pub mod rules;
pub mod security;
pub mod stages;
pub mod traits;

pub use config::{AdaptiveConfig, PipelineConfig, RetryConfig};
pub use error::{Result, RetryStrategy, VectorError};
pub use factory::{ProviderFactory, ProviderType};
pub use middleware::{
    LoggingMiddleware, MetricsMiddleware, MetricsSummary, PipelineMiddleware,
    PipelineMiddlewareStack, Stage,
};
pub use pipeline::{VectorPipeline, VectorPipelineBuilder, DEFAULT_DOMAIN};
pub use providers::{MockProvider, RandomProvider};
pub use retry::RetryExecutor;
pub use rules::{DomainRuleSet, DomainRules};
pub use security::{EncryptionBackend, LocalSecurityGate, SecurityGate};
pub use stages::{ComputeEnhancer, Enhancer, QualityEvaluator, Refiner};
pub use traits::{EmbeddingProvider, PipelineResult, ProcessingOptions};
