//! The vector processing pipeline.
//!
//! Sequences the stages for a single text, fans out across a batch, and
//! applies the fail-soft policy at its public boundary.
//!
//! # Architecture
//! ```text
//!  text ──► Embedding ──► Refining ──► ComputeEnhancement ──┬─► QualityEvaluation ─┐
//!                                                           │                      ├─► FinalEnhancement ──► (vector, quality)
//!                                                           └─► RuleLookup ────────┘
//! ```
//!
//! Every stage call is wrapped by the retry executor and bracketed by the
//! middleware stack. QualityEvaluation and RuleLookup are independent and
//! run concurrently; FinalEnhancement joins them.
//!
//! # Fail-Soft Boundary
//!
//! `process` and `batch_process` never return an error. Any stage that
//! exhausts its retries (or a deadline expiry) is logged, reported to the
//! middleware stack, and converted into the documented fallback result: a
//! zero vector of the configured dimensionality with quality 0.0.
//! `adaptive_enhancement` degrades differently: its input is already a
//! valid vector, so on failure it returns the input unchanged.
//!
//! # Example
//!
//! ```ignore
//! use vecflow::{RandomProvider, VectorPipeline};
//! use std::sync::Arc;
//!
//! let pipeline = VectorPipeline::builder()
//!     .provider(Arc::new(RandomProvider::seeded(42)))
//!     .build();
//! let result = pipeline.process("some text", "software").await;
//! assert_eq!(result.vector.len(), 384);
//! ```

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::task::JoinSet;
use tokio::time::timeout;
use tracing::{debug, error, warn};

use crate::config::PipelineConfig;
use crate::error::{Result, RetryStrategy, VectorError};
use crate::middleware::{PipelineMiddleware, PipelineMiddlewareStack, Stage};
use crate::providers::RandomProvider;
use crate::retry::RetryExecutor;
use crate::rules::DomainRules;
use crate::stages::{ComputeEnhancer, Enhancer, QualityEvaluator, Refiner};
use crate::traits::{EmbeddingProvider, PipelineResult, ProcessingOptions};

/// Domain used when the caller has no better category.
pub const DEFAULT_DOMAIN: &str = "general";

// ============================================================================
// Builder
// ============================================================================

/// Builder for [`VectorPipeline`].
pub struct VectorPipelineBuilder {
    provider: Option<Arc<dyn EmbeddingProvider>>,
    rules: DomainRules,
    middleware: PipelineMiddlewareStack,
    options: ProcessingOptions,
    config: PipelineConfig,
}

impl VectorPipelineBuilder {
    fn new() -> Self {
        Self {
            provider: None,
            rules: DomainRules::new(),
            middleware: PipelineMiddlewareStack::new(),
            options: ProcessingOptions::enriched(),
            config: PipelineConfig::default(),
        }
    }

    /// Set the embedding capability. Defaults to the unseeded
    /// [`RandomProvider`] fallback at the configured dimensionality.
    pub fn provider(mut self, provider: Arc<dyn EmbeddingProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Replace the pipeline configuration.
    pub fn config(mut self, config: PipelineConfig) -> Self {
        self.config = config;
        self
    }

    /// Replace the domain rule table.
    pub fn rules(mut self, rules: DomainRules) -> Self {
        self.rules = rules;
        self
    }

    /// Replace the processing options (default: all flags on).
    pub fn options(mut self, options: ProcessingOptions) -> Self {
        self.options = options;
        self
    }

    /// Register a middleware. May be called multiple times; hooks run in
    /// registration order.
    pub fn middleware(mut self, middleware: Arc<dyn PipelineMiddleware>) -> Self {
        self.middleware.add(middleware);
        self
    }

    /// Build the pipeline.
    pub fn build(self) -> VectorPipeline {
        let strategy = self.config.retry.strategy();
        let provider = self.provider.unwrap_or_else(|| {
            Arc::new(RandomProvider::new().with_dimension(self.config.dimension))
        });
        VectorPipeline {
            provider,
            refiner: Refiner,
            compute: ComputeEnhancer,
            quality: QualityEvaluator,
            enhancer: Enhancer,
            rules: Arc::new(self.rules),
            middleware: Arc::new(self.middleware),
            retry: RetryExecutor::new(),
            strategy,
            options: self.options,
            config: self.config,
        }
    }
}

// ============================================================================
// Pipeline
// ============================================================================

/// Multi-stage asynchronous pipeline from raw text to a quality-scored,
/// domain-adjusted embedding.
///
/// Cheap to clone: configuration and collaborators are shared behind
/// `Arc`s, and per-call state (vectors, scores, backoff schedules) is
/// created fresh per call.
#[derive(Clone)]
pub struct VectorPipeline {
    provider: Arc<dyn EmbeddingProvider>,
    refiner: Refiner,
    compute: ComputeEnhancer,
    quality: QualityEvaluator,
    enhancer: Enhancer,
    rules: Arc<DomainRules>,
    middleware: Arc<PipelineMiddlewareStack>,
    retry: RetryExecutor,
    strategy: RetryStrategy,
    options: ProcessingOptions,
    config: PipelineConfig,
}

impl VectorPipeline {
    /// Start building a pipeline.
    pub fn builder() -> VectorPipelineBuilder {
        VectorPipelineBuilder::new()
    }

    /// The configured embedding dimensionality.
    pub fn dimension(&self) -> usize {
        self.config.dimension
    }

    /// Process one text into a quality-scored, domain-adjusted vector.
    ///
    /// Never returns an error: unrecovered stage failures and deadline
    /// expiry degrade to [`PipelineResult::fallback`].
    pub async fn process(&self, text: &str, domain: &str) -> PipelineResult {
        let outcome = match self.config.deadline_ms {
            Some(ms) => {
                match timeout(Duration::from_millis(ms), self.run_stages(text, domain)).await {
                    Ok(result) => result,
                    Err(_) => Err(VectorError::DeadlineExceeded),
                }
            }
            None => self.run_stages(text, domain).await,
        };

        match outcome {
            Ok(result) => result,
            Err(error) => {
                error!(error = %error, "pipeline run failed, returning fallback result");
                self.middleware.on_fallback(&error).await;
                PipelineResult::fallback(self.config.dimension)
            }
        }
    }

    /// Process a batch of texts concurrently.
    ///
    /// Output order matches input order regardless of completion order.
    /// Per-item failures are already absorbed by `process`; if the join
    /// mechanism itself fails (a task-level error), the whole batch
    /// degrades to fallback results of the same length as the input, so
    /// output length and shape stay stable even under catastrophic
    /// failure. Dropping the returned future aborts still-pending items.
    pub async fn batch_process(&self, texts: &[String], domain: &str) -> Vec<PipelineResult> {
        let mut join_set = JoinSet::new();
        for (index, text) in texts.iter().enumerate() {
            let pipeline = self.clone();
            let text = text.clone();
            let domain = domain.to_string();
            join_set.spawn(async move { (index, pipeline.process(&text, &domain).await) });
        }

        let mut results: Vec<Option<PipelineResult>> = vec![None; texts.len()];
        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok((index, result)) => results[index] = Some(result),
                Err(join_error) => {
                    let batch_error = VectorError::BatchJoin(join_error.to_string());
                    error!(error = %batch_error, "degrading whole batch to fallback results");
                    self.middleware.on_fallback(&batch_error).await;
                    return vec![PipelineResult::fallback(self.config.dimension); texts.len()];
                }
            }
        }

        results
            .into_iter()
            .map(|slot| slot.unwrap_or_else(|| PipelineResult::fallback(self.config.dimension)))
            .collect()
    }

    /// Re-enhance an existing vector, boosting the domain factor for
    /// low-variance (low-information) vectors.
    ///
    /// On failure returns the input unchanged: the input is already a
    /// valid vector, so there is nothing to zero out.
    pub async fn adaptive_enhancement(&self, vector: Vec<f32>, domain: &str) -> Vec<f32> {
        match self.run_adaptive(&vector, domain).await {
            Ok(enhanced) => enhanced,
            Err(error) => {
                warn!(error = %error, "adaptive enhancement failed, returning input unchanged");
                vector
            }
        }
    }

    async fn run_adaptive(&self, vector: &[f32], domain: &str) -> Result<Vec<f32>> {
        let variance = population_variance(vector);
        let mut rule_set = self.rules.get_rules(domain);
        if variance < self.config.adaptive.variance_threshold {
            rule_set.enhancement_factor *= self.config.adaptive.boost;
        }
        debug!(
            variance,
            enhancement_factor = rule_set.enhancement_factor,
            "adaptive enhancement"
        );
        self.enhancer.enhance(vector.to_vec(), &rule_set).await
    }

    /// Run the stage sequence for one text. Errors from here are absorbed
    /// by [`Self::process`].
    async fn run_stages(&self, text: &str, domain: &str) -> Result<PipelineResult> {
        let expected = self.config.dimension;

        let raw = self
            .run_stage(Stage::Embedding, || {
                let provider = Arc::clone(&self.provider);
                let text = text.to_string();
                async move {
                    let vector = provider.embed_one(&text).await?;
                    if vector.len() != expected {
                        return Err(VectorError::DimensionMismatch {
                            expected,
                            got: vector.len(),
                        });
                    }
                    Ok(vector)
                }
            })
            .await?;

        let refined = self
            .run_stage(Stage::Refining, || {
                let vector = raw.clone();
                let options = self.options;
                async move { self.refiner.refine(vector, &options).await }
            })
            .await?;

        let computed = self
            .run_stage(Stage::ComputeEnhancement, || {
                let vector = refined.clone();
                async move { self.compute.enhance(vector).await }
            })
            .await?;

        // Independent branches: score the vector while the rules resolve.
        let (quality, rule_set) = tokio::join!(
            self.run_stage(Stage::QualityEvaluation, || {
                let vector = computed.clone();
                async move { self.quality.evaluate(&vector).await }
            }),
            self.run_stage(Stage::RuleLookup, || async move {
                Ok::<_, VectorError>(self.rules.get_rules(domain))
            }),
        );
        let quality = quality?;
        let rule_set = rule_set?;

        let enhanced = self
            .run_stage(Stage::FinalEnhancement, || {
                let vector = computed.clone();
                async move { self.enhancer.enhance(vector, &rule_set).await }
            })
            .await?;

        Ok(PipelineResult {
            vector: enhanced,
            quality,
        })
    }

    /// Bracket one retry-wrapped stage call with the middleware stack.
    async fn run_stage<T, F, Fut>(&self, stage: Stage, operation: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        self.middleware
            .before_stage(stage)
            .await
            .map_err(|source| stage_failed(stage, source))?;

        let start = Instant::now();
        match self.retry.execute(&self.strategy, operation).await {
            Ok(value) => {
                let duration_ms = start.elapsed().as_millis() as u64;
                self.middleware
                    .after_stage(stage, duration_ms)
                    .await
                    .map_err(|source| stage_failed(stage, source))?;
                Ok(value)
            }
            Err(source) => {
                self.middleware.on_stage_error(stage, &source).await;
                Err(stage_failed(stage, source))
            }
        }
    }
}

impl Default for VectorPipeline {
    fn default() -> Self {
        Self::builder().build()
    }
}

fn stage_failed(stage: Stage, source: VectorError) -> VectorError {
    VectorError::StageFailed {
        stage: stage.as_str(),
        source: Box::new(source),
    }
}

/// Population variance of the components.
fn population_variance(vector: &[f32]) -> f32 {
    if vector.is_empty() {
        return 0.0;
    }
    let mean = vector.iter().sum::<f32>() / vector.len() as f32;
    vector
        .iter()
        .map(|component| (component - mean) * (component - mean))
        .sum::<f32>()
        / vector.len() as f32
}
