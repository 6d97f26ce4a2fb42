//! Pipeline stage middleware.
//!
//! Cross-cutting observability for stage calls: logging, metrics, custom
//! sinks. Instead of fire-and-forget log lines scattered through stages,
//! the pipeline notifies an injected middleware stack, so tests can
//! assert on counters instead of parsing log text.
//!
//! # Architecture
//! ```text
//!   stage call ──► stack.before_stage()  (registration order)
//!                      │
//!                      ▼
//!              retry-wrapped stage op
//!                      │
//!          ok ─────────┼───────── err (retries exhausted)
//!           │          │            │
//!   stack.after_stage()│    stack.on_stage_error()
//!        (reverse order)            │
//!                           process boundary ──► stack.on_fallback()
//! ```
//!
//! Middlewares are executed in registration order for `before_stage` and
//! reverse order for `after_stage`.

use async_trait::async_trait;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::error::{Result, VectorError};

// ============================================================================
// Stage Names
// ============================================================================

/// The non-terminal states of one `process` call, in pipeline order.
///
/// `ErrorFallback` is reachable from any of these once the stage's
/// retries are exhausted; middleware observes that transition through
/// [`PipelineMiddleware::on_fallback`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Raw embedding generation.
    Embedding,
    /// Normalization plus optional reasoning boost.
    Refining,
    /// Deterministic compute boost and clamp.
    ComputeEnhancement,
    /// Scalar quality scoring (concurrent with RuleLookup).
    QualityEvaluation,
    /// Domain rule lookup (concurrent with QualityEvaluation).
    RuleLookup,
    /// Domain enhancement, the join point of the two branches.
    FinalEnhancement,
}

impl Stage {
    /// Stable name used in diagnostics and error messages.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Embedding => "embedding",
            Self::Refining => "refining",
            Self::ComputeEnhancement => "compute_enhancement",
            Self::QualityEvaluation => "quality_evaluation",
            Self::RuleLookup => "rule_lookup",
            Self::FinalEnhancement => "final_enhancement",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Middleware Trait
// ============================================================================

/// Middleware for intercepting pipeline stage calls.
///
/// Implement this trait to add cross-cutting concerns to every stage.
/// All hooks default to no-ops so implementations override only what
/// they need.
#[async_trait]
pub trait PipelineMiddleware: Send + Sync {
    /// Middleware name for debugging and logging.
    fn name(&self) -> &str;

    /// Called before a stage runs (before its first attempt).
    ///
    /// Return `Err` to abort the stage; the error flows into the
    /// pipeline's fallback path like any stage failure.
    async fn before_stage(&self, stage: Stage) -> Result<()> {
        let _ = stage;
        Ok(())
    }

    /// Called after a stage succeeded.
    async fn after_stage(&self, stage: Stage, duration_ms: u64) -> Result<()> {
        let _ = (stage, duration_ms);
        Ok(())
    }

    /// Called when a stage gave up (retries exhausted or deterministic
    /// failure).
    async fn on_stage_error(&self, stage: Stage, error: &VectorError) {
        let _ = (stage, error);
    }

    /// Called at the `process` boundary when a failed run degrades to
    /// the fallback result.
    async fn on_fallback(&self, error: &VectorError) {
        let _ = error;
    }
}

// ============================================================================
// Middleware Stack
// ============================================================================

/// Stack of middlewares to execute in order.
#[derive(Default)]
pub struct PipelineMiddlewareStack {
    middlewares: Vec<Arc<dyn PipelineMiddleware>>,
}

impl PipelineMiddlewareStack {
    /// Create a new empty middleware stack.
    pub fn new() -> Self {
        Self {
            middlewares: Vec::new(),
        }
    }

    /// Add a middleware to the stack.
    pub fn add(&mut self, middleware: Arc<dyn PipelineMiddleware>) {
        self.middlewares.push(middleware);
    }

    /// Get the number of middlewares.
    pub fn len(&self) -> usize {
        self.middlewares.len()
    }

    /// Check if the stack is empty.
    pub fn is_empty(&self) -> bool {
        self.middlewares.is_empty()
    }

    /// Execute all before hooks in registration order.
    pub async fn before_stage(&self, stage: Stage) -> Result<()> {
        for middleware in &self.middlewares {
            middleware.before_stage(stage).await?;
        }
        Ok(())
    }

    /// Execute all after hooks in reverse order.
    pub async fn after_stage(&self, stage: Stage, duration_ms: u64) -> Result<()> {
        for middleware in self.middlewares.iter().rev() {
            middleware.after_stage(stage, duration_ms).await?;
        }
        Ok(())
    }

    /// Notify all middlewares of a stage failure.
    pub async fn on_stage_error(&self, stage: Stage, error: &VectorError) {
        for middleware in &self.middlewares {
            middleware.on_stage_error(stage, error).await;
        }
    }

    /// Notify all middlewares that a run degraded to the fallback result.
    pub async fn on_fallback(&self, error: &VectorError) {
        for middleware in &self.middlewares {
            middleware.on_fallback(error).await;
        }
    }
}

// ============================================================================
// Built-in Middleware Implementations
// ============================================================================

/// Logging middleware emitting structured tracing events per stage.
#[derive(Debug, Default)]
pub struct LoggingMiddleware;

impl LoggingMiddleware {
    /// Create a new logging middleware.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl PipelineMiddleware for LoggingMiddleware {
    fn name(&self) -> &str {
        "logging"
    }

    async fn before_stage(&self, stage: Stage) -> Result<()> {
        tracing::debug!(stage = %stage, "stage starting");
        Ok(())
    }

    async fn after_stage(&self, stage: Stage, duration_ms: u64) -> Result<()> {
        tracing::debug!(stage = %stage, duration_ms, "stage completed");
        Ok(())
    }

    async fn on_stage_error(&self, stage: Stage, error: &VectorError) {
        tracing::warn!(stage = %stage, error = %error, "stage failed");
    }

    async fn on_fallback(&self, error: &VectorError) {
        tracing::error!(error = %error, "pipeline degraded to fallback result");
    }
}

/// Metrics middleware tracking stage statistics with atomic counters.
///
/// Hold on to the `Arc` you registered and read the counters after the
/// run; no log parsing required.
#[derive(Debug, Default)]
pub struct MetricsMiddleware {
    /// Stage attempts observed (before hooks fired).
    pub stages_started: AtomicU64,
    /// Stages that completed successfully.
    pub stages_completed: AtomicU64,
    /// Stages that gave up after retries.
    pub stage_failures: AtomicU64,
    /// Runs that degraded to the fallback result.
    pub fallbacks: AtomicU64,
    /// Total time spent in successful stages, milliseconds.
    pub total_stage_time_ms: AtomicU64,
}

impl MetricsMiddleware {
    /// Create a new metrics middleware with zeroed counters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all counters.
    pub fn summary(&self) -> MetricsSummary {
        MetricsSummary {
            stages_started: self.stages_started.load(Ordering::Relaxed),
            stages_completed: self.stages_completed.load(Ordering::Relaxed),
            stage_failures: self.stage_failures.load(Ordering::Relaxed),
            fallbacks: self.fallbacks.load(Ordering::Relaxed),
            total_stage_time_ms: self.total_stage_time_ms.load(Ordering::Relaxed),
        }
    }
}

#[async_trait]
impl PipelineMiddleware for MetricsMiddleware {
    fn name(&self) -> &str {
        "metrics"
    }

    async fn before_stage(&self, _stage: Stage) -> Result<()> {
        self.stages_started.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    async fn after_stage(&self, _stage: Stage, duration_ms: u64) -> Result<()> {
        self.stages_completed.fetch_add(1, Ordering::Relaxed);
        self.total_stage_time_ms
            .fetch_add(duration_ms, Ordering::Relaxed);
        Ok(())
    }

    async fn on_stage_error(&self, _stage: Stage, _error: &VectorError) {
        self.stage_failures.fetch_add(1, Ordering::Relaxed);
    }

    async fn on_fallback(&self, _error: &VectorError) {
        self.fallbacks.fetch_add(1, Ordering::Relaxed);
    }
}

/// Snapshot of pipeline metrics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSummary {
    /// Stage attempts observed.
    pub stages_started: u64,
    /// Stages that completed successfully.
    pub stages_completed: u64,
    /// Stages that gave up after retries.
    pub stage_failures: u64,
    /// Runs that degraded to the fallback result.
    pub fallbacks: u64,
    /// Total time spent in successful stages, milliseconds.
    pub total_stage_time_ms: u64,
}
