//! End-to-end tests for the vector pipeline.
//!
//! These tests exercise the public `process` / `batch_process` /
//! `adaptive_enhancement` contract: result shape, order preservation,
//! the fail-soft boundary, and the hand-computed stage trace.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use vecflow::{
    EmbeddingProvider, MetricsMiddleware, MockProvider, PipelineConfig, PipelineResult,
    RandomProvider, Result, RetryConfig, VectorPipeline, DEFAULT_DOMAIN,
};

/// Retry config with millisecond delays so failure tests stay fast.
fn fast_retry() -> RetryConfig {
    RetryConfig {
        max_attempts: 3,
        base_delay_ms: 1,
        max_delay_ms: 5,
    }
}

/// Pipeline backed by a deterministic random provider.
fn seeded_pipeline() -> VectorPipeline {
    VectorPipeline::builder()
        .provider(Arc::new(RandomProvider::seeded(42)))
        .build()
}

#[tokio::test]
async fn test_process_returns_configured_shape() {
    let pipeline = seeded_pipeline();

    for text in ["a", "some longer text", "ünïcode too"] {
        let result = pipeline.process(text, DEFAULT_DOMAIN).await;
        assert_eq!(result.vector.len(), 384, "dimensionality is constant");
        assert!((0.0..=1.0).contains(&result.quality));
        assert!(result.vector.iter().all(|c| (0.0..=1.0).contains(c)));
    }
}

#[tokio::test]
async fn test_batch_preserves_input_order() {
    let pipeline = seeded_pipeline();
    let texts: Vec<String> = (0..8).map(|i| format!("text number {i}")).collect();

    let batch = pipeline.batch_process(&texts, "software").await;
    assert_eq!(batch.len(), texts.len());

    // The seeded provider is per-text deterministic, so each batch slot
    // must match the equivalent single-text call regardless of the order
    // in which the concurrent items completed.
    for (text, batch_result) in texts.iter().zip(batch.iter()) {
        let single = pipeline.process(text, "software").await;
        assert_eq!(&single, batch_result);
    }
}

#[tokio::test]
async fn test_empty_batch() {
    let pipeline = seeded_pipeline();
    let batch = pipeline.batch_process(&[], DEFAULT_DOMAIN).await;
    assert!(batch.is_empty());
}

#[tokio::test]
async fn test_total_capability_failure_degrades_to_fallback() {
    let provider = MockProvider::new();
    provider.fail_times(usize::MAX);

    let metrics = Arc::new(MetricsMiddleware::new());
    let pipeline = VectorPipeline::builder()
        .provider(Arc::new(provider))
        .config(PipelineConfig {
            retry: fast_retry(),
            ..Default::default()
        })
        .middleware(metrics.clone())
        .build();

    // Never an error, never a panic: the documented fallback result.
    let result = pipeline.process("text", DEFAULT_DOMAIN).await;
    assert_eq!(result, PipelineResult::fallback(384));

    let summary = metrics.summary();
    assert_eq!(summary.fallbacks, 1);
    assert_eq!(summary.stage_failures, 1);
}

#[tokio::test]
async fn test_successful_run_reports_all_six_stages() {
    let metrics = Arc::new(MetricsMiddleware::new());
    let pipeline = VectorPipeline::builder()
        .provider(Arc::new(RandomProvider::seeded(7)))
        .middleware(metrics.clone())
        .build();

    let result = pipeline.process("text", "software").await;
    assert!(!result.is_fallback());

    let summary = metrics.summary();
    assert_eq!(summary.stages_started, 6);
    assert_eq!(summary.stages_completed, 6);
    assert_eq!(summary.stage_failures, 0);
    assert_eq!(summary.fallbacks, 0);
}

#[tokio::test]
async fn test_known_vector_trace_matches_hand_computation() {
    // A 4-dim unit vector: four components of 0.5 (0.25 * 4 = 1).
    let provider = MockProvider::with_dimension(4);
    provider.add_embedding(vec![0.5; 4]).await;

    let pipeline = VectorPipeline::builder()
        .provider(Arc::new(provider))
        .config(PipelineConfig {
            dimension: 4,
            ..Default::default()
        })
        .build();

    let result = pipeline.process("traced", "software").await;

    // Refiner: norm is 1, reasoning boost x1.01 -> 0.505
    // ComputeEnhancer: x1.02 -> 0.5151 (no clamping, below 1)
    // QualityEvaluator: mean of equal components -> 0.5151
    // Enhancer (software): x1.05 -> 0.540855
    let expected_component = 0.5_f32 * 1.01 * 1.02 * 1.05;
    let expected_quality = 0.5_f32 * 1.01 * 1.02;

    assert_eq!(result.vector.len(), 4);
    for component in &result.vector {
        assert!(
            (component - expected_component).abs() < 1e-6,
            "got {component}, expected {expected_component}"
        );
    }
    assert!((result.quality - expected_quality).abs() < 1e-6);
}

#[tokio::test]
async fn test_zero_norm_embedding_hits_fallback_path() {
    let provider = MockProvider::with_dimension(4);
    provider.add_embedding(vec![0.0; 4]).await;

    let pipeline = VectorPipeline::builder()
        .provider(Arc::new(provider))
        .config(PipelineConfig {
            dimension: 4,
            retry: fast_retry(),
            ..Default::default()
        })
        .build();

    // The refiner rejects the zero-norm vector; the pipeline absorbs it.
    let result = pipeline.process("degenerate", DEFAULT_DOMAIN).await;
    assert_eq!(result, PipelineResult::fallback(4));
}

#[tokio::test]
async fn test_deadline_expiry_degrades_to_fallback() {
    let provider = MockProvider::new().with_latency(Duration::from_millis(200));

    let pipeline = VectorPipeline::builder()
        .provider(Arc::new(provider))
        .config(PipelineConfig {
            deadline_ms: Some(10),
            retry: fast_retry(),
            ..Default::default()
        })
        .build();

    let result = pipeline.process("slow", DEFAULT_DOMAIN).await;
    assert_eq!(result, PipelineResult::fallback(384));
}

/// A provider that panics, to exercise the batch join failure path.
#[derive(Debug)]
struct PanickingProvider;

#[async_trait]
impl EmbeddingProvider for PanickingProvider {
    fn name(&self) -> &str {
        "panicking"
    }
    fn model(&self) -> &str {
        "panicking"
    }
    fn dimension(&self) -> usize {
        384
    }
    fn max_tokens(&self) -> usize {
        512
    }
    async fn embed(&self, _texts: &[String]) -> Result<Vec<Vec<f32>>> {
        panic!("infrastructure meltdown");
    }
}

#[tokio::test]
async fn test_batch_join_failure_degrades_whole_batch() {
    let pipeline = VectorPipeline::builder()
        .provider(Arc::new(PanickingProvider))
        .build();

    let texts: Vec<String> = (0..3).map(|i| format!("text {i}")).collect();
    let batch = pipeline.batch_process(&texts, DEFAULT_DOMAIN).await;

    // All-or-nothing: same length as the input, every slot the fallback.
    assert_eq!(batch.len(), texts.len());
    for result in &batch {
        assert_eq!(result, &PipelineResult::fallback(384));
    }
}

#[tokio::test]
async fn test_adaptive_variance_threshold() {
    let pipeline = seeded_pipeline();

    // Low variance: boost applied on top of the software factor.
    let flat = vec![0.5; 16];
    let boosted = pipeline.adaptive_enhancement(flat.clone(), "software").await;
    for component in &boosted {
        assert!((component - 0.5 * 1.05 * 1.1).abs() < 1e-6);
    }

    // High variance: plain domain enhancement only.
    let spread: Vec<f32> = (0..16).map(|i| (i % 2) as f32).collect();
    let enhanced = pipeline.adaptive_enhancement(spread.clone(), "software").await;
    for (component, original) in enhanced.iter().zip(spread.iter()) {
        assert!((component - (original * 1.05).clamp(0.0, 1.0)).abs() < 1e-6);
    }
}
