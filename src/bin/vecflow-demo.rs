//! Demonstration entry point.
//!
//! Shows a single `process` call, a `batch_process` call, adaptive
//! enhancement, and the security-gate collaborator. Observability is
//! initialized here, explicitly, by the caller; the library itself only
//! emits `tracing` events.
//!
//! ```sh
//! RUST_LOG=info cargo run --bin vecflow-demo
//! ```

use std::sync::Arc;

use tracing::info;
use vecflow::{
    LocalSecurityGate, LoggingMiddleware, MetricsMiddleware, ProviderFactory, SecurityGate,
    VectorPipeline, DEFAULT_DOMAIN,
};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let provider = match ProviderFactory::from_env() {
        Ok(provider) => provider,
        Err(error) => {
            eprintln!("provider configuration error: {error}");
            std::process::exit(1);
        }
    };
    info!(provider = provider.name(), model = provider.model(), "provider selected");

    let metrics = Arc::new(MetricsMiddleware::new());
    let pipeline = VectorPipeline::builder()
        .provider(provider)
        .middleware(Arc::new(LoggingMiddleware::new()))
        .middleware(metrics.clone())
        .build();

    // A surrounding application gates pipeline invocation; the core never
    // calls the security gate itself.
    let gate = LocalSecurityGate::permissive();
    gate.rotate_keys().await;
    if !gate.validate_access("demo-user", "pipeline").await {
        eprintln!("access denied");
        std::process::exit(1);
    }

    let text = "vecflow integrates embedding generation and 3D rendering for software.";
    let result = pipeline.process(text, "software").await;
    info!(
        quality = result.quality,
        head = ?&result.vector[..result.vector.len().min(5)],
        "single text processed"
    );

    let batch = vec![
        "vecflow is a pipeline.".to_string(),
        "Embeddings drive retrieval.".to_string(),
        "Domain rules bias enhancement.".to_string(),
    ];
    let results = pipeline.batch_process(&batch, "software").await;
    for (index, item) in results.iter().enumerate() {
        info!(
            index,
            quality = item.quality,
            head = ?&item.vector[..item.vector.len().min(5)],
            "batch item processed"
        );
    }

    let adapted = pipeline
        .adaptive_enhancement(results[0].vector.clone(), DEFAULT_DOMAIN)
        .await;
    info!(head = ?&adapted[..adapted.len().min(5)], "adaptive enhancement applied");

    gate.audit_log("demo run complete");
    info!(summary = ?metrics.summary(), "pipeline metrics");
}
