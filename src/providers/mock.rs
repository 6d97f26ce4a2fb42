//! Mock embedding provider for testing.
//!
//! Deterministic test double with two scripting knobs:
//! - a queue of embeddings returned in order (falling back to a constant
//!   vector when the queue is empty)
//! - failure injection: fail the next N `embed` calls, for retry and
//!   fallback-path tests
//!
//! An optional artificial latency simulates a slow capability for
//! deadline tests.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::sleep;

use crate::error::{Result, VectorError};
use crate::traits::EmbeddingProvider;

/// Mock embedding provider for testing.
#[derive(Debug, Clone)]
pub struct MockProvider {
    embeddings: Arc<Mutex<Vec<Vec<f32>>>>,
    fail_next: Arc<AtomicUsize>,
    call_count: Arc<AtomicUsize>,
    dimension: usize,
    latency: Option<Duration>,
}

impl MockProvider {
    /// Create a new mock provider with the default 384 dimensionality.
    pub fn new() -> Self {
        Self::with_dimension(crate::providers::random::DEFAULT_DIMENSION)
    }

    /// Create a mock provider with a specific dimensionality.
    pub fn with_dimension(dimension: usize) -> Self {
        Self {
            embeddings: Arc::new(Mutex::new(Vec::new())),
            fail_next: Arc::new(AtomicUsize::new(0)),
            call_count: Arc::new(AtomicUsize::new(0)),
            dimension,
            latency: None,
        }
    }

    /// Add an artificial delay before every response.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Queue an embedding to be returned by the next `embed` call.
    pub async fn add_embedding(&self, embedding: Vec<f32>) {
        self.embeddings.lock().await.push(embedding);
    }

    /// Script the next `count` calls to fail with a provider error.
    pub fn fail_times(&self, count: usize) {
        self.fail_next.store(count, Ordering::SeqCst);
    }

    /// Number of `embed` calls made (including scripted failures).
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EmbeddingProvider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    fn model(&self) -> &str {
        "mock-embedding"
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn max_tokens(&self) -> usize {
        512
    }

    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if let Some(latency) = self.latency {
            sleep(latency).await;
        }
        self.call_count.fetch_add(1, Ordering::SeqCst);

        if self.fail_next.load(Ordering::SeqCst) > 0 {
            self.fail_next.fetch_sub(1, Ordering::SeqCst);
            return Err(VectorError::Provider("scripted failure".to_string()));
        }

        let mut results = Vec::with_capacity(texts.len());
        let mut embeddings = self.embeddings.lock().await;
        for _ in texts {
            let embedding = if embeddings.is_empty() {
                vec![0.1; self.dimension]
            } else {
                embeddings.remove(0)
            };
            results.push(embedding);
        }
        Ok(results)
    }
}
