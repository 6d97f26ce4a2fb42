//! Embedding provider implementations.
//!
//! The crate bundles exactly two providers:
//! - [`RandomProvider`]: the documented fallback when no real embedding
//!   capability is configured
//! - [`MockProvider`]: a scriptable test double
//!
//! Real capabilities implement [`crate::traits::EmbeddingProvider`]
//! out of crate and plug in at pipeline construction.

pub mod mock;
pub mod random;

pub use mock::MockProvider;
pub use random::RandomProvider;
