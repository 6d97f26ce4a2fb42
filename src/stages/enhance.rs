//! Final domain enhancement.

use tracing::trace;

use crate::error::Result;
use crate::rules::DomainRuleSet;
use crate::stages::scale_and_clamp;

/// Applies the domain enhancement multiplier and clamps to [0,1].
#[derive(Debug, Clone, Copy, Default)]
pub struct Enhancer;

impl Enhancer {
    /// Scale every component by `rules.enhancement_factor` and clamp.
    pub async fn enhance(&self, vector: Vec<f32>, rules: &DomainRuleSet) -> Result<Vec<f32>> {
        trace!(
            enhancement_factor = rules.enhancement_factor,
            "applying domain enhancement"
        );
        Ok(scale_and_clamp(vector, rules.enhancement_factor))
    }
}
