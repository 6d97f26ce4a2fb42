//! Domain rule lookup.
//!
//! The rule table is the single source of domain-specific behavior: the
//! pipeline asks it for a [`DomainRuleSet`] and applies whatever comes
//! back. Adding a domain means adding a table entry, never touching
//! pipeline logic.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

/// Enhancement multiplier applied to domains without a dedicated rule.
const NEUTRAL_FACTOR: f32 = 1.0;

/// Named numeric knobs that bias enhancement by use-case category.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DomainRuleSet {
    /// Multiplier applied to every vector component during final
    /// enhancement.
    pub enhancement_factor: f32,
}

impl Default for DomainRuleSet {
    fn default() -> Self {
        Self {
            enhancement_factor: NEUTRAL_FACTOR,
        }
    }
}

/// Case-insensitive lookup table from domain name to rule set.
#[derive(Debug, Clone)]
pub struct DomainRules {
    rules: HashMap<String, DomainRuleSet>,
}

impl DomainRules {
    /// Create the built-in table: "software" gets a 1.05 boost, every
    /// other domain (including empty/unknown) the neutral rule set.
    pub fn new() -> Self {
        let mut rules = HashMap::new();
        rules.insert(
            "software".to_string(),
            DomainRuleSet {
                enhancement_factor: 1.05,
            },
        );
        Self { rules }
    }

    /// Add or replace a domain rule. Domain names are stored lowercased.
    pub fn with_rule(mut self, domain: impl Into<String>, rule_set: DomainRuleSet) -> Self {
        self.rules.insert(domain.into().to_lowercase(), rule_set);
        self
    }

    /// Look up the rule set for a domain, case-insensitively. Unknown
    /// domains get the default (neutral) rule set.
    pub fn get_rules(&self, domain: &str) -> DomainRuleSet {
        let rule_set = self
            .rules
            .get(&domain.to_lowercase())
            .copied()
            .unwrap_or_default();
        debug!(
            domain,
            enhancement_factor = rule_set.enhancement_factor,
            "domain rules resolved"
        );
        rule_set
    }
}

impl Default for DomainRules {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_software_domain() {
        let rules = DomainRules::new();
        assert_eq!(rules.get_rules("software").enhancement_factor, 1.05);
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let rules = DomainRules::new();
        assert_eq!(rules.get_rules("Software"), rules.get_rules("software"));
        assert_eq!(rules.get_rules("SOFTWARE"), rules.get_rules("software"));
    }

    #[test]
    fn test_unknown_domain_is_neutral() {
        let rules = DomainRules::new();
        assert_eq!(rules.get_rules("unknown").enhancement_factor, 1.0);
        assert_eq!(rules.get_rules("").enhancement_factor, 1.0);
        assert_eq!(rules.get_rules("general").enhancement_factor, 1.0);
    }

    #[test]
    fn test_with_rule_extends_table() {
        let rules = DomainRules::new().with_rule(
            "Medical",
            DomainRuleSet {
                enhancement_factor: 1.2,
            },
        );
        // Stored lowercased, looked up case-insensitively.
        assert_eq!(rules.get_rules("medical").enhancement_factor, 1.2);
        assert_eq!(rules.get_rules("MEDICAL").enhancement_factor, 1.2);
        // Built-ins untouched.
        assert_eq!(rules.get_rules("software").enhancement_factor, 1.05);
    }

    #[test]
    fn test_rule_set_serde_defaults() {
        let rule_set: DomainRuleSet = serde_json::from_str("{}").unwrap();
        assert_eq!(rule_set.enhancement_factor, 1.0);
    }
}
