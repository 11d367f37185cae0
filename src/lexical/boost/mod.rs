
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::text::normalize;

/// Adds domain terms to a keyword search when the query mentions a topic.
///
/// A rule fires when any query token starts with one of its `triggers`; its
/// `extra_terms` are then scored alongside the query's own tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoostRule {
    pub name: String,
    pub triggers: Vec<String>,
    pub extra_terms: Vec<String>,
}

impl BoostRule {
    #[inline]
    pub fn new(name: &str, triggers: &[&str], extra_terms: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            triggers: triggers.iter().map(|t| normalize(t)).collect(),
            extra_terms: extra_terms.iter().map(|t| normalize(t)).collect(),
        }
    }

    #[inline]
    pub fn matches(&self, query_tokens: &[String]) -> bool {
        query_tokens.iter().any(|token| {
            self.triggers.iter().any(|trigger| {
                let trigger = normalize(trigger);
                !trigger.is_empty() && token.starts_with(&trigger)
            })
        })
    }
}

/// Ordered table of boost rules
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoostRules {
    rules: Vec<BoostRule>,
}

impl Default for BoostRules {
    #[inline]
    fn default() -> Self {
        Self::default_rules()
    }
}

impl BoostRules {
    #[inline]
    pub fn new(rules: Vec<BoostRule>) -> Self {
        Self { rules }
    }

    #[inline]
    pub fn none() -> Self {
        Self { rules: Vec::new() }
    }

    /// Use `rules` from configuration, or the built-in table when none are configured
    #[inline]
    pub fn from_config(rules: &[BoostRule]) -> Self {
        if rules.is_empty() {
            Self::default_rules()
        } else {
            Self::new(rules.to_vec())
        }
    }

    /// Built-in rules for the questions students ask most
    #[inline]
    pub fn default_rules() -> Self {
        Self::new(vec![
            BoostRule::new(
                "price",
                &[
                    "cijen", "cena", "cene", "kost", "skolarin", "uplat", "price", "fee",
                    "tuition", "cost",
                ],
                &["cijena", "2500km", "2500", "km", "bam"],
            ),
            BoostRule::new(
                "founder",
                &["osnivac", "osnovao", "tvorac", "founder"],
                &["osnivac", "tvorac", "amar", "tubic"],
            ),
            BoostRule::new(
                "programs",
                &["program", "studij", "smjer", "smer", "course", "study"],
                &["program", "studij", "smjer", "informatika", "ekonomija"],
            ),
            BoostRule::new(
                "location",
                &[
                    "lokacij", "adres", "gdje", "gde", "nalazi", "location", "address", "where",
                ],
                &["adresa", "tuzla", "zmaja", "bosne"],
            ),
            BoostRule::new(
                "contact",
                &["kontakt", "telefon", "email", "mail", "contact", "phone"],
                &["kontakt", "telefon", "tel", "email"],
            ),
        ])
    }

    #[inline]
    pub fn rules(&self) -> &[BoostRule] {
        &self.rules
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Normalized extra terms of every rule that fires for `query_tokens`, without duplicates
    #[inline]
    pub fn expand(&self, query_tokens: &[String]) -> Vec<String> {
        self.rules
            .iter()
            .filter(|rule| rule.matches(query_tokens))
            .inspect(|rule| debug!("Boost rule '{}' fired", rule.name))
            .flat_map(|rule| rule.extra_terms.iter().map(|term| normalize(term)))
            .filter(|term| !term.is_empty())
            .unique()
            .collect()
    }
}
