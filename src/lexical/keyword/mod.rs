#[cfg(test)]
mod tests;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{BoostRules, LexicalHit, rank_hits};
use crate::text::{normalize, tokenize};

/// Added to a line's score when it contains the whole normalized query
pub const EXACT_PHRASE_BONUS: f32 = 5.0;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeywordMode {
    /// A line matches only when it contains every query token
    Strict,
    /// Lines are ranked by how often query and boost terms occur in them
    #[default]
    Scored,
}

/// Line-oriented keyword search
#[derive(Debug, Clone)]
pub struct KeywordSearch {
    pub mode: KeywordMode,
    pub max_results: usize,
    pub rules: BoostRules,
}

impl Default for KeywordSearch {
    #[inline]
    fn default() -> Self {
        Self::new(KeywordMode::Scored, 7)
    }
}

impl KeywordSearch {
    #[inline]
    pub fn new(mode: KeywordMode, max_results: usize) -> Self {
        Self {
            mode,
            max_results,
            rules: BoostRules::default_rules(),
        }
    }

    #[inline]
    pub fn with_rules(mut self, rules: BoostRules) -> Self {
        self.rules = rules;
        self
    }

    /// Search every line of `document`
    #[inline]
    pub fn search(&self, document: &str, query: &str) -> Vec<LexicalHit> {
        self.search_lines(document.lines(), query)
    }

    /// Search `lines`; positions in the result are indexes into `lines`
    pub fn search_lines<'a, I>(&self, lines: I, query: &str) -> Vec<LexicalHit>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let query_tokens = tokenize(query);
        if query_tokens.is_empty() || self.max_results == 0 {
            return Vec::new();
        }

        let phrase = normalize(query);
        let terms = match self.mode {
            KeywordMode::Strict => query_tokens.clone(),
            KeywordMode::Scored => {
                let mut terms = query_tokens.clone();
                for term in self.rules.expand(&query_tokens) {
                    if !terms.contains(&term) {
                        terms.push(term);
                    }
                }
                terms
            }
        };

        let mut hits: Vec<LexicalHit> = lines
            .into_iter()
            .enumerate()
            .filter_map(|(position, line)| {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    return None;
                }
                let normalized = normalize(trimmed);

                let score = match self.mode {
                    KeywordMode::Strict => query_tokens
                        .iter()
                        .all(|token| normalized.contains(token.as_str()))
                        .then_some(1.0)?,
                    KeywordMode::Scored => score_line(&normalized, &terms, &phrase),
                };

                (score > 0.0).then(|| LexicalHit {
                    text: trimmed.to_string(),
                    score,
                    position,
                })
            })
            .collect();

        rank_hits(&mut hits, self.max_results);
        debug!(
            "Keyword search ({:?}) found {} lines for {:?}",
            self.mode,
            hits.len(),
            query
        );
        hits
    }
}

fn score_line(normalized_line: &str, terms: &[String], phrase: &str) -> f32 {
    let occurrences: usize = terms
        .iter()
        .map(|term| normalized_line.matches(term.as_str()).count())
        .sum();

    let bonus = if !phrase.is_empty() && normalized_line.contains(phrase) {
        EXACT_PHRASE_BONUS
    } else {
        0.0
    };

    occurrences as f32 + bonus
}
