// Joins retrieved passages into the context handed to the response generator


use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// Anything that carries passage text
pub trait Passage {
    fn passage_text(&self) -> &str;
}

impl Passage for String {
    #[inline]
    fn passage_text(&self) -> &str {
        self
    }
}

impl Passage for &str {
    #[inline]
    fn passage_text(&self) -> &str {
        self
    }
}

impl Passage for crate::lexical::LexicalHit {
    #[inline]
    fn passage_text(&self) -> &str {
        &self.text
    }
}

impl Passage for crate::retrieval::ScoredChunk {
    #[inline]
    fn passage_text(&self) -> &str {
        &self.chunk.text
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContextStyle {
    /// Passages separated by a blank line
    #[default]
    Plain,
    /// Each passage preceded by a `[Source i]` label line
    Numbered,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssembleOptions {
    /// Keep at most this many passages; `None` keeps all
    pub max_items: Option<usize>,
    /// Drop passages whose trimmed text repeats an earlier one
    pub dedupe: bool,
    pub style: ContextStyle,
}

impl Default for AssembleOptions {
    #[inline]
    fn default() -> Self {
        Self {
            max_items: None,
            dedupe: false,
            style: ContextStyle::Plain,
        }
    }
}

impl AssembleOptions {
    #[inline]
    pub fn numbered() -> Self {
        Self {
            style: ContextStyle::Numbered,
            ..Self::default()
        }
    }

    #[inline]
    pub fn deduplicated(mut self) -> Self {
        self.dedupe = true;
        self
    }

    #[inline]
    pub fn with_max_items(mut self, max_items: usize) -> Self {
        self.max_items = Some(max_items);
        self
    }
}

/// Build a context string from `items` in their given order.
///
/// Blank passages are skipped. With `dedupe`, the first of several identical
/// passages is kept. The item limit applies after deduplication.
#[inline]
pub fn assemble<P: Passage>(items: &[P], options: &AssembleOptions) -> String {
    let mut seen = HashSet::new();
    let limit = options.max_items.unwrap_or(usize::MAX);

    let texts: Vec<&str> = items
        .iter()
        .map(|item| item.passage_text().trim())
        .filter(|text| !text.is_empty())
        .filter(|text| !options.dedupe || seen.insert(*text))
        .take(limit)
        .collect();

    match options.style {
        ContextStyle::Plain => texts.join("\n\n"),
        ContextStyle::Numbered => texts
            .iter()
            .enumerate()
            .map(|(i, text)| format!("[Source {}]\n{}", i + 1, text))
            .collect::<Vec<_>>()
            .join("\n\n"),
    }
}
