
use std::sync::LazyLock;

use fancy_regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Markdown-style header: one to six `#` followed by a non-empty title
static HEADER_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#{1,6}(?!#)\s*(\S.*)$").expect("valid regex"));

/// What kind of line opened a chunk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChunkKind {
    Section,
    Bullet,
    Paragraph,
}

/// A contiguous span of the knowledge document, the unit of retrieval
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    /// The chunk text, source lines joined by newlines
    pub text: String,
    /// Title of the header this chunk falls under, if any
    pub section: Option<String>,
    /// Kind of the first line of the chunk
    #[serde(rename = "type")]
    pub kind: ChunkKind,
    /// Position of this chunk in the chunk sequence
    pub index: usize,
}

/// Configuration for document chunking
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingConfig {
    /// Maximum chunk length in characters before a new chunk is started
    pub max_chunk_size: usize,
}

impl Default for ChunkingConfig {
    #[inline]
    fn default() -> Self {
        Self {
            max_chunk_size: 500,
        }
    }
}

/// Lines gathered for the chunk currently being built
#[derive(Debug, Default)]
struct Accumulator {
    text: String,
    char_count: usize,
    kind: Option<ChunkKind>,
}

impl Accumulator {
    fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    fn push(&mut self, line: &str, kind: ChunkKind) {
        if self.text.is_empty() {
            self.kind = Some(kind);
        } else {
            self.text.push('\n');
            self.char_count += 1;
        }
        self.text.push_str(line);
        self.char_count += line.chars().count();
    }

    fn flush(&mut self, section: Option<&String>, chunks: &mut Vec<Chunk>) {
        if self.is_empty() {
            return;
        }

        let acc = std::mem::take(self);
        chunks.push(Chunk {
            text: acc.text,
            section: section.cloned(),
            kind: acc.kind.unwrap_or(ChunkKind::Paragraph),
            index: chunks.len(),
        });
    }
}

/// Split a knowledge document into chunks along headers and a size threshold.
///
/// Headers always open a new chunk. Other lines are appended to the current chunk
/// unless its length plus the new line would reach `max_chunk_size`, in which case
/// the current chunk is closed first. Lines are never split, so a single line longer
/// than the threshold becomes a chunk of its own.
#[inline]
pub fn chunk_document(document: &str, config: &ChunkingConfig) -> Vec<Chunk> {
    let mut chunks = Vec::new();
    let mut acc = Accumulator::default();
    let mut section: Option<String> = None;

    for raw_line in document.lines() {
        let line = raw_line.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(title) = header_title(line) {
            acc.flush(section.as_ref(), &mut chunks);
            section = Some(title.to_string());
            acc.push(line, ChunkKind::Section);
            continue;
        }

        if !acc.is_empty() && acc.char_count + line.chars().count() >= config.max_chunk_size {
            acc.flush(section.as_ref(), &mut chunks);
        }
        acc.push(line, line_kind(line));
    }

    acc.flush(section.as_ref(), &mut chunks);

    debug!(
        "Chunked document into {} chunks (avg {} tokens)",
        chunks.len(),
        chunks
            .iter()
            .map(|c| estimate_token_count(&c.text))
            .sum::<usize>()
            / chunks.len().max(1)
    );

    chunks
}

/// Title text of a header line, or `None` if the line is not a header
#[inline]
pub fn header_title(line: &str) -> Option<&str> {
    HEADER_REGEX
        .captures(line)
        .ok()
        .flatten()
        .and_then(|caps| caps.get(1))
        .map(|title| title.as_str().trim())
}

#[inline]
pub fn is_bullet(line: &str) -> bool {
    line.starts_with('-') || line.starts_with('*') || line.starts_with('•')
}

fn line_kind(line: &str) -> ChunkKind {
    if is_bullet(line) {
        ChunkKind::Bullet
    } else {
        ChunkKind::Paragraph
    }
}

/// Estimate token count using a simple heuristic
/// This is a rough approximation - actual tokenization would be more accurate
#[inline]
pub fn estimate_token_count(text: &str) -> usize {
    // Rough heuristic: 1 token ≈ 0.75 words for English text
    // Add extra tokens for punctuation and special characters
    let word_count = text.split_whitespace().count();
    let punct_count = text.chars().filter(|c| c.is_ascii_punctuation()).count();

    (punct_count as f64).mul_add(0.1, word_count as f64 / 0.75) as usize
}
