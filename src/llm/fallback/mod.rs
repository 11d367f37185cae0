
use crate::embeddings::chunking::{header_title, is_bullet};
use crate::lexical::BoostRules;
use crate::text::{normalize, tokenize};

/// Reply when retrieval found nothing for the question
pub const NO_INFORMATION_MESSAGE: &str =
    "Nisam pronašao informacije o vašem pitanju u bazi znanja IPI Akademije.";

/// Answer straight from the retrieved context, used when no chat model is available.
///
/// When the question fires one of `rules`, the first context line mentioning one of
/// that rule's terms is returned; otherwise the first content line. Headers and
/// `[Source i]` labels are skipped and bullet markers are stripped.
#[inline]
pub fn fallback_answer(query: &str, context: &str, rules: &BoostRules) -> String {
    let lines: Vec<&str> = context
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && header_title(line).is_none() && !is_source_label(line))
        .collect();

    let Some(first) = lines.first() else {
        return NO_INFORMATION_MESSAGE.to_string();
    };

    let topic_terms = rules.expand(&tokenize(query));
    let chosen = lines
        .iter()
        .find(|line| {
            let normalized = normalize(line);
            topic_terms
                .iter()
                .any(|term| normalized.contains(term.as_str()))
        })
        .unwrap_or(first);

    strip_bullet(chosen).to_string()
}

fn is_source_label(line: &str) -> bool {
    line.starts_with("[Source ") && line.ends_with(']')
}

fn strip_bullet(line: &str) -> &str {
    if is_bullet(line) {
        line.trim_start_matches(['-', '*', '•']).trim_start()
    } else {
        line
    }
}
