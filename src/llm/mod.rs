// Response generation: chat model client and the offline fallback answer

pub mod chat;
pub mod fallback;

pub use chat::OpenAiChatClient;
pub use fallback::{NO_INFORMATION_MESSAGE, fallback_answer};

use crate::Result;

/// Instructions sent with every question
pub const SYSTEM_PROMPT: &str = "Ti si asistent IPI Akademije. Odgovaraj kratko i isključivo na osnovu datog konteksta. \
Ako odgovor nije u kontekstu, reci da nemaš tu informaciju.";

/// Turns a question plus retrieved context into an answer
pub trait ChatModel: Send + Sync {
    fn model(&self) -> &str;

    fn complete(&self, system: &str, user: &str) -> Result<String>;
}

/// User message combining the retrieved context and the question
#[inline]
pub fn build_user_prompt(query: &str, context: &str) -> String {
    format!("Kontekst:\n{}\n\nPitanje: {}", context.trim(), query.trim())
}
