//! Reescrita de resposta formal em três versões faladas.

use super::{complete_timed, require, ToolError, Variants};
use crate::llm::LlmClient;
use crate::prompts::colloquial;
use crate::session::Session;
use crate::types::{ChatMessage, ChatRequest};

pub const MAX_TOKENS: u32 = 1000;

/// A pergunta do cliente pode vir vazia; o texto formal não.
pub async fn rewrite(
    session: &mut Session,
    client: &dyn LlmClient,
    question: &str,
    formal_text: &str,
) -> Result<Variants, ToolError> {
    let formal_text = require("书面化文本", formal_text)?;
    let prompt = colloquial::build(question.trim(), formal_text);
    log::info!("🗣️ Reescrevendo {} chars {}", formal_text.chars().count(), prompt);

    let request = ChatRequest::new(ChatMessage::user(prompt.user)).with_max_tokens(MAX_TOKENS);
    let raw = complete_timed(session, client, &request).await?;

    Ok(Variants::parse(raw, colloquial::contract()))
}
