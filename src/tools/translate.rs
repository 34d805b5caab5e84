//! Tradutor de textos de interface: três versões em inglês.

use super::{complete_timed, require, ToolError, Variants};
use crate::llm::LlmClient;
use crate::prompts::translation;
use crate::session::Session;
use crate::types::{ChatMessage, ChatRequest};

pub const MAX_TOKENS: u32 = 1000;

pub async fn translate(
    session: &mut Session,
    client: &dyn LlmClient,
    chinese_text: &str,
    context: Option<&str>,
) -> Result<Variants, ToolError> {
    let text = require("中文文本", chinese_text)?;
    let prompt = translation::build(text, context);
    log::info!("🌐 Traduzindo {} chars {}", text.chars().count(), prompt);

    let request = ChatRequest::new(ChatMessage::user(prompt.user)).with_max_tokens(MAX_TOKENS);
    let raw = complete_timed(session, client, &request).await?;

    Ok(Variants::parse(raw, translation::contract()))
}
