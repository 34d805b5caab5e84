//! Sugestões de resposta a partir do print de uma conversa.
//!
//! Cada geração bem-sucedida acrescenta até três sugestões ao histórico da
//! sessão e consome uma das gerações permitidas.

use super::{complete_timed, ToolError};
use crate::extract::{extract, Segment};
use crate::image::prepare_image;
use crate::llm::LlmClient;
use crate::prompts::reply::{self, MAX_TOKENS, TEMPERATURE};
use crate::session::Session;
use crate::types::{ChatMessage, ChatRequest, ContentPart};

/// Uma imagem enviada pelo usuário.
#[derive(Debug, Clone, Copy)]
pub struct Screenshot<'a> {
    pub bytes: &'a [u8],
    pub file_name: Option<&'a str>,
}

/// Gera sugestões e as acumula na sessão.
///
/// Devolve só as sugestões desta geração; o histórico completo fica em
/// `session.suggestions`.
pub async fn suggest(
    session: &mut Session,
    client: &dyn LlmClient,
    screenshot: Screenshot<'_>,
) -> Result<Vec<Segment>, ToolError> {
    if !session.suggestions.can_generate() {
        return Err(ToolError::QuotaExhausted {
            used: session.suggestions.generations(),
            cap: session.suggestions.cap(),
        });
    }

    let image = prepare_image(screenshot.bytes, screenshot.file_name, session.config.image_max_bytes)?;
    let prompt = reply::build();

    // Imagem antes do texto
    let request = ChatRequest::new(ChatMessage::user_parts(vec![
        image.to_content_part(),
        ContentPart::text(prompt.user),
    ]))
    .with_max_tokens(MAX_TOKENS)
    .with_temperature(TEMPERATURE);

    let raw = complete_timed(session, client, &request).await?;
    let segments = extract(&raw, &reply::contract());

    session
        .suggestions
        .record(segments.iter().map(|s| s.text.clone()).collect());
    log::info!(
        "💬 {} sugestões novas, {} gerações restantes",
        segments.len(),
        session.suggestions.remaining()
    );

    Ok(segments)
}
