// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// OCR DE NOTAS (Doubao)
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//
// Reconhece o texto das imagens de uma nota, uma chamada por imagem, em
// ordem. Falha numa imagem não interrompe as demais.
//
// A busca e o scraping da página ficam fora daqui: a nota chega pronta
// (título, descrição e URLs das imagens).
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::{complete_timed, ToolError};
use crate::llm::LlmClient;
use crate::prompts::ocr::{self, NO_TEXT_MARKER};
use crate::session::Session;
use crate::types::{ChatMessage, ChatRequest, ContentPart};

/// Máximo de imagens processadas por nota.
pub const MAX_IMAGES: usize = 10;

/// Texto exibido para imagens sem texto.
pub const NO_TEXT_LABEL: &str = "未识别到文字";

static NOTE_ID_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"explore/([a-f0-9]+)",
        r"discovery/item/([a-f0-9]+)",
        r"/([a-f0-9]{24})",
    ]
    .iter()
    .filter_map(|p| Regex::new(p).ok())
    .collect()
});

static UNICODE_ESCAPE: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"\\u([0-9a-fA-F]{4})").ok());

/// Uma nota já buscada.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub images: Vec<String>,
}

impl Note {
    /// Limpa as URLs de imagem e aplica o limite de imagens.
    pub fn normalized(mut self) -> Self {
        self.images = self
            .images
            .iter()
            .map(|url| clean_image_url(url))
            .filter(|url| !url.is_empty())
            .take(MAX_IMAGES)
            .collect();
        self
    }
}

/// Prefixa `https://` quando falta o esquema.
pub fn normalize_note_url(url: &str) -> String {
    let url = url.trim();
    if url.starts_with("http://") || url.starts_with("https://") {
        url.to_string()
    } else {
        format!("https://{}", url)
    }
}

/// Retorna true para links de nota (`xiaohongshu.com` ou `xhslink.com`).
pub fn is_note_url(url: &str) -> bool {
    let Ok(parsed) = url::Url::parse(&normalize_note_url(url)) else {
        return false;
    };
    parsed
        .host_str()
        .map(|host| host.ends_with("xiaohongshu.com") || host.ends_with("xhslink.com"))
        .unwrap_or(false)
}

/// ID da nota: `explore/<hex>`, `discovery/item/<hex>` ou `/<24 hex>`.
pub fn extract_note_id(url: &str) -> Option<String> {
    NOTE_ID_PATTERNS
        .iter()
        .find_map(|re| re.captures(url))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Decodifica `\uXXXX` e `\/`.
fn decode_escapes(text: &str) -> String {
    let decoded = match UNICODE_ESCAPE.as_ref() {
        Some(re) => re
            .replace_all(text, |caps: &regex::Captures<'_>| {
                u32::from_str_radix(&caps[1], 16)
                    .ok()
                    .and_then(char::from_u32)
                    .map(String::from)
                    .unwrap_or_else(|| caps[0].to_string())
            })
            .into_owned(),
        None => text.to_string(),
    };
    decoded.replace("\\/", "/")
}

/// Normaliza uma URL de imagem vinda da página.
///
/// Remove `@` inicial, decodifica escapes, desembrulha objetos JSON
/// (`urlDefault` ou `url`) e garante o esquema.
pub fn clean_image_url(raw: &str) -> String {
    let mut url = raw.trim_start_matches('@').trim().to_string();
    if url.is_empty() {
        return url;
    }

    if url.contains("\\u") {
        url = decode_escapes(&url);
    }

    if url.starts_with('{') && url.ends_with('}') {
        if let Ok(value) = serde_json::from_str::<serde_json::Value>(&url) {
            let inner = value
                .get("urlDefault")
                .or_else(|| value.get("url"))
                .and_then(|v| v.as_str());
            if let Some(inner) = inner {
                url = decode_escapes(inner);
            }
        }
    }

    if url.starts_with("//") {
        format!("http:{}", url)
    } else if !url.starts_with("http://") && !url.starts_with("https://") {
        format!("http://{}", url)
    } else {
        url
    }
}

/// Resultado do reconhecimento de uma imagem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OcrOutcome {
    Text(String),
    NoText,
    Failed(String),
}

impl OcrOutcome {
    /// Normaliza o texto devolvido pelo modelo.
    pub fn from_reply(reply: &str) -> Self {
        let text = reply.trim();
        if text.is_empty() || text == NO_TEXT_MARKER {
            Self::NoText
        } else {
            Self::Text(text.to_string())
        }
    }

    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Texto para exibição.
    pub fn display(&self) -> &str {
        match self {
            Self::Text(text) => text,
            Self::NoText => NO_TEXT_LABEL,
            Self::Failed(error) => error,
        }
    }
}

/// Reconhecimento de uma imagem da nota.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageText {
    /// Posição original da imagem, 0-based.
    pub index: usize,
    pub url: String,
    pub outcome: OcrOutcome,
}

impl ImageText {
    /// Rótulo pela posição original: "图片1", "图片2", ...
    pub fn label(&self) -> String {
        format!("图片{}", self.index + 1)
    }
}

/// Reconhece o texto de uma imagem. Erros viram `OcrOutcome::Failed`.
pub async fn recognize_image(session: &mut Session, client: &dyn LlmClient, image_url: &str) -> OcrOutcome {
    let prompt = ocr::build();
    let request = ChatRequest::new(ChatMessage::user_parts(vec![
        ContentPart::ImageUrl(image_url.to_string()),
        ContentPart::text(prompt.user),
    ]));

    match complete_timed(session, client, &request).await {
        Ok(reply) => OcrOutcome::from_reply(&reply),
        Err(ToolError::Upstream(e)) => OcrOutcome::Failed(format!("豆包API调用错误: {}", e)),
        Err(e) => OcrOutcome::Failed(e.to_string()),
    }
}

/// Reconhece as imagens da nota em ordem, no máximo `MAX_IMAGES`.
///
/// `on_progress(atual, total)` é chamado antes de cada imagem.
pub async fn recognize_note<P>(
    session: &mut Session,
    client: &dyn LlmClient,
    note: &Note,
    mut on_progress: P,
) -> Vec<ImageText>
where
    P: FnMut(usize, usize),
{
    let total = note.images.len().min(MAX_IMAGES);
    log::info!("🔍 {} imagens para reconhecer", total);

    let mut results = Vec::with_capacity(total);
    for (index, url) in note.images.iter().take(MAX_IMAGES).enumerate() {
        on_progress(index + 1, total);
        let outcome = recognize_image(session, client, url).await;
        match &outcome {
            OcrOutcome::Text(text) => log::info!("✅ 图片{}: {} chars", index + 1, text.chars().count()),
            OcrOutcome::NoText => log::info!("⚠️ 图片{}: sem texto", index + 1),
            OcrOutcome::Failed(e) => log::warn!("❌ 图片{}: {}", index + 1, e),
        }
        results.push(ImageText {
            index,
            url: url.clone(),
            outcome,
        });
    }
    results
}
