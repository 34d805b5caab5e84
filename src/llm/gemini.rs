// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// CLIENTE GEMINI (Generative Language API)
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//
// `generateContent` para chamadas bloqueantes e `streamGenerateContent`
// com `alt=sse` para streaming. Thinking habilitado com budget dinâmico.
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

use super::{sse, LlmClient, LlmError, TextStream};
use crate::config::{LlmProvider, DEFAULT_GEMINI_MODEL};
use crate::types::{ChatRequest, ContentPart, Role};

const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Cliente para a API Gemini.
pub struct GeminiClient {
    api_key: String,
    model: String,
    base_url: String,
    client: reqwest::Client,
}

impl GeminiClient {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            model: DEFAULT_GEMINI_MODEL.into(),
            base_url: API_BASE.into(),
            client: reqwest::Client::new(),
        }
    }

    pub fn with_model(mut self, model: &str) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').into();
        self
    }

    fn url(&self, method: &str) -> String {
        format!("{}/models/{}:{}", self.base_url, self.model, method)
    }

    pub(crate) fn build_body(&self, request: &ChatRequest) -> Value {
        let contents: Vec<Value> = request
            .messages
            .iter()
            .map(|m| {
                let role = match m.role {
                    Role::User => "user",
                    Role::Assistant => "model",
                };
                let parts: Vec<Value> = m.parts.iter().map(part).collect();
                json!({ "role": role, "parts": parts })
            })
            .collect();

        let mut generation_config = json!({
            "thinkingConfig": { "thinkingBudget": -1 },
            "responseMimeType": "text/plain",
            "maxOutputTokens": request.max_tokens,
        });
        if let Some(temperature) = request.temperature {
            generation_config["temperature"] = json!(temperature);
        }

        let mut body = json!({
            "contents": contents,
            "generationConfig": generation_config,
        });
        if let Some(system) = &request.system {
            body["systemInstruction"] = json!({ "parts": [{ "text": system }] });
        }
        body
    }

    async fn post(&self, url: &str, request: &ChatRequest) -> Result<reqwest::Response, LlmError> {
        let response = self
            .client
            .post(url)
            .header("x-goog-api-key", &self.api_key)
            .json(&self.build_body(request))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            log::error!("❌ Gemini {}: {}", status, body);
            return Err(LlmError::from_status(status, body));
        }
        Ok(response)
    }
}

fn part(part: &ContentPart) -> Value {
    match part {
        ContentPart::Text(text) => json!({ "text": text }),
        ContentPart::InlineImage { media_type, data } => json!({
            "inlineData": { "mimeType": media_type, "data": data },
        }),
        ContentPart::ImageUrl(url) => json!({
            "fileData": { "fileUri": url },
        }),
    }
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Deserialize)]
struct Part {
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    thought: Option<bool>,
}

/// Texto do primeiro candidato, sem partes de raciocínio.
fn candidate_text(body: &str) -> Result<String, LlmError> {
    let parsed: GenerateResponse =
        serde_json::from_str(body).map_err(|e| LlmError::ParseError(e.to_string()))?;

    Ok(parsed
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|c| {
            c.parts
                .into_iter()
                .filter(|p| p.thought != Some(true))
                .filter_map(|p| p.text)
                .collect()
        })
        .unwrap_or_default())
}

/// Um evento SSE do stream; eventos sem texto são ignorados.
pub(crate) fn parse_stream_event(data: &str) -> Option<Result<String, LlmError>> {
    match candidate_text(data) {
        Ok(text) if text.is_empty() => None,
        other => Some(other),
    }
}

#[async_trait]
impl LlmClient for GeminiClient {
    fn provider(&self) -> LlmProvider {
        LlmProvider::Gemini
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn complete(&self, request: &ChatRequest) -> Result<String, LlmError> {
        log::debug!("📤 Gemini {} {}", self.model, request);
        let response = self.post(&self.url("generateContent"), request).await?;
        let body = response.text().await?;

        let text = candidate_text(&body)?;
        if text.is_empty() {
            return Err(LlmError::EmptyResponse("Gemini".into()));
        }
        Ok(text)
    }

    async fn stream(&self, request: &ChatRequest) -> Result<TextStream, LlmError> {
        log::debug!("📤 Gemini stream {} {}", self.model, request);
        let url = format!("{}?alt=sse", self.url("streamGenerateContent"));
        let response = self.post(&url, request).await?;
        Ok(sse::text_stream(response, parse_stream_event))
    }
}
