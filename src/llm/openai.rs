// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// CLIENTE COMPATÍVEL COM OPENAI (Chat Completions)
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//
// Serve a OpenAI e qualquer endpoint com o mesmo protocolo, como o Doubao
// (Volcengine Ark), trocando só a URL base e o modelo.
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

use super::{sse, LlmClient, LlmError, TextStream};
use crate::config::{LlmProvider, DEFAULT_ARK_BASE_URL, DEFAULT_OPENAI_BASE_URL, DEFAULT_OPENAI_MODEL};
use crate::types::{ChatMessage, ChatRequest, ContentPart};

/// Cliente para APIs no formato OpenAI Chat Completions.
pub struct OpenAiCompatClient {
    provider: LlmProvider,
    api_key: String,
    model: String,
    base_url: String,
    client: reqwest::Client,
}

impl OpenAiCompatClient {
    /// Cliente OpenAI oficial.
    pub fn new(api_key: String) -> Self {
        Self {
            provider: LlmProvider::OpenAi,
            api_key,
            model: DEFAULT_OPENAI_MODEL.into(),
            base_url: DEFAULT_OPENAI_BASE_URL.into(),
            client: reqwest::Client::new(),
        }
    }

    /// Cliente Doubao: o "modelo" é o ID do endpoint de inferência.
    pub fn doubao(api_key: String, endpoint_id: &str) -> Self {
        Self {
            provider: LlmProvider::Doubao,
            api_key,
            model: endpoint_id.into(),
            base_url: DEFAULT_ARK_BASE_URL.into(),
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

    fn url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    pub(crate) fn build_body(&self, request: &ChatRequest, stream: bool) -> Value {
        let mut messages = Vec::new();
        if let Some(system) = &request.system {
            messages.push(json!({ "role": "system", "content": system }));
        }
        messages.extend(request.messages.iter().map(message));

        let mut body = json!({
            "model": self.model,
            "messages": messages,
            "max_tokens": request.max_tokens,
        });
        if let Some(temperature) = request.temperature {
            body["temperature"] = json!(temperature);
        }
        if stream {
            body["stream"] = json!(true);
        }
        body
    }

    async fn post(&self, request: &ChatRequest, stream: bool) -> Result<reqwest::Response, LlmError> {
        let response = self
            .client
            .post(self.url())
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&self.build_body(request, stream))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            log::error!("❌ {} {}: {}", self.provider, status, body);
            return Err(LlmError::from_status(status, body));
        }
        Ok(response)
    }
}

/// Mensagens só de texto usam `content` string; as demais, lista de partes.
fn message(m: &ChatMessage) -> Value {
    if m.is_text_only() {
        return json!({ "role": m.role.as_str(), "content": m.text() });
    }

    let parts: Vec<Value> = m
        .parts
        .iter()
        .map(|p| match p {
            ContentPart::Text(text) => json!({ "type": "text", "text": text }),
            other => json!({
                "type": "image_url",
                "image_url": { "url": other.to_data_url().unwrap_or_default() },
            }),
        })
        .collect();
    json!({ "role": m.role.as_str(), "content": parts })
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    #[serde(default)]
    message: Option<ChatResponseMessage>,
    #[serde(default)]
    delta: Option<ChatResponseMessage>,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Conteúdo da primeira escolha de uma resposta completa.
pub(crate) fn parse_response(body: &str) -> Result<String, LlmError> {
    let parsed: ChatResponse =
        serde_json::from_str(body).map_err(|e| LlmError::ParseError(e.to_string()))?;

    parsed
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message)
        .and_then(|m| m.content)
        .ok_or_else(|| LlmError::EmptyResponse("chat/completions".into()))
}

/// Um evento SSE: `choices[0].delta.content`, ou nada para `[DONE]` e deltas vazios.
pub(crate) fn parse_stream_event(data: &str) -> Option<Result<String, LlmError>> {
    if data.trim() == "[DONE]" {
        return None;
    }

    let parsed: ChatResponse = match serde_json::from_str(data) {
        Ok(parsed) => parsed,
        Err(e) => return Some(Err(LlmError::ParseError(e.to_string()))),
    };

    parsed
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.delta)
        .and_then(|d| d.content)
        .filter(|content| !content.is_empty())
        .map(Ok)
}

#[async_trait]
impl LlmClient for OpenAiCompatClient {
    fn provider(&self) -> LlmProvider {
        self.provider
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn complete(&self, request: &ChatRequest) -> Result<String, LlmError> {
        log::debug!("📤 {} {} {}", self.provider, self.model, request);
        let response = self.post(request, false).await?;
        let body = response.text().await?;
        parse_response(&body)
    }

    async fn stream(&self, request: &ChatRequest) -> Result<TextStream, LlmError> {
        log::debug!("📤 {} stream {} {}", self.provider, self.model, request);
        let response = self.post(request, true).await?;
        Ok(sse::text_stream(response, parse_stream_event))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_body_text_only_uses_string_content() {
        let client = OpenAiCompatClient::new("k".into());
        let request = ChatRequest::new(ChatMessage::user("pergunta")).with_system("sistema");
        let body = client.build_body(&request, true);

        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["content"], "pergunta");
        assert_eq!(body["stream"], true);
    }

    #[test]
    fn test_body_with_image_url() {
        let client = OpenAiCompatClient::doubao("k".into(), "ep-1");
        let request = ChatRequest::new(ChatMessage::user_parts(vec![
            ContentPart::ImageUrl("http://img/1.jpg".into()),
            ContentPart::text("识别"),
        ]));
        let body = client.build_body(&request, false);

        assert_eq!(body["model"], "ep-1");
        assert_eq!(body["messages"][0]["content"][0]["type"], "image_url");
        assert_eq!(body["messages"][0]["content"][0]["image_url"]["url"], "http://img/1.jpg");
        assert_eq!(body["messages"][0]["content"][1]["text"], "识别");
        assert!(body.get("stream").is_none());
        assert_eq!(client.url(), "https://ark.cn-beijing.volces.com/api/v3/chat/completions");
    }

    #[test]
    fn test_parse_response() {
        let body = r#"{"choices":[{"message":{"role":"assistant","content":"olá"}}]}"#;
        assert_eq!(parse_response(body).unwrap(), "olá");
        assert!(matches!(
            parse_response(r#"{"choices":[]}"#),
            Err(LlmError::EmptyResponse(_))
        ));
    }

    #[test]
    fn test_parse_stream_event() {
        assert!(parse_stream_event("[DONE]").is_none());
        assert!(parse_stream_event(r#"{"choices":[{"delta":{"role":"assistant"}}]}"#).is_none());
        assert_eq!(
            parse_stream_event(r#"{"choices":[{"delta":{"content":"满意"}}]}"#)
                .unwrap()
                .unwrap(),
            "满意"
        );
    }
}
