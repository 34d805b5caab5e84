// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// CLIENTE ANTHROPIC (Messages API)
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

use super::{LlmClient, LlmError};
use crate::config::{LlmProvider, DEFAULT_ANTHROPIC_MODEL};
use crate::types::{ChatRequest, ContentPart};
use crate::utils::ActionTimer;

const MESSAGES_URL: &str = "https://api.anthropic.com/v1/messages";
const API_VERSION: &str = "2023-06-01";

/// Cliente para a Messages API da Anthropic.
pub struct AnthropicClient {
    api_key: String,
    model: String,
    endpoint: String,
    client: reqwest::Client,
}

impl AnthropicClient {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            model: DEFAULT_ANTHROPIC_MODEL.into(),
            endpoint: MESSAGES_URL.into(),
            client: reqwest::Client::new(),
        }
    }

    pub fn with_model(mut self, model: &str) -> Self {
        self.model = model.into();
        self
    }

    /// Endpoint alternativo (proxy ou servidor de teste).
    pub fn with_endpoint(mut self, endpoint: &str) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Corpo JSON no formato da Messages API.
    pub(crate) fn build_body(&self, request: &ChatRequest) -> Value {
        let messages: Vec<Value> = request
            .messages
            .iter()
            .map(|m| {
                let content: Vec<Value> = m.parts.iter().map(content_block).collect();
                json!({ "role": m.role.as_str(), "content": content })
            })
            .collect();

        let mut body = json!({
            "model": self.model,
            "max_tokens": request.max_tokens,
            "messages": messages,
        });
        if let Some(system) = &request.system {
            body["system"] = json!(system);
        }
        if let Some(temperature) = request.temperature {
            body["temperature"] = json!(temperature);
        }
        body
    }
}

fn content_block(part: &ContentPart) -> Value {
    match part {
        ContentPart::Text(text) => json!({ "type": "text", "text": text }),
        ContentPart::InlineImage { media_type, data } => json!({
            "type": "image",
            "source": { "type": "base64", "media_type": media_type, "data": data },
        }),
        ContentPart::ImageUrl(url) => json!({
            "type": "image",
            "source": { "type": "url", "url": url },
        }),
    }
}

#[derive(Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: Option<String>,
}

/// Junta os blocos de texto de uma resposta.
pub(crate) fn parse_response(body: &str) -> Result<String, LlmError> {
    let parsed: MessagesResponse =
        serde_json::from_str(body).map_err(|e| LlmError::ParseError(e.to_string()))?;

    let text: String = parsed
        .content
        .into_iter()
        .filter_map(|block| block.text)
        .collect();

    if text.is_empty() {
        return Err(LlmError::EmptyResponse("Anthropic".into()));
    }
    Ok(text)
}

#[async_trait]
impl LlmClient for AnthropicClient {
    fn provider(&self) -> LlmProvider {
        LlmProvider::Anthropic
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn complete(&self, request: &ChatRequest) -> Result<String, LlmError> {
        let timer = ActionTimer::start("Anthropic messages");
        log::debug!("📤 Anthropic {} {}", self.model, request);

        let response = self
            .client
            .post(&self.endpoint)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .header("content-type", "application/json")
            .json(&self.build_body(request))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            log::error!("❌ Anthropic {}: {}", status, body);
            return Err(LlmError::from_status(status, body));
        }

        let text = parse_response(&body)?;
        timer.stop_and_log();
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ChatMessage;

    #[test]
    fn test_body_with_image_and_text() {
        let client = AnthropicClient::new("k".into());
        let request = ChatRequest::new(ChatMessage::user_parts(vec![
            ContentPart::InlineImage {
                media_type: "image/png".into(),
                data: "QUJD".into(),
            },
            ContentPart::text("descreva"),
        ]))
        .with_temperature(0.5);

        let body = client.build_body(&request);
        assert_eq!(body["model"], DEFAULT_ANTHROPIC_MODEL);
        assert_eq!(body["messages"][0]["content"][0]["source"]["type"], "base64");
        assert_eq!(body["messages"][0]["content"][1]["text"], "descreva");
        assert_eq!(body["temperature"], 0.5);
        assert!(body.get("system").is_none());
    }

    #[test]
    fn test_parse_response_joins_text_blocks() {
        let body = r#"{"content":[{"type":"text","text":"<a>1</a>"},{"type":"text","text":"<b>2</b>"}]}"#;
        assert_eq!(parse_response(body).unwrap(), "<a>1</a><b>2</b>");
    }

    #[test]
    fn test_parse_response_empty() {
        assert!(matches!(
            parse_response(r#"{"content":[]}"#),
            Err(LlmError::EmptyResponse(_))
        ));
        assert!(matches!(parse_response("não é json"), Err(LlmError::ParseError(_))));
    }
}
