// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// CLIENTE LLM
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//
// Trait e implementações para interação com modelos de linguagem.
// Suporta múltiplos provedores: Anthropic, Gemini, OpenAI e Doubao.
//
// Chamadas em streaming passam sempre por `collect_stream`: o extrator só
// enxerga o texto depois que o último fragmento chegou.
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

mod anthropic;
mod gemini;
mod openai;
pub mod sse;

pub use anthropic::AnthropicClient;
pub use gemini::GeminiClient;
pub use openai::OpenAiCompatClient;

use async_trait::async_trait;
use futures::stream::{self, Stream, StreamExt};
use std::collections::VecDeque;
use std::pin::Pin;
use std::sync::Mutex;

use crate::config::LlmProvider;
use crate::types::ChatRequest;

/// Erros do cliente LLM
#[derive(Debug, Clone, thiserror::Error)]
pub enum LlmError {
    #[error("API error: {0}")]
    ApiError(String),

    #[error("Authentication failed: {0}")]
    AuthError(String),

    #[error("Rate limit exceeded")]
    RateLimitError,

    #[error("Invalid response format: {0}")]
    ParseError(String),

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Empty response from {0}")]
    EmptyResponse(String),
}

impl LlmError {
    /// Classifica uma resposta HTTP sem sucesso.
    pub(crate) fn from_status(status: reqwest::StatusCode, body: String) -> Self {
        match status.as_u16() {
            401 | 403 => Self::AuthError(format!("{} {}", status, body)),
            429 => Self::RateLimitError,
            _ => Self::ApiError(format!("{} {}", status, body)),
        }
    }
}

impl From<reqwest::Error> for LlmError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            Self::ParseError(e.to_string())
        } else {
            Self::NetworkError(e.to_string())
        }
    }
}

/// Stream de fragmentos de texto, em ordem de chegada.
pub type TextStream = Pin<Box<dyn Stream<Item = Result<String, LlmError>> + Send>>;

/// Trait principal para clientes LLM
///
/// Esta trait define a interface que qualquer provedor de LLM deve implementar.
/// Permite fácil substituição entre provedores.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Provedor por trás deste cliente.
    fn provider(&self) -> LlmProvider;

    /// Modelo usado nas chamadas.
    fn model(&self) -> &str;

    /// Chamada bloqueante: devolve o corpo de texto completo.
    async fn complete(&self, request: &ChatRequest) -> Result<String, LlmError>;

    /// Chamada em streaming.
    ///
    /// Provedores sem streaming nativo devolvem um único fragmento.
    async fn stream(&self, request: &ChatRequest) -> Result<TextStream, LlmError> {
        let text = self.complete(request).await?;
        Ok(Box::pin(stream::once(async move { Ok::<_, LlmError>(text) })))
    }
}

/// Concatena um stream inteiro antes de qualquer parsing.
///
/// Erro no meio do stream descarta o texto parcial.
pub async fn collect_stream(stream: TextStream) -> Result<String, LlmError> {
    collect_stream_with(stream, |_| {}).await
}

/// Igual a `collect_stream`, notificando cada fragmento (exibição incremental).
pub async fn collect_stream_with<F>(mut stream: TextStream, mut on_fragment: F) -> Result<String, LlmError>
where
    F: FnMut(&str),
{
    let mut full = String::new();
    let mut fragments = 0usize;

    while let Some(fragment) = stream.next().await {
        let fragment = fragment?;
        on_fragment(&fragment);
        full.push_str(&fragment);
        fragments += 1;
    }

    log::debug!("Stream concluído: {} fragmentos, {} chars", fragments, full.len());
    Ok(full)
}

/// Chama o modelo em streaming e devolve o texto já concatenado.
pub async fn stream_to_string(client: &dyn LlmClient, request: &ChatRequest) -> Result<String, LlmError> {
    let stream = client.stream(request).await?;
    collect_stream(stream).await
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// IMPLEMENTAÇÃO MOCK PARA TESTES
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Resposta roteirizada do mock.
#[derive(Debug, Clone)]
pub enum MockReply {
    /// Texto completo.
    Text(String),
    /// Fragmentos de stream; em `complete` são concatenados.
    Fragments(Vec<String>),
    /// Fragmentos seguidos de erro no meio do stream.
    BrokenStream(Vec<String>, LlmError),
    /// Falha imediata.
    Error(LlmError),
}

/// Cliente mock para testes unitários
///
/// Devolve as respostas roteirizadas em ordem e registra as requisições.
/// Com a fila vazia, repete a resposta padrão.
#[derive(Debug)]
pub struct MockLlmClient {
    provider: LlmProvider,
    replies: Mutex<VecDeque<MockReply>>,
    default_reply: MockReply,
    requests: Mutex<Vec<ChatRequest>>,
}

impl Default for MockLlmClient {
    fn default() -> Self {
        Self::new()
    }
}

impl MockLlmClient {
    pub fn new() -> Self {
        Self {
            provider: LlmProvider::Anthropic,
            replies: Mutex::new(VecDeque::new()),
            default_reply: MockReply::Text("Mock response".into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Mock que sempre responde `text`.
    pub fn with_text(text: impl Into<String>) -> Self {
        let mut mock = Self::new();
        mock.default_reply = MockReply::Text(text.into());
        mock
    }

    /// Mock que sempre falha com `error`.
    pub fn failing(error: LlmError) -> Self {
        let mut mock = Self::new();
        mock.default_reply = MockReply::Error(error);
        mock
    }

    pub fn with_provider(mut self, provider: LlmProvider) -> Self {
        self.provider = provider;
        self
    }

    /// Enfileira uma resposta.
    pub fn push_reply(&self, reply: MockReply) {
        if let Ok(mut replies) = self.replies.lock() {
            replies.push_back(reply);
        }
    }

    /// Requisições recebidas até agora.
    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }

    /// Número de chamadas recebidas.
    pub fn call_count(&self) -> usize {
        self.requests.lock().map(|r| r.len()).unwrap_or(0)
    }

    fn next_reply(&self, request: &ChatRequest) -> MockReply {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request.clone());
        }
        self.replies
            .lock()
            .ok()
            .and_then(|mut r| r.pop_front())
            .unwrap_or_else(|| self.default_reply.clone())
    }
}

#[async_trait]
impl LlmClient for MockLlmClient {
    fn provider(&self) -> LlmProvider {
        self.provider
    }

    fn model(&self) -> &str {
        "mock-model"
    }

    async fn complete(&self, request: &ChatRequest) -> Result<String, LlmError> {
        match self.next_reply(request) {
            MockReply::Text(text) => Ok(text),
            MockReply::Fragments(parts) => Ok(parts.concat()),
            MockReply::BrokenStream(_, error) | MockReply::Error(error) => Err(error),
        }
    }

    async fn stream(&self, request: &ChatRequest) -> Result<TextStream, LlmError> {
        let items: Vec<Result<String, LlmError>> = match self.next_reply(request) {
            MockReply::Text(text) => vec![Ok(text)],
            MockReply::Fragments(parts) => parts.into_iter().map(Ok).collect(),
            MockReply::BrokenStream(parts, error) => parts
                .into_iter()
                .map(Ok)
                .chain(std::iter::once(Err(error)))
                .collect(),
            MockReply::Error(error) => return Err(error),
        };
        Ok(Box::pin(stream::iter(items)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ChatMessage;

    fn request() -> ChatRequest {
        ChatRequest::new(ChatMessage::user("oi"))
    }

    #[tokio::test]
    async fn test_mock_client_scripted_order() {
        let client = MockLlmClient::new();
        client.push_reply(MockReply::Text("primeira".into()));

        assert_eq!(client.complete(&request()).await.unwrap(), "primeira");
        assert_eq!(client.complete(&request()).await.unwrap(), "Mock response");
        assert_eq!(client.call_count(), 2);
    }

    #[tokio::test]
    async fn test_collect_stream_concatenates_in_order() {
        let client = MockLlmClient::new();
        client.push_reply(MockReply::Fragments(vec!["<a>".into(), "x".into(), "</a>".into()]));

        let mut seen = Vec::new();
        let stream = client.stream(&request()).await.unwrap();
        let text = collect_stream_with(stream, |f| seen.push(f.to_string()))
            .await
            .unwrap();

        assert_eq!(text, "<a>x</a>");
        assert_eq!(seen.len(), 3);
    }

    #[tokio::test]
    async fn test_collect_stream_fails_on_mid_stream_error() {
        let client = MockLlmClient::new();
        client.push_reply(MockReply::BrokenStream(
            vec!["<a>meio".into()],
            LlmError::NetworkError("reset".into()),
        ));

        let result = stream_to_string(&client, &request()).await;
        assert!(matches!(result, Err(LlmError::NetworkError(_))));
    }

    #[tokio::test]
    async fn test_default_stream_wraps_complete() {
        struct Blocking;

        #[async_trait]
        impl LlmClient for Blocking {
            fn provider(&self) -> LlmProvider {
                LlmProvider::Anthropic
            }
            fn model(&self) -> &str {
                "blocking"
            }
            async fn complete(&self, _request: &ChatRequest) -> Result<String, LlmError> {
                Ok("inteiro".into())
            }
        }

        let text = stream_to_string(&Blocking, &request()).await.unwrap();
        assert_eq!(text, "inteiro");
    }

    #[test]
    fn test_error_from_status() {
        let auth = LlmError::from_status(reqwest::StatusCode::UNAUTHORIZED, "bad key".into());
        assert!(matches!(auth, LlmError::AuthError(_)));
        let rate = LlmError::from_status(reqwest::StatusCode::TOO_MANY_REQUESTS, String::new());
        assert!(matches!(rate, LlmError::RateLimitError));
        let other = LlmError::from_status(reqwest::StatusCode::BAD_GATEWAY, "x".into());
        assert!(other.to_string().contains("502"));
    }
}
