//! # Ferramentas
//!
//! Cada ferramenta liga uma entrada do usuário a um provedor e ao extrator:
//! preenche o template, faz **uma** chamada (bloqueante ou em streaming,
//! sempre concatenada antes do parsing) e devolve os segmentos prontos para
//! exibição.
//!
//! - [`resume`] - Otimizador de currículo (Gemini, streaming)
//! - [`translate`] - Tradutor de interface (Anthropic)
//! - [`colloquial`] - Reescrita coloquial (Anthropic)
//! - [`reply`] - Sugestões de resposta a partir de print (Anthropic, imagem)
//! - [`ocr`] - Texto de imagens de notas (Doubao)
//! - [`analytics`] - Estatísticas e chat de dados (OpenAI, streaming)

pub mod analytics;
pub mod colloquial;
pub mod ocr;
pub mod reply;
pub mod resume;
pub mod translate;

use crate::config::LlmProvider;
use crate::extract::{Segment, TagSpec, TaggedResponse};
use crate::image::ImageError;
use crate::llm::{collect_stream_with, LlmClient, LlmError};
use crate::session::Session;
use crate::types::ChatRequest;
use crate::utils::{is_blank, preview, ActionTimer};

/// Mensagem exibida quando nenhuma variante foi extraída.
pub const PARSE_FAILURE_MESSAGE: &str = "未能正确解析AI返回的结果,请重试";

const RESPONSE_PREVIEW_CHARS: usize = 120;

/// Erros das ferramentas
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("Missing API key for {provider}")]
    MissingCredential { provider: LlmProvider },

    #[error("Missing model id for {provider}")]
    MissingModel { provider: LlmProvider },

    #[error("Required input is empty: {0}")]
    EmptyInput(&'static str),

    #[error("Model call failed: {0}")]
    Upstream(#[from] LlmError),

    #[error("Invalid image: {0}")]
    Image(#[from] ImageError),

    #[error("Generation limit reached ({used}/{cap})")]
    QuotaExhausted { used: usize, cap: usize },
}

impl ToolError {
    /// Mensagem em chinês para a interface.
    pub fn user_message(&self) -> String {
        match self {
            Self::MissingCredential { provider } => {
                format!("请先输入您的 {} API Key 以继续使用", provider)
            }
            Self::MissingModel { provider } => format!("❌ 请输入{}模型ID", provider),
            Self::EmptyInput(field) => format!("请输入{}", field),
            Self::Upstream(e) => format!("发生错误: {}", e),
            Self::Image(e) => format!("图片无法使用: {}", e),
            Self::QuotaExhausted { cap, .. } => {
                format!("已达到 {} 次生成上限，请先清空历史回复", cap)
            }
        }
    }

    /// Erros que o usuário resolve tentando de novo (chave, entrada ou rede).
    pub fn is_retryable(&self) -> bool {
        !matches!(self, Self::QuotaExhausted { .. })
    }
}

/// Valida um campo obrigatório.
pub(crate) fn require<'a>(field: &'static str, value: &'a str) -> Result<&'a str, ToolError> {
    if is_blank(value) {
        return Err(ToolError::EmptyInput(field));
    }
    Ok(value.trim())
}

/// Chamada bloqueante com medição de tempo na sessão.
pub(crate) async fn complete_timed(
    session: &mut Session,
    client: &dyn LlmClient,
    request: &ChatRequest,
) -> Result<String, ToolError> {
    let timer = ActionTimer::start(&format!("{} {}", client.provider(), client.model()));
    match client.complete(request).await {
        Ok(text) => {
            session.timings.add_call_time(timer.stop_and_log());
            log::debug!("📥 {}", preview(&text, RESPONSE_PREVIEW_CHARS));
            Ok(text)
        }
        Err(e) => {
            session.timings.add_failure();
            log::error!("❌ {} falhou: {}", client.provider(), e);
            Err(e.into())
        }
    }
}

/// Chamada em streaming, concatenada antes de devolver.
pub(crate) async fn stream_timed<F>(
    session: &mut Session,
    client: &dyn LlmClient,
    request: &ChatRequest,
    on_fragment: F,
) -> Result<String, ToolError>
where
    F: FnMut(&str),
{
    let timer = ActionTimer::start(&format!("{} {} (stream)", client.provider(), client.model()));
    let result = match client.stream(request).await {
        Ok(stream) => collect_stream_with(stream, on_fragment).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(text) => {
            session.timings.add_call_time(timer.stop_and_log());
            log::debug!("📥 {}", preview(&text, RESPONSE_PREVIEW_CHARS));
            Ok(text)
        }
        Err(e) => {
            session.timings.add_failure();
            log::error!("❌ {} falhou durante o stream: {}", client.provider(), e);
            Err(e.into())
        }
    }
}

/// Variantes extraídas de uma resposta com tags indexadas.
#[derive(Debug, Clone)]
pub struct Variants {
    response: TaggedResponse,
}

impl Variants {
    pub fn parse(raw_text: impl Into<String>, spec: TagSpec) -> Self {
        Self {
            response: TaggedResponse::parse(raw_text, spec),
        }
    }

    pub fn segments(&self) -> &[Segment] {
        self.response.segments()
    }

    pub fn len(&self) -> usize {
        self.response.segments().len()
    }

    pub fn is_empty(&self) -> bool {
        self.response.segments().is_empty()
    }

    /// Pares ("版本 N", texto) na ordem de exibição.
    pub fn labeled(&self) -> Vec<(String, &str)> {
        self.segments()
            .iter()
            .map(|s| (s.version_label(), s.text.as_str()))
            .collect()
    }

    pub fn raw_text(&self) -> &str {
        self.response.raw_text()
    }

    /// Aviso para a interface quando faltam variantes.
    pub fn warning(&self) -> Option<String> {
        let expected = self.response.spec().expected_count();
        if self.is_empty() {
            Some(PARSE_FAILURE_MESSAGE.to_string())
        } else if self.len() < expected {
            Some(format!("⚠️ 只解析到 {}/{} 个版本", self.len(), expected))
        } else {
            None
        }
    }
}
