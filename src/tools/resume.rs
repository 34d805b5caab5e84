//! Otimizador de currículo: Gemini em streaming, três seções de nome fixo.

use super::{require, stream_timed, ToolError};
use crate::extract::{TagMatch, TaggedResponse};
use crate::llm::LlmClient;
use crate::prompts::resume::{self, ResumeSection, TAG_ANALYSIS, TAG_OPTIMIZATION_IDEAS, TAG_OPTIMIZED_CONTENT};
use crate::session::Session;
use crate::types::{ChatMessage, ChatRequest};

/// Limite de saída; o raciocínio do modelo também consome tokens.
pub const MAX_OUTPUT_TOKENS: u32 = 8192;

/// Resultado da otimização, com presença explícita por seção.
#[derive(Debug, Clone)]
pub struct ResumeOptimization {
    response: TaggedResponse,
}

impl ResumeOptimization {
    pub fn from_raw(raw_text: impl Into<String>) -> Self {
        Self {
            response: TaggedResponse::parse(raw_text, resume::contract()),
        }
    }

    pub fn analysis(&self) -> TagMatch<'_> {
        self.response.get(TAG_ANALYSIS)
    }

    pub fn optimization_ideas(&self) -> TagMatch<'_> {
        self.response.get(TAG_OPTIMIZATION_IDEAS)
    }

    pub fn optimized_content(&self) -> TagMatch<'_> {
        self.response.get(TAG_OPTIMIZED_CONTENT)
    }

    /// Seções na ordem de exibição, com título.
    pub fn sections(&self) -> [(&'static str, TagMatch<'_>); 3] {
        [
            ("分析", self.analysis()),
            ("优化思路", self.optimization_ideas()),
            ("优化后的内容", self.optimized_content()),
        ]
    }

    pub fn missing_sections(&self) -> Vec<String> {
        self.response.missing_tags()
    }

    pub fn raw_text(&self) -> &str {
        self.response.raw_text()
    }
}

/// Otimiza uma seção do currículo.
///
/// `on_fragment` recebe cada pedaço do stream para exibição incremental;
/// o parsing só acontece depois do último fragmento.
pub async fn optimize<F>(
    session: &mut Session,
    client: &dyn LlmClient,
    job_title: &str,
    section: ResumeSection,
    content: &str,
    on_fragment: F,
) -> Result<ResumeOptimization, ToolError>
where
    F: FnMut(&str),
{
    let job_title = require("职位名称", job_title)?;
    let content = require("简历内容", content)?;

    let prompt = resume::build(job_title, section, content);
    log::info!("📝 Otimizando {} para {} {}", section, job_title, prompt);

    let request = ChatRequest::new(ChatMessage::user(prompt.user)).with_max_tokens(MAX_OUTPUT_TOKENS);
    let raw = stream_timed(session, client, &request, on_fragment).await?;

    let result = ResumeOptimization::from_raw(raw);
    if !result.missing_sections().is_empty() {
        log::warn!("⚠️ Seções ausentes: {:?}", result.missing_sections());
    }
    Ok(result)
}
