// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// SESSÃO DO USUÁRIO
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//
// Contexto explícito de uma sessão: credenciais, configuração, histórico de
// sugestões com limite de gerações e histórico do chat de dados.
// Criada no início, passada às ferramentas e encerrada com `end()`.
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use chrono::{DateTime, Utc};
use std::fmt;
use uuid::Uuid;

use crate::config::{load_tools_config, LlmProvider, ToolsConfig};
use crate::llm::{AnthropicClient, GeminiClient, LlmClient, OpenAiCompatClient};
use crate::tools::ToolError;
use crate::types::Role;
use crate::utils::TimingStats;

/// Chaves de API informadas pelo usuário.
///
/// Chaves em branco contam como ausentes. O `Debug` nunca mostra o valor.
#[derive(Clone, Default)]
pub struct Credentials {
    anthropic: Option<String>,
    gemini: Option<String>,
    openai: Option<String>,
    ark: Option<String>,
}

impl Credentials {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lê `ANTHROPIC_API_KEY`, `GEMINI_API_KEY`, `OPENAI_API_KEY` e `ARK_API_KEY`.
    pub fn from_env() -> Self {
        let mut credentials = Self::new();
        for provider in [
            LlmProvider::Anthropic,
            LlmProvider::Gemini,
            LlmProvider::OpenAi,
            LlmProvider::Doubao,
        ] {
            if let Ok(key) = std::env::var(provider.api_key_var()) {
                credentials.set(provider, key);
            }
        }
        credentials
    }

    pub fn with(mut self, provider: LlmProvider, key: impl Into<String>) -> Self {
        self.set(provider, key);
        self
    }

    pub fn set(&mut self, provider: LlmProvider, key: impl Into<String>) {
        let key = key.into();
        let value = (!key.trim().is_empty()).then(|| key.trim().to_string());
        *self.slot(provider) = value;
    }

    pub fn get(&self, provider: LlmProvider) -> Option<&str> {
        match provider {
            LlmProvider::Anthropic => self.anthropic.as_deref(),
            LlmProvider::Gemini => self.gemini.as_deref(),
            LlmProvider::OpenAi => self.openai.as_deref(),
            LlmProvider::Doubao => self.ark.as_deref(),
        }
    }

    pub fn has(&self, provider: LlmProvider) -> bool {
        self.get(provider).is_some()
    }

    fn slot(&mut self, provider: LlmProvider) -> &mut Option<String> {
        match provider {
            LlmProvider::Anthropic => &mut self.anthropic,
            LlmProvider::Gemini => &mut self.gemini,
            LlmProvider::OpenAi => &mut self.openai,
            LlmProvider::Doubao => &mut self.ark,
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mark = |key: &Option<String>| if key.is_some() { "***" } else { "-" };
        f.debug_struct("Credentials")
            .field("anthropic", &mark(&self.anthropic))
            .field("gemini", &mark(&self.gemini))
            .field("openai", &mark(&self.openai))
            .field("ark", &mark(&self.ark))
            .finish()
    }
}

/// Sugestões de resposta acumuladas, com teto de gerações.
#[derive(Debug, Clone)]
pub struct SuggestionHistory {
    cap: usize,
    generations: usize,
    suggestions: Vec<String>,
}

impl SuggestionHistory {
    pub fn new(cap: usize) -> Self {
        Self {
            cap,
            generations: 0,
            suggestions: Vec::new(),
        }
    }

    /// Verifica o teto antes de uma nova chamada.
    pub fn can_generate(&self) -> bool {
        self.generations < self.cap
    }

    pub fn remaining(&self) -> usize {
        self.cap.saturating_sub(self.generations)
    }

    pub fn generations(&self) -> usize {
        self.generations
    }

    pub fn cap(&self) -> usize {
        self.cap
    }

    /// Registra uma geração bem-sucedida; o contador sobe mesmo sem sugestões.
    pub fn record(&mut self, suggestions: Vec<String>) {
        self.generations += 1;
        self.suggestions.extend(suggestions);
    }

    /// Todas as sugestões, da mais antiga para a mais recente.
    pub fn suggestions(&self) -> &[String] {
        &self.suggestions
    }

    /// Limpa a lista e zera o contador.
    pub fn clear(&mut self) {
        self.generations = 0;
        self.suggestions.clear();
        log::info!("🧹 Histórico de sugestões limpo");
    }
}

/// Uma mensagem exibida no chat de dados.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatTurn {
    pub role: Role,
    pub content: String,
}

/// Histórico do chat de dados. Só para exibição: cada pergunta vai ao
/// modelo sozinha, com a instrução de sistema.
#[derive(Debug, Clone, Default)]
pub struct ChatHistory {
    turns: Vec<ChatTurn>,
}

impl ChatHistory {
    pub fn push(&mut self, role: Role, content: impl Into<String>) {
        self.turns.push(ChatTurn {
            role,
            content: content.into(),
        });
    }

    pub fn turns(&self) -> &[ChatTurn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn clear(&mut self) {
        self.turns.clear();
    }
}

/// Contexto de uma sessão de uso das ferramentas.
#[derive(Debug)]
pub struct Session {
    pub id: Uuid,
    pub started_at: DateTime<Utc>,
    pub config: ToolsConfig,
    pub credentials: Credentials,
    pub suggestions: SuggestionHistory,
    pub chat: ChatHistory,
    pub timings: TimingStats,
}

impl Session {
    pub fn new(credentials: Credentials, config: ToolsConfig) -> Self {
        let session = Self {
            id: Uuid::new_v4(),
            started_at: Utc::now(),
            suggestions: SuggestionHistory::new(config.suggestion_cap),
            config,
            credentials,
            chat: ChatHistory::default(),
            timings: TimingStats::new(),
        };
        log::info!("🆕 Sessão {} iniciada: {:?}", session.id, session.credentials);
        session
    }

    /// Sessão com configuração e credenciais lidas do ambiente.
    pub fn from_env() -> Self {
        Self::new(Credentials::from_env(), load_tools_config())
    }

    /// Monta o cliente de um provedor com a chave da sessão.
    ///
    /// Falha antes de qualquer chamada de rede quando falta a chave (ou,
    /// no Doubao, o ID do endpoint).
    pub fn client_for(&self, provider: LlmProvider) -> Result<Box<dyn LlmClient>, ToolError> {
        let key = self
            .credentials
            .get(provider)
            .ok_or(ToolError::MissingCredential { provider })?
            .to_string();

        let client: Box<dyn LlmClient> = match provider {
            LlmProvider::Anthropic => {
                Box::new(AnthropicClient::new(key).with_model(&self.config.anthropic_model))
            }
            LlmProvider::Gemini => {
                Box::new(GeminiClient::new(key).with_model(&self.config.gemini_model))
            }
            LlmProvider::OpenAi => Box::new(
                OpenAiCompatClient::new(key)
                    .with_model(&self.config.openai_model)
                    .with_base_url(&self.config.openai_base_url),
            ),
            LlmProvider::Doubao => {
                let endpoint = self
                    .config
                    .ark_model_id
                    .as_deref()
                    .ok_or(ToolError::MissingModel { provider })?;
                Box::new(OpenAiCompatClient::doubao(key, endpoint).with_base_url(&self.config.ark_base_url))
            }
        };

        log::debug!("🔌 Cliente {} ({})", provider, client.model());
        Ok(client)
    }

    /// Encerra a sessão e devolve o resumo.
    pub fn end(self) -> SessionSummary {
        log::debug!("{}", self.timings.summary());
        let summary = SessionSummary {
            id: self.id,
            duration_ms: (Utc::now() - self.started_at).num_milliseconds().max(0),
            generations: self.suggestions.generations(),
            suggestions: self.suggestions.suggestions().len(),
            chat_turns: self.chat.len(),
            calls: self.timings.call_times.len(),
            failures: self.timings.failures,
            avg_call_ms: self.timings.avg_call_time(),
        };
        log::info!("👋 {}", summary);
        summary
    }
}

/// Resumo de uma sessão encerrada.
#[derive(Debug, Clone)]
pub struct SessionSummary {
    pub id: Uuid,
    pub duration_ms: i64,
    pub generations: usize,
    pub suggestions: usize,
    pub chat_turns: usize,
    pub calls: usize,
    pub failures: usize,
    pub avg_call_ms: f64,
}

impl fmt::Display for SessionSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Sessão {} encerrada após {}ms: {} chamadas ({} falhas, média {:.1}ms), {} gerações de sugestões, {} mensagens de chat",
            self.id,
            self.duration_ms,
            self.calls,
            self.failures,
            self.avg_call_ms,
            self.generations,
            self.chat_turns
        )
    }
}
