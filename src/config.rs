// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// CONFIGURAÇÃO DOS PROVEDORES E FERRAMENTAS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//
// Modelos, URLs base e limites das ferramentas.
// Todas as configurações podem ser definidas via .env
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use std::fmt;

/// Modelo padrão do otimizador de currículo.
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-pro-preview-06-05";
/// Modelo padrão das ferramentas Anthropic (tradução, coloquial, respostas).
pub const DEFAULT_ANTHROPIC_MODEL: &str = "claude-3-5-sonnet-20241022";
/// Modelo padrão do chat de análise de dados.
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-3.5-turbo";
/// URL base da API OpenAI.
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
/// URL base do Doubao (Volcengine Ark), compatível com OpenAI.
pub const DEFAULT_ARK_BASE_URL: &str = "https://ark.cn-beijing.volces.com/api/v3";
/// Teto de tamanho de imagem enviada: 5 MiB; acima dele a imagem é comprimida.
pub const DEFAULT_IMAGE_MAX_BYTES: usize = 5 * 1024 * 1024;
/// Máximo de gerações de sugestões por sessão.
pub const DEFAULT_SUGGESTION_CAP: usize = 10;

/// Provedor de LLM hospedado.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LlmProvider {
    /// Claude via Messages API.
    Anthropic,
    /// Gemini via Generative Language API.
    Gemini,
    /// OpenAI Chat Completions.
    OpenAi,
    /// Doubao (Volcengine Ark), protocolo OpenAI.
    Doubao,
}

impl LlmProvider {
    /// Converte string do .env para provedor (case-insensitive).
    pub fn from_env(value: &str) -> Option<Self> {
        match value.to_lowercase().trim() {
            "anthropic" | "claude" => Some(Self::Anthropic),
            "gemini" | "google" => Some(Self::Gemini),
            "openai" => Some(Self::OpenAi),
            "doubao" | "ark" => Some(Self::Doubao),
            _ => None,
        }
    }

    /// Variável de ambiente com a chave deste provedor.
    pub fn api_key_var(&self) -> &'static str {
        match self {
            Self::Anthropic => "ANTHROPIC_API_KEY",
            Self::Gemini => "GEMINI_API_KEY",
            Self::OpenAi => "OPENAI_API_KEY",
            Self::Doubao => "ARK_API_KEY",
        }
    }

    /// Retorna nome legível para logs e mensagens.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Anthropic => "Anthropic",
            Self::Gemini => "Gemini",
            Self::OpenAi => "OpenAI",
            Self::Doubao => "豆包",
        }
    }
}

impl fmt::Display for LlmProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Configuração das ferramentas.
#[derive(Debug, Clone)]
pub struct ToolsConfig {
    /// Modelo Claude para tradução, coloquial e sugestões.
    pub anthropic_model: String,

    /// Modelo Gemini do otimizador de currículo.
    pub gemini_model: String,

    /// Modelo OpenAI do chat de dados.
    pub openai_model: String,

    /// URL base OpenAI (proxies compatíveis também servem).
    pub openai_base_url: String,

    /// ID do endpoint de inferência Doubao. Sem padrão: depende da conta.
    pub ark_model_id: Option<String>,

    /// URL base do Doubao.
    pub ark_base_url: String,

    /// Tamanho máximo de imagem enviada, em bytes.
    pub image_max_bytes: usize,

    /// Limite de gerações de sugestões por sessão.
    pub suggestion_cap: usize,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            anthropic_model: DEFAULT_ANTHROPIC_MODEL.to_string(),
            gemini_model: DEFAULT_GEMINI_MODEL.to_string(),
            openai_model: DEFAULT_OPENAI_MODEL.to_string(),
            openai_base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
            ark_model_id: None,
            ark_base_url: DEFAULT_ARK_BASE_URL.to_string(),
            image_max_bytes: DEFAULT_IMAGE_MAX_BYTES,
            suggestion_cap: DEFAULT_SUGGESTION_CAP,
        }
    }
}

impl ToolsConfig {
    /// Cria configuração padrão.
    pub fn new() -> Self {
        Self::default()
    }

    /// Modelo configurado para um provedor.
    pub fn model_for(&self, provider: LlmProvider) -> Option<&str> {
        match provider {
            LlmProvider::Anthropic => Some(&self.anthropic_model),
            LlmProvider::Gemini => Some(&self.gemini_model),
            LlmProvider::OpenAi => Some(&self.openai_model),
            LlmProvider::Doubao => self.ark_model_id.as_deref(),
        }
    }
}

/// Lê uma string não vazia do ambiente.
fn env_string(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Lê um inteiro positivo do ambiente; valores inválidos são ignorados com aviso.
fn env_positive(name: &str) -> Option<usize> {
    let raw = env_string(name)?;
    match raw.parse::<usize>() {
        Ok(value) if value > 0 => Some(value),
        _ => {
            log::warn!("⚠️ {}={} inválido, usando padrão", name, raw);
            None
        }
    }
}

/// Carrega configuração das ferramentas a partir das variáveis de ambiente.
///
/// Variáveis suportadas:
/// - `ANTHROPIC_MODEL`, `GEMINI_MODEL`, `OPENAI_MODEL`: modelos por provedor
/// - `OPENAI_BASE_URL`, `ARK_BASE_URL`: URLs base
/// - `ARK_MODEL_ID`: endpoint Doubao (obrigatório para OCR)
/// - `IMAGE_MAX_BYTES`: teto de imagem (padrão: 5 MiB)
/// - `SUGGESTION_CAP`: gerações por sessão (padrão: 10)
///
/// # Exemplo
///
/// ```rust,ignore
/// // .env
/// GEMINI_MODEL=gemini-2.5-flash
/// SUGGESTION_CAP=5
///
/// // código
/// let config = load_tools_config();
/// assert_eq!(config.suggestion_cap, 5);
/// ```
pub fn load_tools_config() -> ToolsConfig {
    let mut config = ToolsConfig::default();

    if let Some(model) = env_string("ANTHROPIC_MODEL") {
        log::info!("📦 ANTHROPIC_MODEL={}", model);
        config.anthropic_model = model;
    }

    if let Some(model) = env_string("GEMINI_MODEL") {
        log::info!("📦 GEMINI_MODEL={}", model);
        config.gemini_model = model;
    }

    if let Some(model) = env_string("OPENAI_MODEL") {
        log::info!("📦 OPENAI_MODEL={}", model);
        config.openai_model = model;
    }

    if let Some(base) = env_string("OPENAI_BASE_URL") {
        log::info!("📦 OPENAI_BASE_URL={}", base);
        config.openai_base_url = base;
    }

    if let Some(base) = env_string("ARK_BASE_URL") {
        log::info!("📦 ARK_BASE_URL={}", base);
        config.ark_base_url = base;
    }

    if let Some(model_id) = env_string("ARK_MODEL_ID") {
        log::info!("📦 ARK_MODEL_ID={}", model_id);
        config.ark_model_id = Some(model_id);
    }

    if let Some(max) = env_positive("IMAGE_MAX_BYTES") {
        log::info!("📦 IMAGE_MAX_BYTES={}", max);
        config.image_max_bytes = max;
    }

    if let Some(cap) = env_positive("SUGGESTION_CAP") {
        log::info!("📦 SUGGESTION_CAP={}", cap);
        config.suggestion_cap = cap;
    }

    log::debug!(
        "🔧 Modelos: anthropic={}, gemini={}, openai={}",
        config.anthropic_model,
        config.gemini_model,
        config.openai_model
    );

    config
}
