//! # GenAI Tools
//!
//! Este crate reúne pequenas ferramentas de IA generativa (otimizador de
//! currículo, tradutor de interface, reescrita coloquial, sugestões de
//! resposta, OCR de notas e chat de dados) em torno de um núcleo comum: o
//! **extrator de respostas estruturadas**.
//!
//! ## Como funciona?
//!
//! Cada ferramenta segue o mesmo fluxo:
//! 1. Preenche um template de prompt que pede a resposta entre tags
//!    (`<analysis>...</analysis>`, `<translation1>...</translation1>`)
//! 2. Faz uma chamada ao provedor (bloqueante ou em streaming)
//! 3. Concatena o stream inteiro antes de qualquer parsing
//! 4. Fatia o texto em segmentos e os entrega para exibição ou exportação
//!
//! ## Arquitetura Principal
//!
//! ### 1. Extrator (`extract`)
//! Função pura sobre texto não confiável:
//! - **Nome fixo**: presença explícita por tag (`TagMatch`)
//! - **Indexado**: `1..=N`, lacunas puladas, posições contíguas
//! - **Repetido**: mesma tag em ordem de documento, com limite
//!
//! ### 2. Templates (`prompts`)
//! Cada template é dono do texto e do contrato de tags.
//!
//! ### 3. Provedores (`llm`)
//! Anthropic, Gemini, OpenAI e Doubao atrás da trait `LlmClient`.
//!
//! ### 4. Sessão (`session`)
//! Contexto explícito por usuário: chaves, limite de gerações, histórico.
//!
//! ## Exemplo de Uso
//!
//! ```rust,ignore
//! use genai_tools::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), ToolError> {
//!     let mut session = Session::from_env();
//!     let client = session.client_for(LlmProvider::Anthropic)?;
//!     let variants = tools::translate::translate(&mut session, client.as_ref(), "注册", None).await?;
//!     for (label, text) in variants.labeled() {
//!         println!("{}: {}", label, text);
//!     }
//!     Ok(())
//! }
//! ```

#![warn(rust_2018_idioms)]

/// Tipos de requisição compartilhados pelos provedores.
///
/// - [`ChatRequest`]: instrução de sistema, mensagens e parâmetros
/// - [`ChatMessage`]: mensagem com partes de texto e imagem
/// - [`ContentPart`]: texto, imagem em base64 ou URL
pub mod types;

/// Extrator de respostas estruturadas.
///
/// Nunca altera o texto bruto, nunca devolve segmento parcial e nunca entra
/// em panic com entrada malformada.
pub mod extract;

/// Templates de prompt com seus contratos de tags.
pub mod prompts;

/// Clientes para Large Language Models (LLMs).
///
/// Define a trait `LlmClient` e implementações para:
/// - Anthropic (Messages API)
/// - Gemini (generateContent / streamGenerateContent)
/// - OpenAI e Doubao (Chat Completions)
/// - Mock para testes
pub mod llm;

/// Validação e codificação de imagens enviadas.
pub mod image;

/// Sessão explícita por usuário.
pub mod session;

/// As ferramentas: template + chamada + extração.
pub mod tools;

/// Exportação do OCR de notas (JSON e texto).
pub mod export;

/// Utilitários diversos.
///
/// - Medição de tempo das chamadas
/// - Estimativa de tokens e prévia de texto
pub mod utils;

/// Configuração dos provedores e das ferramentas.
///
/// **Modelos:**
/// - `ANTHROPIC_MODEL` (padrão: "claude-3-5-sonnet-20241022")
/// - `GEMINI_MODEL` (padrão: "gemini-2.5-pro-preview-06-05")
/// - `OPENAI_MODEL` (padrão: "gpt-3.5-turbo")
/// - `ARK_MODEL_ID`: endpoint Doubao, sem padrão
///
/// **URLs:**
/// - `OPENAI_BASE_URL`, `ARK_BASE_URL`
///
/// **Limites:**
/// - `IMAGE_MAX_BYTES` (padrão: 5 MiB)
/// - `SUGGESTION_CAP` (padrão: 10)
pub mod config;

// Re-exports principais
pub use config::{load_tools_config, LlmProvider, ToolsConfig};
pub use extract::{Segment, TagMatch, TagSpec, TaggedResponse};
pub use llm::{LlmClient, LlmError};
pub use session::Session;
pub use tools::ToolError;
pub use types::*;

/// Versão da biblioteca.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude com imports comuns para uso rápido.
///
/// ```rust,ignore
/// use genai_tools::prelude::*;
/// ```
pub mod prelude {
    pub use crate::config::{load_tools_config, LlmProvider, ToolsConfig};
    pub use crate::extract::{extract, Segment, TagMatch, TagSpec, TaggedResponse};
    pub use crate::llm::{collect_stream, LlmClient, LlmError, MockLlmClient, MockReply};
    pub use crate::session::{Credentials, Session};
    pub use crate::tools::{self, ToolError, Variants};
    pub use crate::types::*;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
