// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// TIPOS FUNDAMENTAIS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//
// Estruturas compartilhadas entre prompts, clientes LLM e ferramentas.
// Independentes de provedor: cada cliente traduz para o seu formato de fio.
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use serde::{Deserialize, Serialize};
use std::fmt;

/// Papel de uma mensagem na conversa.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    /// Nome usado nas APIs de chat.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

/// Parte de conteúdo de uma mensagem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentPart {
    /// Texto simples.
    Text(String),

    /// Imagem embutida em base64.
    InlineImage { media_type: String, data: String },

    /// Imagem referenciada por URL pública.
    ImageUrl(String),
}

impl ContentPart {
    /// Atalho para parte de texto.
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    /// Retorna o texto, se for parte textual.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(t) => Some(t),
            _ => None,
        }
    }

    /// Data URL (`data:<mime>;base64,<dados>`) para provedores que só aceitam URLs.
    pub fn to_data_url(&self) -> Option<String> {
        match self {
            Self::InlineImage { media_type, data } => {
                Some(format!("data:{};base64,{}", media_type, data))
            }
            Self::ImageUrl(url) => Some(url.clone()),
            Self::Text(_) => None,
        }
    }
}

/// Mensagem enviada ao modelo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: Role,
    pub parts: Vec<ContentPart>,
}

impl ChatMessage {
    /// Mensagem de usuário só com texto.
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            parts: vec![ContentPart::text(text)],
        }
    }

    /// Mensagem de usuário com várias partes (imagem + texto).
    pub fn user_parts(parts: Vec<ContentPart>) -> Self {
        Self {
            role: Role::User,
            parts,
        }
    }

    /// Mensagem de assistente.
    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            parts: vec![ContentPart::text(text)],
        }
    }

    /// Concatena as partes textuais.
    pub fn text(&self) -> String {
        self.parts
            .iter()
            .filter_map(ContentPart::as_text)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Retorna true se a mensagem tem só texto.
    pub fn is_text_only(&self) -> bool {
        self.parts.iter().all(|p| matches!(p, ContentPart::Text(_)))
    }
}

/// Requisição independente de provedor.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatRequest {
    /// Instrução de sistema opcional.
    pub system: Option<String>,
    /// Mensagens em ordem.
    pub messages: Vec<ChatMessage>,
    /// Limite de tokens de saída.
    pub max_tokens: u32,
    /// Temperatura; `None` usa o padrão do provedor.
    pub temperature: Option<f32>,
}

impl ChatRequest {
    /// Requisição com uma única mensagem de usuário.
    pub fn new(message: ChatMessage) -> Self {
        Self {
            system: None,
            messages: vec![message],
            max_tokens: 1024,
            temperature: None,
        }
    }

    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Total aproximado de caracteres de texto (para logs).
    pub fn text_chars(&self) -> usize {
        let system = self.system.as_deref().map(str::len).unwrap_or(0);
        system + self.messages.iter().map(|m| m.text().len()).sum::<usize>()
    }
}

impl fmt::Display for ChatRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{} msgs, {} chars, max_tokens={}]",
            self.messages.len(),
            self.text_chars(),
            self.max_tokens
        )
    }
}
