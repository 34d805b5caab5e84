//! # Templates de Prompt
//!
//! Cada ferramenta tem um módulo que é dono **do texto do prompt e do
//! contrato de tags** ao mesmo tempo: as duas coisas saem das mesmas
//! constantes, então o prompt nunca pede uma tag que o extrator não procura.
//!
//! ## Templates Disponíveis
//!
//! - [`resume`] - Otimização de currículo (tags de nome fixo)
//! - [`translation`] - Tradução de textos de interface (tags indexadas)
//! - [`colloquial`] - Reescrita coloquial (tags indexadas com `_`)
//! - [`reply`] - Sugestões de resposta a partir de print (tag repetida)
//! - [`ocr`] - Reconhecimento de texto em imagem (sem tags)
//! - [`analytics`] - Assistente de dados (sem tags)

pub mod analytics;
pub mod colloquial;
pub mod ocr;
pub mod reply;
pub mod resume;
pub mod translation;

use std::fmt;

use crate::extract::TagSpec;
use crate::utils::estimate_tokens;

/// Prompt preenchido, pronto para virar requisição.
#[derive(Debug, Clone)]
pub struct ToolPrompt {
    /// Instrução de sistema, quando a ferramenta usa uma.
    pub system: Option<String>,
    /// Texto da mensagem do usuário.
    pub user: String,
    /// Contrato de tags que o texto acima promete; `None` para resposta livre.
    pub contract: Option<TagSpec>,
}

impl ToolPrompt {
    /// Prompt com contrato de tags.
    pub fn tagged(user: String, contract: TagSpec) -> Self {
        Self {
            system: None,
            user,
            contract: Some(contract),
        }
    }

    /// Prompt de resposta livre.
    pub fn plain(user: String) -> Self {
        Self {
            system: None,
            user,
            contract: None,
        }
    }

    pub fn with_system(mut self, system: String) -> Self {
        self.system = Some(system);
        self
    }

    /// Retorna o total de caracteres nos prompts
    pub fn total_chars(&self) -> usize {
        self.system.as_ref().map(String::len).unwrap_or(0) + self.user.len()
    }

    /// Estimativa de tokens (aproximado: 4 chars = 1 token)
    pub fn estimated_tokens(&self) -> usize {
        estimate_tokens(&self.user) + self.system.as_deref().map(estimate_tokens).unwrap_or(0)
    }

    /// Tags do contrato que não aparecem no texto do prompt.
    ///
    /// Vazio quando prompt e parser estão em sincronia.
    pub fn unmentioned_tags(&self) -> Vec<String> {
        let Some(contract) = &self.contract else {
            return Vec::new();
        };
        contract
            .tag_names()
            .into_iter()
            .filter(|tag| !self.user.contains(&format!("<{}>", tag)))
            .collect()
    }
}

impl fmt::Display for ToolPrompt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[System: {} chars, User: {} chars, ~{} tokens]",
            self.system.as_ref().map(String::len).unwrap_or(0),
            self.user.len(),
            self.estimated_tokens()
        )
    }
}
