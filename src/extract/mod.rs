// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// EXTRATOR DE RESPOSTAS ESTRUTURADAS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//
// Fatia o texto devolvido por um modelo em segmentos delimitados por tags
// (`<nome>...</nome>`, `<nomeN>...</nomeN>`), na ordem que o prompt declarou.
//
// Função pura: o texto bruto nunca é alterado, tags ausentes viram "sem
// segmento" e nada aqui entra em panic com entrada malformada.
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

mod matcher;

pub use matcher::{close_delimiter, find_indexed, find_tag, open_delimiter, split_repeated, TagMatch};

use std::fmt;

/// Contrato de tags que um prompt promete ao extrator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagSpec {
    /// Lista pequena de nomes únicos, cada um esperado uma vez.
    Named(Vec<String>),

    /// Um nome parametrizado por índice `1..=count`.
    ///
    /// `separator` fica entre o nome e o índice: `""` gera `translation1`,
    /// `"_"` gera `colloquial_text_1`.
    Indexed {
        base: String,
        separator: String,
        count: usize,
    },

    /// Uma única tag repetida, consumida em ordem de documento.
    Repeated { tag: String, limit: usize },
}

impl TagSpec {
    /// Contrato de nomes fixos.
    pub fn named<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Named(names.into_iter().map(Into::into).collect())
    }

    /// Contrato indexado.
    pub fn indexed(base: impl Into<String>, separator: impl Into<String>, count: usize) -> Self {
        Self::Indexed {
            base: base.into(),
            separator: separator.into(),
            count,
        }
    }

    /// Contrato de tag repetida.
    pub fn repeated(tag: impl Into<String>, limit: usize) -> Self {
        Self::Repeated {
            tag: tag.into(),
            limit,
        }
    }

    /// Quantidade máxima de segmentos que o contrato pode produzir.
    pub fn expected_count(&self) -> usize {
        match self {
            Self::Named(names) => names.len(),
            Self::Indexed { count, .. } => *count,
            Self::Repeated { limit, .. } => *limit,
        }
    }

    /// Nomes completos das tags que o prompt precisa mencionar.
    pub fn tag_names(&self) -> Vec<String> {
        match self {
            Self::Named(names) => names.clone(),
            Self::Indexed {
                base,
                separator,
                count,
            } => (1..=*count)
                .map(|i| format!("{}{}{}", base, separator, i))
                .collect(),
            Self::Repeated { tag, .. } => vec![tag.clone()],
        }
    }
}

/// Um trecho extraído entre abertura e fechamento.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    /// Tag que produziu o segmento (para indexadas, o nome com índice).
    pub tag: String,
    /// Posição de exibição, 1-based e contígua.
    pub position: usize,
    /// Conteúdo aparado.
    pub text: String,
}

impl Segment {
    /// Rótulo de exibição usado pelas ferramentas de variantes ("版本 N").
    pub fn version_label(&self) -> String {
        format!("版本 {}", self.position)
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.text)
    }
}

/// Segmentos para tags de nome fixo; nomes ausentes não geram segmento.
pub fn extract_named<S: AsRef<str>>(raw: &str, names: &[S]) -> Vec<Segment> {
    let mut segments = Vec::new();
    for name in names {
        let name = name.as_ref();
        if let TagMatch::Present(text) = find_tag(raw, name) {
            segments.push(Segment {
                tag: name.to_string(),
                position: segments.len() + 1,
                text: text.to_string(),
            });
        }
    }
    segments
}

/// Segmentos para tags indexadas `1..=count`.
///
/// Índices ausentes são pulados e as posições seguintes continuam contíguas:
/// se o modelo pular `translation2`, `translation3` é exibida como posição 2.
pub fn extract_indexed(raw: &str, base: &str, separator: &str, count: usize) -> Vec<Segment> {
    let mut segments = Vec::new();
    for index in 1..=count {
        if let TagMatch::Present(text) = find_indexed(raw, base, separator, index) {
            segments.push(Segment {
                tag: format!("{}{}{}", base, separator, index),
                position: segments.len() + 1,
                text: text.to_string(),
            });
        }
    }
    segments
}

/// Segmentos para uma tag repetida, no máximo `limit` pedaços examinados.
pub fn extract_repeated(raw: &str, tag: &str, limit: usize) -> Vec<Segment> {
    split_repeated(raw, tag, limit)
        .into_iter()
        .enumerate()
        .map(|(i, text)| Segment {
            tag: tag.to_string(),
            position: i + 1,
            text,
        })
        .collect()
}

/// Aplica um contrato ao texto bruto.
pub fn extract(raw: &str, spec: &TagSpec) -> Vec<Segment> {
    match spec {
        TagSpec::Named(names) => extract_named(raw, names),
        TagSpec::Indexed {
            base,
            separator,
            count,
        } => extract_indexed(raw, base, separator, *count),
        TagSpec::Repeated { tag, limit } => extract_repeated(raw, tag, *limit),
    }
}

/// Resposta de uma chamada ao modelo junto com os segmentos extraídos.
///
/// Criada a cada chamada, consumida para exibição e descartada.
#[derive(Debug, Clone)]
pub struct TaggedResponse {
    raw_text: String,
    spec: TagSpec,
    segments: Vec<Segment>,
}

impl TaggedResponse {
    /// Extrai os segmentos de `raw_text` segundo `spec`.
    pub fn parse(raw_text: impl Into<String>, spec: TagSpec) -> Self {
        let raw_text = raw_text.into();
        let segments = extract(&raw_text, &spec);

        if segments.len() < spec.expected_count() && !matches!(spec, TagSpec::Repeated { .. }) {
            log::warn!(
                "⚠️ Extração incompleta: {}/{} segmentos ({} chars de resposta)",
                segments.len(),
                spec.expected_count(),
                raw_text.len()
            );
        } else {
            log::debug!("Extração: {} segmentos", segments.len());
        }

        Self {
            raw_text,
            spec,
            segments,
        }
    }

    /// Texto bruto, intacto.
    pub fn raw_text(&self) -> &str {
        &self.raw_text
    }

    /// Contrato usado na extração.
    pub fn spec(&self) -> &TagSpec {
        &self.spec
    }

    /// Segmentos em ordem crescente de posição.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Presença explícita de uma tag já extraída.
    pub fn get(&self, tag: &str) -> TagMatch<'_> {
        self.segments
            .iter()
            .find(|s| s.tag == tag)
            .map(|s| TagMatch::Present(s.text.as_str()))
            .unwrap_or(TagMatch::Absent)
    }

    /// Nomes do contrato que não produziram segmento.
    pub fn missing_tags(&self) -> Vec<String> {
        match &self.spec {
            TagSpec::Repeated { .. } => Vec::new(),
            _ => self
                .spec
                .tag_names()
                .into_iter()
                .filter(|name| !self.get(name).is_present())
                .collect(),
        }
    }

    /// Retorna true se cada tag do contrato produziu um segmento.
    pub fn is_complete(&self) -> bool {
        self.segments.len() == self.spec.expected_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resume_spec() -> TagSpec {
        TagSpec::named(["analysis", "optimization_ideas", "optimized_content"])
    }

    #[test]
    fn test_named_all_present() {
        let raw = "<analysis>A</analysis><optimization_ideas>B</optimization_ideas>\
                   <optimized_content>C</optimized_content>";
        let response = TaggedResponse::parse(raw, resume_spec());

        assert!(response.is_complete());
        assert_eq!(response.get("analysis"), TagMatch::Present("A"));
        assert_eq!(response.get("optimization_ideas"), TagMatch::Present("B"));
        assert_eq!(response.get("optimized_content"), TagMatch::Present("C"));
    }

    #[test]
    fn test_named_missing_is_explicit() {
        let raw = "<analysis>A</analysis><optimized_content>C";
        let response = TaggedResponse::parse(raw, resume_spec());

        assert_eq!(response.segments().len(), 1);
        assert_eq!(response.get("optimized_content"), TagMatch::Absent);
        assert_eq!(
            response.missing_tags(),
            vec!["optimization_ideas".to_string(), "optimized_content".to_string()]
        );
    }

    #[test]
    fn test_indexed_gap_renumbers_positions() {
        let raw = "<translation1>X</translation1><translation3>Z</translation3>";
        let segments = extract(raw, &TagSpec::indexed("translation", "", 3));

        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].version_label(), "版本 1");
        assert_eq!(segments[1].version_label(), "版本 2");
        assert_eq!(segments[1].tag, "translation3");
    }

    #[test]
    fn test_indexed_order_follows_index_not_document() {
        let raw = "<translation2>Y</translation2><translation1>X</translation1>";
        let texts: Vec<_> = extract(raw, &TagSpec::indexed("translation", "", 2))
            .into_iter()
            .map(|s| s.text)
            .collect();
        assert_eq!(texts, vec!["X", "Y"]);
    }

    #[test]
    fn test_repeated_positions() {
        let raw = "<suggestion>a</suggestion><suggestion>b</suggestion>";
        let segments = extract(raw, &TagSpec::repeated("suggestion", 3));
        assert_eq!(segments[1].position, 2);
        assert_eq!(segments[1].text, "b");
    }

    #[test]
    fn test_raw_text_is_preserved() {
        let raw = "  <analysis> A </analysis>  ";
        let response = TaggedResponse::parse(raw, resume_spec());
        assert_eq!(response.raw_text(), raw);
    }

    #[test]
    fn test_spec_tag_names() {
        assert_eq!(
            TagSpec::indexed("colloquial_text", "_", 2).tag_names(),
            vec!["colloquial_text_1", "colloquial_text_2"]
        );
        assert_eq!(TagSpec::repeated("suggestion", 3).expected_count(), 3);
    }
}
