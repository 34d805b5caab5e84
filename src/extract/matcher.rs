// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// MATCHERS DE DELIMITADORES
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//
// Três estratégias de localização, uma por forma de contrato:
// - Nome fixo: primeira abertura + primeiro fechamento em qualquer ponto
// - Indexado: regex não-gulosa por índice, primeira ocorrência vence
// - Repetido: split no fechamento, limitado aos N primeiros pedaços
//
// Nenhuma função aqui devolve offsets ao chamador.
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use regex::Regex;

/// Resultado explícito da busca por uma tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagMatch<'a> {
    /// Abertura e fechamento encontrados; conteúdo já sem espaços nas bordas.
    Present(&'a str),
    /// Abertura ou fechamento ausente, ou fora de ordem.
    Absent,
}

impl<'a> TagMatch<'a> {
    /// Conteúdo do segmento, se presente.
    pub fn as_option(&self) -> Option<&'a str> {
        match self {
            Self::Present(text) => Some(text),
            Self::Absent => None,
        }
    }

    /// Retorna true se a tag foi encontrada.
    pub fn is_present(&self) -> bool {
        matches!(self, Self::Present(_))
    }
}

/// Delimitador de abertura: `<tag>`.
pub fn open_delimiter(tag: &str) -> String {
    format!("<{}>", tag)
}

/// Delimitador de fechamento: `</tag>`.
pub fn close_delimiter(tag: &str) -> String {
    format!("</{}>", tag)
}

/// Localiza uma tag de nome único.
///
/// Usa a primeira abertura e o primeiro fechamento do texto inteiro, sem
/// entender aninhamento. Se o fechamento começa antes do fim da abertura,
/// a tag é considerada ausente.
pub fn find_tag<'a>(raw: &'a str, tag: &str) -> TagMatch<'a> {
    let open = open_delimiter(tag);
    let close = close_delimiter(tag);

    let (Some(open_at), Some(close_at)) = (raw.find(&open), raw.find(&close)) else {
        return TagMatch::Absent;
    };

    let content_start = open_at + open.len();
    if content_start > close_at {
        return TagMatch::Absent;
    }

    TagMatch::Present(raw[content_start..close_at].trim())
}

/// Localiza a primeira ocorrência de uma tag indexada (`<base{sep}{index}>`).
///
/// Equivalente a `<tag>(.*?)</tag>` com `.` casando quebras de linha: o
/// fechamento considerado é o primeiro depois da primeira abertura.
pub fn find_indexed<'a>(raw: &'a str, base: &str, separator: &str, index: usize) -> TagMatch<'a> {
    let tag = format!("{}{}{}", base, separator, index);
    let pattern = format!(
        r"(?s){}(.*?){}",
        regex::escape(&open_delimiter(&tag)),
        regex::escape(&close_delimiter(&tag))
    );

    let re = match Regex::new(&pattern) {
        Ok(re) => re,
        Err(e) => {
            log::warn!("Padrão de tag inválido para '{}': {}", tag, e);
            return TagMatch::Absent;
        }
    };

    re.captures(raw)
        .and_then(|caps| caps.get(1))
        .map(|m| TagMatch::Present(m.as_str().trim()))
        .unwrap_or(TagMatch::Absent)
}

/// Fatia um texto com a mesma tag repetida, em ordem de documento.
///
/// Divide no fechamento e olha só os `limit` primeiros pedaços. Um pedaço
/// vira segmento quando foi terminado por um fechamento e contém a abertura;
/// o conteúdo é o que vem depois da abertura, sem outras aberturas, aparado.
/// Pedaços vazios são descartados.
pub fn split_repeated<'a>(raw: &'a str, tag: &str, limit: usize) -> Vec<String> {
    let open = open_delimiter(tag);
    let close = close_delimiter(tag);

    let pieces: Vec<&'a str> = raw.split(close.as_str()).collect();
    let terminated = pieces.len().saturating_sub(1);

    pieces
        .iter()
        .take(limit.min(terminated))
        .filter_map(|piece| {
            let open_at = piece.find(&open)?;
            let content = piece[open_at + open.len()..].replace(&open, "");
            let content = content.trim();
            (!content.is_empty()).then(|| content.to_string())
        })
        .collect()
}
