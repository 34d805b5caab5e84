// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// TEXT UTILITIES
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Estimativa de tokens por caractere
const CHARS_PER_TOKEN: f32 = 4.0;

/// Estima número de tokens em um texto
pub fn estimate_tokens(text: &str) -> usize {
    (text.len() as f32 / CHARS_PER_TOKEN).ceil() as usize
}

/// Prévia de no máximo `max_chars` caracteres, com reticências se cortou.
///
/// Conta caracteres, não bytes: seguro para texto chinês.
pub fn preview(text: &str, max_chars: usize) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(max_chars).collect();
    if chars.next().is_some() {
        format!("{}…", head)
    } else {
        head
    }
}

/// Retorna true se o texto é vazio ou só espaços.
pub fn is_blank(text: &str) -> bool {
    text.trim().is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_estimate_tokens() {
        let text = "Hello world"; // 11 chars ≈ 3 tokens
        assert!(estimate_tokens(text) >= 2 && estimate_tokens(text) <= 4);
    }

    #[test]
    fn test_preview_counts_chars() {
        assert_eq!(preview("你好世界", 2), "你好…");
        assert_eq!(preview("abc", 3), "abc");
        assert_eq!(preview("", 3), "");
    }

    #[test]
    fn test_is_blank() {
        assert!(is_blank(" \n\t"));
        assert!(!is_blank(" x "));
    }
}
