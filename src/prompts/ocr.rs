//! Prompt de reconhecimento de texto em imagens de notas.
//!
//! Resposta livre; `NO_TEXT_MARKER` sinaliza imagem sem texto.

use super::ToolPrompt;

/// Resposta combinada com o modelo para "sem texto".
pub const NO_TEXT_MARKER: &str = "无文字";

pub fn build() -> ToolPrompt {
    ToolPrompt::plain(format!(
        "请识别并提取这张图片中的所有文字内容，包括中文、英文、数字等。请按照图片中文字的布局顺序，逐行返回识别的文字，保持原有的换行结构。如果没有文字就返回'{}'。",
        NO_TEXT_MARKER
    ))
}
