// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// EXPORTAÇÃO DO OCR DE NOTAS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//
// Três formatos: resumo JSON (chaves fixas, em ordem), texto simples e dump
// completo. Só gera o conteúdo e o nome do arquivo; gravar é com o chamador.
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use serde::ser::{SerializeMap, SerializeStruct};
use serde::{Serialize, Serializer};

use crate::tools::ocr::{ImageText, Note};

const KEY_TITLE: &str = "标题";
const KEY_BODY: &str = "笔记内容";
const KEY_IMAGE_TEXT: &str = "图片文字";

/// Resumo de uma nota: título, corpo e texto por imagem.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteSummary {
    pub title: String,
    pub body: String,
    /// (rótulo, texto) na ordem das imagens; só imagens com texto.
    pub image_texts: Vec<(String, String)>,
}

impl NoteSummary {
    pub fn new(note: &Note, results: &[ImageText]) -> Self {
        Self {
            title: note.title.clone(),
            body: note.description.clone(),
            image_texts: results
                .iter()
                .filter_map(|r| Some((r.label(), r.outcome.text()?.to_string())))
                .collect(),
        }
    }

    /// Retorna true quando não há nada para exportar.
    pub fn is_empty(&self) -> bool {
        self.title.is_empty() && self.body.is_empty() && self.image_texts.is_empty()
    }

    /// JSON indentado, sem escapar caracteres não-ASCII.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Versão em texto simples.
    pub fn to_text(&self) -> String {
        let mut text = format!("{}: {}\n\n{}: {}\n\n", KEY_TITLE, self.title, KEY_BODY, self.body);
        if !self.image_texts.is_empty() {
            text.push_str(KEY_IMAGE_TEXT);
            text.push_str(":\n");
            for (label, content) in &self.image_texts {
                text.push_str(&format!("\n【{}】\n{}\n", label, content));
            }
        }
        text
    }
}

struct ImageTextMap<'a>(&'a [(String, String)]);

impl Serialize for ImageTextMap<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (label, text) in self.0 {
            map.serialize_entry(label, text)?;
        }
        map.end()
    }
}

// Ordem das chaves fixa, independente de features do serde_json
impl Serialize for NoteSummary {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("NoteSummary", 3)?;
        state.serialize_field(KEY_TITLE, &self.title)?;
        state.serialize_field(KEY_BODY, &self.body)?;
        state.serialize_field(KEY_IMAGE_TEXT, &ImageTextMap(&self.image_texts))?;
        state.end()
    }
}

/// Dump completo: dados da nota, resultados e o resumo.
#[derive(Debug, Serialize)]
pub struct FullExport<'a> {
    pub title: &'a str,
    pub description: &'a str,
    pub images: &'a [String],
    /// Blocos "【图片N】\n texto" das imagens com texto.
    pub ocr_texts: Vec<String>,
    /// O resumo JSON já serializado.
    pub combined_ocr_text: String,
    pub summary_data: &'a NoteSummary,
}

impl<'a> FullExport<'a> {
    pub fn new(note: &'a Note, summary: &'a NoteSummary) -> serde_json::Result<Self> {
        Ok(Self {
            title: &note.title,
            description: &note.description,
            images: &note.images,
            ocr_texts: summary
                .image_texts
                .iter()
                .map(|(label, text)| format!("【{}】\n{}", label, text))
                .collect(),
            combined_ocr_text: summary.to_json()?,
            summary_data: summary,
        })
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Tipo de arquivo exportado.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportKind {
    SummaryJson,
    Text,
    Full,
}

impl ExportKind {
    /// Nome do arquivo; sem ID da nota usa `content`.
    pub fn file_name(&self, note_id: Option<&str>) -> String {
        let id = note_id.filter(|id| !id.is_empty()).unwrap_or("content");
        match self {
            Self::SummaryJson => format!("xiaohongshu_汇总_{}.json", id),
            Self::Text => format!("xiaohongshu_文字_{}.txt", id),
            Self::Full => format!("xiaohongshu_完整_{}.json", id),
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::SummaryJson | Self::Full => "application/json",
            Self::Text => "text/plain",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::ocr::OcrOutcome;

    fn fixture() -> (Note, Vec<ImageText>) {
        let note = Note {
            title: "周末去哪".into(),
            description: "三个地方".into(),
            images: vec!["http://a/1.jpg".into(), "http://a/2.jpg".into(), "http://a/3.jpg".into()],
        };
        let results = vec![
            ImageText {
                index: 0,
                url: note.images[0].clone(),
                outcome: OcrOutcome::Text("公园".into()),
            },
            ImageText {
                index: 1,
                url: note.images[1].clone(),
                outcome: OcrOutcome::NoText,
            },
            ImageText {
                index: 2,
                url: note.images[2].clone(),
                outcome: OcrOutcome::Text("博物馆\n周一闭馆".into()),
            },
        ];
        (note, results)
    }

    #[test]
    fn test_summary_json_key_order_and_labels() {
        let (note, results) = fixture();
        let summary = NoteSummary::new(&note, &results);
        let json = summary.to_json().unwrap();

        let title = json.find("\"标题\"").unwrap();
        let body = json.find("\"笔记内容\"").unwrap();
        let images = json.find("\"图片文字\"").unwrap();
        assert!(title < body && body < images);
        // Rótulo segue a posição original: a imagem 2 não tem texto
        assert!(json.contains("\"图片1\": \"公园\""));
        assert!(json.contains("\"图片3\""));
        assert!(!json.contains("\"图片2\""));
    }

    #[test]
    fn test_summary_text() {
        let (note, results) = fixture();
        let text = NoteSummary::new(&note, &results).to_text();
        assert_eq!(
            text,
            "标题: 周末去哪\n\n笔记内容: 三个地方\n\n图片文字:\n\n【图片1】\n公园\n\n【图片3】\n博物馆\n周一闭馆\n"
        );
    }

    #[test]
    fn test_summary_text_without_images() {
        let summary = NoteSummary {
            title: "t".into(),
            ..Default::default()
        };
        assert_eq!(summary.to_text(), "标题: t\n\n笔记内容: \n\n");
    }

    #[test]
    fn test_full_export() {
        let (note, results) = fixture();
        let summary = NoteSummary::new(&note, &results);
        let full = FullExport::new(&note, &summary).unwrap();
        assert_eq!(full.ocr_texts[1], "【图片3】\n博物馆\n周一闭馆");

        let value: serde_json::Value = serde_json::from_str(&full.to_json().unwrap()).unwrap();
        assert_eq!(value["images"].as_array().unwrap().len(), 3);
        assert_eq!(value["summary_data"]["标题"], "周末去哪");
    }

    #[test]
    fn test_file_names() {
        assert_eq!(ExportKind::SummaryJson.file_name(Some("abc")), "xiaohongshu_汇总_abc.json");
        assert_eq!(ExportKind::Text.file_name(None), "xiaohongshu_文字_content.txt");
        assert_eq!(ExportKind::Full.file_name(Some("")), "xiaohongshu_完整_content.json");
        assert_eq!(ExportKind::Full.mime_type(), "application/json");
        assert_eq!(ExportKind::Text.mime_type(), "text/plain");
    }
}
