// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// IMAGENS ENVIADAS AOS PROVEDORES
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//
// Valida o arquivo enviado pelo usuário e o converte em base64 para virar
// uma parte de conteúdo da requisição. Imagem acima do teto é decodificada,
// achatada sobre fundo branco e re-encodada em JPEG, baixando a qualidade e
// reduzindo as dimensões até caber. Só é rejeitada se não couber nem assim.
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, Rgb, RgbImage};

use crate::types::ContentPart;

/// Erros de preparação de imagem
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ImageError {
    #[error("Image is empty")]
    Empty,

    #[error("Unsupported image format: {0}")]
    UnsupportedFormat(String),

    #[error("Image too large: {size} bytes (max {max})")]
    TooLarge { size: usize, max: usize },

    #[error("Image could not be decoded: {0}")]
    Decode(String),
}

/// Qualidade JPEG da primeira re-encodação.
pub const JPEG_QUALITY: u8 = 85;

/// Qualidade mínima aceita no laço de compressão.
pub const MIN_JPEG_QUALITY: u8 = 30;

/// Passo de qualidade entre tentativas.
const QUALITY_STEP: u8 = 5;

/// Fator de redução das dimensões entre tentativas.
const SCALE_STEP: f64 = 0.9;

/// Formatos aceitos pelos três provedores.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Jpeg,
    Png,
    Gif,
    Webp,
}

impl ImageFormat {
    pub fn media_type(&self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
            Self::Gif => "image/gif",
            Self::Webp => "image/webp",
        }
    }

    /// Detecta o formato pelos bytes iniciais.
    pub fn sniff(bytes: &[u8]) -> Option<Self> {
        if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
            Some(Self::Jpeg)
        } else if bytes.starts_with(b"\x89PNG\r\n\x1a\n") {
            Some(Self::Png)
        } else if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
            Some(Self::Gif)
        } else if bytes.len() >= 12 && &bytes[..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
            Some(Self::Webp)
        } else {
            None
        }
    }

    fn from_media_type(media_type: &str) -> Option<Self> {
        match media_type {
            "image/jpeg" => Some(Self::Jpeg),
            "image/png" => Some(Self::Png),
            "image/gif" => Some(Self::Gif),
            "image/webp" => Some(Self::Webp),
            _ => None,
        }
    }
}

/// Imagem validada e codificada, pronta para a requisição.
#[derive(Debug, Clone)]
pub struct ImageAttachment {
    pub format: ImageFormat,
    /// Tamanho enviado, em bytes.
    pub size: usize,
    /// Tamanho do arquivo recebido.
    pub original_size: usize,
    /// Conteúdo em base64 padrão.
    pub data: String,
}

impl ImageAttachment {
    pub fn media_type(&self) -> &'static str {
        self.format.media_type()
    }

    pub fn to_content_part(&self) -> ContentPart {
        ContentPart::InlineImage {
            media_type: self.media_type().to_string(),
            data: self.data.clone(),
        }
    }
}

/// Valida e codifica uma imagem enviada.
///
/// O formato vem dos magic bytes; só quando eles não batem o nome do
/// arquivo é consultado via `mime_guess`.
pub fn prepare_image(bytes: &[u8], file_name: Option<&str>, max_bytes: usize) -> Result<ImageAttachment, ImageError> {
    if bytes.is_empty() {
        return Err(ImageError::Empty);
    }

    let format = match ImageFormat::sniff(bytes) {
        Some(format) => format,
        None => {
            let guessed = file_name
                .and_then(|name| mime_guess::from_path(name).first())
                .map(|mime| mime.essence_str().to_string());
            match guessed.as_deref().and_then(ImageFormat::from_media_type) {
                Some(format) => format,
                None => {
                    return Err(ImageError::UnsupportedFormat(
                        guessed.unwrap_or_else(|| "unknown".into()),
                    ))
                }
            }
        }
    };

    if bytes.len() <= max_bytes {
        log::debug!("🖼️ Imagem {} com {} bytes", format.media_type(), bytes.len());
        return Ok(ImageAttachment {
            format,
            size: bytes.len(),
            original_size: bytes.len(),
            data: STANDARD.encode(bytes),
        });
    }

    log::info!("🗜️ Imagem de {} bytes acima do limite de {}, comprimindo", bytes.len(), max_bytes);
    let decoded = image::load_from_memory(bytes).map_err(|e| ImageError::Decode(e.to_string()))?;
    let jpeg = shrink_to_fit(flatten_alpha(&decoded), bytes.len(), max_bytes)?;

    log::debug!("🖼️ Imagem comprimida de {} para {} bytes", bytes.len(), jpeg.len());
    Ok(ImageAttachment {
        format: ImageFormat::Jpeg,
        size: jpeg.len(),
        original_size: bytes.len(),
        data: STANDARD.encode(&jpeg),
    })
}

/// Converte para RGB, compondo pixels transparentes sobre branco.
fn flatten_alpha(image: &DynamicImage) -> RgbImage {
    if !image.color().has_alpha() {
        return image.to_rgb8();
    }

    let rgba = image.to_rgba8();
    RgbImage::from_fn(rgba.width(), rgba.height(), |x, y| {
        let [r, g, b, a] = rgba.get_pixel(x, y).0;
        let blend = |c: u8| ((c as u32 * a as u32 + 255 * (255 - a as u32)) / 255) as u8;
        Rgb([blend(r), blend(g), blend(b)])
    })
}

fn encode_jpeg(image: &RgbImage, quality: u8) -> Result<Vec<u8>, ImageError> {
    let mut out = Vec::new();
    JpegEncoder::new_with_quality(&mut out, quality)
        .encode_image(image)
        .map_err(|e| ImageError::Decode(e.to_string()))?;
    Ok(out)
}

/// Re-encoda em JPEG até caber em `max_bytes`.
///
/// Começa em `JPEG_QUALITY`; se não couber, parte de uma qualidade
/// proporcional ao excesso e a cada tentativa baixa `QUALITY_STEP` e
/// reduz as dimensões a 90%, até `MIN_JPEG_QUALITY`.
fn shrink_to_fit(mut image: RgbImage, original_size: usize, max_bytes: usize) -> Result<Vec<u8>, ImageError> {
    let mut jpeg = encode_jpeg(&image, JPEG_QUALITY)?;
    if jpeg.len() <= max_bytes {
        return Ok(jpeg);
    }

    let ratio = max_bytes as f64 / jpeg.len() as f64;
    let mut quality = ((ratio * JPEG_QUALITY as f64) as u8).max(MIN_JPEG_QUALITY);

    loop {
        jpeg = encode_jpeg(&image, quality)?;
        if jpeg.len() <= max_bytes {
            return Ok(jpeg);
        }
        if quality <= MIN_JPEG_QUALITY {
            break;
        }

        let width = ((image.width() as f64 * SCALE_STEP) as u32).max(1);
        let height = ((image.height() as f64 * SCALE_STEP) as u32).max(1);
        image = image::imageops::resize(&image, width, height, FilterType::Lanczos3);
        quality = quality.saturating_sub(QUALITY_STEP).max(MIN_JPEG_QUALITY);
        log::debug!("🗜️ Tentando {}x{} com qualidade {}", width, height, quality);
    }

    log::warn!("⚠️ Imagem de {} bytes não coube em {} bytes", original_size, max_bytes);
    Err(ImageError::TooLarge {
        size: original_size,
        max: max_bytes,
    })
}
