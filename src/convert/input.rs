use crate::error::Error;
use crate::layout::SourceImage;
use derive_more::Display;
use image::{ColorType, ImageFormat};
use std::path::Path;

/// The kinds of file a conversion accepts
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    /// A word-processor document (`.docx`)
    Docx,
    Text,
    Html,
    /// Any raster image format the `image` crate can decode
    Image,
}

impl InputKind {
    /// Decide what a file is from its name, falling back to sniffing the
    /// contents for images with an unfamiliar or missing extension
    pub fn detect(name: &str, bytes: &[u8]) -> Result<InputKind, Error> {
        let extension = Path::new(name)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());

        let kind = match extension.as_deref() {
            Some("docx") => Some(InputKind::Docx),
            Some("txt" | "text" | "log" | "md" | "csv") => Some(InputKind::Text),
            Some("html" | "htm" | "xhtml") => Some(InputKind::Html),
            Some(ext) if ImageFormat::from_extension(ext).is_some() => Some(InputKind::Image),
            _ => None,
        };

        match kind {
            Some(kind) => Ok(kind),
            None if image::guess_format(bytes).is_ok() => Ok(InputKind::Image),
            None => Err(Error::UnsupportedInput(name.to_string())),
        }
    }
}

/// A decoded image, plus the original file when it can be embedded without
/// decoding it again
pub struct DecodedImage {
    pub source: SourceImage,
    /// Set for 8-bit RGB JPEG files, which PDF readers can display as they are
    pub jpeg: Option<Vec<u8>>,
}

/// Decode an image file from memory
pub fn decode_image(bytes: &[u8]) -> Result<DecodedImage, Error> {
    let format = image::guess_format(bytes)?;
    let pixels = image::load_from_memory_with_format(bytes, format)?;

    // CMYK files also decode to RGB, so the frame header has the final say
    let jpeg = (format == ImageFormat::Jpeg
        && pixels.color() == ColorType::Rgb8
        && jpeg_components(bytes) == Some(3))
    .then(|| bytes.to_vec());

    Ok(DecodedImage {
        source: SourceImage::new(pixels),
        jpeg,
    })
}

/// Number of colour components declared by a JPEG's start-of-frame header
fn jpeg_components(data: &[u8]) -> Option<u8> {
    if data.len() < 2 || data[0] != 0xFF || data[1] != 0xD8 {
        return None;
    }

    let mut i = 2;
    while i + 3 < data.len() {
        if data[i] != 0xFF {
            return None;
        }
        let marker = data[i + 1];
        match marker {
            // fill bytes before a marker
            0xFF => {
                i += 1;
                continue;
            }
            // markers without a length
            0x01 | 0xD0..=0xD7 => {
                i += 2;
                continue;
            }
            0xD9 | 0xDA => return None,
            // every SOFn except DHT, JPG and DAC
            0xC0..=0xCF if !matches!(marker, 0xC4 | 0xC8 | 0xCC) => {
                return data.get(i + 9).copied();
            }
            _ => {}
        }
        let len = u16::from_be_bytes([data[i + 2], data[i + 3]]) as usize;
        i += 2 + len;
    }
    None
}
