//! Upload image normalization
//!
//! Oversized images are scaled down to fit 1200×1200; PNG and HEIC/HEIF input
//! is flattened onto white and re-encoded as JPEG. Anything else that already
//! fits is passed through unchanged.

use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, RgbImage};
use shared::error::{AppError, ErrorCode};
use thiserror::Error;

pub const MAX_DIMENSION: u32 = 1200;
pub const JPEG_QUALITY: u8 = 85;
const DEFAULT_FILE_NAME: &str = "product_image.jpg";

const SUPPORTED_TYPES: &[&str] = &[
    "image/jpeg",
    "image/jpg",
    "image/png",
    "image/gif",
    "image/webp",
    "image/heic",
    "image/heif",
];

#[derive(Debug, Error)]
pub enum ImageError {
    #[error("Unsupported file format: {0}. Supported: JPEG, PNG, GIF, WebP, HEIC, HEIF")]
    Unsupported(String),
    #[error("Invalid image file: {0}")]
    Decode(String),
    #[error("Image processing failed: {0}")]
    Encode(String),
}

impl From<ImageError> for AppError {
    fn from(e: ImageError) -> Self {
        let code = match e {
            ImageError::Unsupported(_) => ErrorCode::UnsupportedFileFormat,
            ImageError::Decode(_) => ErrorCode::InvalidImageFile,
            ImageError::Encode(_) => ErrorCode::ImageProcessingFailed,
        };
        AppError::with_message(code, e.to_string())
    }
}

/// Result of [`ImageConverter::process`]
#[derive(Debug, Clone)]
pub struct ProcessedImage {
    pub bytes: Vec<u8>,
    pub content_type: String,
    pub file_name: String,
    pub extension: String,
    pub original_file_name: Option<String>,
    pub original_content_type: String,
}

/// `image/jpeg; charset=x` → `image/jpeg`; octet-stream falls back to the file extension
pub fn normalize_content_type(content_type: &str, file_name: Option<&str>) -> String {
    let ct = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    if !ct.is_empty() && ct != "application/octet-stream" {
        return ct;
    }
    match file_extension(file_name).as_deref() {
        Some("jpg" | "jpeg") => "image/jpeg".into(),
        Some("png") => "image/png".into(),
        Some("gif") => "image/gif".into(),
        Some("webp") => "image/webp".into(),
        Some("heic") => "image/heic".into(),
        Some("heif") => "image/heif".into(),
        _ => ct,
    }
}

fn file_extension(file_name: Option<&str>) -> Option<String> {
    let name = file_name?;
    let (_, ext) = name.rsplit_once('.')?;
    Some(ext.to_ascii_lowercase())
}

pub fn is_supported(content_type: &str) -> bool {
    SUPPORTED_TYPES.contains(&content_type)
}

/// HEIC/HEIF by content type or file name
pub fn needs_conversion(content_type: &str, file_name: Option<&str>) -> bool {
    matches!(content_type, "image/heic" | "image/heif")
        || matches!(file_extension(file_name).as_deref(), Some("heic" | "heif"))
}

/// Scaled size preserving aspect ratio, `None` when the image already fits
pub fn target_size(width: u32, height: u32, max: u32) -> Option<(u32, u32)> {
    if width <= max && height <= max {
        return None;
    }
    let (w, h) = (u64::from(width), u64::from(height));
    let size = if width >= height {
        (max, (h * u64::from(max) / w) as u32)
    } else {
        ((w * u64::from(max) / h) as u32, max)
    };
    Some((size.0.max(1), size.1.max(1)))
}

fn jpeg_file_name(original: Option<&str>) -> String {
    match original.map(str::trim).filter(|n| !n.is_empty()) {
        Some(name) => {
            let stem = name.rsplit_once('.').map_or(name, |(stem, _)| stem);
            if stem.is_empty() {
                DEFAULT_FILE_NAME.into()
            } else {
                format!("{stem}.jpg")
            }
        }
        None => DEFAULT_FILE_NAME.into(),
    }
}

/// Composite over a white background, dropping alpha
fn flatten_on_white(img: &DynamicImage) -> RgbImage {
    let rgba = img.to_rgba8();
    RgbImage::from_fn(rgba.width(), rgba.height(), |x, y| {
        let [r, g, b, a] = rgba.get_pixel(x, y).0;
        let alpha = u16::from(a);
        let blend = |c: u8| ((u16::from(c) * alpha + 255 * (255 - alpha)) / 255) as u8;
        image::Rgb([blend(r), blend(g), blend(b)])
    })
}

#[derive(Debug, Clone, Copy)]
pub struct ImageConverter {
    pub max_dimension: u32,
    pub quality: u8,
}

impl Default for ImageConverter {
    fn default() -> Self {
        Self {
            max_dimension: MAX_DIMENSION,
            quality: JPEG_QUALITY,
        }
    }
}

impl ImageConverter {
    pub fn process(
        &self,
        bytes: &[u8],
        file_name: Option<&str>,
        content_type: &str,
    ) -> Result<ProcessedImage, ImageError> {
        let content_type = normalize_content_type(content_type, file_name);
        if !is_supported(&content_type) {
            return Err(ImageError::Unsupported(content_type));
        }

        let heif = needs_conversion(&content_type, file_name);
        let img = image::load_from_memory(bytes).map_err(|e| ImageError::Decode(e.to_string()))?;
        let (width, height) = img.dimensions();
        let resize = target_size(width, height, self.max_dimension);

        if resize.is_none() && !heif && content_type != "image/png" {
            let extension = match content_type.as_str() {
                "image/jpeg" | "image/jpg" => "jpg",
                other => other.trim_start_matches("image/"),
            };
            return Ok(ProcessedImage {
                bytes: bytes.to_vec(),
                file_name: file_name
                    .filter(|n| !n.trim().is_empty())
                    .map(String::from)
                    .unwrap_or_else(|| DEFAULT_FILE_NAME.into()),
                extension: extension.to_string(),
                original_file_name: file_name.map(String::from),
                content_type: content_type.clone(),
                original_content_type: content_type,
            });
        }

        let img = match resize {
            Some((w, h)) => {
                tracing::debug!(from = ?(width, height), to = ?(w, h), "Resizing image");
                img.resize_exact(w, h, FilterType::Lanczos3)
            }
            None => img,
        };

        let rgb = flatten_on_white(&img);
        let mut buffer = Vec::new();
        {
            let mut cursor = Cursor::new(&mut buffer);
            let encoder = JpegEncoder::new_with_quality(&mut cursor, self.quality);
            rgb.write_with_encoder(encoder)
                .map_err(|e| ImageError::Encode(e.to_string()))?;
        }

        tracing::debug!(
            original_bytes = bytes.len(),
            converted_bytes = buffer.len(),
            "Image converted to JPEG"
        );

        Ok(ProcessedImage {
            bytes: buffer,
            content_type: "image/jpeg".into(),
            file_name: jpeg_file_name(file_name),
            extension: "jpg".into(),
            original_file_name: file_name.map(String::from),
            original_content_type: content_type,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, ImageFormat, Rgba};

    fn encode(width: u32, height: u32, format: ImageFormat) -> Vec<u8> {
        let buf = ImageBuffer::from_pixel(width, height, Rgba([200u8, 30, 30, 255]));
        let img = match format {
            ImageFormat::Jpeg => DynamicImage::ImageRgb8(DynamicImage::ImageRgba8(buf).to_rgb8()),
            _ => DynamicImage::ImageRgba8(buf),
        };
        let mut bytes = Vec::new();
        img.write_to(&mut Cursor::new(&mut bytes), format).unwrap();
        bytes
    }

    #[test]
    fn test_target_size() {
        assert_eq!(target_size(800, 600, 1200), None);
        assert_eq!(target_size(1200, 1200, 1200), None);
        assert_eq!(target_size(2400, 1000, 1200), Some((1200, 500)));
        assert_eq!(target_size(900, 1800, 1200), Some((600, 1200)));
        assert_eq!(target_size(1201, 1201, 1200), Some((1200, 1200)));
        assert_eq!(target_size(5000, 2, 1200), Some((1200, 1)));
    }

    #[test]
    fn test_needs_conversion() {
        assert!(needs_conversion("image/heic", None));
        assert!(needs_conversion("image/jpeg", Some("IMG_0001.HEIC")));
        assert!(!needs_conversion("image/png", Some("logo.png")));
    }

    #[test]
    fn test_normalize_content_type() {
        assert_eq!(normalize_content_type("Image/JPEG; q=1", None), "image/jpeg");
        assert_eq!(
            normalize_content_type("application/octet-stream", Some("a.webp")),
            "image/webp"
        );
        assert_eq!(normalize_content_type("", Some("a.txt")), "");
    }

    #[test]
    fn test_small_jpeg_passes_through() {
        let bytes = encode(64, 48, ImageFormat::Jpeg);
        let out = ImageConverter::default()
            .process(&bytes, Some("dish.jpeg"), "image/jpeg")
            .unwrap();
        assert_eq!(out.bytes, bytes);
        assert_eq!(out.file_name, "dish.jpeg");
        assert_eq!(out.extension, "jpg");
    }

    #[test]
    fn test_png_converted_to_jpeg() {
        let bytes = encode(32, 32, ImageFormat::Png);
        let out = ImageConverter::default()
            .process(&bytes, Some("logo.png"), "image/png")
            .unwrap();
        assert_eq!(out.content_type, "image/jpeg");
        assert_eq!(out.file_name, "logo.jpg");
        assert_eq!(out.original_content_type, "image/png");
        assert_eq!(image::guess_format(&out.bytes).unwrap(), ImageFormat::Jpeg);
    }

    #[test]
    fn test_oversized_image_resized() {
        let bytes = encode(2400, 600, ImageFormat::Jpeg);
        let out = ImageConverter::default().process(&bytes, None, "image/jpeg").unwrap();
        let img = image::load_from_memory(&out.bytes).unwrap();
        assert_eq!(img.dimensions(), (1200, 300));
        assert_eq!(out.file_name, "product_image.jpg");
    }

    #[test]
    fn test_transparency_flattened_white() {
        let buf = ImageBuffer::from_pixel(2, 2, Rgba([0u8, 0, 0, 0]));
        let rgb = flatten_on_white(&DynamicImage::ImageRgba8(buf));
        assert_eq!(rgb.get_pixel(0, 0).0, [255, 255, 255]);

        let buf = ImageBuffer::from_pixel(1, 1, Rgba([10u8, 20, 30, 255]));
        let rgb = flatten_on_white(&DynamicImage::ImageRgba8(buf));
        assert_eq!(rgb.get_pixel(0, 0).0, [10, 20, 30]);
    }

    #[test]
    fn test_unsupported_type_rejected() {
        let err = ImageConverter::default()
            .process(b"hello", Some("notes.txt"), "text/plain")
            .unwrap_err();
        assert!(matches!(err, ImageError::Unsupported(_)));
        assert_eq!(AppError::from(err).code, ErrorCode::UnsupportedFileFormat);
    }

    #[test]
    fn test_undecodable_heic_is_invalid_image() {
        let err = ImageConverter::default()
            .process(b"\0\0\0\x18ftypheic", Some("photo.heic"), "image/heic")
            .unwrap_err();
        assert!(matches!(err, ImageError::Decode(_)));
        assert_eq!(AppError::from(err).code, ErrorCode::InvalidImageFile);
    }
}
