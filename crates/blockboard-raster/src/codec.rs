//! Encoding and decoding image bytes and data URIs.
//!
//! Blocks reference their pixels through `src` strings; embedded images use
//! `data:` URIs so a document round-trips through JSON without sidecar files.

use crate::RasterError;
use base64::{Engine, engine::general_purpose::STANDARD};
use image::{ImageFormat, RgbaImage};
use std::io::Cursor;

/// Image formats the pipeline produces or accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    /// PNG format.
    Png,
    /// JPEG format.
    Jpeg,
}

impl PixelFormat {
    /// Get MIME type for this format.
    pub fn mime_type(&self) -> &'static str {
        match self {
            PixelFormat::Png => "image/png",
            PixelFormat::Jpeg => "image/jpeg",
        }
    }

    /// Parse a MIME type.
    pub fn from_mime_type(mime: &str) -> Option<Self> {
        match mime {
            "image/png" => Some(PixelFormat::Png),
            "image/jpeg" | "image/jpg" => Some(PixelFormat::Jpeg),
            _ => None,
        }
    }

    /// Detect format from magic bytes.
    pub fn from_magic_bytes(data: &[u8]) -> Option<Self> {
        // PNG: 89 50 4E 47
        if data.starts_with(&[0x89, 0x50, 0x4E, 0x47]) {
            return Some(PixelFormat::Png);
        }
        // JPEG: FF D8 FF
        if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return Some(PixelFormat::Jpeg);
        }
        None
    }

    fn to_image_format(self) -> ImageFormat {
        match self {
            PixelFormat::Png => ImageFormat::Png,
            PixelFormat::Jpeg => ImageFormat::Jpeg,
        }
    }
}

/// Encode raw image file bytes as a `data:` URI.
pub fn encode_data_uri(bytes: &[u8], format: PixelFormat) -> String {
    format!(
        "data:{};base64,{}",
        format.mime_type(),
        STANDARD.encode(bytes)
    )
}

/// Decode a `data:` URI into raw bytes plus the declared format.
pub fn decode_data_uri(uri: &str) -> Result<(Vec<u8>, PixelFormat), RasterError> {
    let rest = uri
        .strip_prefix("data:")
        .ok_or_else(|| RasterError::BadDataUri(uri.chars().take(32).collect()))?;
    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| RasterError::BadDataUri(uri.chars().take(32).collect()))?;
    let mime = header.strip_suffix(";base64").unwrap_or(header);
    let format = PixelFormat::from_mime_type(mime)
        .ok_or_else(|| RasterError::UnsupportedFormat(mime.to_string()))?;
    let bytes = STANDARD.decode(payload)?;
    Ok((bytes, format))
}

/// Encode an RGBA image to raw file bytes.
pub fn encode_image(image: &RgbaImage, format: PixelFormat) -> Result<Vec<u8>, RasterError> {
    let mut out = Cursor::new(Vec::new());
    match format {
        PixelFormat::Png => image.write_to(&mut out, ImageFormat::Png)?,
        // JPEG has no alpha channel.
        PixelFormat::Jpeg => {
            let rgb = image::DynamicImage::ImageRgba8(image.clone()).to_rgb8();
            rgb.write_to(&mut out, ImageFormat::Jpeg)?
        }
    }
    Ok(out.into_inner())
}

/// Encode an RGBA image straight to a `data:` URI.
pub fn image_to_data_uri(image: &RgbaImage, format: PixelFormat) -> Result<String, RasterError> {
    Ok(encode_data_uri(&encode_image(image, format)?, format))
}

/// Decode raw image file bytes into RGBA pixels.
pub fn decode_image(bytes: &[u8]) -> Result<RgbaImage, RasterError> {
    let format = PixelFormat::from_magic_bytes(bytes)
        .ok_or_else(|| RasterError::UnsupportedFormat("unknown magic bytes".to_string()))?;
    let image = image::load_from_memory_with_format(bytes, format.to_image_format())?;
    Ok(image.to_rgba8())
}

/// Decode a `data:` URI into RGBA pixels.
pub fn data_uri_to_image(uri: &str) -> Result<RgbaImage, RasterError> {
    let (bytes, _) = decode_data_uri(uri)?;
    decode_image(&bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn checker(width: u32, height: u32) -> RgbaImage {
        RgbaImage::from_fn(width, height, |x, y| {
            if (x + y) % 2 == 0 {
                Rgba([255, 255, 255, 255])
            } else {
                Rgba([0, 0, 0, 255])
            }
        })
    }

    #[test]
    fn test_png_data_uri_roundtrip() {
        let img = checker(8, 6);
        let uri = image_to_data_uri(&img, PixelFormat::Png).unwrap();
        assert!(uri.starts_with("data:image/png;base64,"));

        let back = data_uri_to_image(&uri).unwrap();
        assert_eq!(back.dimensions(), (8, 6));
        assert_eq!(back, img);
    }

    #[test]
    fn test_jpeg_encoding_drops_alpha() {
        let img = checker(8, 8);
        let bytes = encode_image(&img, PixelFormat::Jpeg).unwrap();
        assert_eq!(PixelFormat::from_magic_bytes(&bytes), Some(PixelFormat::Jpeg));
    }

    #[test]
    fn test_bad_data_uri() {
        assert!(matches!(
            decode_data_uri("http://example.com/cat.png"),
            Err(RasterError::BadDataUri(_))
        ));
        assert!(matches!(
            decode_data_uri("data:text/plain;base64,aGk="),
            Err(RasterError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_magic_byte_detection() {
        assert_eq!(
            PixelFormat::from_magic_bytes(&[0x89, 0x50, 0x4E, 0x47, 0x0D]),
            Some(PixelFormat::Png)
        );
        assert_eq!(
            PixelFormat::from_magic_bytes(&[0xFF, 0xD8, 0xFF, 0xE0]),
            Some(PixelFormat::Jpeg)
        );
        assert_eq!(PixelFormat::from_magic_bytes(&[0x00, 0x01]), None);
    }
}
