//! Image container glue around the `image` crate.
//!
//! The engine itself only sees [`PixelBuffer`]s; this module turns PNG or
//! JPEG bytes into pixels and mutated pixels back into an output image.

use std::io::Cursor;
use std::path::Path;

use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageFormat};
use log::warn;
use serde::{Deserialize, Serialize};

use super::error::StegoError;
use super::pixels::PixelBuffer;

/// Output container for an encoded carrier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Lossless; the embedded bits survive.
    #[default]
    Png,
    /// Lossy; recompression destroys the embedded bits.
    Jpeg,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpeg",
        }
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = StegoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "png" => Ok(Self::Png),
            "jpeg" | "jpg" => Ok(Self::Jpeg),
            other => Err(StegoError::UnsupportedInputFormat(format!(
                "output format '{}', use png or jpeg",
                other
            ))),
        }
    }
}

/// Accepted carrier formats.
const SUPPORTED_FORMATS: [ImageFormat; 2] = [ImageFormat::Png, ImageFormat::Jpeg];

/// Checks a carrier path's extension (`.png`, `.jpg`, `.jpeg`).
pub fn image_format_from_path(path: &Path) -> Result<ImageFormat, StegoError> {
    match ImageFormat::from_path(path) {
        Ok(format) if SUPPORTED_FORMATS.contains(&format) => Ok(format),
        _ => Err(StegoError::UnsupportedInputFormat(format!(
            "{}: please use a PNG or JPEG image",
            path.display()
        ))),
    }
}

/// Decodes PNG or JPEG bytes into RGBA pixels.
pub fn load_pixels(bytes: &[u8]) -> Result<PixelBuffer, StegoError> {
    let format = image::guess_format(bytes)
        .ok()
        .filter(|f| SUPPORTED_FORMATS.contains(f))
        .ok_or_else(|| {
            StegoError::UnsupportedInputFormat("image is not a PNG or JPEG".to_string())
        })?;

    let image = image::load_from_memory_with_format(bytes, format)
        .map_err(|e| StegoError::UnsupportedInputFormat(format!("invalid image: {}", e)))?;
    Ok(PixelBuffer::from_rgba(image.to_rgba8()))
}

/// Re-encodes pixels into the chosen container.
///
/// `quality` (1-100) only applies to JPEG.
pub fn encode_pixels(
    pixels: PixelBuffer,
    format: OutputFormat,
    quality: u8,
) -> Result<Vec<u8>, StegoError> {
    let image = DynamicImage::ImageRgba8(pixels.into_rgba());
    let mut bytes = Vec::new();

    match format {
        OutputFormat::Png => {
            image
                .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
                .map_err(|e| StegoError::ImageEncode(e.to_string()))?;
        }
        OutputFormat::Jpeg => {
            warn!("JPEG output is lossy; the hidden payload will not survive decoding");
            let rgb = image.to_rgb8();
            JpegEncoder::new_with_quality(&mut bytes, quality.clamp(1, 100))
                .encode_image(&rgb)
                .map_err(|e| StegoError::ImageEncode(e.to_string()))?;
        }
    }

    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Rgb, Rgba, RgbaImage};

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = ImageBuffer::from_fn(width, height, |x, y| {
            Rgb([
                ((x * 17) % 256) as u8,
                ((y * 23) % 256) as u8,
                (((x + y) * 31) % 256) as u8,
            ])
        });
        let mut bytes = Vec::new();
        DynamicImage::ImageRgb8(img)
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        bytes
    }

    #[test]
    fn test_load_png() {
        let pixels = load_pixels(&png_bytes(20, 10)).unwrap();
        assert_eq!(pixels.dimensions(), (20, 10));
        // RGB input gets an opaque alpha channel
        assert_eq!(pixels.channel(0, 3), 255);
    }

    #[test]
    fn test_png_roundtrip_is_lossless() {
        let image = RgbaImage::from_fn(16, 16, |x, y| Rgba([x as u8, y as u8, 3, 128]));
        let pixels = PixelBuffer::from_rgba(image);
        let bytes = encode_pixels(pixels.clone(), OutputFormat::Png, 90).unwrap();
        assert_eq!(load_pixels(&bytes).unwrap(), pixels);
    }

    #[test]
    fn test_jpeg_output_decodes() {
        let pixels = load_pixels(&png_bytes(32, 32)).unwrap();
        let bytes = encode_pixels(pixels, OutputFormat::Jpeg, 90).unwrap();
        assert_eq!(image::guess_format(&bytes).unwrap(), ImageFormat::Jpeg);
        assert_eq!(load_pixels(&bytes).unwrap().dimensions(), (32, 32));
    }

    #[test]
    fn test_rejects_non_images() {
        assert!(matches!(
            load_pixels(b"PK\x03\x04 not an image"),
            Err(StegoError::UnsupportedInputFormat(_))
        ));
    }

    #[test]
    fn test_path_extensions() {
        assert!(image_format_from_path(Path::new("cover.PNG")).is_ok());
        assert!(image_format_from_path(Path::new("cover.jpg")).is_ok());
        assert!(image_format_from_path(Path::new("cover.jpeg")).is_ok());
        assert!(image_format_from_path(Path::new("cover.gif")).is_err());
        assert!(image_format_from_path(Path::new("cover")).is_err());
    }

    #[test]
    fn test_output_format_parse() {
        assert_eq!("PNG".parse::<OutputFormat>().unwrap(), OutputFormat::Png);
        assert_eq!("jpg".parse::<OutputFormat>().unwrap(), OutputFormat::Jpeg);
        assert!("webp".parse::<OutputFormat>().is_err());
    }
}
