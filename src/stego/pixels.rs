//! RGBA pixel buffer owned by a single job.

use image::RgbaImage;

/// Bytes per pixel (R, G, B, A).
pub const BYTES_PER_PIXEL: usize = 4;

/// Row-major RGBA8 pixels with fixed dimensions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl PixelBuffer {
    /// Wraps raw RGBA bytes. Returns `None` if the length does not match
    /// `width * height * 4`.
    pub fn from_raw(width: u32, height: u32, data: Vec<u8>) -> Option<Self> {
        let expected = (width as usize)
            .checked_mul(height as usize)?
            .checked_mul(BYTES_PER_PIXEL)?;
        if data.len() != expected {
            return None;
        }
        Some(Self {
            width,
            height,
            data,
        })
    }

    /// Takes ownership of a decoded RGBA image.
    pub fn from_rgba(image: RgbaImage) -> Self {
        let (width, height) = image.dimensions();
        Self {
            width,
            height,
            data: image.into_raw(),
        }
    }

    /// Converts back into an `RgbaImage` for re-encoding.
    pub fn into_rgba(self) -> RgbaImage {
        // Length is validated on construction.
        RgbaImage::from_raw(self.width, self.height, self.data).unwrap_or_else(|| RgbaImage::new(0, 0))
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Number of pixels.
    pub fn len(&self) -> usize {
        self.data.len() / BYTES_PER_PIXEL
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Channel value at `pixel`, `channel` (0 = R .. 3 = A).
    pub fn channel(&self, pixel: usize, channel: usize) -> u8 {
        self.data[pixel * BYTES_PER_PIXEL + channel]
    }

    pub(crate) fn channel_mut(&mut self, pixel: usize, channel: usize) -> &mut u8 {
        &mut self.data[pixel * BYTES_PER_PIXEL + channel]
    }

    /// Raw RGBA bytes.
    pub fn as_raw(&self) -> &[u8] {
        &self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn test_from_raw_checks_length() {
        assert!(PixelBuffer::from_raw(2, 2, vec![0; 16]).is_some());
        assert!(PixelBuffer::from_raw(2, 2, vec![0; 15]).is_none());
    }

    #[test]
    fn test_rgba_conversion_keeps_pixels() {
        let image = RgbaImage::from_fn(3, 2, |x, y| Rgba([x as u8, y as u8, 7, 200]));
        let buffer = PixelBuffer::from_rgba(image.clone());
        assert_eq!(buffer.dimensions(), (3, 2));
        assert_eq!(buffer.len(), 6);
        // pixel (1, 1) is index 4
        assert_eq!(buffer.channel(4, 0), 1);
        assert_eq!(buffer.channel(4, 1), 1);
        assert_eq!(buffer.channel(4, 3), 200);
        assert_eq!(buffer.into_rgba(), image);
    }
}
