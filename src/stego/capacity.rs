//! Embedding capacity of a carrier image.
//!
//! Each pixel contributes one bit per R, G and B channel; alpha is never
//! used. The header is reserved out of the total.

use super::error::StegoError;
use super::header::HEADER_SIZE;

/// Usable channels per pixel (R, G, B).
pub const CHANNELS_PER_PIXEL: usize = 3;

/// Maximum payload bytes embeddable in a `width`x`height` image.
///
/// `floor(width * height * 3 / 8) - 32`, clamped to 0 for images that
/// cannot hold the header.
pub fn capacity(width: u32, height: u32) -> usize {
    let pixels = (width as usize).saturating_mul(height as usize);
    let usable_bits = pixels.saturating_mul(CHANNELS_PER_PIXEL);
    (usable_bits / 8).saturating_sub(HEADER_SIZE)
}

/// Checks that `payload_len` bytes fit in a `width`x`height` image.
///
/// Runs to completion before any bit is written.
pub fn ensure_fits(width: u32, height: u32, payload_len: usize) -> Result<(), StegoError> {
    let available = capacity(width, height);
    if payload_len > available {
        return Err(StegoError::CapacityExceeded {
            needed: payload_len,
            capacity: available,
        });
    }
    Ok(())
}
