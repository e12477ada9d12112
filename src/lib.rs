//! # Rayzip - Hide ZIP archives in images
//!
//! Rayzip embeds an archive in the pixel data of a carrier image using
//! least-significant-bit steganography, and recovers it from the modified
//! image later.
//!
//! ## Overview
//!
//! - A 32-byte header (`RAYZIP` signature + payload length) is written first,
//!   followed directly by the payload bytes
//! - One bit per R, G and B channel; alpha is never touched
//! - Capacity: `floor(width * height * 3 / 8) - 32` bytes
//! - Work runs in bounded slices with progress reports and cancellation
//! - Extracted payloads are checked for a ZIP signature, with small bounded
//!   repairs when it is missing
//!
//! The carrier must reach the decoder byte for byte: save as PNG. JPEG
//! output is supported but destroys the hidden data.
//!
//! ## Example Usage
//!
//! ```rust
//! use rayzip::stego::{embed, extract, AcceptAll, NoProgress, PixelBuffer, Scheduler};
//!
//! let pixels = PixelBuffer::from_raw(64, 64, vec![128; 64 * 64 * 4]).unwrap();
//! let scheduler = Scheduler::default();
//!
//! let stego = embed(pixels, b"hello", &scheduler, &mut NoProgress).unwrap();
//! let payload = extract(stego, AcceptAll, &scheduler, &mut NoProgress).unwrap();
//! assert_eq!(payload.data, b"hello");
//! ```
//!
//! ## Modules
//!
//! - [`stego`]: header, capacity, bit stream, jobs, scheduler, validator
//! - [`engine`]: file-level encode/decode with input validation
//! - [`config`]: TOML configuration
//! - [`hexview`]: hex dump of raw file bytes

pub mod config;
pub mod engine;
pub mod format;
pub mod hexview;
pub mod stego;

// Re-export commonly used types at the crate root
pub use config::{Config, ConfigError};
pub use engine::{DecodedPayload, Engine};
pub use format::format_file_size;
pub use hexview::format_hex_dump;
pub use stego::{
    capacity, ArchiveKind, CancelToken, ErrorKind, OutputFormat, PixelBuffer, ProgressSink,
    StegoError,
};
