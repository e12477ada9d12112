//! Encode command - hide a ZIP archive in a cover image.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use rayzip::stego::OutputFormat;
use rayzip::{format_file_size, Config, Engine};

use super::progress::ConsoleProgress;
use super::CommandExecutor;

/// Hide a ZIP archive inside a PNG or JPEG cover image.
///
/// The output is written as PNG by default. JPEG output is lossy and the
/// hidden archive will NOT survive it.
#[derive(Args, Debug)]
pub struct EncodeCommand {
    /// Cover image (.png, .jpg, .jpeg)
    #[arg(short, long)]
    pub image: PathBuf,

    /// ZIP archive to hide
    #[arg(short, long)]
    pub file: PathBuf,

    /// Output image path (default: hidden_<cover name>.<format> next to the cover)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Output format: png (default) or jpeg
    #[arg(long)]
    pub format: Option<OutputFormat>,

    /// JPEG quality (1-100)
    #[arg(short, long, value_parser = clap::value_parser!(u8).range(1..=100))]
    pub quality: Option<u8>,

    /// Pixels processed per slice
    #[arg(long)]
    pub slice: Option<usize>,
}

impl CommandExecutor for EncodeCommand {
    fn execute(&self, mut config: Config) -> Result<()> {
        if let Some(format) = self.format {
            config.output_format = format;
        }
        if let Some(quality) = self.quality {
            config.jpeg_quality = quality;
        }
        if let Some(slice) = self.slice {
            config.slice_pixels = slice;
        }

        let engine = Engine::new(config);
        let mut progress = ConsoleProgress::new();
        let output = engine
            .encode_file(&self.image, &self.file, self.output.as_deref(), &mut progress)
            .with_context(|| format!("Encoding failed for {}", self.image.display()))?;

        let size = std::fs::metadata(&self.file)
            .map(|m| format_file_size(m.len()))
            .unwrap_or_else(|_| "?".to_string());
        println!("Hidden {} in {}", size, output.display());
        Ok(())
    }
}
