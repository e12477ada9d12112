//! Decode command - extract a hidden ZIP archive from an image.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use rayzip::{format_file_size, Config, Engine};

use super::progress::ConsoleProgress;
use super::CommandExecutor;

/// Extract the ZIP archive hidden in an encoded image.
///
/// The image must be exactly the file produced by `encode`; any
/// recompression destroys the hidden data.
#[derive(Args, Debug)]
pub struct DecodeCommand {
    /// Encoded image (.png, .jpg, .jpeg)
    #[arg(short, long)]
    pub image: PathBuf,

    /// Output path for the extracted archive (default: extracted_file.zip)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Fail instead of repairing a payload with a missing ZIP signature
    #[arg(long)]
    pub no_auto_correct: bool,

    /// Pixels processed per slice
    #[arg(long)]
    pub slice: Option<usize>,
}

impl CommandExecutor for DecodeCommand {
    fn execute(&self, mut config: Config) -> Result<()> {
        if self.no_auto_correct {
            config.auto_correct = false;
        }
        if let Some(slice) = self.slice {
            config.slice_pixels = slice;
        }

        let engine = Engine::new(config);
        let mut progress = ConsoleProgress::new();
        let (output, decoded) = engine
            .decode_file(&self.image, self.output.as_deref(), &mut progress)
            .with_context(|| format!("Decoding failed for {}", self.image.display()))?;

        if let Some(correction) = decoded.correction {
            eprintln!("Note: payload was auto-corrected ({:?})", correction);
        }
        println!(
            "Extracted {} ({}) to {}",
            format_file_size(decoded.data.len() as u64),
            decoded.kind.name(),
            output.display()
        );
        Ok(())
    }
}
