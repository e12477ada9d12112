//! Capacity command - how much an image can hold.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use rayzip::stego::codec::load_pixels;
use rayzip::{capacity, format_file_size, Config};

use super::CommandExecutor;

/// Show how many payload bytes fit in an image.
#[derive(Args, Debug)]
pub struct CapacityCommand {
    /// Image to inspect
    #[arg(short, long, conflicts_with_all = ["width", "height"])]
    pub image: Option<PathBuf>,

    /// Image width in pixels (with --height)
    #[arg(long, requires = "height")]
    pub width: Option<u32>,

    /// Image height in pixels (with --width)
    #[arg(long, requires = "width")]
    pub height: Option<u32>,
}

impl CommandExecutor for CapacityCommand {
    fn execute(&self, config: Config) -> Result<()> {
        let (width, height) = match (&self.image, self.width, self.height) {
            (Some(path), _, _) => {
                let bytes = std::fs::read(path)
                    .with_context(|| format!("Failed to read image from {}", path.display()))?;
                load_pixels(&bytes)
                    .with_context(|| format!("Failed to decode {}", path.display()))?
                    .dimensions()
            }
            (None, Some(w), Some(h)) => (w, h),
            _ => anyhow::bail!("Provide either --image or --width and --height"),
        };

        let bytes = capacity(width, height).min(config.max_payload_size as usize);

        println!("Image Capacity");
        println!("==============");
        println!("  Dimensions: {}x{}", width, height);
        println!("  Capacity: {} bytes ({})", bytes, format_file_size(bytes as u64));
        if width < config.min_image_dimension || height < config.min_image_dimension {
            println!(
                "  Note: below the minimum cover size of {}x{}px",
                config.min_image_dimension, config.min_image_dimension
            );
        }
        Ok(())
    }
}
