//! Hex command - dump the leading bytes of any file.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use rayzip::{format_hex_dump, Config};

use super::CommandExecutor;

/// Print a hex dump of a file's raw bytes.
#[derive(Args, Debug)]
pub struct HexCommand {
    /// File to dump
    #[arg(short, long)]
    pub input: PathBuf,

    /// Maximum number of bytes to show
    #[arg(short, long)]
    pub limit: Option<usize>,
}

impl CommandExecutor for HexCommand {
    fn execute(&self, config: Config) -> Result<()> {
        let data = std::fs::read(&self.input)
            .with_context(|| format!("Failed to read {}", self.input.display()))?;
        let limit = self.limit.unwrap_or(config.hex_limit);
        println!("{}", format_hex_dump(&data, limit));
        Ok(())
    }
}
