//! Rayzip - Hide ZIP archives in images
//!
//! A CLI tool for LSB steganography: embed an archive in a PNG, get it back
//! out later.

mod commands;

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use env_logger::Builder;
use log::LevelFilter;

use commands::{CapacityCommand, CommandExecutor, DecodeCommand, EncodeCommand, HexCommand};
use rayzip::Config;

/// Rayzip - Hide ZIP archives in images
///
/// Embeds an archive in the least significant bits of an image's pixels.
/// Always keep the encoded image as PNG: any recompression destroys the data.
#[derive(Parser)]
#[command(name = "rayzip")]
#[command(version)]
#[command(about = "Hide ZIP archives inside PNG images with LSB steganography")]
#[command(long_about = None)]
struct Cli {
    /// Show informational log output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file (default: ~/.rayzip/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Hide a ZIP archive inside a cover image
    Encode(EncodeCommand),

    /// Extract a hidden ZIP archive from an encoded image
    Decode(DecodeCommand),

    /// Show how many bytes an image can hold
    Capacity(CapacityCommand),

    /// Print a hex dump of a file
    Hex(HexCommand),
}

fn init_logger(verbose: bool) {
    let level = if verbose {
        LevelFilter::Info
    } else {
        LevelFilter::Warn
    };
    Builder::new()
        .format(|buf, record| {
            writeln!(
                buf,
                "[{}] [{}] {}",
                chrono::Local::now().format("%H:%M:%S"),
                record.level(),
                record.args()
            )
        })
        .filter_level(level)
        .parse_default_env()
        .init();
}

fn load_config(path: Option<&PathBuf>) -> Result<Config> {
    match path {
        Some(path) => Config::load_from(path)
            .with_context(|| format!("Failed to load config from {}", path.display())),
        None => Config::load().context("Failed to load config"),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logger(cli.verbose);

    let config = load_config(cli.config.as_ref())?;

    match cli.command {
        Commands::Encode(cmd) => cmd.execute(config),
        Commands::Decode(cmd) => cmd.execute(config),
        Commands::Capacity(cmd) => cmd.execute(config),
        Commands::Hex(cmd) => cmd.execute(config),
    }
}
