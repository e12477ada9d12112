//! Command module - Strategy pattern for CLI commands.
//!
//! Each command is a separate module implementing the `CommandExecutor` trait.

mod capacity;
mod decode;
mod encode;
mod hex;
mod progress;

pub use capacity::CapacityCommand;
pub use decode::DecodeCommand;
pub use encode::EncodeCommand;
pub use hex::HexCommand;

use anyhow::Result;
use rayzip::Config;

/// Trait for command execution - Strategy pattern.
///
/// Each command struct holds its parsed arguments and implements
/// this trait to define its execution logic. The loaded configuration is
/// passed in; command-line flags override its values.
pub trait CommandExecutor {
    /// Executes the command with its parsed arguments.
    fn execute(&self, config: Config) -> Result<()>;
}
