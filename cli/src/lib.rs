//! Library side of the `holocron` binary: configuration, display formatting
//! and the subcommands themselves.

pub mod commands;
pub mod config;
pub mod format;

pub use commands::{Cli, Command, run};
pub use config::{ConfigError, HolocronConfig};
