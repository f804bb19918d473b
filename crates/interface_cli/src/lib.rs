//! Command line surface for the NHIS claims core
//!
//! Configuration, logging setup and the `nhis-export` commands.

pub mod config;
pub mod telemetry;
pub mod commands;
pub mod error;
pub mod cli;

pub use config::{AppConfig, LogFormat};
pub use telemetry::init_tracing;
pub use commands::{export_snapshot, read_snapshot, verify_file};
pub use error::CliError;
pub use cli::{Cli, Command};
