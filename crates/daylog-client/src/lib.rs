//! CLI, configuration and commands
//!
//! This crate provides the `daylog` command-line interface.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod secret;

pub use cli::Cli;
pub use commands::Context;
pub use error::{ClientError, ClientResult};
