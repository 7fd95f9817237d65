//! CLI, configuration, and the print/auth/config commands
//!
//! This crate provides the `dayprint` command-line interface.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod secret;

pub use cli::Cli;
pub use error::{ClientError, ClientResult};
