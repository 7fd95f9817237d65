//! Command-line interface definition.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use dayprint_providers::google::AuthFlow;

/// dayprint - today's calendar and weather on a receipt printer
#[derive(Debug, Parser)]
#[command(name = "dayprint")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(long, short, env = "DAYPRINT_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug output
    #[arg(long, short = 'v', global = true)]
    pub debug: bool,

    /// Write a plain-text preview to stdout instead of the printer
    #[arg(long)]
    pub dry_run: bool,

    /// Fetch calendar and weather before printing anything
    #[arg(long)]
    pub all_or_nothing: bool,

    /// Print the authorization URL instead of opening a browser
    #[arg(long, global = true)]
    pub no_browser: bool,

    /// Fail instead of starting the authorization flow when no valid
    /// credential is stored
    #[arg(long)]
    pub non_interactive: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

impl Cli {
    /// How the Google provider may obtain a credential during this run.
    pub fn auth_flow(&self) -> AuthFlow {
        if self.non_interactive {
            AuthFlow::Disabled
        } else {
            AuthFlow::Interactive {
                open_browser: !self.no_browser,
            }
        }
    }
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print today's schedule and weather (the default)
    Print,

    /// Authentication commands
    Auth {
        #[command(subcommand)]
        provider: AuthProvider,
    },

    /// Configuration commands
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Authentication providers.
#[derive(Debug, Subcommand)]
pub enum AuthProvider {
    /// Authorize read access to Google Calendar
    Google {
        /// OAuth client ID (from Google Cloud Console)
        #[arg(long, env = "GOOGLE_CLIENT_ID")]
        client_id: Option<String>,

        /// OAuth client secret (from Google Cloud Console)
        #[arg(long, env = "GOOGLE_CLIENT_SECRET")]
        client_secret: Option<String>,

        /// Path to Google Cloud Console credentials JSON file
        ///
        /// This is the JSON file downloaded from the Google Cloud Console
        /// OAuth 2.0 credentials page. Alternative to providing client_id
        /// and client_secret separately.
        #[arg(long, env = "GOOGLE_CREDENTIALS_FILE")]
        credentials_file: Option<PathBuf>,

        /// Re-authorize even if a valid credential is stored
        #[arg(long, short)]
        force: bool,
    },
}

/// Configuration actions.
#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Dump current configuration
    Dump,

    /// Validate configuration
    Validate,

    /// Show configuration file path
    Path,
}
