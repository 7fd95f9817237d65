//! dayprint CLI entry point.

use std::process::ExitCode;

use clap::Parser;

use dayprint_client::cli::{AuthProvider, Cli, Command, ConfigAction};
use dayprint_client::commands::{self, auth::GoogleAuthArgs};
use dayprint_client::config::ClientConfig;
use dayprint_client::error::ClientResult;
use dayprint_core::{TracingConfig, init_tracing};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let tracing_config = if cli.debug {
        TracingConfig::cli_debug()
    } else {
        TracingConfig::default()
    };
    if let Err(e) = init_tracing(tracing_config) {
        eprintln!("warning: {}", e);
    }

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> ClientResult<()> {
    let config_path = cli.config.clone().unwrap_or_else(ClientConfig::default_path);
    let config = if cli.config.is_some() {
        ClientConfig::load_from(&config_path)?
    } else {
        ClientConfig::load()?
    };

    match cli.command {
        None | Some(Command::Print) => commands::print::run(&cli, &config).await,
        Some(Command::Auth {
            provider:
                AuthProvider::Google {
                    ref client_id,
                    ref client_secret,
                    ref credentials_file,
                    force,
                },
        }) => {
            let args = GoogleAuthArgs {
                client_id: client_id.clone(),
                client_secret: client_secret.clone(),
                credentials_file: credentials_file.clone(),
                force,
            };
            commands::auth::google(args, cli.auth_flow(), &config, &config_path).await
        }
        Some(Command::Config { ref action }) => match action {
            ConfigAction::Dump => commands::config::dump(&config, &config_path),
            ConfigAction::Validate => commands::config::validate(&config),
            ConfigAction::Path => commands::config::path(&config_path),
        },
    }
}
