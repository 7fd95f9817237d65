//! Authentication commands.

use std::path::{Path, PathBuf};

use tracing::info;

use dayprint_providers::CalendarProvider;
use dayprint_providers::google::{AuthFlow, GoogleConfig, GoogleProvider, OAuthCredentials};

use crate::config::{ClientConfig, GoogleSettings};
use crate::error::{ClientError, ClientResult};

/// Flags given to `dayprint auth google`.
#[derive(Debug, Default)]
pub struct GoogleAuthArgs {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub credentials_file: Option<PathBuf>,
    pub force: bool,
}

/// Runs the Google authorization flow and stores the credential.
///
/// Credentials given on the command line are written to `config_path` so
/// later `dayprint` runs find them.
pub async fn google(
    args: GoogleAuthArgs,
    flow: AuthFlow,
    config: &ClientConfig,
    config_path: &Path,
) -> ClientResult<()> {
    let resolved = resolve_google_credentials(
        args.client_id,
        args.client_secret,
        args.credentials_file,
        &config.google,
    )?;
    resolved
        .credentials
        .validate()
        .map_err(|e| ClientError::Config(format!("invalid Google credentials: {}", e)))?;

    let mut google_config = GoogleConfig::new(resolved.credentials.clone());
    if let Some(ref path) = config.google.token_path {
        google_config = google_config.with_token_path(path);
    }
    let token_path = google_config.token_path.clone();

    let provider = GoogleProvider::new(google_config, flow)?;

    if provider.is_authenticated() && !args.force {
        if resolved.source == CredentialSource::Cli {
            save_credentials_to_config(config_path, &resolved.credentials)?;
        }
        println!("Already authorized with Google Calendar.");
        println!("Use --force to authorize again.");
        return Ok(());
    }

    println!("Starting Google Calendar authorization...");
    if matches!(flow, AuthFlow::Interactive { open_browser: true }) {
        println!("A browser window will open for you to grant read access.");
    }
    println!();

    provider.authenticate().await?;

    if resolved.source == CredentialSource::Cli {
        save_credentials_to_config(config_path, &resolved.credentials)?;
        println!("Credentials saved to {}", config_path.display());
    }

    info!("Google authorization successful");
    println!("Authorization successful. Token stored at {}", token_path.display());
    Ok(())
}

/// Where the credentials were resolved from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CredentialSource {
    /// `--client-id`/`--client-secret` or `--credentials-file`.
    Cli,
    /// Already in config.toml.
    Config,
}

#[derive(Debug)]
struct ResolvedCredentials {
    credentials: OAuthCredentials,
    source: CredentialSource,
}

/// Resolves Google credentials.
///
/// Priority (highest to lowest):
/// 1. `--client-id` + `--client-secret`
/// 2. `--credentials-file`
/// 3. `[google]` in config.toml (inline values or `credentials_file`)
fn resolve_google_credentials(
    cli_client_id: Option<String>,
    cli_client_secret: Option<String>,
    cli_credentials_file: Option<PathBuf>,
    settings: &GoogleSettings,
) -> ClientResult<ResolvedCredentials> {
    match (cli_client_id, cli_client_secret) {
        (Some(id), Some(secret)) => {
            return Ok(ResolvedCredentials {
                credentials: OAuthCredentials::new(id, secret),
                source: CredentialSource::Cli,
            });
        }
        (Some(_), None) | (None, Some(_)) => {
            return Err(ClientError::Config(
                "both --client-id and --client-secret are required when providing credentials directly"
                    .to_string(),
            ));
        }
        (None, None) => {}
    }

    if let Some(path) = cli_credentials_file {
        let credentials = OAuthCredentials::from_file(&path).map_err(|e| {
            ClientError::Config(format!(
                "failed to load credentials from {}: {}",
                path.display(),
                e
            ))
        })?;
        return Ok(ResolvedCredentials {
            credentials,
            source: CredentialSource::Cli,
        });
    }

    Ok(ResolvedCredentials {
        credentials: settings.resolve_credentials()?,
        source: CredentialSource::Config,
    })
}

/// Writes `client_id`/`client_secret` under `[google]`, keeping everything
/// else in the file (comments included). Adds a `primary` calendar entry
/// when none is configured.
fn save_credentials_to_config(path: &Path, credentials: &OAuthCredentials) -> ClientResult<()> {
    let content = if path.exists() {
        std::fs::read_to_string(path)?
    } else {
        String::new()
    };

    let mut doc = content.parse::<toml_edit::DocumentMut>().map_err(|e| {
        ClientError::Config(format!("could not parse {} for writing: {}", path.display(), e))
    })?;

    if !doc.contains_key("google") {
        doc["google"] = toml_edit::Item::Table(toml_edit::Table::new());
    }
    let google = doc["google"].as_table_mut().ok_or_else(|| {
        ClientError::Config(format!("`google` in {} is not a table", path.display()))
    })?;
    google.set_implicit(false);

    google["client_id"] = toml_edit::value(credentials.client_id.as_str());
    google["client_secret"] = toml_edit::value(credentials.client_secret.as_str());

    if !google.contains_key("calendars") {
        let mut primary = toml_edit::Table::new();
        primary["id"] = toml_edit::value("primary");
        let mut calendars = toml_edit::ArrayOfTables::new();
        calendars.push(primary);
        google["calendars"] = toml_edit::Item::ArrayOfTables(calendars);
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, doc.to_string())?;
    info!("credentials saved to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CalendarEntry;
    use tempfile::TempDir;

    fn credentials() -> OAuthCredentials {
        OAuthCredentials::new("test.apps.googleusercontent.com", "test-secret")
    }

    #[test]
    fn resolve_credentials_from_cli() {
        let resolved = resolve_google_credentials(
            Some("cli-id.apps.googleusercontent.com".to_string()),
            Some("cli-secret".to_string()),
            None,
            &GoogleSettings::default(),
        )
        .unwrap();
        assert_eq!(
            resolved.credentials.client_id,
            "cli-id.apps.googleusercontent.com"
        );
        assert_eq!(resolved.credentials.client_secret, "cli-secret");
        assert_eq!(resolved.source, CredentialSource::Cli);
    }

    #[test]
    fn resolve_credentials_cli_overrides_config() {
        let settings = GoogleSettings {
            client_id: Some("config-id.apps.googleusercontent.com".to_string()),
            client_secret: Some("config-secret".to_string()),
            ..Default::default()
        };
        let resolved = resolve_google_credentials(
            Some("cli-id.apps.googleusercontent.com".to_string()),
            Some("cli-secret".to_string()),
            None,
            &settings,
        )
        .unwrap();
        assert_eq!(resolved.credentials.client_secret, "cli-secret");
        assert_eq!(resolved.source, CredentialSource::Cli);
    }

    #[test]
    fn resolve_credentials_from_config() {
        let settings = GoogleSettings {
            client_id: Some("config-id.apps.googleusercontent.com".to_string()),
            client_secret: Some("config-secret".to_string()),
            ..Default::default()
        };
        let resolved = resolve_google_credentials(None, None, None, &settings).unwrap();
        assert_eq!(resolved.credentials.client_secret, "config-secret");
        assert_eq!(resolved.source, CredentialSource::Config);
    }

    #[test]
    fn resolve_credentials_partial_cli_fails() {
        let settings = GoogleSettings::default();
        assert!(
            resolve_google_credentials(
                Some("id.apps.googleusercontent.com".to_string()),
                None,
                None,
                &settings,
            )
            .is_err()
        );
        assert!(
            resolve_google_credentials(None, Some("secret".to_string()), None, &settings).is_err()
        );
    }

    #[test]
    fn resolve_credentials_none_fails() {
        let err =
            resolve_google_credentials(None, None, None, &GoogleSettings::default()).unwrap_err();
        assert!(matches!(err, ClientError::Config(_)));
    }

    #[test]
    fn resolve_credentials_from_cli_credentials_file() {
        let tmp = TempDir::new().unwrap();
        let creds_path = tmp.path().join("creds.json");
        std::fs::write(
            &creds_path,
            r#"{
                "installed": {
                    "client_id": "file-id.apps.googleusercontent.com",
                    "client_secret": "file-secret"
                }
            }"#,
        )
        .unwrap();

        let resolved =
            resolve_google_credentials(None, None, Some(creds_path), &GoogleSettings::default())
                .unwrap();
        assert_eq!(
            resolved.credentials.client_id,
            "file-id.apps.googleusercontent.com"
        );
        assert_eq!(resolved.source, CredentialSource::Cli);
    }

    #[test]
    fn save_credentials_creates_config() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("dayprint").join("config.toml");

        save_credentials_to_config(&path, &credentials()).unwrap();

        let config = ClientConfig::load_from(&path).unwrap();
        assert_eq!(
            config.google.client_id.as_deref(),
            Some("test.apps.googleusercontent.com")
        );
        assert_eq!(config.google.calendars, vec![CalendarEntry::new("primary")]);
    }

    #[test]
    fn save_credentials_preserves_existing_config() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        std::fs::write(
            &path,
            "# receipt settings\n\
             [display]\n\
             no_events_text = \"Free\"\n\n\
             [[google.calendars]]\n\
             id = \"school@example.edu\"\n",
        )
        .unwrap();

        save_credentials_to_config(&path, &credentials()).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.starts_with("# receipt settings\n"));

        let config = ClientConfig::load_from(&path).unwrap();
        assert_eq!(config.display.no_events_text, "Free");
        assert_eq!(config.google.client_secret.as_deref(), Some("test-secret"));
        assert_eq!(
            config.google.calendar_ids(),
            vec!["school@example.edu".to_string()]
        );
    }

    #[test]
    fn save_credentials_rejects_unparseable_config() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        std::fs::write(&path, "[google\n").unwrap();
        let err = save_credentials_to_config(&path, &credentials()).unwrap_err();
        assert!(matches!(err, ClientError::Config(_)));
    }

    #[tokio::test]
    async fn disabled_flow_refuses_to_authorize() {
        let tmp = TempDir::new().unwrap();
        let config = ClientConfig {
            google: GoogleSettings {
                token_path: Some(tmp.path().join("token.json")),
                ..Default::default()
            },
            ..Default::default()
        };
        let args = GoogleAuthArgs {
            client_id: Some("id.apps.googleusercontent.com".to_string()),
            client_secret: Some("secret".to_string()),
            ..Default::default()
        };
        let config_path = tmp.path().join("config.toml");

        let err = google(args, AuthFlow::Disabled, &config, &config_path)
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Auth(_)));
        assert!(!config_path.exists());
    }
}
