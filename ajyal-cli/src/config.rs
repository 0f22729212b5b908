use config::{Config, ConfigError, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CliConfig {
    pub gmail: GmailConfig,
    pub fetch: FetchConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct GmailConfig {
    pub client_id: String,
    pub client_secret: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct FetchConfig {
    /// Gmail search query selecting candidate messages, passed verbatim as
    /// the `q` parameter, e.g. `(FROM "donations@example.org")`.
    pub query: String,
    #[serde(default = "default_max_messages")]
    pub max_messages: usize,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct OutputConfig {
    #[serde(default = "default_archive_dir")]
    pub archive_dir: PathBuf,
    #[serde(default = "default_export_path")]
    pub export_path: PathBuf,
    #[serde(default = "default_token_path")]
    pub token_path: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            archive_dir: default_archive_dir(),
            export_path: default_export_path(),
            token_path: default_token_path(),
        }
    }
}

fn default_max_messages() -> usize {
    500
}

fn default_archive_dir() -> PathBuf {
    PathBuf::from("emails")
}

fn default_export_path() -> PathBuf {
    PathBuf::from("email_data.csv")
}

fn default_token_path() -> PathBuf {
    if let Some(config_dir) = dirs::config_dir() {
        config_dir.join("ajyal").join("token.json")
    } else {
        PathBuf::from("token.json")
    }
}

impl CliConfig {
    pub fn load_from(config_path: PathBuf) -> Result<(Self, PathBuf), ConfigError> {
        // Create config directory if it doesn't exist
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                ConfigError::Message(format!("Failed to create config directory: {e}"))
            })?;
        }

        // Create default config file if it doesn't exist
        if !config_path.exists() {
            let default_config = r#"
[gmail]
# Google Cloud Console OAuth2 client ID with the gmail.readonly scope
# client_id = "YOUR_CLIENT_ID.apps.googleusercontent.com"
# client_secret = "YOUR_CLIENT_SECRET"

[fetch]
# Search query selecting the donation confirmation sender
query = '(FROM "donations@example.org")'
max_messages = 500

[output]
archive_dir = "emails"
export_path = "email_data.csv"
"#;
            std::fs::write(&config_path, default_config).map_err(|e| {
                ConfigError::Message(format!("Failed to write default config: {e}"))
            })?;
        }

        let builder = Config::builder()
            .add_source(File::from(config_path.clone()))
            .build()?;

        let config: CliConfig = builder.try_deserialize()?;

        Ok((config, config_path))
    }

    pub fn load() -> Result<(Self, PathBuf), ConfigError> {
        Self::load_from(get_config_path())
    }
}

pub fn get_config_path() -> PathBuf {
    if let Some(config_dir) = dirs::config_dir() {
        config_dir.join("ajyal").join("cli.toml")
    } else {
        PathBuf::from("cli.toml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_writes_default_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cli.toml");

        // First load writes the commented default file; the defaults have no
        // client_id or query uncommented, so a second write fills them in.
        let result = CliConfig::load_from(path.clone());
        assert!(path.exists());
        // The default file has query set but client_id commented out, so
        // deserialization fails until the operator fills it in.
        assert!(result.is_err());

        std::fs::write(
            &path,
            r#"
[gmail]
client_id = "abc.apps.googleusercontent.com"

[fetch]
query = '(FROM "someone@example.com")'
"#,
        )
        .unwrap();

        let (config, _) = CliConfig::load_from(path).unwrap();
        assert_eq!(config.gmail.client_id, "abc.apps.googleusercontent.com");
        assert_eq!(config.fetch.max_messages, 500);
        assert_eq!(config.output.archive_dir, PathBuf::from("emails"));
        assert_eq!(config.output.export_path, PathBuf::from("email_data.csv"));
    }
}
