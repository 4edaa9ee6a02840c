use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::paste::PasteOptions;

/// Paste service configuration
#[derive(Deserialize, Clone)]
pub struct PasteServiceConfig {
    /// Display name of the service, used in diagnostics
    #[serde(default = "default_name")]
    pub name: String,
    /// Endpoint URL pastes are POSTed to
    pub host: String,
    /// HTTP Basic auth user
    #[serde(default)]
    pub username: String,
    /// HTTP Basic auth password
    #[serde(default)]
    pub password: String,
    #[serde(default = "default_expire")]
    pub expire: String,
    #[serde(default)]
    pub open_discussion: bool,
    #[serde(default = "default_burn_after_reading")]
    pub burn_after_reading: bool,
    #[serde(default = "default_formatter")]
    pub formatter: String,
    /// Per-request HTTP timeout
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_name() -> String {
    "default".to_string()
}

fn default_expire() -> String {
    "5min".to_string()
}

fn default_burn_after_reading() -> bool {
    true
}

fn default_formatter() -> String {
    "plaintext".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for PasteServiceConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            host: String::new(),
            username: String::new(),
            password: String::new(),
            expire: default_expire(),
            open_discussion: false,
            burn_after_reading: default_burn_after_reading(),
            formatter: default_formatter(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl PasteServiceConfig {
    /// Paste options derived from the configured defaults
    pub fn options(&self) -> PasteOptions {
        PasteOptions {
            expire: self.expire.clone(),
            formatter: self.formatter.clone(),
            open_discussion: self.open_discussion,
            burn_after_reading: self.burn_after_reading,
        }
    }
}

impl std::fmt::Debug for PasteServiceConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PasteServiceConfig")
            .field("name", &self.name)
            .field("host", &self.host)
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("expire", &self.expire)
            .field("open_discussion", &self.open_discussion)
            .field("burn_after_reading", &self.burn_after_reading)
            .field("formatter", &self.formatter)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

/// Where provisioning secrets are read from
#[derive(Debug, Deserialize, Clone)]
pub struct SecretsConfig {
    /// Directory holding `<namespace>/<secret>/<key>` files
    #[serde(default = "default_secrets_root")]
    pub root: PathBuf,
    #[serde(default = "default_namespace")]
    pub namespace: String,
}

fn default_secrets_root() -> PathBuf {
    PathBuf::from("/var/run/secrets/pastecrypt")
}

fn default_namespace() -> String {
    "hive".to_string()
}

impl Default for SecretsConfig {
    fn default() -> Self {
        Self {
            root: default_secrets_root(),
            namespace: default_namespace(),
        }
    }
}

/// Root application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub paste: PasteServiceConfig,
    #[serde(default)]
    pub secrets: SecretsConfig,
}

impl AppConfig {
    /// Load configuration from files and environment variables.
    ///
    /// `path` is an extra, required file layered above the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder()
            // Start with default config file
            .add_source(File::with_name("config/default").required(false))
            // Override with local config if present
            .add_source(File::with_name("config/local").required(false));

        if let Some(path) = path {
            builder = builder.add_source(File::from(path));
        }

        builder
            // Override with environment variables
            // e.g., PASTECRYPT__PASTE__HOST, PASTECRYPT__PASTE__PASSWORD
            .add_source(
                Environment::with_prefix("PASTECRYPT")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::FileFormat;

    fn parse(toml: &str) -> Result<AppConfig, ConfigError> {
        Config::builder()
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()?
            .try_deserialize()
    }

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config = parse(
            r#"
            [paste]
            host = "https://bin.example.com"
            "#,
        )
        .unwrap();

        assert_eq!(config.paste.name, "default");
        assert_eq!(config.paste.expire, "5min");
        assert_eq!(config.paste.formatter, "plaintext");
        assert!(!config.paste.open_discussion);
        assert!(config.paste.burn_after_reading);
        assert_eq!(config.paste.timeout_secs, 30);
        assert_eq!(config.secrets.namespace, "hive");
        assert_eq!(config.secrets.root, PathBuf::from("/var/run/secrets/pastecrypt"));
    }

    #[test]
    fn test_full_config() {
        let config = parse(
            r#"
            [paste]
            name = "lab-bin"
            host = "https://bin.example.com"
            username = "dev"
            password = "dev-password"
            expire = "1day"
            open_discussion = true
            burn_after_reading = false
            formatter = "markdown"
            timeout_secs = 5

            [secrets]
            root = "/tmp/secrets"
            namespace = "labs"
            "#,
        )
        .unwrap();

        let options = config.paste.options();
        assert_eq!(options.expire, "1day");
        assert_eq!(options.formatter, "markdown");
        assert!(options.open_discussion);
        assert!(!options.burn_after_reading);
        assert_eq!(config.paste.username, "dev");
        assert_eq!(config.secrets.namespace, "labs");
    }

    #[test]
    fn test_missing_host_is_an_error() {
        assert!(parse("[paste]\nname = \"x\"\n").is_err());
    }

    #[test]
    fn test_debug_redacts_password() {
        let config = PasteServiceConfig {
            host: "https://bin.example.com".to_string(),
            password: "hunter2".to_string(),
            ..PasteServiceConfig::default()
        };
        let debug = format!("{:?}", config);
        assert!(debug.contains("bin.example.com"));
        assert!(!debug.contains("hunter2"));
    }
}
