//! Project configuration for omnimeet.
//!
//! Loaded from `omnimeet.toml` in the project root; every field has a serde
//! default so a missing or partial file still yields a usable config.
//! Secrets (LLM API key, SMTP credentials) are read from environment
//! variables only and never stored in the file.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

pub const CONFIG_FILE_NAME: &str = "omnimeet.toml";

/// Env var holding the LLM API key.
pub const LLM_API_KEY_ENV: &str = "OMNIMEET_LLM_API_KEY";
/// Env vars holding SMTP credentials.
pub const SMTP_USER_ENV: &str = "OMNIMEET_SMTP_USER";
pub const SMTP_PASSWORD_ENV: &str = "OMNIMEET_SMTP_PASSWORD";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub smtp: SmtpConfig,
    #[serde(default)]
    pub notify: NotifyConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Rotation order: the first model is tried first, later ones are
    /// failover targets when a model hits a rate or quota limit.
    #[serde(default = "default_models")]
    pub models: Vec<String>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            models: default_models(),
        }
    }
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_models() -> Vec<String> {
    vec!["gpt-4o-mini".to_string()]
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default = "default_store_dir")]
    pub base_dir: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            base_dir: default_store_dir(),
        }
    }
}

fn default_store_dir() -> String {
    ".omnimeet/store".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmtpConfig {
    #[serde(default = "default_smtp_server")]
    pub server: String,
    #[serde(default = "default_smtp_port")]
    pub port: u16,
}

impl Default for SmtpConfig {
    fn default() -> Self {
        Self {
            server: default_smtp_server(),
            port: default_smtp_port(),
        }
    }
}

fn default_smtp_server() -> String {
    "smtp.gmail.com".to_string()
}

fn default_smtp_port() -> u16 {
    587
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotifyConfig {
    #[serde(default = "default_recipients_path")]
    pub recipients_path: String,
    /// Roles routed to the executive digest. Matched case-insensitively
    /// against the recipient directory's `role` column.
    #[serde(default = "default_executive_roles")]
    pub executive_roles: Vec<String>,
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            recipients_path: default_recipients_path(),
            executive_roles: default_executive_roles(),
        }
    }
}

fn default_recipients_path() -> String {
    "participants_data.csv".to_string()
}

fn default_executive_roles() -> Vec<String> {
    [
        "manager",
        "senior manager",
        "director",
        "vp",
        "vice president",
        "chief",
        "head",
        "lead",
    ]
    .into_iter()
    .map(str::to_string)
    .collect()
}

impl Config {
    /// Load `omnimeet.toml` from the project root, falling back to defaults
    /// when the file is absent.
    pub fn load(project_root: &Path) -> Result<Self> {
        let path = project_root.join(CONFIG_FILE_NAME);
        if !path.exists() {
            debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }

        let raw = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read config: {}", path.display()))?;
        let config: Self = toml::from_str(&raw)
            .with_context(|| format!("failed to parse config: {}", path.display()))?;
        Ok(config)
    }

    /// Write a commented default config, refusing to clobber an existing one.
    pub fn write_default(project_root: &Path) -> Result<std::path::PathBuf> {
        let path = project_root.join(CONFIG_FILE_NAME);
        if path.exists() {
            anyhow::bail!("config already exists: {}", path.display());
        }
        std::fs::write(&path, default_config_toml())
            .with_context(|| format!("failed to write config: {}", path.display()))?;
        Ok(path)
    }

    pub fn llm_api_key() -> Result<String> {
        std::env::var(LLM_API_KEY_ENV)
            .with_context(|| format!("{LLM_API_KEY_ENV} is not set"))
    }

    pub fn smtp_credentials() -> Result<(String, String)> {
        let user = std::env::var(SMTP_USER_ENV)
            .with_context(|| format!("{SMTP_USER_ENV} is not set"))?;
        let password = std::env::var(SMTP_PASSWORD_ENV)
            .with_context(|| format!("{SMTP_PASSWORD_ENV} is not set"))?;
        Ok((user, password))
    }
}

fn default_config_toml() -> String {
    r#"# omnimeet configuration
# Secrets are read from the environment, never from this file:
#   OMNIMEET_LLM_API_KEY, OMNIMEET_SMTP_USER, OMNIMEET_SMTP_PASSWORD

[llm]
base_url = "https://api.openai.com/v1"
# Rotation order; later models are failover targets on rate limits.
models = ["gpt-4o-mini"]

[store]
base_dir = ".omnimeet/store"

[smtp]
server = "smtp.gmail.com"
port = 587

[notify]
recipients_path = "participants_data.csv"
executive_roles = [
    "manager", "senior manager", "director", "vp",
    "vice president", "chief", "head", "lead",
]
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_when_file_missing() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(dir.path()).unwrap();
        assert_eq!(config.llm.base_url, "https://api.openai.com/v1");
        assert_eq!(config.smtp.port, 587);
        assert!(config.notify.executive_roles.contains(&"director".to_string()));
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            "[llm]\nmodels = [\"gpt-a\", \"gpt-b\"]\n",
        )
        .unwrap();
        let config = Config::load(dir.path()).unwrap();
        assert_eq!(config.llm.models, vec!["gpt-a", "gpt-b"]);
        assert_eq!(config.store.base_dir, ".omnimeet/store");
    }

    #[test]
    fn test_invalid_toml_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE_NAME), "[llm\nbroken").unwrap();
        assert!(Config::load(dir.path()).is_err());
    }

    #[test]
    fn test_write_default_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = Config::write_default(dir.path()).unwrap();
        assert!(path.exists());
        let config = Config::load(dir.path()).unwrap();
        assert_eq!(config.notify.recipients_path, "participants_data.csv");
        // Second write must refuse to clobber.
        assert!(Config::write_default(dir.path()).is_err());
    }
}
