//! Configuration file handling for fin.
//!
//! The configuration file is stored at `$FIN_HOME/config.json` and holds the base URL of the
//! finance API. The durable bearer credential lives next to it in `$FIN_HOME/.secrets`.

use crate::{utils, Result};
use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

const APP_NAME: &str = "fin";
const CONFIG_VERSION: u8 = 1;
const SECRETS: &str = ".secrets";
const CREDENTIAL: &str = "credential";
const CONFIG_JSON: &str = "config.json";

/// The default base URL of the finance API.
pub const DEFAULT_API_URL: &str = "http://localhost:5000/api";

/// The `Config` object represents the configuration of the app. You instantiate it by providing
/// the path to `$FIN_HOME` and from there it loads `$FIN_HOME/config.json`. It provides paths to
/// other items that are either configurable or are expected in a certain location within the
/// home directory.
#[derive(Debug, Clone)]
pub struct Config {
    root: PathBuf,
    secrets: PathBuf,
    config_path: PathBuf,
    config_file: ConfigFile,
    api_url: Url,
}

impl Config {
    /// Creates the home directory, its `.secrets` subdirectory and an initial `config.json`
    /// pointing at `api_url`.
    ///
    /// # Arguments
    /// - `dir` - The directory that will be the root of the data directory, e.g. `$HOME/.fin`
    /// - `api_url` - The base URL of the finance API, e.g. `https://finance.example.com/api`
    ///
    /// # Errors
    /// - Returns an error if `api_url` is not an http(s) URL or if any file operation fails.
    pub async fn create(dir: impl Into<PathBuf>, api_url: &str) -> Result<Self> {
        let api_url = parse_api_url(api_url)?;

        let maybe_relative = dir.into();
        utils::make_dir(&maybe_relative)
            .await
            .context("Unable to create the fin home directory")?;
        let root = utils::canonicalize(&maybe_relative).await?;

        let secrets = root.join(SECRETS);
        utils::make_dir(&secrets).await?;

        let config_path = root.join(CONFIG_JSON);
        let config_file = ConfigFile {
            app_name: APP_NAME.to_string(),
            config_version: CONFIG_VERSION,
            api_url: api_url.to_string(),
            credential_path: None,
        };
        config_file.save(&config_path).await?;

        Ok(Self {
            root,
            secrets,
            config_path,
            config_file,
            api_url,
        })
    }

    /// This will
    /// - validate that `fin_home` exists and that the config file exists
    /// - load the config file and validate its API URL
    /// - validate that the secrets directory exists
    pub async fn load(fin_home: impl Into<PathBuf>) -> Result<Self> {
        let maybe_relative = fin_home.into();
        if !maybe_relative.is_dir() {
            bail!(
                "The fin home directory '{}' is missing, run 'fin init' first",
                maybe_relative.display()
            )
        }
        let root = utils::canonicalize(&maybe_relative).await?;

        let config_path = root.join(CONFIG_JSON);
        if !config_path.is_file() {
            bail!(
                "The config file is missing '{}', run 'fin init' first",
                config_path.display()
            )
        }
        let config_file = ConfigFile::load(&config_path).await?;
        let api_url = parse_api_url(&config_file.api_url)
            .with_context(|| format!("Invalid api_url in {}", config_path.display()))?;

        let config = Self {
            secrets: root.join(SECRETS),
            root,
            config_path,
            config_file,
            api_url,
        };
        if !config.secrets.is_dir() {
            bail!(
                "The secrets directory is missing '{}'",
                config.secrets.display()
            )
        }
        Ok(config)
    }

    /// Replaces the API base URL for the lifetime of this object. The file is not rewritten.
    pub fn with_api_url(mut self, api_url: &str) -> Result<Self> {
        self.api_url = parse_api_url(api_url)?;
        Ok(self)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn secrets(&self) -> &Path {
        &self.secrets
    }

    pub fn api_url(&self) -> &Url {
        &self.api_url
    }

    /// Returns the stored `credential_path` if it is absolute, otherwise resolves it relative to
    /// the home directory.
    pub fn credential_path(&self) -> PathBuf {
        let p = self.config_file.credential_path();
        if p.is_absolute() {
            return p;
        }
        self.root.join(p)
    }
}

/// Represents the serialization and deserialization format of the configuration file.
///
/// Example configuration:
/// ```json
/// {
///   "app_name": "fin",
///   "config_version": 1,
///   "api_url": "http://localhost:5000/api",
///   "credential_path": ".secrets/credential"
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
struct ConfigFile {
    /// Application name, should always be "fin"
    app_name: String,

    /// Configuration file version
    config_version: u8,

    /// Base URL of the finance API
    api_url: String,

    /// Path to the durable credential (optional, relative to the home directory or absolute).
    /// Defaults to $FIN_HOME/.secrets/credential if not specified
    #[serde(skip_serializing_if = "Option::is_none")]
    credential_path: Option<PathBuf>,
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            app_name: APP_NAME.to_string(),
            config_version: CONFIG_VERSION,
            api_url: DEFAULT_API_URL.to_string(),
            credential_path: None,
        }
    }
}

impl ConfigFile {
    /// Loads a ConfigFile from the specified path.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed, or names another application.
    async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = utils::read(path).await?;
        let config: ConfigFile = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file at {}", path.display()))?;

        anyhow::ensure!(
            config.app_name == APP_NAME,
            "Invalid app_name in config file: expected '{}', got '{}'",
            APP_NAME,
            config.app_name
        );

        Ok(config)
    }

    async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let p = path.as_ref();
        let data = serde_json::to_string_pretty(self).context("Unable to serialize config")?;
        utils::write(p, data)
            .await
            .context("Unable to write config file")
    }

    fn credential_path(&self) -> PathBuf {
        self.credential_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(SECRETS).join(CREDENTIAL))
    }
}

/// Parses and validates the API base URL. Trailing slashes are removed so that endpoint paths,
/// which all start with `/`, can be appended.
fn parse_api_url(s: &str) -> Result<Url> {
    let trimmed = s.trim().trim_end_matches('/');
    let url = Url::parse(trimmed).with_context(|| format!("Unable to parse API URL '{s}'"))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => bail!("The API URL must use http or https, got '{other}'"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_config_create_and_load() {
        let dir = TempDir::new().unwrap();
        let home = dir.path().join("fin_home");

        let created = Config::create(&home, "https://finance.example.com/api/")
            .await
            .unwrap();
        assert!(created.secrets().is_dir());
        assert!(created.config_path().is_file());
        assert_eq!(
            created.api_url().as_str(),
            "https://finance.example.com/api"
        );

        let loaded = Config::load(&home).await.unwrap();
        assert_eq!(loaded.api_url(), created.api_url());
        assert_eq!(
            loaded.credential_path(),
            loaded.root().join(".secrets").join("credential")
        );
    }

    #[tokio::test]
    async fn test_config_load_missing_home() {
        let dir = TempDir::new().unwrap();
        let err = Config::load(dir.path().join("nothing")).await.unwrap_err();
        assert!(err.to_string().contains("fin init"));
    }

    #[tokio::test]
    async fn test_config_load_invalid_app_name() {
        let dir = TempDir::new().unwrap();
        let config = Config::create(dir.path(), DEFAULT_API_URL).await.unwrap();
        let json = r#"{
            "app_name": "wrong_app",
            "config_version": 1,
            "api_url": "http://localhost:5000/api"
        }"#;
        utils::write(config.config_path(), json).await.unwrap();

        let err = Config::load(dir.path()).await.unwrap_err();
        assert!(format!("{err:#}").contains("Invalid app_name"));
    }

    #[tokio::test]
    async fn test_config_absolute_credential_path() {
        let dir = TempDir::new().unwrap();
        let config = Config::create(dir.path(), DEFAULT_API_URL).await.unwrap();
        let elsewhere = dir.path().join("elsewhere").join("token");
        let file = ConfigFile {
            credential_path: Some(elsewhere.clone()),
            ..ConfigFile::default()
        };
        file.save(config.config_path()).await.unwrap();

        let loaded = Config::load(dir.path()).await.unwrap();
        assert_eq!(loaded.credential_path(), elsewhere);
    }

    #[test]
    fn test_config_file_serialization_omits_none_fields() {
        let json = serde_json::to_string(&ConfigFile::default()).unwrap();
        assert!(!json.contains("credential_path"));
    }

    #[test]
    fn test_parse_api_url() {
        assert_eq!(
            parse_api_url("http://localhost:5000/api/").unwrap().as_str(),
            "http://localhost:5000/api"
        );
        assert!(parse_api_url("ftp://example.com").is_err());
        assert!(parse_api_url("not a url").is_err());
    }

    #[tokio::test]
    async fn test_with_api_url_override() {
        let dir = TempDir::new().unwrap();
        let config = Config::create(dir.path(), DEFAULT_API_URL).await.unwrap();
        let config = config.with_api_url("https://other.example.com/v2").unwrap();
        assert_eq!(config.api_url().as_str(), "https://other.example.com/v2");
    }
}
