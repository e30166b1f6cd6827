use crate::commands::Out;
use crate::{Config, Result};
use anyhow::Context;
use std::path::Path;

/// Creates the fin home directory, its `.secrets` subdirectory and an initial `config.json`.
///
/// # Arguments
/// - `fin_home` - The directory that will be the root of the data directory, e.g. `$HOME/.fin`
/// - `api_url` - The base URL of the finance API, e.g. `http://localhost:5000/api`
///
/// # Errors
/// - Returns an error if the URL is invalid or any file operation fails.
pub async fn init(fin_home: &Path, api_url: &str) -> Result<Out<()>> {
    let config = Config::create(fin_home, api_url)
        .await
        .context("Unable to create the fin home directory and config")?;
    Ok(format!(
        "Created {} using the API at {}",
        config.root().display(),
        config.api_url()
    )
    .into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_init_then_load() {
        let dir = TempDir::new().unwrap();
        let home = dir.path().join("fin");
        let out = init(&home, "https://finance.example.com/api").await.unwrap();
        assert!(out.message().contains("finance.example.com"));

        let config = Config::load(&home).await.unwrap();
        assert_eq!(
            config.api_url().as_str(),
            "https://finance.example.com/api"
        );
    }

    #[tokio::test]
    async fn test_init_rejects_bad_url() {
        let dir = TempDir::new().unwrap();
        let home = dir.path().join("fin");
        assert!(init(&home, "not a url").await.is_err());
    }
}
