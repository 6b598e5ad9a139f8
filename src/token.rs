//! Access token lookup.
//!
//! The bearer token comes from `--access-token` (or `GPSYNC_ACCESS_TOKEN`),
//! falling back to the credential file `.gp_token` in the token directory.
//! That file is the JSON document written by the OAuth consent flow; only its
//! `access_token` field is read.

use anyhow::{anyhow, bail, Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const TOKEN_FILE_NAME: &str = ".gp_token";

#[derive(Debug, Deserialize)]
struct StoredCredentials {
    access_token: Option<String>,
}

/// Directory holding the credential file: the flag, or the home directory
pub fn token_dir(flag: Option<PathBuf>) -> Result<PathBuf> {
    match flag {
        Some(dir) => Ok(dir),
        None => dirs::home_dir()
            .ok_or_else(|| anyhow!("Cannot locate a home directory; pass --token-dir")),
    }
}

pub async fn resolve_access_token(explicit: Option<String>, token_dir: &Path) -> Result<String> {
    if let Some(token) = explicit.filter(|t| !t.trim().is_empty()) {
        return Ok(token.trim().to_string());
    }
    read_token_file(&token_dir.join(TOKEN_FILE_NAME)).await
}

pub async fn read_token_file(path: &Path) -> Result<String> {
    let contents = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("No access token available; cannot read {}", path.display()))?;

    let stored: StoredCredentials = serde_json::from_str(&contents)
        .with_context(|| format!("{} is not a valid credential file", path.display()))?;

    match stored.access_token {
        Some(token) if !token.is_empty() => Ok(token),
        _ => bail!("{} holds no access_token", path.display()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_explicit_token_wins() {
        let dir = TempDir::new().unwrap();
        let token = resolve_access_token(Some(" abc ".to_string()), dir.path())
            .await
            .unwrap();
        assert_eq!(token, "abc");
    }

    #[tokio::test]
    async fn test_reads_credential_file() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join(TOKEN_FILE_NAME),
            r#"{"access_token": "ya29.token", "refresh_token": "r", "token_expiry": "2026-01-01T00:00:00Z"}"#,
        )
        .unwrap();

        let token = resolve_access_token(None, dir.path()).await.unwrap();
        assert_eq!(token, "ya29.token");
    }

    #[tokio::test]
    async fn test_missing_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let error = resolve_access_token(Some(String::new()), dir.path())
            .await
            .unwrap_err();
        assert!(error.to_string().contains("No access token available"));
    }

    #[tokio::test]
    async fn test_file_without_token_is_an_error() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(TOKEN_FILE_NAME), r#"{"refresh_token": "r"}"#).unwrap();

        let error = resolve_access_token(None, dir.path()).await.unwrap_err();
        assert!(error.to_string().contains("holds no access_token"));
    }

    #[test]
    fn test_token_dir_prefers_flag() {
        assert_eq!(
            token_dir(Some(PathBuf::from("/etc/gpsync"))).unwrap(),
            PathBuf::from("/etc/gpsync")
        );
    }
}
