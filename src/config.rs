//! Runtime configuration for the console client: API endpoint, session file
//! location and request timeout. Values come from CLI arguments with
//! `VENDING_ADMIN_*` environment fallbacks. Nothing here is secret.

use anyhow::{anyhow, Result};
use std::{path::PathBuf, time::Duration};
use url::Url;

pub const DEFAULT_API_BASE_URL: &str = "https://mctasuvendingmachine.vercel.app/api";
pub const DEFAULT_SESSION_FILE: &str = ".vending-admin/session.json";
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 10;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    pub api_base_url: String,
    pub session_file: PathBuf,
    pub timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            session_file: PathBuf::from(DEFAULT_SESSION_FILE),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECONDS),
        }
    }
}

impl Config {
    /// # Errors
    /// Returns an error if the API URL is not an absolute http(s) URL or the
    /// timeout is zero.
    pub fn new(api_base_url: &str, session_file: PathBuf, timeout_seconds: u64) -> Result<Self> {
        if timeout_seconds == 0 {
            return Err(anyhow!("timeout must be at least one second"));
        }

        Ok(Self {
            api_base_url: normalize_base_url(api_base_url)?,
            session_file,
            timeout: Duration::from_secs(timeout_seconds),
        })
    }
}

/// Trims whitespace and trailing slashes and checks the scheme.
///
/// # Errors
/// Returns an error if the value is empty, unparsable or not http(s).
pub fn normalize_base_url(value: &str) -> Result<String> {
    let trimmed = value.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Err(anyhow!("API base URL is not configured"));
    }

    let url = Url::parse(trimmed).map_err(|err| anyhow!("invalid API base URL {trimmed}: {err}"))?;
    match url.scheme() {
        "http" | "https" => {}
        scheme => return Err(anyhow!("unsupported API URL scheme: {scheme}")),
    }
    if url.host().is_none() {
        return Err(anyhow!("API base URL has no host: {trimmed}"));
    }

    Ok(trimmed.to_string())
}
