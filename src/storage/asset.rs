//! Raw source asset fetching.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use log::debug;

use crate::config::ASSET_FETCH_TIMEOUT_SECS;
use crate::error_handling::AssetError;

/// Where the raw ZIP code CSV comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetSource {
    File(PathBuf),
    Url(String),
}

impl AssetSource {
    /// Interprets `http://` and `https://` values as URLs and anything else
    /// as a local path.
    pub fn parse(value: &str) -> Self {
        let lower = value.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            AssetSource::Url(value.to_string())
        } else {
            AssetSource::File(PathBuf::from(value))
        }
    }

    /// Fetches the whole asset as text.
    pub async fn fetch_text(&self) -> Result<String, AssetError> {
        match self {
            AssetSource::File(path) => {
                debug!("Reading source asset from {}", path.display());
                tokio::fs::read_to_string(path)
                    .await
                    .map_err(|source| AssetError::Io {
                        path: path.display().to_string(),
                        source,
                    })
            }
            AssetSource::Url(url) => {
                debug!("Downloading source asset from {}", url);
                let http_error = |source| AssetError::Http {
                    url: url.clone(),
                    source,
                };
                let client = reqwest::Client::builder()
                    .timeout(Duration::from_secs(ASSET_FETCH_TIMEOUT_SECS))
                    .build()
                    .map_err(http_error)?;
                let response = client.get(url).send().await.map_err(http_error)?;
                let status = response.status();
                if !status.is_success() {
                    return Err(AssetError::HttpStatus {
                        url: url.clone(),
                        status: status.as_u16(),
                    });
                }
                response.text().await.map_err(http_error)
            }
        }
    }
}

impl fmt::Display for AssetSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssetSource::File(path) => write!(f, "{}", path.display()),
            AssetSource::Url(url) => write!(f, "{}", url),
        }
    }
}
