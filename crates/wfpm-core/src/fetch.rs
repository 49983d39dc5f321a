//! Release artifact host access

use crate::config::Settings;
use crate::{Error, Result};

/// Generic HTTP GET against the artifact host.
///
/// `Ok(None)` means the asset does not exist (404); any other failure is
/// an error.
pub trait ReleaseHost {
    fn get(&self, url: &str) -> Result<Option<Vec<u8>>>;
}

/// Try each URL in order and return the first asset found with its URL.
pub fn fetch_first(host: &dyn ReleaseHost, urls: &[String]) -> Result<Option<(String, Vec<u8>)>> {
    for url in urls {
        if let Some(bytes) = host.get(url)? {
            tracing::debug!(url = %url, size = bytes.len(), "Downloaded release asset");
            return Ok(Some((url.clone(), bytes)));
        }
        tracing::debug!(url = %url, "Release asset not found");
    }
    Ok(None)
}

/// [`ReleaseHost`] over HTTPS.
pub struct HttpReleaseHost {
    client: reqwest::blocking::Client,
}

impl HttpReleaseHost {
    pub fn new(settings: &Settings) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(&settings.user_agent)
            .timeout(settings.http_timeout)
            .build()
            .map_err(|e| Error::Http {
                url: String::new(),
                message: e.to_string(),
            })?;

        Ok(Self { client })
    }
}

impl ReleaseHost for HttpReleaseHost {
    fn get(&self, url: &str) -> Result<Option<Vec<u8>>> {
        let http_err = |message: String| Error::Http {
            url: url.to_string(),
            message,
        };

        let response = self
            .client
            .get(url)
            .send()
            .map_err(|e| http_err(e.to_string()))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(http_err(format!("status {}", response.status())));
        }

        response
            .bytes()
            .map(|b| Some(b.to_vec()))
            .map_err(|e| http_err(e.to_string()))
    }
}
