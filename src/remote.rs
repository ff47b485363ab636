//! One-shot loading of templates from a remote JSON endpoint.
use std::time::Duration;

use log::debug;

use crate::{Result, Template, TmplError};

/// Fetches template lists over HTTP.
#[derive(Debug, Clone)]
pub struct RemoteSource {
    client: reqwest::Client,
    timeout: Duration,
}

impl Default for RemoteSource {
    fn default() -> Self {
        Self::new(Duration::from_secs(10))
    }
}

impl RemoteSource {
    pub fn new(timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::new(),
            timeout,
        }
    }

    /// GETs `url` and parses the body as a JSON array of templates.
    pub async fn fetch_templates(&self, url: &str) -> Result<Vec<Template>> {
        let network_error = |e: reqwest::Error| TmplError::Network {
            url: url.to_string(),
            message: e.to_string(),
        };

        debug!("Fetching templates from {}", url);
        let response = self
            .client
            .get(url)
            .timeout(self.timeout)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(network_error)?;

        let templates: Vec<Template> = response.json().await.map_err(network_error)?;
        debug!("Fetched {} templates from {}", templates.len(), url);
        Ok(templates)
    }
}
