//! Request execution shared by the HTTP clients

use crate::client::ClientConfig;
use crate::protocol::{decode_body, Endpoint};
use graphsync_types::{Error, Result};
use serde::de::DeserializeOwned;
use std::time::Instant;
use tracing::debug;

/// Longest response body excerpt carried in an HTTP error
const ERROR_BODY_EXCERPT: usize = 200;

/// Configured `reqwest` client bound to one base URL
#[derive(Debug, Clone)]
pub(crate) struct Transport {
    config: ClientConfig,
    http: reqwest::Client,
}

impl Transport {
    pub(crate) fn new(config: ClientConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| Error::transport(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { config, http })
    }

    pub(crate) const fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub(crate) fn url(&self, endpoint: Endpoint) -> String {
        endpoint.url(&self.config.base_url)
    }

    pub(crate) fn get(&self, endpoint: Endpoint) -> reqwest::RequestBuilder {
        self.http.get(self.url(endpoint))
    }

    pub(crate) fn post(&self, endpoint: Endpoint) -> reqwest::RequestBuilder {
        self.http.post(self.url(endpoint))
    }

    /// Send a request and decode its JSON body
    pub(crate) async fn execute<T>(
        &self,
        endpoint: Endpoint,
        request: reqwest::RequestBuilder,
    ) -> Result<T>
    where
        T: DeserializeOwned + Default,
    {
        let started = Instant::now();
        let response = request.send().await.map_err(|e| self.map_error(endpoint, &e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| self.map_error(endpoint, &e))?;

        debug!(
            "{} {} answered {} in {:?}",
            endpoint,
            self.config.base_url,
            status.as_u16(),
            started.elapsed()
        );

        if !status.is_success() {
            let reason = status.canonical_reason().unwrap_or("Unknown status");
            let excerpt: String = body.trim().chars().take(ERROR_BODY_EXCERPT).collect();
            let message = if excerpt.is_empty() {
                reason.to_string()
            } else {
                format!("{}: {}", reason, excerpt)
            };
            return Err(Error::http(status.as_u16(), message));
        }

        decode_body(endpoint, &body)
    }

    fn map_error(&self, endpoint: Endpoint, error: &reqwest::Error) -> Error {
        if error.is_timeout() {
            let limit = if error.is_connect() {
                self.config.connect_timeout
            } else {
                self.config.request_timeout
            };
            Error::Timeout {
                seconds: limit.as_secs(),
            }
        } else if error.is_decode() {
            Error::protocol(format!("Failed to decode '{}' response: {}", endpoint, error))
        } else {
            Error::transport(format!(
                "Request to '{}' at {} failed: {}",
                endpoint, self.config.base_url, error
            ))
        }
    }
}
