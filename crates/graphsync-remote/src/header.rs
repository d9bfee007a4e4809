//! HTTP client for the header-comment service

use crate::client::ClientConfig;
use crate::protocol::{Endpoint, HeaderRequest, HeaderResponse, HealthResponse};
use crate::transport::Transport;
use async_trait::async_trait;
use graphsync_types::{Error, HeaderGenerator, Result, ServiceHealth};
use tracing::{debug, warn};

/// [`HeaderGenerator`] calling the header-comment service over HTTP
///
/// A response that does not confirm success, or that carries no content,
/// is reported as [`Error::Protocol`] so callers never write an empty file.
#[derive(Debug, Clone)]
pub struct HttpHeaderGenerator {
    transport: Transport,
}

impl HttpHeaderGenerator {
    /// Create a client; `config.base_url` is the service root
    pub fn with_config(config: ClientConfig) -> Result<Self> {
        Ok(Self {
            transport: Transport::new(config)?,
        })
    }

    /// Client configuration
    pub const fn config(&self) -> &ClientConfig {
        self.transport.config()
    }
}

#[async_trait]
impl HeaderGenerator for HttpHeaderGenerator {
    async fn generate_header(&self, content: &str, filename: &str) -> Result<String> {
        debug!("Requesting header comment for {}", filename);
        let body = HeaderRequest {
            content,
            filename,
            language: None,
        };
        let request = self.transport.post(Endpoint::GenerateHeader).json(&body);
        let response: HeaderResponse = self
            .transport
            .execute(Endpoint::GenerateHeader, request)
            .await?;

        if response.success != Some(true) {
            let reason = response
                .error
                .unwrap_or_else(|| "service did not report success".to_string());
            warn!("Header generation for {} failed: {}", filename, reason);
            return Err(Error::protocol(format!(
                "Header generation for '{}' failed: {}",
                filename, reason
            )));
        }

        match response.modified_content {
            Some(modified) if !modified.trim().is_empty() => Ok(modified),
            _ => Err(Error::protocol(format!(
                "Header service returned no content for '{}'",
                filename
            ))),
        }
    }

    async fn health(&self) -> Result<ServiceHealth> {
        let request = self.transport.get(Endpoint::Health);
        let response: HealthResponse = self.transport.execute(Endpoint::Health, request).await?;
        Ok(response)
    }
}
