//! Image loader implementation with HTTP client and retry logic

use std::time::Duration;

use reqwest::Client;

use super::{ImagePipelineError, Result};

/// Source of encoded image bytes.
#[async_trait::async_trait]
pub trait ImageLoader: Send + Sync + std::fmt::Debug {
    /// Load image data from a URL
    async fn load(&self, url: &str) -> Result<Vec<u8>>;
}

/// HTTP-based image loader with connection pooling and retry logic
#[derive(Debug, Clone)]
pub struct HttpImageLoader {
    client: Client,
    max_retries: u32,
    retry_base_delay: Duration,
}

impl HttpImageLoader {
    pub fn new(timeout: Duration, max_retries: u32) -> Result<Self> {
        let client = Client::builder()
            .pool_max_idle_per_host(8)
            .timeout(timeout)
            .build()
            .map_err(|err| ImagePipelineError::Network(err.to_string()))?;

        Ok(Self {
            client,
            max_retries,
            retry_base_delay: crate::infra::constants::media::HTTP_RETRY_BASE_DELAY,
        })
    }

    pub fn with_client(client: Client, max_retries: u32) -> Self {
        Self {
            client,
            max_retries,
            retry_base_delay: crate::infra::constants::media::HTTP_RETRY_BASE_DELAY,
        }
    }

    fn supports_url(url: &str) -> bool {
        url.starts_with("http://") || url.starts_with("https://")
    }

    async fn load_once(&self, url: &str) -> Result<Vec<u8>> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ImagePipelineError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ImagePipelineError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| ImagePipelineError::Network(e.to_string()))?;

        Ok(bytes.to_vec())
    }
}

#[async_trait::async_trait]
impl ImageLoader for HttpImageLoader {
    async fn load(&self, url: &str) -> Result<Vec<u8>> {
        if !Self::supports_url(url) {
            return Err(ImagePipelineError::UnsupportedUrl(url.to_string()));
        }

        let mut attempt = 0;
        loop {
            match self.load_once(url).await {
                Ok(data) => return Ok(data),
                // Client errors will not fix themselves
                Err(err) if err.is_client_error() => return Err(err),
                Err(err) if attempt < self.max_retries => {
                    attempt += 1;
                    log::debug!(
                        "Image load attempt {attempt} for {url} failed: {err}"
                    );
                    // Exponential backoff
                    tokio::time::sleep(self.retry_base_delay * 2u32.pow(attempt - 1))
                        .await;
                }
                Err(err) => return Err(err),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn rejects_non_http_urls_without_network() {
        let loader = HttpImageLoader::new(Duration::from_secs(1), 0).unwrap();
        let err = loader.load("file:///etc/passwd").await.unwrap_err();
        assert!(matches!(err, ImagePipelineError::UnsupportedUrl(_)));
    }
}
