//! Model byte fetching.

use std::path::PathBuf;
use std::time::Duration;

use reqwest::Client;
use tracing::{debug, info, warn};
use url::Url;

use crate::config::ExtractorConfig;
use crate::error::{InferenceError, InferenceResult};

/// Where the model bytes live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelLocation {
    Remote(Url),
    Local(PathBuf),
}

impl ModelLocation {
    /// Interpret an HTTP(S) URL, a `file://` URL or a plain path.
    pub fn parse(raw: &str) -> InferenceResult<Self> {
        match Url::parse(raw) {
            Ok(url) if url.scheme() == "http" || url.scheme() == "https" => {
                Ok(ModelLocation::Remote(url))
            }
            Ok(url) if url.scheme() == "file" => url
                .to_file_path()
                .map(ModelLocation::Local)
                .map_err(|_| InferenceError::model_load(format!("Invalid file URL: {}", raw))),
            Ok(url) => Err(InferenceError::model_load(format!(
                "Unsupported model URL scheme: {}",
                url.scheme()
            ))),
            Err(_) => Ok(ModelLocation::Local(PathBuf::from(raw))),
        }
    }
}

/// Downloads model bytes with bounded retries.
pub struct ModelFetcher {
    http: Client,
    max_retries: u32,
}

impl ModelFetcher {
    pub fn new(config: &ExtractorConfig) -> InferenceResult<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(InferenceError::Network)?;

        Ok(Self {
            http,
            max_retries: config.max_retries,
        })
    }

    /// Fetch the model. Every failure is reported as `ModelLoad`.
    pub async fn fetch(&self, raw_location: &str) -> InferenceResult<Vec<u8>> {
        let location = ModelLocation::parse(raw_location)?;

        let bytes = match &location {
            ModelLocation::Local(path) => {
                debug!("Reading model from {}", path.display());
                tokio::fs::read(path).await.map_err(|e| {
                    InferenceError::model_load(format!("{}: {}", path.display(), e))
                })?
            }
            ModelLocation::Remote(url) => self
                .with_retry(|| self.download(url))
                .await
                .map_err(InferenceError::into_model_load)?,
        };

        if bytes.is_empty() {
            return Err(InferenceError::model_load(format!(
                "Model at {} is empty",
                raw_location
            )));
        }

        info!(
            location = %raw_location,
            bytes = bytes.len(),
            "Fetched pretrained model"
        );
        Ok(bytes)
    }

    async fn download(&self, url: &Url) -> InferenceResult<Vec<u8>> {
        debug!("Downloading model from {}", url);

        let response = self.http.get(url.clone()).send().await?;
        if !response.status().is_success() {
            return Err(InferenceError::HttpStatus {
                status: response.status().as_u16(),
                url: url.to_string(),
            });
        }

        Ok(response.bytes().await?.to_vec())
    }

    /// Execute with retry logic.
    async fn with_retry<F, Fut, T>(&self, operation: F) -> InferenceResult<T>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = InferenceResult<T>>,
    {
        let mut attempt = 0;
        loop {
            match operation().await {
                Ok(result) => return Ok(result),
                Err(e) if e.is_retryable() && attempt < self.max_retries => {
                    let delay = Duration::from_millis(500 * 2u64.pow(attempt));
                    warn!(
                        "Model download failed (attempt {}), retrying in {:?}: {}",
                        attempt + 1,
                        delay,
                        e
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
