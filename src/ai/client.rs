use crate::config::{BackendConfig, SamplingOptions};
use crate::error::{ArchitectError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::time::Duration;

/// The inference service the architect talks to.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String>;

    async fn list_models(&self) -> Result<Vec<String>>;
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: &'a SamplingOptions,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: String,
}

#[derive(Debug, Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<ModelTag>,
}

#[derive(Debug, Deserialize)]
struct ModelTag {
    name: String,
}

pub struct OllamaClient {
    client: reqwest::Client,
    config: BackendConfig,
}

impl OllamaClient {
    pub fn new(config: BackendConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { client, config })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    async fn check_status(res: reqwest::Response) -> Result<reqwest::Response> {
        if res.status().is_success() {
            return Ok(res);
        }
        let status = res.status();
        let body = res.text().await.unwrap_or_default();
        log::error!("Ollama returned {status}: {body}");
        Err(ArchitectError::BackendStatus {
            status: status.as_u16(),
            body,
        })
    }
}

#[async_trait]
impl CompletionBackend for OllamaClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let payload = GenerateRequest {
            model: &self.config.model,
            prompt,
            stream: false,
            options: &self.config.sampling,
        };

        log::debug!(
            "Sending {} byte prompt to model '{}'",
            prompt.len(),
            self.config.model
        );

        let res = self
            .client
            .post(self.url("/api/generate"))
            .json(&payload)
            .send()
            .await?;
        let body: GenerateResponse = Self::check_status(res).await?.json().await?;

        log::debug!("Received {} byte completion", body.response.len());
        Ok(body.response)
    }

    async fn list_models(&self) -> Result<Vec<String>> {
        let res = self.client.get(self.url("/api/tags")).send().await?;
        let body: TagsResponse = Self::check_status(res).await?.json().await?;
        Ok(body.models.into_iter().map(|m| m.name).collect())
    }
}
