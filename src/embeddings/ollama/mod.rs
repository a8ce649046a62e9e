
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use url::Url;

use crate::config::OllamaConfig;
use crate::embeddings::Embedder;
use crate::{RagError, Result};

const DEFAULT_TIMEOUT_SECONDS: u64 = 30;

/// Client for the Ollama embeddings API.
#[derive(Debug, Clone)]
pub struct OllamaEmbedder {
    base_url: Url,
    model: String,
    agent: ureq::Agent,
}

#[derive(Debug, Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbedResponse {
    embedding: Vec<f32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ModelInfo {
    pub name: String,
    pub size: Option<u64>,
    pub digest: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ModelsResponse {
    models: Vec<ModelInfo>,
}

impl OllamaEmbedder {
    #[inline]
    pub fn new(config: &OllamaConfig) -> Result<Self> {
        let base_url = config
            .url()
            .map_err(|e| RagError::Config(format!("Invalid Ollama endpoint: {}", e)))?;

        let agent = ureq::Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(DEFAULT_TIMEOUT_SECONDS)))
            .build()
            .into();

        Ok(Self {
            base_url,
            model: config.embedding_model.clone(),
            agent,
        })
    }

    #[inline]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.agent = ureq::Agent::config_builder()
            .timeout_global(Some(timeout))
            .build()
            .into();
        self
    }

    #[inline]
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Check that the server is reachable and the configured model is
    /// available.
    #[inline]
    pub fn health_check(&self) -> Result<()> {
        debug!("Performing health check for Ollama at {}", self.base_url);

        let models = self.list_models()?;

        // Ollama lists models as "name:tag"; accept a bare configured name.
        let available = models
            .iter()
            .any(|m| m.name == self.model || m.name.split(':').next() == Some(&self.model));

        if available {
            info!(
                "Health check passed for Ollama at {} with model {}",
                self.base_url, self.model
            );
            Ok(())
        } else {
            let names: Vec<&str> = models.iter().map(|m| m.name.as_str()).collect();
            warn!(
                "Model {} not found. Available models: {:?}",
                self.model, names
            );
            Err(RagError::Embedding(format!(
                "Model '{}' is not available. Available models: {:?}",
                self.model, names
            )))
        }
    }

    /// List models known to the Ollama server.
    #[inline]
    pub fn list_models(&self) -> Result<Vec<ModelInfo>> {
        let url = self
            .base_url
            .join("/api/tags")
            .map_err(|e| RagError::Embedding(format!("Failed to build models URL: {}", e)))?;

        debug!("Fetching available models from {}", url);

        let response_text = self
            .agent
            .get(url.as_str())
            .call()
            .and_then(|mut resp| resp.body_mut().read_to_string())
            .map_err(|e| RagError::Embedding(format!("Failed to list models: {}", e)))?;

        let models: ModelsResponse = serde_json::from_str(&response_text)
            .map_err(|e| RagError::Embedding(format!("Failed to parse models response: {}", e)))?;

        debug!("Found {} models", models.models.len());
        Ok(models.models)
    }
}

impl Embedder for OllamaEmbedder {
    #[inline]
    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        debug!("Generating embedding for text (length: {})", text.len());

        let request = EmbedRequest {
            model: &self.model,
            prompt: text,
        };

        let url = self
            .base_url
            .join("/api/embeddings")
            .map_err(|e| RagError::Embedding(format!("Failed to build embedding URL: {}", e)))?;

        let request_json = serde_json::to_string(&request)
            .map_err(|e| RagError::Embedding(format!("Failed to serialize request: {}", e)))?;

        let response_text = self
            .agent
            .post(url.as_str())
            .header("Content-Type", "application/json")
            .send(&request_json)
            .and_then(|mut resp| resp.body_mut().read_to_string())
            .map_err(|e| RagError::Embedding(format!("Embedding request failed: {}", e)))?;

        let response: EmbedResponse = serde_json::from_str(&response_text).map_err(|e| {
            RagError::Embedding(format!("Failed to parse embedding response: {}", e))
        })?;

        if response.embedding.is_empty() {
            return Err(RagError::Embedding(format!(
                "Model {} returned an empty embedding",
                self.model
            )));
        }

        debug!(
            "Generated embedding with {} dimensions",
            response.embedding.len()
        );

        Ok(response.embedding)
    }
}
