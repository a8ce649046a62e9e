
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use url::Url;

use crate::chunking::ChunkingConfig;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub ollama: OllamaConfig,
    #[serde(default)]
    pub qdrant: QdrantConfig,
    #[serde(default)]
    pub chunking: ChunkingConfig,
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    /// Directory scanned by `ingest` when no path is given
    #[serde(default)]
    pub docs_dir: Option<PathBuf>,
    #[serde(skip)]
    pub base_dir: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct OllamaConfig {
    pub protocol: String,
    pub host: String,
    pub port: u16,
    /// Model used for recommendation generation
    pub chat_model: String,
    /// Model used for embeddings
    pub embedding_model: String,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            protocol: "http".to_string(),
            host: "localhost".to_string(),
            port: 11434,
            chat_model: "llama3".to_string(),
            embedding_model: "nomic-embed-text".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct QdrantConfig {
    pub protocol: String,
    pub host: String,
    pub port: u16,
    pub collection: String,
}

impl Default for QdrantConfig {
    fn default() -> Self {
        Self {
            protocol: "http".to_string(),
            host: "localhost".to_string(),
            port: 6333,
            collection: "nutrition_guidelines".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Number of passages retrieved per recommendation
    pub top_k: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self { top_k: 5 }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration directory not found or could not be created")]
    DirectoryError,
    #[error("Invalid URL format: {0}")]
    InvalidUrl(String),
    #[error("Invalid port: {0} (must be between 1 and 65535)")]
    InvalidPort(u16),
    #[error("Invalid model name: {0} (cannot be empty)")]
    InvalidModel(String),
    #[error("Invalid collection name: {0} (cannot be empty)")]
    InvalidCollection(String),
    #[error("Invalid protocol: {0} (must be 'http' or 'https')")]
    InvalidProtocol(String),
    #[error("Invalid chunk size: {0} (must be greater than zero)")]
    InvalidChunkSize(usize),
    #[error("Chunk overlap ({0}) must be smaller than chunk size ({1})")]
    OverlapTooLarge(usize, usize),
    #[error("Invalid top_k: must be greater than zero")]
    InvalidTopK,
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parsing error: {0}")]
    TomlParse(#[from] toml::de::Error),
    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

impl Config {
    /// Platform configuration directory for this application.
    #[inline]
    pub fn config_dir() -> Result<PathBuf, ConfigError> {
        dirs::config_dir()
            .map(|dir| dir.join("nutrition-rag"))
            .ok_or(ConfigError::DirectoryError)
    }

    /// Load `config.toml` from the given directory, falling back to
    /// defaults when the file does not exist.
    #[inline]
    pub fn load<P: AsRef<Path>>(config_dir: P) -> Result<Self> {
        let config_path = config_dir.as_ref().join("config.toml");

        if !config_path.exists() {
            return Ok(Self::default_with_base(config_dir.as_ref()));
        }

        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;

        let mut config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", config_path.display()))?;
        config.base_dir = config_dir.as_ref().to_path_buf();

        config
            .validate()
            .with_context(|| "Configuration validation failed")?;

        Ok(config)
    }

    fn default_with_base(base_dir: &Path) -> Self {
        Self {
            ollama: OllamaConfig::default(),
            qdrant: QdrantConfig::default(),
            chunking: ChunkingConfig::default(),
            retrieval: RetrievalConfig::default(),
            docs_dir: None,
            base_dir: base_dir.to_path_buf(),
        }
    }

    #[inline]
    pub fn save(&self) -> Result<()> {
        self.validate()
            .context("Configuration validation failed before saving")?;

        fs::create_dir_all(&self.base_dir).with_context(|| {
            format!(
                "Failed to create config directory: {}",
                self.base_dir.display()
            )
        })?;

        let config_path = self.config_file_path();
        let content = toml::to_string_pretty(self).context("Failed to serialize config to TOML")?;

        fs::write(&config_path, content)
            .with_context(|| format!("Failed to write config file: {}", config_path.display()))?;

        Ok(())
    }

    #[inline]
    pub fn config_file_path(&self) -> PathBuf {
        self.base_dir.join("config.toml")
    }

    /// Directory ingested when the CLI is given no path.
    #[inline]
    pub fn docs_dir(&self) -> PathBuf {
        self.docs_dir
            .clone()
            .unwrap_or_else(|| self.base_dir.join("documents"))
    }

    #[inline]
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.ollama.validate()?;
        self.qdrant.validate()?;

        if self.chunking.chunk_size == 0 {
            return Err(ConfigError::InvalidChunkSize(self.chunking.chunk_size));
        }
        if self.chunking.chunk_overlap >= self.chunking.chunk_size {
            return Err(ConfigError::OverlapTooLarge(
                self.chunking.chunk_overlap,
                self.chunking.chunk_size,
            ));
        }
        if self.retrieval.top_k == 0 {
            return Err(ConfigError::InvalidTopK);
        }

        Ok(())
    }
}

impl OllamaConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_endpoint(&self.protocol, &self.host, self.port)?;

        if self.chat_model.trim().is_empty() {
            return Err(ConfigError::InvalidModel(self.chat_model.clone()));
        }
        if self.embedding_model.trim().is_empty() {
            return Err(ConfigError::InvalidModel(self.embedding_model.clone()));
        }

        Ok(())
    }

    pub fn url(&self) -> Result<Url, ConfigError> {
        endpoint_url(&self.protocol, &self.host, self.port)
    }
}

impl QdrantConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_endpoint(&self.protocol, &self.host, self.port)?;

        if self.collection.trim().is_empty() {
            return Err(ConfigError::InvalidCollection(self.collection.clone()));
        }

        Ok(())
    }

    pub fn url(&self) -> Result<Url, ConfigError> {
        endpoint_url(&self.protocol, &self.host, self.port)
    }
}

fn validate_endpoint(protocol: &str, host: &str, port: u16) -> Result<(), ConfigError> {
    if protocol != "http" && protocol != "https" {
        return Err(ConfigError::InvalidProtocol(protocol.to_string()));
    }
    if port == 0 {
        return Err(ConfigError::InvalidPort(port));
    }
    endpoint_url(protocol, host, port).map(|_| ())
}

fn endpoint_url(protocol: &str, host: &str, port: u16) -> Result<Url, ConfigError> {
    let url_str = format!("{}://{}:{}", protocol, host, port);
    Url::parse(&url_str).map_err(|_| ConfigError::InvalidUrl(url_str))
}
