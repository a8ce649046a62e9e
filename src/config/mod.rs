// Configuration management
// TOML-backed settings constructed once at startup and passed explicitly
// into every component; core logic never reads ambient configuration.

pub mod settings;

pub use settings::{Config, ConfigError, OllamaConfig, QdrantConfig, RetrievalConfig};

/// Get the configuration directory path
#[inline]
pub fn get_config_dir() -> Result<std::path::PathBuf, ConfigError> {
    Config::config_dir()
}
