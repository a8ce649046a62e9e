// Embeddings module
// Capability interface for text embedding plus the Ollama-backed client.

pub mod ollama;

pub use ollama::{ModelInfo, OllamaEmbedder};

use crate::Result;

/// Maps text to a fixed-length vector via an embedding service.
///
/// Dimensionality is deterministic per model; callers learn it by probing
/// one embedding. Failures are not retried at this layer.
pub trait Embedder {
    fn embed(&self, text: &str) -> Result<Vec<f32>>;
}

impl<T: Embedder + ?Sized> Embedder for &T {
    #[inline]
    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        (**self).embed(text)
    }
}
