// Ingestion pipeline
// Loads guideline documents, chunks them, embeds each chunk, and upserts
// the result into the vector index under deterministic content-derived ids.


use std::path::Path;

use tracing::{debug, info, warn};
use uuid::Uuid;
use walkdir::WalkDir;

use crate::chunking::{self, ChunkingConfig};
use crate::embeddings::Embedder;
use crate::guideline;
use crate::index::{PointPayload, VectorIndex, VectorPoint};
use crate::{RagError, Result, loader};

/// Number of leading content characters that participate in a chunk's
/// identity.
const CONTENT_ID_PREFIX_LEN: usize = 100;

/// Derive the deterministic id for a chunk from its source path and the
/// leading characters of its content. Re-deriving the same pair always
/// yields the same id, so re-ingestion overwrites instead of duplicating.
#[inline]
pub fn chunk_id(source: &str, content: &str) -> Uuid {
    let prefix: String = content.chars().take(CONTENT_ID_PREFIX_LEN).collect();
    Uuid::new_v5(&Uuid::NAMESPACE_OID, format!("{}:{}", source, prefix).as_bytes())
}

/// Outcome of a directory ingestion run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestReport {
    /// Total chunks successfully ingested
    pub chunks: usize,
    /// Files ingested without error
    pub files_ingested: usize,
    /// Files skipped because loading or ingestion failed
    pub files_failed: usize,
}

/// Populates the vector index from guideline documents.
pub struct Ingestor<E, V> {
    embedder: E,
    index: V,
    chunking: ChunkingConfig,
}

impl<E: Embedder, V: VectorIndex> Ingestor<E, V> {
    #[inline]
    pub fn new(embedder: E, index: V, chunking: ChunkingConfig) -> Self {
        Self {
            embedder,
            index,
            chunking,
        }
    }

    /// Create the collection if it does not exist yet, probing one
    /// embedding to learn the model's vector dimensionality. Safe to call
    /// repeatedly and from concurrent ingestions.
    #[inline]
    pub fn ensure_collection(&self) -> Result<()> {
        if self.index.collection_exists()? {
            return Ok(());
        }

        let probe = self.embedder.embed("dimension probe")?;
        if probe.is_empty() {
            return Err(RagError::Embedding(
                "probe embedding has zero dimensions".to_string(),
            ));
        }

        info!("Creating collection with {} dimensions", probe.len());
        self.index.create_collection(probe.len())
    }

    /// Ingest a single document. Fails on unsupported formats and loader
    /// errors; returns the number of chunks written.
    #[inline]
    pub fn ingest_file(&self, path: &Path) -> Result<usize> {
        self.ensure_collection()?;
        self.ingest_single(path)
    }

    /// Recursively ingest every supported document under `root`.
    ///
    /// Files are processed independently: a failure is logged and counted,
    /// and ingestion of the remaining files continues.
    #[inline]
    pub fn ingest_directory(&self, root: &Path) -> Result<IngestReport> {
        self.ingest_directory_with(root, |_| {})
    }

    /// Directory ingestion with a per-file progress callback, invoked after
    /// each ingestion attempt.
    #[inline]
    pub fn ingest_directory_with<F: FnMut(&Path)>(
        &self,
        root: &Path,
        mut on_file: F,
    ) -> Result<IngestReport> {
        self.ensure_collection()?;

        let mut report = IngestReport::default();

        for entry in WalkDir::new(root).follow_links(true) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Skipping unreadable directory entry: {}", e);
                    report.files_failed += 1;
                    continue;
                }
            };

            if !entry.file_type().is_file() {
                continue;
            }

            let path = entry.path();
            if !loader::is_supported(path) {
                debug!("Skipping unsupported file {}", path.display());
                continue;
            }

            match self.ingest_single(path) {
                Ok(count) => {
                    report.chunks += count;
                    report.files_ingested += 1;
                }
                Err(e) => {
                    warn!("Error ingesting {}: {}", path.display(), e);
                    report.files_failed += 1;
                }
            }

            on_file(path);
        }

        info!(
            "Directory ingestion finished: {} chunks from {} files ({} failed)",
            report.chunks, report.files_ingested, report.files_failed
        );

        Ok(report)
    }

    fn ingest_single(&self, path: &Path) -> Result<usize> {
        let document = loader::load_document(path)?;
        let chunks = chunking::split_text(&document.text, &self.chunking)?;
        let tag = guideline::classify_path(&document.source);

        let mut points = Vec::with_capacity(chunks.len());
        for chunk in &chunks {
            let vector = self.embedder.embed(&chunk.content)?;
            points.push(VectorPoint {
                id: chunk_id(&document.source, &chunk.content),
                vector,
                payload: PointPayload {
                    content: chunk.content.clone(),
                    source: document.source.clone(),
                    filename: document.filename.clone(),
                    guideline_type: tag,
                },
            });
        }

        let count = points.len();
        self.index.upsert(points)?;

        info!("Ingested {} chunks from {}", count, path.display());
        Ok(count)
    }
}
