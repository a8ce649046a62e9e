// Vector index
// Capability interface over the external vector engine: collection
// lifecycle, point upsert, and filtered similarity search.

pub mod qdrant;

pub use qdrant::QdrantIndex;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::Result;
use crate::guideline::GuidelineTag;

/// Payload persisted alongside each vector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointPayload {
    pub content: String,
    pub source: String,
    pub filename: String,
    pub guideline_type: GuidelineTag,
}

/// A persisted unit: deterministic id, embedding, payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VectorPoint {
    pub id: Uuid,
    pub vector: Vec<f32>,
    pub payload: PointPayload,
}

/// One similarity-search hit, ranked by score descending.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredHit {
    pub payload: PointPayload,
    pub score: f32,
}

/// Collection-level statistics.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct CollectionInfo {
    #[serde(default)]
    pub vectors_count: Option<u64>,
    #[serde(default)]
    pub points_count: u64,
}

/// Narrow interface to the vector store so pipelines can run against
/// in-memory fakes in tests.
///
/// Writes are upserts: re-submitting a point id replaces the stored entry.
/// Vector dimensionality is fixed at collection creation and every
/// subsequent point must match it.
pub trait VectorIndex {
    fn collection_exists(&self) -> Result<bool>;

    /// Create the collection with cosine distance. A concurrent creator
    /// winning the race is not an error.
    fn create_collection(&self, dimension: usize) -> Result<()>;

    fn upsert(&self, points: Vec<VectorPoint>) -> Result<()>;

    /// Top-`limit` hits by similarity. A non-empty `tags` slice restricts
    /// results to points whose `guideline_type` equals any of the tags;
    /// an empty slice searches the whole collection.
    fn search(&self, vector: &[f32], limit: usize, tags: &[GuidelineTag])
    -> Result<Vec<ScoredHit>>;

    fn collection_info(&self) -> Result<CollectionInfo>;
}

impl<T: VectorIndex + ?Sized> VectorIndex for &T {
    #[inline]
    fn collection_exists(&self) -> Result<bool> {
        (**self).collection_exists()
    }

    #[inline]
    fn create_collection(&self, dimension: usize) -> Result<()> {
        (**self).create_collection(dimension)
    }

    #[inline]
    fn upsert(&self, points: Vec<VectorPoint>) -> Result<()> {
        (**self).upsert(points)
    }

    #[inline]
    fn search(
        &self,
        vector: &[f32],
        limit: usize,
        tags: &[GuidelineTag],
    ) -> Result<Vec<ScoredHit>> {
        (**self).search(vector, limit, tags)
    }

    #[inline]
    fn collection_info(&self) -> Result<CollectionInfo> {
        (**self).collection_info()
    }
}
