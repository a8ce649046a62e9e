
use std::time::Duration;

use serde::{Deserialize, Serialize, de::DeserializeOwned};
use tracing::{debug, info};
use url::Url;

use crate::config::QdrantConfig;
use crate::guideline::GuidelineTag;
use crate::index::{CollectionInfo, PointPayload, ScoredHit, VectorIndex, VectorPoint};
use crate::{RagError, Result};

const DEFAULT_TIMEOUT_SECONDS: u64 = 30;

/// Vector index adapter over the Qdrant REST API.
#[derive(Debug, Clone)]
pub struct QdrantIndex {
    base_url: Url,
    collection: String,
    agent: ureq::Agent,
}

#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    result: T,
}

#[derive(Debug, Deserialize)]
struct CollectionsResult {
    collections: Vec<CollectionDescription>,
}

#[derive(Debug, Deserialize)]
struct CollectionDescription {
    name: String,
}

#[derive(Debug, Serialize)]
struct CreateCollectionRequest {
    vectors: VectorParams,
}

#[derive(Debug, Serialize)]
struct VectorParams {
    size: usize,
    distance: &'static str,
}

#[derive(Debug, Serialize)]
struct UpsertRequest<'a> {
    points: &'a [VectorPoint],
}

#[derive(Debug, Serialize)]
struct SearchRequest<'a> {
    vector: &'a [f32],
    limit: usize,
    with_payload: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    filter: Option<SearchFilter>,
}

/// Logical OR over per-tag equality conditions.
#[derive(Debug, Serialize)]
struct SearchFilter {
    should: Vec<FieldCondition>,
}

#[derive(Debug, Serialize)]
struct FieldCondition {
    key: &'static str,
    #[serde(rename = "match")]
    match_value: MatchValue,
}

#[derive(Debug, Serialize)]
struct MatchValue {
    value: GuidelineTag,
}

#[derive(Debug, Deserialize)]
struct ScoredPointWire {
    score: f32,
    payload: PointPayload,
}

impl QdrantIndex {
    #[inline]
    pub fn new(config: &QdrantConfig) -> Result<Self> {
        let base_url = config
            .url()
            .map_err(|e| RagError::Config(format!("Invalid Qdrant endpoint: {}", e)))?;

        let agent = ureq::Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(DEFAULT_TIMEOUT_SECONDS)))
            .build()
            .into();

        Ok(Self {
            base_url,
            collection: config.collection.clone(),
            agent,
        })
    }

    #[inline]
    pub fn collection(&self) -> &str {
        &self.collection
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .map_err(|e| RagError::VectorIndex(format!("Failed to build URL {}: {}", path, e)))
    }

    fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.endpoint(path)?;

        let response_text = self
            .agent
            .get(url.as_str())
            .call()
            .and_then(|mut resp| resp.body_mut().read_to_string())
            .map_err(|e| RagError::VectorIndex(format!("GET {} failed: {}", path, e)))?;

        parse_response(path, &response_text)
    }

    fn send_json<B: Serialize, T: DeserializeOwned>(
        &self,
        method: HttpMethod,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let url = self.endpoint(path)?;
        let body_json = serde_json::to_string(body)
            .map_err(|e| RagError::VectorIndex(format!("Failed to serialize request: {}", e)))?;

        let request = match method {
            HttpMethod::Put => self.agent.put(url.as_str()),
            HttpMethod::Post => self.agent.post(url.as_str()),
        };

        let response_text = request
            .header("Content-Type", "application/json")
            .send(&body_json)
            .and_then(|mut resp| resp.body_mut().read_to_string())
            .map_err(|e| RagError::VectorIndex(format!("{:?} {} failed: {}", method, path, e)))?;

        parse_response(path, &response_text)
    }
}

#[derive(Debug, Clone, Copy)]
enum HttpMethod {
    Put,
    Post,
}

fn parse_response<T: DeserializeOwned>(path: &str, text: &str) -> Result<T> {
    let response: ApiResponse<T> = serde_json::from_str(text)
        .map_err(|e| RagError::VectorIndex(format!("Failed to parse response from {}: {}", path, e)))?;
    Ok(response.result)
}

impl VectorIndex for QdrantIndex {
    #[inline]
    fn collection_exists(&self) -> Result<bool> {
        let result: CollectionsResult = self.get_json("/collections")?;
        Ok(result
            .collections
            .iter()
            .any(|c| c.name == self.collection))
    }

    #[inline]
    fn create_collection(&self, dimension: usize) -> Result<()> {
        debug!(
            "Creating collection {} with {} dimensions",
            self.collection, dimension
        );

        let request = CreateCollectionRequest {
            vectors: VectorParams {
                size: dimension,
                distance: "Cosine",
            },
        };

        let path = format!("/collections/{}", self.collection);
        let url = self.endpoint(&path)?;
        let body_json = serde_json::to_string(&request)
            .map_err(|e| RagError::VectorIndex(format!("Failed to serialize request: {}", e)))?;

        match self
            .agent
            .put(url.as_str())
            .header("Content-Type", "application/json")
            .send(&body_json)
        {
            Ok(_) => {
                info!(
                    "Created collection {} ({} dimensions, cosine distance)",
                    self.collection, dimension
                );
                Ok(())
            }
            // A concurrent ingestion may have won the creation race; the
            // collection existing is the outcome we wanted.
            Err(ureq::Error::StatusCode(409)) => {
                debug!("Collection {} already exists", self.collection);
                Ok(())
            }
            Err(e) => Err(RagError::VectorIndex(format!(
                "PUT {} failed: {}",
                path, e
            ))),
        }
    }

    #[inline]
    fn upsert(&self, points: Vec<VectorPoint>) -> Result<()> {
        if points.is_empty() {
            debug!("No points to upsert");
            return Ok(());
        }

        debug!(
            "Upserting {} points into {}",
            points.len(),
            self.collection
        );

        let path = format!("/collections/{}/points?wait=true", self.collection);
        let request = UpsertRequest { points: &points };
        let _: serde_json::Value = self.send_json(HttpMethod::Put, &path, &request)?;

        Ok(())
    }

    #[inline]
    fn search(
        &self,
        vector: &[f32],
        limit: usize,
        tags: &[GuidelineTag],
    ) -> Result<Vec<ScoredHit>> {
        debug!(
            "Searching {} (limit {}, tags {:?})",
            self.collection, limit, tags
        );

        let filter = (!tags.is_empty()).then(|| SearchFilter {
            should: tags
                .iter()
                .map(|tag| FieldCondition {
                    key: "guideline_type",
                    match_value: MatchValue { value: *tag },
                })
                .collect(),
        });

        let request = SearchRequest {
            vector,
            limit,
            with_payload: true,
            filter,
        };

        let path = format!("/collections/{}/points/search", self.collection);
        let hits: Vec<ScoredPointWire> = self.send_json(HttpMethod::Post, &path, &request)?;

        debug!("Search returned {} hits", hits.len());

        Ok(hits
            .into_iter()
            .map(|hit| ScoredHit {
                payload: hit.payload,
                score: hit.score,
            })
            .collect())
    }

    #[inline]
    fn collection_info(&self) -> Result<CollectionInfo> {
        self.get_json(&format!("/collections/{}", self.collection))
    }
}
