// Recommendation pipeline
// End-to-end flow from a validated lab panel to a generated, source-cited
// recommendation: build query -> retrieve -> assemble prompt -> generate.

pub mod generation;
pub mod prompt;
pub mod query;


pub use generation::{ChatBackend, ChatMessage, GenerationClient, OllamaChat, RetryPolicy};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::embeddings::Embedder;
use crate::guideline::GuidelineTag;
use crate::index::VectorIndex;
use crate::{RagError, Result};

/// Shown alongside every recommendation.
pub const MEDICAL_DISCLAIMER: &str = "IMPORTANT DISCLAIMER: This information is for educational purposes only and is not intended as medical advice, diagnosis, or treatment. Always consult with a qualified healthcare provider before making any changes to your diet, exercise, or medication regimen. The recommendations provided are based on general clinical guidelines and may not be appropriate for your specific health situation.";

/// A patient's structured lab values. Every field is optional; a
/// recommendation request must carry at least one present value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabPanel {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub glucose_fasting: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub a1c: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_cholesterol: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ldl: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hdl: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub triglycerides: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub systolic_bp: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diastolic_bp: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bmi: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub egfr: Option<f64>,
}

impl LabPanel {
    /// True when no lab value is present.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.glucose_fasting.is_none()
            && self.a1c.is_none()
            && self.total_cholesterol.is_none()
            && self.ldl.is_none()
            && self.hdl.is_none()
            && self.triglycerides.is_none()
            && self.systolic_bp.is_none()
            && self.diastolic_bp.is_none()
            && self.bmi.is_none()
            && self.egfr.is_none()
    }
}

/// A retrieved guideline passage, alive only for the duration of one
/// request.
#[derive(Debug, Clone, PartialEq)]
pub struct RetrievedContext {
    pub content: String,
    pub source: String,
    pub guideline: GuidelineTag,
    pub score: f32,
}

/// Citation entry in a recommendation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourceRef {
    pub guideline: GuidelineTag,
    pub source: String,
    pub relevance_score: f32,
}

/// Final output of the recommendation pipeline.
#[derive(Debug, Clone, Serialize)]
pub struct RecommendationResult {
    pub recommendation: String,
    pub sources: Vec<SourceRef>,
    /// The panel as received; serializes to exactly its present fields.
    pub lab_panel: LabPanel,
    pub disclaimer: &'static str,
}

/// Composes query building, retrieval, prompt assembly, and generation.
pub struct Recommender<E, V, B> {
    embedder: E,
    index: V,
    generator: GenerationClient<B>,
    top_k: usize,
}

impl<E: Embedder, V: VectorIndex, B: ChatBackend> Recommender<E, V, B> {
    #[inline]
    pub fn new(embedder: E, index: V, generator: GenerationClient<B>, top_k: usize) -> Self {
        Self {
            embedder,
            index,
            generator,
            top_k,
        }
    }

    /// Produce a recommendation for the panel.
    ///
    /// Stages run strictly in order; the first failure is surfaced
    /// unchanged and no stage is skipped or reordered. An empty panel is
    /// rejected before any external service is contacted.
    #[inline]
    pub fn recommend(&self, panel: &LabPanel) -> Result<RecommendationResult> {
        if panel.is_empty() {
            return Err(RagError::Validation(
                "at least one lab value must be provided".to_string(),
            ));
        }

        let contexts = self.retrieve_context(panel)?;
        let prompt = prompt::build_prompt(panel, &contexts);
        let recommendation = self.generator.generate(&prompt)?;

        info!(
            "Generated recommendation from {} retrieved passages",
            contexts.len()
        );

        Ok(RecommendationResult {
            recommendation,
            sources: contexts
                .into_iter()
                .map(|ctx| SourceRef {
                    guideline: ctx.guideline,
                    source: ctx.source,
                    relevance_score: ctx.score,
                })
                .collect(),
            lab_panel: *panel,
            disclaimer: MEDICAL_DISCLAIMER,
        })
    }

    fn retrieve_context(&self, panel: &LabPanel) -> Result<Vec<RetrievedContext>> {
        let query = query::build_query(panel);
        let guidelines = query::relevant_guidelines(panel);
        debug!("Retrieval query: {:?} (guidelines {:?})", query, guidelines);

        let query_vector = self.embedder.embed(&query)?;
        let hits = self.index.search(&query_vector, self.top_k, &guidelines)?;

        Ok(hits
            .into_iter()
            .map(|hit| RetrievedContext {
                content: hit.payload.content,
                source: hit.payload.source,
                guideline: hit.payload.guideline_type,
                score: hit.score,
            })
            .collect())
    }
}
