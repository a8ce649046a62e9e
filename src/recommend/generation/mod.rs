// Generation client
// Drives the external generation backend under an explicit, bounded
// retry policy. The policy is plain data so it can be exercised against a
// fake clock; the backend is a capability trait so tests never need a
// live model server.


use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};
use url::Url;

use crate::config::OllamaConfig;
use crate::{RagError, Result};

const DEFAULT_TIMEOUT_SECONDS: u64 = 120;

/// Sampling temperature for recommendation generation.
const GENERATION_TEMPERATURE: f32 = 0.7;
/// Output length cap, in tokens.
const MAX_OUTPUT_TOKENS: u32 = 1024;

/// Fixed system instruction for every generation request.
pub const SYSTEM_PROMPT: &str = "You are a knowledgeable nutrition advisor who provides evidence-based dietary recommendations grounded in clinical guidelines from AHA, ADA, and DASH. You are not a doctor and always recommend consulting healthcare providers for medical decisions.";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    #[inline]
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    #[inline]
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// One blocking round-trip to a generation backend.
pub trait ChatBackend {
    fn chat(&self, messages: &[ChatMessage]) -> Result<String>;
}

impl<T: ChatBackend + ?Sized> ChatBackend for &T {
    #[inline]
    fn chat(&self, messages: &[ChatMessage]) -> Result<String> {
        (**self).chat(messages)
    }
}

/// Bounded retry policy: up to `max_attempts` total attempts, with the
/// delay before attempt `n` growing exponentially between a floor and a
/// ceiling (attempt 2 waits 2s, attempt 3 waits 4s, later attempts are
/// capped at 10s).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub min_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    #[inline]
    fn default() -> Self {
        Self {
            max_attempts: 3,
            min_delay: Duration::from_secs(2),
            max_delay: Duration::from_secs(10),
        }
    }
}

impl RetryPolicy {
    /// Delay to sleep before attempt `attempt` (1-based; the first attempt
    /// never waits).
    #[inline]
    pub fn delay_before(&self, attempt: u32) -> Duration {
        if attempt <= 1 {
            return Duration::ZERO;
        }
        let exponential = Duration::from_secs(2u64.saturating_pow(attempt - 1));
        exponential.clamp(self.min_delay, self.max_delay)
    }
}

/// Invokes a [`ChatBackend`] under the retry policy.
pub struct GenerationClient<B> {
    backend: B,
    policy: RetryPolicy,
    sleeper: Box<dyn Fn(Duration) + Send + Sync>,
}

impl<B: ChatBackend> GenerationClient<B> {
    #[inline]
    pub fn new(backend: B, policy: RetryPolicy) -> Self {
        Self {
            backend,
            policy,
            sleeper: Box::new(std::thread::sleep),
        }
    }

    /// Replace the sleep hook. Tests install a recording no-op clock.
    #[inline]
    pub fn with_sleeper(mut self, sleeper: impl Fn(Duration) + Send + Sync + 'static) -> Self {
        self.sleeper = Box::new(sleeper);
        self
    }

    /// Generate text for the assembled prompt, retrying failed attempts
    /// per the policy. Exhausting every attempt surfaces the last failure;
    /// there is no fallback value.
    #[inline]
    pub fn generate(&self, prompt: &str) -> Result<String> {
        let messages = [
            ChatMessage::system(SYSTEM_PROMPT),
            ChatMessage::user(prompt),
        ];

        let mut last_error = None;

        for attempt in 1..=self.policy.max_attempts {
            if attempt > 1 {
                let delay = self.policy.delay_before(attempt);
                warn!(
                    "Retrying generation (attempt {}/{}) after {:?}",
                    attempt, self.policy.max_attempts, delay
                );
                (self.sleeper)(delay);
            }

            match self.backend.chat(&messages) {
                Ok(text) => {
                    debug!("Generation succeeded on attempt {}", attempt);
                    return Ok(text);
                }
                Err(e) => {
                    warn!("Generation attempt {} failed: {}", attempt, e);
                    last_error = Some(e);
                }
            }
        }

        error!(
            "Generation failed after {} attempts",
            self.policy.max_attempts
        );

        Err(last_error.unwrap_or_else(|| {
            RagError::Generation("generation failed before any attempt was made".to_string())
        }))
    }
}

/// Ollama chat backend.
#[derive(Debug, Clone)]
pub struct OllamaChat {
    base_url: Url,
    model: String,
    agent: ureq::Agent,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    stream: bool,
    options: ChatOptions,
}

#[derive(Debug, Serialize)]
struct ChatOptions {
    temperature: f32,
    num_predict: u32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    message: ChatMessage,
}

impl OllamaChat {
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
            model: config.chat_model.clone(),
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
}

impl ChatBackend for OllamaChat {
    #[inline]
    fn chat(&self, messages: &[ChatMessage]) -> Result<String> {
        debug!(
            "Requesting chat completion from {} ({} messages)",
            self.model,
            messages.len()
        );

        let request = ChatRequest {
            model: &self.model,
            messages,
            stream: false,
            options: ChatOptions {
                temperature: GENERATION_TEMPERATURE,
                num_predict: MAX_OUTPUT_TOKENS,
            },
        };

        let url = self
            .base_url
            .join("/api/chat")
            .map_err(|e| RagError::Generation(format!("Failed to build chat URL: {}", e)))?;

        let request_json = serde_json::to_string(&request)
            .map_err(|e| RagError::Generation(format!("Failed to serialize request: {}", e)))?;

        let response_text = self
            .agent
            .post(url.as_str())
            .header("Content-Type", "application/json")
            .send(&request_json)
            .and_then(|mut resp| resp.body_mut().read_to_string())
            .map_err(|e| RagError::Generation(format!("Chat request failed: {}", e)))?;

        let response: ChatResponse = serde_json::from_str(&response_text)
            .map_err(|e| RagError::Generation(format!("Failed to parse chat response: {}", e)))?;

        Ok(response.message.content)
    }
}
