//! The proposer: the non-deterministic half of the pipeline.
//!
//! A [`Proposer`] turns free text plus a schema into a [`RawRecord`] of
//! claimed values, evidence spans, and confidence scores. Nothing here is
//! trusted: the extractor re-checks every claim deterministically before a
//! record is validated.

use crate::cache::ProposalCache;
use crate::prompts;
use crate::providers::{ChatMessage, CompletionConfig, LlmProvider, ProviderError};
use async_trait::async_trait;
use backon::{ExponentialBuilder, Retryable};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use veritext_core::Schema;

/// One field as claimed by the model, before any checking.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawField {
    /// Claimed value; `null` means not found
    #[serde(default)]
    pub value: JsonValue,

    /// Claimed verbatim source span backing the value
    #[serde(default)]
    pub evidence: Option<String>,

    /// Claimed confidence in [0.0, 1.0] (not yet checked)
    #[serde(default)]
    pub confidence: f64,
}

/// A full proposal: field name to claimed field.
///
/// Fields outside the schema may appear here; the extractor drops them.
pub type RawRecord = HashMap<String, RawField>;

/// Errors producing a proposal.
#[derive(Error, Debug)]
pub enum ProposeError {
    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error("model returned invalid JSON: {message}")]
    InvalidJson { message: String, snippet: String },

    #[error("model returned an empty response")]
    EmptyResponse,
}

/// Strategy for producing raw proposals.
///
/// The abstraction exists so the pipeline can be exercised without a
/// network: tests substitute scripted proposers.
#[async_trait]
pub trait Proposer: Send + Sync {
    async fn propose(&self, text: &str, schema: &Schema) -> Result<RawRecord, ProposeError>;
}

/// Proposer backed by an [`LlmProvider`].
pub struct LlmProposer {
    provider: Arc<dyn LlmProvider>,
    config: CompletionConfig,
    cache: Option<ProposalCache>,
    max_retries: usize,
}

impl LlmProposer {
    pub fn new(provider: Arc<dyn LlmProvider>) -> Self {
        Self {
            provider,
            config: CompletionConfig::default(),
            cache: None,
            max_retries: 3,
        }
    }

    /// Override the completion configuration (model, timeout, tokens).
    pub fn with_config(mut self, config: CompletionConfig) -> Self {
        self.config = config;
        self
    }

    /// Attach a proposal cache.
    pub fn with_cache(mut self, cache: ProposalCache) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Set the number of retry attempts for transient provider failures.
    pub fn with_max_retries(mut self, max_retries: usize) -> Self {
        self.max_retries = max_retries;
        self
    }

    async fn complete_with_retry(
        &self,
        messages: &[ChatMessage],
    ) -> Result<String, ProposeError> {
        let provider = self.provider.name().to_string();
        let response = (|| async { self.provider.complete(messages.to_vec(), &self.config).await })
            .retry(ExponentialBuilder::default().with_max_times(self.max_retries))
            .when(ProviderError::is_retryable)
            .notify(|err: &ProviderError, delay| {
                tracing::warn!(
                    provider = %provider,
                    error = %err,
                    delay_ms = delay.as_millis() as u64,
                    "transient provider failure, retrying"
                );
            })
            .await?;

        tracing::debug!(
            provider = %self.provider.name(),
            model = %response.model,
            tokens = response.usage.total(),
            "completion received"
        );

        if response.content.trim().is_empty() {
            return Err(ProposeError::EmptyResponse);
        }
        Ok(response.content)
    }
}

/// Strip Markdown code fences some models wrap JSON in.
fn strip_code_fences(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Skip the language tag on the opening fence, if any.
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

fn parse_proposal(content: &str) -> Result<RawRecord, ProposeError> {
    let stripped = strip_code_fences(content);
    serde_json::from_str(stripped).map_err(|e| ProposeError::InvalidJson {
        message: e.to_string(),
        snippet: stripped.chars().take(120).collect(),
    })
}

#[async_trait]
impl Proposer for LlmProposer {
    async fn propose(&self, text: &str, schema: &Schema) -> Result<RawRecord, ProposeError> {
        let cache_key = ProposalCache::key(text, schema);
        if let Some(cache) = &self.cache {
            if let Some(hit) = cache.get(&cache_key).await {
                tracing::debug!(key = %cache_key, "proposal cache hit");
                return Ok(hit);
            }
        }

        let messages = vec![
            ChatMessage::system(prompts::extraction_prompt(schema)),
            ChatMessage::user(text),
        ];

        let content = self.complete_with_retry(&messages).await?;
        let record = parse_proposal(&content)?;

        if let Some(cache) = &self.cache {
            cache.insert(cache_key, record.clone()).await;
        }
        Ok(record)
    }
}
