//! # veritext-runtime
//!
//! The non-deterministic half of the veritext pipeline, kept strictly apart
//! from the deterministic judge in `veritext-core`.
//!
//! ## Architecture
//!
//! ```text
//! text ──> Proposer (LLM) ──> RawRecord ──> conform ──> ExtractedRecord
//!                                             │
//!                                   verbatim-evidence check,
//!                                   type coercion, contract
//!                                             │
//!                                             ▼
//!                              Validator (veritext-core) ──> Report
//! ```
//!
//! The proposer may hallucinate, drift, or fail; everything it returns is
//! re-checked deterministically before validation. The `Pipeline` fans
//! extraction out over a batch with bounded concurrency while preserving
//! input order.
//!
//! ## Features
//!
//! - `openai`: HTTP provider for the OpenAI chat-completions API.

pub mod cache;
pub mod extractor;
pub mod pipeline;
pub mod prompts;
pub mod proposer;
pub mod providers;

pub use cache::ProposalCache;
pub use extractor::{conform, ExtractError, Extractor};
pub use pipeline::{Pipeline, Report, RunSummary, DEFAULT_CONCURRENCY};
pub use proposer::{LlmProposer, ProposeError, Proposer, RawField, RawRecord};
pub use providers::{
    ApiCredential, ChatMessage, CompletionConfig, CompletionResponse, CredentialSource,
    LlmProvider, ProviderError, TokenUsage,
};

#[cfg(feature = "openai")]
pub use providers::{OpenAiProvider, OPENAI_API_KEY_ENV};
