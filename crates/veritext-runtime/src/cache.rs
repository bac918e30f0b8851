//! Proposal cache.
//!
//! Proposals are the expensive, non-deterministic half of the pipeline, so
//! re-running the same text against the same schema should not cost another
//! model call. Validation is cheap and deterministic and is never cached.

use crate::proposer::RawRecord;
use moka::future::Cache;
use std::hash::{DefaultHasher, Hash, Hasher};
use veritext_core::Schema;

/// Async cache of raw proposals, keyed by input text and schema shape.
#[derive(Clone)]
pub struct ProposalCache {
    inner: Cache<String, RawRecord>,
}

impl ProposalCache {
    /// Create a cache holding up to `capacity` proposals.
    pub fn new(capacity: u64) -> Self {
        Self {
            inner: Cache::new(capacity),
        }
    }

    /// Cache key for a (text, schema) pair.
    ///
    /// The schema participates so that editing a profile's fields never
    /// serves a proposal made under the old schema.
    pub fn key(text: &str, schema: &Schema) -> String {
        let mut hasher = DefaultHasher::new();
        text.hash(&mut hasher);
        for spec in schema.fields() {
            spec.name.hash(&mut hasher);
            spec.field_type.to_string().hash(&mut hasher);
        }
        format!("{:016x}", hasher.finish())
    }

    pub async fn get(&self, key: &str) -> Option<RawRecord> {
        self.inner.get(key).await
    }

    pub async fn insert(&self, key: String, record: RawRecord) {
        self.inner.insert(key, record).await;
    }

    /// Number of cached proposals (approximate until pending tasks drain).
    pub fn entry_count(&self) -> u64 {
        self.inner.entry_count()
    }
}

impl std::fmt::Debug for ProposalCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProposalCache")
            .field("entries", &self.inner.entry_count())
            .finish()
    }
}
