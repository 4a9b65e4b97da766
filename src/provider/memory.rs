//! In-memory score provider for testing and embedding.

use std::collections::BTreeMap;
use std::convert::Infallible;

use async_trait::async_trait;

use super::ScoreProvider;
use crate::types::ScoreTriple;

/// In-memory score provider.
///
/// Uses a BTreeMap for deterministic iteration order. Lookups cannot
/// fail; a missing identifier is reported as `None`.
#[derive(Debug, Clone, Default)]
pub struct InMemoryScoreProvider {
    scores: BTreeMap<String, ScoreTriple>,
}

impl InMemoryScoreProvider {
    /// Create a new empty provider.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a score triple for an identifier.
    pub fn insert(&mut self, vuln_id: impl Into<String>, triple: ScoreTriple) {
        self.scores.insert(vuln_id.into(), triple);
    }

    /// Builder-style insertion.
    pub fn with_score(mut self, vuln_id: impl Into<String>, triple: ScoreTriple) -> Self {
        self.insert(vuln_id, triple);
        self
    }

    /// Number of recorded identifiers.
    pub fn len(&self) -> usize {
        self.scores.len()
    }

    /// Whether no identifiers are recorded.
    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }
}

#[async_trait]
impl ScoreProvider for InMemoryScoreProvider {
    type Error = Infallible;

    async fn score(&self, vuln_id: &str) -> Result<Option<ScoreTriple>, Self::Error> {
        Ok(self.scores.get(vuln_id).copied())
    }
}
