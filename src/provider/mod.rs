//! Vulnerability score lookup backends.

pub mod cached;
pub mod memory;

use async_trait::async_trait;

use crate::types::ScoreTriple;

/// Trait for vulnerability score lookup backends.
///
/// `Ok(None)` means the identifier has no recorded score; callers fall
/// back to the certain default triple. All methods are async to support
/// async datastore access.
#[async_trait]
pub trait ScoreProvider: Send + Sync {
    /// Error type for lookup operations.
    type Error: std::error::Error + Send + Sync;

    /// Fetch the score triple recorded for a vulnerability identifier.
    async fn score(&self, vuln_id: &str) -> Result<Option<ScoreTriple>, Self::Error>;
}

pub use cached::CachedScoreProvider;
pub use memory::InMemoryScoreProvider;
