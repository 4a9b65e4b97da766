//! Analysis configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default number of paths kept in ranked attack-path lists.
pub const DEFAULT_TOP_PATHS: usize = 5;

/// Tunable parameters for one analysis session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Wall-clock budget for the all-pairs shortest-path computation and
    /// the spectral step. `None` means unbounded.
    pub deadline: Option<Duration>,
    /// Number of paths kept in the ranked exploitability/impact lists.
    pub top_paths: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            deadline: None,
            top_paths: DEFAULT_TOP_PATHS,
        }
    }
}

impl AnalysisConfig {
    /// Config with a deadline applied to the expensive phases.
    pub fn with_deadline(deadline: Duration) -> Self {
        Self {
            deadline: Some(deadline),
            ..Self::default()
        }
    }

    /// Minimal config for tests: tiny ranked lists, no deadline.
    #[cfg(test)]
    pub fn minimal() -> Self {
        Self {
            deadline: None,
            top_paths: 2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_keeps_five_paths_unbounded() {
        let config = AnalysisConfig::default();
        assert_eq!(config.top_paths, DEFAULT_TOP_PATHS);
        assert!(config.deadline.is_none());
    }

    #[test]
    fn with_deadline_sets_budget() {
        let config = AnalysisConfig::with_deadline(Duration::from_millis(250));
        assert_eq!(config.deadline, Some(Duration::from_millis(250)));
        assert_eq!(config.top_paths, DEFAULT_TOP_PATHS);
    }
}
