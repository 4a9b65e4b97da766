//! Model-driven family: layered network graph analytics.
//!
//! Pipeline: topology document → [`NetworkGraphBuilder`] →
//! [`NetworkGraph`] → [`MetricsEngine`]. The engine enumerates attack
//! paths backward from a target to a goal, builds the all-pairs
//! shortest-path table lazily, and derives degree, closeness,
//! betweenness, and spectral centrality from it.

pub mod centrality;
pub mod graph;
pub mod metrics;
pub mod paths;
pub mod shortest;
pub mod spectral;

use thiserror::Error;

use crate::types::HostId;

/// Error raised by the analytics engines.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MetricsError {
    /// A host id was not present in the graph.
    #[error("unknown host {0}")]
    UnknownHost(HostId),
    /// The analysis deadline expired mid-computation.
    #[error("analysis deadline exceeded after {completed} of {total} units")]
    DeadlineExceeded {
        /// Work units finished before expiry.
        completed: usize,
        /// Work units requested.
        total: usize,
    },
    /// The spectral system could not be solved.
    #[error("spectral computation failed: {0}")]
    Spectral(String),
}

pub use centrality::{betweenness_centrality, closeness_centrality, degree_centrality};
pub use graph::{NetworkBuildError, NetworkGraph, NetworkGraphBuilder};
pub use metrics::{
    AttackPathReport, CentralityReport, HostCentrality, MetricsEngine, PathRecord,
    VulnerableHostStats,
};
pub use paths::{AttackPath, PathEnumerator};
pub use shortest::{PathCost, ShortestPathTable};
pub use spectral::SpectralScores;
