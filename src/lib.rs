//! # attack-graph-kernel
//!
//! Risk scoring and graph analytics for attack graphs.
//!
//! The kernel answers two questions:
//!
//! > Given a logical attack graph and leaf probabilities, what is every
//! > node's derived risk score?
//!
//! > Given a layered host graph, which attack paths exist and how
//! > central is each host to them?
//!
//! ## Architecture
//!
//! ```text
//! data-driven:   LogicTopology → GraphBuilder → LogicGraph → propagate → LagSummary
//! model-driven:  NetworkTopology → NetworkGraphBuilder → NetworkGraph → MetricsEngine
//!                                                         (paths, shortest-path table,
//!                                                          centrality, spectral)
//! ```
//!
//! The two families are independent and share no runtime state beyond
//! the [`provider::ScoreProvider`] seam and the score-triple vocabulary.
//!
//! ## Guarantees
//!
//! - A logic node fires exactly once, the instant its last predecessor
//!   contributes; stalls (cycles, inputless derivations) are reported,
//!   never silently defaulted.
//! - Probabilities outside [0, 1] are rejected at the boundary, not
//!   clamped.
//! - All graph snapshots are immutable during metrics computation;
//!   iteration orders are deterministic.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod export;
pub mod lag;
pub mod model;
pub mod provider;
pub mod types;

// Re-exports
pub use config::{AnalysisConfig, DEFAULT_TOP_PATHS};
pub use export::{
    round3, EdgeExport, HostEdgeExport, HostExport, LogicGraphExport, NetworkGraphExport,
    NodeExport, PropagationExport,
};
pub use lag::{
    propagate, BuildError, GraphBuilder, LagSummary, LogicGraph, PropagationError,
    PropagationReport,
};
pub use model::{
    AttackPath, AttackPathReport, CentralityReport, HostCentrality, MetricsEngine, MetricsError,
    NetworkBuildError, NetworkGraph, NetworkGraphBuilder, PathCost, PathEnumerator, PathRecord,
    ShortestPathTable, SpectralScores, VulnerableHostStats,
};
pub use provider::{CachedScoreProvider, InMemoryScoreProvider, ScoreProvider};
pub use types::{
    ArcRecord, DimensionTriple, Edge, HostId, HostNode, HostRecord, Layer, LogicNode,
    LogicTopology, NetworkTopology, NodeId, NodeLogic, NodeType, ScoreDimension, ScoreError,
    ScoreTriple, SimulationConfig, VertexRecord,
};

/// Schema version for all exported shapes.
/// Increment on breaking changes to any export type.
pub const EXPORT_SCHEMA_VERSION: &str = "1.0.0";
