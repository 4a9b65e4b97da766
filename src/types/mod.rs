//! Core types for the attack graph kernel.

pub mod logic;
pub mod network;
pub mod score;
pub mod topology;

pub use logic::{LogicNode, NodeId, NodeLogic, NodeType};
pub use network::{Edge, HostId, HostNode, Layer};
pub use score::{DimensionTriple, ScoreDimension, ScoreError, ScoreTriple};
pub use topology::{
    ArcRecord, HostRecord, LogicTopology, NetworkTopology, SimulationConfig, VertexRecord,
};
