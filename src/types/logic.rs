//! Node types for the logical attack graph.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::types::score::ScoreTriple;

/// Unique identifier for a node in the logical attack graph.
///
/// Wraps the integer id from the topology document and implements `Ord`
/// for deterministic ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeId(u64);

impl NodeId {
    /// Create a new NodeId.
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Get the inner integer.
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for NodeId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

/// Combination logic applied when predecessor contributions arrive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeLogic {
    /// All predecessors must hold; scores multiply.
    And,
    /// Any predecessor suffices; scores combine by the union formula.
    Or,
    /// Pass-through of a single line of derivation; scores multiply.
    Flow,
    /// No predecessors; the node carries its own assigned score.
    Leaf,
}

impl NodeLogic {
    /// Parse a logic tag from topology input. An absent tag means leaf.
    pub fn from_tag(tag: Option<&str>) -> Option<Self> {
        match tag {
            None => Some(Self::Leaf),
            Some(s) => match s.to_uppercase().as_str() {
                "AND" => Some(Self::And),
                "OR" => Some(Self::Or),
                "FLOW" => Some(Self::Flow),
                "LEAF" => Some(Self::Leaf),
                _ => None,
            },
        }
    }
}

impl Default for NodeLogic {
    fn default() -> Self {
        Self::Leaf
    }
}

impl fmt::Display for NodeLogic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::And => write!(f, "AND"),
            Self::Or => write!(f, "OR"),
            Self::Flow => write!(f, "FLOW"),
            Self::Leaf => write!(f, "LEAF"),
        }
    }
}

/// Classification of a node's role in the derivation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeType {
    /// Ground fact; seeds propagation with its own score.
    PrimitiveFact,
    /// Interaction rule applied to facts.
    Derivation,
    /// Fact derived by one or more rules.
    Derived,
}

impl Default for NodeType {
    fn default() -> Self {
        Self::PrimitiveFact
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PrimitiveFact => write!(f, "Primitive Fact"),
            Self::Derivation => write!(f, "Derivation"),
            Self::Derived => write!(f, "Derived Fact"),
        }
    }
}

/// A node of the logical attack graph.
///
/// Created by the builder from topology input, mutated only by score
/// propagation, immutable once its pending count reaches zero.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogicNode {
    /// Unique node identifier.
    pub id: NodeId,
    /// Free-text description from the topology document.
    pub description: String,
    /// Combination logic for incoming contributions.
    pub logic: NodeLogic,
    /// Role classification derived from description and logic.
    pub node_type: NodeType,
    /// Score accumulator; the final derived score once the node is ready.
    pub scores: ScoreTriple,
    /// Successor node ids, in topology order.
    pub out_edges: Vec<NodeId>,
    /// Unresolved predecessor contributions still required.
    pub pending_count: u32,
    /// Total condition units contributed by predecessors.
    pub total_conditions: u64,
    /// Number of contributing derivation (rule) predecessors.
    pub rule_conditions: u64,
    /// Whether this derivation grants code execution.
    pub exec_code: bool,
}

impl LogicNode {
    /// Create a node with default scores and empty adjacency.
    pub fn new(id: NodeId, description: String, logic: NodeLogic, node_type: NodeType) -> Self {
        Self {
            id,
            description,
            logic,
            node_type,
            scores: ScoreTriple::CERTAIN,
            out_edges: Vec::new(),
            pending_count: 0,
            total_conditions: 0,
            rule_conditions: 0,
            exec_code: false,
        }
    }
}
