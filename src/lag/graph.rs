//! Built logical attack graph container.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::types::{LogicNode, NodeId};

/// A built logical attack graph, keyed by node id.
///
/// Uses a BTreeMap for deterministic iteration order. Constructed by the
/// builder; node scores are mutated only during propagation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LogicGraph {
    nodes: BTreeMap<NodeId, LogicNode>,
}

impl LogicGraph {
    pub(crate) fn from_nodes(nodes: BTreeMap<NodeId, LogicNode>) -> Self {
        Self { nodes }
    }

    /// Fetch a node by id.
    pub fn get(&self, id: NodeId) -> Option<&LogicNode> {
        self.nodes.get(&id)
    }

    pub(crate) fn get_mut(&mut self, id: NodeId) -> Option<&mut LogicNode> {
        self.nodes.get_mut(&id)
    }

    /// Iterate all nodes in id order.
    pub fn nodes(&self) -> impl Iterator<Item = &LogicNode> {
        self.nodes.values()
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the graph has no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Total number of edges.
    pub fn edge_count(&self) -> usize {
        self.nodes.values().map(|n| n.out_edges.len()).sum()
    }
}
