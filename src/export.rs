//! Flat DTOs mirroring the external API shape.
//!
//! Engine values stay full precision; rounding to three decimals happens
//! only here, at the serialization boundary.

use serde::{Deserialize, Serialize};

use crate::lag::{LogicGraph, PropagationReport};
use crate::model::NetworkGraph;
use crate::types::{HostId, NodeId};

/// Round a score to three decimals for export.
pub fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

/// One exported logic node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeExport {
    /// Node id.
    pub id: NodeId,
    /// Free-text description from the topology.
    pub description: String,
    /// Human-readable classification.
    pub node_type: String,
    /// Derived base score, rounded.
    pub base_score: f64,
    /// Derived exploitability score, rounded.
    pub exploitability_score: f64,
    /// Derived impact score, rounded.
    pub impact_score: f64,
}

/// One exported edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeExport {
    /// Source node id.
    pub source: NodeId,
    /// Target node id.
    pub target: NodeId,
}

/// A propagated logic graph in the external node/edge shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogicGraphExport {
    /// Node list, in id order.
    pub nodes: Vec<NodeExport>,
    /// Edge list, in source-id order.
    pub edges: Vec<EdgeExport>,
}

impl From<&LogicGraph> for LogicGraphExport {
    fn from(graph: &LogicGraph) -> Self {
        let mut nodes = Vec::with_capacity(graph.len());
        let mut edges = Vec::with_capacity(graph.edge_count());
        for node in graph.nodes() {
            nodes.push(NodeExport {
                id: node.id,
                description: node.description.clone(),
                node_type: node.node_type.to_string(),
                base_score: round3(node.scores.base),
                exploitability_score: round3(node.scores.exploitability),
                impact_score: round3(node.scores.impact),
            });
            for &target in &node.out_edges {
                edges.push(EdgeExport {
                    source: node.id,
                    target,
                });
            }
        }
        Self { nodes, edges }
    }
}

/// One exported host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostExport {
    /// Host id.
    pub id: HostId,
    /// Device vendor.
    pub vendor: String,
    /// Device product name.
    pub product: String,
    /// Layer name.
    pub layer: String,
    /// Base weight, rounded.
    pub base_score: f64,
    /// Exploitability weight, rounded.
    pub exploitability_score: f64,
    /// Impact weight, rounded.
    pub impact_score: f64,
}

/// One exported host-graph edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostEdgeExport {
    /// Source host id.
    pub source: HostId,
    /// Target host id.
    pub target: HostId,
}

/// A network graph in the external host/edge shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkGraphExport {
    /// Host list, in id order.
    pub hosts: Vec<HostExport>,
    /// Edge list, in arena order.
    pub edges: Vec<HostEdgeExport>,
}

impl From<&NetworkGraph> for NetworkGraphExport {
    fn from(graph: &NetworkGraph) -> Self {
        let hosts = graph
            .hosts()
            .map(|host| HostExport {
                id: host.id,
                vendor: host.vendor.clone(),
                product: host.product.clone(),
                layer: host.layer.to_string(),
                base_score: round3(host.weights.base),
                exploitability_score: round3(host.weights.exploitability),
                impact_score: round3(host.weights.impact),
            })
            .collect();
        let edges = (0..graph.edges().len())
            .map(|index| {
                let (source, target) = graph.edge_endpoints(index);
                HostEdgeExport { source, target }
            })
            .collect();
        Self { hosts, edges }
    }
}

/// Propagation timing in the external flat shape.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PropagationExport {
    /// Wall-clock duration of the reduction, in seconds.
    pub computation_time: f64,
    /// Number of nodes that fired.
    pub fired: usize,
}

impl From<&PropagationReport> for PropagationExport {
    fn from(report: &PropagationReport) -> Self {
        Self {
            computation_time: report.elapsed.as_secs_f64(),
            fired: report.fired,
        }
    }
}
