//! Summary metrics over a propagated logical attack graph.

use serde::{Deserialize, Serialize};

use super::graph::LogicGraph;
use crate::types::{DimensionTriple, LogicNode, NodeId, NodeType};

/// Aggregate statistics over one propagated graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LagSummary {
    /// Total node count.
    pub node_count: usize,
    /// Percentage of exec-code derivations among all nodes.
    pub exec_code_percentage: f64,
    /// Percentage of derivation (rule) nodes among all nodes.
    pub rule_percentage: f64,
    /// Percentage of derived-fact nodes among all nodes.
    pub derived_percentage: f64,
    /// Per-dimension Shannon entropy of the derived scores.
    pub score_entropy: DimensionTriple,
}

/// Per-node tally of condition or rule contributions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeTally {
    /// The tallied node.
    pub id: NodeId,
    /// Accumulated count.
    pub count: u64,
}

/// Summarize a propagated graph. All ratios guard the empty graph.
pub fn summarize(graph: &LogicGraph) -> LagSummary {
    let total = graph.len();
    let exec_code = graph.nodes().filter(|n| n.exec_code).count();
    let rules = count_of_type(graph, NodeType::Derivation);
    let derived = count_of_type(graph, NodeType::Derived);
    LagSummary {
        node_count: total,
        exec_code_percentage: percentage(exec_code, total),
        rule_percentage: percentage(rules, total),
        derived_percentage: percentage(derived, total),
        score_entropy: score_entropy(graph),
    }
}

/// Per-dimension Shannon entropy `−Σ p·log2(p)` over all node scores.
///
/// Zero-probability terms contribute nothing.
pub fn score_entropy(graph: &LogicGraph) -> DimensionTriple {
    let mut entropy = DimensionTriple::default();
    for node in graph.nodes() {
        entropy.base += entropy_term(node.scores.base);
        entropy.exploitability += entropy_term(node.scores.exploitability);
        entropy.impact += entropy_term(node.scores.impact);
    }
    entropy
}

fn entropy_term(p: f64) -> f64 {
    if p > 0.0 {
        -(p * p.log2())
    } else {
        0.0
    }
}

fn percentage(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 / total as f64 * 100.0
    }
}

fn count_of_type(graph: &LogicGraph, node_type: NodeType) -> usize {
    graph.nodes().filter(|n| n.node_type == node_type).count()
}

/// All exec-code derivations, in id order.
pub fn exec_code_nodes(graph: &LogicGraph) -> Vec<&LogicNode> {
    graph.nodes().filter(|n| n.exec_code).collect()
}

/// All derived-fact nodes, in id order.
pub fn derived_nodes(graph: &LogicGraph) -> Vec<&LogicNode> {
    graph
        .nodes()
        .filter(|n| n.node_type == NodeType::Derived)
        .collect()
}

/// Condition totals for every derived-fact node.
pub fn conditions_per_derived_node(graph: &LogicGraph) -> Vec<NodeTally> {
    tally(derived_nodes(graph), |n| n.total_conditions)
}

/// Condition totals for every exec-code node.
pub fn conditions_per_exec_code_node(graph: &LogicGraph) -> Vec<NodeTally> {
    tally(exec_code_nodes(graph), |n| n.total_conditions)
}

/// Rule-contribution totals for every derived-fact node.
pub fn rules_per_derived_node(graph: &LogicGraph) -> Vec<NodeTally> {
    tally(derived_nodes(graph), |n| n.rule_conditions)
}

/// Rule-contribution totals for every exec-code node.
pub fn rules_per_exec_code_node(graph: &LogicGraph) -> Vec<NodeTally> {
    tally(exec_code_nodes(graph), |n| n.rule_conditions)
}

fn tally(nodes: Vec<&LogicNode>, count: impl Fn(&LogicNode) -> u64) -> Vec<NodeTally> {
    nodes
        .into_iter()
        .map(|n| NodeTally {
            id: n.id,
            count: count(n),
        })
        .collect()
}
