//! Dependency-counted score propagation.
//!
//! A topological reduction, not a DFS: a node fires exactly once, the
//! instant all of its predecessors have contributed, independent of
//! visitation order.

use std::collections::{BTreeSet, VecDeque};
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use super::graph::LogicGraph;
use crate::types::{NodeId, NodeLogic, NodeType, ScoreTriple};

/// Error raised during score propagation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PropagationError {
    /// A primitive fact received a contribution; leaves have no inputs.
    #[error("primitive fact {0} received a contribution")]
    LeafContribution(NodeId),
    /// A contribution addressed an id missing from the graph.
    #[error("contribution addressed unknown node {0}")]
    UnknownNode(NodeId),
    /// A node received more contributions than its recorded in-degree,
    /// which would make it fire twice.
    #[error("node {0} received a contribution after firing")]
    ExtraContribution(NodeId),
    /// Nodes never became ready: a cycle, an inputless derivation, or
    /// anything downstream of one.
    #[error("propagation stalled; {} nodes never resolved", nodes.len())]
    Stalled {
        /// The unresolved node ids, sorted.
        nodes: Vec<NodeId>,
    },
}

/// Outcome of one propagation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropagationReport {
    /// Wall-clock duration of the whole reduction.
    pub elapsed: Duration,
    /// Number of nodes that fired.
    pub fired: usize,
}

/// One score delivery along an edge.
struct Contribution {
    target: NodeId,
    scores: ScoreTriple,
    conditions: u64,
    from_rule: bool,
}

/// Reduce the graph: every node's accumulator becomes its derived score.
///
/// Seeds the queue with all primitive facts, then delivers one
/// contribution per edge. O(V+E).
pub fn propagate(graph: &mut LogicGraph) -> Result<PropagationReport, PropagationError> {
    let started = Instant::now();
    let mut queue: VecDeque<Contribution> = VecDeque::new();
    let mut fired: BTreeSet<NodeId> = BTreeSet::new();

    let seeds: Vec<NodeId> = graph
        .nodes()
        .filter(|n| n.node_type == NodeType::PrimitiveFact)
        .map(|n| n.id)
        .collect();
    for id in seeds {
        if let Some(node) = graph.get(id) {
            fired.insert(id);
            for &successor in &node.out_edges {
                queue.push_back(Contribution {
                    target: successor,
                    scores: node.scores,
                    conditions: 1,
                    from_rule: false,
                });
            }
        }
    }

    while let Some(contribution) = queue.pop_front() {
        let outcome = {
            let node = graph
                .get_mut(contribution.target)
                .ok_or(PropagationError::UnknownNode(contribution.target))?;
            node.pending_count = node
                .pending_count
                .checked_sub(1)
                .ok_or(PropagationError::ExtraContribution(contribution.target))?;
            node.total_conditions += contribution.conditions;
            if contribution.from_rule {
                node.rule_conditions += 1;
            }
            match node.logic {
                NodeLogic::Leaf => {
                    return Err(PropagationError::LeafContribution(contribution.target))
                }
                NodeLogic::And | NodeLogic::Flow => node.scores.multiply(&contribution.scores),
                NodeLogic::Or => node.scores.multiply_complement(&contribution.scores),
            }
            if node.pending_count == 0 {
                if node.logic == NodeLogic::Or {
                    node.scores.complement();
                }
                Some((
                    node.scores,
                    node.out_edges.clone(),
                    node.node_type == NodeType::Derivation,
                ))
            } else {
                None
            }
        };

        if let Some((scores, successors, from_rule)) = outcome {
            // Underflow above guarantees a node reaches zero at most once.
            fired.insert(contribution.target);
            for successor in successors {
                queue.push_back(Contribution {
                    target: successor,
                    scores,
                    conditions: 1,
                    from_rule,
                });
            }
        }
    }

    let stalled: Vec<NodeId> = graph
        .nodes()
        .filter(|n| !fired.contains(&n.id) || n.pending_count > 0)
        .map(|n| n.id)
        .collect();
    if !stalled.is_empty() {
        return Err(PropagationError::Stalled { nodes: stalled });
    }

    let report = PropagationReport {
        elapsed: started.elapsed(),
        fired: fired.len(),
    };
    info!(
        fired = report.fired,
        elapsed_ms = report.elapsed.as_millis() as u64,
        "propagation complete"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lag::builder::GraphBuilder;
    use crate::provider::InMemoryScoreProvider;
    use crate::types::{ArcRecord, LogicTopology, VertexRecord};
    use std::sync::Arc;

    async fn build(vertices: Vec<VertexRecord>, arcs: Vec<ArcRecord>) -> LogicGraph {
        let builder = GraphBuilder::new(Arc::new(
            InMemoryScoreProvider::new()
                .with_score("CVE-2000-0001", ScoreTriple::uniform(0.5).unwrap())
                .with_score("CVE-2000-0002", ScoreTriple::uniform(0.8).unwrap()),
        ));
        builder
            .build(&LogicTopology {
                vertices,
                arcs,
                simulation: None,
            })
            .await
            .unwrap()
    }

    fn leaf(id: u64, cve: &str) -> VertexRecord {
        VertexRecord::new(id, None, format!("vulExists(host, '{cve}')"))
    }

    #[tokio::test]
    async fn and_node_multiplies_children() {
        let mut graph = build(
            vec![
                leaf(1, "CVE-2000-0001"),
                leaf(2, "CVE-2000-0002"),
                VertexRecord::new(3, Some("AND"), "both"),
            ],
            vec![ArcRecord::new(1, 3), ArcRecord::new(2, 3)],
        )
        .await;
        let report = propagate(&mut graph).unwrap();

        let scores = graph.get(NodeId::new(3)).unwrap().scores;
        assert!((scores.base - 0.4).abs() < 1e-12);
        assert!((scores.exploitability - 0.4).abs() < 1e-12);
        assert!((scores.impact - 0.4).abs() < 1e-12);
        assert_eq!(report.fired, 3);
    }

    #[tokio::test]
    async fn or_node_applies_union_formula() {
        let mut graph = build(
            vec![
                leaf(1, "CVE-2000-0001"),
                leaf(2, "CVE-2000-0002"),
                VertexRecord::new(3, Some("OR"), "either"),
            ],
            vec![ArcRecord::new(1, 3), ArcRecord::new(2, 3)],
        )
        .await;
        propagate(&mut graph).unwrap();

        // 1 − (1 − 0.5)(1 − 0.8) = 0.9
        let scores = graph.get(NodeId::new(3)).unwrap().scores;
        assert!((scores.base - 0.9).abs() < 1e-12);
    }

    #[tokio::test]
    async fn flow_passes_scores_through() {
        let mut graph = build(
            vec![
                leaf(1, "CVE-2000-0002"),
                VertexRecord::new(2, Some("FLOW"), "relay"),
            ],
            vec![ArcRecord::new(1, 2)],
        )
        .await;
        propagate(&mut graph).unwrap();
        assert!((graph.get(NodeId::new(2)).unwrap().scores.base - 0.8).abs() < 1e-12);
    }

    #[tokio::test]
    async fn single_or_child_keeps_its_probability() {
        let mut graph = build(
            vec![leaf(1, "CVE-2000-0001"), VertexRecord::new(2, Some("OR"), "one")],
            vec![ArcRecord::new(1, 2)],
        )
        .await;
        propagate(&mut graph).unwrap();
        // 1 − (1 − 0.5) = 0.5: the complement is applied exactly once.
        assert!((graph.get(NodeId::new(2)).unwrap().scores.base - 0.5).abs() < 1e-12);
    }

    #[tokio::test]
    async fn deep_chain_fires_every_node_once() {
        let mut graph = build(
            vec![
                leaf(1, "CVE-2000-0001"),
                leaf(2, "CVE-2000-0002"),
                VertexRecord::new(3, Some("AND"), "RULE 1 (combine)"),
                VertexRecord::new(4, Some("OR"), "reached"),
                VertexRecord::new(5, Some("FLOW"), "relay"),
            ],
            vec![
                ArcRecord::new(1, 3),
                ArcRecord::new(2, 3),
                ArcRecord::new(3, 4),
                ArcRecord::new(4, 5),
            ],
        )
        .await;
        let report = propagate(&mut graph).unwrap();
        assert_eq!(report.fired, 5);

        // AND: 0.4; OR over one input: 0.4; FLOW: 0.4.
        for id in [3, 4, 5] {
            assert!((graph.get(NodeId::new(id)).unwrap().scores.base - 0.4).abs() < 1e-12);
        }
        for node in graph.nodes() {
            assert_eq!(node.pending_count, 0, "node {} still pending", node.id);
        }
    }

    #[tokio::test]
    async fn condition_and_rule_tallies_accumulate() {
        let mut graph = build(
            vec![
                leaf(1, "CVE-2000-0001"),
                leaf(2, "CVE-2000-0002"),
                VertexRecord::new(3, Some("AND"), "RULE 1 (combine)"),
                VertexRecord::new(4, Some("OR"), "derived"),
            ],
            vec![
                ArcRecord::new(1, 3),
                ArcRecord::new(2, 3),
                ArcRecord::new(3, 4),
                ArcRecord::new(1, 4),
            ],
        )
        .await;
        propagate(&mut graph).unwrap();

        let rule = graph.get(NodeId::new(3)).unwrap();
        assert_eq!(rule.total_conditions, 2);
        assert_eq!(rule.rule_conditions, 0);

        let derived = graph.get(NodeId::new(4)).unwrap();
        assert_eq!(derived.total_conditions, 2);
        assert_eq!(derived.rule_conditions, 1);
    }

    #[tokio::test]
    async fn cycle_is_rejected_with_sorted_ids() {
        let mut graph = build(
            vec![
                VertexRecord::new(7, Some("AND"), "b"),
                VertexRecord::new(3, Some("AND"), "a"),
            ],
            vec![ArcRecord::new(3, 7), ArcRecord::new(7, 3)],
        )
        .await;
        let err = propagate(&mut graph).unwrap_err();
        assert_eq!(
            err,
            PropagationError::Stalled {
                nodes: vec![NodeId::new(3), NodeId::new(7)],
            }
        );
    }

    #[tokio::test]
    async fn inputless_derivation_stalls() {
        let mut graph = build(
            vec![
                VertexRecord::new(1, Some("AND"), "RULE 1 (no inputs)"),
                VertexRecord::new(2, Some("OR"), "downstream"),
            ],
            vec![ArcRecord::new(1, 2)],
        )
        .await;
        let err = propagate(&mut graph).unwrap_err();
        assert_eq!(
            err,
            PropagationError::Stalled {
                nodes: vec![NodeId::new(1), NodeId::new(2)],
            }
        );
    }

    #[tokio::test]
    async fn contribution_beyond_the_in_degree_is_rejected() {
        let mut graph = build(
            vec![
                leaf(1, "CVE-2000-0001"),
                leaf(2, "CVE-2000-0002"),
                VertexRecord::new(3, Some("AND"), "both"),
            ],
            vec![ArcRecord::new(1, 3), ArcRecord::new(2, 3)],
        )
        .await;
        // An understated counter makes the second delivery arrive after
        // the node has already fired.
        graph.get_mut(NodeId::new(3)).unwrap().pending_count = 1;
        let err = propagate(&mut graph).unwrap_err();
        assert_eq!(err, PropagationError::ExtraContribution(NodeId::new(3)));
    }

    #[tokio::test]
    async fn contribution_into_leaf_is_rejected() {
        let mut graph = build(
            vec![leaf(1, "CVE-2000-0001"), leaf(2, "CVE-2000-0002")],
            vec![ArcRecord::new(1, 2)],
        )
        .await;
        let err = propagate(&mut graph).unwrap_err();
        assert_eq!(err, PropagationError::LeafContribution(NodeId::new(2)));
    }

    #[tokio::test]
    async fn empty_graph_is_a_valid_no_op() {
        let mut graph = build(vec![], vec![]).await;
        let report = propagate(&mut graph).unwrap();
        assert_eq!(report.fired, 0);
    }

    #[tokio::test]
    async fn repeated_runs_are_deterministic() {
        let vertices = vec![
            leaf(1, "CVE-2000-0001"),
            leaf(2, "CVE-2000-0002"),
            VertexRecord::new(3, Some("AND"), "RULE 1 (combine)"),
            VertexRecord::new(4, Some("OR"), "derived"),
        ];
        let arcs = vec![
            ArcRecord::new(1, 3),
            ArcRecord::new(2, 3),
            ArcRecord::new(3, 4),
            ArcRecord::new(2, 4),
        ];

        let mut reference = build(vertices.clone(), arcs.clone()).await;
        propagate(&mut reference).unwrap();
        for _ in 0..20 {
            let mut graph = build(vertices.clone(), arcs.clone()).await;
            propagate(&mut graph).unwrap();
            for (a, b) in graph.nodes().zip(reference.nodes()) {
                assert_eq!(a.id, b.id);
                assert_eq!(a.scores, b.scores);
            }
        }
    }
}
