//! Logical attack graph construction from topology documents.

use std::collections::BTreeMap;
use std::sync::Arc;

use regex_lite::Regex;
use thiserror::Error;
use tracing::{info, warn};

use super::graph::LogicGraph;
use crate::provider::ScoreProvider;
use crate::types::{LogicNode, LogicTopology, NodeId, NodeLogic, NodeType, ScoreError, ScoreTriple};

/// Description prefix marking a derivation (rule) vertex.
pub const RULE_PREFIX: &str = "RULE";

/// Description substring marking a code-execution derivation.
pub const EXEC_CODE_MARKER: &str = "execCode";

/// Pattern for vulnerability identifiers embedded in descriptions.
const CVE_PATTERN: &str = r"CVE-\d{4}-\d{4,}";

/// Error raised while building a logical attack graph.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BuildError {
    /// The same vertex id appeared twice.
    #[error("duplicate vertex id {0}")]
    DuplicateNode(NodeId),
    /// A vertex carried a logic tag outside AND/OR/FLOW/LEAF.
    #[error("unknown logic tag {tag:?} on vertex {id}")]
    UnknownLogic {
        /// The offending vertex.
        id: NodeId,
        /// The unrecognized tag.
        tag: String,
    },
    /// An arc referenced a vertex that was never declared.
    #[error("arc {from} -> {to} references unknown vertex {missing}")]
    DanglingArc {
        /// Arc source id.
        from: NodeId,
        /// Arc target id.
        to: NodeId,
        /// Whichever endpoint is undeclared.
        missing: NodeId,
    },
    /// A probability from the simulation config or the provider was invalid.
    #[error("invalid probability: {0}")]
    InvalidScore(#[from] ScoreError),
    /// The score provider failed outright.
    #[error("score provider failed: {0}")]
    Provider(String),
}

/// Builds a [`LogicGraph`] from a topology document.
///
/// Classification, dependency counters, and leaf score resolution all
/// happen here, before any propagation starts.
#[derive(Debug)]
pub struct GraphBuilder<P> {
    provider: Arc<P>,
    cve_pattern: Regex,
}

impl<P: ScoreProvider> GraphBuilder<P> {
    /// Create a builder over a score provider.
    pub fn new(provider: Arc<P>) -> Self {
        Self {
            provider,
            cve_pattern: Regex::new(CVE_PATTERN).unwrap(),
        }
    }

    /// Build the graph: classify vertices, wire arcs, resolve leaf scores.
    pub async fn build(&self, topology: &LogicTopology) -> Result<LogicGraph, BuildError> {
        let mut nodes: BTreeMap<NodeId, LogicNode> = BTreeMap::new();

        for vertex in &topology.vertices {
            let id = NodeId::new(vertex.id);
            let logic = NodeLogic::from_tag(vertex.logic.as_deref()).ok_or_else(|| {
                BuildError::UnknownLogic {
                    id,
                    tag: vertex.logic.clone().unwrap_or_default(),
                }
            })?;
            let node_type = classify(&vertex.description, logic);
            let mut node = LogicNode::new(id, vertex.description.clone(), logic, node_type);
            node.exec_code =
                node_type == NodeType::Derivation && vertex.description.contains(EXEC_CODE_MARKER);
            if nodes.insert(id, node).is_some() {
                return Err(BuildError::DuplicateNode(id));
            }
        }

        for arc in &topology.arcs {
            let source = NodeId::new(arc.source);
            let target = NodeId::new(arc.target);
            if !nodes.contains_key(&source) {
                return Err(BuildError::DanglingArc {
                    from: source,
                    to: target,
                    missing: source,
                });
            }
            match nodes.get_mut(&target) {
                Some(node) => node.pending_count += 1,
                None => {
                    return Err(BuildError::DanglingArc {
                        from: source,
                        to: target,
                        missing: target,
                    })
                }
            }
            if let Some(node) = nodes.get_mut(&source) {
                node.out_edges.push(target);
            }
        }

        if let Some(sim) = &topology.simulation {
            let seed = ScoreTriple::uniform(sim.derivation_node_prob)?;
            for node in nodes.values_mut() {
                if node.node_type == NodeType::Derivation {
                    node.scores = seed;
                }
            }
        }

        for node in nodes.values_mut() {
            if node.node_type != NodeType::PrimitiveFact {
                continue;
            }
            let Some(found) = self.cve_pattern.find(&node.description) else {
                continue;
            };
            let resolved = self
                .provider
                .score(found.as_str())
                .await
                .map_err(|e| BuildError::Provider(e.to_string()))?;
            match resolved {
                Some(triple) => {
                    triple.validate()?;
                    node.scores = triple;
                }
                None => {
                    warn!(node = %node.id, cve = found.as_str(), "no score recorded, keeping default");
                }
            }
        }

        info!(
            nodes = nodes.len(),
            arcs = topology.arcs.len(),
            "logic graph built"
        );
        Ok(LogicGraph::from_nodes(nodes))
    }
}

/// Classify a vertex from its description and logic tag.
///
/// The rule marker takes precedence over the leaf check.
fn classify(description: &str, logic: NodeLogic) -> NodeType {
    if description.starts_with(RULE_PREFIX) {
        NodeType::Derivation
    } else if logic == NodeLogic::Leaf {
        NodeType::PrimitiveFact
    } else {
        NodeType::Derived
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::InMemoryScoreProvider;
    use crate::types::{ArcRecord, SimulationConfig, VertexRecord};

    fn make_builder() -> GraphBuilder<InMemoryScoreProvider> {
        GraphBuilder::new(Arc::new(InMemoryScoreProvider::new()))
    }

    fn make_topology(vertices: Vec<VertexRecord>, arcs: Vec<ArcRecord>) -> LogicTopology {
        LogicTopology {
            vertices,
            arcs,
            simulation: None,
        }
    }

    #[tokio::test]
    async fn classifies_rule_leaf_and_derived() {
        let topology = make_topology(
            vec![
                VertexRecord::new(1, None, "attackerLocated(internet)"),
                VertexRecord::new(2, Some("AND"), "RULE 6 (direct network access)"),
                VertexRecord::new(3, Some("OR"), "netAccess(workstation)"),
            ],
            vec![ArcRecord::new(1, 2), ArcRecord::new(2, 3)],
        );
        let graph = make_builder().build(&topology).await.unwrap();

        assert_eq!(graph.get(NodeId::new(1)).unwrap().node_type, NodeType::PrimitiveFact);
        assert_eq!(graph.get(NodeId::new(2)).unwrap().node_type, NodeType::Derivation);
        assert_eq!(graph.get(NodeId::new(3)).unwrap().node_type, NodeType::Derived);
    }

    #[tokio::test]
    async fn rule_marker_beats_leaf_logic() {
        let topology = make_topology(
            vec![VertexRecord::new(4, None, "RULE 3 (remote exploit)")],
            vec![],
        );
        let graph = make_builder().build(&topology).await.unwrap();
        assert_eq!(graph.get(NodeId::new(4)).unwrap().node_type, NodeType::Derivation);
    }

    #[tokio::test]
    async fn exec_code_marker_is_restricted_to_derivations() {
        let topology = make_topology(
            vec![
                VertexRecord::new(1, Some("OR"), "execCode(plc, root)"),
                VertexRecord::new(2, Some("AND"), "RULE 2 (remote exploit of execCode)"),
            ],
            vec![],
        );
        let graph = make_builder().build(&topology).await.unwrap();
        assert!(!graph.get(NodeId::new(1)).unwrap().exec_code);
        assert!(graph.get(NodeId::new(2)).unwrap().exec_code);
    }

    #[tokio::test]
    async fn arcs_wire_counters_and_adjacency() {
        let topology = make_topology(
            vec![
                VertexRecord::new(1, None, "fact a"),
                VertexRecord::new(2, None, "fact b"),
                VertexRecord::new(3, Some("AND"), "both(a, b)"),
            ],
            vec![ArcRecord::new(1, 3), ArcRecord::new(2, 3)],
        );
        let graph = make_builder().build(&topology).await.unwrap();

        let and_node = graph.get(NodeId::new(3)).unwrap();
        assert_eq!(and_node.pending_count, 2);
        assert_eq!(graph.get(NodeId::new(1)).unwrap().out_edges, vec![NodeId::new(3)]);
        assert_eq!(graph.edge_count(), 2);
    }

    #[tokio::test]
    async fn dangling_arc_is_rejected() {
        let topology = make_topology(
            vec![VertexRecord::new(1, None, "fact a")],
            vec![ArcRecord::new(1, 9)],
        );
        let err = make_builder().build(&topology).await.unwrap_err();
        assert_eq!(
            err,
            BuildError::DanglingArc {
                from: NodeId::new(1),
                to: NodeId::new(9),
                missing: NodeId::new(9),
            }
        );
        // The endpoint ids are payload; the error wraps no inner error.
        assert!(std::error::Error::source(&err).is_none());
    }

    #[tokio::test]
    async fn duplicate_vertex_is_rejected() {
        let topology = make_topology(
            vec![
                VertexRecord::new(1, None, "fact a"),
                VertexRecord::new(1, None, "fact a again"),
            ],
            vec![],
        );
        let err = make_builder().build(&topology).await.unwrap_err();
        assert_eq!(err, BuildError::DuplicateNode(NodeId::new(1)));
    }

    #[tokio::test]
    async fn unknown_logic_is_rejected() {
        let topology = make_topology(vec![VertexRecord::new(1, Some("XOR"), "odd")], vec![]);
        let err = make_builder().build(&topology).await.unwrap_err();
        assert!(matches!(err, BuildError::UnknownLogic { .. }));
    }

    #[tokio::test]
    async fn cve_descriptions_resolve_through_the_provider() {
        let provider = InMemoryScoreProvider::new()
            .with_score("CVE-2015-1179", ScoreTriple::new(0.5, 0.86, 0.27).unwrap());
        let builder = GraphBuilder::new(Arc::new(provider));
        let topology = make_topology(
            vec![
                VertexRecord::new(1, None, "vulExists(host, 'CVE-2015-1179', httpd)"),
                VertexRecord::new(2, None, "vulExists(host, 'CVE-1999-0001', ftpd)"),
                VertexRecord::new(3, None, "attackerLocated(internet)"),
            ],
            vec![],
        );
        let graph = builder.build(&topology).await.unwrap();

        assert_eq!(
            graph.get(NodeId::new(1)).unwrap().scores,
            ScoreTriple::new(0.5, 0.86, 0.27).unwrap()
        );
        // Unrecorded identifier and no identifier both keep the default.
        assert_eq!(graph.get(NodeId::new(2)).unwrap().scores, ScoreTriple::CERTAIN);
        assert_eq!(graph.get(NodeId::new(3)).unwrap().scores, ScoreTriple::CERTAIN);
    }

    #[tokio::test]
    async fn simulation_config_seeds_derivations() {
        let topology = LogicTopology {
            vertices: vec![
                VertexRecord::new(1, None, "fact"),
                VertexRecord::new(2, Some("AND"), "RULE 1 (exploit)"),
                VertexRecord::new(3, Some("OR"), "derived"),
            ],
            arcs: vec![],
            simulation: Some(SimulationConfig {
                derivation_node_prob: 0.8,
            }),
        };
        let graph = make_builder().build(&topology).await.unwrap();

        assert_eq!(
            graph.get(NodeId::new(2)).unwrap().scores,
            ScoreTriple::uniform(0.8).unwrap()
        );
        assert_eq!(graph.get(NodeId::new(3)).unwrap().scores, ScoreTriple::CERTAIN);
    }

    #[tokio::test]
    async fn out_of_range_simulation_probability_is_rejected() {
        let topology = LogicTopology {
            vertices: vec![VertexRecord::new(1, Some("AND"), "RULE 1 (exploit)")],
            arcs: vec![],
            simulation: Some(SimulationConfig {
                derivation_node_prob: 1.7,
            }),
        };
        let err = make_builder().build(&topology).await.unwrap_err();
        assert!(matches!(err, BuildError::InvalidScore(_)));
    }
}
