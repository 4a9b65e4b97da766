//! Backward attack-path enumeration.
//!
//! Walks from a target host back to an explicit goal via incoming edges.
//! Layer monotonicity bounds the walk: a branch that reaches the goal's
//! layer without reaching the goal dead-ends.

use crate::types::{DimensionTriple, HostId, ScoreDimension};

use super::graph::NetworkGraph;
use super::MetricsError;

/// One maximal attack path, as edge-arena indices ordered goal → target.
///
/// The path owns no graph data; sums and host sequences are materialized
/// against the graph it was enumerated from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttackPath {
    edges: Vec<usize>,
}

impl AttackPath {
    /// Number of edges on the path.
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Whether the path is the degenerate target == goal path.
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Host ids visited, goal first.
    pub fn host_sequence(&self, graph: &NetworkGraph) -> Vec<HostId> {
        let mut hosts = Vec::with_capacity(self.edges.len() + 1);
        match self.edges.first() {
            Some(&first) => hosts.push(graph.host_at(graph.edge(first).source).id),
            None => return hosts,
        }
        for &edge in &self.edges {
            hosts.push(graph.host_at(graph.edge(edge).target).id);
        }
        hosts
    }

    /// Sum one weight dimension along the path.
    ///
    /// Each edge contributes its target host's weight, so the goal's own
    /// weight is never counted.
    pub fn total(&self, graph: &NetworkGraph, dimension: ScoreDimension) -> f64 {
        self.edges
            .iter()
            .map(|&edge| graph.host_at(graph.edge(edge).target).weights.get(dimension))
            .sum()
    }

    /// Sum all three weight dimensions along the path.
    pub fn totals(&self, graph: &NetworkGraph) -> DimensionTriple {
        let mut totals = DimensionTriple::default();
        for &edge in &self.edges {
            totals.add_score(&graph.host_at(graph.edge(edge).target).weights);
        }
        totals
    }
}

/// A parent-pointer record in the traversal's link arena.
///
/// Branch points share their common suffix through `parent`, so
/// duplicating a path costs one link, not a copy of the whole path.
struct Link {
    edge: usize,
    parent: Option<usize>,
}

/// Enumerates maximal backward paths over one graph snapshot.
#[derive(Debug, Clone, Copy)]
pub struct PathEnumerator<'g> {
    graph: &'g NetworkGraph,
}

impl<'g> PathEnumerator<'g> {
    /// Create an enumerator over a graph.
    pub fn new(graph: &'g NetworkGraph) -> Self {
        Self { graph }
    }

    /// All maximal paths from `goal` to `target`, walking backward.
    ///
    /// An unreachable goal yields the empty set, a valid degenerate
    /// result; an unknown id is a lookup error.
    pub fn enumerate(&self, target: HostId, goal: HostId) -> Result<Vec<AttackPath>, MetricsError> {
        let target_index = self
            .graph
            .host_index(target)
            .ok_or(MetricsError::UnknownHost(target))?;
        let goal_index = self
            .graph
            .host_index(goal)
            .ok_or(MetricsError::UnknownHost(goal))?;
        Ok(self.enumerate_indices(target_index, goal_index))
    }

    pub(crate) fn enumerate_indices(&self, target: usize, goal: usize) -> Vec<AttackPath> {
        let goal_layer = self.graph.host_at(goal).layer;
        let mut links: Vec<Link> = Vec::new();
        let mut stack: Vec<(usize, Option<usize>)> = vec![(target, None)];
        let mut paths: Vec<AttackPath> = Vec::new();

        while let Some((index, tail)) = stack.pop() {
            if index == goal {
                paths.push(materialize(&links, tail));
            } else if self.graph.host_at(index).layer > goal_layer {
                for &edge in &self.graph.host_at(index).in_edges {
                    links.push(Link { edge, parent: tail });
                    stack.push((self.graph.edge(edge).source, Some(links.len() - 1)));
                }
            }
            // Otherwise the branch has fallen to the goal's layer without
            // reaching it: dead end.
        }
        paths
    }
}

/// Walk a parent-pointer chain into an explicit edge list.
///
/// The chain head is the edge leaving the goal, so the walk already
/// yields goal → target order.
fn materialize(links: &[Link], tail: Option<usize>) -> AttackPath {
    let mut edges = Vec::new();
    let mut cursor = tail;
    while let Some(index) = cursor {
        let link = &links[index];
        edges.push(link.edge);
        cursor = link.parent;
    }
    AttackPath { edges }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::graph::NetworkGraphBuilder;
    use crate::provider::InMemoryScoreProvider;
    use crate::types::{ArcRecord, HostRecord, NetworkTopology};
    use std::sync::Arc;

    async fn make_graph(hosts: Vec<HostRecord>, arcs: Vec<ArcRecord>) -> NetworkGraph {
        let builder = NetworkGraphBuilder::new(Arc::new(InMemoryScoreProvider::new()));
        builder
            .build(&NetworkTopology { hosts, arcs })
            .await
            .unwrap()
    }

    fn ids(paths: &[AttackPath], graph: &NetworkGraph) -> Vec<Vec<u64>> {
        let mut sequences: Vec<Vec<u64>> = paths
            .iter()
            .map(|p| p.host_sequence(graph).iter().map(|h| h.as_u64()).collect())
            .collect();
        sequences.sort();
        sequences
    }

    #[tokio::test]
    async fn diamond_yields_exactly_two_paths() {
        let graph = make_graph(
            vec![
                HostRecord::new(0, "", "", "remote_attack", &[]),
                HostRecord::new(1, "", "", "corp_fw_1", &[]),
                HostRecord::new(2, "", "", "corp_fw_1", &[]),
                HostRecord::new(3, "", "", "corp_dmz", &[]),
            ],
            vec![
                ArcRecord::new(0, 1),
                ArcRecord::new(0, 2),
                ArcRecord::new(1, 3),
                ArcRecord::new(2, 3),
            ],
        )
        .await;

        let paths = PathEnumerator::new(&graph)
            .enumerate(HostId::new(3), HostId::new(0))
            .unwrap();
        assert_eq!(paths.len(), 2);
        assert_eq!(ids(&paths, &graph), vec![vec![0, 1, 3], vec![0, 2, 3]]);
    }

    #[tokio::test]
    async fn paths_are_ordered_goal_to_target() {
        let graph = make_graph(
            vec![
                HostRecord::new(0, "", "", "remote_attack", &[]),
                HostRecord::new(1, "", "", "corp_dmz", &[]),
                HostRecord::new(2, "", "", "cs_lan", &[]),
            ],
            vec![ArcRecord::new(0, 1), ArcRecord::new(1, 2)],
        )
        .await;

        let paths = PathEnumerator::new(&graph)
            .enumerate(HostId::new(2), HostId::new(0))
            .unwrap();
        assert_eq!(paths.len(), 1);
        assert_eq!(
            paths[0].host_sequence(&graph),
            vec![HostId::new(0), HostId::new(1), HostId::new(2)]
        );
        assert_eq!(paths[0].edge_count(), 2);
    }

    #[tokio::test]
    async fn unreachable_goal_yields_the_empty_set() {
        let graph = make_graph(
            vec![
                HostRecord::new(0, "", "", "remote_attack", &[]),
                HostRecord::new(1, "", "", "corp_lan", &[]),
                HostRecord::new(2, "", "", "cs_lan", &[]),
            ],
            vec![ArcRecord::new(1, 2)],
        )
        .await;

        let paths = PathEnumerator::new(&graph)
            .enumerate(HostId::new(2), HostId::new(0))
            .unwrap();
        assert!(paths.is_empty());
    }

    #[tokio::test]
    async fn target_equal_to_goal_records_one_empty_path() {
        let graph = make_graph(vec![HostRecord::new(0, "", "", "remote_attack", &[])], vec![]).await;
        let paths = PathEnumerator::new(&graph)
            .enumerate(HostId::new(0), HostId::new(0))
            .unwrap();
        assert_eq!(paths.len(), 1);
        assert!(paths[0].is_empty());
        assert!(paths[0].host_sequence(&graph).is_empty());
    }

    #[tokio::test]
    async fn unknown_ids_are_lookup_errors() {
        let graph = make_graph(vec![HostRecord::new(0, "", "", "remote_attack", &[])], vec![]).await;
        let enumerator = PathEnumerator::new(&graph);
        assert_eq!(
            enumerator.enumerate(HostId::new(9), HostId::new(0)).unwrap_err(),
            MetricsError::UnknownHost(HostId::new(9))
        );
        assert_eq!(
            enumerator.enumerate(HostId::new(0), HostId::new(9)).unwrap_err(),
            MetricsError::UnknownHost(HostId::new(9))
        );
    }

    #[tokio::test]
    async fn branch_points_multiply_path_counts() {
        // Two parallel choices at each of two stages: four paths.
        let graph = make_graph(
            vec![
                HostRecord::new(0, "", "", "remote_attack", &[]),
                HostRecord::new(1, "", "", "corp_fw_1", &[]),
                HostRecord::new(2, "", "", "corp_fw_1", &[]),
                HostRecord::new(3, "", "", "corp_dmz", &[]),
                HostRecord::new(4, "", "", "corp_fw_2", &[]),
                HostRecord::new(5, "", "", "corp_fw_2", &[]),
                HostRecord::new(6, "", "", "corp_lan", &[]),
            ],
            vec![
                ArcRecord::new(0, 1),
                ArcRecord::new(0, 2),
                ArcRecord::new(1, 3),
                ArcRecord::new(2, 3),
                ArcRecord::new(3, 4),
                ArcRecord::new(3, 5),
                ArcRecord::new(4, 6),
                ArcRecord::new(5, 6),
            ],
        )
        .await;

        let paths = PathEnumerator::new(&graph)
            .enumerate(HostId::new(6), HostId::new(0))
            .unwrap();
        assert_eq!(paths.len(), 4);
    }

    #[tokio::test]
    async fn totals_sum_target_weights_only() {
        let provider = InMemoryScoreProvider::new()
            .with_score("CVE-2015-1179", crate::types::ScoreTriple::new(0.5, 0.8, 0.2).unwrap());
        let builder = NetworkGraphBuilder::new(Arc::new(provider));
        let graph = builder
            .build(&NetworkTopology {
                hosts: vec![
                    HostRecord::new(0, "", "", "remote_attack", &["CVE-2015-1179"]),
                    HostRecord::new(1, "", "", "corp_dmz", &["CVE-2015-1179"]),
                    HostRecord::new(2, "", "", "cs_lan", &["CVE-2015-1179"]),
                ],
                arcs: vec![ArcRecord::new(0, 1), ArcRecord::new(1, 2)],
            })
            .await
            .unwrap();

        let paths = PathEnumerator::new(&graph)
            .enumerate(HostId::new(2), HostId::new(0))
            .unwrap();
        let totals = paths[0].totals(&graph);
        // Hosts 1 and 2 contribute; the goal's own weight does not.
        assert!((totals.base - 1.0).abs() < 1e-12);
        assert!((totals.exploitability - 1.6).abs() < 1e-12);
        assert!((totals.impact - 0.4).abs() < 1e-12);
        assert_eq!(
            paths[0].total(&graph, ScoreDimension::Base),
            totals.base
        );
    }
}
