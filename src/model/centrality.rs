//! Table-driven centrality measures.
//!
//! Degree, closeness, and betweenness all read the precomputed
//! shortest-path table instead of running single-source accumulation;
//! the layered DAG makes the ordered-pair specialization exact.

use crate::types::HostId;

use super::graph::NetworkGraph;
use super::shortest::ShortestPathTable;
use super::MetricsError;

/// Degree centrality: in-degree plus out-degree.
pub fn degree_centrality(graph: &NetworkGraph, host: HostId) -> Result<usize, MetricsError> {
    let node = graph.host(host).ok_or(MetricsError::UnknownHost(host))?;
    Ok(node.in_degree() + node.out_degree())
}

/// Closeness centrality: `Σ 1/distance` over every reachable peer.
///
/// Distances are looked up regardless of pair order; a zero distance
/// contributes nothing.
pub fn closeness_centrality(
    graph: &NetworkGraph,
    table: &ShortestPathTable,
    host: HostId,
) -> Result<f64, MetricsError> {
    if graph.host(host).is_none() {
        return Err(MetricsError::UnknownHost(host));
    }
    let mut closeness = 0.0;
    for peer in graph.hosts() {
        if peer.id == host {
            continue;
        }
        if let Some(distance) = table.distance_between(host, peer.id) {
            if distance > 0.0 {
                closeness += 1.0 / distance;
            }
        }
    }
    Ok(closeness)
}

/// Betweenness centrality by shortest-path counting.
///
/// For every ordered pair (s, t) straddling the host in layer order with
/// all three pair entries recorded, the host collects
/// `mult(s,v) · mult(v,t) / mult(s,t)` whenever the costs through it sum
/// to the direct cost. Exact float equality decides the tie, matching
/// the table's multiplicity bookkeeping.
pub fn betweenness_centrality(
    graph: &NetworkGraph,
    table: &ShortestPathTable,
    host: HostId,
) -> Result<f64, MetricsError> {
    let node = graph.host(host).ok_or(MetricsError::UnknownHost(host))?;
    let mut betweenness = 0.0;
    for source in graph.hosts().filter(|s| s.layer < node.layer) {
        for target in graph.hosts().filter(|t| t.layer > node.layer) {
            let (Some(direct), Some(first_leg), Some(second_leg)) = (
                table.get(source.id, target.id),
                table.get(source.id, host),
                table.get(host, target.id),
            ) else {
                continue;
            };
            if direct.cost == first_leg.cost + second_leg.cost {
                betweenness += first_leg.multiplicity as f64 * second_leg.multiplicity as f64
                    / direct.multiplicity as f64;
            }
        }
    }
    Ok(betweenness)
}
