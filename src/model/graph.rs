//! Layered network graph construction from topology documents.

use std::collections::BTreeMap;
use std::sync::Arc;

use thiserror::Error;
use tracing::{info, warn};

use crate::provider::ScoreProvider;
use crate::types::{Edge, HostId, HostNode, Layer, NetworkTopology, ScoreError, ScoreTriple};

/// Error raised while building a network graph.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum NetworkBuildError {
    /// The same host id appeared twice.
    #[error("duplicate host id {0}")]
    DuplicateHost(HostId),
    /// A host named a layer outside the known zone vocabulary.
    #[error("unknown layer {name:?} on host {id}")]
    UnknownLayer {
        /// The offending host.
        id: HostId,
        /// The unrecognized layer name.
        name: String,
    },
    /// An arc referenced a host that was never declared.
    #[error("arc {from} -> {to} references unknown host {missing}")]
    DanglingArc {
        /// Arc source id.
        from: HostId,
        /// Arc target id.
        to: HostId,
        /// Whichever endpoint is undeclared.
        missing: HostId,
    },
    /// An arc does not ascend the layer order.
    ///
    /// Traversal termination relies on every edge moving strictly deeper,
    /// so a flat or descending arc is rejected at build time.
    #[error("arc {from} ({from_layer}) -> {to} ({to_layer}) does not ascend layers")]
    LayerOrder {
        /// Arc source id.
        from: HostId,
        /// Arc target id.
        to: HostId,
        /// Layer of the source host.
        from_layer: Layer,
        /// Layer of the target host.
        to_layer: Layer,
    },
    /// A probability from the provider was invalid.
    #[error("invalid probability: {0}")]
    InvalidScore(#[from] ScoreError),
    /// The score provider failed outright.
    #[error("score provider failed: {0}")]
    Provider(String),
}

/// A built layered network graph.
///
/// Hosts and edges live in arenas; each edge is registered on both of its
/// endpoints at build time and never mutated afterwards. Read-only during
/// all metrics computation, so sessions share it behind an `Arc`.
#[derive(Debug, Clone, Default)]
pub struct NetworkGraph {
    hosts: Vec<HostNode>,
    edges: Vec<Edge>,
    index: BTreeMap<HostId, usize>,
    origin: Option<HostId>,
}

impl NetworkGraph {
    /// Fetch a host by id.
    pub fn host(&self, id: HostId) -> Option<&HostNode> {
        self.index.get(&id).map(|&i| &self.hosts[i])
    }

    /// Iterate all hosts in id order.
    pub fn hosts(&self) -> impl Iterator<Item = &HostNode> {
        self.index.values().map(|&i| &self.hosts[i])
    }

    /// All edges, in arena order.
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Endpoint ids of one edge.
    pub fn edge_endpoints(&self, edge: usize) -> (HostId, HostId) {
        let e = &self.edges[edge];
        (self.hosts[e.source].id, self.hosts[e.target].id)
    }

    /// The attacker entry host: lowest layer, ties broken by lowest id.
    pub fn origin(&self) -> Option<HostId> {
        self.origin
    }

    /// Number of hosts.
    pub fn len(&self) -> usize {
        self.hosts.len()
    }

    /// Whether the graph has no hosts.
    pub fn is_empty(&self) -> bool {
        self.hosts.is_empty()
    }

    pub(crate) fn host_index(&self, id: HostId) -> Option<usize> {
        self.index.get(&id).copied()
    }

    /// Arena indices with their hosts, in id order.
    pub(crate) fn indexed_hosts(&self) -> impl Iterator<Item = (usize, &HostNode)> {
        self.index.values().map(|&i| (i, &self.hosts[i]))
    }

    pub(crate) fn host_at(&self, index: usize) -> &HostNode {
        &self.hosts[index]
    }

    pub(crate) fn edge(&self, edge: usize) -> &Edge {
        &self.edges[edge]
    }
}

/// Builds a [`NetworkGraph`] from a topology document.
///
/// Host weights come from the score provider; when several recorded CVE
/// ids resolve, the triple with the highest base score wins.
#[derive(Debug)]
pub struct NetworkGraphBuilder<P> {
    provider: Arc<P>,
}

impl<P: ScoreProvider> NetworkGraphBuilder<P> {
    /// Create a builder over a score provider.
    pub fn new(provider: Arc<P>) -> Self {
        Self { provider }
    }

    /// Build the graph: resolve weights, wire the edge arena, pick the origin.
    pub async fn build(&self, topology: &NetworkTopology) -> Result<NetworkGraph, NetworkBuildError> {
        let mut hosts: Vec<HostNode> = Vec::with_capacity(topology.hosts.len());
        let mut index: BTreeMap<HostId, usize> = BTreeMap::new();

        for record in &topology.hosts {
            let id = HostId::new(record.id);
            let layer = Layer::from_name(&record.layer).ok_or_else(|| {
                NetworkBuildError::UnknownLayer {
                    id,
                    name: record.layer.clone(),
                }
            })?;
            let weights = self.resolve_weights(id, &record.cve_ids).await?;
            if index.insert(id, hosts.len()).is_some() {
                return Err(NetworkBuildError::DuplicateHost(id));
            }
            hosts.push(HostNode::new(
                id,
                record.vendor.clone(),
                record.product.clone(),
                layer,
                weights,
            ));
        }

        let mut edges: Vec<Edge> = Vec::with_capacity(topology.arcs.len());
        for arc in &topology.arcs {
            let source = HostId::new(arc.source);
            let target = HostId::new(arc.target);
            let source_index = *index.get(&source).ok_or(NetworkBuildError::DanglingArc {
                from: source,
                to: target,
                missing: source,
            })?;
            let target_index = *index.get(&target).ok_or(NetworkBuildError::DanglingArc {
                from: source,
                to: target,
                missing: target,
            })?;
            let source_layer = hosts[source_index].layer;
            let target_layer = hosts[target_index].layer;
            if source_layer >= target_layer {
                return Err(NetworkBuildError::LayerOrder {
                    from: source,
                    to: target,
                    from_layer: source_layer,
                    to_layer: target_layer,
                });
            }
            let edge_index = edges.len();
            edges.push(Edge::new(source_index, target_index));
            hosts[source_index].out_edges.push(edge_index);
            hosts[target_index].in_edges.push(edge_index);
        }

        let origin = hosts
            .iter()
            .map(|h| (h.layer, h.id))
            .min()
            .map(|(_, id)| id);

        info!(
            hosts = hosts.len(),
            edges = edges.len(),
            origin = origin.map(|id| id.as_u64()),
            "network graph built"
        );
        Ok(NetworkGraph {
            hosts,
            edges,
            index,
            origin,
        })
    }

    async fn resolve_weights(
        &self,
        id: HostId,
        cve_ids: &[String],
    ) -> Result<ScoreTriple, NetworkBuildError> {
        let mut best: Option<ScoreTriple> = None;
        for cve in cve_ids {
            let resolved = self
                .provider
                .score(cve)
                .await
                .map_err(|e| NetworkBuildError::Provider(e.to_string()))?;
            match resolved {
                Some(triple) => {
                    triple.validate()?;
                    if best.map_or(true, |b| triple.base > b.base) {
                        best = Some(triple);
                    }
                }
                None => {
                    warn!(host = %id, cve = cve.as_str(), "no score recorded, skipping id");
                }
            }
        }
        Ok(best.unwrap_or(ScoreTriple::CERTAIN))
    }
}
