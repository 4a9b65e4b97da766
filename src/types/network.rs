//! Host and layer types for the model-driven network graph.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::types::score::ScoreTriple;

/// Unique identifier for a host in the network graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct HostId(u64);

impl HostId {
    /// Create a new HostId.
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Get the inner integer.
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for HostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for HostId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

/// Network-zone depth, ordered from the attacker's entry point inward.
///
/// Declaration order is the layer order: every edge must ascend it, which
/// is what bounds backward traversal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Layer {
    /// Attacker entry point outside the perimeter.
    RemoteAttack,
    /// Outer corporate firewall.
    CorpFw1,
    /// Corporate demilitarized zone.
    CorpDmz,
    /// Inner corporate firewall.
    CorpFw2,
    /// Corporate LAN.
    CorpLan,
    /// Outer control-system firewall.
    CsFw1,
    /// Control-system demilitarized zone.
    CsDmz,
    /// Inner control-system firewall.
    CsFw2,
    /// Control-system LAN.
    CsLan,
}

impl Layer {
    /// All layers, in depth order.
    pub const ALL: [Layer; 9] = [
        Layer::RemoteAttack,
        Layer::CorpFw1,
        Layer::CorpDmz,
        Layer::CorpFw2,
        Layer::CorpLan,
        Layer::CsFw1,
        Layer::CsDmz,
        Layer::CsFw2,
        Layer::CsLan,
    ];

    /// Parse a layer from its topology name.
    pub fn from_name(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "remote_attack" => Some(Self::RemoteAttack),
            "corp_fw_1" => Some(Self::CorpFw1),
            "corp_dmz" => Some(Self::CorpDmz),
            "corp_fw_2" => Some(Self::CorpFw2),
            "corp_lan" => Some(Self::CorpLan),
            "cs_fw_1" => Some(Self::CsFw1),
            "cs_dmz" => Some(Self::CsDmz),
            "cs_fw_2" => Some(Self::CsFw2),
            "cs_lan" => Some(Self::CsLan),
            _ => None,
        }
    }
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RemoteAttack => write!(f, "remote_attack"),
            Self::CorpFw1 => write!(f, "corp_fw_1"),
            Self::CorpDmz => write!(f, "corp_dmz"),
            Self::CorpFw2 => write!(f, "corp_fw_2"),
            Self::CorpLan => write!(f, "corp_lan"),
            Self::CsFw1 => write!(f, "cs_fw_1"),
            Self::CsDmz => write!(f, "cs_dmz"),
            Self::CsFw2 => write!(f, "cs_fw_2"),
            Self::CsLan => write!(f, "cs_lan"),
        }
    }
}

/// A host in the model-driven network graph.
///
/// Edge lists hold indices into the owning graph's edge arena and are
/// fixed once the graph is built.
#[derive(Debug, Clone)]
pub struct HostNode {
    /// Unique host identifier.
    pub id: HostId,
    /// Device vendor.
    pub vendor: String,
    /// Device product name.
    pub product: String,
    /// Network-zone depth.
    pub layer: Layer,
    /// Vulnerability weights resolved at build time.
    pub weights: ScoreTriple,
    pub(crate) in_edges: Vec<usize>,
    pub(crate) out_edges: Vec<usize>,
}

impl HostNode {
    /// Create a host with empty adjacency.
    pub fn new(id: HostId, vendor: String, product: String, layer: Layer, weights: ScoreTriple) -> Self {
        Self {
            id,
            vendor,
            product,
            layer,
            weights,
            in_edges: Vec::new(),
            out_edges: Vec::new(),
        }
    }

    /// Number of edges arriving at this host.
    pub fn in_degree(&self) -> usize {
        self.in_edges.len()
    }

    /// Number of edges leaving this host.
    pub fn out_degree(&self) -> usize {
        self.out_edges.len()
    }
}

/// Directed link between two hosts, stored in the graph's edge arena.
///
/// Constructed once at build time, registered on both endpoints, never
/// mutated afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edge {
    pub(crate) source: usize,
    pub(crate) target: usize,
}

impl Edge {
    pub(crate) fn new(source: usize, target: usize) -> Self {
        Self { source, target }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layer_names_round_trip() {
        for layer in Layer::ALL {
            assert_eq!(Layer::from_name(&layer.to_string()), Some(layer));
        }
        assert_eq!(Layer::from_name("REMOTE_ATTACK"), Some(Layer::RemoteAttack));
        assert_eq!(Layer::from_name("corporate"), None);
    }

    #[test]
    fn layers_order_by_depth() {
        assert!(Layer::RemoteAttack < Layer::CorpFw1);
        assert!(Layer::CorpLan < Layer::CsFw1);
        assert!(Layer::CsFw2 < Layer::CsLan);
        let mut layers = vec![Layer::CsLan, Layer::RemoteAttack, Layer::CorpDmz];
        layers.sort();
        assert_eq!(layers, vec![Layer::RemoteAttack, Layer::CorpDmz, Layer::CsLan]);
    }

    #[test]
    fn host_degrees_start_empty() {
        let host = HostNode::new(
            HostId::new(3),
            "Siemens".to_string(),
            "S7-300".to_string(),
            Layer::CsLan,
            ScoreTriple::CERTAIN,
        );
        assert_eq!(host.in_degree(), 0);
        assert_eq!(host.out_degree(), 0);
    }
}
