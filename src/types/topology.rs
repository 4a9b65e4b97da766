//! Serde shapes for topology ingestion.
//!
//! These mirror the wire format produced by the topology loaders; field
//! renames track the external JSON keys.

use serde::{Deserialize, Serialize};

/// One vertex of a data-driven (logical) topology document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VertexRecord {
    /// Integer vertex id, unique within the document.
    pub id: u64,
    /// Combination logic tag (`AND`/`OR`/`FLOW`); absent for leaves.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logic: Option<String>,
    /// Free-text description; carries the rule and exec-code markers and
    /// any embedded vulnerability identifier.
    #[serde(default)]
    pub description: String,
}

impl VertexRecord {
    /// Create a vertex record.
    pub fn new(id: u64, logic: Option<&str>, description: impl Into<String>) -> Self {
        Self {
            id,
            logic: logic.map(str::to_string),
            description: description.into(),
        }
    }
}

/// One directed arc, shared by both topology families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArcRecord {
    /// Source vertex/host id.
    #[serde(rename = "currNode")]
    pub source: u64,
    /// Target vertex/host id.
    #[serde(rename = "nextNode")]
    pub target: u64,
}

impl ArcRecord {
    /// Create an arc record.
    pub fn new(source: u64, target: u64) -> Self {
        Self { source, target }
    }
}

/// Optional simulation overrides for the data-driven build.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Initial probability assigned to every derivation node, replacing
    /// the certain default. Must lie in [0, 1].
    pub derivation_node_prob: f64,
}

/// A complete data-driven topology document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LogicTopology {
    /// Vertex collection.
    #[serde(default)]
    pub vertices: Vec<VertexRecord>,
    /// Arc collection.
    #[serde(default)]
    pub arcs: Vec<ArcRecord>,
    /// Simulation overrides, when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub simulation: Option<SimulationConfig>,
}

/// One host of a model-driven topology document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostRecord {
    /// Integer host id, unique within the document.
    pub id: u64,
    /// Device vendor.
    #[serde(default)]
    pub vendor: String,
    /// Device product name.
    #[serde(default)]
    pub product: String,
    /// Layer name, one of the nine zone names.
    pub layer: String,
    /// Vulnerability identifiers recorded against this host.
    #[serde(default)]
    pub cve_ids: Vec<String>,
}

impl HostRecord {
    /// Create a host record.
    pub fn new(id: u64, vendor: &str, product: &str, layer: &str, cve_ids: &[&str]) -> Self {
        Self {
            id,
            vendor: vendor.to_string(),
            product: product.to_string(),
            layer: layer.to_string(),
            cve_ids: cve_ids.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// A complete model-driven topology document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NetworkTopology {
    /// Host collection.
    #[serde(default)]
    pub hosts: Vec<HostRecord>,
    /// Arc collection.
    #[serde(default)]
    pub arcs: Vec<ArcRecord>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arc_records_use_wire_names() {
        let arc = ArcRecord::new(1, 2);
        let json = serde_json::to_string(&arc).unwrap();
        assert_eq!(json, r#"{"currNode":1,"nextNode":2}"#);
        let back: ArcRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, arc);
    }

    #[test]
    fn vertex_logic_is_optional() {
        let doc: LogicTopology = serde_json::from_str(
            r#"{
                "vertices": [
                    {"id": 1, "description": "attackerLocated(internet)"},
                    {"id": 2, "logic": "AND", "description": "RULE 6 (direct access)"}
                ],
                "arcs": [{"currNode": 1, "nextNode": 2}]
            }"#,
        )
        .unwrap();
        assert_eq!(doc.vertices.len(), 2);
        assert_eq!(doc.vertices[0].logic, None);
        assert_eq!(doc.vertices[1].logic.as_deref(), Some("AND"));
        assert!(doc.simulation.is_none());
    }

    #[test]
    fn host_records_default_missing_fields() {
        let doc: NetworkTopology = serde_json::from_str(
            r#"{"hosts": [{"id": 0, "layer": "remote_attack"}], "arcs": []}"#,
        )
        .unwrap();
        assert_eq!(doc.hosts[0].vendor, "");
        assert!(doc.hosts[0].cve_ids.is_empty());
    }
}
