//! Metrics session over one immutable network graph snapshot.

use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::AnalysisConfig;
use crate::types::{DimensionTriple, HostId, ScoreDimension};

use super::centrality::{betweenness_centrality, closeness_centrality, degree_centrality};
use super::graph::NetworkGraph;
use super::paths::PathEnumerator;
use super::shortest::ShortestPathTable;
use super::spectral::SpectralScores;
use super::MetricsError;

/// One enumerated attack path with its summed weights.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathRecord {
    /// Host ids visited, goal first.
    pub hosts: Vec<HostId>,
    /// Per-dimension weight totals along the path.
    pub totals: DimensionTriple,
}

/// Attack-path metrics for one target host.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttackPathReport {
    /// The analyzed target host.
    pub target: HostId,
    /// The traversal goal, the graph origin unless overridden.
    pub goal: HostId,
    /// Number of maximal paths found.
    pub path_count: usize,
    /// Every path with its summed scores.
    pub paths: Vec<PathRecord>,
    /// Per-dimension averages over all paths; zero when no path exists.
    pub average: DimensionTriple,
    /// Host sequences of the top paths by exploitability total.
    pub top_exploitable: Vec<Vec<HostId>>,
    /// Host sequences of the top paths by impact total.
    pub top_impactful: Vec<Vec<HostId>>,
    /// Report creation time.
    pub generated_at: DateTime<Utc>,
}

/// One host's centrality values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostCentrality {
    /// The measured host.
    pub id: HostId,
    /// In-degree plus out-degree.
    pub degree: usize,
    /// Sum of reciprocal shortest-path distances.
    pub closeness: f64,
    /// Shortest-path-counting betweenness.
    pub betweenness: f64,
    /// Katz centrality, L2-normalized.
    pub katz: f64,
    /// PageRank centrality, L2-normalized.
    pub pagerank: f64,
}

/// Centrality values for every host.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CentralityReport {
    /// Per-host rows, in id order.
    pub rows: Vec<HostCentrality>,
    /// Attenuation factor used by the spectral block.
    pub alpha: f64,
    /// Report creation time.
    pub generated_at: DateTime<Utc>,
}

/// Vulnerable-host counts and percentages.
///
/// A host is vulnerable when at least one edge reaches it from a lower
/// layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VulnerableHostStats {
    /// Hosts with at least one incoming edge.
    pub vulnerable_hosts: usize,
    /// Hosts with no incoming edge.
    pub non_vulnerable_hosts: usize,
    /// Vulnerable share of all hosts, 0 for the empty graph.
    pub vulnerable_percentage: f64,
    /// Non-vulnerable share of all hosts, 0 for the empty graph.
    pub non_vulnerable_percentage: f64,
}

/// Analytics session over one graph snapshot.
///
/// The shortest-path table is computed lazily on first use and shared
/// by every later lookup in the session; the graph itself is never
/// mutated.
#[derive(Debug)]
pub struct MetricsEngine {
    graph: Arc<NetworkGraph>,
    config: AnalysisConfig,
    table: RwLock<Option<Arc<ShortestPathTable>>>,
}

impl MetricsEngine {
    /// Create a session over a graph snapshot.
    pub fn new(graph: Arc<NetworkGraph>, config: AnalysisConfig) -> Self {
        Self {
            graph,
            config,
            table: RwLock::new(None),
        }
    }

    /// The underlying graph snapshot.
    pub fn graph(&self) -> &Arc<NetworkGraph> {
        &self.graph
    }

    fn deadline(&self) -> Option<Instant> {
        self.config.deadline.map(|budget| Instant::now() + budget)
    }

    /// The session's shortest-path table, computing it on first use.
    pub fn shortest_paths(&self) -> Result<Arc<ShortestPathTable>, MetricsError> {
        if let Some(table) = self.table.read().as_ref() {
            return Ok(Arc::clone(table));
        }
        let computed = Arc::new(ShortestPathTable::compute(&self.graph, self.deadline())?);
        let mut slot = self.table.write();
        let table = slot.get_or_insert(computed);
        Ok(Arc::clone(table))
    }

    /// Attack-path metrics from the graph origin to a target.
    pub fn attack_path_report(&self, target: HostId) -> Result<AttackPathReport, MetricsError> {
        let goal = self.graph.origin().ok_or(MetricsError::UnknownHost(target))?;
        self.attack_path_report_from(target, goal)
    }

    /// Attack-path metrics from an explicit goal to a target.
    pub fn attack_path_report_from(
        &self,
        target: HostId,
        goal: HostId,
    ) -> Result<AttackPathReport, MetricsError> {
        let enumerated = PathEnumerator::new(&self.graph).enumerate(target, goal)?;
        let paths: Vec<PathRecord> = enumerated
            .iter()
            .map(|path| PathRecord {
                hosts: path.host_sequence(&self.graph),
                totals: path.totals(&self.graph),
            })
            .collect();

        let mut average = DimensionTriple::default();
        for record in &paths {
            average.add(&record.totals);
        }
        if !paths.is_empty() {
            average.scale(1.0 / paths.len() as f64);
        }

        let report = AttackPathReport {
            target,
            goal,
            path_count: paths.len(),
            top_exploitable: rank_paths(&paths, ScoreDimension::Exploitability, self.config.top_paths),
            top_impactful: rank_paths(&paths, ScoreDimension::Impact, self.config.top_paths),
            paths,
            average,
            generated_at: Utc::now(),
        };
        info!(
            target = target.as_u64(),
            goal = goal.as_u64(),
            paths = report.path_count,
            "attack-path report built"
        );
        Ok(report)
    }

    /// Degree, closeness, betweenness, and spectral values for every host.
    pub fn centrality_report(&self) -> Result<CentralityReport, MetricsError> {
        let table = self.shortest_paths()?;
        let spectral = SpectralScores::compute(&self.graph, self.deadline())?;

        let ids: Vec<HostId> = self.graph.hosts().map(|h| h.id).collect();
        let mut rows: Vec<HostCentrality> = ids
            .into_par_iter()
            .map(|id| -> Result<HostCentrality, MetricsError> {
                let index = self
                    .graph
                    .host_index(id)
                    .ok_or(MetricsError::UnknownHost(id))?;
                Ok(HostCentrality {
                    id,
                    degree: degree_centrality(&self.graph, id)?,
                    closeness: closeness_centrality(&self.graph, &table, id)?,
                    betweenness: betweenness_centrality(&self.graph, &table, id)?,
                    katz: spectral.katz[index],
                    pagerank: spectral.pagerank[index],
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        rows.sort_by_key(|row| row.id);

        info!(hosts = rows.len(), alpha = spectral.alpha, "centrality report built");
        Ok(CentralityReport {
            rows,
            alpha: spectral.alpha,
            generated_at: Utc::now(),
        })
    }

    /// Vulnerable-host counts over the whole graph.
    pub fn vulnerable_host_stats(&self) -> VulnerableHostStats {
        let total = self.graph.len();
        let vulnerable = self.graph.hosts().filter(|h| h.in_degree() > 0).count();
        let (vulnerable_percentage, non_vulnerable_percentage) = if total == 0 {
            (0.0, 0.0)
        } else {
            let share = 100.0 * vulnerable as f64 / total as f64;
            (share, 100.0 - share)
        };
        VulnerableHostStats {
            vulnerable_hosts: vulnerable,
            non_vulnerable_hosts: total - vulnerable,
            vulnerable_percentage,
            non_vulnerable_percentage,
        }
    }
}

/// Host sequences of the `k` highest-total paths in one dimension.
///
/// Descending order; the stable sort keeps cost ties in input order.
fn rank_paths(paths: &[PathRecord], dimension: ScoreDimension, k: usize) -> Vec<Vec<HostId>> {
    let mut order: Vec<usize> = (0..paths.len()).collect();
    order.sort_by(|&a, &b| {
        paths[b]
            .totals
            .get(dimension)
            .partial_cmp(&paths[a].totals.get(dimension))
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    order
        .into_iter()
        .take(k)
        .map(|index| paths[index].hosts.clone())
        .collect()
}
