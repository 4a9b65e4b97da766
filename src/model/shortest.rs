//! All-pairs shortest-path table with multiplicity bookkeeping.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Instant;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::types::{HostId, ScoreDimension};

use super::graph::NetworkGraph;
use super::paths::PathEnumerator;
use super::MetricsError;

/// Minimal path cost between a host pair and how many paths achieve it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PathCost {
    /// Minimal aggregate base-score cost.
    pub cost: f64,
    /// Number of paths tied at the minimum, by exact cost equality.
    pub multiplicity: usize,
}

/// Shortest-path costs for every connected ordered host pair.
///
/// Keys run from the lower-layer host to the higher-layer host; pairs
/// with no connecting path are absent, not zero. Computed once per
/// analysis session and shared read-only afterwards.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShortestPathTable {
    entries: BTreeMap<(HostId, HostId), PathCost>,
}

impl ShortestPathTable {
    /// Compute the table over all ascending-layer host pairs.
    ///
    /// Pairs are enumerated in parallel; the optional deadline is checked
    /// between pairs and expiry surfaces as a partial-results error.
    pub fn compute(
        graph: &NetworkGraph,
        deadline: Option<Instant>,
    ) -> Result<Self, MetricsError> {
        let started = Instant::now();
        let pairs: Vec<(usize, usize, HostId, HostId)> = graph
            .indexed_hosts()
            .flat_map(|(source_index, source)| {
                graph
                    .indexed_hosts()
                    .filter(|(_, target)| source.layer < target.layer)
                    .map(|(target_index, target)| {
                        (source_index, target_index, source.id, target.id)
                    })
                    .collect::<Vec<_>>()
            })
            .collect();

        let total = pairs.len();
        let expired = AtomicBool::new(false);
        let completed = AtomicUsize::new(0);
        let enumerator = PathEnumerator::new(graph);

        let computed: Vec<Option<((HostId, HostId), PathCost)>> = pairs
            .into_par_iter()
            .map(|(source_index, target_index, source, target)| {
                if expired.load(Ordering::Relaxed) {
                    return None;
                }
                if deadline.is_some_and(|d| Instant::now() >= d) {
                    expired.store(true, Ordering::Relaxed);
                    return None;
                }
                let paths = enumerator.enumerate_indices(target_index, source_index);
                completed.fetch_add(1, Ordering::Relaxed);
                if paths.is_empty() {
                    return None;
                }
                let mut costs: Vec<f64> = paths
                    .iter()
                    .map(|p| p.total(graph, ScoreDimension::Base))
                    .collect();
                costs.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
                let minimum = costs[0];
                let multiplicity = costs.iter().take_while(|&&c| c == minimum).count();
                Some(((source, target), PathCost { cost: minimum, multiplicity }))
            })
            .collect();

        if expired.load(Ordering::Relaxed) {
            return Err(MetricsError::DeadlineExceeded {
                completed: completed.load(Ordering::Relaxed),
                total,
            });
        }

        let entries: BTreeMap<(HostId, HostId), PathCost> =
            computed.into_iter().flatten().collect();
        info!(
            pairs = total,
            connected = entries.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "shortest-path table built"
        );
        Ok(Self { entries })
    }

    /// Cost entry for an exact ordered pair.
    pub fn get(&self, source: HostId, target: HostId) -> Option<&PathCost> {
        self.entries.get(&(source, target))
    }

    /// Distance between two hosts, looked up regardless of pair order.
    pub fn distance_between(&self, a: HostId, b: HostId) -> Option<f64> {
        self.get(a, b).or_else(|| self.get(b, a)).map(|e| e.cost)
    }

    /// Iterate all entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&(HostId, HostId), &PathCost)> {
        self.entries.iter()
    }

    /// Number of connected pairs.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no pair is connected.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
