//! Spectral centrality: Katz and PageRank from the adjacency spectrum.
//!
//! Both measures derive from the eigen-decomposition of the 0/1
//! adjacency matrix rather than power iteration over a row-stochastic
//! matrix; the attenuation factor is the reciprocal of the largest
//! eigenvalue, clamped on degenerate spectra.

use std::time::Instant;

use nalgebra::{Complex, DMatrix, DVector};
use tracing::{debug, warn};

use super::graph::NetworkGraph;
use super::MetricsError;

/// Attenuation clamp applied when the spectrum gives no usable factor.
const CLAMPED_ALPHA: f64 = 0.1;

/// Iteration cap for the principal-eigenvector refinement.
const POWER_ITERATIONS: usize = 100;

/// Convergence tolerance for the principal-eigenvector refinement.
const POWER_TOLERANCE: f64 = 1e-10;

/// Katz and PageRank vectors over one graph snapshot.
///
/// Vectors are indexed by host arena order; both are L2-normalized on
/// nonempty graphs.
#[derive(Debug, Clone, PartialEq)]
pub struct SpectralScores {
    /// Attenuation factor derived from the largest eigenvalue.
    pub alpha: f64,
    /// Katz centrality per host.
    pub katz: Vec<f64>,
    /// PageRank centrality per host.
    pub pagerank: Vec<f64>,
}

impl SpectralScores {
    /// Compute both vectors, checking the deadline between phases.
    ///
    /// A single decomposition call is not interruptible; the checkpoints
    /// sit before the eigenvalue phase, the Katz solve, and the PageRank
    /// accumulation.
    pub fn compute(
        graph: &NetworkGraph,
        deadline: Option<Instant>,
    ) -> Result<SpectralScores, MetricsError> {
        let n = graph.len();
        if n == 0 {
            return Ok(SpectralScores {
                alpha: CLAMPED_ALPHA,
                katz: Vec::new(),
                pagerank: Vec::new(),
            });
        }

        let mut adjacency = DMatrix::<f64>::zeros(n, n);
        for edge in graph.edges() {
            adjacency[(edge.source, edge.target)] = 1.0;
        }

        check_deadline(deadline, 0)?;
        let eigenvalues = adjacency.clone().complex_eigenvalues();
        let alpha = attenuation(&eigenvalues);
        debug!(n, alpha, "adjacency spectrum computed");

        check_deadline(deadline, 1)?;
        let katz = katz_vector(&adjacency, alpha)?;

        check_deadline(deadline, 2)?;
        let principal = principal_eigenvector(&adjacency);
        let pagerank = pagerank_vector(&adjacency, &principal, alpha);

        Ok(SpectralScores {
            alpha,
            katz: katz.iter().copied().collect(),
            pagerank: pagerank.iter().copied().collect(),
        })
    }
}

fn check_deadline(deadline: Option<Instant>, completed: usize) -> Result<(), MetricsError> {
    if deadline.is_some_and(|d| Instant::now() >= d) {
        return Err(MetricsError::DeadlineExceeded { completed, total: 3 });
    }
    Ok(())
}

/// Attenuation factor `1/λmax`, with λmax ranked by (real, imaginary).
///
/// A zero maximum (nilpotent DAG adjacency) or a factor outside (0, 1]
/// clamps to 0.1.
fn attenuation(eigenvalues: &DVector<Complex<f64>>) -> f64 {
    let max = eigenvalues
        .iter()
        .copied()
        .max_by(|a, b| {
            (a.re, a.im)
                .partial_cmp(&(b.re, b.im))
                .unwrap_or(std::cmp::Ordering::Equal)
        })
        .unwrap_or_default();
    if max.norm() < f64::EPSILON {
        return CLAMPED_ALPHA;
    }
    let alpha = 1.0 / max.re;
    if !alpha.is_finite() || alpha <= 0.0 || alpha > 1.0 {
        warn!(alpha, "attenuation outside (0, 1], clamping");
        CLAMPED_ALPHA
    } else {
        alpha
    }
}

/// Katz vector `(I − α·A)⁻¹ · 1`, L2-normalized.
fn katz_vector(adjacency: &DMatrix<f64>, alpha: f64) -> Result<DVector<f64>, MetricsError> {
    let n = adjacency.nrows();
    let system = DMatrix::<f64>::identity(n, n) - adjacency * alpha;
    let ones = DVector::from_element(n, 1.0);
    let mut katz = system
        .lu()
        .solve(&ones)
        .ok_or_else(|| MetricsError::Spectral("attenuation system is singular".to_string()))?;
    let norm = katz.norm();
    if norm > 0.0 {
        katz /= norm;
    }
    Ok(katz)
}

/// Principal eigenvector of the adjacency matrix by power iteration.
///
/// A nilpotent adjacency drives the iterate to zero; the uniform vector
/// stands in for the degenerate spectrum in that case.
fn principal_eigenvector(adjacency: &DMatrix<f64>) -> DVector<f64> {
    let n = adjacency.nrows();
    let uniform = DVector::from_element(n, 1.0 / (n as f64).sqrt());
    let mut current = uniform.clone();
    for _ in 0..POWER_ITERATIONS {
        let next = adjacency * &current;
        let norm = next.norm();
        if norm < f64::EPSILON {
            return uniform;
        }
        let next = next / norm;
        if (&next - &current).norm() < POWER_TOLERANCE {
            return next;
        }
        current = next;
    }
    current
}

/// PageRank from the principal eigenvector, successor-sum form.
///
/// Each host sums its successors' eigenvector mass normalized by their
/// out-degree, plus the damping term `(1 − 1/α)/n` per peer; sink peers
/// contribute only damping. The result scales by `1/α` and is
/// L2-normalized.
fn pagerank_vector(
    adjacency: &DMatrix<f64>,
    principal: &DVector<f64>,
    alpha: f64,
) -> DVector<f64> {
    let n = adjacency.nrows();
    let out_degree: Vec<f64> = (0..n).map(|j| adjacency.row(j).sum()).collect();
    let damping = (1.0 - 1.0 / alpha) / n as f64;

    let mut pagerank = DVector::<f64>::zeros(n);
    for i in 0..n {
        let mut mass = 0.0;
        for j in 0..n {
            if out_degree[j] > 0.0 {
                mass += adjacency[(i, j)] * principal[j] / out_degree[j];
            }
            mass += damping;
        }
        pagerank[i] = mass / alpha;
    }
    let norm = pagerank.norm();
    if norm > 0.0 {
        pagerank /= norm;
    }
    pagerank
}
