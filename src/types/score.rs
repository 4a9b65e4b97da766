//! Probability score triples shared by both graph families.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Error raised when a score component is not a valid probability.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum ScoreError {
    /// A component lies outside the closed unit interval.
    #[error("{dimension} score {value} is outside [0, 1]")]
    OutOfRange {
        /// Dimension the offending value belongs to.
        dimension: ScoreDimension,
        /// The rejected value.
        value: f64,
    },
    /// A component is NaN or infinite.
    #[error("{dimension} score is not finite")]
    NotFinite {
        /// Dimension the offending value belongs to.
        dimension: ScoreDimension,
    },
}

/// The three score dimensions tracked for every node and host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScoreDimension {
    /// CVSS base score probability.
    Base,
    /// CVSS exploitability subscore probability.
    Exploitability,
    /// CVSS impact subscore probability.
    Impact,
}

impl ScoreDimension {
    /// All dimensions, in storage order.
    pub const ALL: [ScoreDimension; 3] = [
        ScoreDimension::Base,
        ScoreDimension::Exploitability,
        ScoreDimension::Impact,
    ];
}

impl fmt::Display for ScoreDimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Base => write!(f, "base"),
            Self::Exploitability => write!(f, "exploitability"),
            Self::Impact => write!(f, "impact"),
        }
    }
}

/// A (base, exploitability, impact) probability triple.
///
/// Every component is a probability in [0, 1]. Out-of-range input is
/// rejected at construction, never clamped.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreTriple {
    /// Base score probability.
    pub base: f64,
    /// Exploitability probability.
    pub exploitability: f64,
    /// Impact probability.
    pub impact: f64,
}

impl ScoreTriple {
    /// The certain triple (1, 1, 1), the documented default when no
    /// vulnerability score is available.
    pub const CERTAIN: ScoreTriple = ScoreTriple {
        base: 1.0,
        exploitability: 1.0,
        impact: 1.0,
    };

    /// Create a validated triple.
    pub fn new(base: f64, exploitability: f64, impact: f64) -> Result<Self, ScoreError> {
        let triple = ScoreTriple {
            base,
            exploitability,
            impact,
        };
        triple.validate()?;
        Ok(triple)
    }

    /// Create a triple with the same probability in every dimension.
    pub fn uniform(probability: f64) -> Result<Self, ScoreError> {
        Self::new(probability, probability, probability)
    }

    /// Check every component against the probability range.
    pub fn validate(&self) -> Result<(), ScoreError> {
        for dimension in ScoreDimension::ALL {
            let value = self.get(dimension);
            if !value.is_finite() {
                return Err(ScoreError::NotFinite { dimension });
            }
            if !(0.0..=1.0).contains(&value) {
                return Err(ScoreError::OutOfRange { dimension, value });
            }
        }
        Ok(())
    }

    /// Read one dimension.
    pub fn get(&self, dimension: ScoreDimension) -> f64 {
        match dimension {
            ScoreDimension::Base => self.base,
            ScoreDimension::Exploitability => self.exploitability,
            ScoreDimension::Impact => self.impact,
        }
    }

    /// Component-wise product with another triple.
    ///
    /// Intersection of independent events; the AND/FLOW accumulation step.
    pub fn multiply(&mut self, other: &ScoreTriple) {
        self.base *= other.base;
        self.exploitability *= other.exploitability;
        self.impact *= other.impact;
    }

    /// Component-wise product with the complement of another triple.
    ///
    /// Builds the complement product `∏(1 − pᵢ)`; the OR accumulation step.
    pub fn multiply_complement(&mut self, other: &ScoreTriple) {
        self.base *= 1.0 - other.base;
        self.exploitability *= 1.0 - other.exploitability;
        self.impact *= 1.0 - other.impact;
    }

    /// Replace every component with its complement.
    ///
    /// Finalizes an OR accumulator into `1 − ∏(1 − pᵢ)`.
    pub fn complement(&mut self) {
        self.base = 1.0 - self.base;
        self.exploitability = 1.0 - self.exploitability;
        self.impact = 1.0 - self.impact;
    }
}

impl Default for ScoreTriple {
    fn default() -> Self {
        Self::CERTAIN
    }
}

impl fmt::Display for ScoreTriple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.base, self.exploitability, self.impact)
    }
}

/// Unconstrained per-dimension values: sums, averages, entropies.
///
/// Unlike [`ScoreTriple`], components are not required to be probabilities.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DimensionTriple {
    /// Base dimension value.
    pub base: f64,
    /// Exploitability dimension value.
    pub exploitability: f64,
    /// Impact dimension value.
    pub impact: f64,
}

impl DimensionTriple {
    /// Read one dimension.
    pub fn get(&self, dimension: ScoreDimension) -> f64 {
        match dimension {
            ScoreDimension::Base => self.base,
            ScoreDimension::Exploitability => self.exploitability,
            ScoreDimension::Impact => self.impact,
        }
    }

    /// Accumulate a probability triple component-wise.
    pub fn add_score(&mut self, score: &ScoreTriple) {
        self.base += score.base;
        self.exploitability += score.exploitability;
        self.impact += score.impact;
    }

    /// Accumulate another value triple component-wise.
    pub fn add(&mut self, other: &DimensionTriple) {
        self.base += other.base;
        self.exploitability += other.exploitability;
        self.impact += other.impact;
    }

    /// Scale every component by a factor.
    pub fn scale(&mut self, factor: f64) {
        self.base *= factor;
        self.exploitability *= factor;
        self.impact *= factor;
    }
}
