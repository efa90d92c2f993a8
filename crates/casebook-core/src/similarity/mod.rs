//! Per-attribute similarity measures and the weighted aggregate.
//!
//! Scoring weights (defaults, preserved from the historical system):
//! - Symptom overlap: 60%
//! - Age proximity: 20%
//! - Environment description: 20%
//!
//! The animal's sex is part of the case schema but is not scored. Weights
//! are always threaded in explicitly; there is no ambient configuration.

mod sequence;

pub use sequence::matching_blocks_ratio;

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::models::{Case, Query};

/// Weights applied to the per-attribute scores.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Weights {
    /// Weight of the symptom overlap score
    pub symptoms: f64,
    /// Weight of the age proximity score
    pub age: f64,
    /// Weight of the environment description score
    pub environment: f64,
}

impl Default for Weights {
    fn default() -> Self {
        Self {
            symptoms: 0.6,
            age: 0.2,
            environment: 0.2,
        }
    }
}

/// Per-attribute scores for one query/case comparison.
#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct SimilarityBreakdown {
    /// Symptom overlap (0.0 - 1.0)
    pub symptoms: f64,
    /// Age proximity (0.0 - 1.0)
    pub age: f64,
    /// Environment description similarity (0.0 - 1.0)
    pub environment: f64,
}

impl SimilarityBreakdown {
    /// Collapse the breakdown into one scalar with the given weights.
    pub fn weighted(&self, weights: &Weights) -> f64 {
        self.symptoms * weights.symptoms
            + self.age * weights.age
            + self.environment * weights.environment
    }
}

/// Ratio of shared symptoms to the larger symptom set.
///
/// `|a ∩ b| / max(|a|, |b|, 1)`. The denominator is the larger set size,
/// not the union; ranking outcomes depend on this exact formula whenever
/// the two sets differ in size.
pub fn symptom_similarity(a: &BTreeSet<String>, b: &BTreeSet<String>) -> f64 {
    let common = a.intersection(b).count();
    common as f64 / a.len().max(b.len()).max(1) as f64
}

/// Linear age proximity: 1 at equal ages, decaying with the gap relative
/// to the older animal. Two zero ages count as identical.
pub fn age_similarity(a: u32, b: u32) -> f64 {
    let max_age = a.max(b);
    if max_age == 0 {
        return 1.0;
    }
    1.0 - a.abs_diff(b) as f64 / max_age as f64
}

/// Character-level similarity of two environment descriptions.
pub fn environment_similarity(a: &str, b: &str) -> f64 {
    matching_blocks_ratio(a, b)
}

/// Score a case against a query on every attribute.
pub fn breakdown(query: &Query, case: &Case) -> SimilarityBreakdown {
    SimilarityBreakdown {
        symptoms: symptom_similarity(&query.symptoms, &case.symptoms),
        age: age_similarity(query.age_months, case.age_months),
        environment: environment_similarity(&query.environment, &case.environment),
    }
}

/// Weighted aggregate similarity between a query and a case, in [0, 1].
pub fn aggregate_similarity(query: &Query, case: &Case, weights: &Weights) -> f64 {
    breakdown(query, case).weighted(weights)
}
