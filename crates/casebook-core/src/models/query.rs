//! Queries and retrieval results.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::case::{Case, PENDING_OUTCOME};

/// A new, not-yet-diagnosed observation used to probe the case base.
///
/// Carries only the observed attributes: no id, diagnosis, treatment, or
/// outcome. A query is never persisted directly; admission turns it into a
/// [`Case`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Query {
    /// Observed symptom labels (duplicates collapsed)
    pub symptoms: BTreeSet<String>,
    /// Animal age in months
    pub age_months: u32,
    /// Animal sex
    pub sex: String,
    /// Free-text description of environmental conditions
    pub environment: String,
}

impl Query {
    /// Build the case this query becomes when admitted to the case base.
    ///
    /// Diagnosis and treatment are whatever the caller has determined so
    /// far; the outcome is always [`PENDING_OUTCOME`] at admission time.
    pub fn into_case(self, id: String, diagnosis: String, treatment: Vec<String>) -> Case {
        Case {
            id,
            symptoms: self.symptoms,
            age_months: self.age_months,
            sex: self.sex,
            environment: self.environment,
            diagnosis,
            treatment,
            outcome: PENDING_OUTCOME.into(),
        }
    }
}

/// A retrieved case paired with its similarity to the query.
///
/// Ephemeral: produced by retrieval and consumed by inference, never stored.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Neighbor {
    /// Id of the matched case
    pub id: String,
    /// The matched case
    pub case: Case,
    /// Aggregate similarity score in [0, 1]
    pub score: f64,
}
