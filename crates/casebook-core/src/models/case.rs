//! Recorded clinical cases.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Diagnosis value for cases still awaiting a determination.
pub const UNKNOWN_DIAGNOSIS: &str = "Unknown";

/// Outcome value for cases whose outcome has not been observed yet.
pub const PENDING_OUTCOME: &str = "Not determined yet";

/// A recorded clinical case.
///
/// Created either by bulk load from the persisted case base or by admission
/// of a novel query. The `diagnosis`, `treatment`, and `outcome` fields are
/// the only mutable ones, overwritten by an explicit correction; `id` is
/// assigned once and never changes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Case {
    /// Stable identifier, unique within a store
    pub id: String,
    /// Observed symptom labels (duplicates collapsed)
    pub symptoms: BTreeSet<String>,
    /// Animal age in months
    pub age_months: u32,
    /// Animal sex, recorded for the chart but not scored for similarity
    pub sex: String,
    /// Free-text description of environmental conditions
    pub environment: String,
    /// Diagnosis, or [`UNKNOWN_DIAGNOSIS`] while pending
    pub diagnosis: String,
    /// Ordered treatment labels; empty while the diagnosis is pending
    pub treatment: Vec<String>,
    /// Observed outcome (e.g. "Recovered", "Died"), or [`PENDING_OUTCOME`]
    pub outcome: String,
}

impl Case {
    /// Check whether this case is still awaiting a diagnosis.
    pub fn is_unresolved(&self) -> bool {
        self.diagnosis == UNKNOWN_DIAGNOSIS
    }

    /// Overwrite the mutable fields of this case.
    pub fn correct(&mut self, diagnosis: String, treatment: Vec<String>, outcome: String) {
        self.diagnosis = diagnosis;
        self.treatment = treatment;
        self.outcome = outcome;
    }
}
