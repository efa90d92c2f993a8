//! Diagnosis, treatment, and prognosis inference over retrieved neighbors.
//!
//! All votes are frequency-based. Ties break by first-encountered order in
//! the neighbor sequence, which retrieval keeps deterministic: the same
//! neighbors in the same order always produce the same answer.

use std::fmt;

use serde::Serialize;

use crate::models::{Neighbor, UNKNOWN_DIAGNOSIS};

/// Displayed when no similar cases were available to predict from.
pub const NO_PROGNOSIS: &str = "Unable to predict prognosis due to lack of similar cases.";

/// Diagnosis and recommended treatment inferred from the neighbor set.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Inference {
    /// Most frequent diagnosis among the neighbors
    pub diagnosis: String,
    /// Treatment labels meeting the majority support threshold
    pub treatment: Vec<String>,
}

/// Prognosis classification derived from neighbor outcomes.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub enum Prognosis {
    #[serde(rename = "Likely to recover")]
    LikelyToRecover,
    #[serde(rename = "High risk of complications or mortality")]
    HighRisk,
    #[serde(rename = "Possible long-term effects or complications")]
    PossibleComplications,
    #[serde(rename = "Unable to predict prognosis due to lack of similar cases.")]
    CannotPredict,
}

impl fmt::Display for Prognosis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Prognosis::LikelyToRecover => "Likely to recover",
            Prognosis::HighRisk => "High risk of complications or mortality",
            Prognosis::PossibleComplications => "Possible long-term effects or complications",
            Prognosis::CannotPredict => NO_PROGNOSIS,
        };
        f.write_str(label)
    }
}

/// Infer a diagnosis and treatment plan from the retrieved neighbors.
///
/// With no neighbors the result is the unknown sentinel for both fields.
/// The diagnosis is the most frequent value; the treatment keeps every
/// label supported by at least `neighbors.len() / 2` neighbors (integer
/// floor, so a single neighbor contributes all of its labels), ordered by
/// descending support.
pub fn infer(neighbors: &[Neighbor]) -> Inference {
    if neighbors.is_empty() {
        return Inference {
            diagnosis: UNKNOWN_DIAGNOSIS.into(),
            treatment: vec![UNKNOWN_DIAGNOSIS.into()],
        };
    }

    let diagnoses = frequency_table(neighbors.iter().map(|n| n.case.diagnosis.as_str()));
    let diagnosis = most_frequent(&diagnoses)
        .unwrap_or(UNKNOWN_DIAGNOSIS)
        .to_string();

    let mut treatments = frequency_table(
        neighbors
            .iter()
            .flat_map(|n| n.case.treatment.iter().map(String::as_str)),
    );
    // stable: equal support keeps first-encountered order
    treatments.sort_by(|a, b| b.1.cmp(&a.1));

    let support = neighbors.len() / 2;
    let treatment = treatments
        .into_iter()
        .filter(|(_, count)| *count >= support)
        .map(|(label, _)| label.to_string())
        .collect();

    Inference {
        diagnosis,
        treatment,
    }
}

/// Predict a prognosis from the outcomes of the retrieved neighbors.
///
/// The most frequent outcome is classified by substring, checked in
/// priority order: "Recovered" first, then "Euthanized" / "Died". An
/// outcome like "Recovered after treatment" still counts as a recovery.
pub fn prognose(neighbors: &[Neighbor]) -> Prognosis {
    if neighbors.is_empty() {
        return Prognosis::CannotPredict;
    }

    let outcomes = frequency_table(neighbors.iter().map(|n| n.case.outcome.as_str()));
    let outcome = most_frequent(&outcomes).unwrap_or("");

    if outcome.contains("Recovered") {
        Prognosis::LikelyToRecover
    } else if outcome.contains("Euthanized") || outcome.contains("Died") {
        Prognosis::HighRisk
    } else {
        Prognosis::PossibleComplications
    }
}

/// Count occurrences, keeping first-encountered order.
fn frequency_table<'a>(values: impl Iterator<Item = &'a str>) -> Vec<(&'a str, usize)> {
    let mut table: Vec<(&'a str, usize)> = Vec::new();
    for value in values {
        match table.iter_mut().find(|(seen, _)| *seen == value) {
            Some((_, count)) => *count += 1,
            None => table.push((value, 1)),
        }
    }
    table
}

/// Highest-count entry; the first-encountered value wins ties.
fn most_frequent<'a>(table: &[(&'a str, usize)]) -> Option<&'a str> {
    let mut best: Option<(&'a str, usize)> = None;
    for &(value, count) in table {
        match best {
            Some((_, best_count)) if count <= best_count => {}
            _ => best = Some((value, count)),
        }
    }
    best.map(|(value, _)| value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Case;

    fn neighbor(id: &str, diagnosis: &str, treatment: &[&str], outcome: &str) -> Neighbor {
        Neighbor {
            id: id.into(),
            case: Case {
                id: id.into(),
                symptoms: ["fever".to_string()].into_iter().collect(),
                age_months: 18,
                sex: "Female".into(),
                environment: "Livestock farm".into(),
                diagnosis: diagnosis.into(),
                treatment: treatment.iter().map(|s| s.to_string()).collect(),
                outcome: outcome.into(),
            },
            score: 0.9,
        }
    }

    #[test]
    fn test_infer_empty_neighbors_returns_unknown() {
        let result = infer(&[]);
        assert_eq!(result.diagnosis, "Unknown");
        assert_eq!(result.treatment, vec!["Unknown"]);
    }

    #[test]
    fn test_infer_majority_diagnosis() {
        let neighbors = vec![
            neighbor("CASE001", "FMD", &["Rest"], "Recovered"),
            neighbor("CASE002", "BRD", &["Rest"], "Recovered"),
            neighbor("CASE003", "FMD", &["Rest"], "Recovered"),
        ];
        assert_eq!(infer(&neighbors).diagnosis, "FMD");
    }

    #[test]
    fn test_infer_diagnosis_tie_breaks_first_encountered() {
        let neighbors = vec![
            neighbor("CASE001", "A", &[], "Recovered"),
            neighbor("CASE002", "B", &[], "Recovered"),
        ];
        assert_eq!(infer(&neighbors).diagnosis, "A");

        let reversed = vec![
            neighbor("CASE002", "B", &[], "Recovered"),
            neighbor("CASE001", "A", &[], "Recovered"),
        ];
        assert_eq!(infer(&reversed).diagnosis, "B");
    }

    #[test]
    fn test_infer_treatment_support_threshold() {
        // Support floor is 3 / 2 = 1; every label seen once still passes,
        // and the twice-supported label ranks first.
        let neighbors = vec![
            neighbor("CASE001", "FMD", &["Antibiotics", "Rest"], "Recovered"),
            neighbor("CASE002", "FMD", &["Antibiotics"], "Recovered"),
            neighbor("CASE003", "FMD", &["Quarantine"], "Recovered"),
        ];
        assert_eq!(
            infer(&neighbors).treatment,
            vec!["Antibiotics", "Rest", "Quarantine"]
        );
    }

    #[test]
    fn test_infer_treatment_drops_low_support_labels() {
        // Support floor is 4 / 2 = 2; singletons are dropped.
        let neighbors = vec![
            neighbor("CASE001", "FMD", &["Antibiotics", "Rest"], "Recovered"),
            neighbor("CASE002", "FMD", &["Antibiotics"], "Recovered"),
            neighbor("CASE003", "FMD", &["Quarantine"], "Recovered"),
            neighbor("CASE004", "FMD", &["Antibiotics", "Rest"], "Recovered"),
        ];
        assert_eq!(infer(&neighbors).treatment, vec!["Antibiotics", "Rest"]);
    }

    #[test]
    fn test_infer_single_neighbor_keeps_all_labels() {
        let neighbors = vec![neighbor(
            "CASE001",
            "FMD",
            &["Antibiotics", "Quarantine", "Supportive care"],
            "Recovered",
        )];
        assert_eq!(
            infer(&neighbors).treatment,
            vec!["Antibiotics", "Quarantine", "Supportive care"]
        );
    }

    #[test]
    fn test_prognose_empty_neighbors() {
        assert_eq!(prognose(&[]), Prognosis::CannotPredict);
        assert_eq!(Prognosis::CannotPredict.to_string(), NO_PROGNOSIS);
    }

    #[test]
    fn test_prognose_substring_classification() {
        let recovered = vec![neighbor("CASE001", "FMD", &[], "Recovered after treatment")];
        assert_eq!(prognose(&recovered), Prognosis::LikelyToRecover);

        let died = vec![neighbor("CASE001", "FMD", &[], "Died within a week")];
        assert_eq!(prognose(&died), Prognosis::HighRisk);

        let euthanized = vec![neighbor("CASE001", "FMD", &[], "Euthanized")];
        assert_eq!(prognose(&euthanized), Prognosis::HighRisk);

        let other = vec![neighbor("CASE001", "FMD", &[], "Chronic lameness")];
        assert_eq!(prognose(&other), Prognosis::PossibleComplications);
    }

    #[test]
    fn test_prognose_recovery_takes_priority() {
        // Both markers present in the voted outcome: "Recovered" wins
        let neighbors = vec![neighbor(
            "CASE001",
            "FMD",
            &[],
            "Recovered, though two herd mates Died",
        )];
        assert_eq!(prognose(&neighbors), Prognosis::LikelyToRecover);
    }

    #[test]
    fn test_prognose_majority_outcome() {
        let neighbors = vec![
            neighbor("CASE001", "FMD", &[], "Died"),
            neighbor("CASE002", "FMD", &[], "Recovered"),
            neighbor("CASE003", "FMD", &[], "Recovered"),
        ];
        assert_eq!(prognose(&neighbors), Prognosis::LikelyToRecover);
    }

    #[test]
    fn test_display_labels() {
        assert_eq!(Prognosis::LikelyToRecover.to_string(), "Likely to recover");
        assert_eq!(
            Prognosis::HighRisk.to_string(),
            "High risk of complications or mortality"
        );
        assert_eq!(
            Prognosis::PossibleComplications.to_string(),
            "Possible long-term effects or complications"
        );
    }
}
