//! Case-base growth for novel, dissimilar queries.
//!
//! Two similarity paths feed the admission decision, inherited from the
//! historical system: per-case retrieval, and a single score of the query
//! against the whole store. They share a threshold but measure different
//! things; callers choose which to consult. They are deliberately not
//! unified here; treat the whole-store path as suspect when reviewing
//! admission behavior.

use std::collections::BTreeSet;

use tracing::info;

use crate::models::Query;
use crate::retrieval::retrieve;
use crate::similarity::{
    age_similarity, environment_similarity, symptom_similarity, SimilarityBreakdown, Weights,
};
use crate::store::{CaseStore, StoreResult};

/// Admit `query` as a new, diagnosis-pending case if nothing in the store
/// reaches `threshold`.
///
/// Diagnosis and treatment are whatever the caller has determined so far;
/// the outcome starts as the pending sentinel. The new id is derived from
/// the store size at admission time. Returns the admitted id, or `None`
/// when a sufficiently similar case already exists. Persisting the grown
/// store is the caller's responsibility.
pub fn maybe_admit(
    store: &mut CaseStore,
    query: &Query,
    diagnosis: String,
    treatment: Vec<String>,
    weights: &Weights,
    threshold: f64,
) -> StoreResult<Option<String>> {
    // Only emptiness matters, so one neighbor is enough to ask for.
    if !retrieve(query, store, weights, threshold, 1).is_empty() {
        return Ok(None);
    }

    let id = store.next_id();
    store.insert(
        query
            .clone()
            .into_case(id.clone(), diagnosis, treatment),
    )?;
    info!(case_id = %id, "admitted novel case pending diagnosis");
    Ok(Some(id))
}

/// Aggregate similarity of the query against the entire store treated as a
/// single pseudo-case.
///
/// The store as a whole presents no symptoms, a zero age, and an empty
/// environment description, so any query with symptoms scores near zero
/// here regardless of the store's contents. Retained for compatibility
/// with the historical admission flow.
pub fn store_level_similarity(query: &Query, _store: &CaseStore, weights: &Weights) -> f64 {
    let breakdown = SimilarityBreakdown {
        symptoms: symptom_similarity(&query.symptoms, &BTreeSet::new()),
        age: age_similarity(query.age_months, 0),
        environment: environment_similarity(&query.environment, ""),
    };
    breakdown.weighted(weights)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Case, PENDING_OUTCOME, UNKNOWN_DIAGNOSIS};
    use crate::retrieval::DEFAULT_THRESHOLD;

    fn query(symptoms: &[&str], age_months: u32, environment: &str) -> Query {
        Query {
            symptoms: symptoms.iter().map(|s| s.to_string()).collect(),
            age_months,
            sex: "Female".into(),
            environment: environment.into(),
        }
    }

    fn store_with_case(id: &str, symptoms: &[&str], age_months: u32) -> CaseStore {
        let mut store = CaseStore::new();
        store
            .insert(Case {
                id: id.into(),
                symptoms: symptoms.iter().map(|s| s.to_string()).collect(),
                age_months,
                sex: "Male".into(),
                environment: "Livestock farm".into(),
                diagnosis: "FMD".into(),
                treatment: vec!["Rest".into()],
                outcome: "Recovered".into(),
            })
            .unwrap();
        store
    }

    #[test]
    fn test_novel_query_is_admitted() {
        let mut store = store_with_case("CASE001", &["diarrhea"], 90);
        let query = query(&["fever", "mouth lesions"], 6, "Indoor pen");

        let admitted = maybe_admit(
            &mut store,
            &query,
            UNKNOWN_DIAGNOSIS.into(),
            vec![],
            &Weights::default(),
            DEFAULT_THRESHOLD,
        )
        .unwrap();

        assert_eq!(admitted.as_deref(), Some("CASE002"));
        let case = store.get("CASE002").unwrap();
        assert!(case.is_unresolved());
        assert!(case.treatment.is_empty());
        assert_eq!(case.outcome, PENDING_OUTCOME);
    }

    #[test]
    fn test_matched_query_is_not_admitted() {
        let mut store = store_with_case("CASE001", &["fever", "lameness"], 18);
        let query = query(&["fever", "lameness"], 18, "Livestock farm");

        let admitted = maybe_admit(
            &mut store,
            &query,
            UNKNOWN_DIAGNOSIS.into(),
            vec![],
            &Weights::default(),
            DEFAULT_THRESHOLD,
        )
        .unwrap();

        assert!(admitted.is_none());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_admitted_diagnosis_is_caller_supplied() {
        let mut store = CaseStore::new();
        let query = query(&["fever"], 12, "Feedlot");

        let admitted = maybe_admit(
            &mut store,
            &query,
            "Unknown pending diagnosis".into(),
            vec![],
            &Weights::default(),
            DEFAULT_THRESHOLD,
        )
        .unwrap();

        assert_eq!(admitted.as_deref(), Some("CASE001"));
        assert_eq!(
            store.get("CASE001").unwrap().diagnosis,
            "Unknown pending diagnosis"
        );
    }

    #[test]
    fn test_store_level_similarity_ignores_store_contents() {
        let store = store_with_case("CASE001", &["fever", "lameness"], 18);
        // Even a query identical to a stored case scores ~0 on this path
        let q = query(&["fever", "lameness"], 18, "Livestock farm");
        let score = store_level_similarity(&q, &store, &Weights::default());
        assert!(score < 1e-9);
    }

    #[test]
    fn test_store_level_similarity_of_attribute_free_query() {
        let store = CaseStore::new();
        // No symptoms, zero age, empty environment: age and environment
        // both count as identical to the pseudo-case
        let q = query(&[], 0, "");
        let score = store_level_similarity(&q, &store, &Weights::default());
        assert!((score - 0.4).abs() < 1e-9);
    }
}
