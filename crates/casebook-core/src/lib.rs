//! Casebook Core Library
//!
//! Case-based reasoning engine for veterinary diagnosis support: given a
//! newly observed animal, find the most similar recorded cases and infer a
//! diagnosis, treatment, and prognosis from them.
//!
//! # Architecture
//!
//! ```text
//! Flat-file case base ──▶ Case Store
//!                             │
//!                     Similarity Engine
//!              (symptoms · age · environment)
//!                             │
//!                      Retrieval Ranker
//!                    (threshold + top-N)
//!                 ┌───────────┴────────────┐
//!          neighbors found           no neighbors
//!                 │                        │
//!          Inference Engine        Case-Base Updater
//!        (diagnosis, treatment,   (admit novel query as
//!              prognosis)          diagnosis-pending)
//! ```
//!
//! The engine consumes and produces plain structured records. Request
//! handling, image annotation, and model invocation live with external
//! collaborators; a single synchronous writer at a time is assumed.
//!
//! # Modules
//!
//! - [`store`]: case base with flat-file load/save
//! - [`models`]: domain types (Case, Query, Neighbor)
//! - [`similarity`]: per-attribute measures and the weighted aggregate
//! - [`retrieval`]: threshold filtering and deterministic ranking
//! - [`inference`]: majority-vote diagnosis/treatment and prognosis
//! - [`admission`]: novelty test and case-base growth

pub mod admission;
pub mod inference;
pub mod models;
pub mod retrieval;
pub mod similarity;
pub mod store;

// Re-export commonly used types
pub use inference::{infer, prognose, Inference, Prognosis};
pub use models::{Case, Neighbor, Query, PENDING_OUTCOME, UNKNOWN_DIAGNOSIS};
pub use retrieval::{retrieve, DEFAULT_THRESHOLD, DEFAULT_TOP_N};
pub use similarity::{aggregate_similarity, Weights};
pub use store::{CaseStore, StoreError};

use std::path::PathBuf;

use serde::Serialize;
use tracing::debug;

/// Engine-level errors surfaced to callers.
#[derive(Debug, thiserror::Error)]
pub enum CasebookError {
    #[error("store error: {0}")]
    Store(#[from] store::StoreError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Everything a consultation produced, ready for the rendering collaborator.
#[derive(Debug, Clone, Serialize)]
pub struct ConsultReport {
    /// Inferred diagnosis, or "Unknown" when nothing matched
    pub diagnosis: String,
    /// Recommended treatment labels
    pub treatment: Vec<String>,
    /// Outcome-based prognosis classification
    pub prognosis: Prognosis,
    /// The neighbors the inference was drawn from, best first
    pub neighbors: Vec<Neighbor>,
    /// Id of the case admitted by this consultation, if any
    pub admitted_case_id: Option<String>,
}

impl ConsultReport {
    /// Serialize the report as JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// The case-based reasoning engine bound to one case base.
///
/// Owns the store, the source path it was opened from (saves rewrite it in
/// full), and the retrieval configuration. All operations are synchronous;
/// serializing concurrent writers is the caller's concern.
pub struct Casebook {
    store: CaseStore,
    path: Option<PathBuf>,
    weights: Weights,
    threshold: f64,
    top_n: usize,
}

impl Casebook {
    /// Open the case base at `path`. A missing file yields an empty case
    /// base that will be created on first save.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, CasebookError> {
        let path = path.into();
        let store = CaseStore::load(&path)?;
        Ok(Self::with_store(store, Some(path)))
    }

    /// Open the case base at `path`, failing if the file is absent.
    pub fn open_required(path: impl Into<PathBuf>) -> Result<Self, CasebookError> {
        let path = path.into();
        let store = CaseStore::load_required(&path)?;
        Ok(Self::with_store(store, Some(path)))
    }

    /// Create an engine over an empty, unpersisted case base (for testing).
    pub fn in_memory() -> Self {
        Self::with_store(CaseStore::new(), None)
    }

    fn with_store(store: CaseStore, path: Option<PathBuf>) -> Self {
        Self {
            store,
            path,
            weights: Weights::default(),
            threshold: DEFAULT_THRESHOLD,
            top_n: DEFAULT_TOP_N,
        }
    }

    /// Replace the similarity weights.
    pub fn with_weights(mut self, weights: Weights) -> Self {
        self.weights = weights;
        self
    }

    /// Replace the similarity threshold.
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    /// Replace the neighbor count limit.
    pub fn with_top_n(mut self, top_n: usize) -> Self {
        self.top_n = top_n;
        self
    }

    /// The underlying case store.
    pub fn store(&self) -> &CaseStore {
        &self.store
    }

    /// Retrieve the cases most similar to `query`, best first.
    pub fn retrieve(&self, query: &Query) -> Vec<Neighbor> {
        retrieval::retrieve(query, &self.store, &self.weights, self.threshold, self.top_n)
    }

    /// Run a full consultation for `query`.
    ///
    /// Retrieves neighbors and infers diagnosis, treatment, and prognosis
    /// from them. When nothing matches, the whole-store similarity decides
    /// whether the query is novel enough to admit as a diagnosis-pending
    /// case; an admission is persisted immediately if the case base was
    /// opened from a file.
    pub fn consult(&mut self, query: &Query) -> Result<ConsultReport, CasebookError> {
        let neighbors = self.retrieve(query);
        let inference = infer(&neighbors);
        let prognosis = prognose(&neighbors);

        let admitted_case_id = if neighbors.is_empty() {
            let overall = admission::store_level_similarity(query, &self.store, &self.weights);
            if overall < self.threshold {
                let admitted = admission::maybe_admit(
                    &mut self.store,
                    query,
                    UNKNOWN_DIAGNOSIS.into(),
                    Vec::new(),
                    &self.weights,
                    self.threshold,
                )?;
                if admitted.is_some() {
                    self.persist()?;
                }
                admitted
            } else {
                debug!(overall, "whole-store score cleared threshold, query not admitted");
                None
            }
        } else {
            None
        };

        Ok(ConsultReport {
            diagnosis: inference.diagnosis,
            treatment: inference.treatment,
            prognosis,
            neighbors,
            admitted_case_id,
        })
    }

    /// Admit `query` with a caller-determined diagnosis and treatment if
    /// nothing similar is already recorded, persisting on success.
    pub fn admit(
        &mut self,
        query: &Query,
        diagnosis: String,
        treatment: Vec<String>,
    ) -> Result<Option<String>, CasebookError> {
        let admitted = admission::maybe_admit(
            &mut self.store,
            query,
            diagnosis,
            treatment,
            &self.weights,
            self.threshold,
        )?;
        if admitted.is_some() {
            self.persist()?;
        }
        Ok(admitted)
    }

    /// Overwrite the diagnosis, treatment, and outcome of an existing case
    /// and persist the store. An unknown id is a no-op returning `false`.
    pub fn update_case(
        &mut self,
        id: &str,
        diagnosis: String,
        treatment: Vec<String>,
        outcome: String,
    ) -> Result<bool, CasebookError> {
        let found = self.store.update_case(id, diagnosis, treatment, outcome);
        if found {
            self.persist()?;
        }
        Ok(found)
    }

    /// All cases still awaiting a diagnosis.
    pub fn unresolved_cases(&self) -> Vec<&Case> {
        self.store.unresolved_cases()
    }

    /// Rewrite the case base file from the in-memory store.
    pub fn save(&self) -> Result<(), CasebookError> {
        self.persist()
    }

    fn persist(&self) -> Result<(), CasebookError> {
        if let Some(path) = &self.path {
            self.store.save(path)?;
        }
        Ok(())
    }
}
