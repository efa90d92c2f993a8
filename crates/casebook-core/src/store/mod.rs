//! Case store: the in-memory case base and its flat-file persistence.

mod tabular;

use std::path::PathBuf;

use thiserror::Error;

use crate::models::Case;

/// Store errors.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("case base format error: {0}")]
    Csv(#[from] csv::Error),

    #[error("case base not found: {0}")]
    NotFound(PathBuf),

    #[error("malformed record at row {row}: {reason}")]
    Malformed { row: usize, reason: String },

    #[error("duplicate case id: {0}")]
    DuplicateId(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// The case base: an insertion-ordered collection of cases with unique ids.
///
/// Enumeration order is insertion order, which doubles as the tie-break
/// order for retrieval ranking, so it must stay stable across loads.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CaseStore {
    cases: Vec<Case>,
}

impl CaseStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of cases in the store.
    pub fn len(&self) -> usize {
        self.cases.len()
    }

    /// Check whether the store holds no cases.
    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }

    /// Iterate cases in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Case> {
        self.cases.iter()
    }

    /// Look up a case by id.
    pub fn get(&self, id: &str) -> Option<&Case> {
        self.cases.iter().find(|case| case.id == id)
    }

    /// Add a case to the store. Rejects ids already present.
    pub fn insert(&mut self, case: Case) -> StoreResult<()> {
        if self.get(&case.id).is_some() {
            return Err(StoreError::DuplicateId(case.id));
        }
        self.cases.push(case);
        Ok(())
    }

    /// Next auto-generated id, derived from the current store size.
    ///
    /// Valid only under the single-writer, no-delete model: a deletion or a
    /// concurrent admission would make the size-derived number collide.
    pub fn next_id(&self) -> String {
        format!("CASE{:03}", self.cases.len() + 1)
    }

    /// Overwrite the diagnosis, treatment, and outcome of an existing case.
    ///
    /// Returns `true` if the case was found and corrected. An unknown id is
    /// a no-op returning `false`, never an error and never an insert.
    pub fn update_case(
        &mut self,
        id: &str,
        diagnosis: String,
        treatment: Vec<String>,
        outcome: String,
    ) -> bool {
        match self.cases.iter_mut().find(|case| case.id == id) {
            Some(case) => {
                case.correct(diagnosis, treatment, outcome);
                true
            }
            None => false,
        }
    }

    /// All cases whose diagnosis is still pending.
    pub fn unresolved_cases(&self) -> Vec<&Case> {
        self.cases.iter().filter(|case| case.is_unresolved()).collect()
    }
}
