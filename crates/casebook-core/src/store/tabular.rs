//! Flat-file row layout for the case base.
//!
//! The persisted format is tabular text with a fixed header; list-valued
//! columns are `", "`-joined. Every save is a full rewrite of the file.

use std::collections::BTreeSet;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{CaseStore, StoreError, StoreResult};
use crate::models::Case;

/// Separator for list-valued columns.
const LIST_SEPARATOR: &str = ", ";

/// One persisted row. Columns map 1:1 to the historical header; the age
/// column stays textual here so a bad value can be reported per-row.
#[derive(Debug, Serialize, Deserialize)]
struct CaseRecord {
    #[serde(rename = "Case ID")]
    id: String,
    #[serde(rename = "Symptoms")]
    symptoms: String,
    #[serde(rename = "Animal Age (Months)")]
    age_months: String,
    #[serde(rename = "Animal Sex")]
    sex: String,
    #[serde(rename = "Environmental Conditions")]
    environment: String,
    #[serde(rename = "Diagnosis")]
    diagnosis: String,
    #[serde(rename = "Treatment")]
    treatment: String,
    #[serde(rename = "Outcome")]
    outcome: String,
}

impl From<&Case> for CaseRecord {
    fn from(case: &Case) -> Self {
        Self {
            id: case.id.clone(),
            symptoms: join_list(case.symptoms.iter()),
            age_months: case.age_months.to_string(),
            sex: case.sex.clone(),
            environment: case.environment.clone(),
            diagnosis: case.diagnosis.clone(),
            treatment: join_list(case.treatment.iter()),
            outcome: case.outcome.clone(),
        }
    }
}

impl TryFrom<CaseRecord> for Case {
    type Error = String;

    fn try_from(record: CaseRecord) -> Result<Self, Self::Error> {
        let age_months = record
            .age_months
            .trim()
            .parse::<u32>()
            .map_err(|_| format!("non-numeric age: {:?}", record.age_months))?;

        Ok(Case {
            id: record.id,
            symptoms: split_set(&record.symptoms),
            age_months,
            sex: record.sex,
            environment: record.environment,
            diagnosis: record.diagnosis,
            treatment: split_list(&record.treatment),
            outcome: record.outcome,
        })
    }
}

fn join_list<'a>(items: impl Iterator<Item = &'a String>) -> String {
    items.cloned().collect::<Vec<_>>().join(LIST_SEPARATOR)
}

fn split_list(field: &str) -> Vec<String> {
    field
        .split(LIST_SEPARATOR)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

fn split_set(field: &str) -> BTreeSet<String> {
    field
        .split(LIST_SEPARATOR)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

impl CaseStore {
    /// Load the case base from `path`.
    ///
    /// A missing file is recoverable: the caller gets an empty store and a
    /// warning is logged. Use [`CaseStore::load_required`] to treat absence
    /// as a hard error instead. A malformed row (missing column,
    /// non-numeric age) fails the whole load with its row number.
    pub fn load<P: AsRef<Path>>(path: P) -> StoreResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            warn!(path = %path.display(), "case base not found, starting empty");
            return Ok(Self::new());
        }
        Self::read_from(path)
    }

    /// Load the case base from `path`, failing if the file is absent.
    pub fn load_required<P: AsRef<Path>>(path: P) -> StoreResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(StoreError::NotFound(path.to_path_buf()));
        }
        Self::read_from(path)
    }

    fn read_from(path: &Path) -> StoreResult<Self> {
        let mut reader = csv::Reader::from_path(path)?;
        let mut store = Self::new();

        for (index, result) in reader.deserialize::<CaseRecord>().enumerate() {
            let row = index + 1;
            let record = result.map_err(|err| StoreError::Malformed {
                row,
                reason: err.to_string(),
            })?;
            let case = Case::try_from(record)
                .map_err(|reason| StoreError::Malformed { row, reason })?;
            store.insert(case)?;
        }

        debug!(cases = store.len(), path = %path.display(), "loaded case base");
        Ok(store)
    }

    /// Serialize every case back to the tabular layout, overwriting `path`
    /// in full. Saving the same in-memory state twice writes identical
    /// bytes.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> StoreResult<()> {
        let path = path.as_ref();
        let mut writer = csv::Writer::from_path(path)?;

        for case in self.iter() {
            writer.serialize(CaseRecord::from(case))?;
        }
        writer.flush()?;

        debug!(cases = self.len(), path = %path.display(), "saved case base");
        Ok(())
    }
}
