//! Ranked retrieval of similar cases.

use tracing::debug;

use crate::models::{Neighbor, Query};
use crate::similarity::{aggregate_similarity, Weights};
use crate::store::CaseStore;

/// Minimum aggregate similarity for a case to count as a match.
pub const DEFAULT_THRESHOLD: f64 = 0.5;

/// Number of neighbors returned by default.
pub const DEFAULT_TOP_N: usize = 3;

/// Retrieve the cases most similar to `query`, best first.
///
/// Every case in the store is scored; cases strictly below `threshold` are
/// discarded. Survivors are grouped by exact score and groups are emitted
/// in descending score order. Within a group, cases keep the store's
/// insertion order (the only tie-break), and emission stops once
/// `top_n` neighbors have been produced, truncating a group mid-way if
/// needed.
///
/// An empty result is a normal outcome (empty store, or nothing at or
/// above the threshold), not an error.
pub fn retrieve(
    query: &Query,
    store: &CaseStore,
    weights: &Weights,
    threshold: f64,
    top_n: usize,
) -> Vec<Neighbor> {
    let mut groups: Vec<(f64, Vec<Neighbor>)> = Vec::new();

    for case in store.iter() {
        let score = aggregate_similarity(query, case, weights);
        if score < threshold {
            continue;
        }
        let neighbor = Neighbor {
            id: case.id.clone(),
            case: case.clone(),
            score,
        };
        match groups.iter_mut().find(|(group_score, _)| *group_score == score) {
            Some((_, members)) => members.push(neighbor),
            None => groups.push((score, vec![neighbor])),
        }
    }

    groups.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));

    let mut neighbors = Vec::new();
    'emit: for (_, members) in groups {
        for neighbor in members {
            if neighbors.len() == top_n {
                break 'emit;
            }
            neighbors.push(neighbor);
        }
    }

    debug!(
        candidates = store.len(),
        matched = neighbors.len(),
        threshold,
        "retrieved similar cases"
    );
    neighbors
}
