//! Practice-priority ranking from historical results.
//!
//! Only the last three attempts of each pair count. Attempts that never
//! happened are treated as DNFs, so unpractised pairs rise to the top.

use std::cmp::Ordering;
use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::util::mean;

/// How many recent attempts feed the ranking
pub const RECENT_WINDOW: usize = 3;

/// One past attempt at a pair, oldest first in a history list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoricalResult {
    pub elapsed_ms: u64,
    pub correct: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedStat {
    pub pair_id: String,
    /// `None` when nothing has been timed yet
    pub last_three_mean_ms: Option<f64>,
    pub last_three_dnf_count: usize,
}

impl RankedStat {
    pub fn from_history(pair_id: &str, history: &[HistoricalResult]) -> Self {
        let considered = &history[history.len().saturating_sub(RECENT_WINDOW)..];
        let wrong = considered.iter().filter(|r| !r.correct).count();
        let times: Vec<f64> = considered.iter().map(|r| r.elapsed_ms as f64).collect();

        Self {
            pair_id: pair_id.to_string(),
            last_three_mean_ms: mean(&times),
            last_three_dnf_count: (RECENT_WINDOW - considered.len()) + wrong,
        }
    }

    /// Most in need of practice sorts first.
    pub fn priority_cmp(&self, other: &Self) -> Ordering {
        other
            .last_three_dnf_count
            .cmp(&self.last_three_dnf_count)
            .then_with(|| {
                cmp_mean_desc(self.last_three_mean_ms, other.last_three_mean_ms)
            })
    }
}

/// Descending by mean, with a missing mean above every real one
fn cmp_mean_desc(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(a), Some(b)) => b.total_cmp(&a),
    }
}

/// Rank every known pair. Pairs without history count as three DNFs.
/// The sort is stable, so equal pairs keep `known_pairs` order.
pub fn rank(
    history: &HashMap<String, Vec<HistoricalResult>>,
    known_pairs: &[String],
) -> Vec<RankedStat> {
    let mut stats: Vec<RankedStat> = known_pairs
        .iter()
        .map(|pair| {
            let results = history.get(pair).map(Vec::as_slice).unwrap_or_default();
            RankedStat::from_history(pair, results)
        })
        .collect();
    stats.sort_by(RankedStat::priority_cmp);
    stats
}
