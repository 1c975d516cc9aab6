use std::cmp::Ordering;
use std::fmt;

use crate::session::TrialResult;
use crate::util::mean;

/// Window sizes for the rolling trimmed averages
pub const AVERAGE_WINDOWS: [usize; 3] = [5, 12, 100];

/// A single time or average, in milliseconds, or a DNF
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Mark {
    Time(f64),
    Dnf,
}

impl Mark {
    fn of(result: &TrialResult) -> Self {
        if result.is_dnf() {
            Mark::Dnf
        } else {
            Mark::Time(result.elapsed_ms as f64)
        }
    }
}

impl fmt::Display for Mark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mark::Time(ms) => write!(f, "{:.3}", ms / 1000.0),
            Mark::Dnf => f.write_str("DNF"),
        }
    }
}

/// DNFs sort after every time
fn compare_results(a: &TrialResult, b: &TrialResult) -> Ordering {
    match (a.is_dnf(), b.is_dnf()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => a.elapsed_ms.cmp(&b.elapsed_ms),
    }
}

/// Mean of the window with its best and worst result dropped
fn trimmed_average(window: &[TrialResult]) -> Mark {
    let mut sorted = window.to_vec();
    sorted.sort_by(compare_results);
    let inner = &sorted[1..sorted.len() - 1];
    if inner.iter().any(TrialResult::is_dnf) {
        return Mark::Dnf;
    }
    let times: Vec<f64> = inner.iter().map(|r| r.elapsed_ms as f64).collect();
    mean(&times).map_or(Mark::Dnf, Mark::Time)
}

fn best_average(results: &[TrialResult], size: usize) -> Option<Mark> {
    results
        .windows(size)
        .map(trimmed_average)
        .reduce(|best, next| match (best, next) {
            (Mark::Time(b), Mark::Time(n)) if n < b => next,
            (Mark::Dnf, Mark::Time(_)) => next,
            _ => best,
        })
}

/// Figures shown under a session's results
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSummary {
    pub mean_including_dnf_ms: f64,
    pub mean_excluding_dnf_ms: Option<f64>,
    pub best: Mark,
    pub worst: Mark,
    pub best_averages: Vec<(usize, Mark)>,
}

impl SessionSummary {
    /// Summarize judged results; `None` until at least one is judged.
    pub fn from_results(results: &[TrialResult]) -> Option<Self> {
        let judged: Vec<TrialResult> = results.iter().filter(|r| r.is_judged()).cloned().collect();

        let all_times: Vec<f64> = judged.iter().map(|r| r.elapsed_ms as f64).collect();
        let mean_including_dnf_ms = mean(&all_times)?;
        let correct_times: Vec<f64> = judged
            .iter()
            .filter(|r| !r.is_dnf())
            .map(|r| r.elapsed_ms as f64)
            .collect();

        let best = judged.iter().min_by(|a, b| compare_results(a, b))?;
        let worst = judged.iter().max_by(|a, b| compare_results(a, b))?;

        let best_averages = AVERAGE_WINDOWS
            .iter()
            .filter_map(|&size| best_average(&judged, size).map(|mark| (size, mark)))
            .collect();

        Some(Self {
            mean_including_dnf_ms,
            mean_excluding_dnf_ms: mean(&correct_times),
            best: Mark::of(best),
            worst: Mark::of(worst),
            best_averages,
        })
    }
}

impl fmt::Display for SessionSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Mean (including DNF): {}",
            Mark::Time(self.mean_including_dnf_ms)
        )?;
        match self.mean_excluding_dnf_ms {
            Some(ms) => writeln!(f, "Mean (excluding DNF): {}", Mark::Time(ms))?,
            None => writeln!(f, "Mean (excluding DNF): -")?,
        }
        writeln!(f, "Worst Time: {}", self.worst)?;
        write!(f, "Best Time: {}", self.best)?;
        for (size, mark) in &self.best_averages {
            write!(f, "\nBest Average of {size}: {mark}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::Verdict;

    fn result(ms: u64, verdict: Verdict) -> TrialResult {
        TrialResult {
            pair_id: "AB".to_string(),
            algorithm: "[R, U]".to_string(),
            elapsed_ms: ms,
            verdict,
        }
    }

    #[test]
    fn empty_or_pending_gives_nothing() {
        assert_eq!(SessionSummary::from_results(&[]), None);
        assert_eq!(
            SessionSummary::from_results(&[result(100, Verdict::Pending)]),
            None
        );
    }

    #[test]
    fn means_best_and_worst() {
        let results = [
            result(3000, Verdict::Correct),
            result(5000, Verdict::Wrong),
            result(2000, Verdict::Correct),
        ];
        let summary = SessionSummary::from_results(&results).unwrap();
        assert!((summary.mean_including_dnf_ms - 10000.0 / 3.0).abs() < 1e-9);
        assert_eq!(summary.mean_excluding_dnf_ms, Some(2500.0));
        assert_eq!(summary.best, Mark::Time(2000.0));
        assert_eq!(summary.worst, Mark::Dnf);
        assert!(summary.best_averages.is_empty());
    }

    #[test]
    fn all_wrong_has_no_correct_mean() {
        let summary = SessionSummary::from_results(&[result(900, Verdict::Wrong)]).unwrap();
        assert_eq!(summary.mean_excluding_dnf_ms, None);
        assert_eq!(summary.best, Mark::Dnf);
    }

    #[test]
    fn trimmed_average_of_five() {
        let results = [
            result(1000, Verdict::Correct),
            result(2000, Verdict::Wrong),
            result(3000, Verdict::Correct),
            result(4000, Verdict::Correct),
            result(5000, Verdict::Correct),
        ];
        let summary = SessionSummary::from_results(&results).unwrap();
        // drop 1000 and the DNF, mean of 3000/4000/5000
        assert_eq!(summary.best_averages, vec![(5, Mark::Time(4000.0))]);
    }

    #[test]
    fn two_dnfs_make_the_window_dnf() {
        let results = [
            result(1000, Verdict::Wrong),
            result(2000, Verdict::Wrong),
            result(3000, Verdict::Correct),
            result(4000, Verdict::Correct),
            result(5000, Verdict::Correct),
        ];
        let summary = SessionSummary::from_results(&results).unwrap();
        assert_eq!(summary.best_averages, vec![(5, Mark::Dnf)]);
    }

    #[test]
    fn best_window_wins_and_beats_dnf() {
        let mut results = vec![result(1000, Verdict::Wrong), result(1000, Verdict::Wrong)];
        results.extend((0..5).map(|i| result(2000 + i * 100, Verdict::Correct)));
        let summary = SessionSummary::from_results(&results).unwrap();
        // one DNF is trimmed away, leaving 2100/2200/2300
        assert_eq!(summary.best_averages, vec![(5, Mark::Time(2200.0))]);
    }

    #[test]
    fn display_matches_results_panel() {
        let results = [
            result(1500, Verdict::Correct),
            result(2500, Verdict::Correct),
        ];
        let text = SessionSummary::from_results(&results).unwrap().to_string();
        assert_eq!(
            text,
            "Mean (including DNF): 2.000\nMean (excluding DNF): 2.000\nWorst Time: 2.500\nBest Time: 1.500"
        );
    }
}
