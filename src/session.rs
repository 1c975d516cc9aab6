use thiserror::Error;

use crate::catalog::Catalog;
use crate::clock::{MonotonicTime, TimeSource, TrialClock};
use crate::notation::{Commutator, MoveSequence};
use crate::summary::SessionSummary;

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum Verdict {
    Correct,
    Wrong,
    Pending,
}

/// Outcome of one timed trial
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrialResult {
    pub pair_id: String,
    pub algorithm: String,
    pub elapsed_ms: u64,
    pub verdict: Verdict,
}

impl TrialResult {
    pub fn is_dnf(&self) -> bool {
        self.verdict == Verdict::Wrong
    }

    pub fn is_judged(&self) -> bool {
        self.verdict != Verdict::Pending
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum SessionPhase {
    Idle,
    AwaitingStart,
    Running,
    AwaitingVerdict,
    Paused,
    Finished,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    pub item_count: usize,
    pub pause_between_trials: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("cannot {action} while {phase}")]
    InvalidState {
        action: &'static str,
        phase: SessionPhase,
    },
    #[error("the last trial has already been judged")]
    AlreadyJudged,
    #[error("cannot practice {requested} pairs, {available} available")]
    InvalidConfig { requested: usize, available: usize },
    #[error("a trial must be judged correct or wrong")]
    InvalidVerdict,
}

/// Where the session went after a verdict
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JudgeOutcome {
    Paused,
    NextTrial,
    Finished(Vec<TrialResult>),
}

#[derive(Debug, Clone)]
struct SessionItem {
    pair_id: String,
    algorithm: String,
    commutator: Commutator,
}

/// Drives a run of timed trials over a prefix of the catalog
#[derive(Debug)]
pub struct Session<S: TimeSource = MonotonicTime> {
    phase: SessionPhase,
    config: Option<SessionConfig>,
    items: Vec<SessionItem>,
    cursor: usize,
    results: Vec<TrialResult>,
    verification: MoveSequence,
    clock: TrialClock<S>,
}

impl Session<MonotonicTime> {
    pub fn new() -> Self {
        Self::with_time_source(MonotonicTime::new())
    }
}

impl Default for Session<MonotonicTime> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: TimeSource> Session<S> {
    pub fn with_time_source(source: S) -> Self {
        Self {
            phase: SessionPhase::Idle,
            config: None,
            items: Vec::new(),
            cursor: 0,
            results: Vec::new(),
            verification: MoveSequence::default(),
            clock: TrialClock::with_source(source),
        }
    }

    /// Begin a new run over the first `item_count` practicable items of the
    /// catalog's current order. Any run in progress is discarded.
    pub fn start(&mut self, catalog: &Catalog, config: SessionConfig) -> Result<(), SessionError> {
        let items: Vec<SessionItem> = catalog
            .practicable_items()
            .into_iter()
            .filter_map(|item| {
                let commutator = Commutator::parse(&item.algorithm).ok()?;
                Some(SessionItem {
                    pair_id: item.pair_id.clone(),
                    algorithm: item.algorithm.clone(),
                    commutator,
                })
            })
            .collect();

        if config.item_count == 0 || config.item_count > items.len() {
            return Err(SessionError::InvalidConfig {
                requested: config.item_count,
                available: items.len(),
            });
        }

        if matches!(
            self.phase,
            SessionPhase::Running | SessionPhase::AwaitingVerdict | SessionPhase::Paused
        ) {
            log::info!(
                "abandoning session after {} of {} trials",
                self.results.len(),
                self.items.len()
            );
        }

        self.items = items.into_iter().take(config.item_count).collect();
        self.config = Some(config);
        self.cursor = 0;
        self.results.clear();
        self.verification = MoveSequence::default();
        self.phase = SessionPhase::AwaitingStart;
        log::debug!("session started with {} pairs", config.item_count);
        Ok(())
    }

    pub fn begin_trial(&mut self) -> Result<(), SessionError> {
        match self.phase {
            SessionPhase::AwaitingStart | SessionPhase::Paused => {
                self.run_next();
                Ok(())
            }
            phase => Err(SessionError::InvalidState {
                action: "begin a trial",
                phase,
            }),
        }
    }

    pub fn stop_trial(&mut self) -> Result<&TrialResult, SessionError> {
        if self.phase != SessionPhase::Running {
            return Err(SessionError::InvalidState {
                action: "stop a trial",
                phase: self.phase,
            });
        }
        self.clock.stop();
        let item = &self.items[self.cursor];
        self.results.push(TrialResult {
            pair_id: item.pair_id.clone(),
            algorithm: item.algorithm.clone(),
            elapsed_ms: self.clock.elapsed_ms(),
            verdict: Verdict::Pending,
        });
        self.cursor += 1;
        self.phase = SessionPhase::AwaitingVerdict;
        Ok(&self.results[self.results.len() - 1])
    }

    pub fn judge(&mut self, verdict: Verdict) -> Result<JudgeOutcome, SessionError> {
        match self.phase {
            SessionPhase::AwaitingVerdict => {}
            SessionPhase::Paused | SessionPhase::Finished => {
                return Err(SessionError::AlreadyJudged)
            }
            phase => {
                return Err(SessionError::InvalidState {
                    action: "judge a trial",
                    phase,
                })
            }
        }
        if verdict == Verdict::Pending {
            return Err(SessionError::InvalidVerdict);
        }

        let index = self.results.len() - 1;
        let last = &mut self.results[index];
        if last.is_judged() {
            return Err(SessionError::AlreadyJudged);
        }
        last.verdict = verdict;
        log::debug!("{} judged {verdict} in {}ms", last.pair_id, last.elapsed_ms);

        self.verification
            .extend_from(&self.items[index].commutator.expand());

        let pause = self.config.is_some_and(|c| c.pause_between_trials);
        if self.cursor == self.items.len() {
            self.phase = SessionPhase::Finished;
            log::info!("session finished after {} trials", self.results.len());
            Ok(JudgeOutcome::Finished(self.results.clone()))
        } else if pause {
            self.phase = SessionPhase::Paused;
            Ok(JudgeOutcome::Paused)
        } else {
            self.run_next();
            Ok(JudgeOutcome::NextTrial)
        }
    }

    /// The algorithm of the trial waiting for a verdict
    pub fn reveal_algorithm(&self) -> Result<&str, SessionError> {
        if self.phase != SessionPhase::AwaitingVerdict {
            return Err(SessionError::InvalidState {
                action: "reveal the algorithm",
                phase: self.phase,
            });
        }
        Ok(&self.items[self.cursor - 1].algorithm)
    }

    fn run_next(&mut self) {
        self.clock.start_from_zero();
        self.phase = SessionPhase::Running;
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn config(&self) -> Option<SessionConfig> {
        self.config
    }

    /// Pair being timed, or the next one up while waiting to begin
    pub fn current_pair(&self) -> Option<&str> {
        let index = match self.phase {
            SessionPhase::AwaitingVerdict => self.cursor.checked_sub(1)?,
            SessionPhase::AwaitingStart | SessionPhase::Running | SessionPhase::Paused => {
                self.cursor
            }
            SessionPhase::Idle | SessionPhase::Finished => return None,
        };
        self.items.get(index).map(|item| item.pair_id.as_str())
    }

    pub fn results(&self) -> &[TrialResult] {
        &self.results
    }

    /// Concatenated expansions of every judged trial, in order
    pub fn verification_sequence(&self) -> &MoveSequence {
        &self.verification
    }

    pub fn clock(&self) -> &TrialClock<S> {
        &self.clock
    }

    /// (judged trials, total trials)
    pub fn progress(&self) -> (usize, usize) {
        let judged = self.results.iter().filter(|r| r.is_judged()).count();
        (judged, self.items.len())
    }

    pub fn summary(&self) -> Option<SessionSummary> {
        SessionSummary::from_results(&self.results)
    }
}
