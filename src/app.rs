use std::collections::HashMap;

use crate::catalog::{Catalog, Violation};
use crate::clock::{MonotonicTime, TimeSource};
use crate::ranking::{rank, RankedStat};
use crate::runtime::Action;
use crate::session::{JudgeOutcome, Session, SessionConfig, SessionPhase, Verdict};
use crate::store::{ResultLogger, ResultStore};
use crate::verify;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Continue,
    Quit,
}

/// Ties the catalog, the running session and result logging to key actions
pub struct App<S: ResultStore, T: TimeSource = MonotonicTime> {
    pub catalog: Catalog,
    pub session: Session<T>,
    pub logger: ResultLogger<S>,
    pub session_config: SessionConfig,
    pub violations: Vec<Violation>,
    /// Algorithm shown on request while a verdict is pending
    pub revealed: Option<String>,
    pub status: Option<String>,
}

impl<S: ResultStore> App<S, MonotonicTime> {
    pub fn new(
        catalog: Catalog,
        violations: Vec<Violation>,
        logger: ResultLogger<S>,
        session_config: SessionConfig,
    ) -> Self {
        Self::with_session(catalog, violations, logger, session_config, Session::new())
    }
}

impl<S: ResultStore, T: TimeSource> App<S, T> {
    pub fn with_session(
        catalog: Catalog,
        violations: Vec<Violation>,
        logger: ResultLogger<S>,
        session_config: SessionConfig,
        session: Session<T>,
    ) -> Self {
        let status = (!violations.is_empty()).then(|| {
            format!(
                "{} pair(s) have invalid algorithms and are left out",
                violations.len()
            )
        });
        Self {
            catalog,
            session,
            logger,
            session_config,
            violations,
            revealed: None,
            status,
        }
    }

    /// Shuffle the catalog and start a fresh run.
    pub fn new_session(&mut self) {
        self.catalog.randomize();
        self.start_session();
    }

    /// Start a run over the catalog's current order.
    pub fn start_session(&mut self) {
        self.revealed = None;
        if let Err(err) = self.session.start(&self.catalog, self.session_config) {
            log::warn!("cannot start session: {err}");
            self.status = Some(err.to_string());
        }
    }

    pub fn handle(&mut self, action: Action) -> Control {
        match (action, self.session.phase()) {
            (Action::Quit, _) => return Control::Quit,
            (Action::Space, SessionPhase::AwaitingStart | SessionPhase::Paused) => {
                self.apply(|session| session.begin_trial().map(|_| ()));
            }
            (Action::Space, SessionPhase::Running) => {
                self.apply(|session| session.stop_trial().map(|_| ()));
            }
            (Action::Correct, SessionPhase::AwaitingVerdict) => self.judge(Verdict::Correct),
            (Action::Wrong, SessionPhase::AwaitingVerdict) => self.judge(Verdict::Wrong),
            (Action::RevealAlgorithm, SessionPhase::AwaitingVerdict) => {
                self.revealed = self.session.reveal_algorithm().ok().map(str::to_string);
            }
            (Action::OpenVerification, _) => {
                if !verify::open_in_browser(self.session.verification_sequence()) {
                    self.status = Some("no browser available".to_string());
                }
            }
            (Action::NewSession, _) => self.new_session(),
            _ => {}
        }
        Control::Continue
    }

    fn apply<F>(&mut self, f: F)
    where
        F: FnOnce(&mut Session<T>) -> Result<(), crate::session::SessionError>,
    {
        if let Err(err) = f(&mut self.session) {
            log::error!("session rejected transition: {err}");
            self.status = Some(err.to_string());
        }
    }

    fn judge(&mut self, verdict: Verdict) {
        self.revealed = None;
        match self.session.judge(verdict) {
            Ok(outcome) => {
                if let Some(last) = self.session.results().last() {
                    self.logger.log_result(last);
                }
                if let JudgeOutcome::Finished(results) = outcome {
                    self.status = Some(format!("session over, {} pairs practised", results.len()));
                }
            }
            Err(err) => {
                log::error!("session rejected verdict: {err}");
                self.status = Some(err.to_string());
            }
        }
    }

    /// Pairs ordered by how much they need practice
    pub fn priorities(&self) -> Vec<RankedStat> {
        let history = match self.logger.store().map(|store| store.all_histories()) {
            Some(Ok(history)) => history,
            Some(Err(err)) => {
                log::warn!("cannot read result history: {err}");
                HashMap::new()
            }
            None => HashMap::new(),
        };
        rank(&history, &self.catalog.known_pairs())
    }
}
