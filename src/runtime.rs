use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// What the practice loop reacts to
#[derive(Clone, Debug)]
pub enum PracticeEvent {
    Key(KeyEvent),
    Resize,
    Tick,
}

/// What a key press asks the app to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Begin the next trial, or stop the running one
    Space,
    Correct,
    Wrong,
    RevealAlgorithm,
    OpenVerification,
    NewSession,
    Quit,
}

impl Action {
    pub fn from_key(key: KeyEvent) -> Option<Self> {
        if key.kind != KeyEventKind::Press {
            return None;
        }
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Some(Action::Quit);
        }
        match key.code {
            KeyCode::Char(' ') => Some(Action::Space),
            KeyCode::Char('c') => Some(Action::Correct),
            KeyCode::Char('w') => Some(Action::Wrong),
            KeyCode::Char('s') => Some(Action::RevealAlgorithm),
            KeyCode::Char('v') => Some(Action::OpenVerification),
            KeyCode::Char('n') => Some(Action::NewSession),
            KeyCode::Esc | KeyCode::Char('q') => Some(Action::Quit),
            _ => None,
        }
    }
}

/// Anything that can hand the loop its next event within a deadline
pub trait EventSource {
    /// `None` when nothing arrived in time
    fn next_event(&self, timeout: Duration) -> Option<PracticeEvent>;
}

/// A channel is an event source; tests feed one directly.
impl EventSource for Receiver<PracticeEvent> {
    fn next_event(&self, timeout: Duration) -> Option<PracticeEvent> {
        match self.recv_timeout(timeout) {
            Ok(ev) => Some(ev),
            Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => None,
        }
    }
}

/// Terminal input read on a background thread
pub struct TerminalEvents {
    rx: Receiver<PracticeEvent>,
}

impl TerminalEvents {
    pub fn spawn() -> Self {
        let (tx, rx) = mpsc::channel();

        std::thread::spawn(move || loop {
            let forwarded = match event::read() {
                // Some terminals also report releases; a trial should stop once.
                Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => {
                    tx.send(PracticeEvent::Key(key))
                }
                Ok(Event::Resize(_, _)) => tx.send(PracticeEvent::Resize),
                Ok(_) => Ok(()),
                Err(err) => {
                    log::error!("terminal input closed: {err}");
                    break;
                }
            };
            if forwarded.is_err() {
                break;
            }
        });

        Self { rx }
    }
}

impl EventSource for TerminalEvents {
    fn next_event(&self, timeout: Duration) -> Option<PracticeEvent> {
        self.rx.next_event(timeout)
    }
}

/// Paces the loop: every step yields an event, or a tick once `tick` passes
/// with nothing to do.
pub struct Runner<E: EventSource> {
    events: E,
    tick: Duration,
}

impl<E: EventSource> Runner<E> {
    pub fn new(events: E, tick: Duration) -> Self {
        Self { events, tick }
    }

    pub fn step(&self) -> PracticeEvent {
        self.events
            .next_event(self.tick)
            .unwrap_or(PracticeEvent::Tick)
    }
}
