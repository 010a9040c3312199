//! Scanner lifecycle states and legal transitions.

use super::ScannerError;

/// Lifecycle state of a [`Scanner`](super::Scanner).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScannerState {
    /// No session. Initial state, and the state after `stop`.
    #[default]
    Idle,
    /// Session active, sampler running.
    Scanning,
    /// Session active, sampler and playback suspended.
    Paused,
}

/// Caller-requested lifecycle operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Start,
    Pause,
    Resume,
    Stop,
}

impl ScannerState {
    /// Returns the state reached by applying `transition`, or an
    /// [`ScannerError::IllegalTransition`] leaving the state unchanged.
    pub fn apply(self, transition: Transition) -> Result<ScannerState, ScannerError> {
        use ScannerState::*;
        use Transition::*;

        match (self, transition) {
            (Idle, Start) => Ok(Scanning),
            (Scanning, Pause) => Ok(Paused),
            (Paused, Resume) => Ok(Scanning),
            (Scanning | Paused, Stop) => Ok(Idle),
            (state, transition) => Err(ScannerError::IllegalTransition { state, transition }),
        }
    }
}

impl std::fmt::Display for ScannerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScannerState::Idle => f.write_str("idle"),
            ScannerState::Scanning => f.write_str("scanning"),
            ScannerState::Paused => f.write_str("paused"),
        }
    }
}

impl std::fmt::Display for Transition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Transition::Start => f.write_str("start"),
            Transition::Pause => f.write_str("pause"),
            Transition::Resume => f.write_str("resume"),
            Transition::Stop => f.write_str("stop"),
        }
    }
}
