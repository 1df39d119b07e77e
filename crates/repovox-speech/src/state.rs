//! Speech capture state machine.
//!
//! Enforces valid state transitions for the per-utterance capture lifecycle:
//! - Idle -> Listening (start capture)
//! - Listening -> Idle (result, error, or manual stop; always via the
//!   engine's terminal end event)

use std::fmt;

/// Operational state of a speech capture session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CaptureState {
    /// No capture in progress. Ready to start.
    Idle,
    /// Actively listening for speech input.
    Listening,
}

impl fmt::Display for CaptureState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaptureState::Idle => write!(f, "Idle"),
            CaptureState::Listening => write!(f, "Listening"),
        }
    }
}

impl CaptureState {
    /// Returns whether a transition from `self` to `target` is valid.
    pub fn can_transition_to(&self, target: &CaptureState) -> bool {
        matches!(
            (self, target),
            (CaptureState::Idle, CaptureState::Listening)
                | (CaptureState::Listening, CaptureState::Idle)
        )
    }
}
