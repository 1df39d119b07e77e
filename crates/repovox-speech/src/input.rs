//! Speech input controller.
//!
//! Wraps a platform speech-recognition capability behind the
//! [`SpeechRecognizer`] trait and drives the per-utterance capture lifecycle.
//! The platform's result/error/end callbacks arrive as [`RecognizerEvent`]
//! values; the controller validates their ordering against the capture state
//! machine and, on the terminal end event, hands the captured transcript back
//! to the caller as the capture-completed signal. The controller never calls
//! into the chat session itself.

use repovox_core::error::RepovoxError;

use crate::state::CaptureState;

/// An event raised by the recognition engine during a capture session.
///
/// The engine guarantees that `End` always fires after `Transcript` or
/// `Error` for a given capture, never before.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecognizerEvent {
    /// A final recognition result with the transcribed text.
    Transcript(String),
    /// Recognition failed (silence timeout, permission denial, etc.).
    Error(String),
    /// The capture session ended. Fires after every transcript or error,
    /// and also after silence with neither.
    End,
}

/// A platform speech-recognition engine.
///
/// Implementations own the underlying engine instance for the lifetime of
/// the controller (acquired on construction, released on drop) and forward
/// engine callbacks to [`SpeechInputController::handle_event`].
pub trait SpeechRecognizer: Send {
    /// Whether the platform provides speech recognition at all.
    fn is_available(&self) -> bool;

    /// Begin a capture session. Called at most once per session; the
    /// controller guards against overlapping captures.
    fn start(&mut self) -> Result<(), RepovoxError>;

    /// Request that the current capture session stop. The engine still
    /// raises its ordinary `End` event afterwards, so a manual stop is
    /// handled identically to a natural end.
    fn stop(&mut self) -> Result<(), RepovoxError>;
}

/// Drives one speech capture at a time and produces text.
#[derive(Debug)]
pub struct SpeechInputController<R> {
    recognizer: R,
    state: CaptureState,
    /// Transcript captured during the current session, if any. Reset to
    /// `None` after every terminal end event.
    last_transcript: Option<String>,
}

impl<R: SpeechRecognizer> SpeechInputController<R> {
    pub fn new(recognizer: R) -> Self {
        Self {
            recognizer,
            state: CaptureState::Idle,
            last_transcript: None,
        }
    }

    pub fn state(&self) -> CaptureState {
        self.state
    }

    pub fn is_listening(&self) -> bool {
        self.state == CaptureState::Listening
    }

    /// Whether the platform supports voice capture; callers should hide the
    /// capture affordance entirely when this is false.
    pub fn is_available(&self) -> bool {
        self.recognizer.is_available()
    }

    /// Begin a capture session.
    ///
    /// Rejected when recognition is unavailable or a capture is already
    /// active; only one capture session may exist at a time.
    pub fn start(&mut self) -> Result<(), RepovoxError> {
        if !self.recognizer.is_available() {
            return Err(RepovoxError::Recognition(
                "speech recognition is not available on this platform".to_string(),
            ));
        }
        if !self.state.can_transition_to(&CaptureState::Listening) {
            return Err(RepovoxError::Recognition(
                "capture is already active".to_string(),
            ));
        }
        self.recognizer.start()?;
        self.last_transcript = None;
        self.state = CaptureState::Listening;
        tracing::debug!("Speech capture started");
        Ok(())
    }

    /// Manually stop the current capture session.
    ///
    /// A no-op while idle. The engine raises its `End` event in response,
    /// which auto-submits any transcript captured so far just like a
    /// natural end.
    pub fn stop(&mut self) -> Result<(), RepovoxError> {
        if self.state == CaptureState::Idle {
            return Ok(());
        }
        self.recognizer.stop()
    }

    /// Feed one engine event through the state machine.
    ///
    /// Returns the completed transcript on the terminal end event when a
    /// non-empty transcript was captured during the session; the caller
    /// submits it to the chat session. All other events, and an end with no
    /// usable transcript, return `None`. Recognition errors degrade
    /// silently: the state resets and nothing is surfaced.
    pub fn handle_event(&mut self, event: RecognizerEvent) -> Option<String> {
        if self.state == CaptureState::Idle {
            tracing::debug!(?event, "Ignoring recognizer event while idle");
            return None;
        }

        match event {
            RecognizerEvent::Transcript(text) => {
                tracing::debug!(len = text.len(), "Recognition result received");
                self.last_transcript = Some(text);
                None
            }
            RecognizerEvent::Error(reason) => {
                tracing::debug!(reason = %reason, "Recognition error; capture will reset");
                self.last_transcript = None;
                None
            }
            RecognizerEvent::End => {
                self.state = CaptureState::Idle;
                let transcript = self.last_transcript.take();
                tracing::debug!(captured = transcript.is_some(), "Speech capture ended");
                transcript.filter(|t| !t.trim().is_empty())
            }
        }
    }
}

// =============================================================================
// Recognizer implementations
// =============================================================================

/// Recognizer for platforms without a recognition capability.
///
/// Always unavailable; the controller reports the capture affordance as
/// unusable rather than erroring at startup.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableRecognizer;

impl SpeechRecognizer for UnavailableRecognizer {
    fn is_available(&self) -> bool {
        false
    }

    fn start(&mut self) -> Result<(), RepovoxError> {
        Err(RepovoxError::Recognition(
            "speech recognition is not available on this platform".to_string(),
        ))
    }

    fn stop(&mut self) -> Result<(), RepovoxError> {
        Ok(())
    }
}

/// Mock recognizer for testing the capture lifecycle.
///
/// Tracks start/stop calls; events are injected directly into the
/// controller by the test.
#[derive(Debug, Clone, Default)]
pub struct MockRecognizer {
    pub started: u32,
    pub stopped: u32,
    /// When set, `start` fails with this reason.
    pub fail_start: Option<String>,
}

impl MockRecognizer {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SpeechRecognizer for MockRecognizer {
    fn is_available(&self) -> bool {
        true
    }

    fn start(&mut self) -> Result<(), RepovoxError> {
        if let Some(reason) = &self.fail_start {
            return Err(RepovoxError::Recognition(reason.clone()));
        }
        self.started += 1;
        Ok(())
    }

    fn stop(&mut self) -> Result<(), RepovoxError> {
        self.stopped += 1;
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn controller() -> SpeechInputController<MockRecognizer> {
        SpeechInputController::new(MockRecognizer::new())
    }

    #[test]
    fn test_start_transitions_to_listening() {
        let mut c = controller();
        assert_eq!(c.state(), CaptureState::Idle);
        c.start().unwrap();
        assert!(c.is_listening());
        assert_eq!(c.recognizer.started, 1);
    }

    #[test]
    fn test_start_while_listening_is_rejected() {
        let mut c = controller();
        c.start().unwrap();
        let result = c.start();
        assert!(result.is_err());
        // The engine was only started once.
        assert_eq!(c.recognizer.started, 1);
    }

    #[test]
    fn test_start_unavailable_recognizer() {
        let mut c = SpeechInputController::new(UnavailableRecognizer);
        assert!(!c.is_available());
        let result = c.start();
        assert!(matches!(result, Err(RepovoxError::Recognition(_))));
        assert_eq!(c.state(), CaptureState::Idle);
    }

    #[test]
    fn test_start_failure_stays_idle() {
        let mut recognizer = MockRecognizer::new();
        recognizer.fail_start = Some("microphone busy".to_string());
        let mut c = SpeechInputController::new(recognizer);
        assert!(c.start().is_err());
        assert_eq!(c.state(), CaptureState::Idle);
    }

    #[test]
    fn test_result_then_end_completes_with_transcript() {
        let mut c = controller();
        c.start().unwrap();

        let mid = c.handle_event(RecognizerEvent::Transcript("what does this do".to_string()));
        assert!(mid.is_none(), "capture completes only on the end event");
        assert!(c.is_listening());

        let done = c.handle_event(RecognizerEvent::End);
        assert_eq!(done.as_deref(), Some("what does this do"));
        assert_eq!(c.state(), CaptureState::Idle);
    }

    #[test]
    fn test_error_then_end_completes_silently() {
        let mut c = controller();
        c.start().unwrap();
        c.handle_event(RecognizerEvent::Error("no-speech".to_string()));
        let done = c.handle_event(RecognizerEvent::End);
        assert!(done.is_none());
        assert_eq!(c.state(), CaptureState::Idle);
    }

    #[test]
    fn test_end_without_result_completes_silently() {
        let mut c = controller();
        c.start().unwrap();
        // Silence timeout: end fires with neither result nor error.
        assert!(c.handle_event(RecognizerEvent::End).is_none());
        assert_eq!(c.state(), CaptureState::Idle);
    }

    #[test]
    fn test_whitespace_only_transcript_never_submits() {
        let mut c = controller();
        c.start().unwrap();
        c.handle_event(RecognizerEvent::Transcript("   \t ".to_string()));
        assert!(c.handle_event(RecognizerEvent::End).is_none());
    }

    #[test]
    fn test_empty_transcript_never_submits() {
        let mut c = controller();
        c.start().unwrap();
        c.handle_event(RecognizerEvent::Transcript(String::new()));
        assert!(c.handle_event(RecognizerEvent::End).is_none());
    }

    #[test]
    fn test_manual_stop_forwards_to_engine() {
        let mut c = controller();
        c.start().unwrap();
        c.stop().unwrap();
        assert_eq!(c.recognizer.stopped, 1);
        // Still listening until the engine raises its end event.
        assert!(c.is_listening());
        let done = c.handle_event(RecognizerEvent::End);
        assert!(done.is_none());
    }

    #[test]
    fn test_manual_stop_with_partial_transcript_submits_on_end() {
        let mut c = controller();
        c.start().unwrap();
        c.handle_event(RecognizerEvent::Transcript("partial words".to_string()));
        c.stop().unwrap();
        // Treated identically to a natural end.
        let done = c.handle_event(RecognizerEvent::End);
        assert_eq!(done.as_deref(), Some("partial words"));
    }

    #[test]
    fn test_stop_while_idle_is_noop() {
        let mut c = controller();
        c.stop().unwrap();
        assert_eq!(c.recognizer.stopped, 0);
    }

    #[test]
    fn test_events_while_idle_are_ignored() {
        let mut c = controller();
        assert!(c
            .handle_event(RecognizerEvent::Transcript("stray".to_string()))
            .is_none());
        assert!(c.handle_event(RecognizerEvent::End).is_none());
        assert_eq!(c.state(), CaptureState::Idle);
    }

    #[test]
    fn test_transcript_does_not_leak_across_sessions() {
        let mut c = controller();
        c.start().unwrap();
        c.handle_event(RecognizerEvent::Transcript("first utterance".to_string()));
        assert!(c.handle_event(RecognizerEvent::End).is_some());

        // Second session ends without a result; nothing from the first
        // session may surface.
        c.start().unwrap();
        assert!(c.handle_event(RecognizerEvent::End).is_none());
    }

    #[test]
    fn test_restart_after_end() {
        let mut c = controller();
        c.start().unwrap();
        c.handle_event(RecognizerEvent::End);
        c.start().unwrap();
        assert!(c.is_listening());
        assert_eq!(c.recognizer.started, 2);
    }
}
