//! Chat session controller: the orchestrator behind one conversation.
//!
//! Accepts text from typing, voice capture, or suggested shortcuts, sends it
//! to the chat backend, appends results to the transcript, and hands replies
//! to the speaker task. All three submission sources funnel through a single
//! `submit` path so the busy-flag and transcript invariants hold everywhere.

use repovox_client::ChatBackend;
use repovox_core::error::RepovoxError;
use repovox_core::types::RepoContext;
use repovox_speech::SpeakerCommand;
use tokio::sync::mpsc::UnboundedSender;

use crate::error::SessionError;
use crate::transcript::Transcript;

/// Shortcut questions that bypass the text field entirely.
pub const SUGGESTED_QUESTIONS: &[&str] = &[
    "What does this repository do?",
    "Explain the project structure.",
    "What are the main dependencies?",
    "How do I get started with this codebase?",
];

/// Assistant message seeded into a fresh conversation after ingestion.
const WELCOME_MESSAGE: &str =
    "Repository ingested successfully! Ask me anything about the codebase.";

/// One conversation about one ingested repository.
///
/// Owns the whole session state aggregate; other components only reach it
/// through these methods.
#[derive(Debug)]
pub struct ChatSession<B> {
    backend: B,
    repo_url: String,
    repo_context: Option<RepoContext>,
    transcript: Transcript,
    pending_input: String,
    is_ingesting: bool,
    is_awaiting_reply: bool,
    last_error: Option<String>,
    /// Fire-and-forget channel into the speaker task; replies are sent and
    /// never awaited.
    speaker: Option<UnboundedSender<SpeakerCommand>>,
}

impl<B: ChatBackend> ChatSession<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            repo_url: String::new(),
            repo_context: None,
            transcript: Transcript::new(),
            pending_input: String::new(),
            is_ingesting: false,
            is_awaiting_reply: false,
            last_error: None,
            speaker: None,
        }
    }

    /// Attach the speaker channel so assistant replies are read aloud.
    pub fn with_speaker(mut self, speaker: UnboundedSender<SpeakerCommand>) -> Self {
        self.speaker = Some(speaker);
        self
    }

    // -- Accessors --

    pub fn repo_url(&self) -> &str {
        &self.repo_url
    }

    pub fn repo_context(&self) -> Option<&RepoContext> {
        self.repo_context.as_ref()
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn pending_input(&self) -> &str {
        &self.pending_input
    }

    pub fn set_pending_input(&mut self, text: impl Into<String>) {
        self.pending_input = text.into();
    }

    pub fn is_ingesting(&self) -> bool {
        self.is_ingesting
    }

    pub fn is_awaiting_reply(&self) -> bool {
        self.is_awaiting_reply
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Whether chat submission is currently allowed: a successfully ingested
    /// repository is active and no ingestion is replacing it.
    pub fn can_chat(&self) -> bool {
        !self.is_ingesting
            && self
                .repo_context
                .as_ref()
                .map(|ctx| ctx.success)
                .unwrap_or(false)
    }

    // -- Operations --

    /// Ingest `url`, replacing any active repository context in full.
    ///
    /// On success the session starts a fresh conversation seeded with a
    /// single assistant welcome message. On failure the context is cleared
    /// and the reason is recorded in `last_error` as well as returned.
    /// Rejected while another ingestion is in flight.
    pub async fn ingest(&mut self, url: &str) -> Result<(), SessionError> {
        if self.is_ingesting {
            return Err(SessionError::IngestInFlight);
        }

        self.repo_url = url.to_string();
        self.is_ingesting = true;
        tracing::info!(repo_url = %url, "Ingesting repository");

        let result = self.backend.ingest(url).await;
        // The busy flag clears on every path.
        self.is_ingesting = false;

        match result {
            Ok(ctx) => {
                self.repo_context = Some(ctx);
                self.last_error = None;
                self.pending_input.clear();
                // A new repository is a new conversation.
                self.transcript = Transcript::new();
                self.transcript.push_assistant(WELCOME_MESSAGE);
                tracing::info!(repo_url = %url, "Repository ingested");
                Ok(())
            }
            Err(e) => {
                let reason = backend_reason(&e);
                tracing::warn!(repo_url = %url, error = %reason, "Ingestion failed");
                self.repo_context = None;
                self.last_error = Some(reason.clone());
                Err(SessionError::Backend(reason))
            }
        }
    }

    /// Submit one chat message; the single path behind typing, voice, and
    /// suggested-question shortcuts.
    ///
    /// Guard rejections (`Err`) have no side effect. Once accepted, the
    /// transcript gains exactly two entries: the user message immediately
    /// (optimistic), then either the assistant reply or an inline error
    /// message. The returned value is `Ok` for both backend outcomes.
    pub async fn submit(&mut self, text: &str) -> Result<(), SessionError> {
        if text.trim().is_empty() {
            return Err(SessionError::EmptyMessage);
        }
        if !self.can_chat() {
            return Err(SessionError::RepositoryNotReady);
        }
        if self.is_awaiting_reply {
            return Err(SessionError::ReplyInFlight);
        }

        self.transcript.push_user(text);
        self.pending_input.clear();
        self.is_awaiting_reply = true;

        let result = self.backend.chat(text, &self.repo_url).await;
        // The busy flag clears on every path.
        self.is_awaiting_reply = false;

        match result {
            Ok(answer) => {
                self.transcript.push_assistant(answer.clone());
                self.last_error = None;
                if let Some(speaker) = &self.speaker {
                    // Fire-and-forget: a slow or failing synthesis must not
                    // block the conversation.
                    let _ = speaker.send(SpeakerCommand::Speak(answer));
                }
            }
            Err(e) => {
                let reason = backend_reason(&e);
                tracing::warn!(error = %reason, "Chat request failed");
                self.last_error = Some(reason.clone());
                // The failure is part of the conversation, not a modal.
                self.transcript.push_assistant(format!("Error: {}", reason));
            }
        }

        Ok(())
    }

    /// Submit a voice-captured transcript.
    ///
    /// Voice input mirrors the transcript into the pending text field and
    /// then submits immediately; unlike typed input there is no explicit
    /// submit action.
    pub async fn submit_voice(&mut self, transcript: &str) -> Result<(), SessionError> {
        self.pending_input = transcript.to_string();
        self.submit(transcript).await
    }

    /// Submit one of [`SUGGESTED_QUESTIONS`] by index.
    pub async fn submit_suggestion(&mut self, index: usize) -> Result<(), SessionError> {
        let question = SUGGESTED_QUESTIONS
            .get(index)
            .copied()
            .ok_or(SessionError::UnknownSuggestion(index))?;
        self.submit(question).await
    }
}

/// Human-readable description of a backend failure, without the error
/// enum's variant prefix.
fn backend_reason(err: &RepovoxError) -> String {
    match err {
        RepovoxError::Ingestion(msg)
        | RepovoxError::Chat(msg)
        | RepovoxError::Http(msg) => msg.clone(),
        other => other.to_string(),
    }
}

// =============================================================================
// Tests
// =============================================================================
