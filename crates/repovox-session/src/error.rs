//! Error types for the chat session controller.

/// Guard rejections and backend failures surfaced by the session.
///
/// Guard variants mean the call was rejected with no side effect on the
/// session state.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("message cannot be empty")]
    EmptyMessage,
    #[error("no successfully ingested repository; chat is disabled")]
    RepositoryNotReady,
    #[error("a reply is already in flight")]
    ReplyInFlight,
    #[error("an ingestion is already in flight")]
    IngestInFlight,
    #[error("unknown suggested question index: {0}")]
    UnknownSuggestion(usize),
    #[error("{0}")]
    Backend(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_error_display() {
        assert_eq!(
            SessionError::EmptyMessage.to_string(),
            "message cannot be empty"
        );
        assert_eq!(
            SessionError::RepositoryNotReady.to_string(),
            "no successfully ingested repository; chat is disabled"
        );
        assert_eq!(
            SessionError::ReplyInFlight.to_string(),
            "a reply is already in flight"
        );
        assert_eq!(
            SessionError::IngestInFlight.to_string(),
            "an ingestion is already in flight"
        );
        assert_eq!(
            SessionError::UnknownSuggestion(7).to_string(),
            "unknown suggested question index: 7"
        );
        assert_eq!(
            SessionError::Backend("boom".to_string()).to_string(),
            "boom"
        );
    }
}
