//! Chat session orchestration for Repovox.
//!
//! Unifies repository ingestion, typed chat, voice-captured chat, and
//! suggested-question shortcuts into one consistent conversation state,
//! and hands assistant replies to the speaker task for read-aloud.

pub mod error;
pub mod session;
pub mod transcript;

pub use error::SessionError;
pub use session::{ChatSession, SUGGESTED_QUESTIONS};
pub use transcript::Transcript;
