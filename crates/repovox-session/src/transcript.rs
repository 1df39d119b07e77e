//! Append-only conversation log.

use repovox_core::types::{Message, Role};

/// Ordered log of exchanged messages for the current session.
///
/// Strictly append-only: no message is ever edited or removed, and ordering
/// is the only meaning-bearing relationship between entries.
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    messages: Vec<Message>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a user message and return a reference to it.
    pub fn push_user(&mut self, content: impl Into<String>) -> &Message {
        self.messages.push(Message::user(content));
        self.messages.last().expect("just pushed")
    }

    /// Append an assistant message and return a reference to it.
    pub fn push_assistant(&mut self, content: impl Into<String>) -> &Message {
        self.messages.push(Message::assistant(content));
        self.messages.last().expect("just pushed")
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_transcript() {
        let t = Transcript::new();
        assert!(t.is_empty());
        assert_eq!(t.len(), 0);
        assert!(t.last().is_none());
    }

    #[test]
    fn test_append_preserves_order() {
        let mut t = Transcript::new();
        t.push_user("first");
        t.push_assistant("second");
        t.push_user("third");

        let roles: Vec<Role> = t.messages().iter().map(|m| m.role).collect();
        assert_eq!(roles, vec![Role::User, Role::Assistant, Role::User]);
        let contents: Vec<&str> = t.messages().iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["first", "second", "third"]);
    }

    #[test]
    fn test_push_returns_appended_message() {
        let mut t = Transcript::new();
        let m = t.push_assistant("hello");
        assert_eq!(m.role, Role::Assistant);
        assert_eq!(m.content, "hello");
    }

    #[test]
    fn test_last_tracks_newest_entry() {
        let mut t = Transcript::new();
        t.push_user("a");
        assert_eq!(t.last().unwrap().content, "a");
        t.push_assistant("b");
        assert_eq!(t.last().unwrap().content, "b");
    }
}
