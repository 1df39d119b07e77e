use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Who authored a transcript message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// A single entry in the conversation transcript.
///
/// Messages are immutable once appended; ordering within the transcript is
/// the only meaning-bearing relationship between them.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: Uuid,
    pub role: Role,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl Message {
    /// Create a new message stamped with the current time.
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            role,
            content: content.into(),
            created_at: Utc::now(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }
}

/// The result of ingesting one repository.
///
/// At most one context is active per session. Ingesting a new URL replaces
/// the context in full; no fields are merged across ingestions.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoContext {
    pub success: bool,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub tree: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_serde_lowercase() {
        assert_eq!(serde_json::to_string(&Role::User).unwrap(), "\"user\"");
        assert_eq!(
            serde_json::to_string(&Role::Assistant).unwrap(),
            "\"assistant\""
        );
        let role: Role = serde_json::from_str("\"assistant\"").unwrap();
        assert_eq!(role, Role::Assistant);
    }

    #[test]
    fn test_message_constructors() {
        let m = Message::user("hello");
        assert_eq!(m.role, Role::User);
        assert_eq!(m.content, "hello");

        let m = Message::assistant("hi there");
        assert_eq!(m.role, Role::Assistant);
        assert_eq!(m.content, "hi there");
    }

    #[test]
    fn test_messages_get_distinct_ids() {
        let a = Message::user("one");
        let b = Message::user("one");
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_repo_context_parses_success_payload() {
        let json = r#"{"success": true, "content": "fn main() {}", "tree": "src/\n  main.rs"}"#;
        let ctx: RepoContext = serde_json::from_str(json).unwrap();
        assert!(ctx.success);
        assert_eq!(ctx.content, "fn main() {}");
        assert!(ctx.tree.contains("main.rs"));
        assert!(ctx.error.is_none());
    }

    #[test]
    fn test_repo_context_parses_failure_payload() {
        let json = r#"{"success": false, "error": "Content was empty"}"#;
        let ctx: RepoContext = serde_json::from_str(json).unwrap();
        assert!(!ctx.success);
        assert_eq!(ctx.error.as_deref(), Some("Content was empty"));
        assert!(ctx.content.is_empty());
        assert!(ctx.tree.is_empty());
    }
}
