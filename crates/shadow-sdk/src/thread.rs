use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::SdkError;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
    System,
    Tool,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::System => "system",
            Role::Tool => "tool",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }
}

/// A conversation handed to [`Shadow::ingest`](crate::Shadow::ingest).
/// On disk: `{"messages": [{"role": "user", "content": "..."}]}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Thread {
    pub messages: Vec<ChatMessage>,
}

impl Thread {
    pub fn new(messages: Vec<ChatMessage>) -> Self {
        Self { messages }
    }

    pub fn from_json(json: &str) -> Result<Self, SdkError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: &Path) -> Result<Self, SdkError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Content of the most recent user message, if any.
    pub fn last_user_message(&self) -> Option<&str> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == Role::User)
            .map(|m| m.content.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_thread() {
        let thread = Thread::from_json(
            r#"{"messages":[{"role":"user","content":"I love danger"},
                            {"role":"assistant","content":"Danger will kill me"}]}"#,
        )
        .unwrap();
        assert_eq!(thread.messages.len(), 2);
        assert_eq!(thread.messages[1].role, Role::Assistant);
        assert_eq!(thread.last_user_message(), Some("I love danger"));
    }

    #[test]
    fn test_unknown_role_rejected() {
        assert!(Thread::from_json(r#"{"messages":[{"role":"narrator","content":"x"}]}"#).is_err());
    }

    #[test]
    fn test_empty_thread() {
        let thread = Thread::from_json(r#"{"messages":[]}"#).unwrap();
        assert!(thread.last_user_message().is_none());
    }
}
