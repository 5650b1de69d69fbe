//! Conversation state: semantic turns and the per-session message store.
//!
//! - `protocol` -- conversion of stored turns to the chat endpoint's wire shape
//! - `sessions` -- session id -> message store map with idle expiry

pub mod protocol;
pub mod sessions;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

/// Who produced a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
    /// Condensed record of a tool result.
    Tool,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::System => write!(f, "system"),
            Self::User => write!(f, "user"),
            Self::Assistant => write!(f, "assistant"),
            Self::Tool => write!(f, "tool"),
        }
    }
}

/// One message in a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub content: String,
}

impl Turn {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    pub fn tool(content: impl Into<String>) -> Self {
        Self::new(Role::Tool, content)
    }
}

/// Append-only, ordered conversation history.
///
/// Each append is atomic, but two requests appending to the same store
/// concurrently interleave in whatever order the runtime schedules them.
#[derive(Debug)]
pub struct MessageStore {
    turns: Mutex<Vec<Turn>>,
}

impl MessageStore {
    /// Create a store seeded with the system prompt.
    pub fn new(system_prompt: &str) -> Self {
        Self {
            turns: Mutex::new(vec![Turn::system(system_prompt)]),
        }
    }

    pub fn append(&self, turn: Turn) {
        self.turns.lock().push(turn);
    }

    /// Copy of the current history, safe to iterate while others append.
    pub fn snapshot(&self) -> Vec<Turn> {
        self.turns.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.turns.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_store_is_seeded_with_system_prompt() {
        let store = MessageStore::new("be brief");
        let turns = store.snapshot();
        assert_eq!(turns.len(), 1);
        assert_eq!(turns[0], Turn::system("be brief"));
        assert!(!store.is_empty());
    }

    #[test]
    fn test_append_preserves_order() {
        let store = MessageStore::new("sys");
        store.append(Turn::user("hi"));
        store.append(Turn::assistant("hello"));
        store.append(Turn::tool("{\"ok\":true}"));

        let roles: Vec<Role> = store.snapshot().iter().map(|t| t.role).collect();
        assert_eq!(
            roles,
            vec![Role::System, Role::User, Role::Assistant, Role::Tool]
        );
        assert_eq!(store.len(), 4);
    }

    #[test]
    fn test_snapshot_is_detached_from_later_appends() {
        let store = MessageStore::new("sys");
        let before = store.snapshot();
        store.append(Turn::user("later"));
        assert_eq!(before.len(), 1);
        assert_eq!(store.snapshot().len(), 2);
    }

    #[test]
    fn test_role_serializes_lowercase() {
        let json = serde_json::to_string(&Turn::assistant("x")).unwrap();
        assert_eq!(json, r#"{"role":"assistant","content":"x"}"#);
        assert_eq!(Role::Tool.to_string(), "tool");
    }
}
