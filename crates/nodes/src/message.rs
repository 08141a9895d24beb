//! Chat messages and assembly of the outgoing message sequence.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

/// Author of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// A single `{role, content}` chat turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Parse prior conversation turns.
///
/// Never fails. `value` may be a string holding a JSON array or an
/// already-decoded array. Malformed JSON, a non-array, or any element that
/// is not a `{role, content}` message all yield an empty history.
pub fn parse_history(value: &Value) -> Vec<Message> {
    let decoded;
    let array = match value {
        Value::String(text) if text.trim().is_empty() => return Vec::new(),
        Value::String(text) => match serde_json::from_str::<Value>(text) {
            Ok(v) => {
                decoded = v;
                &decoded
            }
            Err(e) => {
                debug!("ignoring conversation history that is not valid JSON: {e}");
                return Vec::new();
            }
        },
        other => other,
    };

    if !array.is_array() {
        debug!("ignoring conversation history that is not an array");
        return Vec::new();
    }

    Vec::<Message>::deserialize(array).unwrap_or_else(|e| {
        debug!("ignoring conversation history with malformed messages: {e}");
        Vec::new()
    })
}

/// Order is: system prompt (only when non-empty), history, current user message.
pub fn build_messages(
    system_prompt: Option<&str>,
    history: Vec<Message>,
    current: impl Into<String>,
) -> Vec<Message> {
    let mut messages = Vec::with_capacity(history.len() + 2);

    if let Some(prompt) = system_prompt.filter(|p| !p.is_empty()) {
        messages.push(Message::system(prompt));
    }
    messages.extend(history);
    messages.push(Message::user(current));

    messages
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn history_string_is_placed_before_current_message() {
        let history = parse_history(&json!("[{\"role\":\"user\",\"content\":\"hi\"}]"));
        let messages = build_messages(None, history, "there");

        assert_eq!(messages, vec![Message::user("hi"), Message::user("there")]);
    }

    #[test]
    fn malformed_history_is_ignored() {
        let history = parse_history(&json!("not-json"));
        assert!(history.is_empty());

        let messages = build_messages(Some("be brief"), history, "hello");
        assert_eq!(messages, vec![Message::system("be brief"), Message::user("hello")]);
    }

    #[test]
    fn non_array_history_is_ignored() {
        assert!(parse_history(&json!("{\"role\":\"user\",\"content\":\"hi\"}")).is_empty());
        assert!(parse_history(&json!(42)).is_empty());
        assert!(parse_history(&json!("")).is_empty());
    }

    #[test]
    fn history_with_unknown_role_is_ignored() {
        let history = parse_history(&json!("[{\"role\":\"tool\",\"content\":\"x\"}]"));
        assert!(history.is_empty());
    }

    #[test]
    fn already_decoded_history_array_is_accepted() {
        let history = parse_history(&json!([
            { "role": "user", "content": "ping" },
            { "role": "assistant", "content": "pong" }
        ]));
        assert_eq!(history, vec![Message::user("ping"), Message::assistant("pong")]);
    }

    #[test]
    fn full_sequence_order() {
        let messages = build_messages(
            Some("sys"),
            vec![Message::user("a"), Message::assistant("b")],
            "c",
        );
        let roles: Vec<Role> = messages.iter().map(|m| m.role).collect();
        assert_eq!(roles, vec![Role::System, Role::User, Role::Assistant, Role::User]);
        assert_eq!(messages.last().unwrap().content, "c");
    }

    #[test]
    fn empty_system_prompt_is_skipped() {
        let messages = build_messages(Some(""), Vec::new(), "only");
        assert_eq!(messages, vec![Message::user("only")]);
    }

    #[test]
    fn roles_serialise_lowercase() {
        let v = serde_json::to_value(Message::assistant("ok")).unwrap();
        assert_eq!(v, json!({ "role": "assistant", "content": "ok" }));
    }
}
