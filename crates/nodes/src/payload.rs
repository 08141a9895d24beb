//! Generation options and the JSON body sent to the chat endpoints.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Number, Value};

use crate::message::{build_messages, parse_history, Message};
use crate::NodeError;

/// The optional `options` collection shared by both chat nodes.
///
/// Every field is optional; an unset field is never sent.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatOptions {
    /// Sampling temperature, `0.0..=2.0`.
    #[serde(default)]
    pub temperature: Option<f64>,
    /// Upper bound on generated tokens. Any whole JSON number is accepted,
    /// so `1024.0` reads as `1024`.
    #[serde(default, alias = "max_tokens", deserialize_with = "whole_tokens")]
    pub max_tokens: Option<u32>,
    #[serde(default, alias = "system_prompt")]
    pub system_prompt: Option<String>,
    /// Prior turns, either as JSON text or an already-decoded array.
    #[serde(default, alias = "conversation_history")]
    pub conversation_history: Option<Value>,
}

fn whole_tokens<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u32>, D::Error> {
    let Some(n) = Option::<Number>::deserialize(deserializer)? else {
        return Ok(None);
    };

    if let Some(v) = n.as_u64() {
        return u32::try_from(v)
            .map(Some)
            .map_err(|_| D::Error::custom(format!("maxTokens {n} is too large")));
    }

    match n.as_f64() {
        Some(f) if f.fract() == 0.0 && (0.0..=f64::from(u32::MAX)).contains(&f) => {
            Ok(Some(f as u32))
        }
        _ => Err(D::Error::custom(format!("maxTokens must be a whole number, got {n}"))),
    }
}

impl ChatOptions {
    /// Check numeric ranges.
    pub fn validate(&self) -> Result<(), NodeError> {
        if let Some(t) = self.temperature {
            if !(0.0..=2.0).contains(&t) {
                return Err(NodeError::InvalidParameter {
                    name: "temperature",
                    reason: format!("{t} is outside 0..=2"),
                });
            }
        }
        if self.max_tokens == Some(0) {
            return Err(NodeError::InvalidParameter {
                name: "maxTokens",
                reason: "must be at least 1".into(),
            });
        }
        Ok(())
    }

    /// Assemble the message sequence for `current`, applying the system
    /// prompt and any parseable history.
    pub fn messages_for(&self, current: &str) -> Vec<Message> {
        let history = self
            .conversation_history
            .as_ref()
            .map(parse_history)
            .unwrap_or_default();

        build_messages(self.system_prompt.as_deref(), history, current)
    }
}

/// Request body for both endpoints.
///
/// `model` is only set for the RouteLLM completions endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    pub messages: Vec<Message>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

impl ChatPayload {
    pub fn new(model: Option<String>, current: &str, options: &ChatOptions) -> Self {
        Self {
            model,
            messages: options.messages_for(current),
            temperature: options.temperature,
            max_tokens: options.max_tokens,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn unset_options_are_omitted() {
        let payload = ChatPayload::new(None, "hello", &ChatOptions::default());
        let body = serde_json::to_value(&payload).unwrap();

        assert_eq!(body, json!({ "messages": [{ "role": "user", "content": "hello" }] }));
        let obj = body.as_object().unwrap();
        assert!(!obj.contains_key("temperature"));
        assert!(!obj.contains_key("max_tokens"));
        assert!(!obj.contains_key("model"));
    }

    #[test]
    fn set_options_are_sent_with_wire_names() {
        let options: ChatOptions = serde_json::from_value(json!({
            "temperature": 0.2,
            "maxTokens": 256,
            "systemPrompt": "You are terse."
        }))
        .unwrap();

        let payload = ChatPayload::new(Some("gpt-4o".into()), "hi", &options);
        let body = serde_json::to_value(&payload).unwrap();

        assert_eq!(
            body,
            json!({
                "model": "gpt-4o",
                "messages": [
                    { "role": "system", "content": "You are terse." },
                    { "role": "user", "content": "hi" }
                ],
                "temperature": 0.2,
                "max_tokens": 256
            })
        );
    }

    #[test]
    fn empty_options_object_deserialises_to_default() {
        let options: ChatOptions = serde_json::from_value(json!({})).unwrap();
        assert_eq!(options, ChatOptions::default());
    }

    #[test]
    fn out_of_range_temperature_is_rejected() {
        let options = ChatOptions {
            temperature: Some(2.5),
            ..Default::default()
        };
        assert!(matches!(
            options.validate(),
            Err(NodeError::InvalidParameter {
                name: "temperature",
                ..
            })
        ));
    }

    #[test]
    fn zero_max_tokens_is_rejected() {
        let options = ChatOptions {
            max_tokens: Some(0),
            ..Default::default()
        };
        assert!(options.validate().is_err());

        let options = ChatOptions {
            temperature: Some(0.0),
            max_tokens: Some(1),
            ..Default::default()
        };
        assert!(options.validate().is_ok());
    }

    #[test]
    fn whole_float_max_tokens_is_accepted() {
        let options: ChatOptions = serde_json::from_value(json!({ "maxTokens": 1024.0 })).unwrap();
        assert_eq!(options.max_tokens, Some(1024));

        let body = serde_json::to_value(ChatPayload::new(None, "hi", &options)).unwrap();
        assert_eq!(body["max_tokens"], 1024);
    }

    #[test]
    fn null_max_tokens_is_unset() {
        let options: ChatOptions = serde_json::from_value(json!({ "maxTokens": null })).unwrap();
        assert_eq!(options.max_tokens, None);
    }

    #[test]
    fn fractional_or_negative_max_tokens_is_rejected() {
        for bad in [json!(1.5), json!(-3), json!(5_000_000_000u64), json!("10")] {
            let result = serde_json::from_value::<ChatOptions>(json!({ "maxTokens": bad }));
            assert!(result.is_err(), "{bad} should be rejected");
        }
    }
}
