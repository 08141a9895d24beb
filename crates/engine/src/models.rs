//! Batch data model.
//!
//! These types mirror the host's item shapes so output can be handed back
//! unchanged: an input item is the object of parameter values for one
//! position, an output record is `{json, pairedItem: {item}}`.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

// ---------------------------------------------------------------------------
// InputItem
// ---------------------------------------------------------------------------

/// One position in a batch: the parameter values configured for it.
///
/// The item's index is its position in the slice handed to the dispatcher.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InputItem {
    pub params: Value,
}

impl InputItem {
    pub fn new(params: Value) -> Self {
        Self { params }
    }
}

impl From<Value> for InputItem {
    fn from(params: Value) -> Self {
        Self::new(params)
    }
}

// ---------------------------------------------------------------------------
// OutputRecord
// ---------------------------------------------------------------------------

/// Links an output record back to the input item it came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairedItem {
    pub item: usize,
}

/// Result for one input item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputRecord {
    /// Raw decoded response body, or `{"error": message}`.
    pub json: Value,
    pub paired_item: PairedItem,
}

impl OutputRecord {
    pub fn success(index: usize, response: Value) -> Self {
        Self {
            json: response,
            paired_item: PairedItem { item: index },
        }
    }

    pub fn error(index: usize, message: impl Into<String>) -> Self {
        Self {
            json: json!({ "error": message.into() }),
            paired_item: PairedItem { item: index },
        }
    }

    /// The captured error message, if this record is an error record.
    pub fn error_message(&self) -> Option<&str> {
        self.json.get("error").and_then(Value::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_record_uses_host_field_names() {
        let record = OutputRecord::success(3, json!({ "ok": true }));
        assert_eq!(
            serde_json::to_value(&record).unwrap(),
            json!({ "json": { "ok": true }, "pairedItem": { "item": 3 } })
        );
    }

    #[test]
    fn error_record_shape() {
        let record = OutputRecord::error(1, "request failed: refused");
        assert_eq!(record.json, json!({ "error": "request failed: refused" }));
        assert_eq!(record.error_message(), Some("request failed: refused"));
        assert_eq!(record.paired_item.item, 1);
    }

    #[test]
    fn input_items_are_bare_parameter_objects() {
        let items: Vec<InputItem> =
            serde_json::from_value(json!([{ "prompt": "a" }, { "prompt": "b" }])).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[1].params["prompt"], "b");
    }
}
