use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Structured rich-text content (opaque node tree, rendered by the host)
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
pub struct RichText {
    #[serde(default)]
    pub model: Vec<Value>,
}

impl RichText {
    /// Single paragraph holding plain text
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            model: vec![json!({
                "type": "p",
                "children": [{ "text": text.into() }],
            })],
        }
    }

    /// Plain-text projection: text leaves concatenated, blocks separated by a space
    pub fn to_simple_text(&self) -> String {
        self.model
            .iter()
            .map(|node| {
                let mut out = String::new();
                collect_text(node, &mut out);
                out
            })
            .filter(|block| !block.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn is_empty(&self) -> bool {
        self.to_simple_text().trim().is_empty()
    }
}

fn collect_text(node: &Value, out: &mut String) {
    match node {
        Value::Object(map) => {
            if let Some(Value::String(text)) = map.get("text") {
                out.push_str(text);
            }
            if let Some(Value::Array(children)) = map.get("children") {
                for child in children {
                    collect_text(child, out);
                }
            }
        }
        Value::Array(items) => {
            for item in items {
                collect_text(item, out);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_text_round_trips_to_simple_text() {
        let text = RichText::from_text("Which of these are prime?");
        assert_eq!(text.to_simple_text(), "Which of these are prime?");
    }

    #[test]
    fn test_nested_marks_are_flattened() {
        let text = RichText {
            model: vec![
                json!({"type": "p", "children": [
                    {"text": "Pick "},
                    {"text": "all", "strong": true},
                    {"text": " that apply"}
                ]}),
                json!({"type": "p", "children": [{"text": "(two answers)"}]}),
            ],
        };

        assert_eq!(text.to_simple_text(), "Pick all that apply (two answers)");
    }

    #[test]
    fn test_empty_content() {
        assert!(RichText::default().is_empty());
        assert!(RichText::from_text("  ").is_empty());
        assert!(!RichText::from_text("x").is_empty());
    }
}
