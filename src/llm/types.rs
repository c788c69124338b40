//! Common types for LLM requests and parsed review responses.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// A normalized completion request handed to a backend adapter.
///
/// Each adapter translates this into its own wire format: OpenAI and Claude
/// send the message array as-is, Gemini collapses it into a single text blob.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub model: String,
    pub messages: Vec<Message>,
    pub max_tokens: Option<u32>,
    /// Ask the backend for a JSON-only response where the API supports it.
    pub json_response: bool,
}

/// A message in a chat conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
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

/// The role of a message sender.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        };
        f.write_str(s)
    }
}

/// The normalized review shape every backend is instructed to return.
///
/// Parsing is deliberately lenient: models routinely omit optional fields,
/// return the score as a string, or invent issue categories. Anything that
/// cannot be coerced falls back to an empty value rather than failing the
/// whole review.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StructuredReview {
    #[serde(default)]
    pub summary: String,
    #[serde(default, deserialize_with = "coerce_score")]
    pub score: u32,
    #[serde(default)]
    pub issues: Vec<Issue>,
    #[serde(default)]
    pub optimizations: Vec<String>,
}

/// A single finding inside a review.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Issue {
    #[serde(default, deserialize_with = "lenient_line")]
    pub line: Option<u32>,
    #[serde(rename = "type", default)]
    pub kind: IssueKind,
    #[serde(default)]
    pub msg: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fix: Option<String>,
}

/// Issue category reported by the model.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueKind {
    Bug,
    Style,
    Security,
    /// Catch-all for categories the model invents.
    #[default]
    #[serde(other)]
    Other,
}

/// Score must end up a non-negative integer even when the model returns a
/// float, a numeric string, or garbage. Garbage coerces to 0.
fn coerce_score<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(score_from_value(&value))
}

fn score_from_value(value: &serde_json::Value) -> u32 {
    match value {
        serde_json::Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64))
            .map(|v| v.min(u32::MAX as u64) as u32)
            .unwrap_or(0),
        serde_json::Value::String(s) => s
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|f| *f >= 0.0)
            .map(|f| f as u32)
            .unwrap_or(0),
        _ => 0,
    }
}

/// Models report line numbers as integers, strings, or "unknown".
fn lenient_line<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::Number(n) => n.as_u64().map(|v| v.min(u32::MAX as u64) as u32),
        serde_json::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn review_parses_full_shape() {
        let json = r#"{
            "summary": "Solid overall, one null deref",
            "score": 7,
            "issues": [
                {"line": 42, "type": "bug", "msg": "possible null deref", "fix": "check before use"},
                {"line": null, "type": "style", "msg": "inconsistent naming"}
            ],
            "optimizations": ["cache the regex"]
        }"#;

        let review: StructuredReview = serde_json::from_str(json).unwrap();
        assert_eq!(review.summary, "Solid overall, one null deref");
        assert_eq!(review.score, 7);
        assert_eq!(review.issues.len(), 2);
        assert_eq!(review.issues[0].line, Some(42));
        assert_eq!(review.issues[0].kind, IssueKind::Bug);
        assert_eq!(review.issues[0].fix.as_deref(), Some("check before use"));
        assert_eq!(review.issues[1].line, None);
        assert!(review.issues[1].fix.is_none());
        assert_eq!(review.optimizations, vec!["cache the regex".to_string()]);
    }

    #[test]
    fn review_tolerates_omitted_fields() {
        let review: StructuredReview = serde_json::from_str(r#"{"summary": "ok"}"#).unwrap();
        assert_eq!(review.summary, "ok");
        assert_eq!(review.score, 0);
        assert!(review.issues.is_empty());
        assert!(review.optimizations.is_empty());
    }

    #[test]
    fn score_coerces_to_non_negative_integer() {
        let cases = [
            (r#"{"score": 8}"#, 8),
            (r#"{"score": "9"}"#, 9),
            (r#"{"score": 6.7}"#, 6),
            (r#"{"score": -3}"#, 0),
            (r#"{"score": "excellent"}"#, 0),
            (r#"{"score": null}"#, 0),
            (r#"{}"#, 0),
        ];
        for (json, expected) in cases {
            let review: StructuredReview = serde_json::from_str(json).unwrap();
            assert_eq!(review.score, expected, "input: {json}");
        }
    }

    #[test]
    fn issue_line_tolerates_strings_and_unknown() {
        let json = r#"{"issues": [
            {"line": "17", "type": "security", "msg": "hardcoded key"},
            {"line": "unknown", "type": "bug", "msg": "race"}
        ]}"#;
        let review: StructuredReview = serde_json::from_str(json).unwrap();
        assert_eq!(review.issues[0].line, Some(17));
        assert_eq!(review.issues[1].line, None);
    }

    #[test]
    fn unknown_issue_kind_maps_to_other() {
        let json = r#"{"issues": [{"line": 1, "type": "performance", "msg": "n^2 loop"}]}"#;
        let review: StructuredReview = serde_json::from_str(json).unwrap();
        assert_eq!(review.issues[0].kind, IssueKind::Other);
    }

    #[test]
    fn message_roles_serialize_lowercase() {
        assert_eq!(serde_json::to_string(&Role::System).unwrap(), "\"system\"");
        assert_eq!(serde_json::to_string(&Role::User).unwrap(), "\"user\"");
        assert_eq!(
            serde_json::to_string(&Role::Assistant).unwrap(),
            "\"assistant\""
        );
        assert_eq!(
            serde_json::from_str::<Role>("\"assistant\"").unwrap(),
            Role::Assistant
        );
    }
}
