//! Prompt construction.
//!
//! Pure functions, no I/O. Building a prompt cannot fail; malformed inputs
//! are embedded as-is and left for the model to cope with.

use std::fmt::Write;

use crate::llm::Message;
use crate::store::ReviewContext;

/// Build the review prompt for one file.
///
/// The backend is told to answer with nothing but a JSON object matching the
/// structured-review shape; prior findings for the file are embedded verbatim
/// so the model can reference them.
pub fn build_review_prompt(code: &str, file_path: &str, context: Option<&ReviewContext>) -> String {
    let context_json = context
        .and_then(|ctx| serde_json::to_string(ctx).ok())
        .unwrap_or_else(|| "\"None\"".to_string());

    format!(
        r#"You are an expert senior developer reviewing code for file: {file_path}

CRITERIA:
1. Identify bugs or security flaws.
2. Suggest performance optimizations.
3. Check for best practices and readability.

CONTEXT FROM PREVIOUS REVIEWS:
{context_json}

CODE TO REVIEW:
```
{code}
```

RESPONSE FORMAT:
You MUST respond ONLY with a valid JSON object. Do not include markdown formatting or prose.
{{
  "summary": "Brief overall thought",
  "score": 1-10,
  "issues": [{{"line": number, "type": "bug|style|security", "msg": "description", "fix": "suggested code"}}],
  "optimizations": ["list of tips"]
}}"#
    )
}

/// Serialize the rolling chat history into a single prompt, one
/// `role: content` line per turn, ending with the cue for the next
/// assistant turn.
pub fn build_chat_prompt(message: &str, history: &[Message]) -> String {
    let mut prompt = String::from(
        "You are an expert developer assistant. Help with code-related questions.\n\n",
    );
    for msg in history {
        let _ = writeln!(prompt, "{}: {}", msg.role, msg.content);
    }
    let _ = write!(prompt, "user: {message}\nassistant:");
    prompt
}
