//! Model reply parsing: pull a JSON object out of free-form output.
//!
//! Models wrap JSON in prose, markdown fences, or both. Extraction tries a
//! ```json fence first (non-greedy), then falls back to the greedy span
//! from the first `{` to the last `}`. Whatever happens, the raw reply
//! survives inside the error for display.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;
use tracing::warn;

use crate::error::{ReplyError, ReplyResult};
use crate::record::ClassificationRecord;

/// Markdown-fenced JSON block; the capture is the body between the fences.
static RE_JSON_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```json\n(.*?)\n```").unwrap());

/// Greedy first-`{`-to-last-`}` span.
static RE_JSON_SPAN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)\{.*\}").unwrap());

/// Parse one raw model reply into a classification record.
///
/// Extraction failures and JSON syntax errors both yield
/// [`ReplyError::MalformedModelOutput`]; missing fields inside a
/// syntactically valid object default instead (see
/// [`ClassificationRecord::from_value`]).
pub fn parse_reply(raw: &str) -> ReplyResult<ClassificationRecord> {
    let trimmed = raw.trim();
    let span = match RE_JSON_FENCE.captures(trimmed) {
        Some(caps) => caps.get(1).map(|m| m.as_str()).unwrap_or_default(),
        None => match RE_JSON_SPAN.find(trimmed) {
            Some(m) => m.as_str(),
            None => {
                warn!("model reply contained no JSON object");
                return Err(ReplyError::MalformedModelOutput {
                    raw: raw.to_string(),
                });
            }
        },
    };

    let value: Value = serde_json::from_str(span).map_err(|err| {
        warn!(error = %err, "extracted span is not valid JSON");
        ReplyError::MalformedModelOutput {
            raw: raw.to_string(),
        }
    })?;

    Ok(ClassificationRecord::from_value(&value))
}

// ── Tests ───────────────────────────────────────────────────────────────
