//! Structured classification records built from untrusted model JSON.
//!
//! Field extraction is lenient. A missing or wrong-typed key defaults and
//! logs instead of failing, so one sloppy model reply still yields a
//! scoreable record. Syntactic failures are handled earlier, in reply
//! parsing.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::srnum::SrIdentifier;

/// Sentinel for an inapplicable sub-category.
pub const SENTINEL_NA: &str = "N/A";

/// Sentinel a model emits when it cannot categorize.
pub const SENTINEL_UNKNOWN: &str = "Unknown";

// ── ClassificationRecord ────────────────────────────────────────────────

/// One classified email, as extracted from a model reply.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClassificationRecord {
    /// General request category, e.g. "Information Request".
    pub request_type: String,
    /// Finer category, or [`SENTINEL_NA`] when inapplicable.
    pub sub_request_type: String,
    /// Extracted facts like "Order Number: 12345". Possibly empty.
    pub key_attributes: Vec<String>,
    /// One-line summary of what the sender wants.
    pub main_intent: String,
    /// The model's own explanation of its certainty. Empty when the prompt
    /// did not ask for one.
    #[serde(default)]
    pub confidence_explanation: String,
}

impl ClassificationRecord {
    /// Extract a record from a parsed JSON object, defaulting field by
    /// field. Never fails; any numeric `confidence_score` the model
    /// volunteered is ignored, scoring is local.
    pub fn from_value(value: &Value) -> Self {
        Self {
            request_type: string_field(value, "request_type"),
            sub_request_type: string_field(value, "sub_request_type"),
            key_attributes: attribute_list(value),
            main_intent: string_field(value, "main_intent"),
            confidence_explanation: optional_string_field(value, "confidence_explanation"),
        }
    }

    /// Attributes joined for single-cell display, `", "`-separated.
    pub fn key_attributes_joined(&self) -> String {
        self.key_attributes.join(", ")
    }
}

/// Required string key: missing or wrong-typed defaults to empty with a
/// warning.
fn string_field(value: &Value, key: &str) -> String {
    match value.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(other) => {
            warn!(key, got = %other, "classification field has wrong type, defaulting to empty");
            String::new()
        }
        None => {
            warn!(key, "classification field missing, defaulting to empty");
            String::new()
        }
    }
}

/// Optional string key: absence is expected, only a wrong type is logged.
fn optional_string_field(value: &Value, key: &str) -> String {
    match value.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(other) => {
            warn!(key, got = %other, "classification field has wrong type, defaulting to empty");
            String::new()
        }
        None => String::new(),
    }
}

/// `key_attributes` as a list of strings. Scalar items are stringified,
/// nested arrays/objects and nulls are skipped.
fn attribute_list(value: &Value) -> Vec<String> {
    let items = match value.get("key_attributes") {
        Some(Value::Array(items)) => items,
        Some(other) => {
            warn!(got = %other, "key_attributes is not a list, defaulting to empty");
            return Vec::new();
        }
        None => {
            warn!("key_attributes missing, defaulting to empty");
            return Vec::new();
        }
    };
    items
        .iter()
        .filter_map(|item| match item {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            Value::Null | Value::Array(_) | Value::Object(_) => {
                debug!(item = %item, "skipping non-scalar key attribute");
                None
            }
        })
        .collect()
}

// ── ScoredRecord ────────────────────────────────────────────────────────

/// A classification record with its locally computed score and the SR
/// identifier the thread resolved to. This is the unit of export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredRecord {
    #[serde(flatten)]
    pub record: ClassificationRecord,
    /// Bounded score from the configured profile, not the model's number.
    pub confidence_score: f32,
    pub sr: SrIdentifier,
}

// ── Tests ───────────────────────────────────────────────────────────────
