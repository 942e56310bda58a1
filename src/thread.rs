//! Thread splitting: multi-conversation detection and latest-message
//! extraction.
//!
//! Detection and extraction are deliberately asymmetric. Detection fires on
//! any of four reply indicators (attribution lines plus three header-style
//! markers) and is a coarse trigger. Extraction cuts only at an
//! `On … wrote:` attribution boundary; when detection fired on a header
//! marker alone there is no structural cut point, and the whole text is the
//! latest message.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

// ── Reply indicators ────────────────────────────────────────────────────

/// `On [date], [person] wrote:` attribution line. The only boundary
/// extraction cuts at.
static RE_REPLY_BOUNDARY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\nOn .* wrote:\n").unwrap());

/// Quoted `From: Name <addr@host>` header line.
static RE_HEADER_FROM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"From: .*<.*@.*>").unwrap());

/// Outlook-style `Sent:` reply header.
static RE_HEADER_SENT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"Sent: .*").unwrap());

/// Repeated `Subject:` line inside a quoted reply.
static RE_HEADER_SUBJECT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Subject: .*").unwrap());

// ── ThreadDecision ──────────────────────────────────────────────────────

/// Result of thread analysis on one text blob.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ThreadDecision {
    /// No reply indicator matched; the blob is one message.
    Single { text: String },
    /// At least one reply indicator matched. `latest` is the trimmed content
    /// before the first attribution boundary and never contains one;
    /// `remainder` is the suffix starting at that boundary, or empty when
    /// only header-style markers fired.
    Multi { latest: String, remainder: String },
}

impl ThreadDecision {
    /// The text a classifier should see: the latest message.
    pub fn latest(&self) -> &str {
        match self {
            Self::Single { text } => text,
            Self::Multi { latest, .. } => latest,
        }
    }

    /// Whether reply indicators were detected.
    pub fn is_multi(&self) -> bool {
        matches!(self, Self::Multi { .. })
    }
}

impl std::fmt::Display for ThreadDecision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Single { .. } => write!(f, "single"),
            Self::Multi { .. } => write!(f, "multi"),
        }
    }
}

// ── Detection & extraction ──────────────────────────────────────────────

/// Whether the text contains any reply indicator (OR over the four
/// patterns; a single match suffices).
pub fn is_multi_conversation(text: &str) -> bool {
    RE_REPLY_BOUNDARY.is_match(text)
        || RE_HEADER_FROM.is_match(text)
        || RE_HEADER_SENT.is_match(text)
        || RE_HEADER_SUBJECT.is_match(text)
}

/// The trimmed content before the first `On … wrote:` boundary.
///
/// If no such boundary exists the whole trimmed text is returned, even when
/// header-style markers are present. Everything after the first boundary,
/// including intermediate messages, is discarded.
pub fn extract_latest(text: &str) -> &str {
    match RE_REPLY_BOUNDARY.find(text) {
        Some(m) => text[..m.start()].trim(),
        None => text.trim(),
    }
}

/// Run detection and extraction, producing a typed [`ThreadDecision`].
pub fn split_thread(text: &str) -> ThreadDecision {
    if !is_multi_conversation(text) {
        return ThreadDecision::Single {
            text: text.trim().to_string(),
        };
    }
    match RE_REPLY_BOUNDARY.find(text) {
        Some(m) => ThreadDecision::Multi {
            latest: text[..m.start()].trim().to_string(),
            remainder: text[m.start()..].to_string(),
        },
        None => ThreadDecision::Multi {
            latest: text.trim().to_string(),
            remainder: String::new(),
        },
    }
}

// ── Tests ───────────────────────────────────────────────────────────────
