//! Service request (SR) numbers: detection of tracked identifiers in a
//! thread and minting of fresh ones.
//!
//! Resolution is independent of classification. It runs on the full thread
//! text, quoted history included, because an identifier buried in an old
//! reply still marks the thread as tracked.

use std::sync::LazyLock;

use chrono::{DateTime, Local};
use rand::Rng;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Characters an SR suffix draws from, uniformly.
pub const SR_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Length of the random suffix.
pub const SR_SUFFIX_LEN: usize = 6;

/// `SR-DDMMYYYY-HHMM-XXXXXX`, matched case-insensitively on word
/// boundaries. Matches are reproduced verbatim, so a lowercase identifier
/// stays lowercase.
static RE_SR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bSR-\d{8}-\d{4}-[A-Z0-9]{6}\b").unwrap());

/// First SR identifier in the text, verbatim, or `None`.
pub fn find_existing(text: &str) -> Option<&str> {
    RE_SR.find(text).map(|m| m.as_str())
}

/// Mint an identifier stamped with the current local time.
pub fn mint() -> String {
    mint_at(Local::now())
}

/// Mint an identifier stamped with `when`: `SR-` + day-month-year and
/// hour-minute of the local timestamp + a random suffix. Minute resolution;
/// uniqueness within a minute rests on the suffix.
pub fn mint_at(when: DateTime<Local>) -> String {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..SR_SUFFIX_LEN)
        .map(|_| SR_ALPHABET[rng.gen_range(0..SR_ALPHABET.len())] as char)
        .collect();
    format!("SR-{}-{}", when.format("%d%m%Y-%H%M"), suffix)
}

// ── SrIdentifier ────────────────────────────────────────────────────────

/// Outcome of SR resolution for one thread.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SrIdentifier {
    /// No tracked identifier was present; a fresh one was minted.
    New {
        id: String,
        created_at: DateTime<Local>,
    },
    /// An identifier already present in the thread, reproduced verbatim.
    Followup { id: String },
}

impl SrIdentifier {
    /// Reuse the first identifier found in `text`, or mint a new one.
    pub fn resolve(text: &str) -> Self {
        match find_existing(text) {
            Some(existing) => Self::Followup {
                id: existing.to_string(),
            },
            None => {
                let created_at = Local::now();
                Self::New {
                    id: mint_at(created_at),
                    created_at,
                }
            }
        }
    }

    /// The bare identifier.
    pub fn id(&self) -> &str {
        match self {
            Self::New { id, .. } | Self::Followup { id } => id,
        }
    }

    /// Whether the thread was already tracked.
    pub fn is_followup(&self) -> bool {
        matches!(self, Self::Followup { .. })
    }

    /// Reporting form: follow-ups carry a `Duplicate/Follow-up` marker so
    /// reviewers can spot threads that already have a ticket.
    pub fn display_label(&self) -> String {
        match self {
            Self::New { id, .. } => id.clone(),
            Self::Followup { id } => format!("Duplicate/Follow-up - {id}"),
        }
    }
}

impl std::fmt::Display for SrIdentifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_label())
    }
}

// ── Tests ───────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn minted_identifier_has_expected_shape() {
        let id = mint();
        assert_eq!(id.len(), 23, "SR-DDMMYYYY-HHMM-XXXXXX is 23 chars");
        assert!(id.starts_with("SR-"));
        assert!(
            find_existing(&id).is_some(),
            "minted id must be detectable: {id}"
        );
    }

    #[test]
    fn minted_suffix_draws_from_alphabet() {
        let id = mint();
        let suffix = &id[id.len() - SR_SUFFIX_LEN..];
        for ch in suffix.bytes() {
            assert!(SR_ALPHABET.contains(&ch), "unexpected suffix byte {ch}");
        }
    }

    #[test]
    fn mint_at_stamps_local_time() {
        let when = Local.with_ymd_and_hms(2025, 3, 12, 14, 30, 0).unwrap();
        let id = mint_at(when);
        assert!(id.starts_with("SR-12032025-1430-"), "got {id}");
    }

    #[test]
    fn consecutive_mints_differ() {
        assert_ne!(mint(), mint());
    }

    #[test]
    fn find_returns_first_match_verbatim() {
        let text = "re: sr-12032025-1430-ab12cd and later SR-01012024-0900-ZZZZZZ";
        // Case-insensitive match, original casing preserved.
        assert_eq!(find_existing(text), Some("sr-12032025-1430-ab12cd"));
    }

    #[test]
    fn find_rejects_malformed_identifiers() {
        assert_eq!(find_existing("SR-1234-0900-ABCDEF"), None);
        assert_eq!(find_existing("SR-12032025-1430-AB"), None);
        assert_eq!(find_existing("no identifiers here"), None);
    }

    #[test]
    fn resolve_mints_when_absent() {
        let sr = SrIdentifier::resolve("fresh request, no ticket yet");
        assert!(!sr.is_followup());
        assert!(find_existing(sr.id()).is_some());
        assert_eq!(sr.display_label(), sr.id());
    }

    #[test]
    fn resolve_reuses_existing_identifier() {
        let sr = SrIdentifier::resolve("following up on SR-12032025-1430-AB12CD");
        assert!(sr.is_followup());
        assert_eq!(sr.id(), "SR-12032025-1430-AB12CD");
        assert_eq!(
            sr.display_label(),
            "Duplicate/Follow-up - SR-12032025-1430-AB12CD"
        );
        assert_eq!(sr.to_string(), sr.display_label());
    }
}
