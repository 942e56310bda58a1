//! Text canonicalization: whitespace normalization plus optional redaction
//! and token-standardization rules.
//!
//! Canonicalization runs before thread splitting, SR scanning, and prompt
//! assembly so every downstream regex sees predictable spacing. The rewrite
//! is idempotent: applying it twice yields the same string as applying it
//! once, with or without the optional rules enabled.

use std::sync::LazyLock;

use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Replacement for redacted account numbers.
pub const ACCOUNT_PLACEHOLDER: &str = "[REDACTED]";

/// Replacement for redacted email addresses.
pub const EMAIL_PLACEHOLDER: &str = "[EMAIL REDACTED]";

// ── Regexes ─────────────────────────────────────────────────────────────

/// Runs of two or more newlines collapse to a single newline.
static RE_NEWLINE_RUNS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n{2,}").unwrap());

/// Runs of two or more whitespace characters collapse to a single space.
static RE_SPACE_RUNS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s{2,}").unwrap());

/// `Account #: 12345678` style labels followed by six or more digits.
static RE_ACCOUNT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(Account #:\s?)\d{6,}").unwrap());

/// Standard local@domain email addresses.
static RE_EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b").unwrap()
});

/// `12-March-2025` / `3/Jan/2024` style dates with an English month name.
static RE_NAMED_DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d{1,2})[-/]([A-Za-z]+)[-/](\d{4})\b").unwrap());

/// `$ 1 250 000` style amounts with space-separated thousands groups.
static RE_SPACED_CURRENCY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\s?(\d{1,3}(?: \d{3})+)\b").unwrap());

// ── CanonicalOptions ────────────────────────────────────────────────────

/// Optional rewrite rules applied after whitespace normalization.
///
/// All rules default to off; the plain [`canonicalize`] path only
/// normalizes whitespace.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalOptions {
    /// Rewrite `12-March-2025` (also `/` separated) to `2025-03-12`.
    /// Full and three-letter English month names are recognized.
    pub normalize_dates: bool,
    /// Rewrite `$ 1 250 000` (space-separated thousands) to `$1,250,000`.
    pub group_currency: bool,
    /// Replace digits after an `Account #:` label with `[REDACTED]`.
    pub redact_accounts: bool,
    /// Replace email addresses with `[EMAIL REDACTED]`.
    pub redact_emails: bool,
}

impl CanonicalOptions {
    /// Whether any optional rule is enabled.
    pub fn any_enabled(&self) -> bool {
        self.normalize_dates || self.group_currency || self.redact_accounts || self.redact_emails
    }
}

// ── canonicalize ────────────────────────────────────────────────────────

/// Normalize whitespace: trim, collapse newline runs to one newline, then
/// collapse any remaining whitespace runs to one space.
pub fn canonicalize(text: &str) -> String {
    canonicalize_with(text, &CanonicalOptions::default())
}

/// Normalize whitespace, then apply the enabled optional rules in order:
/// dates, currency, account redaction, email redaction.
///
/// Never fails; a rule that matches nothing leaves the text unchanged.
pub fn canonicalize_with(text: &str, options: &CanonicalOptions) -> String {
    let trimmed = text.trim();
    let collapsed = RE_NEWLINE_RUNS.replace_all(trimmed, "\n");
    let mut out = RE_SPACE_RUNS.replace_all(&collapsed, " ").into_owned();

    if options.normalize_dates {
        out = normalize_dates(&out);
    }
    if options.group_currency {
        out = group_currency(&out);
    }
    if options.redact_accounts {
        let hits = RE_ACCOUNT.find_iter(&out).count();
        if hits > 0 {
            debug!(hits, "redacting account numbers");
            out = RE_ACCOUNT
                .replace_all(&out, |caps: &Captures| {
                    format!("{}{ACCOUNT_PLACEHOLDER}", &caps[1])
                })
                .into_owned();
        }
    }
    if options.redact_emails {
        let hits = RE_EMAIL.find_iter(&out).count();
        if hits > 0 {
            debug!(hits, "redacting email addresses");
            out = RE_EMAIL.replace_all(&out, EMAIL_PLACEHOLDER).into_owned();
        }
    }
    out
}

// ── Rewrite helpers ─────────────────────────────────────────────────────

/// Rewrite `D-Month-YYYY` tokens to `YYYY-MM-DD`.
///
/// Tokens with an unrecognized month name or an out-of-range day are left
/// unchanged.
fn normalize_dates(text: &str) -> String {
    RE_NAMED_DATE
        .replace_all(text, |caps: &Captures| {
            let day: u32 = caps[1].parse().unwrap_or(0);
            match month_number(&caps[2]) {
                Some(month) if (1..=31).contains(&day) => {
                    format!("{}-{month:02}-{day:02}", &caps[3])
                }
                _ => caps[0].to_string(),
            }
        })
        .into_owned()
}

/// Rewrite `$ 1 250 000` style amounts to comma grouping.
fn group_currency(text: &str) -> String {
    RE_SPACED_CURRENCY
        .replace_all(text, |caps: &Captures| {
            let grouped = caps[1].split(' ').collect::<Vec<_>>().join(",");
            format!("${grouped}")
        })
        .into_owned()
}

/// Map an English month name (full or three-letter) to its number.
fn month_number(name: &str) -> Option<u32> {
    match name.to_ascii_lowercase().as_str() {
        "january" | "jan" => Some(1),
        "february" | "feb" => Some(2),
        "march" | "mar" => Some(3),
        "april" | "apr" => Some(4),
        "may" => Some(5),
        "june" | "jun" => Some(6),
        "july" | "jul" => Some(7),
        "august" | "aug" => Some(8),
        "september" | "sep" => Some(9),
        "october" | "oct" => Some(10),
        "november" | "nov" => Some(11),
        "december" | "dec" => Some(12),
        _ => None,
    }
}

// ── Tests ───────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn all_options() -> CanonicalOptions {
        CanonicalOptions {
            normalize_dates: true,
            group_currency: true,
            redact_accounts: true,
            redact_emails: true,
        }
    }

    // ── Whitespace normalization ───────────────────────────────────────

    #[test]
    fn trims_leading_and_trailing_whitespace() {
        assert_eq!(canonicalize("  hello  "), "hello");
        assert_eq!(canonicalize("\n\nhello\n\n"), "hello");
    }

    #[test]
    fn collapses_newline_runs_to_one_newline() {
        assert_eq!(canonicalize("a\n\n\nb"), "a\nb");
    }

    #[test]
    fn collapses_whitespace_runs_to_one_space() {
        assert_eq!(canonicalize("a  \t b"), "a b");
        assert_eq!(canonicalize("a \nb"), "a b");
    }

    #[test]
    fn preserves_single_newlines_and_spaces() {
        assert_eq!(canonicalize("a\nb c"), "a\nb c");
    }

    #[test]
    fn empty_input_stays_empty() {
        assert_eq!(canonicalize(""), "");
        assert_eq!(canonicalize("   \n\n  "), "");
    }

    // ── Idempotence ────────────────────────────────────────────────────

    #[test]
    fn canonicalize_is_idempotent() {
        let samples = [
            "",
            "  hello  ",
            "a\n\n\nb\t\tc",
            "Dear team,\n\nPlease advise.\n\nThanks,\nAlice",
            "x \ny",
            "a\n \nb",
            "already canonical\ntext here",
        ];
        for sample in samples {
            let once = canonicalize(sample);
            let twice = canonicalize(&once);
            assert_eq!(once, twice, "not idempotent for {sample:?}");
        }
    }

    #[test]
    fn canonicalize_with_options_is_idempotent() {
        let options = all_options();
        let samples = [
            "Payment of $ 1 250 000 due 12-March-2025",
            "Account #: 123456789 for bob@example.com",
            "On 3/Jan/2024   we  spoke",
        ];
        for sample in samples {
            let once = canonicalize_with(sample, &options);
            let twice = canonicalize_with(&once, &options);
            assert_eq!(once, twice, "not idempotent for {sample:?}");
        }
    }

    // ── Optional rules ─────────────────────────────────────────────────

    #[test]
    fn default_options_leave_sensitive_text_alone() {
        let text = "Account #: 123456789 for bob@example.com";
        assert_eq!(canonicalize(text), text);
        assert!(!CanonicalOptions::default().any_enabled());
    }

    #[test]
    fn redacts_account_numbers_keeping_label() {
        let options = CanonicalOptions {
            redact_accounts: true,
            ..Default::default()
        };
        let out = canonicalize_with("Account #: 123456789 overdue", &options);
        assert_eq!(out, "Account #: [REDACTED] overdue");
    }

    #[test]
    fn short_account_numbers_are_not_redacted() {
        let options = CanonicalOptions {
            redact_accounts: true,
            ..Default::default()
        };
        // Fewer than six digits is not an account number.
        let out = canonicalize_with("Account #: 12345 overdue", &options);
        assert_eq!(out, "Account #: 12345 overdue");
    }

    #[test]
    fn redacts_email_addresses() {
        let options = CanonicalOptions {
            redact_emails: true,
            ..Default::default()
        };
        let out = canonicalize_with("Contact alice.smith@bank.example.com today", &options);
        assert_eq!(out, format!("Contact {EMAIL_PLACEHOLDER} today"));
    }

    #[test]
    fn normalizes_named_dates() {
        let options = CanonicalOptions {
            normalize_dates: true,
            ..Default::default()
        };
        assert_eq!(
            canonicalize_with("due 12-March-2025", &options),
            "due 2025-03-12"
        );
        assert_eq!(
            canonicalize_with("signed 3/Jan/2024", &options),
            "signed 2024-01-03"
        );
    }

    #[test]
    fn unknown_month_names_stay_unchanged() {
        let options = CanonicalOptions {
            normalize_dates: true,
            ..Default::default()
        };
        assert_eq!(
            canonicalize_with("ref 12-Foo-2025", &options),
            "ref 12-Foo-2025"
        );
    }

    #[test]
    fn groups_spaced_currency() {
        let options = CanonicalOptions {
            group_currency: true,
            ..Default::default()
        };
        assert_eq!(
            canonicalize_with("wire $ 1 250 000 by Friday", &options),
            "wire $1,250,000 by Friday"
        );
        // Plain amounts are untouched.
        assert_eq!(
            canonicalize_with("wire $1250000 by Friday", &options),
            "wire $1250000 by Friday"
        );
    }
}
