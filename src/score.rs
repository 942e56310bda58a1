//! Confidence scoring over classification records.
//!
//! The score is a local, deterministic estimate of how anchored a record
//! is, not a model-native probability. Four weighted features: lexical
//! anchoring of the category, attribute count, intent presence, and a
//! hedging penalty. The result is clamped to the profile's bounds and
//! rounded to two decimals.

use serde::{Deserialize, Serialize};

use crate::record::{ClassificationRecord, SENTINEL_UNKNOWN};

/// Hedge phrases checked by substring against the case-folded intent.
/// "check" matches inside "checking"; substring is the contract.
pub const AMBIGUOUS_TERMS: [&str; 5] = ["maybe", "not sure", "possibly", "check", "update something"];

/// Attribute count at which the attribute feature saturates.
const ATTRIBUTE_CAP: f32 = 5.0;

// ── Profiles ────────────────────────────────────────────────────────────

/// Feature weights. Ambiguity weight applies to a penalty and subtracts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceWeights {
    pub lexical: f32,
    pub attributes: f32,
    pub intent: f32,
    pub ambiguity: f32,
}

impl Default for ConfidenceWeights {
    fn default() -> Self {
        Self {
            lexical: 0.25,
            attributes: 0.30,
            intent: 0.20,
            ambiguity: 0.25,
        }
    }
}

/// Named scoring constants. Two profiles are in use: [`strict`] penalizes
/// unanchored records harder and allows scores down to 0.1, [`lenient`]
/// keeps every score at 0.5 or above.
///
/// [`strict`]: ConfidenceProfile::strict
/// [`lenient`]: ConfidenceProfile::lenient
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceProfile {
    pub weights: ConfidenceWeights,
    /// Lexical feature when `request_type` is the Unknown sentinel.
    pub lexical_fallback: f32,
    /// Intent feature when `main_intent` is non-empty.
    pub intent_present: f32,
    /// Intent feature when `main_intent` is empty.
    pub intent_missing: f32,
    /// Penalty when a hedge phrase occurs in the intent.
    pub ambiguity_penalty: f32,
    pub floor: f32,
    pub ceiling: f32,
}

impl ConfidenceProfile {
    /// The stricter constants of the later scorer revisions.
    pub fn strict() -> Self {
        Self {
            weights: ConfidenceWeights::default(),
            lexical_fallback: 0.3,
            intent_present: 0.8,
            intent_missing: 0.4,
            ambiguity_penalty: 0.2,
            floor: 0.1,
            ceiling: 1.0,
        }
    }

    /// The original forgiving constants; no score falls below 0.5.
    pub fn lenient() -> Self {
        Self {
            weights: ConfidenceWeights::default(),
            lexical_fallback: 0.5,
            intent_present: 1.0,
            intent_missing: 0.6,
            ambiguity_penalty: 0.1,
            floor: 0.5,
            ceiling: 1.0,
        }
    }
}

impl Default for ConfidenceProfile {
    fn default() -> Self {
        Self::strict()
    }
}

// ── Breakdown ───────────────────────────────────────────────────────────

/// Per-feature terms behind one score, for explainability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceBreakdown {
    pub lexical_score: f32,
    pub attribute_score: f32,
    pub intent_score: f32,
    /// Applied penalty, 0.0 when no hedge phrase matched.
    pub ambiguity_penalty: f32,
    /// Weighted sum after clamping and two-decimal rounding.
    pub score: f32,
    /// Human-readable summary of the terms.
    pub reasoning: String,
}

/// Score one record under a profile.
pub fn confidence(
    record: &ClassificationRecord,
    profile: &ConfidenceProfile,
) -> ConfidenceBreakdown {
    let lexical_score = if record.request_type == SENTINEL_UNKNOWN {
        profile.lexical_fallback
    } else {
        1.0
    };

    let attr_count = record.key_attributes.len();
    let attribute_score = (attr_count as f32 / ATTRIBUTE_CAP).min(1.0);

    let intent_score = if record.main_intent.is_empty() {
        profile.intent_missing
    } else {
        profile.intent_present
    };

    // An empty intent contains no hedge, so the penalty only ever applies
    // on top of intent_present.
    let folded = record.main_intent.to_lowercase();
    let ambiguity_penalty = if AMBIGUOUS_TERMS.iter().any(|term| folded.contains(term)) {
        profile.ambiguity_penalty
    } else {
        0.0
    };

    let w = &profile.weights;
    let raw = w.lexical * lexical_score + w.attributes * attribute_score
        + w.intent * intent_score
        - w.ambiguity * ambiguity_penalty;
    let score = round2(raw.clamp(profile.floor, profile.ceiling));

    let reasoning = format!(
        "lexical={lexical_score:.2}, attributes={attribute_score:.2} ({attr_count} extracted), \
         intent={intent_score:.2}, hedge_penalty={ambiguity_penalty:.2}"
    );

    ConfidenceBreakdown {
        lexical_score,
        attribute_score,
        intent_score,
        ambiguity_penalty,
        score,
        reasoning,
    }
}

/// Round to two decimals, after clamping.
fn round2(x: f32) -> f32 {
    (x * 100.0).round() / 100.0
}

// ── Tests ───────────────────────────────────────────────────────────────
