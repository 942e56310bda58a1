//! Pipeline orchestration: one context object running the full flow.
//!
//! raw text → canonicalize → thread split → SR resolve → prompt build →
//! model call → reply parse → confidence score. SR resolution runs on the
//! full canonical text and never depends on classifier output. The model
//! call is the only suspension point and the only stage that can block.

use tracing::{debug, info};

use crate::canonical::{canonicalize_with, CanonicalOptions};
use crate::client::LlmClient;
use crate::error::MailsiftResult;
use crate::prompt::{build_prompt, PromptMode, PromptOptions};
use crate::record::{ClassificationRecord, ScoredRecord};
use crate::reply::parse_reply;
use crate::score::{confidence, ConfidenceBreakdown, ConfidenceProfile};
use crate::srnum::SrIdentifier;
use crate::taxonomy::Taxonomy;
use crate::thread::{split_thread, ThreadDecision};

/// Everything the pipeline needs besides the client.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub canonical: CanonicalOptions,
    pub profile: ConfidenceProfile,
    pub taxonomy: Option<Taxonomy>,
    pub ask_model_confidence: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            canonical: CanonicalOptions::default(),
            profile: ConfidenceProfile::default(),
            taxonomy: None,
            ask_model_confidence: true,
        }
    }
}

/// Every intermediate the pipeline produced for one input, kept for
/// reporting and export.
#[derive(Debug, Clone)]
pub struct Analysis {
    pub canonical: String,
    pub thread: ThreadDecision,
    pub sr: SrIdentifier,
    pub prompt: String,
    pub raw_reply: String,
    pub record: ClassificationRecord,
    pub breakdown: ConfidenceBreakdown,
    pub scored: ScoredRecord,
}

/// Prompt-stage output for inspection without a model call.
#[derive(Debug, Clone)]
pub struct PromptPreview {
    pub canonical: String,
    pub thread: ThreadDecision,
    pub prompt: String,
}

/// Built once per process; holds configuration and the probed client.
#[derive(Debug)]
pub struct Analyzer {
    config: PipelineConfig,
    client: LlmClient,
}

impl Analyzer {
    pub fn new(config: PipelineConfig, client: LlmClient) -> Self {
        Self { config, client }
    }

    pub fn client(&self) -> &LlmClient {
        &self.client
    }

    /// Run the full flow on one raw blob.
    pub fn analyze(&self, blob: &str) -> MailsiftResult<Analysis> {
        let preview = self.preview(blob);
        let sr = SrIdentifier::resolve(&preview.canonical);
        if sr.is_followup() {
            info!(id = sr.id(), "thread references an existing service request");
        }

        let raw_reply = self.client.generate(&preview.prompt, None)?;
        debug!(chars = raw_reply.len(), "model replied");
        let record = parse_reply(&raw_reply)?;
        let breakdown = confidence(&record, &self.config.profile);
        info!(
            request_type = %record.request_type,
            score = breakdown.score,
            "classified"
        );

        let scored = ScoredRecord {
            record: record.clone(),
            confidence_score: breakdown.score,
            sr: sr.clone(),
        };
        Ok(Analysis {
            canonical: preview.canonical,
            thread: preview.thread,
            sr,
            prompt: preview.prompt,
            raw_reply,
            record,
            breakdown,
            scored,
        })
    }

    /// Canonicalize, split, and build the prompt, with no model call and
    /// no SR minting.
    pub fn preview(&self, blob: &str) -> PromptPreview {
        let canonical = canonicalize_with(blob, &self.config.canonical);
        let thread = split_thread(&canonical);
        let mode = PromptMode::from(&thread);
        let options = PromptOptions {
            taxonomy: self.config.taxonomy.as_ref(),
            ask_model_confidence: self.config.ask_model_confidence,
        };
        let prompt = build_prompt(thread.latest(), mode, &options);
        debug!(%mode, chars = prompt.len(), "prompt built");
        PromptPreview {
            canonical,
            thread,
            prompt,
        }
    }
}

// ── Tests ───────────────────────────────────────────────────────────────
