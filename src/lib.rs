// thiserror's #[error("...{field}...")] format strings reference struct fields,
// but the compiler doesn't see through the derive macro and reports false positives.
#![allow(unused_assignments)]

//! # mailsift
//!
//! An email triage pipeline: thread splitting, service-request tracking,
//! LLM classification, and local confidence scoring.
//!
//! ## Architecture
//!
//! - **Canonicalizer** (`canonical`): idempotent whitespace normalization plus opt-in redaction rules
//! - **Thread splitter** (`thread`): reply-chain detection and latest-message extraction
//! - **SR numbers** (`srnum`): find existing service-request ids or mint time-stamped ones
//! - **Prompt builder** (`prompt`): single/multi instruction templates with delimiter-safe embedding
//! - **Reply parser** (`reply`): JSON extraction from free-form model output, failures carry the raw text
//! - **Scorer** (`score`): weighted, bounded, explainable confidence independent of the model's own number
//! - **Pipeline** (`pipeline`): one context object wiring the stages around an Ollama client
//!
//! ## Library usage
//!
//! ```no_run
//! use mailsift::client::{LlmClient, LlmConfig};
//! use mailsift::pipeline::{Analyzer, PipelineConfig};
//!
//! let mut client = LlmClient::new(LlmConfig::default());
//! client.probe();
//! let analyzer = Analyzer::new(PipelineConfig::default(), client);
//! let analysis = analyzer.analyze("Please reset my password.").unwrap();
//! println!("{} -> {}", analysis.sr, analysis.breakdown.score);
//! ```

pub mod canonical;
pub mod client;
pub mod error;
pub mod export;
pub mod intake;
pub mod pipeline;
pub mod prompt;
pub mod record;
pub mod reply;
pub mod score;
pub mod srnum;
pub mod taxonomy;
pub mod thread;
