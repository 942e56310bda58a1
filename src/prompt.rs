//! Prompt assembly for the classification call.
//!
//! Pure string work, no I/O. The email text is embedded inside a backtick
//! fence that grows past the longest backtick run in the text, so the
//! input can never terminate the fence early.

use crate::record::SENTINEL_NA;
use crate::taxonomy::Taxonomy;
use crate::thread::ThreadDecision;

/// Which instruction preamble the prompt opens with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptMode {
    /// One message; the whole text is analyzed.
    Single,
    /// A reply chain; the model is told it sees only the latest message.
    Multi,
}

impl From<&ThreadDecision> for PromptMode {
    fn from(decision: &ThreadDecision) -> Self {
        if decision.is_multi() {
            Self::Multi
        } else {
            Self::Single
        }
    }
}

impl std::fmt::Display for PromptMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Single => write!(f, "single"),
            Self::Multi => write!(f, "multi"),
        }
    }
}

/// Knobs for prompt assembly.
#[derive(Debug, Clone, Copy)]
pub struct PromptOptions<'a> {
    /// Constrains the category fields to closed sets when present.
    pub taxonomy: Option<&'a Taxonomy>,
    /// Ask the model for its own confidence score and explanation. The
    /// score is discarded downstream; the explanation is kept.
    pub ask_model_confidence: bool,
}

impl Default for PromptOptions<'_> {
    fn default() -> Self {
        Self {
            taxonomy: None,
            ask_model_confidence: true,
        }
    }
}

/// Assemble the full prompt around `text`, which must already be the text
/// to analyze (for [`PromptMode::Multi`], the extracted latest message,
/// never the whole thread).
pub fn build_prompt(text: &str, mode: PromptMode, options: &PromptOptions) -> String {
    let mut prompt = String::with_capacity(text.len() + 1024);

    match mode {
        PromptMode::Multi => {
            prompt.push_str(
                "You are an AI email analyzer for a bank. The provided email thread contains \
                 multiple conversations.\nExtract details **only from the latest email** while \
                 ignoring quoted replies.\n\n",
            );
        }
        PromptMode::Single => {
            prompt.push_str(
                "You are an AI email analyzer for a bank. Categorize the email and extract key \
                 details.\n\n",
            );
        }
    }

    let written = match mode {
        PromptMode::Multi => "latest email",
        PromptMode::Single => "email",
    };
    prompt.push_str("Your output should be a JSON object with the following keys:\n");
    prompt.push_str(
        "- **request_type**: General category (e.g., \"Information Request\", \"Support Request\").\n",
    );
    prompt.push_str(&format!(
        "- **sub_request_type**: Specific category (e.g., \"Password Reset\", \"Order Status\"). \
         If not applicable, return \"{SENTINEL_NA}\".\n"
    ));
    prompt.push_str(
        "- **key_attributes**: A list of key details (e.g., [\"Order Number: 12345\", \
         \"Account ID: ABC1234\"]). If none, return an empty list.\n",
    );
    prompt.push_str(&format!(
        "- **main_intent**: A concise summary of why the {written} was written.\n"
    ));
    if options.ask_model_confidence {
        prompt.push_str(
            "- **confidence_score**: A number between 0 and 1 expressing how certain you are.\n",
        );
        prompt.push_str(
            "- **confidence_explanation**: A short justification of that certainty.\n",
        );
    }

    if let Some(taxonomy) = options.taxonomy {
        push_taxonomy_constraint(&mut prompt, taxonomy);
    }

    let label = match mode {
        PromptMode::Multi => "Latest Email:",
        PromptMode::Single => "Email:",
    };
    let fence = fence_for(text);
    prompt.push('\n');
    prompt.push_str(label);
    prompt.push('\n');
    prompt.push_str(&fence);
    prompt.push_str(text);
    prompt.push_str(&fence);

    prompt
}

/// Render the closed-set constraint. Empty sections are skipped.
fn push_taxonomy_constraint(prompt: &mut String, taxonomy: &Taxonomy) {
    if !taxonomy.requests.is_empty() {
        prompt.push_str(
            "\nChoose **request_type** and **sub_request_type** from this list only:\n",
        );
        for request in &taxonomy.requests {
            if request.sub_types.is_empty() {
                prompt.push_str(&format!("- {}\n", request.name));
            } else {
                prompt.push_str(&format!(
                    "- {} (sub types: {})\n",
                    request.name,
                    request.sub_types.join(", ")
                ));
            }
        }
    }
    if !taxonomy.key_attributes.is_empty() {
        prompt.push_str(&format!(
            "Prefer these key attribute labels when extracting: {}.\n",
            taxonomy.key_attributes.join(", ")
        ));
    }
}

/// A backtick fence one longer than the longest backtick run in `text`,
/// at least three.
fn fence_for(text: &str) -> String {
    let mut longest = 0usize;
    let mut run = 0usize;
    for ch in text.chars() {
        if ch == '`' {
            run += 1;
            longest = longest.max(run);
        } else {
            run = 0;
        }
    }
    "`".repeat((longest + 1).max(3))
}

// ── Tests ───────────────────────────────────────────────────────────────
