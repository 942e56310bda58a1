//! Ollama client for the classification call.
//!
//! One blocking request per analyzed email: the built prompt goes out,
//! free-form text comes back. Availability is probed once up front;
//! calls against an unavailable server fail fast instead of waiting out
//! the full request timeout. The client performs no retries, that policy
//! belongs to the caller.

use miette::Diagnostic;
use thiserror::Error;

/// Errors from the model endpoint.
#[derive(Debug, Error, Diagnostic)]
pub enum LlmError {
    #[error("Ollama is not available at {url}")]
    #[diagnostic(
        code(mailsift::llm::unavailable),
        help("Start Ollama with `ollama serve`, or use `mailsift prompt` to build prompts offline.")
    )]
    Unavailable { url: String },

    #[error("Ollama request failed: {message}")]
    #[diagnostic(
        code(mailsift::llm::request_failed),
        help("Check that Ollama is running and the configured model is pulled.")
    )]
    RequestFailed { message: String },

    #[error("failed to parse Ollama response: {message}")]
    #[diagnostic(
        code(mailsift::llm::parse_error),
        help("The model endpoint returned an unexpected response format.")
    )]
    ParseError { message: String },
}

/// Configuration for the model endpoint.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// Base URL of the Ollama API.
    pub base_url: String,
    /// Model name to generate with.
    pub model: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:11434".into(),
            model: "llama3.2".into(),
            timeout_secs: 120,
        }
    }
}

/// Client for the Ollama REST API.
pub struct LlmClient {
    config: LlmConfig,
    available: bool,
    /// Models present on the server after `probe()`.
    available_models: Vec<String>,
}

impl LlmClient {
    pub fn new(config: LlmConfig) -> Self {
        Self {
            config,
            available: false,
            available_models: Vec::new(),
        }
    }

    /// Probe `/api/tags` with a short timeout and record availability plus
    /// the server's model list.
    pub fn probe(&mut self) -> bool {
        let url = format!("{}/api/tags", self.config.base_url);
        let agent = ureq::AgentBuilder::new()
            .timeout(std::time::Duration::from_secs(5))
            .build();

        match agent.get(&url).call() {
            Ok(resp) => {
                if resp.status() != 200 {
                    self.available = false;
                    return false;
                }
                self.available = true;

                if let Ok(body) = resp.into_string() {
                    if let Ok(json) = serde_json::from_str::<serde_json::Value>(&body) {
                        self.available_models = json["models"]
                            .as_array()
                            .map(|arr| {
                                arr.iter()
                                    .filter_map(|m| m["name"].as_str().map(|s| s.to_string()))
                                    .collect()
                            })
                            .unwrap_or_default();
                    }
                }

                true
            }
            Err(_) => {
                self.available = false;
                self.available_models.clear();
                false
            }
        }
    }

    /// Whether the last probe reached the server.
    pub fn is_available(&self) -> bool {
        self.available
    }

    /// Whether the configured model is on the server, with or without a
    /// `:tag` suffix.
    pub fn has_model(&self) -> bool {
        let target = &self.config.model;
        self.available_models
            .iter()
            .any(|m| m == target || m.split(':').next() == Some(target))
    }

    /// One completion for one prompt. `system` rides along when given.
    pub fn generate(&self, prompt: &str, system: Option<&str>) -> Result<String, LlmError> {
        if !self.available {
            return Err(LlmError::Unavailable {
                url: self.config.base_url.clone(),
            });
        }

        let url = format!("{}/api/generate", self.config.base_url);
        let agent = ureq::AgentBuilder::new()
            .timeout(std::time::Duration::from_secs(self.config.timeout_secs))
            .build();

        let mut body = serde_json::json!({
            "model": self.config.model,
            "prompt": prompt,
            "stream": false,
        });
        if let Some(sys) = system {
            body["system"] = serde_json::Value::String(sys.to_string());
        }

        let body_str = serde_json::to_string(&body).map_err(|e| LlmError::RequestFailed {
            message: format!("JSON serialize error: {e}"),
        })?;

        let resp = agent
            .post(&url)
            .set("Content-Type", "application/json")
            .send_string(&body_str)
            .map_err(|e: ureq::Error| LlmError::RequestFailed {
                message: e.to_string(),
            })?;

        let resp_str = resp.into_string().map_err(|e| LlmError::ParseError {
            message: e.to_string(),
        })?;

        let json: serde_json::Value =
            serde_json::from_str(&resp_str).map_err(|e| LlmError::ParseError {
                message: e.to_string(),
            })?;

        json["response"]
            .as_str()
            .map(|s| s.to_string())
            .ok_or_else(|| LlmError::ParseError {
                message: "missing 'response' field".into(),
            })
    }

    /// The configured model name.
    pub fn model(&self) -> &str {
        &self.config.model
    }
}

impl std::fmt::Debug for LlmClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmClient")
            .field("base_url", &self.config.base_url)
            .field("model", &self.config.model)
            .field("available", &self.available)
            .finish()
    }
}
