//! Rich diagnostic error types for the mailsift pipeline.
//!
//! Each subsystem defines its own error type with miette `#[diagnostic]`
//! derives, providing error codes, help text, and source chains so users
//! know exactly what went wrong and how to fix it. The model client's
//! errors live with the client in [`crate::client`].

use miette::Diagnostic;
use thiserror::Error;

use crate::client::LlmError;

/// Top-level error type for the pipeline.
///
/// Each variant wraps a subsystem-specific error, preserving the full
/// diagnostic chain (error codes, help text, sources) through to the user.
#[derive(Debug, Error, Diagnostic)]
pub enum MailsiftError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Llm(#[from] LlmError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Reply(#[from] ReplyError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Intake(#[from] IntakeError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Taxonomy(#[from] TaxonomyError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Export(#[from] ExportError),
}

// ---------------------------------------------------------------------------
// Reply errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum ReplyError {
    #[error("model reply contained no parseable JSON object")]
    #[diagnostic(
        code(mailsift::reply::malformed),
        help(
            "The model did not return the requested JSON. The raw reply text \
             is preserved on this error; inspect it, then retry or switch to \
             a model that follows format instructions."
        )
    )]
    MalformedModelOutput { raw: String },
}

// ---------------------------------------------------------------------------
// Intake errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum IntakeError {
    #[error("failed to read {}: {source}", path.display())]
    #[diagnostic(
        code(mailsift::intake::read),
        help("Check that the file exists and is readable.")
    )]
    Read {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not parse {} as a MIME message", path.display())]
    #[diagnostic(
        code(mailsift::intake::malformed_message),
        help(
            "The file does not parse as RFC 822 mail. If it is an Outlook \
             .msg export, convert it to .eml first."
        )
    )]
    MalformedMessage { path: std::path::PathBuf },

    #[error("PDF extraction failed for {}: {message}", path.display())]
    #[diagnostic(
        code(mailsift::intake::pdf),
        help(
            "The PDF may be encrypted or image-only. Extract the text another \
             way and submit it as .txt."
        )
    )]
    Pdf {
        path: std::path::PathBuf,
        message: String,
    },

    #[error("unsupported input format: {}", path.display())]
    #[diagnostic(
        code(mailsift::intake::unsupported),
        help("Supported input formats are .txt, .eml, and .pdf.")
    )]
    UnsupportedFormat { path: std::path::PathBuf },
}

// ---------------------------------------------------------------------------
// Taxonomy errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum TaxonomyError {
    #[error("failed to read taxonomy {}: {source}", path.display())]
    #[diagnostic(
        code(mailsift::taxonomy::read),
        help("Check the --taxonomy path.")
    )]
    Read {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse taxonomy {}: {source}", path.display())]
    #[diagnostic(
        code(mailsift::taxonomy::parse),
        help(
            "Expected TOML with repeated [[request]] tables (fields `name` \
             and `sub_types`) plus a top-level `key_attributes` list."
        )
    )]
    Parse {
        path: std::path::PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

// ---------------------------------------------------------------------------
// Export errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum ExportError {
    #[error("CSV export failed: {source}")]
    #[diagnostic(
        code(mailsift::export::csv),
        help("Check that the destination is writable.")
    )]
    Csv {
        #[source]
        source: csv::Error,
    },

    #[error("I/O error during export: {source}")]
    #[diagnostic(
        code(mailsift::export::io),
        help("Check that the destination exists and has space.")
    )]
    Io {
        #[source]
        source: std::io::Error,
    },

    #[error("JSON export failed: {source}")]
    #[diagnostic(code(mailsift::export::json))]
    Json {
        #[source]
        source: serde_json::Error,
    },
}

/// Convenience alias for functions returning pipeline results.
pub type MailsiftResult<T> = std::result::Result<T, MailsiftError>;

pub type ReplyResult<T> = std::result::Result<T, ReplyError>;
pub type IntakeResult<T> = std::result::Result<T, IntakeError>;
pub type TaxonomyResult<T> = std::result::Result<T, TaxonomyError>;
pub type ExportResult<T> = std::result::Result<T, ExportError>;
