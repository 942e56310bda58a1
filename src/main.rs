//! mailsift CLI: email triage pipeline.

use std::io::Read;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand, ValueEnum};
use miette::{IntoDiagnostic, Result};
use tracing::{error, warn};

use mailsift::canonical::CanonicalOptions;
use mailsift::client::{LlmClient, LlmConfig};
use mailsift::error::{ExportError, MailsiftError, MailsiftResult, ReplyError};
use mailsift::export::{self, RecordExport};
use mailsift::intake;
use mailsift::pipeline::{Analyzer, PipelineConfig};
use mailsift::score::ConfidenceProfile;
use mailsift::srnum;
use mailsift::taxonomy::Taxonomy;

#[derive(Parser)]
#[command(name = "mailsift", version, about = "Email triage pipeline")]
struct Cli {
    #[command(flatten)]
    globals: Globals,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct Globals {
    /// Base URL of the Ollama API.
    #[arg(long, global = true, default_value = "http://localhost:11434")]
    base_url: String,

    /// Model to classify with.
    #[arg(long, global = true, default_value = "llama3.2")]
    model: String,

    /// Model request timeout in seconds.
    #[arg(long, global = true, default_value = "120")]
    timeout_secs: u64,

    /// TOML file constraining categories and attribute labels.
    #[arg(long, global = true)]
    taxonomy: Option<PathBuf>,

    /// Confidence scoring profile.
    #[arg(long, global = true, value_enum, default_value = "strict")]
    profile: ProfileArg,

    /// Redact account numbers before classification.
    #[arg(long, global = true)]
    redact_accounts: bool,

    /// Redact email addresses before classification.
    #[arg(long, global = true)]
    redact_emails: bool,

    /// Rewrite day-month-name-year dates as YYYY-MM-DD.
    #[arg(long, global = true)]
    normalize_dates: bool,

    /// Regroup space-separated currency amounts with commas.
    #[arg(long, global = true)]
    group_currency: bool,

    /// Do not ask the model for its own confidence estimate.
    #[arg(long, global = true)]
    no_model_confidence: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ProfileArg {
    /// Harsher fallbacks; scores can drop to 0.1.
    Strict,
    /// The forgiving constants; no score below 0.5.
    Lenient,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full pipeline on one email (file or stdin).
    Analyze {
        /// Input file (.txt, .eml, or .pdf); stdin when omitted.
        #[arg(long)]
        file: Option<PathBuf>,

        /// Write the scored record as pretty JSON to this path.
        #[arg(long)]
        json: Option<PathBuf>,

        /// Write a one-row CSV report to this path.
        #[arg(long)]
        csv: Option<PathBuf>,
    },

    /// Analyze every supported file in a directory into one CSV report.
    Batch {
        /// Directory holding .txt, .eml, and .pdf files.
        #[arg(long)]
        dir: PathBuf,

        /// CSV report destination.
        #[arg(long)]
        csv: PathBuf,

        /// Also write one JSON record per input file into this directory.
        #[arg(long)]
        json_dir: Option<PathBuf>,
    },

    /// Build and print the prompt without calling the model.
    Prompt {
        /// Input file (.txt, .eml, or .pdf); stdin when omitted.
        #[arg(long)]
        file: Option<PathBuf>,
    },

    /// Service request number utilities.
    Sr {
        #[command(subcommand)]
        action: SrAction,
    },
}

#[derive(Subcommand)]
enum SrAction {
    /// Mint a fresh SR number.
    Mint,
    /// Find the first SR number in an input (file or stdin).
    Find {
        /// Input file (.txt, .eml, or .pdf); stdin when omitted.
        #[arg(long)]
        file: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(3)
                .build(),
        )
    }))
    .ok(); // Ignore error if hook already set (e.g., in tests)

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let Cli { globals, command } = Cli::parse();

    match command {
        Commands::Analyze { file, json, csv } => {
            let analyzer = Analyzer::new(pipeline_config(&globals)?, probed_client(&globals));
            let blob = read_input(file.as_deref())?;

            let analysis = analyzer
                .analyze(&blob)
                .map_err(|err| {
                    // The raw reply is the only evidence when parsing fails.
                    if let MailsiftError::Reply(ReplyError::MalformedModelOutput { raw }) = &err {
                        eprintln!("raw model reply:\n{raw}");
                    }
                    err
                })
                .into_diagnostic()?;

            println!("SR Number:        {}", analysis.sr);
            println!("Thread:           {}", analysis.thread);
            println!("Request Type:     {}", analysis.scored.record.request_type);
            println!("Sub Request Type: {}", analysis.scored.record.sub_request_type);
            println!(
                "Key Attributes:   {}",
                analysis.scored.record.key_attributes_joined()
            );
            println!("Main Intent:      {}", analysis.scored.record.main_intent);
            println!("Confidence:       {:.2}", analysis.breakdown.score);
            println!("Explanation:      {}", analysis.breakdown.reasoning);

            if let Some(path) = json {
                let body = export::to_json_pretty(&analysis.scored).into_diagnostic()?;
                std::fs::write(&path, body).into_diagnostic()?;
                println!("Wrote JSON to {}", path.display());
            }
            if let Some(path) = csv {
                let row = RecordExport::from_scored(&analysis.scored, &analysis.breakdown);
                let file = std::fs::File::create(&path).into_diagnostic()?;
                export::write_csv(file, &[row]).into_diagnostic()?;
                println!("Wrote CSV to {}", path.display());
            }
        }

        Commands::Batch { dir, csv, json_dir } => {
            let analyzer = Analyzer::new(pipeline_config(&globals)?, probed_client(&globals));

            let mut paths: Vec<PathBuf> = std::fs::read_dir(&dir)
                .into_diagnostic()?
                .filter_map(|entry| entry.ok().map(|e| e.path()))
                .filter(|p| {
                    matches!(
                        p.extension()
                            .and_then(|e| e.to_str())
                            .map(|e| e.to_ascii_lowercase())
                            .as_deref(),
                        Some("txt" | "eml" | "pdf")
                    )
                })
                .collect();
            paths.sort();
            if paths.is_empty() {
                miette::bail!("no .txt, .eml, or .pdf files in {}", dir.display());
            }
            if let Some(dir) = &json_dir {
                std::fs::create_dir_all(dir).into_diagnostic()?;
            }

            let mut rows = Vec::new();
            let mut failed = 0usize;
            for path in &paths {
                match process_file(&analyzer, path, json_dir.as_deref()) {
                    Ok(row) => rows.push(row),
                    Err(err) => {
                        failed += 1;
                        error!(file = %path.display(), %err, "analysis failed");
                    }
                }
            }

            let file = std::fs::File::create(&csv).into_diagnostic()?;
            export::write_csv(file, &rows).into_diagnostic()?;
            println!(
                "Analyzed {} of {} file(s); wrote {}",
                rows.len(),
                paths.len(),
                csv.display()
            );
            if failed > 0 {
                println!("{failed} file(s) failed; see the log above.");
            }
        }

        Commands::Prompt { file } => {
            // No probe: prompt building never talks to the server.
            let client = LlmClient::new(client_config(&globals));
            let analyzer = Analyzer::new(pipeline_config(&globals)?, client);
            let blob = read_input(file.as_deref())?;
            println!("{}", analyzer.preview(&blob).prompt);
        }

        Commands::Sr { action } => match action {
            SrAction::Mint => println!("{}", srnum::mint()),
            SrAction::Find { file } => {
                let blob = read_input(file.as_deref())?;
                match srnum::find_existing(&blob) {
                    Some(id) => println!("{id}"),
                    None => miette::bail!("no service request number found"),
                }
            }
        },
    }

    Ok(())
}

fn client_config(globals: &Globals) -> LlmConfig {
    LlmConfig {
        base_url: globals.base_url.clone(),
        model: globals.model.clone(),
        timeout_secs: globals.timeout_secs,
    }
}

/// Build and probe the client; degraded servers are warned about here and
/// fail fast later.
fn probed_client(globals: &Globals) -> LlmClient {
    let mut client = LlmClient::new(client_config(globals));
    if !client.probe() {
        warn!(url = %globals.base_url, "Ollama not reachable; analysis will fail fast");
    } else if !client.has_model() {
        warn!(
            model = %globals.model,
            "model not present on the server; Ollama may pull it on first use"
        );
    }
    client
}

fn pipeline_config(globals: &Globals) -> Result<PipelineConfig> {
    let taxonomy = match &globals.taxonomy {
        Some(path) => Some(Taxonomy::load(path).into_diagnostic()?),
        None => None,
    };
    Ok(PipelineConfig {
        canonical: CanonicalOptions {
            normalize_dates: globals.normalize_dates,
            group_currency: globals.group_currency,
            redact_accounts: globals.redact_accounts,
            redact_emails: globals.redact_emails,
        },
        profile: match globals.profile {
            ProfileArg::Strict => ConfidenceProfile::strict(),
            ProfileArg::Lenient => ConfidenceProfile::lenient(),
        },
        taxonomy,
        ask_model_confidence: !globals.no_model_confidence,
    })
}

/// File via intake when given, raw stdin otherwise.
fn read_input(file: Option<&Path>) -> Result<String> {
    match file {
        Some(path) => intake::extract_text(path).into_diagnostic(),
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .into_diagnostic()?;
            Ok(buf)
        }
    }
}

/// One batch entry: intake, analyze, optional JSON sidecar, CSV row.
fn process_file(
    analyzer: &Analyzer,
    path: &Path,
    json_dir: Option<&Path>,
) -> MailsiftResult<RecordExport> {
    let blob = intake::extract_text(path)?;
    let analysis = analyzer.analyze(&blob)?;

    if let Some(dir) = json_dir {
        let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("record");
        let out = dir.join(format!("{stem}.json"));
        std::fs::write(&out, export::to_json_pretty(&analysis.scored)?)
            .map_err(|source| ExportError::Io { source })?;
    }

    Ok(RecordExport::from_scored(
        &analysis.scored,
        &analysis.breakdown,
    ))
}
