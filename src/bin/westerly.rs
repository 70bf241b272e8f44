//! Command-line interface for westerly
//!
//! Rewrites C/C++ files from west-const to east-const, in place by default.
//!
//! Usage:
//!   westerly `<files>...`                 - rewrite files in place
//!   westerly --stdout `<files>...`        - print the rewritten text instead
//!   westerly --check `<files>...`         - exit 1 if any file would change
//!   westerly --dump-tokens `<files>...`   - print the token stream as JSON
//!
//! Exit codes: 0 success, 1 `--check` found changes or `--strict` saw diagnostics,
//! 2 a file could not be read, decoded or written, or the configuration is invalid.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;
use westerly::config::{DiagnosticFormat, Loader, WesterlyConfig, PROJECT_FILE};
use westerly::diagnostics::{format_source_context, line_col};
use westerly::transforms::stages::Decoding;
use westerly::transforms::Runnable;
use westerly::{tokenize, transform_with, Diagnostic, RewriteOptions, Spacing, Transformed};

/// Turn west-const C/C++ declarations into east-const.
#[derive(Parser)]
#[command(name = "westerly", version, about, long_about = None)]
struct Cli {
    /// Source files to process.
    #[arg(required = true, value_name = "FILES")]
    files: Vec<PathBuf>,

    /// Print results instead of rewriting files in place.
    #[arg(long)]
    stdout: bool,

    /// Write nothing; exit with status 1 if any file would change.
    #[arg(long, conflicts_with = "stdout")]
    check: bool,

    /// Treat diagnostics as failures.
    #[arg(long)]
    strict: bool,

    /// Spacing after relocated qualifiers.
    #[arg(long, value_enum, value_name = "STYLE")]
    spacing: Option<Spacing>,

    /// Only relocate `const`; leave `volatile` where it is.
    #[arg(long)]
    no_volatile: bool,

    /// Treat NAME as a declaration specifier (repeatable).
    #[arg(long = "decl-macro", value_name = "NAME")]
    decl_macros: Vec<String>,

    /// Extra configuration file, layered over ./.westerly.toml.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Diagnostic output format.
    #[arg(long, value_enum, value_name = "FMT")]
    diagnostics: Option<DiagnosticFormat>,

    /// Print the token stream as JSON instead of rewriting.
    #[arg(long, conflicts_with_all = ["stdout", "check"])]
    dump_tokens: bool,

    /// Increase log verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    InPlace,
    Stdout,
    Check,
}

/// What happened to one file.
struct FileReport {
    path: PathBuf,
    source: String,
    transformed: Transformed,
    changed: bool,
}

#[derive(Debug, Default)]
struct Summary {
    changed: usize,
    diagnostics: usize,
    failures: usize,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .init();

    match run(cli).await {
        Ok(code) => code,
        Err(err) => {
            eprintln!("westerly: {err:#}");
            ExitCode::from(2)
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let config = load_config(&cli)?;
    debug!(?config, "resolved configuration");

    if cli.dump_tokens {
        return dump_tokens(&cli.files).await;
    }

    let mode = if cli.check {
        Mode::Check
    } else if cli.stdout {
        Mode::Stdout
    } else {
        Mode::InPlace
    };
    let options = Arc::new(config.rewrite.clone());

    let handles: Vec<_> = cli
        .files
        .iter()
        .cloned()
        .map(|path| tokio::spawn(process_file(path, Arc::clone(&options), mode)))
        .collect();

    let mut summary = Summary::default();
    for (path, handle) in cli.files.iter().zip(handles) {
        let outcome = handle
            .await
            .with_context(|| format!("worker for {} panicked", path.display()))
            .and_then(|result| result);
        match outcome {
            Ok(report) => {
                if report.changed {
                    summary.changed += 1;
                    if mode == Mode::Check {
                        eprintln!("would rewrite {}", report.path.display());
                    }
                }
                if mode == Mode::Stdout {
                    print!("{}", report.transformed.output);
                }
                summary.diagnostics += report.transformed.diagnostics.len();
                print_diagnostics(&report, config.output.diagnostics)?;
            }
            Err(err) => {
                summary.failures += 1;
                eprintln!("westerly: {err:#}");
            }
        }
    }

    info!(?summary, "done");
    Ok(exit_code(&summary, mode, config.output.strict))
}

fn exit_code(summary: &Summary, mode: Mode, strict: bool) -> ExitCode {
    if summary.failures > 0 {
        ExitCode::from(2)
    } else if (mode == Mode::Check && summary.changed > 0) || (strict && summary.diagnostics > 0)
    {
        ExitCode::from(1)
    } else {
        ExitCode::SUCCESS
    }
}

fn load_config(cli: &Cli) -> Result<WesterlyConfig> {
    let mut loader = Loader::new().with_optional_file(PROJECT_FILE);
    if let Some(path) = &cli.config {
        loader = loader.with_file(path);
    }
    loader = loader.with_environment();

    if let Some(spacing) = cli.spacing {
        loader = loader.set_override("rewrite.spacing", spacing.to_string())?;
    }
    if cli.no_volatile {
        loader = loader.set_override("rewrite.relocate_volatile", false)?;
    }
    if let Some(format) = cli.diagnostics {
        loader = loader.set_override("output.diagnostics", format.to_string())?;
    }
    if cli.strict {
        loader = loader.set_override("output.strict", true)?;
    }

    let mut config = loader.build().context("invalid configuration")?;
    config
        .rewrite
        .decl_macros
        .extend(cli.decl_macros.iter().cloned());
    Ok(config)
}

async fn process_file(
    path: PathBuf,
    options: Arc<RewriteOptions>,
    mode: Mode,
) -> Result<FileReport> {
    let bytes = tokio::fs::read(&path)
        .await
        .with_context(|| format!("cannot read {}", path.display()))?;

    let input = bytes.clone();
    let transformed = tokio::task::spawn_blocking(move || transform_with(&input, &options))
        .await
        .context("transform task panicked")?
        .with_context(|| format!("cannot rewrite {}", path.display()))?;

    // Decoding succeeded, so the bytes are valid UTF-8
    let source = String::from_utf8_lossy(&bytes).into_owned();
    let changed = transformed.output != source;
    debug!(path = %path.display(), changed, "processed file");

    if changed && mode == Mode::InPlace {
        tokio::fs::write(&path, transformed.output.as_bytes())
            .await
            .with_context(|| format!("cannot write {}", path.display()))?;
        info!(path = %path.display(), "rewrote file");
    }

    Ok(FileReport {
        path,
        source,
        transformed,
        changed,
    })
}

async fn dump_tokens(files: &[PathBuf]) -> Result<ExitCode> {
    for path in files {
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("cannot read {}", path.display()))?;
        let source = Decoding::new()
            .run(bytes)
            .with_context(|| format!("cannot decode {}", path.display()))?;
        let stream = tokenize(&source);
        println!("{}", serde_json::to_string_pretty(&stream)?);
    }
    Ok(ExitCode::SUCCESS)
}

fn print_diagnostics(report: &FileReport, format: DiagnosticFormat) -> Result<()> {
    for diagnostic in &report.transformed.diagnostics {
        match format {
            DiagnosticFormat::Text => {
                eprint!("{}", render_text(&report.path, &report.source, diagnostic));
            }
            DiagnosticFormat::Json => {
                let (line, column) = line_col(&report.source, diagnostic.offset);
                let value = serde_json::json!({
                    "path": report.path.display().to_string(),
                    "line": line + 1,
                    "column": column + 1,
                    "diagnostic": diagnostic,
                });
                eprintln!("{}", serde_json::to_string(&value)?);
            }
        }
    }
    Ok(())
}

fn render_text(path: &Path, source: &str, diagnostic: &Diagnostic) -> String {
    let (line, column) = line_col(source, diagnostic.offset);
    let code = diagnostic
        .code()
        .map(|c| format!("[{c}]"))
        .unwrap_or_default();
    format!(
        "{}:{}:{}: {}{}: {}\n{}",
        path.display(),
        line + 1,
        column + 1,
        diagnostic.severity,
        code,
        diagnostic.message,
        format_source_context(source, diagnostic.offset)
    )
}
