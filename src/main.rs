//! codedoc — extract `@code` annotations from source files in any language.
//!
//! `codedoc src/ lib/*.py -f text --strict`

mod render;

use anyhow::{bail, Context, Result};
use clap::Parser;
use codedoc::{source, Config, Engine, Severity, SourceFile};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "codedoc",
    about = "Extract @code documentation annotations into a cross-referenced model"
)]
struct Cli {
    /// Input files, directories or glob patterns
    #[arg(required = true)]
    files: Vec<String>,

    /// Treat every input as this language instead of guessing from the extension
    #[arg(short = 'l', long)]
    lang: Option<String>,

    /// Output format: json (default), text, annotations
    #[arg(short = 'f', long, default_value = "json")]
    format: String,

    /// Worker threads for extraction
    #[arg(short = 'j', long)]
    jobs: Option<usize>,

    /// JSON config file
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,

    /// Write output here instead of stdout
    #[arg(short = 'o', long)]
    output: Option<PathBuf>,

    /// Exit non-zero when any error is reported
    #[arg(long)]
    strict: bool,

    /// Exit non-zero when any error or warning is reported
    #[arg(long)]
    deny_warnings: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("CODEDOC_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = match cli.config {
        Some(ref path) => Config::load(path)?,
        None => Config::default(),
    };
    if cli.jobs.is_some() {
        config.jobs = cli.jobs;
    }
    let engine = Engine::new(config).context("invalid configuration")?;
    let renderer = render::create_renderer(&cli.format)?;

    let paths = expand_globs(&cli.files)?;
    if paths.is_empty() {
        bail!("no input files found");
    }
    let files = read_sources(&paths, cli.lang.as_deref());
    info!("extracting {} files", files.len());

    let extraction = engine.extract(&files);
    let output = renderer.render(&extraction)?;
    match cli.output {
        Some(ref path) => fs::write(path, &output)
            .with_context(|| format!("failed to write {}", path.display()))?,
        None => print!("{}", output),
    }

    let errors = extraction.count(Severity::Error);
    let warnings = extraction.count(Severity::Warning);
    if cli.deny_warnings && errors + warnings > 0 {
        bail!("{} errors, {} warnings", errors, warnings);
    }
    if cli.strict && errors > 0 {
        bail!("{} errors", errors);
    }
    Ok(())
}

/// Read every path; unreadable files are reported and left out.
fn read_sources(paths: &[PathBuf], lang: Option<&str>) -> Vec<SourceFile> {
    let mut files = Vec::new();
    for path in paths {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) => {
                warn!("skipping {}: {}", path.display(), e);
                continue;
            }
        };
        files.push(match lang {
            Some(lang) => SourceFile::new(path.clone(), lang, text),
            None => SourceFile::detect(path.clone(), text),
        });
    }
    files
}

/// Expand glob patterns into a list of real file paths.
/// Bare directories are scanned (non-recursively) for known source extensions.
fn expand_globs(patterns: &[String]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for pattern in patterns {
        let path = Path::new(pattern);
        if path.is_file() {
            files.push(path.to_path_buf());
            continue;
        }
        if path.is_dir() {
            let entries = fs::read_dir(path)
                .with_context(|| format!("failed to read directory: {}", path.display()))?;
            for entry in entries.flatten() {
                let p = entry.path();
                if p.is_file() && source::is_supported(&p) {
                    files.push(p);
                }
            }
            continue;
        }
        let matches: Vec<_> = glob::glob(pattern)
            .with_context(|| format!("invalid glob pattern: {}", pattern))?
            .filter_map(|r| r.ok())
            .filter(|p| p.is_file())
            .collect();
        if matches.is_empty() {
            warn!("no files matched: {}", pattern);
        }
        files.extend(matches);
    }
    // Sort for deterministic output
    files.sort();
    files.dedup();
    Ok(files)
}
