// Declare modules
pub mod cli;
pub mod clipboard;
pub mod config;
pub mod filter;
pub mod formatter;
pub mod models;
pub mod scanner;

use anyhow::{Context, Result};
use clap::Parser;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use self::cli::Cli;
use self::clipboard::{Clipboard, SystemClipboard};
use self::config::resolve_config;
use self::filter::filter_candidates;
use self::formatter::write_output_file;
use self::models::EffectiveConfig;
use self::scanner::Scanner;

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .try_init();
}

/// Absolute location of `output` even when it does not exist yet, so the
/// walker can recognise it.
fn absolute_output(output: &Path) -> Option<PathBuf> {
    let name = output.file_name()?;
    let parent = match output.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    parent.canonicalize().ok().map(|p| p.join(name))
}

/// Discovery, filtering and writing for one root. Returns the number of
/// files written to `output`.
pub fn run_pipeline(
    root: &Path,
    config: &EffectiveConfig,
    output: &Path,
    respect_gitignore: bool,
) -> Result<usize> {
    let mut scanner = Scanner::new(root, config)?.respect_gitignore(respect_gitignore);
    if let Some(skip) = absolute_output(output) {
        scanner = scanner.skip_path(skip);
    }

    let candidates = scanner.scan();
    let selected = filter_candidates(candidates, config);
    if selected.is_empty() {
        log::warn!("⚠️ No files matched the configured rules.");
    }

    Ok(write_output_file(&selected, output))
}

/// Reads the finished output back and hands it to `clipboard`. Failure is
/// logged and reported as `false`.
pub fn copy_output(output: &Path, clipboard: &dyn Clipboard) -> bool {
    let text = match fs::read_to_string(output) {
        Ok(text) => text,
        Err(err) => {
            log::error!("Error copying to clipboard: {}", err);
            return false;
        }
    };
    match clipboard.copy_to_clipboard(&text) {
        Ok(()) => {
            log::info!("Code copied to clipboard!");
            true
        }
        Err(err) => {
            log::error!("Error copying to clipboard: {}", err);
            false
        }
    }
}

/// Initializes components and orchestrates data flow.
pub fn run() -> Result<()> {
    let args = Cli::parse();
    init_logging(args.verbose);

    let root = match args.dir {
        Some(dir) => dir,
        None => env::current_dir().context("Failed to get current directory")?,
    };

    log::info!("Starting code concatenation...");
    let config = resolve_config(&root, args.config.as_deref())?;
    log::debug!("Effective configuration: {:?}", config);

    let processed = run_pipeline(&root, &config, &args.output, args.respect_gitignore)?;
    log::info!("Concatenation complete! Processed {} code files.", processed);
    log::info!("Output written to {}", args.output.display());

    if !args.no_copy {
        copy_output(&args.output, &SystemClipboard);
    }

    Ok(())
}
