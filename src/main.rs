//! super-hooks CLI

use anyhow::{Context, Result};
use clap::Parser;
use colored::*;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use super_hooks::config::{self, CliOverrides};
use super_hooks::logging::{RunLogEntry, RunLogger};
use super_hooks::report::{self, OutputFormat, Summary};
use super_hooks::{collect_python_files, process_files_parallel, rules, Mode, Settings};

#[derive(Parser, Debug)]
#[command(name = "super-hooks")]
#[command(
    version,
    about = "Checks that unittest setUp/tearDown overrides end with their super() call"
)]
struct Args {
    /// Files or directories to check
    #[arg(default_value = ".")]
    paths: Vec<String>,

    /// Rewrite files to fix missing or misplaced super() calls
    #[arg(long)]
    fix: bool,

    /// Test base classes to recognize, replacing the default TestCase
    #[arg(long = "base-class", value_delimiter = ',')]
    base_classes: Vec<String>,

    /// Additional test base classes to recognize
    #[arg(long = "extend-base-class", value_delimiter = ',')]
    extend_base_classes: Vec<String>,

    /// Enable specific rules (comma-separated, or "ALL")
    #[arg(long, value_delimiter = ',')]
    enable: Vec<String>,

    /// Disable specific rules (comma-separated)
    #[arg(long, value_delimiter = ',')]
    disable: Vec<String>,

    /// Directory or file names to skip (comma-separated)
    #[arg(long, value_delimiter = ',')]
    exclude: Vec<String>,

    /// Output format: text, json
    #[arg(long, default_value = "text")]
    output_format: OutputFormat,

    /// Read configuration from this pyproject.toml instead of searching for one
    #[arg(long, conflicts_with = "no_config")]
    config: Option<PathBuf>,

    /// Ignore pyproject.toml configuration
    #[arg(long)]
    no_config: bool,

    /// Append a JSON Lines record of this run to the given file
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Show verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let mut logger = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    logger.format_timestamp(None);
    if args.verbose {
        logger.filter_level(log::LevelFilter::Debug);
    }
    logger.try_init().ok();

    match run(args) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{} {:#}", "error:".red().bold(), err);
            ExitCode::from(1)
        }
    }
}

fn run(args: Args) -> Result<ExitCode> {
    let config = if args.no_config {
        None
    } else {
        config::load_config(args.config.as_deref()).context("failed to load configuration")?
    };

    let resolved = config::merge_config(
        config.as_ref(),
        &CliOverrides {
            base_classes: args.base_classes,
            extend_base_classes: args.extend_base_classes,
            enable: args.enable,
            disable: args.disable,
            exclude: args.exclude,
        },
    );

    log::debug!("enabled rules: {:?}", resolved.enable);
    log::debug!("base classes: {:?}", resolved.base_classes.names());
    log::debug!("exclude patterns: {:?}", resolved.exclude);

    let settings = Settings {
        base_classes: resolved.base_classes,
        rules: rules::get_enabled_rules(resolved.enable.as_deref()),
    };
    for rule in &settings.rules {
        log::debug!("active rule {}: {}", rule.rule_id(), rule.description());
    }

    let mut run_logger = match &args.log_file {
        Some(path) => Some(
            RunLogger::new(path)
                .with_context(|| format!("cannot open log file {}", path.display()))?,
        ),
        None => None,
    };

    let files = collect_python_files(&args.paths, &resolved.exclude);
    log::debug!("found {} Python file(s)", files.len());

    let mode = if args.fix { Mode::Fix } else { Mode::Check };
    let reports = process_files_parallel(&files, &settings, mode);

    report::write_diagnostics(&mut io::stdout().lock(), &reports, args.output_format)
        .context("failed to write diagnostics")?;

    let summary = Summary::from_reports(&reports);
    if args.output_format == OutputFormat::Text {
        report::print_summary(&summary, args.fix, args.verbose);
    }

    if let Some(logger) = run_logger.as_mut() {
        // A failing run log never changes the verdict
        if let Err(err) = logger.log(&RunLogEntry::from_reports(&reports, mode)) {
            log::warn!("failed to write {}: {}", logger.log_path().display(), err);
        }
    }

    Ok(if summary.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    })
}
