pub mod analyzer;
pub mod color;
pub mod config;
pub mod error;
pub mod extract;
pub mod help_ai;
pub mod imports;
pub mod loader;
pub mod model;
pub mod output;
pub mod paths;
pub mod remove;
pub mod report;
pub mod usage;

use std::env;
use std::io::Write;
use std::path::PathBuf;

use analyzer::{Analyzer, AnalyzerOptions};
use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use color::ColorPolicy;
use config::EffectiveConfig;
use model::{OutputFormat, UnusedReport};
use remove::Remover;

#[derive(Debug, clap::Parser)]
#[command(
    name = "unused-styles",
    version,
    about = "Find and remove unused StyleSheet keys in JS/TS projects"
)]
pub struct Cli {
    /// Folders whose style tables are checked.
    pub folders: Vec<PathBuf>,

    /// Delete the unused keys instead of writing the report.
    #[arg(long, default_value_t = false)]
    pub remove: bool,

    /// Delete the keys listed in a previously written report.
    #[arg(long, value_name = "PATH", conflicts_with_all = ["folders", "remove"])]
    pub remove_json: Option<PathBuf>,

    /// Project root; imports and report paths are relative to it.
    #[arg(long)]
    pub root: Option<PathBuf>,

    /// Report file written when not removing.
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Path to config file.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Output format.
    #[arg(long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Color policy.
    #[arg(long, value_enum)]
    pub color: Option<ColorPolicy>,

    /// Debug logging on stderr.
    #[arg(short, long, default_value_t = false, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only log errors.
    #[arg(short, long, default_value_t = false)]
    pub quiet: bool,
}

pub fn run() -> Result<()> {
    let args: Vec<String> = env::args().collect();
    if let Some(json) = maybe_emit_ai_help(&args)? {
        println!("{json}");
        return Ok(());
    }

    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    let cwd = env::current_dir().context("failed to read current directory")?;
    let cfg = EffectiveConfig::load(&cli, &cwd)?;
    let mut out = std::io::stdout().lock();

    if let Some(path) = &cli.remove_json {
        let path = paths::absolutize(&cwd, path);
        let reports = report::load_reports(&path)?;
        return run_remove(&mut out, &reports, &cfg);
    }

    if cli.folders.is_empty() {
        Cli::command().print_help().context("failed to print help")?;
        println!();
        return Ok(());
    }

    let analyzer = Analyzer::new(AnalyzerOptions::from_config(&cfg));
    let snap = analyzer.snapshot()?;
    let mut total = 0usize;
    let mut reports: Vec<UnusedReport> = Vec::with_capacity(cli.folders.len());
    for folder in &cli.folders {
        let mut fr = analyzer.folder_report(&snap, &paths::absolutize(&cwd, folder))?;
        fr.folder = folder.clone();
        output::print_folder(&mut out, &fr, &cfg)?;
        total += fr.unused_count();
        reports.push(fr.report);
    }

    if cli.remove {
        run_remove(&mut out, &reports, &cfg)?;
    } else {
        report::save_reports(&cfg.output, &reports)?;
        output::print_saved(&mut out, &cfg.output, &cfg)?;
    }
    output::print_total(&mut out, total, &cfg)
}

fn run_remove(out: &mut impl Write, reports: &[UnusedReport], cfg: &EffectiveConfig) -> Result<()> {
    let summary = Remover::new(&cfg.root, &cfg.open_marker).apply(reports)?;
    output::print_remove_summary(out, &summary, cfg)
}

fn init_logging(verbose: bool, quiet: bool) {
    use tracing_subscriber::{EnvFilter, fmt};

    let level = if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

fn maybe_emit_ai_help(args: &[String]) -> Result<Option<String>> {
    let has_help = args.iter().any(|a| a == "--help" || a == "-h");
    let format_ai = args
        .windows(2)
        .any(|w| w[0] == "--format" && w[1] == "ai")
        || args.iter().any(|a| a == "--format=ai");

    if !has_help || !format_ai {
        return Ok(None);
    }
    Ok(Some(serde_json::to_string(&help_ai::schema())?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn help_ai_detected_with_format_flag() {
        let args: Vec<String> = ["unused-styles", "--help", "--format", "ai"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let out = maybe_emit_ai_help(&args).expect("ok").expect("some");
        assert!(out.contains("\"n\":\"unused-styles\""));
    }

    #[test]
    fn plain_help_is_left_to_clap() {
        let args: Vec<String> = ["unused-styles", "--help"].iter().map(|s| s.to_string()).collect();
        assert!(maybe_emit_ai_help(&args).expect("ok").is_none());
    }

    #[test]
    fn remove_json_conflicts_with_folders() {
        assert!(Cli::try_parse_from(["unused-styles", "app", "--remove-json", "r.json"]).is_err());
        let cli = Cli::try_parse_from(["unused-styles", "--remove-json", "r.json"]).expect("parse");
        assert_eq!(cli.remove_json, Some(PathBuf::from("r.json")));
    }
}
