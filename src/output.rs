use std::io::Write;
use std::path::Path;

use anyhow::Result;
use owo_colors::OwoColorize;

use crate::config::EffectiveConfig;
use crate::model::{FolderReport, OutputFormat, RemoveSummary};

pub fn print_folder(out: &mut impl Write, folder: &FolderReport, cfg: &EffectiveConfig) -> Result<()> {
    let name = folder.folder.display().to_string();
    match cfg.format {
        OutputFormat::Ai => {
            let line = serde_json::json!({
                "f": name,
                "n": folder.unused_count(),
                "s": folder.styles_checked,
            });
            writeln!(out, "{}", serde_json::to_string(&line)?)?;
        }
        OutputFormat::Human if cfg.color.enabled() => {
            writeln!(out, "{} {}", name.blue(), folder.unused_count().yellow())?;
        }
        OutputFormat::Human => writeln!(out, "{} {}", name, folder.unused_count())?,
    }
    Ok(())
}

pub fn print_total(out: &mut impl Write, total: usize, cfg: &EffectiveConfig) -> Result<()> {
    match cfg.format {
        OutputFormat::Ai => {
            let line = serde_json::json!({ "t": total });
            writeln!(out, "{}", serde_json::to_string(&line)?)?;
        }
        OutputFormat::Human if cfg.color.enabled() => {
            writeln!(out, "{} {}", ">Total Unused styles:".bold().cyan(), total)?;
        }
        OutputFormat::Human => writeln!(out, ">Total Unused styles: {total}")?,
    }
    Ok(())
}

pub fn print_saved(out: &mut impl Write, path: &Path, cfg: &EffectiveConfig) -> Result<()> {
    match cfg.format {
        OutputFormat::Ai => {
            let line = serde_json::json!({ "w": path });
            writeln!(out, "{}", serde_json::to_string(&line)?)?;
        }
        OutputFormat::Human => writeln!(out, "Report written to {}", path.display())?,
    }
    Ok(())
}

pub fn print_remove_summary(out: &mut impl Write, summary: &RemoveSummary, cfg: &EffectiveConfig) -> Result<()> {
    if matches!(cfg.format, OutputFormat::Ai) {
        let line = serde_json::json!({
            "planned": summary.planned,
            "removed": summary.removed,
            "missed": summary.missed,
            "files": summary.files_rewritten,
        });
        writeln!(out, "{}", serde_json::to_string(&line)?)?;
        return Ok(());
    }

    if cfg.color.enabled() {
        writeln!(
            out,
            "{} planned={} removed={} missed={} files={}",
            "Remove summary".bold().cyan(),
            summary.planned,
            summary.removed,
            summary.missed,
            summary.files_rewritten
        )?;
    } else {
        writeln!(
            out,
            "Remove summary planned={} removed={} missed={} files={}",
            summary.planned, summary.removed, summary.missed, summary.files_rewritten
        )?;
    }
    Ok(())
}
