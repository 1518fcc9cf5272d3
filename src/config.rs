use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::extract::DEFAULT_OPEN_MARKER;
use crate::imports::DEFAULT_ROOT_ALIAS;
use crate::loader::default_ignore;
use crate::paths::absolutize;
use crate::report::DEFAULT_REPORT_FILE;
use crate::{Cli, color::ColorPolicy, model::OutputFormat};

pub const DEFAULT_CONFIG_FILE: &str = "unused-styles.toml";

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    root: Option<PathBuf>,
    open_marker: Option<String>,
    root_alias: Option<String>,
    ignore: Option<Vec<String>>,
    max_depth: Option<usize>,
    output: Option<PathBuf>,
    local_usage: Option<bool>,
    format: Option<String>,
    color: Option<String>,
}

#[derive(Debug, Clone)]
pub struct EffectiveConfig {
    pub root: PathBuf,
    pub open_marker: String,
    pub root_alias: String,
    pub ignore: Vec<String>,
    pub max_depth: usize,
    pub output: PathBuf,
    pub local_usage: bool,
    pub format: OutputFormat,
    pub color: ColorPolicy,
}

impl EffectiveConfig {
    /// CLI flags win over the config file, which wins over defaults.
    /// Relative paths are taken from `cwd`.
    pub fn load(cli: &Cli, cwd: &Path) -> Result<Self> {
        let path = cli.config.clone().or_else(|| {
            let p = cwd.join(DEFAULT_CONFIG_FILE);
            if p.exists() { Some(p) } else { None }
        });

        let fcfg = if let Some(path) = path {
            let raw = fs::read_to_string(&path)
                .with_context(|| format!("failed reading config {}", path.display()))?;
            toml::from_str::<FileConfig>(&raw)
                .with_context(|| format!("failed parsing config {}", path.display()))?
        } else {
            FileConfig::default()
        };

        let open_marker = fcfg.open_marker.unwrap_or_else(|| DEFAULT_OPEN_MARKER.to_string());
        if !open_marker.ends_with('{') {
            anyhow::bail!("open_marker must end with '{{', got {open_marker:?}");
        }

        let mut ignore = fcfg.ignore.unwrap_or_else(default_ignore);
        ignore.sort();
        ignore.dedup();

        let root = cli.root.clone().or(fcfg.root).unwrap_or_else(|| PathBuf::from("."));
        let output = cli
            .output
            .clone()
            .or(fcfg.output)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_REPORT_FILE));

        let format = cli
            .format
            .or_else(|| parse_format(fcfg.format.as_deref()))
            .unwrap_or(OutputFormat::Human);

        let color = cli
            .color
            .or_else(|| fcfg.color.as_deref().and_then(ColorPolicy::parse))
            .unwrap_or(ColorPolicy::Auto);

        Ok(Self {
            root: absolutize(cwd, &root),
            open_marker,
            root_alias: fcfg.root_alias.unwrap_or_else(|| DEFAULT_ROOT_ALIAS.to_string()),
            ignore,
            max_depth: fcfg.max_depth.unwrap_or(64),
            output: absolutize(cwd, &output),
            local_usage: fcfg.local_usage.unwrap_or(true),
            format,
            color,
        })
    }
}

fn parse_format(v: Option<&str>) -> Option<OutputFormat> {
    match v {
        Some("ai") => Some(OutputFormat::Ai),
        Some("human") => Some(OutputFormat::Human),
        _ => None,
    }
}
