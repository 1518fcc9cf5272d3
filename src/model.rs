use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Human,
    Ai,
}

#[derive(Debug, Clone, Default)]
pub struct SourceTree {
    files: BTreeMap<PathBuf, String>,
}

impl SourceTree {
    pub fn new(files: BTreeMap<PathBuf, String>) -> Self {
        Self { files }
    }

    pub fn get(&self, path: &Path) -> Option<&str> {
        self.files.get(path).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Path, &str)> {
        self.files.iter().map(|(p, t)| (p.as_path(), t.as_str()))
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleTable {
    pub declaring_file: PathBuf,
    pub keys: Vec<String>,
    /// Name the literal is assigned to inside its own file, if any.
    pub local_binding: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportBinding {
    pub consuming_file: PathBuf,
    pub resolved_module_path: PathBuf,
    pub local_aliases: BTreeSet<String>,
}

/// Unused keys per style file, keyed by report path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UnusedReport(pub BTreeMap<String, Vec<String>>);

impl UnusedReport {
    pub fn unused_count(&self) -> usize {
        self.0.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct FolderReport {
    pub folder: PathBuf,
    pub report: UnusedReport,
    pub styles_checked: usize,
}

impl FolderReport {
    pub fn unused_count(&self) -> usize {
        self.report.unused_count()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemoveSummary {
    pub planned: usize,
    pub removed: usize,
    pub missed: usize,
    pub files_rewritten: usize,
}
