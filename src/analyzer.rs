use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::EffectiveConfig;
use crate::error::{ScanError, ScanResult};
use crate::extract::{self, DEFAULT_OPEN_MARKER};
use crate::imports::{DEFAULT_ROOT_ALIAS, ImportIndex, ResolveOptions};
use crate::loader::{self, LoaderOptions};
use crate::model::{FolderReport, SourceTree, StyleTable, UnusedReport};
use crate::paths::{absolutize, report_path};
use crate::usage::used_keys;

#[derive(Debug, Clone)]
pub struct AnalyzerOptions {
    pub root: PathBuf,
    pub open_marker: String,
    pub root_alias: String,
    /// Count `binding.key` usages inside the file that declares the literal.
    pub local_usage: bool,
    pub loader: LoaderOptions,
}

impl AnalyzerOptions {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            open_marker: DEFAULT_OPEN_MARKER.to_string(),
            root_alias: DEFAULT_ROOT_ALIAS.to_string(),
            local_usage: true,
            loader: LoaderOptions::default(),
        }
    }

    pub fn from_config(cfg: &EffectiveConfig) -> Self {
        Self {
            root: cfg.root.clone(),
            open_marker: cfg.open_marker.clone(),
            root_alias: cfg.root_alias.clone(),
            local_usage: cfg.local_usage,
            loader: LoaderOptions {
                ignore: cfg.ignore.clone(),
                max_depth: cfg.max_depth,
            },
        }
    }

    fn resolve(&self) -> ResolveOptions<'_> {
        ResolveOptions {
            root: &self.root,
            root_alias: &self.root_alias,
        }
    }
}

#[derive(Debug, Clone)]
struct StyleEntry {
    table: StyleTable,
    residual: String,
}

#[derive(Debug, Clone)]
pub struct Snapshot {
    tree: SourceTree,
    styles: BTreeMap<PathBuf, StyleEntry>,
    index: ImportIndex,
}

#[derive(Debug, Clone)]
pub struct Analyzer {
    opts: AnalyzerOptions,
}

impl Analyzer {
    pub fn new(opts: AnalyzerOptions) -> Self {
        Self { opts }
    }

    pub fn scan(&self, folders: &[PathBuf]) -> ScanResult<Vec<FolderReport>> {
        let snap = self.snapshot()?;
        folders.iter().map(|f| self.folder_report(&snap, f)).collect()
    }

    pub fn snapshot(&self) -> ScanResult<Snapshot> {
        let tree = loader::load_tree(&self.opts.root, &self.opts.loader)?;
        let styles = self.extract_styles(&tree);
        let paths: BTreeSet<PathBuf> = styles.keys().cloned().collect();
        let index = ImportIndex::build(&tree, &paths, self.opts.resolve());
        debug!("{} style tables among {} files", styles.len(), tree.len());
        Ok(Snapshot { tree, styles, index })
    }

    /// Unused keys of every style table under `folder` (relative folders are
    /// taken from the root); usages are looked up across the whole snapshot.
    pub fn folder_report(&self, snap: &Snapshot, folder: &Path) -> ScanResult<FolderReport> {
        let dir = absolutize(&self.opts.root, folder);
        fs::metadata(&dir).map_err(|source| ScanError::Read {
            path: dir.clone(),
            source,
        })?;

        let mut report = BTreeMap::new();
        let mut styles_checked = 0usize;

        if dir.starts_with(&self.opts.root) {
            for (path, entry) in snap.styles.range(dir.clone()..) {
                if !path.starts_with(&dir) {
                    break;
                }
                styles_checked += 1;
                self.record(&mut report, entry, &snap.tree, &snap.index);
            }
        } else {
            let outside = loader::load_tree(&dir, &self.opts.loader)?;
            let styles = self.extract_styles(&outside);
            let paths: BTreeSet<PathBuf> = styles.keys().cloned().collect();
            let index = ImportIndex::build(&snap.tree, &paths, self.opts.resolve());
            for entry in styles.values() {
                styles_checked += 1;
                self.record(&mut report, entry, &snap.tree, &index);
            }
        }

        Ok(FolderReport {
            folder: folder.to_path_buf(),
            report: UnusedReport(report),
            styles_checked,
        })
    }

    fn extract_styles(&self, tree: &SourceTree) -> BTreeMap<PathBuf, StyleEntry> {
        tree.iter()
            .filter_map(|(path, text)| {
                let ex = extract::extract(path, text, &self.opts.open_marker);
                let table = ex.table?;
                Some((
                    path.to_path_buf(),
                    StyleEntry {
                        table,
                        residual: ex.residual,
                    },
                ))
            })
            .collect()
    }

    fn record(
        &self,
        report: &mut BTreeMap<String, Vec<String>>,
        entry: &StyleEntry,
        tree: &SourceTree,
        index: &ImportIndex,
    ) {
        let table = &entry.table;
        debug!("checking unused styles for {}", table.declaring_file.display());

        let mut used: BTreeSet<&str> = BTreeSet::new();
        for binding in index.bindings_for(&table.declaring_file) {
            let Some(text) = tree.get(&binding.consuming_file) else {
                continue;
            };
            for alias in &binding.local_aliases {
                used.extend(used_keys(alias, &table.keys, text));
            }
        }
        if self.opts.local_usage {
            if let Some(local) = &table.local_binding {
                used.extend(used_keys(local, &table.keys, &entry.residual));
            }
        }

        let unused: Vec<String> = table
            .keys
            .iter()
            .filter(|k| !used.contains(k.as_str()))
            .cloned()
            .collect();
        if !unused.is_empty() {
            report.insert(report_path(&self.opts.root, &table.declaring_file), unused);
        }
    }
}
