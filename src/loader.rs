use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use globset::{Glob, GlobSet, GlobSetBuilder};
use tracing::debug;
use walkdir::{DirEntry, WalkDir};

use crate::error::{ScanError, ScanResult};
use crate::model::SourceTree;

#[derive(Debug, Clone)]
pub struct LoaderOptions {
    /// Glob patterns matched against the root-relative path and the bare name.
    pub ignore: Vec<String>,
    pub max_depth: usize,
}

impl Default for LoaderOptions {
    fn default() -> Self {
        Self {
            ignore: default_ignore(),
            max_depth: 64,
        }
    }
}

pub fn default_ignore() -> Vec<String> {
    vec![".DS_Store".to_string()]
}

/// Reads every regular file below `root`. Any read failure aborts the load.
pub fn load_tree(root: &Path, opts: &LoaderOptions) -> ScanResult<SourceTree> {
    let meta = fs::metadata(root).map_err(|source| ScanError::Read {
        path: root.to_path_buf(),
        source,
    })?;
    if !meta.is_dir() {
        return Err(ScanError::NotADirectory {
            path: root.to_path_buf(),
        });
    }

    let ignore = build_ignore_set(&opts.ignore)?;
    let mut files: BTreeMap<PathBuf, String> = BTreeMap::new();

    let walker = WalkDir::new(root)
        .follow_links(false)
        .max_depth(opts.max_depth)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| !is_ignored(e, root, &ignore));

    for ent in walker {
        let ent = ent.map_err(|source| ScanError::Walk {
            path: root.to_path_buf(),
            source,
        })?;
        if !ent.file_type().is_file() {
            continue;
        }
        let path = ent.path().to_path_buf();
        let bytes = fs::read(&path).map_err(|source| ScanError::Read {
            path: path.clone(),
            source,
        })?;
        files.insert(path, String::from_utf8_lossy(&bytes).into_owned());
    }

    debug!("loaded {} files from {}", files.len(), root.display());
    Ok(SourceTree::new(files))
}

fn build_ignore_set(patterns: &[String]) -> ScanResult<GlobSet> {
    let mut b = GlobSetBuilder::new();
    for p in patterns {
        let glob = Glob::new(p).map_err(|source| ScanError::Pattern {
            pattern: p.clone(),
            source,
        })?;
        b.add(glob);
    }
    b.build().map_err(|source| ScanError::Pattern {
        pattern: patterns.join(","),
        source,
    })
}

fn is_ignored(ent: &DirEntry, root: &Path, ignore: &GlobSet) -> bool {
    if ent.depth() == 0 {
        return false;
    }
    let rel = ent.path().strip_prefix(root).unwrap_or(ent.path());
    let rel_s = rel.to_string_lossy().replace('\\', "/");
    ignore.is_match(rel_s.as_str()) || ignore.is_match(Path::new(ent.file_name()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn loads_nested_files_and_skips_denylist() {
        let dir = tempdir().expect("tmp");
        fs::create_dir_all(dir.path().join("app/deep/er")).expect("mkdir");
        fs::write(dir.path().join("app/a.ts"), "a").expect("write");
        fs::write(dir.path().join("app/deep/er/b.ts"), "b").expect("write");
        fs::write(dir.path().join("app/.DS_Store"), [0u8, 159, 146, 150]).expect("write");
        fs::write(dir.path().join(".DS_Store"), "meta").expect("write");

        let tree = load_tree(dir.path(), &LoaderOptions::default()).expect("load");
        assert_eq!(tree.len(), 2);
        assert_eq!(tree.get(&dir.path().join("app/deep/er/b.ts")), Some("b"));
        assert!(tree.iter().all(|(p, _)| !p.ends_with(".DS_Store")));
    }

    #[test]
    fn invalid_utf8_is_read_lossily() {
        let dir = tempdir().expect("tmp");
        fs::write(dir.path().join("latin1.ts"), b"const s = 'caf\xe9';\n").expect("write");

        let tree = load_tree(dir.path(), &LoaderOptions::default()).expect("load");
        assert_eq!(
            tree.get(&dir.path().join("latin1.ts")),
            Some("const s = 'caf\u{FFFD}';\n")
        );
    }

    #[test]
    fn extra_patterns_prune_directories() {
        let dir = tempdir().expect("tmp");
        fs::create_dir_all(dir.path().join("node_modules/pkg")).expect("mkdir");
        fs::write(dir.path().join("node_modules/pkg/index.js"), "x").expect("write");
        fs::write(dir.path().join("index.ts"), "y").expect("write");

        let opts = LoaderOptions {
            ignore: vec![".DS_Store".into(), "node_modules".into()],
            max_depth: 64,
        };
        let tree = load_tree(dir.path(), &opts).expect("load");
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn depth_limit_bounds_descent() {
        let dir = tempdir().expect("tmp");
        fs::create_dir_all(dir.path().join("a/b")).expect("mkdir");
        fs::write(dir.path().join("a/top.ts"), "t").expect("write");
        fs::write(dir.path().join("a/b/low.ts"), "l").expect("write");

        let opts = LoaderOptions {
            max_depth: 2,
            ..LoaderOptions::default()
        };
        let tree = load_tree(dir.path(), &opts).expect("load");
        assert!(tree.get(&dir.path().join("a/top.ts")).is_some());
        assert!(tree.get(&dir.path().join("a/b/low.ts")).is_none());
    }

    #[test]
    fn missing_directory_is_fatal() {
        let dir = tempdir().expect("tmp");
        let err = load_tree(&dir.path().join("nope"), &LoaderOptions::default()).unwrap_err();
        assert!(matches!(err, ScanError::Read { .. }));
    }

    #[test]
    fn invalid_pattern_is_reported() {
        let dir = tempdir().expect("tmp");
        let opts = LoaderOptions {
            ignore: vec!["a[".into()],
            max_depth: 4,
        };
        assert!(matches!(load_tree(dir.path(), &opts), Err(ScanError::Pattern { .. })));
    }
}
