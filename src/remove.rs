use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::{ScanError, ScanResult};
use crate::extract::find_literal;
use crate::model::{RemoveSummary, UnusedReport};
use crate::paths::absolutize;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stripped {
    pub text: String,
    pub removed: Vec<String>,
    pub missed: Vec<String>,
}

/// Removes `keys` one after another, re-scanning the updated text each time.
pub fn strip_keys(text: &str, keys: &[String], open_marker: &str) -> Stripped {
    let mut current = text.to_string();
    let mut removed = Vec::new();
    let mut missed = Vec::new();
    for key in keys {
        match strip_key(&current, key, open_marker) {
            Some(next) => {
                current = next;
                removed.push(key.clone());
            }
            None => missed.push(key.clone()),
        }
    }
    Stripped {
        text: current,
        removed,
        missed,
    }
}

/// `None` when the key is not a top-level entry of the style literal.
pub fn strip_key(text: &str, key: &str, open_marker: &str) -> Option<String> {
    let lit = find_literal(text, open_marker)?;
    let span = lit.key(key)?;
    let bytes = text.as_bytes();

    let end = span.entry_end;

    let line_start = text[..span.start].rfind('\n').map_or(0, |i| i + 1);
    let prefix = &text[line_start..span.start];
    let line_end = text[end..].find('\n').map_or(text.len(), |i| end + i);
    let eol = if line_end > end && bytes[line_end - 1] == b'\r' {
        line_end - 1
    } else {
        line_end
    };

    let mut rest = skip_blank(bytes, end, eol);
    if rest < eol && bytes[rest] == b',' {
        rest = skip_blank(bytes, rest + 1, eol);
    }

    let mut out = String::with_capacity(text.len());
    if !text[rest..eol].trim().is_empty() {
        // Something else shares the closing line; keep it in place.
        out.push_str(&text[..span.start]);
        out.push_str(&text[rest..]);
    } else if prefix.trim().is_empty() {
        out.push_str(&text[..line_start]);
        let next = if line_end < text.len() { line_end + 1 } else { text.len() };
        out.push_str(&text[next..]);
    } else {
        out.push_str(text[..span.start].trim_end_matches([' ', '\t']));
        out.push_str(&text[eol..]);
    }
    Some(out)
}

fn skip_blank(bytes: &[u8], mut i: usize, limit: usize) -> usize {
    while i < limit && (bytes[i] == b' ' || bytes[i] == b'\t') {
        i += 1;
    }
    i
}

#[derive(Debug, Clone)]
pub struct Remover {
    root: PathBuf,
    open_marker: String,
}

impl Remover {
    pub fn new(root: impl Into<PathBuf>, open_marker: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            open_marker: open_marker.into(),
        }
    }

    pub fn apply(&self, reports: &[UnusedReport]) -> ScanResult<RemoveSummary> {
        let mut summary = RemoveSummary::default();
        for report in reports {
            for (file, keys) in &report.0 {
                let path = absolutize(&self.root, Path::new(file));
                self.apply_file(&path, keys, &mut summary)?;
            }
        }
        Ok(summary)
    }

    fn apply_file(&self, path: &Path, keys: &[String], summary: &mut RemoveSummary) -> ScanResult<()> {
        info!("removing from {}", path.display());
        let text = fs::read_to_string(path).map_err(|source| ScanError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let stripped = strip_keys(&text, keys, &self.open_marker);
        summary.planned += keys.len();
        summary.removed += stripped.removed.len();
        summary.missed += stripped.missed.len();
        for key in &stripped.missed {
            debug!("key {key} not found in {}", path.display());
        }

        if stripped.removed.is_empty() {
            return Ok(());
        }
        fs::write(path, stripped.text).map_err(|source| ScanError::Write {
            path: path.to_path_buf(),
            source,
        })?;
        summary.files_rewritten += 1;
        Ok(())
    }
}
