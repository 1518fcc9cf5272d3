use std::fs;
use std::path::Path;

use crate::error::{ScanError, ScanResult};
use crate::model::UnusedReport;

pub const DEFAULT_REPORT_FILE: &str = "unused-styles.json";

pub fn save_reports(path: &Path, reports: &[UnusedReport]) -> ScanResult<()> {
    let json = serde_json::to_string_pretty(reports).map_err(|source| ScanError::Report {
        path: path.to_path_buf(),
        source,
    })?;
    fs::write(path, json).map_err(|source| ScanError::Write {
        path: path.to_path_buf(),
        source,
    })
}

pub fn load_reports(path: &Path) -> ScanResult<Vec<UnusedReport>> {
    let raw = fs::read_to_string(path).map_err(|source| ScanError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| ScanError::Report {
        path: path.to_path_buf(),
        source,
    })
}
