use std::path::{Component, Path, PathBuf};

/// Lexically resolves `.` and `..` without touching the file system.
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for comp in path.components() {
        match comp {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Absolute, normalized form of `path`; relative paths are taken from `base`.
pub fn absolutize(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        normalize(path)
    } else {
        normalize(&base.join(path))
    }
}

/// Path as written into reports: relative to `root` with `/` separators when
/// possible, absolute otherwise.
pub fn report_path(root: &Path, path: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    rel.to_string_lossy().replace('\\', "/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_collapses_parent_segments() {
        assert_eq!(normalize(Path::new("/a/b/../c/./d.ts")), PathBuf::from("/a/c/d.ts"));
    }

    #[test]
    fn absolutize_keeps_absolute_input() {
        assert_eq!(
            absolutize(Path::new("/root"), Path::new("/other/x.ts")),
            PathBuf::from("/other/x.ts")
        );
        assert_eq!(
            absolutize(Path::new("/root"), Path::new("app/x.ts")),
            PathBuf::from("/root/app/x.ts")
        );
    }

    #[test]
    fn report_path_is_root_relative() {
        assert_eq!(
            report_path(Path::new("/proj"), Path::new("/proj/app/Button.styles.ts")),
            "app/Button.styles.ts"
        );
        assert_eq!(report_path(Path::new("/proj"), Path::new("/elsewhere/a.ts")), "/elsewhere/a.ts");
    }
}
