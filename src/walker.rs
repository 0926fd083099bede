//! Directory collection for the `scan` CLI subcommand.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::registry;

/// Collect every file under `root` whose extension the registry recognizes.
/// When `only_exts` is non-empty, further narrow to that set (as passed via
/// `scan --ext`). Hidden directories (starting with `.`) are pruned.
pub fn collect_files(root: &Path, only_exts: &[String]) -> Vec<PathBuf> {
    WalkDir::new(root)
        .into_iter()
        .filter_entry(|e| {
            if e.file_type().is_dir() {
                let name = e.file_name().to_str().unwrap_or("");
                return !name.starts_with('.');
            }
            true
        })
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter_map(|e| {
            let path = e.path();
            let ext = path.extension().and_then(|e| e.to_str())?;
            if !registry::is_supported(ext) {
                return None;
            }
            if !only_exts.is_empty() && !only_exts.iter().any(|e| e.eq_ignore_ascii_case(ext)) {
                return None;
            }
            Some(path.to_path_buf())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn collects_only_supported_extensions() {
        let dir = std::env::temp_dir().join(format!("chunkwise-walker-test-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("a.go"), "package main").unwrap();
        fs::write(dir.join("b.rs"), "fn main() {}").unwrap();

        let files = collect_files(&dir, &[]);
        assert!(files.iter().any(|p| p.ends_with("a.go")));
        assert!(!files.iter().any(|p| p.ends_with("b.rs")));

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn ext_filter_narrows_further() {
        let dir = std::env::temp_dir().join(format!("chunkwise-walker-test2-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("a.go"), "package main").unwrap();
        fs::write(dir.join("a.py"), "x = 1").unwrap();

        let files = collect_files(&dir, &["py".to_string()]);
        assert!(files.iter().any(|p| p.ends_with("a.py")));
        assert!(!files.iter().any(|p| p.ends_with("a.go")));

        fs::remove_dir_all(&dir).ok();
    }
}
