//! Query input
//!
//! Turns the paths given on the command line into query units. Files are read
//! as they are; directories are walked recursively for files with the
//! configured extension.

use anyhow::{Context, Result};
use quarry_core::domain::job::QueryUnit;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Collects query units from `paths`, sorted by path
pub fn collect_query_units(paths: &[PathBuf], extension: &str) -> Result<Vec<QueryUnit>> {
    let mut files = Vec::new();
    for path in paths {
        let metadata =
            fs::metadata(path).with_context(|| format!("Cannot access {}", path.display()))?;
        if metadata.is_dir() {
            walk(path, extension, &mut files)?;
        } else {
            files.push(path.clone());
        }
    }

    files.sort();
    files.dedup();

    let mut units = Vec::with_capacity(files.len());
    for file in files {
        let text = fs::read_to_string(&file)
            .with_context(|| format!("Failed to read {}", file.display()))?;
        if text.trim().is_empty() {
            warn!("Skipping empty query file {}", file.display());
            continue;
        }
        debug!("Loaded query {}", file.display());
        units.push(QueryUnit::new(file.display().to_string(), text));
    }

    if units.is_empty() {
        anyhow::bail!("No queries found in the given paths");
    }

    Ok(units)
}

fn walk(dir: &Path, extension: &str, files: &mut Vec<PathBuf>) -> Result<()> {
    for entry in WalkDir::new(dir).follow_links(false) {
        let entry = entry.with_context(|| format!("Failed to walk {}", dir.display()))?;
        if entry.file_type().is_symlink() || !entry.file_type().is_file() {
            continue;
        }
        if entry.path().extension().is_some_and(|ext| ext == extension) {
            files.push(entry.into_path());
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_walks_directories_and_filters_extension() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("daily/nested")).unwrap();
        fs::write(root.join("daily/b.sql"), "SELECT 2").unwrap();
        fs::write(root.join("daily/nested/a.sql"), "SELECT 1").unwrap();
        fs::write(root.join("daily/notes.md"), "not a query").unwrap();
        fs::write(root.join("daily/empty.sql"), "  \n").unwrap();

        let units = collect_query_units(&[root.join("daily")], "sql").unwrap();

        let texts: Vec<_> = units.iter().map(|u| u.text.as_str()).collect();
        assert_eq!(texts, vec!["SELECT 2", "SELECT 1"]);
        assert!(units[0].name.ends_with("b.sql"));
    }

    #[test]
    fn test_explicit_files_are_read_regardless_of_extension() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("report.txt");
        fs::write(&file, "SELECT 3").unwrap();

        let units = collect_query_units(&[file.clone(), file], "sql").unwrap();

        assert_eq!(units.len(), 1);
        assert_eq!(units[0].text, "SELECT 3");
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinked_directories_are_not_followed() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("q");
        fs::create_dir_all(&root).unwrap();
        fs::write(root.join("a.sql"), "SELECT 1").unwrap();
        std::os::unix::fs::symlink(&root, root.join("loop")).unwrap();
        std::os::unix::fs::symlink(root.join("a.sql"), root.join("alias.sql")).unwrap();

        let units = collect_query_units(&[root.clone()], "sql").unwrap();

        assert_eq!(units.len(), 1);
        assert_eq!(units[0].name, root.join("a.sql").display().to_string());
    }

    #[test]
    fn test_missing_path_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(collect_query_units(&[dir.path().join("missing")], "sql").is_err());
    }

    #[test]
    fn test_no_queries_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(collect_query_units(&[dir.path().to_path_buf()], "sql").is_err());
    }
}
