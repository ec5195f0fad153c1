//! Source file discovery
//!
//! Expands the paths given on the command line into the C# files to analyse.
//! Directories are walked recursively; build output (`bin/`, `obj/`) and
//! hidden directories are skipped.

use glob::Pattern;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

use crate::{Result, SableError};

const SKIPPED_DIRECTORIES: &[&str] = &["bin", "obj"];

/// Expand `paths` into a sorted, de-duplicated list of `*.cs` files
///
/// Files named explicitly are kept whatever their extension. `excludes` are
/// glob patterns matched against the path relative to the argument it was
/// found under, and against the full path.
pub fn discover_files(paths: &[PathBuf], excludes: &[String]) -> Result<Vec<PathBuf>> {
    let patterns = excludes
        .iter()
        .map(|raw| {
            Pattern::new(raw).map_err(|e| {
                SableError::config_error(format!("Invalid glob pattern '{raw}': {e}"))
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let mut files = BTreeSet::new();
    for root in paths {
        if root.is_file() {
            if !is_excluded(root, root, &patterns) {
                files.insert(root.clone());
            }
            continue;
        }
        if !root.is_dir() {
            return Err(SableError::io_error(
                root,
                std::io::Error::new(std::io::ErrorKind::NotFound, "no such file or directory"),
            ));
        }

        for entry in WalkDir::new(root)
            .follow_links(false)
            .into_iter()
            .filter_entry(|entry| entry.depth() == 0 || !is_skipped_directory(entry))
            .filter_map(|entry| entry.ok())
        {
            let path = entry.path();
            if entry.file_type().is_file() && is_csharp_file(path) && !is_excluded(path, root, &patterns)
            {
                files.insert(path.to_path_buf());
            }
        }
    }

    tracing::debug!("Discovered {} C# files", files.len());
    Ok(files.into_iter().collect())
}

fn is_csharp_file(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("cs"))
}

fn is_skipped_directory(entry: &DirEntry) -> bool {
    if !entry.file_type().is_dir() {
        return false;
    }
    let name = entry.file_name().to_string_lossy();
    name.starts_with('.')
        || SKIPPED_DIRECTORIES
            .iter()
            .any(|skipped| name.eq_ignore_ascii_case(skipped))
}

fn is_excluded(path: &Path, root: &Path, patterns: &[Pattern]) -> bool {
    if patterns.is_empty() {
        return false;
    }
    let relative = path.strip_prefix(root).unwrap_or(path).to_string_lossy().replace('\\', "/");
    let full = path.to_string_lossy().replace('\\', "/");
    patterns
        .iter()
        .any(|pattern| pattern.matches(&relative) || pattern.matches(&full))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(root: &Path, relative: &str) -> PathBuf {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "class A { }\n").unwrap();
        path
    }

    #[test]
    fn test_discovers_cs_files_recursively() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        let a = touch(root, "A.cs");
        let b = touch(root, "src/Nested/B.CS");
        touch(root, "README.md");
        touch(root, "bin/Debug/Generated.cs");
        touch(root, "obj/Temp.cs");
        touch(root, ".git/hooks/Hook.cs");

        let files = discover_files(&[root.to_path_buf()], &[]).unwrap();
        assert_eq!(files, vec![a, b]);
    }

    #[test]
    fn test_excludes() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        let kept = touch(root, "src/Kept.cs");
        touch(root, "src/Generated/Skip.cs");
        touch(root, "src/Skip.Designer.cs");

        let excludes = vec!["**/Generated/**".to_string(), "**/*.Designer.cs".to_string()];
        let files = discover_files(&[root.to_path_buf()], &excludes).unwrap();
        assert_eq!(files, vec![kept]);
    }

    #[test]
    fn test_explicit_file_and_dedup() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        let script = touch(root, "Build.csx");
        let a = touch(root, "A.cs");

        let files = discover_files(&[script.clone(), root.to_path_buf(), a.clone()], &[]).unwrap();
        assert_eq!(files.iter().filter(|f| **f == a).count(), 1);
        assert!(files.contains(&script));
    }

    #[test]
    fn test_missing_path_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("missing");
        assert!(discover_files(&[missing], &[]).is_err());
    }

    #[test]
    fn test_invalid_pattern() {
        let temp_dir = TempDir::new().unwrap();
        assert!(discover_files(&[temp_dir.path().to_path_buf()], &["[".to_string()]).is_err());
    }
}
