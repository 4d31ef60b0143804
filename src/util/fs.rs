//! Filesystem utilities.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tempfile::NamedTempFile;
use walkdir::WalkDir;

/// Ensure a directory exists, creating it if necessary.
pub fn ensure_dir(path: &Path) -> Result<()> {
    if !path.is_dir() {
        fs::create_dir_all(path)
            .with_context(|| format!("failed to create directory: {}", path.display()))?;
    }
    Ok(())
}

/// Write a string to a file, creating parent directories if needed.
///
/// The file is replaced atomically so a reader never sees a partial write.
pub fn write_string(path: &Path, contents: &str) -> Result<()> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    ensure_dir(parent)?;

    let mut tmp = NamedTempFile::new_in(parent)
        .with_context(|| format!("failed to create temporary file in {}", parent.display()))?;
    tmp.write_all(contents.as_bytes())
        .with_context(|| format!("failed to write file: {}", path.display()))?;
    tmp.persist(path)
        .with_context(|| format!("failed to write file: {}", path.display()))?;

    Ok(())
}

/// Read a file to string, with nice error messages.
pub fn read_to_string(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("failed to read file: {}", path.display()))
}

/// List regular files under `dir`, relative to it and sorted.
///
/// A missing directory yields an empty list.
pub fn list_files_relative(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.exists() {
        return Ok(Vec::new());
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(dir).follow_links(false) {
        let entry =
            entry.with_context(|| format!("failed to walk directory: {}", dir.display()))?;
        if entry.file_type().is_file() {
            let rel = pathdiff::diff_paths(entry.path(), dir)
                .unwrap_or_else(|| entry.path().to_path_buf());
            files.push(rel);
        }
    }

    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_write_string_creates_parents() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("a/b/c.txt");

        write_string(&path, "content").unwrap();
        assert_eq!(read_to_string(&path).unwrap(), "content");

        write_string(&path, "replaced").unwrap();
        assert_eq!(read_to_string(&path).unwrap(), "replaced");
    }

    #[test]
    fn test_ensure_dir_idempotent() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("x/y");
        ensure_dir(&dir).unwrap();
        ensure_dir(&dir).unwrap();
        assert!(dir.is_dir());
    }

    #[test]
    fn test_list_files_relative() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path();
        fs::create_dir_all(root.join("org/example/1.0")).unwrap();
        fs::write(root.join("org/example/1.0/example-1.0.jar"), "jar").unwrap();
        fs::write(root.join("org/example/1.0/example-1.0.pom"), "pom").unwrap();

        let files = list_files_relative(root).unwrap();
        assert_eq!(
            files,
            vec![
                PathBuf::from("org/example/1.0/example-1.0.jar"),
                PathBuf::from("org/example/1.0/example-1.0.pom"),
            ]
        );
    }

    #[test]
    fn test_list_missing_dir() {
        let tmp = TempDir::new().unwrap();
        assert!(list_files_relative(&tmp.path().join("none")).unwrap().is_empty());
    }
}
