//! JSON file discovery and loading for an extracted export directory.
//!
//! Turns the files of an already-unpacked export into in-memory
//! [`ExportDocument`]s; everything downstream works on those values only.

use std::path::{Path, PathBuf};

use recap_core::error::{RecapError, Result};
use serde_json::Value;
use tracing::{debug, warn};

/// One parsed JSON file from the export.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportDocument {
    /// Path relative to the export root, `/`-separated.
    pub name: String,
    pub value: Value,
}

impl ExportDocument {
    pub fn new(name: impl Into<String>, value: Value) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

/// Find all `.json` files recursively under `root`, sorted by path.
pub fn find_json_files(root: &Path) -> Vec<PathBuf> {
    if !root.exists() {
        warn!("Export path does not exist: {}", root.display());
        return Vec::new();
    }

    let mut files: Vec<PathBuf> = walkdir::WalkDir::new(root)
        .follow_links(true)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| {
            entry.file_type().is_file()
                && entry
                    .path()
                    .extension()
                    .map(|ext| ext.eq_ignore_ascii_case("json"))
                    .unwrap_or(false)
        })
        .map(|entry| entry.into_path())
        .collect();

    files.sort();
    files
}

/// Load every JSON file under `root` into an [`ExportDocument`].
///
/// Files that cannot be read or parsed are skipped with a warning; they
/// cannot carry conversations a detector could recognise.
pub fn load_export_documents(root: &Path) -> Result<Vec<ExportDocument>> {
    if !root.is_dir() {
        return Err(RecapError::ExportPathNotFound(root.to_path_buf()));
    }

    let files = find_json_files(root);
    if files.is_empty() {
        return Err(RecapError::NoExportFiles(root.to_path_buf()));
    }

    let mut documents = Vec::with_capacity(files.len());
    for path in &files {
        match read_document(root, path) {
            Ok(doc) => documents.push(doc),
            Err(e) => warn!("Skipping {}: {}", path.display(), e),
        }
    }

    debug!(
        "Loaded {} of {} JSON files from {}",
        documents.len(),
        files.len(),
        root.display()
    );
    Ok(documents)
}

fn read_document(root: &Path, path: &Path) -> Result<ExportDocument> {
    let content = std::fs::read_to_string(path).map_err(|source| RecapError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    let value: Value = serde_json::from_str(&content)?;
    Ok(ExportDocument::new(relative_name(root, path), value))
}

fn relative_name(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_file(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(&path, content).unwrap();
        path
    }

    // ── find_json_files ───────────────────────────────────────────────────────

    #[test]
    fn test_find_json_files_recursive_and_sorted() {
        let dir = TempDir::new().unwrap();
        write_file(dir.path(), "b.json", "[]");
        write_file(dir.path(), "a.json", "[]");
        write_file(dir.path(), "nested/c.JSON", "[]");
        write_file(dir.path(), "chat.html", "<html></html>");

        let files = find_json_files(dir.path());
        let names: Vec<String> = files
            .iter()
            .map(|p| relative_name(dir.path(), p))
            .collect();
        assert_eq!(names, vec!["a.json", "b.json", "nested/c.JSON"]);
    }

    #[test]
    fn test_find_json_files_nonexistent_path() {
        let files = find_json_files(Path::new("/tmp/does-not-exist-recap-test-xyz"));
        assert!(files.is_empty());
    }

    // ── load_export_documents ─────────────────────────────────────────────────

    #[test]
    fn test_load_export_documents_parses_values() {
        let dir = TempDir::new().unwrap();
        write_file(dir.path(), "conversations.json", r#"[{"id": "c1"}]"#);
        write_file(dir.path(), "user.json", r#"{"email": "x@example.com"}"#);

        let docs = load_export_documents(dir.path()).unwrap();
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].name, "conversations.json");
        assert!(docs[0].value.is_array());
        assert_eq!(docs[1].name, "user.json");
    }

    #[test]
    fn test_load_export_documents_skips_invalid_json() {
        let dir = TempDir::new().unwrap();
        write_file(dir.path(), "broken.json", "{not json");
        write_file(dir.path(), "good.json", "[]");

        let docs = load_export_documents(dir.path()).unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].name, "good.json");
    }

    #[test]
    fn test_load_export_documents_empty_directory() {
        let dir = TempDir::new().unwrap();
        let err = load_export_documents(dir.path()).unwrap_err();
        assert!(matches!(err, RecapError::NoExportFiles(_)));
    }

    #[test]
    fn test_load_export_documents_missing_directory() {
        let err = load_export_documents(Path::new("/tmp/does-not-exist-recap-test-xyz"))
            .unwrap_err();
        assert!(matches!(err, RecapError::ExportPathNotFound(_)));
    }
}
