use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;
use walkdir::WalkDir;

use crate::folders::truncate_folder_name;

#[derive(Debug, Clone)]
pub struct DocumentRecord {
    pub path: PathBuf,
    pub relative_path: String,
}

/// Materialize every document under `root` carrying `extension`, sorted by
/// relative path. The returned list is fixed before any mutation begins, so
/// a pass over it never observes a changing filesystem.
pub fn scan_documents(root: &Path, extension: &str) -> Result<Vec<DocumentRecord>> {
    let mut documents = Vec::new();
    for entry in WalkDir::new(root).follow_links(false) {
        let entry = entry.with_context(|| format!("failed to walk {}", root.display()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        if path.extension().and_then(|ext| ext.to_str()) != Some(extension) {
            continue;
        }
        documents.push(DocumentRecord {
            path: path.to_path_buf(),
            relative_path: rel_from_root(root, path),
        });
    }
    documents.sort_by(|left, right| left.relative_path.cmp(&right.relative_path));
    Ok(documents)
}

/// Materialize every directory strictly under `root`, deepest first. With
/// children ahead of their parents, renaming an entry can never invalidate a
/// not-yet-visited one.
pub fn scan_folders(root: &Path) -> Result<Vec<PathBuf>> {
    let mut folders = Vec::new();
    for entry in WalkDir::new(root).follow_links(false).min_depth(1) {
        let entry = entry.with_context(|| format!("failed to walk {}", root.display()))?;
        if entry.file_type().is_dir() {
            folders.push(entry.path().to_path_buf());
        }
    }
    folders.sort_by(|left, right| {
        right
            .components()
            .count()
            .cmp(&left.components().count())
            .then_with(|| left.cmp(right))
    });
    Ok(folders)
}

#[derive(Debug, Clone, Serialize)]
pub struct CorpusStats {
    pub total_documents: usize,
    pub total_folders: usize,
    pub folders_with_suffix: usize,
    pub total_bytes: u64,
}

pub fn corpus_stats(root: &Path, extension: &str) -> Result<CorpusStats> {
    let documents = scan_documents(root, extension)?;
    let folders = scan_folders(root)?;

    let mut total_bytes = 0u64;
    for document in &documents {
        let metadata = fs::metadata(&document.path)
            .with_context(|| format!("failed to stat {}", document.path.display()))?;
        total_bytes += metadata.len();
    }

    let folders_with_suffix = folders
        .iter()
        .filter(|folder| {
            folder
                .file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| truncate_folder_name(name).is_some())
        })
        .count();

    Ok(CorpusStats {
        total_documents: documents.len(),
        total_folders: folders.len(),
        folders_with_suffix,
        total_bytes,
    })
}

pub(crate) fn rel_from_root(root: &Path, path: &Path) -> String {
    match path.strip_prefix(root) {
        Ok(rel) => display_path(rel),
        Err(_) => display_path(path),
    }
}

pub fn normalize_separators(path: &str) -> String {
    path.replace('\\', "/")
}

fn display_path(path: &Path) -> String {
    normalize_separators(&path.to_string_lossy())
}
