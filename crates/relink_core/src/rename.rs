use std::collections::HashSet;
use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::corpus::DocumentRecord;
use crate::rewrite::{RenameMap, encode_token};
use crate::sanitize::{sanitize_filename, title_from_heading};

#[derive(Debug, Clone)]
pub struct RenameOptions {
    pub extension: String,
    pub heading_lines_to_strip: usize,
    pub replacement: char,
    pub dry_run: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct RenamedDocument {
    pub old_relative: String,
    pub new_relative: String,
    pub title: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SkippedDocument {
    pub relative_path: String,
    pub reason: String,
}

#[derive(Debug)]
pub struct RenameReport {
    pub renamed: Vec<RenamedDocument>,
    pub skipped: Vec<SkippedDocument>,
    pub mapping: RenameMap,
}

/// Rename every document after its first-line heading and strip the leading
/// lines from its body. Returns the percent-encoded old-basename to
/// new-basename mapping consumed by the link rewrite pass.
///
/// A document whose target name is already taken is skipped untouched (the
/// body is not stripped either): each document's rename-and-patch is a
/// single unit, and a half-processed file would be worse than an unprocessed
/// one.
pub fn rename_documents(
    documents: &[DocumentRecord],
    options: &RenameOptions,
) -> Result<RenameReport> {
    let mut renamed = Vec::new();
    let mut skipped = Vec::new();
    let mut mapping = RenameMap::new();
    let mut claimed: HashSet<PathBuf> = HashSet::new();

    for document in documents {
        let content = fs::read_to_string(&document.path)
            .with_context(|| format!("failed to read {}", document.path.display()))?;
        let (first_line, body) = split_document(&content, options.heading_lines_to_strip);
        let title = sanitize_filename(&title_from_heading(first_line), options.replacement);
        let new_basename = format!("{title}.{}", options.extension);
        let old_basename = document
            .path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();

        if new_basename == old_basename {
            // Already carries its title; the leading lines still go.
            if !options.dry_run && body != content {
                fs::write(&document.path, &body)
                    .with_context(|| format!("failed to write {}", document.path.display()))?;
            }
            claimed.insert(document.path.clone());
            continue;
        }

        let target = document.path.with_file_name(&new_basename);
        if target.exists() || claimed.contains(&target) {
            skipped.push(SkippedDocument {
                relative_path: document.relative_path.clone(),
                reason: format!("target already exists: {new_basename}"),
            });
            continue;
        }

        if !options.dry_run {
            if body != content {
                fs::write(&document.path, &body)
                    .with_context(|| format!("failed to write {}", document.path.display()))?;
            }
            fs::rename(&document.path, &target).with_context(|| {
                format!(
                    "failed to rename {} to {}",
                    document.path.display(),
                    target.display()
                )
            })?;
        }
        claimed.insert(target);

        mapping.insert(encode_token(&old_basename), encode_token(&new_basename));
        renamed.push(RenamedDocument {
            old_relative: document.relative_path.clone(),
            new_relative: replace_basename(&document.relative_path, &new_basename),
            title,
        });
    }

    Ok(RenameReport {
        renamed,
        skipped,
        mapping,
    })
}

/// Split a document into its first line and the body that survives the
/// strip, preserving line endings byte-for-byte.
fn split_document(content: &str, heading_lines_to_strip: usize) -> (&str, String) {
    let segments: Vec<&str> = content.split_inclusive('\n').collect();
    let first_line = segments.first().copied().unwrap_or("");
    let body = if segments.len() > heading_lines_to_strip {
        segments[heading_lines_to_strip..].concat()
    } else {
        String::new()
    };
    (first_line, body)
}

fn replace_basename(relative_path: &str, new_basename: &str) -> String {
    match relative_path.rsplit_once('/') {
        Some((directory, _)) => format!("{directory}/{new_basename}"),
        None => new_basename.to_string(),
    }
}
