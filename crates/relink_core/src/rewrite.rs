use std::collections::BTreeMap;
use std::fs;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::corpus::DocumentRecord;

/// Percent-encode a basename the way it appears inside link references.
pub fn encode_token(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

/// Mapping of percent-encoded old tokens to their replacements, built during
/// the rename pass and consumed read-only as a snapshot by one rewrite pass.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RenameMap {
    entries: BTreeMap<String, String>,
}

impl RenameMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one rename. Identity entries are ignored; a no-op replacement
    /// only costs time.
    pub fn insert(&mut self, old_encoded: String, new_encoded: String) {
        if old_encoded != new_encoded {
            self.entries.insert(old_encoded, new_encoded);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, old_encoded: &str) -> Option<&str> {
        self.entries.get(old_encoded).map(String::as_str)
    }

    /// Entries in application order: longest old token first, then
    /// lexicographic. The result never depends on insertion order. An old
    /// token that occurs inside another old token can still be rewritten
    /// where it appears as a bare substring; the literal rewrite makes no
    /// attempt to detect that case.
    pub fn replacements(&self) -> Vec<(&str, &str)> {
        let mut out: Vec<(&str, &str)> = self
            .entries
            .iter()
            .map(|(old, new)| (old.as_str(), new.as_str()))
            .collect();
        out.sort_by(|left, right| {
            right
                .0
                .len()
                .cmp(&left.0.len())
                .then_with(|| left.0.cmp(right.0))
        });
        out
    }
}

/// Apply every mapping entry to `text` as a literal substring replacement.
/// This is the seam a structural link parser would slot into; nothing else
/// in the conversion inspects document text.
pub fn apply_replacements(text: &str, map: &RenameMap) -> String {
    let mut output = text.to_string();
    for (old_encoded, new_encoded) in map.replacements() {
        if output.contains(old_encoded) {
            output = output.replace(old_encoded, new_encoded);
        }
    }
    output
}

#[derive(Debug, Clone, Serialize)]
pub struct RewriteReport {
    pub files_scanned: usize,
    pub files_changed: usize,
    pub changed: Vec<String>,
}

/// Patch every document against the mapping snapshot, writing back only the
/// files whose text actually changed. After one full pass no old token
/// remains, so running the pass again performs zero writes.
pub fn rewrite_documents(
    documents: &[DocumentRecord],
    map: &RenameMap,
    dry_run: bool,
) -> Result<RewriteReport> {
    let mut changed = Vec::new();
    if map.is_empty() {
        return Ok(RewriteReport {
            files_scanned: documents.len(),
            files_changed: 0,
            changed,
        });
    }

    for document in documents {
        let text = fs::read_to_string(&document.path)
            .with_context(|| format!("failed to read {}", document.path.display()))?;
        let patched = apply_replacements(&text, map);
        if patched != text {
            if !dry_run {
                fs::write(&document.path, &patched)
                    .with_context(|| format!("failed to write {}", document.path.display()))?;
            }
            changed.push(document.relative_path.clone());
        }
    }

    Ok(RewriteReport {
        files_scanned: documents.len(),
        files_changed: changed.len(),
        changed,
    })
}
