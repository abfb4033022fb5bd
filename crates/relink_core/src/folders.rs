use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;

use crate::corpus::{rel_from_root, scan_documents, scan_folders};
use crate::rewrite::{RenameMap, encode_token, rewrite_documents};

#[derive(Debug, Clone)]
pub struct FolderOptions {
    pub extension: String,
    pub dry_run: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct RenamedFolder {
    pub old_relative: String,
    pub new_relative: String,
    pub files_changed: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct SkippedFolder {
    pub relative_path: String,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct FolderPassReport {
    pub renamed: Vec<RenamedFolder>,
    pub skipped: Vec<SkippedFolder>,
    pub files_changed: usize,
}

/// Drop the trailing space-delimited disambiguation token from a folder
/// name. Returns `None` when there is nothing left to drop (single-token
/// names stay as they are, and a name that would collapse to nothing is
/// never a valid rename target).
pub fn truncate_folder_name(name: &str) -> Option<String> {
    let (kept, _dropped) = name.rsplit_once(' ')?;
    if kept.is_empty() {
        return None;
    }
    Some(kept.to_string())
}

/// Rename every folder under `root` (deepest first, over a list fixed before
/// the first rename) and patch the percent-encoded folder token across the
/// whole corpus after each rename. Each folder's rename-and-patch is
/// self-contained, so the document corpus is re-scanned per folder: paths
/// under a renamed folder have just changed.
pub fn rename_folders(root: &Path, options: &FolderOptions) -> Result<FolderPassReport> {
    let folders = scan_folders(root)?;
    let mut renamed = Vec::new();
    let mut skipped = Vec::new();
    let mut files_changed = 0usize;
    let mut claimed: HashSet<PathBuf> = HashSet::new();

    for folder in &folders {
        let Some(name) = folder.file_name().and_then(|value| value.to_str()) else {
            skipped.push(SkippedFolder {
                relative_path: rel_from_root(root, folder),
                reason: "folder name is not valid UTF-8".to_string(),
            });
            continue;
        };
        let Some(new_name) = truncate_folder_name(name) else {
            continue;
        };

        let target = folder.with_file_name(&new_name);
        if target.exists() || claimed.contains(&target) {
            skipped.push(SkippedFolder {
                relative_path: rel_from_root(root, folder),
                reason: format!("target already exists: {new_name}"),
            });
            continue;
        }

        if !options.dry_run {
            fs::rename(folder, &target).with_context(|| {
                format!(
                    "failed to rename {} to {}",
                    folder.display(),
                    target.display()
                )
            })?;
        }
        claimed.insert(target.clone());

        let mut map = RenameMap::new();
        map.insert(encode_token(name), encode_token(&new_name));
        let documents = scan_documents(root, &options.extension)?;
        let rewrite = rewrite_documents(&documents, &map, options.dry_run)?;
        files_changed += rewrite.files_changed;

        renamed.push(RenamedFolder {
            old_relative: rel_from_root(root, folder),
            new_relative: rel_from_root(root, &target),
            files_changed: rewrite.files_changed,
        });
    }

    Ok(FolderPassReport {
        renamed,
        skipped,
        files_changed,
    })
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::Path;

    use tempfile::tempdir;

    use super::{FolderOptions, rename_folders, truncate_folder_name};

    fn write_file(path: &Path, content: &str) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create parent");
        }
        fs::write(path, content).expect("write");
    }

    fn options() -> FolderOptions {
        FolderOptions {
            extension: "md".to_string(),
            dry_run: false,
        }
    }

    #[test]
    fn truncation_drops_the_last_token_only() {
        assert_eq!(
            truncate_folder_name("Project Notes a1b2c3").as_deref(),
            Some("Project Notes")
        );
        assert_eq!(truncate_folder_name("Notes a1").as_deref(), Some("Notes"));
        assert_eq!(truncate_folder_name("Notes"), None);
        assert_eq!(truncate_folder_name(" leading"), None);
    }

    #[test]
    fn renames_folder_and_patches_links_across_the_corpus() {
        let temp = tempdir().expect("tempdir");
        let root = temp.path();
        write_file(&root.join("Notes xyz123/inside.md"), "unrelated body");
        write_file(
            &root.join("index.md"),
            "See [a](Notes%20xyz123/inside.md) and (Notes%20xyz123/other.md)",
        );

        let report = rename_folders(root, &options()).expect("folder pass");

        assert_eq!(report.renamed.len(), 1);
        assert_eq!(report.renamed[0].old_relative, "Notes xyz123");
        assert_eq!(report.renamed[0].new_relative, "Notes");
        assert!(root.join("Notes/inside.md").exists());
        assert_eq!(
            fs::read_to_string(root.join("index.md")).expect("read"),
            "See [a](Notes/inside.md) and (Notes/other.md)"
        );
        assert_eq!(report.files_changed, 1);
    }

    #[test]
    fn nested_folders_rename_deepest_first() {
        let temp = tempdir().expect("tempdir");
        let root = temp.path();
        write_file(&root.join("Outer abc/Inner def/leaf.md"), "leaf");
        write_file(
            &root.join("index.md"),
            "link: Outer%20abc/Inner%20def/leaf.md",
        );

        let report = rename_folders(root, &options()).expect("folder pass");

        assert_eq!(report.renamed.len(), 2);
        assert!(root.join("Outer/Inner/leaf.md").exists());
        assert_eq!(
            fs::read_to_string(root.join("index.md")).expect("read"),
            "link: Outer/Inner/leaf.md"
        );
    }

    #[test]
    fn existing_sibling_blocks_the_rename() {
        let temp = tempdir().expect("tempdir");
        let root = temp.path();
        fs::create_dir_all(root.join("Notes")).expect("create sibling");
        write_file(&root.join("Notes xyz123/inside.md"), "body");
        write_file(&root.join("index.md"), "See Notes%20xyz123/inside.md");

        let report = rename_folders(root, &options()).expect("folder pass");

        assert!(report.renamed.is_empty());
        assert_eq!(report.skipped.len(), 1);
        assert!(report.skipped[0].reason.contains("target already exists"));
        // Untouched: no rename, no link rewrite.
        assert!(root.join("Notes xyz123/inside.md").exists());
        assert_eq!(
            fs::read_to_string(root.join("index.md")).expect("read"),
            "See Notes%20xyz123/inside.md"
        );
    }

    #[test]
    fn two_folders_truncating_to_the_same_name_keep_the_first() {
        let temp = tempdir().expect("tempdir");
        let root = temp.path();
        write_file(&root.join("Notes aaa/a.md"), "a");
        write_file(&root.join("Notes bbb/b.md"), "b");

        let report = rename_folders(root, &options()).expect("folder pass");

        assert_eq!(report.renamed.len(), 1);
        assert_eq!(report.skipped.len(), 1);
        assert!(root.join("Notes").exists());
    }

    #[test]
    fn dry_run_reports_renames_without_mutating() {
        let temp = tempdir().expect("tempdir");
        let root = temp.path();
        write_file(&root.join("Notes xyz123/inside.md"), "body");
        write_file(&root.join("index.md"), "See Notes%20xyz123/inside.md");

        let report = rename_folders(
            root,
            &FolderOptions {
                dry_run: true,
                ..options()
            },
        )
        .expect("dry run");

        assert_eq!(report.renamed.len(), 1);
        assert_eq!(report.files_changed, 1);
        assert!(root.join("Notes xyz123").exists());
        assert!(!root.join("Notes").exists());
        assert_eq!(
            fs::read_to_string(root.join("index.md")).expect("read"),
            "See Notes%20xyz123/inside.md"
        );
    }
}
