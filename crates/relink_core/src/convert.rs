use anyhow::Result;

use crate::config::ConvertConfig;
use crate::corpus::scan_documents;
use crate::folders::{FolderOptions, FolderPassReport, rename_folders};
use crate::rename::{RenameOptions, RenameReport, rename_documents};
use crate::rewrite::{RewriteReport, rewrite_documents};
use crate::runtime::ResolvedPaths;

#[derive(Debug, Clone)]
pub struct ConvertOptions {
    pub extension: String,
    pub heading_lines_to_strip: usize,
    pub replacement: char,
    pub dry_run: bool,
}

impl ConvertOptions {
    pub fn from_config(config: &ConvertConfig) -> Self {
        Self {
            extension: config.extension(),
            heading_lines_to_strip: config.heading_lines_to_strip(),
            replacement: config.replacement(),
            dry_run: false,
        }
    }
}

#[derive(Debug)]
pub struct ConvertReport {
    pub rename: RenameReport,
    pub links: RewriteReport,
    pub folders: FolderPassReport,
}

/// Run the conversion passes in order: rename documents after their
/// headings, rewrite document links against the completed mapping, then
/// rename folders (each folder immediately followed by its own corpus-wide
/// patch). Every pass walks a freshly materialized corpus list; no pass
/// starts before the previous one has finished.
pub fn convert_export(paths: &ResolvedPaths, options: &ConvertOptions) -> Result<ConvertReport> {
    let root = paths.export_root.as_path();

    let documents = scan_documents(root, &options.extension)?;
    let rename = rename_documents(
        &documents,
        &RenameOptions {
            extension: options.extension.clone(),
            heading_lines_to_strip: options.heading_lines_to_strip,
            replacement: options.replacement,
            dry_run: options.dry_run,
        },
    )?;

    // Document paths changed above; the rewrite consumes the mapping as a
    // snapshot over a fresh scan.
    let documents = scan_documents(root, &options.extension)?;
    let links = rewrite_documents(&documents, &rename.mapping, options.dry_run)?;

    let folders = rename_folders(
        root,
        &FolderOptions {
            extension: options.extension.clone(),
            dry_run: options.dry_run,
        },
    )?;

    Ok(ConvertReport {
        rename,
        links,
        folders,
    })
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::Path;

    use tempfile::tempdir;

    use super::{ConvertOptions, convert_export};
    use crate::runtime::{ResolvedPaths, ValueSource};

    fn write_file(path: &Path, content: &str) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create parent");
        }
        fs::write(path, content).expect("write");
    }

    fn paths(root: &Path) -> ResolvedPaths {
        ResolvedPaths {
            export_root: root.to_path_buf(),
            config_path: root.join("relink.toml"),
            root_source: ValueSource::Flag,
            config_source: ValueSource::Default,
        }
    }

    fn options() -> ConvertOptions {
        ConvertOptions {
            extension: "md".to_string(),
            heading_lines_to_strip: 2,
            replacement: '_',
            dry_run: false,
        }
    }

    #[test]
    fn full_scenario_renames_and_relinks_the_corpus() {
        let temp = tempdir().expect("tempdir");
        let root = temp.path();
        write_file(
            &root.join("Notes xyz123/a.md"),
            "# Intro\nmeta\nSee [B](Notes%20xyz123/b.md)",
        );
        write_file(&root.join("Notes xyz123/b.md"), "# Background\nmeta\nbody");

        let report = convert_export(&paths(root), &options()).expect("convert");

        assert_eq!(report.rename.renamed.len(), 2);
        assert!(report.rename.skipped.is_empty());
        assert_eq!(report.folders.renamed.len(), 1);

        assert!(root.join("Notes").exists());
        assert!(!root.join("Notes xyz123").exists());
        assert_eq!(
            fs::read_to_string(root.join("Notes/Intro.md")).expect("read"),
            "See [B](Notes/Background.md)"
        );
        assert_eq!(
            fs::read_to_string(root.join("Notes/Background.md")).expect("read"),
            "body"
        );
    }

    #[test]
    fn cross_folder_references_stay_consistent() {
        let temp = tempdir().expect("tempdir");
        let root = temp.path();
        write_file(
            &root.join("toc 000.md"),
            "# Contents\nmeta\n- [x](Deep%20f00/page%20a1.md)\n",
        );
        write_file(&root.join("Deep f00/page a1.md"), "# Deep Page\nmeta\ntext\n");

        let report = convert_export(&paths(root), &options()).expect("convert");

        assert_eq!(report.rename.renamed.len(), 2);
        assert_eq!(
            fs::read_to_string(root.join("Contents.md")).expect("read"),
            "- [x](Deep/Deep%20Page.md)\n"
        );
        assert!(root.join("Deep/Deep Page.md").exists());
    }

    #[test]
    fn link_rewrite_pass_is_idempotent_on_a_consistent_corpus() {
        let temp = tempdir().expect("tempdir");
        let root = temp.path();
        write_file(&root.join("a 1.md"), "# One\nmeta\nlink to b%202.md\n");
        write_file(&root.join("b 2.md"), "# Two\nmeta\n");

        let report = convert_export(&paths(root), &options()).expect("convert");
        assert_eq!(report.links.files_changed, 1);

        // Re-apply the same mapping over the converted tree: nothing left.
        let documents = crate::corpus::scan_documents(root, "md").expect("scan");
        let second = crate::rewrite::rewrite_documents(&documents, &report.rename.mapping, false)
            .expect("second pass");
        assert_eq!(second.files_changed, 0);
    }

    #[test]
    fn dry_run_leaves_the_corpus_untouched() {
        let temp = tempdir().expect("tempdir");
        let root = temp.path();
        write_file(
            &root.join("Notes xyz123/a.md"),
            "# Intro\nmeta\nSee [B](Notes%20xyz123/b.md)",
        );
        write_file(&root.join("Notes xyz123/b.md"), "# Background\nmeta\nbody");

        let report = convert_export(
            &paths(root),
            &ConvertOptions {
                dry_run: true,
                ..options()
            },
        )
        .expect("dry run");

        assert_eq!(report.rename.renamed.len(), 2);
        assert_eq!(report.folders.renamed.len(), 1);
        assert!(root.join("Notes xyz123/a.md").exists());
        assert_eq!(
            fs::read_to_string(root.join("Notes xyz123/a.md")).expect("read"),
            "# Intro\nmeta\nSee [B](Notes%20xyz123/b.md)"
        );
    }
}
