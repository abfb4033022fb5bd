use std::fs;
use std::io;
use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::Serialize;
use zip::ZipArchive;

#[derive(Debug, Clone, Serialize)]
pub struct ExtractReport {
    pub files: usize,
    pub directories: usize,
}

/// Unpack an export archive into `destination`, creating it if needed.
/// Entries whose names would escape the destination are rejected outright
/// rather than skipped; a partially hostile archive is not worth converting.
pub fn extract_archive(archive_path: &Path, destination: &Path) -> Result<ExtractReport> {
    let file = fs::File::open(archive_path)
        .with_context(|| format!("failed to open {}", archive_path.display()))?;
    let mut archive = ZipArchive::new(io::BufReader::new(file))
        .with_context(|| format!("failed to read zip archive {}", archive_path.display()))?;

    fs::create_dir_all(destination)
        .with_context(|| format!("failed to create {}", destination.display()))?;

    let mut files = 0usize;
    let mut directories = 0usize;
    for index in 0..archive.len() {
        let mut entry = archive.by_index(index).with_context(|| {
            format!("failed to read entry {index} in {}", archive_path.display())
        })?;
        let Some(relative) = entry.enclosed_name().map(Path::to_path_buf) else {
            bail!("archive entry escapes the destination: {}", entry.name());
        };

        let target = destination.join(relative);
        if entry.is_dir() {
            fs::create_dir_all(&target)
                .with_context(|| format!("failed to create {}", target.display()))?;
            directories += 1;
        } else {
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("failed to create {}", parent.display()))?;
            }
            let mut output = fs::File::create(&target)
                .with_context(|| format!("failed to create {}", target.display()))?;
            io::copy(&mut entry, &mut output)
                .with_context(|| format!("failed to extract {}", target.display()))?;
            files += 1;
        }
    }

    Ok(ExtractReport { files, directories })
}
