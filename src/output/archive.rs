//! Zip packaging of saved pages
//!
//! Archives are named `<prefix>_<YYYYmmdd_HHMMSS>.zip` and hold the saved
//! Markdown files with entry names relative to the content directory.
//! Archives are short-lived: each run prunes the ones older than the
//! configured retention window.

use crate::output::types::{ExportError, OutputResult};
use chrono::Local;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

/// File name for an archive created now
pub fn archive_file_name(prefix: &str) -> String {
    format!("{}_{}.zip", prefix, Local::now().format("%Y%m%d_%H%M%S"))
}

/// Packages `files` into a new deflate archive inside `archive_dir`
///
/// Every file must live under `content_dir`.
pub fn create_archive(
    content_dir: &Path,
    files: &[PathBuf],
    archive_dir: &Path,
    prefix: &str,
) -> OutputResult<PathBuf> {
    if files.is_empty() {
        return Err(ExportError::NothingToArchive);
    }

    fs::create_dir_all(archive_dir)?;
    let archive_path = archive_dir.join(archive_file_name(prefix));

    tracing::info!("Creating archive at {}", archive_path.display());

    let mut zip = ZipWriter::new(File::create(&archive_path)?);
    let options = FileOptions::default().compression_method(CompressionMethod::Deflated);

    for file in files {
        let name = entry_name(content_dir, file)?;
        tracing::debug!("Adding to archive: {}", name);

        let data = fs::read(file)?;
        zip.start_file(name, options)?;
        zip.write_all(&data)?;
    }

    zip.finish()?;

    tracing::info!(
        "Archive {} created with {} files",
        archive_path.display(),
        files.len()
    );

    Ok(archive_path)
}

/// Entry name of `file` relative to `content_dir`, always `/`-separated
fn entry_name(content_dir: &Path, file: &Path) -> OutputResult<String> {
    let relative = file.strip_prefix(content_dir).map_err(|_| {
        ExportError::InvalidPath(format!(
            "{} is not inside {}",
            file.display(),
            content_dir.display()
        ))
    })?;

    let parts: Vec<String> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();

    if parts.is_empty() {
        return Err(ExportError::InvalidPath(file.display().to_string()));
    }

    Ok(parts.join("/"))
}

/// Deletes `.zip` files in `archive_dir` older than `retention`
///
/// Returns how many archives were removed. A missing directory is not an
/// error.
pub fn prune_expired_archives(archive_dir: &Path, retention: Duration) -> OutputResult<usize> {
    if !archive_dir.exists() {
        return Ok(0);
    }

    let now = SystemTime::now();
    let mut removed = 0;

    for entry in fs::read_dir(archive_dir)? {
        let path = entry?.path();
        if path.extension().and_then(|e| e.to_str()) != Some("zip") {
            continue;
        }

        let modified = fs::metadata(&path)?.modified()?;
        let age = now.duration_since(modified).unwrap_or_default();

        if age >= retention {
            match fs::remove_file(&path) {
                Ok(()) => {
                    tracing::info!("Cleaned up archive: {}", path.display());
                    removed += 1;
                }
                Err(e) => tracing::warn!("Failed to remove {}: {}", path.display(), e),
            }
        }
    }

    Ok(removed)
}
