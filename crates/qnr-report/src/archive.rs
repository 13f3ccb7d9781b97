//! Registry packaging.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use qnr_model::{ArchiveEntry, ArchiveManifest};
use qnr_standards::{Layout, sha256_file, sha256_hex, write_json};
use tracing::{debug, info};
use zip::CompressionMethod;
use zip::write::SimpleFileOptions;

/// Package `entries` (paths relative to `root`) into a deflated ZIP at
/// `root/archive`, then write its sidecar manifest next to it.
///
/// Entries keep their relative paths inside the archive.
pub fn write_archive(
    root: &Path,
    entries: &[&str],
    archive: &str,
    name: &str,
    version: &str,
    created_at: &str,
) -> Result<ArchiveManifest> {
    let archive_path = root.join(archive);
    if let Some(parent) = archive_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create {}", parent.display()))?;
    }
    let file = File::create(&archive_path)
        .with_context(|| format!("create {}", archive_path.display()))?;
    let mut writer = zip::ZipWriter::new(file);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    let mut files = Vec::with_capacity(entries.len());
    for entry in entries {
        let source = root.join(entry);
        let bytes =
            std::fs::read(&source).with_context(|| format!("read {}", source.display()))?;
        writer
            .start_file(*entry, options)
            .with_context(|| format!("add {entry} to {archive}"))?;
        writer.write_all(&bytes)?;
        debug!(archive, entry, size = bytes.len(), "archived file");
        files.push(ArchiveEntry {
            path: (*entry).to_string(),
            sha256: sha256_hex(&bytes),
            size: bytes.len() as u64,
        });
    }
    writer
        .finish()
        .with_context(|| format!("finish {}", archive_path.display()))?;

    let manifest = ArchiveManifest {
        name: name.to_string(),
        version: version.to_string(),
        created_at: created_at.to_string(),
        archive: archive.to_string(),
        archive_checksum: sha256_file(&archive_path)?,
        files,
    };
    write_json(&root.join(Layout::archive_manifest(archive)), &manifest)?;
    info!(archive, files = manifest.files.len(), "wrote archive");
    Ok(manifest)
}
