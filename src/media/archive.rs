use std::io::{Cursor, Read};

use anyhow::Context;
use encoding_rs::GBK;
use tracing::debug;
use zip::ZipArchive;

use crate::domain::error::{FetchError, Result};
use crate::domain::models::{ArchiveEntry, ArchiveKind, DownloadedArchive};

pub trait ArchiveDecoder {
    /// Decoded files of an archive, in archive order, directories skipped.
    fn decode(&self, archive: &DownloadedArchive) -> Result<Vec<ArchiveEntry>>;
}

/// Handles zip archives and bare subtitle downloads.
#[derive(Debug, Clone, Copy, Default)]
pub struct ZipDecoder;

impl ArchiveDecoder for ZipDecoder {
    fn decode(&self, archive: &DownloadedArchive) -> Result<Vec<ArchiveEntry>> {
        match archive.kind {
            ArchiveKind::Zip => decode_zip(&archive.content),
            ArchiveKind::Plain(ext) => Ok(vec![ArchiveEntry {
                name: archive
                    .file_name
                    .clone()
                    .unwrap_or_else(|| format!("subtitle{ext}")),
                data: archive.content.clone(),
            }]),
            // Sites occasionally omit the extension on zip downloads
            ArchiveKind::Unknown if archive.content.starts_with(b"PK\x03\x04") => {
                decode_zip(&archive.content)
            }
            other => Err(FetchError::ArchiveExtractionFailed(format!(
                "unsupported archive type {}",
                other.extension()
            ))),
        }
    }
}

fn decode_zip(content: &[u8]) -> Result<Vec<ArchiveEntry>> {
    let mut zip = ZipArchive::new(Cursor::new(content))
        .map_err(|e| FetchError::ArchiveExtractionFailed(format!("read zip archive: {e}")))?;

    let mut entries = Vec::with_capacity(zip.len());
    for i in 0..zip.len() {
        let mut file = zip.by_index(i).context("read zip entry")?;
        if file.is_dir() {
            continue;
        }
        let name = entry_name(file.name_raw()).unwrap_or_else(|| file.name().to_string());
        // Declared sizes come from the download and are not trusted
        let mut data = Vec::new();
        file.read_to_end(&mut data)
            .with_context(|| format!("extract {name}"))?;
        debug!(entry = %name, size = data.len(), "Decoded archive entry");
        entries.push(ArchiveEntry { name, data });
    }
    Ok(entries)
}

/// Raw UTF-8 when valid, otherwise GBK, which Chinese archivers write without
/// setting the UTF-8 flag.
fn entry_name(raw: &[u8]) -> Option<String> {
    if let Ok(name) = std::str::from_utf8(raw) {
        return Some(name.to_string());
    }
    let (name, had_errors) = GBK.decode_without_bom_handling(raw);
    (!had_errors).then(|| name.into_owned())
}
