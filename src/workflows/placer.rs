use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::debug;

use super::console::Console;
use crate::domain::models::{ArchiveEntry, DownloadedArchive};
use crate::media::path::{existing_subtitles, VideoFile};

#[derive(Debug, Clone, Copy, Default)]
pub struct PlacementOptions {
    /// Name the subtitle after the video
    pub rename: bool,
    /// Insert `.zh` before the extension
    pub plex: bool,
    /// Also write the `.srt`/`.ass` sibling of the chosen entry
    pub both: bool,
    /// Remove the video's existing subtitles first
    pub delete_existing: bool,
}

pub trait Placer {
    /// Writes the chosen entry next to the video and returns the written paths.
    fn place(
        &self,
        video: &VideoFile,
        chosen: &ArchiveEntry,
        entries: &[ArchiveEntry],
        options: &PlacementOptions,
    ) -> Result<Vec<PathBuf>>;

    fn save_archive(
        &self,
        video: &VideoFile,
        archive_title: &str,
        archive: &DownloadedArchive,
        options: &PlacementOptions,
    ) -> Result<PathBuf>;
}

pub struct FsPlacer {
    console: Console,
}

impl FsPlacer {
    pub fn new(console: Console) -> Self {
        Self { console }
    }
}

impl Placer for FsPlacer {
    fn place(
        &self,
        video: &VideoFile,
        chosen: &ArchiveEntry,
        entries: &[ArchiveEntry],
        options: &PlacementOptions,
    ) -> Result<Vec<PathBuf>> {
        let extension = subtitle_extension(&chosen.name);
        let mut to_write = vec![(chosen, extension.clone())];

        if options.both {
            let other = if extension == ".ass" { ".srt" } else { ".ass" };
            match find_sibling(entries, &chosen.name, other) {
                Some(sibling) => to_write.push((sibling, other.to_string())),
                None => self
                    .console
                    .line(format!("no {other} subtitle in this archive")),
            }
        }

        if options.delete_existing {
            for path in existing_subtitles(&video.directory, video.stem()) {
                debug!(path = %path.display(), "Removing existing subtitle");
                fs::remove_file(&path)
                    .with_context(|| format!("remove {}", path.display()))?;
            }
        }

        let mut written = Vec::new();
        for (entry, extension) in to_write {
            let target = video
                .directory
                .join(target_filename(video, entry, &extension, options));
            fs::write(&target, &entry.data)
                .with_context(|| format!("write {}", target.display()))?;
            written.push(target);
        }
        Ok(written)
    }

    fn save_archive(
        &self,
        video: &VideoFile,
        archive_title: &str,
        archive: &DownloadedArchive,
        options: &PlacementOptions,
    ) -> Result<PathBuf> {
        let stem = if options.rename {
            video.stem().to_string()
        } else {
            sanitize_filename(archive_title)
        };
        let target = video
            .directory
            .join(format!("{stem}{}", archive.kind.extension()));
        fs::write(&target, &archive.content)
            .with_context(|| format!("write {}", target.display()))?;
        Ok(target)
    }
}

/// Lowercase extension with its dot, e.g. ".ass".
fn subtitle_extension(name: &str) -> String {
    Path::new(name)
        .extension()
        .and_then(|s| s.to_str())
        .map(|ext| format!(".{}", ext.to_lowercase()))
        .unwrap_or_default()
}

fn find_sibling<'a>(entries: &'a [ArchiveEntry], name: &str, other: &str) -> Option<&'a ArchiveEntry> {
    let stem = name.rsplit_once('.').map_or(name, |(stem, _)| stem);
    let wanted = format!("{stem}{other}").to_lowercase();
    entries.iter().find(|e| e.name.to_lowercase() == wanted)
}

fn target_filename(
    video: &VideoFile,
    entry: &ArchiveEntry,
    extension: &str,
    options: &PlacementOptions,
) -> String {
    if !options.rename {
        let own_name = entry.name.rsplit(['/', '\\']).next().unwrap_or(&entry.name);
        return sanitize_filename(own_name);
    }
    let language = if options.plex { ".zh" } else { "" };
    format!("{}{}{}", video.stem(), language, extension)
}

fn sanitize_filename(name: &str) -> String {
    // Remove or replace invalid filename characters
    name.chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '-',
            c => c,
        })
        .collect::<String>()
        .trim()
        .to_string()
}
