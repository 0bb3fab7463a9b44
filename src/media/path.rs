use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;

pub const VIDEO_EXTENSIONS: &[&str] = &[
    ".mkv", ".mp4", ".avi", ".rmvb", ".rm", ".wmv", ".mov", ".flv", ".ts", ".m2ts", ".webm",
    ".mpg", ".mpeg", ".m4v", ".iso",
];

pub const SUBTITLE_EXTENSIONS: &[&str] = &[".ass", ".srt", ".ssa", ".sub"];

/// A video to fetch subtitles for. The file itself does not have to exist:
/// a bare release name is resolved against the current directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoFile {
    pub name: String,
    pub directory: PathBuf,
    pub has_subtitle: bool,
}

impl VideoFile {
    pub fn stem(&self) -> &str {
        Path::new(&self.name)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(&self.name)
    }
}

pub fn has_video_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .map(|ext| format!(".{}", ext.to_lowercase()))
        .is_some_and(|ext| VIDEO_EXTENSIONS.contains(&ext.as_str()))
}

/// Subtitle files belonging to a video: `<stem><ext>` and `<stem>.zh<ext>`.
pub fn existing_subtitles(directory: &Path, stem: &str) -> Vec<PathBuf> {
    SUBTITLE_EXTENSIONS
        .iter()
        .flat_map(|ext| {
            [
                directory.join(format!("{stem}{ext}")),
                directory.join(format!("{stem}.zh{ext}")),
            ]
        })
        .filter(|path| path.exists())
        .collect()
}

/// Expands the command line argument into videos, recursing into directories.
pub fn collect_videos(input: &Path) -> Result<Vec<VideoFile>> {
    let mut videos = Vec::new();
    collect_videos_helper(input, &mut videos)?;
    Ok(videos)
}

fn collect_videos_helper(input: &Path, videos: &mut Vec<VideoFile>) -> Result<()> {
    if input.is_dir() {
        let mut entries = fs::read_dir(input)?
            .map(|entry| entry.map(|e| e.path()))
            .collect::<std::io::Result<Vec<_>>>()?;
        entries.sort();
        for path in entries {
            collect_videos_helper(&path, videos)?;
        }
        return Ok(());
    }

    if !has_video_extension(input) {
        return Ok(());
    }
    let Some(name) = input.file_name().and_then(|s| s.to_str()) else {
        return Ok(());
    };
    let parent = match input.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let directory = parent.canonicalize().unwrap_or(parent);
    let stem = Path::new(name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(name);
    let has_subtitle = !existing_subtitles(&directory, stem).is_empty();

    videos.push(VideoFile {
        name: name.to_string(),
        directory,
        has_subtitle,
    });
    Ok(())
}
