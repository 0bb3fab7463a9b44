use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use crate::domain::models::Site;

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum DownloaderName {
    Subhd,
    Zimuzu,
    Zimuku,
}

impl From<DownloaderName> for Site {
    fn from(name: DownloaderName) -> Self {
        match name {
            DownloaderName::Subhd => Site::SubHd,
            DownloaderName::Zimuzu => Site::Zimuzu,
            DownloaderName::Zimuku => Site::Zimuku,
        }
    }
}

#[derive(Parser)]
#[command(name = "getsub", version)]
#[command(about = "Download subtitles for video files from Chinese subtitle sites")]
pub struct Cli {
    /// The video's name or full path, or a directory with videos
    pub name: PathBuf,

    /// Show search results and choose one to download
    #[arg(short = 'q', long)]
    pub query: bool,

    /// Show the subtitles inside the archive and choose one to extract
    #[arg(short = 's', long)]
    pub single: bool,

    /// Replace subtitles that already exist
    #[arg(short = 'o', long)]
    pub over: bool,

    /// Save .srt and .ass at the same time if both exist in the archive
    #[arg(short = 'b', long)]
    pub both: bool,

    /// Save the original downloaded archive next to the video
    #[arg(long)]
    pub save_original: bool,

    /// Only search this site
    #[arg(short = 'd', long)]
    pub downloader: Option<DownloaderName>,

    /// Max number of search results listed in query mode
    #[arg(short = 'n', long)]
    pub number: Option<usize>,

    /// Add .zh to the subtitle's name so Plex recognizes the language
    #[arg(long)]
    pub plex: bool,

    /// Show debug logs
    #[arg(long)]
    pub debug: bool,
}
