use std::fmt;

/// Canonical description of a video (or subtitle file) derived from its name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdentityRecord {
    pub title: String,
    pub season: Option<u32>,
    pub episode: Option<u32>,
    /// Streaming platform, e.g. "Netflix"
    pub source: Option<String>,
    pub release_group: Option<String>,
    pub screen_size: Option<String>,
    /// Rip source, e.g. "WEB-DL"
    pub format: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LanguageFlags {
    pub zh_simplified: bool,
    pub zh_traditional: bool,
    pub english: bool,
    pub bilingual: bool,
}

impl LanguageFlags {
    /// Substring heuristics over a site's free-text description.
    pub fn from_text(text: &str) -> Self {
        let lower = text.to_lowercase();
        Self {
            zh_simplified: text.contains("简体") || lower.contains("chs"),
            zh_traditional: text.contains("繁体") || lower.contains("cht"),
            english: text.contains("英文") || lower.contains("eng"),
            bilingual: text.contains("中英") || text.contains("双语"),
        }
    }

    pub fn badges(&self) -> String {
        let mut out = String::new();
        out.push_str(if self.zh_simplified { "[简]" } else { "    " });
        out.push_str(if self.zh_traditional { "[繁]" } else { "    " });
        out.push_str(if self.english { "[英]" } else { "    " });
        out.push_str(if self.bilingual { "[双]" } else { "    " });
        out
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Site {
    SubHd,
    Zimuzu,
    Zimuku,
}

impl Site {
    pub fn tag(&self) -> &'static str {
        match self {
            Site::SubHd => "SUBHD",
            Site::Zimuzu => "ZMZ",
            Site::Zimuku => "ZIMUKU",
        }
    }
}

impl fmt::Display for Site {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Everything a downloader needs to fetch one candidate later on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locator {
    pub site: Site,
    pub link: String,
    /// Page the link was found on; some sites refuse downloads without it
    pub referer: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubtitleCandidate {
    pub title: String,
    pub version: String,
    pub languages: LanguageFlags,
    pub locator: Locator,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveKind {
    Zip,
    Rar,
    SevenZip,
    /// A bare subtitle file, carrying its extension
    Plain(&'static str),
    Unknown,
}

impl ArchiveKind {
    /// Guesses the kind from a download URL or a Content-Disposition header.
    pub fn sniff(hint: &str) -> Self {
        let lower = hint.to_lowercase();
        if lower.contains(".zip") {
            ArchiveKind::Zip
        } else if lower.contains(".rar") {
            ArchiveKind::Rar
        } else if lower.contains(".7z") {
            ArchiveKind::SevenZip
        } else if lower.contains(".ass") {
            ArchiveKind::Plain(".ass")
        } else if lower.contains(".srt") {
            ArchiveKind::Plain(".srt")
        } else if lower.contains(".ssa") {
            ArchiveKind::Plain(".ssa")
        } else {
            ArchiveKind::Unknown
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ArchiveKind::Zip => ".zip",
            ArchiveKind::Rar => ".rar",
            ArchiveKind::SevenZip => ".7z",
            ArchiveKind::Plain(ext) => ext,
            ArchiveKind::Unknown => ".bin",
        }
    }
}

#[derive(Debug, Clone)]
pub struct DownloadedArchive {
    pub kind: ArchiveKind,
    pub content: Vec<u8>,
    /// Name the site gave the download, if any
    pub file_name: Option<String>,
}

/// One decoded file of a subtitle archive. Archives decode to a `Vec` of these
/// in archive order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    pub name: String,
    pub data: Vec<u8>,
}
