//! Rule-based guesser for scene-style release names.
//!
//! Handles names like:
//! - "The.Morning.Show.S01E06.The.Pendulum.Swings.1080p.WEB-DL.DD5.1.H264-MZABI.mkv"
//! - "Chicago Fire 1x08 720p HDTV x264-ETHEL"
//! - "权力的游戏.Game.of.Thrones.第8季.第1集.中英字幕.mkv"
//!
//! The result is a loosely-typed map. Only `matching::identity` reads it.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::trace;

use crate::media::path::{SUBTITLE_EXTENSIONS, VIDEO_EXTENSIONS};

/// Field name to raw value, e.g. `"season" => "1"`.
pub type GuessMap = BTreeMap<String, String>;

pub trait MetadataGuesser {
    fn guess(&self, filename: &str) -> GuessMap;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ReleaseNameGuesser;

const ARCHIVE_EXTENSIONS: &[&str] = &[".zip", ".rar", ".7z"];

static TOKEN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)(?:h\.26[45]|(?:ddp|dd|eac3|ac3|aac|dts|truehd|atmos|flac|opus)\d\.\d)(?:-[^\s._\[\](){}【】]+)?|[^\s._\[\](){}【】]+",
    )
    .unwrap()
});
static CJK_SEASON_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"第\s*(\d{1,2})\s*季").unwrap());
static CJK_EPISODE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"第\s*(\d{1,3})\s*[集话話]").unwrap());
static SXXEXX_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^s(\d{1,2})e(\d{1,3})(?:-?e\d{1,3})*$").unwrap());
static SEASON_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^s(\d{1,2})$").unwrap());
static EPISODE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^(?:e|ep)(\d{1,3})$").unwrap());
static NXMM_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d{1,2})x(\d{2,3})$").unwrap());
static YEAR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(19\d{2}|20\d{2})$").unwrap());
static SCREEN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^(\d{3,4})([pi])$").unwrap());
static AUDIO_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(?:ddp|dd|eac3|e-ac-3|ac3|aac|dts|dts-hd|truehd|atmos|flac|opus|mp3)(?:\d(?:\.\d)?)?$")
        .unwrap()
});

const FORMATS: &[(&str, &str)] = &[
    ("web-dl", "WEB-DL"),
    ("webdl", "WEB-DL"),
    ("webrip", "WEBRip"),
    ("web-rip", "WEBRip"),
    ("web", "WEB"),
    ("bluray", "BluRay"),
    ("blu-ray", "BluRay"),
    ("bdrip", "BluRay"),
    ("brrip", "BluRay"),
    ("hdtv", "HDTV"),
    ("hdrip", "HDRip"),
    ("dvdrip", "DVDRip"),
    ("dvd", "DVD"),
];

const STREAMING_SERVICES: &[(&str, &str)] = &[
    ("amzn", "Amazon Prime"),
    ("nf", "Netflix"),
    ("netflix", "Netflix"),
    ("dsnp", "Disney+"),
    ("hmax", "HBO Max"),
    ("hbo", "HBO"),
    ("atvp", "Apple TV+"),
    ("hulu", "Hulu"),
    ("pcok", "Peacock"),
    ("pmtp", "Paramount+"),
];

const VIDEO_CODECS: &[&str] = &[
    "h264", "h.264", "x264", "avc", "h265", "h.265", "x265", "hevc", "av1", "xvid", "divx",
    "10bit", "8bit",
];

const OTHER_FLAGS: &[&str] = &[
    "proper", "repack", "internal", "limited", "extended", "uncut", "remux", "hdr", "hdr10",
    "dv", "complete", "multi", "imax", "hc", "subbed",
];

const LANGUAGE_CODES: &[&str] = &["eng", "en", "chs", "cht", "chi", "chn", "zh", "zho", "big5"];

const LANGUAGE_MARKERS: &[&str] = &[
    "简体", "繁体", "中英", "英文", "双语", "简中", "繁中", "中文", "字幕", "简繁", "英中",
];

#[derive(Debug, Clone, PartialEq, Eq)]
enum Tag {
    SeasonEpisode(u32, u32),
    Season(u32),
    Episode(u32),
    Year(String),
    ScreenSize(String),
    Format(&'static str),
    Service(&'static str),
    VideoCodec(String),
    AudioCodec(String),
    Language(String),
    Other,
}

impl MetadataGuesser for ReleaseNameGuesser {
    fn guess(&self, filename: &str) -> GuessMap {
        let mut map = GuessMap::new();

        let name = filename
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or(filename)
            .trim();
        let name = match strip_known_extension(name) {
            Some((stem, ext)) => {
                map.insert("container".into(), ext.trim_start_matches('.').to_string());
                stem
            }
            None => name,
        };

        let name = CJK_SEASON_RE.replace_all(name, " S$1 ");
        let name = CJK_EPISODE_RE.replace_all(&name, " E$1 ");

        let mut tokens: Vec<String> = TOKEN_RE
            .find_iter(&name)
            .map(|m| m.as_str().to_string())
            .collect();

        let mut tags: Vec<Option<Tag>> = tokens
            .iter()
            .enumerate()
            .map(|(i, token)| classify(token, i))
            .collect();

        // Release group rides on the last token: "H264-GROUP"
        if let Some(last) = tokens.last().cloned() {
            let last_index = tokens.len() - 1;
            if tags[last_index].is_none() {
                if let Some((prefix, group)) = last.rsplit_once('-') {
                    let prefix_tag = classify(prefix, last_index);
                    let seen_keyword = tags[..last_index].iter().any(Option::is_some);
                    if !group.is_empty()
                        && !prefix.is_empty()
                        && classify(group, last_index).is_none()
                        && (prefix_tag.is_some() || seen_keyword)
                    {
                        map.insert("release_group".into(), group.to_string());
                        tokens[last_index] = prefix.to_string();
                        tags[last_index] = prefix_tag;
                    }
                }
            }
        }

        let title_end = tags.iter().position(Option::is_some).unwrap_or(tokens.len());
        let title = tokens[..title_end].join(" ");
        if !title.is_empty() {
            map.insert("title".into(), title);
        }

        for (i, tag) in tags.iter().enumerate() {
            let Some(tag) = tag else { continue };
            match tag {
                Tag::SeasonEpisode(season, episode) => {
                    insert_once(&mut map, "season", season.to_string());
                    insert_once(&mut map, "episode", episode.to_string());
                    let episode_title = tokens[i + 1..]
                        .iter()
                        .zip(&tags[i + 1..])
                        .take_while(|(_, tag)| tag.is_none())
                        .map(|(token, _)| token.as_str())
                        .collect::<Vec<_>>()
                        .join(" ");
                    if !episode_title.is_empty() {
                        insert_once(&mut map, "episode_title", episode_title);
                    }
                }
                Tag::Season(season) => insert_once(&mut map, "season", season.to_string()),
                Tag::Episode(episode) => insert_once(&mut map, "episode", episode.to_string()),
                Tag::Year(year) => insert_once(&mut map, "year", year.clone()),
                Tag::ScreenSize(size) => insert_once(&mut map, "screen_size", size.clone()),
                Tag::Format(format) => insert_once(&mut map, "format", format.to_string()),
                Tag::Service(service) => insert_once(&mut map, "source", service.to_string()),
                Tag::VideoCodec(codec) => insert_once(&mut map, "video_codec", codec.clone()),
                Tag::AudioCodec(codec) => insert_once(&mut map, "audio_codec", codec.clone()),
                Tag::Language(language) => insert_once(&mut map, "language", language.clone()),
                Tag::Other => {}
            }
        }

        trace!(filename, ?map, "Guessed release name");
        map
    }
}

fn insert_once(map: &mut GuessMap, key: &str, value: String) {
    map.entry(key.to_string()).or_insert(value);
}

fn strip_known_extension(name: &str) -> Option<(&str, &str)> {
    let dot = name.rfind('.')?;
    let ext = &name[dot..];
    let lower = ext.to_lowercase();
    let known = VIDEO_EXTENSIONS
        .iter()
        .chain(SUBTITLE_EXTENSIONS)
        .chain(ARCHIVE_EXTENSIONS)
        .any(|known| *known == lower);
    known.then(|| (&name[..dot], ext))
}

/// The first token of a name is always title unless it is an episode marker.
fn classify(token: &str, index: usize) -> Option<Tag> {
    if let Some(caps) = SXXEXX_RE.captures(token) {
        return Some(Tag::SeasonEpisode(caps[1].parse().ok()?, caps[2].parse().ok()?));
    }
    if let Some(caps) = NXMM_RE.captures(token) {
        return Some(Tag::SeasonEpisode(caps[1].parse().ok()?, caps[2].parse().ok()?));
    }
    if let Some(caps) = SEASON_RE.captures(token) {
        return Some(Tag::Season(caps[1].parse().ok()?));
    }
    if let Some(caps) = EPISODE_RE.captures(token) {
        return Some(Tag::Episode(caps[1].parse().ok()?));
    }
    if index == 0 {
        return None;
    }

    let lower = token.to_lowercase();
    if YEAR_RE.is_match(token) {
        return Some(Tag::Year(token.to_string()));
    }
    if let Some(caps) = SCREEN_RE.captures(token) {
        return Some(Tag::ScreenSize(format!("{}{}", &caps[1], caps[2].to_lowercase())));
    }
    if lower == "4k" || lower == "uhd" {
        return Some(Tag::ScreenSize("2160p".to_string()));
    }
    if let Some((_, format)) = FORMATS.iter().find(|(key, _)| *key == lower) {
        return Some(Tag::Format(format));
    }
    if let Some((_, service)) = STREAMING_SERVICES.iter().find(|(key, _)| *key == lower) {
        return Some(Tag::Service(service));
    }
    if VIDEO_CODECS.contains(&lower.as_str()) {
        return Some(Tag::VideoCodec(token.to_string()));
    }
    if AUDIO_RE.is_match(token) {
        return Some(Tag::AudioCodec(token.to_string()));
    }
    if OTHER_FLAGS.contains(&lower.as_str()) {
        return Some(Tag::Other);
    }
    if LANGUAGE_CODES.contains(&lower.as_str())
        || LANGUAGE_MARKERS.iter().any(|marker| token.contains(marker))
    {
        return Some(Tag::Language(token.to_string()));
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn guess(name: &str) -> GuessMap {
        ReleaseNameGuesser.guess(name)
    }

    #[test]
    fn test_guess_scene_release() {
        let map = guess(
            "The.Morning.Show.S01E06.The.Pendulum.Swings.1080p.WEB-DL.DD5.1.H264-MZABIrarbg.mkv",
        );
        assert_eq!(map["title"], "The Morning Show");
        assert_eq!(map["season"], "1");
        assert_eq!(map["episode"], "6");
        assert_eq!(map["episode_title"], "The Pendulum Swings");
        assert_eq!(map["screen_size"], "1080p");
        assert_eq!(map["format"], "WEB-DL");
        assert_eq!(map["audio_codec"], "DD5.1");
        assert_eq!(map["video_codec"], "H264");
        assert_eq!(map["release_group"], "MZABIrarbg");
        assert_eq!(map["container"], "mkv");
        assert!(!map.contains_key("source"));
    }

    #[test]
    fn test_guess_streaming_service() {
        let map = guess("Corner Gas S06E12 Super Sensitive 1080p AMZN WEB-DL DDP2.0 H.264-QOQ");
        assert_eq!(map["title"], "Corner Gas");
        assert_eq!(map["source"], "Amazon Prime");
        assert_eq!(map["video_codec"], "H.264");
        assert_eq!(map["release_group"], "QOQ");
    }

    #[test]
    fn test_guess_alternative_episode_markers() {
        let map = guess("Chicago Fire 1x08 720p HDTV x264-ETHEL.avi");
        assert_eq!(map["title"], "Chicago Fire");
        assert_eq!(map["season"], "1");
        assert_eq!(map["episode"], "8");

        let map = guess("权力的游戏.第8季.第1集.mkv");
        assert_eq!(map["title"], "权力的游戏");
        assert_eq!(map["season"], "8");
        assert_eq!(map["episode"], "1");

        let map = guess("Show.Name.S02.E03.mkv");
        assert_eq!(map["season"], "2");
        assert_eq!(map["episode"], "3");
    }

    #[test]
    fn test_guess_year_ends_title() {
        let map = guess("The.Morning.Show.2019.S01E03.PROPER.1080p.WEB.H264-ELiMiNATE.mkv");
        assert_eq!(map["title"], "The Morning Show");
        assert_eq!(map["year"], "2019");
        assert_eq!(map["format"], "WEB");
        assert_eq!(map["release_group"], "ELiMiNATE");
    }

    #[test]
    fn test_guess_subtitle_language_is_not_title() {
        let map = guess("X.简体.ass");
        assert_eq!(map["title"], "X");
        assert_eq!(map["language"], "简体");

        let map = guess("subs/X.eng.srt");
        assert_eq!(map["title"], "X");
        assert_eq!(map["container"], "srt");
    }

    #[test]
    fn test_guess_plain_title_keeps_hyphen() {
        let map = guess("Spider-Man.mkv");
        assert_eq!(map["title"], "Spider-Man");
        assert!(!map.contains_key("release_group"));
    }

    #[test]
    fn test_guess_empty_name() {
        assert!(guess("").is_empty());
        assert!(!guess("S01E01.mkv").contains_key("title"));
    }
}
