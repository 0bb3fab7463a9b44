use std::path::Path;

use tracing::debug;

use super::guess::MetadataGuesser;
use super::identity::IdentityExtractor;
use crate::domain::models::IdentityRecord;

/// Additive score of a subtitle file name: language markers plus format.
pub fn score(filename: &str) -> u32 {
    let mut score = 0;
    if filename.contains("eng") || filename.contains("英文") {
        score += 1;
    }
    if filename.contains("chs") || filename.contains("简体") {
        score += 2;
    }
    if filename.contains("cht") || filename.contains("繁体") {
        score += 4;
    }
    if filename.contains("中英") {
        score += 8;
    }
    // Markers are case-sensitive, the extension is not
    let extension = Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or_default()
        .to_lowercase();
    match extension.as_str() {
        "ass" | "ssa" => score += 2,
        "srt" => score += 1,
        _ => {}
    }
    score
}

/// Result of picking a subtitle out of an archive automatically.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection<'a> {
    Chosen(&'a str),
    /// The archive held no entries at all
    Empty,
    /// Entries were present but none matched the video
    NoMatch,
}

impl<G: MetadataGuesser> IdentityExtractor<G> {
    /// Highest scoring entry among those whose name matches `identity`; the
    /// first one wins ties.
    pub fn best_subtitle<'a, I>(&self, entry_names: I, identity: &IdentityRecord) -> Selection<'a>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut seen_any = false;
        let mut best: Option<(&'a str, u32)> = None;

        for name in entry_names {
            seen_any = true;
            if !self.matches(name, identity) {
                debug!(entry = name, "Subtitle does not match video, skipping");
                continue;
            }
            let filename = name.rsplit(['/', '\\']).next().unwrap_or(name);
            let entry_score = score(filename);
            debug!(entry = name, score = entry_score, "Scored subtitle");
            if best.map_or(true, |(_, best_score)| entry_score > best_score) {
                best = Some((name, entry_score));
            }
        }

        match (best, seen_any) {
            (Some((name, _)), _) => Selection::Chosen(name),
            (None, false) => Selection::Empty,
            (None, true) => Selection::NoMatch,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matching::guess::ReleaseNameGuesser;

    fn extractor() -> IdentityExtractor<ReleaseNameGuesser> {
        IdentityExtractor::new(ReleaseNameGuesser)
    }

    #[test]
    fn test_score_markers() {
        assert_eq!(score("X.简体.ass"), 4);
        assert_eq!(score("X.eng.srt"), 2);
        assert_eq!(score("X.cht.ssa"), 6);
        assert_eq!(score("X.中英.ass"), 10);
        assert_eq!(score("X.CHS.SRT"), 1);
        assert_eq!(score("readme.txt"), 0);
        assert_eq!(score(""), 0);
    }

    #[test]
    fn test_score_markers_are_case_sensitive() {
        assert_eq!(score("Show.ENG.srt"), 1);
        assert_eq!(score("Show.CHT.srt"), 1);
        assert_eq!(score("Engrenages.S01E01.chs.srt"), 3);
    }

    #[test]
    fn test_score_extension_not_substring() {
        assert_eq!(score("Glass.Onion.txt"), 0);
        assert_eq!(score("Glass.Onion.srt"), 1);
    }

    #[test]
    fn test_bilingual_outscores_single_language() {
        for single in ["eng", "英文", "chs", "简体", "cht", "繁体"] {
            for ext in ["ass", "srt", "ssa", "sub"] {
                let bilingual = format!("Show.中英.{ext}");
                let one = format!("Show.{single}.{ext}");
                assert!(score(&bilingual) >= score(&one), "{bilingual} vs {one}");
            }
        }
    }

    #[test]
    fn test_best_subtitle_prefers_higher_score() {
        let identity = extractor().extract("X.mkv");
        let names = ["X.eng.srt", "X.简体.ass"];
        assert_eq!(
            extractor().best_subtitle(names, &identity),
            Selection::Chosen("X.简体.ass")
        );
    }

    #[test]
    fn test_best_subtitle_empty_and_unmatched() {
        let identity = extractor().extract("X.mkv");
        assert_eq!(
            extractor().best_subtitle(Vec::<&str>::new(), &identity),
            Selection::Empty
        );
        assert_eq!(
            extractor().best_subtitle(["Y.chs.ass", "Z.srt"], &identity),
            Selection::NoMatch
        );
    }

    #[test]
    fn test_best_subtitle_single_match_wins_regardless_of_score() {
        let identity = extractor().extract("Show.S01E02.mkv");
        let names = ["Show.S01E01.中英.ass", "Show.S01E02.txt"];
        assert_eq!(
            extractor().best_subtitle(names, &identity),
            Selection::Chosen("Show.S01E02.txt")
        );
    }

    #[test]
    fn test_best_subtitle_ties_keep_first() {
        let identity = extractor().extract("Show.S01E02.mkv");
        let names = ["sub/Show.S01E02.chs.srt", "sub/Show.S01E02.eng.ass"];
        assert_eq!(
            extractor().best_subtitle(names, &identity),
            Selection::Chosen("sub/Show.S01E02.chs.srt")
        );
    }
}
