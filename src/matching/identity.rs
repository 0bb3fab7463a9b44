use once_cell::sync::Lazy;
use regex::Regex;

use super::guess::{GuessMap, MetadataGuesser};
use crate::domain::models::IdentityRecord;

static CJK_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\x{4e00}-\x{9fff}]").unwrap());
static LATIN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[a-zA-Z]").unwrap());

/// Derives the identity of a video or subtitle from its file name.
pub struct IdentityExtractor<G> {
    guesser: G,
}

impl<G: MetadataGuesser> IdentityExtractor<G> {
    pub fn new(guesser: G) -> Self {
        Self { guesser }
    }

    pub fn extract(&self, filename: &str) -> IdentityRecord {
        let cleaned = filename.replace(['[', ']'], "");
        let guess = self.guesser.guess(&cleaned);
        from_guess(&guess)
    }
}

/// The only place the loosely-typed guess is read.
fn from_guess(guess: &GuessMap) -> IdentityRecord {
    let text = |key: &str| guess.get(key).filter(|v| !v.is_empty()).cloned();
    let number = |key: &str| guess.get(key).and_then(|v| v.trim().parse::<u32>().ok());

    IdentityRecord {
        title: disambiguate_title(guess.get("title").map(String::as_str).unwrap_or_default()),
        season: number("season"),
        episode: number("episode"),
        source: text("source"),
        release_group: text("release_group"),
        screen_size: text("screen_size"),
        format: text("format"),
    }
}

/// Mixed Chinese/English titles keep whichever script has more characters.
pub fn disambiguate_title(title: &str) -> String {
    let c_count = CJK_RE.find_iter(title).count();
    let e_count = LATIN_RE.find_iter(title).count();
    let stripped = if c_count > e_count {
        LATIN_RE.replace_all(title, "")
    } else {
        CJK_RE.replace_all(title, "")
    };
    stripped.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matching::guess::ReleaseNameGuesser;

    fn extract(name: &str) -> IdentityRecord {
        IdentityExtractor::new(ReleaseNameGuesser).extract(name)
    }

    struct FixedGuesser(GuessMap);

    impl MetadataGuesser for FixedGuesser {
        fn guess(&self, _filename: &str) -> GuessMap {
            self.0.clone()
        }
    }

    fn has_both_scripts(text: &str) -> bool {
        CJK_RE.is_match(text) && LATIN_RE.is_match(text)
    }

    #[test]
    fn test_extract_morning_show() {
        let identity = extract(
            "The.Morning.Show.S01E06.The.Pendulum.Swings.1080p.WEB-DL.DD5.1.H264-MZABI[rarbg].mkv",
        );
        assert_eq!(identity.title, "The Morning Show");
        assert_eq!(identity.season, Some(1));
        assert_eq!(identity.episode, Some(6));
        assert_eq!(identity.format.as_deref(), Some("WEB-DL"));
        assert_eq!(identity.screen_size.as_deref(), Some("1080p"));
        assert_eq!(identity.release_group.as_deref(), Some("MZABIrarbg"));
        assert_eq!(identity.source, None);
    }

    #[test]
    fn test_mixed_script_title_keeps_majority() {
        let identity = extract("权力的游戏.Game.of.Thrones.S08E01.中英字幕.mkv");
        assert_eq!(identity.title, "Game of Thrones");

        let identity = extract("神探夏洛克.SH.S04E01.mkv");
        assert_eq!(identity.title, "神探夏洛克");
    }

    #[test]
    fn test_titles_never_mix_scripts() {
        let names = [
            "[字幕组]Attack on Titan 进击的巨人 S01E01.mkv",
            "进击的巨人.Attack.S01E01.mkv",
            "A.B.中.S01E01.mkv",
            "中文A.mkv",
            "The.Morning.Show.S01E06.mkv",
            "",
        ];
        for name in names {
            let title = extract(name).title;
            assert!(!has_both_scripts(&title), "{name:?} -> {title:?}");
        }
    }

    #[test]
    fn test_disambiguate_title_tie_prefers_latin() {
        assert_eq!(disambiguate_title("中文 ab"), "ab");
        assert_eq!(disambiguate_title("  Friends  "), "Friends");
        assert_eq!(disambiguate_title(""), "");
    }

    #[test]
    fn test_extract_never_fails_on_empty_guess() {
        let identity = IdentityExtractor::new(FixedGuesser(GuessMap::new())).extract("whatever");
        assert_eq!(identity, IdentityRecord::default());
    }

    #[test]
    fn test_extract_ignores_unparseable_numbers() {
        let mut guess = GuessMap::new();
        guess.insert("title".into(), "Show".into());
        guess.insert("season".into(), "one".into());
        guess.insert("episode".into(), "3".into());
        guess.insert("source".into(), "".into());
        let identity = IdentityExtractor::new(FixedGuesser(guess)).extract("x");
        assert_eq!(identity.title, "Show");
        assert_eq!(identity.season, None);
        assert_eq!(identity.episode, Some(3));
        assert_eq!(identity.source, None);
    }

    #[test]
    fn test_brackets_are_removed_before_guessing() {
        struct Echo;
        impl MetadataGuesser for Echo {
            fn guess(&self, filename: &str) -> GuessMap {
                GuessMap::from([("title".to_string(), filename.to_string())])
            }
        }
        let identity = IdentityExtractor::new(Echo).extract("[Group] Show [1080p]");
        assert_eq!(identity.title, "Group Show 1080p");
    }
}
