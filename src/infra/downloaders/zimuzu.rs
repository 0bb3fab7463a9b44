use anyhow::anyhow;
use scraper::Html;

use super::{absolute_url, css, element_text, encode_keyword, Downloader, HttpSession};
use crate::domain::error::Result;
use crate::domain::models::{DownloadedArchive, LanguageFlags, Locator, Site, SubtitleCandidate};

const SITE_URL: &str = "http://www.zmz2019.com";
const DETAIL_API: &str = "http://got001.com/api/v1/static/subtitle/detail";

pub struct Zimuzu {
    session: HttpSession,
}

impl Zimuzu {
    pub fn new(session: HttpSession) -> Self {
        Self { session }
    }
}

impl Downloader for Zimuzu {
    fn site(&self) -> Site {
        Site::Zimuzu
    }

    fn search(&self, keyword: &str) -> Result<Vec<SubtitleCandidate>> {
        let url = format!(
            "{SITE_URL}/search?keyword={}&type=subtitle",
            encode_keyword(keyword)
        );
        let html = self.session.search_page(&url)?;
        parse_search_page(&html)
    }

    fn fetch(&self, locator: &Locator) -> Result<DownloadedArchive> {
        let page = self.session.page(&locator.link, None)?;
        let share_link = {
            let document = Html::parse_document(&page);
            document
                .select(&css("div.subtitle-links a"))
                .next()
                .and_then(|a| a.value().attr("href"))
                .map(str::to_string)
                .ok_or_else(|| anyhow!("no subtitle link on {}", locator.link))?
        };

        let query = share_link.rsplit('?').next().unwrap_or_default();
        let body = self
            .session
            .page(&format!("{DETAIL_API}?{query}"), Some(&share_link))?;
        let file_url = parse_detail_response(&body)?;
        self.session.download(&file_url, Some(&share_link))
    }
}

fn parse_search_page(html: &str) -> Result<Vec<SubtitleCandidate>> {
    let document = Html::parse_document(html);
    let tab_text = document
        .select(&css("div.article-tab"))
        .next()
        .map(element_text)
        .unwrap_or_default();
    if tab_text.contains("字幕(0)") {
        return Ok(Vec::new());
    }

    let mut candidates = Vec::new();
    for item in document.select(&css("div.search-item")) {
        let Some(link) = item.select(&css("a")).next() else {
            continue;
        };
        let name = item
            .select(&css("p font"))
            .next()
            .map(element_text)
            .unwrap_or_default();
        let version = item
            .select(&css("font.f4"))
            .next()
            .map(element_text)
            .unwrap_or_else(|| name.clone());
        let href = link.value().attr("href").unwrap_or_default();

        candidates.push(SubtitleCandidate {
            title: format!("[{}]{}", Site::Zimuzu.tag(), name),
            version,
            languages: LanguageFlags::from_text(&element_text(link)),
            locator: Locator {
                site: Site::Zimuzu,
                link: absolute_url(SITE_URL, href)?,
                referer: None,
            },
        });
    }
    Ok(candidates)
}

fn parse_detail_response(body: &str) -> Result<String> {
    let json: serde_json::Value = serde_json::from_str(body).map_err(anyhow::Error::from)?;
    let file = json
        .pointer("/data/info/file")
        .and_then(|v| v.as_str())
        .ok_or_else(|| anyhow!("no file in zimuzu detail response"))?;
    Ok(file.to_string())
}
