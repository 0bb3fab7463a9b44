use anyhow::anyhow;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::Html;
use tracing::debug;

use super::{absolute_url, css, element_text, encode_keyword, Downloader, HttpSession};
use crate::domain::error::{FetchError, Result};
use crate::domain::models::{DownloadedArchive, LanguageFlags, Locator, Site, SubtitleCandidate};

const SITE_URL: &str = "https://subhd.tv";
const DISALLOWED_CHARS: &str = "The URI you submitted has disallowed characters";

static DOWNLOAD_URL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r#"https?:[^"]+"#).unwrap());

pub struct SubHd {
    session: HttpSession,
}

impl SubHd {
    pub fn new(session: HttpSession) -> Self {
        Self { session }
    }
}

impl Downloader for SubHd {
    fn site(&self) -> Site {
        Site::SubHd
    }

    fn search(&self, keyword: &str) -> Result<Vec<SubtitleCandidate>> {
        let url = format!("{SITE_URL}/search0/{}", encode_keyword(keyword));
        let html = self.session.search_page(&url)?;
        parse_search_page(&html)
    }

    fn fetch(&self, locator: &Locator) -> Result<DownloadedArchive> {
        let page = self.session.page(&locator.link, None)?;
        let dtoken = {
            let document = Html::parse_document(&page);
            document
                .select(&css("button#down"))
                .next()
                .and_then(|button| button.value().attr("dtoken"))
                .map(str::to_string)
                .ok_or_else(|| anyhow!("no download token on {}", locator.link))?
        };
        let sub_id = locator
            .link
            .trim_end_matches('/')
            .rsplit('/')
            .next()
            .unwrap_or_default()
            .to_string();

        let body = self.session.post_form(
            &format!("{SITE_URL}/ajax/down_ajax"),
            &[("sub_id", sub_id.as_str()), ("dtoken", dtoken.as_str())],
            Some(&locator.link),
        )?;
        let download_url = parse_download_response(&body)?;
        self.session.download(&download_url, Some(&locator.link))
    }
}

fn parse_search_page(html: &str) -> Result<Vec<SubtitleCandidate>> {
    let document = Html::parse_document(html);

    let Some(summary) = document.select(&css("small")).next() else {
        let text = document.root_element().text().collect::<String>();
        if text.contains(DISALLOWED_CHARS) {
            debug!("SubHD rejected the keyword: {DISALLOWED_CHARS}");
        }
        // Captcha or error page
        return Ok(Vec::new());
    };
    if element_text(summary).contains("总共 0 条") {
        return Ok(Vec::new());
    }

    let mut candidates = Vec::new();
    for result in document.select(&css("div.box")) {
        let Some(link) = result.select(&css("div.d_title a")).next() else {
            continue;
        };
        let href = link.value().attr("href").unwrap_or_default();
        if !href.contains("/ar") {
            continue;
        }
        let name = element_text(link);
        let version = link
            .value()
            .attr("title")
            .map(str::to_string)
            .unwrap_or_else(|| name.clone());
        let box_text = result.text().collect::<String>();

        candidates.push(SubtitleCandidate {
            title: format!("[{}]{}", Site::SubHd.tag(), name),
            version,
            languages: LanguageFlags::from_text(&box_text),
            locator: Locator {
                site: Site::SubHd,
                link: absolute_url(SITE_URL, href)?,
                referer: None,
            },
        });
    }
    Ok(candidates)
}

fn parse_download_response(body: &str) -> Result<String> {
    let json: serde_json::Value = serde_json::from_str(body).map_err(anyhow::Error::from)?;
    if json.get("success").and_then(|v| v.as_bool()) == Some(false) {
        return Err(FetchError::ArchiveExtractionFailed(
            "SubHD refused the download".to_string(),
        ));
    }
    if let Some(url) = json.get("url").and_then(|v| v.as_str()) {
        return Ok(url.to_string());
    }
    DOWNLOAD_URL_RE
        .find(body)
        .map(|m| m.as_str().replace("\\/", "/"))
        .ok_or_else(|| FetchError::Other(anyhow!("no download url in SubHD response")))
}
