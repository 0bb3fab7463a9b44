use anyhow::anyhow;
use scraper::{ElementRef, Html};
use tracing::debug;

use super::{absolute_url, css, element_text, encode_keyword, Downloader, HttpSession};
use crate::domain::error::{FetchError, Result};
use crate::domain::models::{DownloadedArchive, LanguageFlags, Locator, Site, SubtitleCandidate};

const SITE_URL: &str = "http://www.zimuku.la";
const NO_RESULTS: &str = "搜索不到相关字幕";
/// Subtitles taken from each show on the aggregate result page
const PER_ITEM_LIMIT: usize = 3;

pub struct Zimuku {
    session: HttpSession,
}

impl Zimuku {
    pub fn new(session: HttpSession) -> Self {
        Self { session }
    }

    /// Follows a subtitle detail page to its download link.
    fn resolve_detail(&self, title: &str, detail_url: &str) -> Result<SubtitleCandidate> {
        let page = self.session.page(detail_url, None)?;
        let detail = parse_detail_page(&page)?;
        let intermediate = absolute_url(SITE_URL, &detail.download_page)?;

        // The first download link lands on a mirror chooser page
        let mirror_page = self.session.page(&intermediate, Some(detail_url))?;
        let link = first_mirror(&mirror_page)
            .map(|href| absolute_url(SITE_URL, &href))
            .transpose()?
            .unwrap_or(intermediate);

        Ok(SubtitleCandidate {
            title: format!("[{}]{}", Site::Zimuku.tag(), title),
            version: title.to_string(),
            languages: detail.languages,
            locator: Locator {
                site: Site::Zimuku,
                link,
                referer: Some(detail_url.to_string()),
            },
        })
    }
}

impl Downloader for Zimuku {
    fn site(&self) -> Site {
        Site::Zimuku
    }

    fn search(&self, keyword: &str) -> Result<Vec<SubtitleCandidate>> {
        let url = format!("{SITE_URL}/search?q={}", encode_keyword(keyword));
        let html = self.session.search_page(&url)?;
        if html.contains(NO_RESULTS) {
            return Ok(Vec::new());
        }

        let mut candidates = Vec::new();
        for (title, detail_url) in parse_search_page(&html)? {
            debug!(title = %title, url = %detail_url, "Resolving zimuku subtitle");
            candidates.push(self.resolve_detail(&title, &detail_url)?);
        }
        Ok(candidates)
    }

    fn fetch(&self, locator: &Locator) -> Result<DownloadedArchive> {
        self.session
            .download(&locator.link, locator.referer.as_deref())
    }
}

struct DetailPage {
    languages: LanguageFlags,
    download_page: String,
}

/// Title and detail page URL of every subtitle on a search result page.
fn parse_search_page(html: &str) -> Result<Vec<(String, String)>> {
    let document = Html::parse_document(html);
    let mut results = Vec::new();

    let items: Vec<ElementRef> = document.select(&css("div.item")).collect();
    if !items.is_empty() {
        for item in items {
            for cell in item.select(&css("td.first")).take(PER_ITEM_LIMIT) {
                let Some(link) = cell.select(&css("a")).next() else {
                    continue;
                };
                let href = link.value().attr("href").unwrap_or_default();
                results.push((element_text(link), absolute_url(SITE_URL, href)?));
            }
        }
        return Ok(results);
    }

    let persubs: Vec<ElementRef> = document.select(&css("div.persub")).collect();
    if !persubs.is_empty() {
        for persub in persubs {
            let Some(link) = persub.select(&css("h1 a")).next() else {
                continue;
            };
            let title = persub
                .select(&css("h1"))
                .next()
                .map(element_text)
                .unwrap_or_else(|| element_text(link));
            let href = link.value().attr("href").unwrap_or_default();
            results.push((title, absolute_url(SITE_URL, href)?));
        }
        return Ok(results);
    }

    Err(FetchError::Other(anyhow!(
        "unrecognized zimuku search page layout"
    )))
}

fn parse_detail_page(html: &str) -> Result<DetailPage> {
    let document = Html::parse_document(html);

    let mut languages = LanguageFlags::default();
    if let Some(info) = document.select(&css("ul.subinfo li")).next() {
        let flags: Vec<&str> = info
            .select(&css("img"))
            .filter_map(|img| img.value().attr("src"))
            .collect();
        if flags.is_empty() {
            languages = LanguageFlags::from_text(&element_text(info));
        }
        for src in flags {
            if src.contains("uk") {
                languages.english = true;
            } else if src.contains("hongkong") {
                languages.zh_traditional = true;
            } else if src.contains("china") {
                languages.zh_simplified = true;
            } else if src.contains("jollyroger") {
                languages.bilingual = true;
            }
        }
    }

    let download_page = document
        .select(&css("a#down1"))
        .next()
        .and_then(|a| a.value().attr("href"))
        .map(str::to_string)
        .ok_or_else(|| anyhow!("no download link on zimuku detail page"))?;

    Ok(DetailPage {
        languages,
        download_page,
    })
}

fn first_mirror(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let href = document
        .select(&css("a[rel=nofollow]"))
        .next()?
        .value()
        .attr("href")?;
    Some(href.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_aggregate_search_page() {
        let html = r#"
            <div class="item">
              <div class="title"><p>The Morning Show</p><p>晨间新闻</p></div>
              <table>
                <tr><td class="first"><a href="/detail/1.html">The.Morning.Show.S01E01</a></td></tr>
                <tr><td class="first"><a href="/detail/2.html">The.Morning.Show.S01E02</a></td></tr>
                <tr><td class="first"><a href="/detail/3.html">The.Morning.Show.S01E03</a></td></tr>
                <tr><td class="first"><a href="/detail/4.html">The.Morning.Show.S01E04</a></td></tr>
              </table>
            </div>
        "#;
        let results = parse_search_page(html).unwrap();
        assert_eq!(results.len(), 3);
        assert_eq!(
            results[0],
            (
                "The.Morning.Show.S01E01".to_string(),
                "http://www.zimuku.la/detail/1.html".to_string()
            )
        );
    }

    #[test]
    fn test_parse_persub_search_page() {
        let html = r#"
            <div class="persub"><h1><a href="/shooter/9.html">Show.S02E01.chs.srt</a></h1></div>
        "#;
        let results = parse_search_page(html).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].0, "Show.S02E01.chs.srt");
    }

    #[test]
    fn test_parse_unknown_layout_is_an_error() {
        assert!(parse_search_page("<html><body>?</body></html>").is_err());
    }

    #[test]
    fn test_parse_detail_page_flags() {
        let html = r#"
            <ul class="subinfo"><li>
              <img src="/static/flag/china.gif"><img src="/static/flag/uk.gif">
            </li></ul>
            <a id="down1" href="/dld/1.html">下载</a>
        "#;
        let detail = parse_detail_page(html).unwrap();
        assert!(detail.languages.zh_simplified);
        assert!(detail.languages.english);
        assert!(!detail.languages.zh_traditional);
        assert_eq!(detail.download_page, "/dld/1.html");
    }

    #[test]
    fn test_first_mirror() {
        let html = r#"<a href="/x">home</a><a rel="nofollow" href="/download/abc">电信</a>"#;
        assert_eq!(first_mirror(html).as_deref(), Some("/download/abc"));
        assert_eq!(first_mirror("<p></p>"), None);
    }
}
