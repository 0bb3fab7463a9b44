//! Subtitle site scrapers.
//!
//! Each site implements [`Downloader`]: `search` turns a keyword into
//! candidates, `fetch` downloads the archive a candidate's locator points at.

use std::time::Duration;

use reqwest::blocking::{Client, RequestBuilder};
use reqwest::header::{self, HeaderMap, HeaderValue};
use scraper::{ElementRef, Selector};
use tracing::debug;

use crate::config::Settings;
use crate::domain::error::{FetchError, Result};
use crate::domain::models::{ArchiveKind, DownloadedArchive, Locator, Site, SubtitleCandidate};

pub mod subhd;
pub mod zimuku;
pub mod zimuzu;

pub trait Downloader {
    fn site(&self) -> Site;

    fn search(&self, keyword: &str) -> Result<Vec<SubtitleCandidate>>;

    fn fetch(&self, locator: &Locator) -> Result<DownloadedArchive>;
}

/// Downloaders in search order, optionally restricted to one site.
pub fn build_downloaders(
    only: Option<Site>,
    settings: &Settings,
) -> anyhow::Result<Vec<Box<dyn Downloader>>> {
    let sites = match only {
        Some(site) => vec![site],
        None => vec![Site::SubHd, Site::Zimuzu, Site::Zimuku],
    };
    sites
        .into_iter()
        .map(|site| -> anyhow::Result<Box<dyn Downloader>> {
            let session = HttpSession::new(site, settings)?;
            Ok(match site {
                Site::SubHd => Box::new(subhd::SubHd::new(session)),
                Site::Zimuzu => Box::new(zimuzu::Zimuzu::new(session)),
                Site::Zimuku => Box::new(zimuku::Zimuku::new(session)),
            })
        })
        .collect()
}

/// A browser-like blocking client shared by all requests to one site.
pub struct HttpSession {
    site: Site,
    client: Client,
    search_timeout: Duration,
    download_timeout: Duration,
}

impl HttpSession {
    pub fn new(site: Site, settings: &Settings) -> anyhow::Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(header::USER_AGENT, HeaderValue::from_str(&settings.user_agent)?);
        headers.insert(
            header::ACCEPT_LANGUAGE,
            HeaderValue::from_static("zh-CN,zh;q=0.8"),
        );
        headers.insert(
            header::ACCEPT,
            HeaderValue::from_static(
                "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8",
            ),
        );
        let client = Client::builder()
            .default_headers(headers)
            .cookie_store(true)
            .build()?;

        Ok(Self {
            site,
            client,
            search_timeout: Duration::from_secs(settings.search_timeout_secs),
            download_timeout: Duration::from_secs(settings.download_timeout_secs),
        })
    }

    /// Search result pages use the short timeout.
    pub fn search_page(&self, url: &str) -> Result<String> {
        self.text(self.client.get(url).timeout(self.search_timeout))
    }

    pub fn page(&self, url: &str, referer: Option<&str>) -> Result<String> {
        let request = self.client.get(url).timeout(self.download_timeout);
        self.text(with_referer(request, referer))
    }

    pub fn post_form(&self, url: &str, form: &[(&str, &str)], referer: Option<&str>) -> Result<String> {
        let request = self.client.post(url).form(form).timeout(self.download_timeout);
        self.text(with_referer(request, referer))
    }

    /// Downloads a file, inferring the archive kind from the
    /// Content-Disposition header or the URL.
    pub fn download(&self, url: &str, referer: Option<&str>) -> Result<DownloadedArchive> {
        debug!(site = %self.site, url, "Downloading subtitle archive");
        let request = with_referer(self.client.get(url).timeout(self.download_timeout), referer);
        let response = request
            .send()
            .and_then(|r| r.error_for_status())
            .map_err(|e| FetchError::from_http(self.site.tag(), e))?;

        let disposition = response
            .headers()
            .get(header::CONTENT_DISPOSITION)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        let final_url = response.url().to_string();
        let content = response
            .bytes()
            .map_err(|e| FetchError::from_http(self.site.tag(), e))?
            .to_vec();

        let kind = match ArchiveKind::sniff(&disposition) {
            ArchiveKind::Unknown => ArchiveKind::sniff(&final_url),
            kind => kind,
        };
        let file_name = download_file_name(&disposition, &final_url);
        debug!(site = %self.site, ?kind, ?file_name, "Downloaded subtitle archive");
        Ok(DownloadedArchive {
            kind,
            content,
            file_name,
        })
    }

    fn text(&self, request: RequestBuilder) -> Result<String> {
        request
            .send()
            .and_then(|r| r.error_for_status())
            .and_then(|r| r.text())
            .map_err(|e| FetchError::from_http(self.site.tag(), e))
    }
}

fn with_referer(request: RequestBuilder, referer: Option<&str>) -> RequestBuilder {
    match referer {
        Some(referer) => request.header(header::REFERER, referer),
        None => request,
    }
}

/// File name from a Content-Disposition header, else the last URL path segment
/// when it has an extension.
fn download_file_name(disposition: &str, url: &str) -> Option<String> {
    let from_header = disposition.split(';').find_map(|part| {
        let (key, value) = part.trim().split_once('=')?;
        match key.trim().to_lowercase().as_str() {
            "filename*" => value.rsplit_once("''").map(|(_, name)| name.to_string()),
            "filename" => Some(value.trim_matches('"').to_string()),
            _ => None,
        }
    });
    let raw = from_header.or_else(|| {
        let url = reqwest::Url::parse(url).ok()?;
        let segment = url.path_segments()?.last()?.to_string();
        segment.contains('.').then_some(segment)
    })?;
    let name = urlencoding::decode(&raw).map(|n| n.into_owned()).unwrap_or(raw);
    let name = name.rsplit(['/', '\\']).next().unwrap_or_default().trim().to_string();
    (!name.is_empty()).then_some(name)
}

pub(crate) fn css(selector: &str) -> Selector {
    Selector::parse(selector).unwrap()
}

pub(crate) fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

pub(crate) fn absolute_url(base: &str, href: &str) -> Result<String> {
    let base = reqwest::Url::parse(base).map_err(anyhow::Error::from)?;
    let joined = base.join(href).map_err(anyhow::Error::from)?;
    Ok(joined.to_string())
}

pub(crate) fn encode_keyword(keyword: &str) -> String {
    urlencoding::encode(keyword.trim()).into_owned()
}
