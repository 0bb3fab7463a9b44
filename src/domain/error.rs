use thiserror::Error;

pub type Result<T> = std::result::Result<T, FetchError>;

/// Failures that can happen while fetching subtitles for one video.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Every keyword round came back empty
    #[error("no search results")]
    NoSearchResults,

    /// Search succeeded but no candidate matched the video
    #[error("no search result matched the video")]
    NoMatchingSubtitle,

    /// Downloading, decoding or writing one archive failed
    #[error("archive extraction failed: {0}")]
    ArchiveExtractionFailed(String),

    /// Timeout or connection failure, scoped to one site
    #[error("{site} is unavailable: {reason}")]
    DownloaderUnavailable { site: String, reason: String },

    /// Non-numeric or out-of-range answer at a prompt
    #[error("invalid choice: {0}")]
    InvalidUserChoice(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl FetchError {
    /// Splits network errors into the recoverable "site unavailable" kind and
    /// everything else.
    pub fn from_http(site: &str, err: reqwest::Error) -> Self {
        if err.is_timeout() || err.is_connect() {
            FetchError::DownloaderUnavailable {
                site: site.to_string(),
                reason: err.to_string(),
            }
        } else {
            FetchError::Other(anyhow::Error::new(err).context(format!("{site} request failed")))
        }
    }
}
