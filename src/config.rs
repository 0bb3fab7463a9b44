use anyhow::{Context, Result};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_9_5) AppleWebKit/537.36 (KHTML, like Gecko) Chrome";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Timeout for search result pages
    pub search_timeout_secs: u64,
    /// Timeout for detail pages and archive downloads
    pub download_timeout_secs: u64,
    pub user_agent: String,
    /// Name extracted subtitles after the video instead of their archive name
    pub rename_to_video: bool,
    /// Candidates listed in query mode
    pub query_limit: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            search_timeout_secs: 10,
            download_timeout_secs: 60,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            rename_to_video: true,
            query_limit: 5,
        }
    }
}

/// Config file first, then environment overrides for the timeouts.
pub fn load_settings() -> Result<Settings> {
    let mut settings = read_config_file(&get_config_path())?;

    if let Ok(secs) = env::var("GETSUB_SEARCH_TIMEOUT") {
        settings.search_timeout_secs = secs
            .parse()
            .with_context(|| format!("GETSUB_SEARCH_TIMEOUT must be seconds, got {secs:?}"))?;
    }
    if let Ok(secs) = env::var("GETSUB_DOWNLOAD_TIMEOUT") {
        settings.download_timeout_secs = secs
            .parse()
            .with_context(|| format!("GETSUB_DOWNLOAD_TIMEOUT must be seconds, got {secs:?}"))?;
    }
    Ok(settings)
}

fn read_config_file(path: &Path) -> Result<Settings> {
    if !path.exists() {
        return Ok(Settings::default());
    }
    let content = fs::read_to_string(path)?;
    let settings = toml::from_str(&content)
        .with_context(|| format!("invalid config file {}", path.display()))?;
    Ok(settings)
}

fn get_config_dir_path() -> PathBuf {
    xdir::config()
        .map(|path| path.join("getsub"))
        // If the standard path could not be found (e.g.`$HOME` is not set),
        // default to the current directory.
        .unwrap_or_default()
}

pub fn get_config_path() -> PathBuf {
    get_config_dir_path().join("config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_config_file_uses_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let settings = read_config_file(&temp_dir.path().join("config.toml")).unwrap();
        assert_eq!(settings.search_timeout_secs, 10);
        assert_eq!(settings.download_timeout_secs, 60);
        assert!(settings.rename_to_video);
        assert_eq!(settings.query_limit, 5);
    }

    #[test]
    fn test_partial_config_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(&path, "search_timeout_secs = 20\nrename_to_video = false\n").unwrap();
        let settings = read_config_file(&path).unwrap();
        assert_eq!(settings.search_timeout_secs, 20);
        assert_eq!(settings.download_timeout_secs, 60);
        assert!(!settings.rename_to_video);
    }

    #[test]
    fn test_invalid_config_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(&path, "search_timeout_secs = \"soon\"").unwrap();
        assert!(read_config_file(&path).is_err());
    }
}
