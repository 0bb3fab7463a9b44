//! Per-video subtitle search, selection and extraction.
//!
//! A video goes through planning (identity and keywords), searching with
//! progressively shorter keyword lists, filtering by identity, selecting a
//! candidate and extracting the best subtitle from its archive. A candidate
//! that yields nothing is dropped and the next one is selected.

use std::path::PathBuf;

use tracing::{debug, warn};

use super::chooser::Chooser;
use super::console::Console;
use super::placer::{PlacementOptions, Placer};
use crate::domain::error::{FetchError, Result};
use crate::domain::models::{ArchiveEntry, IdentityRecord, SubtitleCandidate};
use crate::infra::downloaders::Downloader;
use crate::matching::keywords;
use crate::matching::scorer::Selection;
use crate::matching::similarity::jaccard_similarity;
use crate::matching::DefaultExtractor;
use crate::media::archive::ArchiveDecoder;
use crate::media::path::VideoFile;

const NO_GUESS_HINT: &str = "failed to guess one subtitle, use '-q' to try query mode.";

#[derive(Debug, Clone, Copy, Default)]
pub struct FetchOptions {
    /// Let the user pick among search results
    pub interactive: bool,
    /// Let the user pick the file inside the archive
    pub single: bool,
    pub overwrite: bool,
    pub save_original: bool,
    pub query_limit: usize,
    pub placement: PlacementOptions,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Done(Vec<PathBuf>),
    /// A subtitle already exists and overwriting was not requested
    Skipped,
    Failed(String),
}

pub struct SubtitleFetcher {
    extractor: DefaultExtractor,
    downloaders: Vec<Box<dyn Downloader>>,
    decoder: Box<dyn ArchiveDecoder>,
    placer: Box<dyn Placer>,
    chooser: Box<dyn Chooser>,
    console: Console,
    options: FetchOptions,
}

impl SubtitleFetcher {
    pub fn new(
        extractor: DefaultExtractor,
        downloaders: Vec<Box<dyn Downloader>>,
        decoder: Box<dyn ArchiveDecoder>,
        placer: Box<dyn Placer>,
        chooser: Box<dyn Chooser>,
        console: Console,
        options: FetchOptions,
    ) -> Self {
        Self {
            extractor,
            downloaders,
            decoder,
            placer,
            chooser,
            console,
            options,
        }
    }

    pub fn fetch(&mut self, video: &VideoFile) -> Outcome {
        if video.has_subtitle && !self.options.overwrite {
            self.console
                .line("subtitle already exists, add '-o' to replace it.");
            return Outcome::Skipped;
        }

        let identity = self.extractor.extract(&video.name);
        let plan = keywords::plan(&identity);
        debug!(?identity, ?plan, "Planned search");

        let candidates = match self.search(&identity, plan) {
            Ok(candidates) => candidates,
            Err(err) => return Outcome::Failed(err.to_string()),
        };
        self.extract_first_usable(video, &identity, candidates)
    }

    /// Runs keyword rounds, dropping the least specific keyword after every
    /// round that produced no matching candidate.
    fn search(
        &self,
        identity: &IdentityRecord,
        mut plan: Vec<String>,
    ) -> Result<Vec<SubtitleCandidate>> {
        let mut saw_results = false;

        while !plan.is_empty() {
            let keyword = plan.join(" ");
            self.console
                .line(format!("Searching use keyword: {}", keyword.trim()));

            let mut matched = Vec::new();
            for downloader in &self.downloaders {
                let site = downloader.site();
                match downloader.search(&keyword) {
                    Ok(found) => {
                        debug!(%site, count = found.len(), "Search results");
                        saw_results |= !found.is_empty();
                        for candidate in found {
                            if self.extractor.matches(&candidate.version, identity) {
                                matched.push(candidate);
                            } else {
                                debug!(%site, version = %candidate.version, "Search result does not match video");
                            }
                        }
                    }
                    Err(FetchError::DownloaderUnavailable { site, reason }) => {
                        debug!(%site, %reason, "Downloader unavailable");
                        self.console
                            .line(format!("{site} connect timeout, search next site."));
                    }
                    Err(err) => {
                        warn!(%site, error = %err, "Search failed");
                        self.console.line(format!("{site} search failed: {err}"));
                    }
                }
            }

            if !matched.is_empty() {
                return Ok(matched);
            }
            plan.pop();
        }

        Err(if saw_results {
            FetchError::NoMatchingSubtitle
        } else {
            FetchError::NoSearchResults
        })
    }

    fn extract_first_usable(
        &mut self,
        video: &VideoFile,
        identity: &IdentityRecord,
        mut candidates: Vec<SubtitleCandidate>,
    ) -> Outcome {
        while !candidates.is_empty() {
            let index = match self.select(video, &candidates) {
                Ok(index) => index,
                Err(err) => return Outcome::Failed(format!("selection aborted: {err}")),
            };
            let candidate = candidates.remove(index);
            self.console.line(format!("Get {}", candidate.title));

            match self.extract(video, identity, &candidate) {
                Ok(Some(written)) => {
                    for path in &written {
                        if let Some(name) = path.file_name() {
                            self.console.line(name.to_string_lossy());
                        }
                    }
                    return Outcome::Done(written);
                }
                Ok(None) => self.console.line("no matched subtitle in this archive"),
                Err(err) => {
                    warn!(candidate = %candidate.title, error = %err, "Candidate failed");
                    self.console.line(err.to_string());
                }
            }
        }
        Outcome::Failed(NO_GUESS_HINT.to_string())
    }

    /// Index of the candidate to try next; the first one unless interactive.
    fn select(&mut self, video: &VideoFile, candidates: &[SubtitleCandidate]) -> anyhow::Result<usize> {
        if !self.options.interactive {
            return Ok(0);
        }
        let options: Vec<String> = candidates
            .iter()
            .take(self.options.query_limit.max(1))
            .map(|c| {
                format!(
                    "{} {} ({}) {:.2}",
                    c.languages.badges(),
                    c.title,
                    c.version,
                    jaccard_similarity(&video.name, &c.version)
                )
            })
            .collect();
        self.chooser.choose(&options)
    }

    /// Anything that goes wrong for one candidate is reported as an
    /// extraction failure of that candidate only.
    fn extract(
        &mut self,
        video: &VideoFile,
        identity: &IdentityRecord,
        candidate: &SubtitleCandidate,
    ) -> Result<Option<Vec<PathBuf>>> {
        self.try_extract(video, identity, candidate)
            .map_err(|err| match err {
                FetchError::ArchiveExtractionFailed(_) => err,
                other => FetchError::ArchiveExtractionFailed(other.to_string()),
            })
    }

    fn try_extract(
        &mut self,
        video: &VideoFile,
        identity: &IdentityRecord,
        candidate: &SubtitleCandidate,
    ) -> Result<Option<Vec<PathBuf>>> {
        let site = candidate.locator.site;
        let mut archive = self
            .downloaders
            .iter()
            .find(|d| d.site() == site)
            .ok_or_else(|| FetchError::ArchiveExtractionFailed(format!("no downloader for {site}")))?
            .fetch(&candidate.locator)?;
        if archive.file_name.is_none() {
            archive.file_name = Some(format!("{}{}", candidate.version, archive.kind.extension()));
        }

        if self.options.save_original {
            self.placer.save_archive(
                video,
                &candidate.title,
                &archive,
                &self.options.placement,
            )?;
            self.console.line("save original file.");
        }

        let entries = self.decoder.decode(&archive)?;
        let Some(chosen) = self.choose_entry(identity, &entries)? else {
            return Ok(None);
        };
        let written = self
            .placer
            .place(video, chosen, &entries, &self.options.placement)?;
        Ok(Some(written))
    }

    fn choose_entry<'e>(
        &mut self,
        identity: &IdentityRecord,
        entries: &'e [ArchiveEntry],
    ) -> Result<Option<&'e ArchiveEntry>> {
        if entries.is_empty() {
            self.console.line("warn: no subtitle in this archive");
            return Ok(None);
        }

        if self.options.single {
            let names: Vec<String> = entries
                .iter()
                .map(|e| e.name.rsplit('/').next().unwrap_or(&e.name).to_string())
                .collect();
            let index = self.chooser.choose(&names)?;
            return Ok(entries.get(index));
        }

        let selection = self
            .extractor
            .best_subtitle(entries.iter().map(|e| e.name.as_str()), identity);
        Ok(match selection {
            Selection::Chosen(name) => entries.iter().find(|e| e.name == name),
            Selection::Empty => None,
            Selection::NoMatch => {
                debug!(count = entries.len(), "No archive entry matches the video");
                None
            }
        })
    }
}
