use super::console::Console;
use super::fetcher::Outcome;
use crate::media::path::VideoFile;

/// Per-run tally of processed videos and the reasons failed ones failed.
#[derive(Debug, Default)]
pub struct FailureReport {
    total: usize,
    failures: Vec<(String, String)>,
}

impl FailureReport {
    pub fn record(&mut self, video: &VideoFile, outcome: &Outcome) {
        self.total += 1;
        if let Outcome::Failed(reason) = outcome {
            let path = video.directory.join(&video.name);
            self.failures
                .push((path.display().to_string(), reason.clone()));
        }
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    pub fn succeeded(&self) -> usize {
        self.total - self.failures.len()
    }

    pub fn print(&self, console: &Console) {
        if !self.failures.is_empty() {
            println!();
            println!("{}", "=".repeat(30) + " FAILED LIST " + &"=".repeat(30));
            for (i, (path, reason)) in self.failures.iter().enumerate() {
                println!("{:>3})  {}", i + 1, path);
                console.line(reason);
            }
        }
        println!();
        println!(
            "total: {}  success: {}  fail: {}",
            self.total(),
            self.succeeded(),
            self.failed()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn video(name: &str) -> VideoFile {
        VideoFile {
            name: name.to_string(),
            directory: PathBuf::from("/videos"),
            has_subtitle: false,
        }
    }

    #[test]
    fn test_report_counts() {
        let mut report = FailureReport::default();
        report.record(&video("a.mkv"), &Outcome::Done(vec![]));
        report.record(&video("b.mkv"), &Outcome::Skipped);
        report.record(&video("c.mkv"), &Outcome::Failed("no search results".into()));

        assert_eq!(report.total(), 3);
        assert_eq!(report.succeeded(), 2);
        assert_eq!(report.failed(), 1);
        assert_eq!(
            report.failures,
            vec![(
                PathBuf::from("/videos/c.mkv").display().to_string(),
                "no search results".to_string()
            )]
        );
    }
}
