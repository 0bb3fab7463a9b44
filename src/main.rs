mod cli;
mod config;
mod domain;
mod infra;
mod matching;
mod media;
mod workflows;

use anyhow::{bail, Result};
use clap::Parser;
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use cli::Cli;
use infra::downloaders::build_downloaders;
use matching::{IdentityExtractor, ReleaseNameGuesser};
use media::archive::ZipDecoder;
use media::path::collect_videos;
use workflows::chooser::PromptChooser;
use workflows::console::Console;
use workflows::fetcher::{FetchOptions, SubtitleFetcher};
use workflows::placer::{FsPlacer, PlacementOptions};
use workflows::report::FailureReport;

fn main() {
    let cli = Cli::parse();
    init_logging(cli.debug);

    if let Err(e) = run(cli) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

/// `--debug` wins over `RUST_LOG`; otherwise only warnings are shown.
fn init_logging(debug: bool) {
    let filter = if debug {
        EnvFilter::new("getsub=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let settings = config::load_settings()?;
    debug!(?settings, "Loaded settings");

    let videos = collect_videos(&cli.name)?;
    if videos.is_empty() {
        bail!("no video found in {}", cli.name.display());
    }

    let console = Console::default();
    let options = FetchOptions {
        interactive: cli.query,
        single: cli.single,
        overwrite: cli.over,
        save_original: cli.save_original,
        query_limit: cli.number.unwrap_or(settings.query_limit),
        placement: PlacementOptions {
            rename: settings.rename_to_video,
            plex: cli.plex,
            both: cli.both,
            delete_existing: cli.over,
        },
    };
    let mut fetcher = SubtitleFetcher::new(
        IdentityExtractor::new(ReleaseNameGuesser),
        build_downloaders(cli.downloader.map(Into::into), &settings)?,
        Box::new(ZipDecoder),
        Box::new(FsPlacer::new(console.clone())),
        Box::new(PromptChooser::new(console.clone())?),
        console.clone(),
        options,
    );

    if cli.over {
        println!("Replacing old subtitles with newly downloaded ones");
    }

    let mut report = FailureReport::default();
    for video in &videos {
        println!();
        println!("  ├ {}", video.name);
        let outcome = fetcher.fetch(video);
        report.record(video, &outcome);
    }
    report.print(&console);
    Ok(())
}
