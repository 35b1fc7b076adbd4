//! imgur-dl command line: download each album URL given as an argument.

use clap::Parser;
use imgur_dl::{Config, Event, ImgurDownloader};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::io::Write;
use std::process::ExitCode;
use tokio::sync::broadcast::{self, error::RecvError};

const BAR_TEMPLATE: &str = "{prefix:<5} {percent:>3}%|{bar:40}| {pos}/{len} [{elapsed}<{eta}]";
const BYTES_TEMPLATE: &str =
    "{prefix:<5} {percent:>3}%|{bar:40}| {bytes}/{total_bytes} [{elapsed}<{eta}, {bytes_per_sec}]";

#[derive(Parser, Debug)]
#[command(author, version, about = "Download Imgur albums", long_about = None)]
struct Args {
    /// Album URLs (or bare album identifiers)
    #[arg(required = true, value_name = "URL")]
    urls: Vec<String>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let multi = MultiProgress::new();
    let log_bars = multi.clone();
    tracing_subscriber::fmt()
        .with_writer(move || ProgressWriter(log_bars.clone()))
        .with_target(false)
        .with_max_level(tracing::Level::INFO)
        .init();

    let downloader = match ImgurDownloader::new(Config::default()) {
        Ok(downloader) => downloader,
        Err(e) => {
            tracing::error!("{}", e.report());
            return ExitCode::FAILURE;
        }
    };

    let progress = tokio::spawn(render_progress(multi, downloader.subscribe()));
    let summary = downloader.run(&args.urls).await;

    // Closing the channel ends the progress task once it has drained.
    drop(downloader);
    progress.await.ok();

    if summary.all_succeeded() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

/// Log sink that hides the progress bars while a line is written to stderr
struct ProgressWriter(MultiProgress);

impl Write for ProgressWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.suspend(|| std::io::stderr().write(buf))
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.0.suspend(|| std::io::stderr().flush())
    }
}

fn style(template: &str) -> ProgressStyle {
    ProgressStyle::with_template(template)
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏ ")
}

/// Draw one bar for images in the album and one for bytes of the current image
async fn render_progress(multi: MultiProgress, mut events: broadcast::Receiver<Event>) {
    let mut album_bar: Option<ProgressBar> = None;
    let mut image_bar: Option<ProgressBar> = None;

    loop {
        let event = match events.recv().await {
            Ok(event) => event,
            Err(RecvError::Lagged(_)) => continue,
            Err(RecvError::Closed) => break,
        };

        match event {
            Event::ManifestSaved { count, .. } => {
                let bar = multi.add(ProgressBar::new(count));
                bar.set_style(style(BAR_TEMPLATE));
                bar.set_prefix("img");
                album_bar = Some(bar);
            }
            Event::ImageStarted { expected_bytes, .. } => {
                let bar = multi.add(ProgressBar::new(expected_bytes));
                bar.set_style(style(BYTES_TEMPLATE));
                bar.set_prefix("b");
                if let Some(old) = image_bar.replace(bar) {
                    old.finish_and_clear();
                }
            }
            Event::ImageProgress { received_bytes, .. } => {
                if let Some(bar) = &image_bar {
                    bar.set_position(received_bytes);
                }
            }
            Event::ImageComplete { .. } | Event::ImageFailed { .. } => {
                if let Some(bar) = image_bar.take() {
                    bar.finish_and_clear();
                }
            }
            Event::AlbumProgress { completed, .. } => {
                if let Some(bar) = &album_bar {
                    bar.set_position(completed as u64);
                }
            }
            Event::AlbumComplete { .. } | Event::AlbumFailed { .. } => {
                if let Some(bar) = image_bar.take() {
                    bar.finish_and_clear();
                }
                if let Some(bar) = album_bar.take() {
                    bar.finish();
                }
            }
            Event::AlbumStarted { .. } => {}
        }
    }
}
