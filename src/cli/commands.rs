//! CLI command handlers

use anyhow::{Context, Result};
use clap_complete::generate;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};

use crate::config::Settings;
use crate::download::{
    ClipStatus, ClipStatusTracker, CoverOutcome, HttpFetcher, PlaylistDownloader, RunSummary,
};
use crate::suno::{Clip, PlaylistData, PlaylistSource, SunoClient};
use crate::utils::cover_art::{LoftyEmbedder, TagEmbedder};
use crate::utils::format_duration;

/// Handle the `download` command
pub async fn download(
    url: String,
    output: Option<PathBuf>,
    api_base: Option<String>,
    cover_size: Option<u32>,
) -> Result<()> {
    let settings = Settings::load()?;

    let output_root = settings.resolve_output_dir(output);
    if !output_root.is_dir() {
        anyhow::bail!(
            "Output folder {} does not exist. Create it or pass --output.",
            output_root.display()
        );
    }

    let data = fetch_playlist(&settings, api_base, &url).await?;
    println!(
        "{} ({} songs)",
        data.playlist.name.green().bold(),
        data.clips.len()
    );

    let fetcher = HttpFetcher::new(settings.timeout()).context("Failed to create HTTP client")?;
    let embedder = LoftyEmbedder::new(cover_size.or(settings.cover_max_size));
    let downloader = PlaylistDownloader::new(fetcher, embedder);

    let mut tracker = ClipStatusTracker::new(&data.clips);
    if tracker.is_empty() {
        println!("{}", "Playlist has no songs.".yellow());
    }
    let progress = progress_bar(tracker.len());
    attach_progress(&mut tracker, &data.clips, progress.clone());

    let result = downloader
        .run(&data.playlist, &data.clips, &output_root, &mut tracker)
        .await;
    progress.finish_and_clear();

    let summary = result?;
    print_summary(&summary);

    Ok(())
}

/// Handle the `info` command
pub async fn info(url: String, api_base: Option<String>) -> Result<()> {
    let settings = Settings::load()?;
    let data = fetch_playlist(&settings, api_base, &url).await?;

    let total: f64 = data.clips.iter().map(|c| c.duration).sum();
    println!(
        "{} {} - {} songs, {}",
        data.playlist.name.green().bold(),
        format!("({})", data.playlist.id).dimmed(),
        data.clips.len(),
        format_duration(total)
    );
    println!();

    for (idx, clip) in data.clips.iter().enumerate() {
        let version = if clip.model_version.is_empty() {
            String::new()
        } else {
            format!(" [{}]", clip.model_version).cyan().to_string()
        };
        println!(
            "  {:>2}. {}{}  {}",
            idx + 1,
            clip.title.bold(),
            version,
            format_duration(clip.duration)
        );
        if !clip.tags.is_empty() {
            println!("      {}", clip.tags.dimmed());
        }
    }

    Ok(())
}

/// Handle the `embed` command
pub async fn embed(audio: PathBuf, image: PathBuf, cover_size: Option<u32>) -> Result<()> {
    let settings = Settings::load()?;
    let embedder = LoftyEmbedder::new(cover_size.or(settings.cover_max_size));

    embedder
        .embed(&audio, &image)
        .await
        .with_context(|| format!("Failed to embed cover art in {}", audio.display()))?;

    println!("{} {}", "Cover art embedded:".green(), audio.display());
    Ok(())
}

/// Handle the `completion` command
pub fn completion(shell: clap_complete::Shell) {
    let mut cmd = <super::Cli as clap::CommandFactory>::command();
    generate(shell, &mut cmd, "sunodl", &mut io::stdout());
}

async fn fetch_playlist(
    settings: &Settings,
    api_base: Option<String>,
    url: &str,
) -> Result<PlaylistData> {
    let api_base = api_base.unwrap_or_else(|| settings.api_base.clone());
    let client = SunoClient::new(&api_base, &settings.user_agent, settings.timeout())
        .context("Failed to create HTTP client")?;

    println!("{}", "Fetching playlist...".cyan());
    client
        .fetch_playlist(url)
        .await
        .context("Make sure you entered a valid playlist link")
}

fn progress_bar(len: usize) -> ProgressBar {
    let progress = ProgressBar::new(len as u64);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .expect("progress template is valid")
            .progress_chars("#>-"),
    );
    progress
}

/// Drive the progress bar from tracker transitions
fn attach_progress(tracker: &mut ClipStatusTracker, clips: &[Clip], progress: ProgressBar) {
    let titles: HashMap<String, String> = clips
        .iter()
        .map(|clip| (clip.id.clone(), clip.title.clone()))
        .collect();

    tracker.subscribe(move |change| {
        let title = titles
            .get(&change.clip_id)
            .map(String::as_str)
            .unwrap_or_default();

        match change.status {
            ClipStatus::Processing => {
                progress.set_message(format!("{:02} - {}", change.ordinal, title));
            }
            ClipStatus::Error => {
                progress.println(format!("  {} {:02} - {}", "failed".red(), change.ordinal, title));
            }
            ClipStatus::Pending | ClipStatus::Success => {}
        }
        if change.status.is_terminal() {
            progress.inc(1);
        }
    });
}

fn print_summary(summary: &RunSummary) {
    let without_cover: Vec<&Path> = summary
        .reports
        .iter()
        .filter(|r| r.cover.is_some_and(|c| c != CoverOutcome::Embedded))
        .filter_map(|r| r.path.as_deref())
        .collect();

    println!();
    if summary.failed() == 0 {
        println!("{}", "Playlist downloaded successfully".green().bold());
    } else {
        println!("{}", "Playlist downloaded with errors".yellow().bold());
    }
    println!("  Saved to: {}", display_dir(&summary.output_dir));
    println!("  Songs downloaded: {}", summary.succeeded());
    println!("  Cover art embedded: {}", summary.covers_embedded());
    if !without_cover.is_empty() {
        println!("  Songs without cover art: {}", without_cover.len());
        for path in &without_cover {
            let name = path.file_name().unwrap_or_default().to_string_lossy();
            println!("    {}", name.dimmed());
        }
    }

    if summary.failed() > 0 {
        println!("  {}: {}", "Failed".red(), summary.failed());
        for report in summary.reports.iter().filter(|r| r.status == ClipStatus::Error) {
            println!(
                "    {:02} - {}: {}",
                report.ordinal,
                report.title,
                report.error.as_deref().unwrap_or("unknown error")
            );
        }
        if summary.reports.iter().any(|r| r.retryable) {
            println!("  Some songs failed because of network errors; run the command again to retry.");
        }
    }
}

fn display_dir(path: &Path) -> String {
    path.canonicalize()
        .unwrap_or_else(|_| path.to_path_buf())
        .display()
        .to_string()
}
