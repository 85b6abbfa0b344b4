//! Playlist download orchestration
//!
//! Clips are processed strictly one after another. Each clip goes through
//! audio fetch, audio write, then best-effort cover fetch and embed. A failure
//! is confined to its clip: it lands in the tracker as `Error` and the loop
//! moves on. Only failing to prepare the output directories aborts a run.

use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::download::fetcher::{AssetFetcher, FetchError};
use crate::download::sink::{FileSink, SinkError};
use crate::download::tracker::{ClipStatus, ClipStatusTracker};
use crate::suno::{Clip, Playlist};
use crate::utils::cover_art::TagEmbedder;
use crate::utils::{sanitize_filename, track_file_name};

/// Extension of written audio files
pub const AUDIO_EXTENSION: &str = "mp3";

/// Scratch directory for cover downloads, relative to the output root
pub const TMP_DIR_NAME: &str = "tmp";

const COVER_EXTENSION: &str = "jpg";

/// A run could not start
#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("could not prepare output directories: {0}")]
    DirectoryCreate(#[source] SinkError),
}

/// Why a single clip ended in `Error`
#[derive(Debug, Error)]
pub enum ClipError {
    #[error("audio download failed: {0}")]
    AudioFetch(#[source] FetchError),

    #[error("audio could not be saved: {0}")]
    AudioWrite(#[source] SinkError),
}

impl ClipError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, ClipError::AudioFetch(e) if e.is_transport())
    }
}

/// What happened to a clip's cover art
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoverOutcome {
    Embedded,
    /// The clip has no image URL
    Missing,
    FetchFailed,
    WriteFailed,
    EmbedFailed,
}

/// A clip whose audio was delivered
#[derive(Debug, Clone)]
pub struct ClipOutcome {
    pub path: PathBuf,
    pub cover: CoverOutcome,
}

/// Final record for one clip of a run
#[derive(Debug, Clone)]
pub struct ClipReport {
    pub ordinal: usize,
    pub title: String,
    pub status: ClipStatus,
    pub path: Option<PathBuf>,
    pub cover: Option<CoverOutcome>,
    pub error: Option<String>,
    /// The failure was a network problem; running again may fix it
    pub retryable: bool,
}

/// Result of a completed run
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub output_dir: PathBuf,
    pub reports: Vec<ClipReport>,
}

impl RunSummary {
    pub fn succeeded(&self) -> usize {
        self.count_status(ClipStatus::Success)
    }

    pub fn failed(&self) -> usize {
        self.count_status(ClipStatus::Error)
    }

    pub fn covers_embedded(&self) -> usize {
        self.reports
            .iter()
            .filter(|r| r.cover == Some(CoverOutcome::Embedded))
            .count()
    }

    fn count_status(&self, status: ClipStatus) -> usize {
        self.reports.iter().filter(|r| r.status == status).count()
    }
}

/// Downloads a playlist's clips into a directory of tagged audio files
pub struct PlaylistDownloader<F, E> {
    fetcher: F,
    embedder: E,
    sink: FileSink,
}

impl<F: AssetFetcher, E: TagEmbedder> PlaylistDownloader<F, E> {
    pub fn new(fetcher: F, embedder: E) -> Self {
        Self {
            fetcher,
            embedder,
            sink: FileSink::new(),
        }
    }

    /// Download every clip of `playlist` under `output_root`
    ///
    /// Writes `<root>/<playlist name>/NN - <title>.mp3` per clip and uses
    /// `<root>/tmp` for cover downloads, removing it when the loop ends.
    /// Concurrent runs against the same root are not supported.
    pub async fn run(
        &self,
        playlist: &Playlist,
        clips: &[Clip],
        output_root: &Path,
        tracker: &mut ClipStatusTracker,
    ) -> Result<RunSummary, DownloadError> {
        let dir_name = sanitize_filename(&playlist.name);
        let output_dir = output_root.join(&dir_name);
        let tmp_dir = output_root.join(tmp_dir_name(&dir_name));

        self.sink
            .ensure_dir(&output_dir)
            .await
            .map_err(DownloadError::DirectoryCreate)?;
        self.sink
            .ensure_dir(&tmp_dir)
            .await
            .map_err(DownloadError::DirectoryCreate)?;

        info!(
            "Downloading playlist: {} ({} clips) to {}",
            playlist.name,
            clips.len(),
            output_dir.display()
        );

        let mut reports = Vec::with_capacity(clips.len());

        for (idx, clip) in clips.iter().enumerate() {
            let ordinal = idx + 1;
            tracker.set_status(&clip.id, ClipStatus::Processing);

            let result = self.process_clip(clip, ordinal, &output_dir, &tmp_dir).await;
            let report = match result {
                Ok(outcome) => {
                    tracker.set_status(&clip.id, ClipStatus::Success);
                    ClipReport {
                        ordinal,
                        title: clip.title.clone(),
                        status: ClipStatus::Success,
                        path: Some(outcome.path),
                        cover: Some(outcome.cover),
                        error: None,
                        retryable: false,
                    }
                }
                Err(e) => {
                    warn!("Clip {} ({}) failed: {}", ordinal, clip.title, e);
                    tracker.set_status(&clip.id, ClipStatus::Error);
                    ClipReport {
                        ordinal,
                        title: clip.title.clone(),
                        status: ClipStatus::Error,
                        path: None,
                        cover: None,
                        error: Some(e.to_string()),
                        retryable: e.is_retryable(),
                    }
                }
            };
            reports.push(report);
        }

        if let Err(e) = self.sink.delete_recursive(&tmp_dir).await {
            warn!("Failed to remove temporary directory: {}", e);
        }

        let summary = RunSummary {
            output_dir,
            reports,
        };
        info!(
            "Playlist finished: {} downloaded, {} failed",
            summary.succeeded(),
            summary.failed()
        );
        Ok(summary)
    }

    async fn process_clip(
        &self,
        clip: &Clip,
        ordinal: usize,
        output_dir: &Path,
        tmp_dir: &Path,
    ) -> Result<ClipOutcome, ClipError> {
        debug!("Processing clip {}: {}", ordinal, clip.title);

        let audio = self
            .fetcher
            .fetch(&clip.audio_url)
            .await
            .map_err(ClipError::AudioFetch)?;

        let path = output_dir.join(track_file_name(ordinal, &clip.title, AUDIO_EXTENSION));
        self.sink
            .write(&path, &audio)
            .await
            .map_err(ClipError::AudioWrite)?;

        let cover = self.attach_cover(clip, &path, tmp_dir).await;
        Ok(ClipOutcome { path, cover })
    }

    /// Fetch and embed cover art; never fails the clip
    async fn attach_cover(&self, clip: &Clip, audio_path: &Path, tmp_dir: &Path) -> CoverOutcome {
        if clip.image_url.trim().is_empty() {
            debug!("No cover art for: {}", clip.title);
            return CoverOutcome::Missing;
        }

        let image = match self.fetcher.fetch(&clip.image_url).await {
            Ok(image) => image,
            Err(e) => {
                warn!("Failed to download cover art for {}: {}", clip.title, e);
                return CoverOutcome::FetchFailed;
            }
        };

        let image_path = tmp_dir.join(format!("{}.{}", sanitize_filename(&clip.id), COVER_EXTENSION));
        if let Err(e) = self.sink.write(&image_path, &image).await {
            warn!("Failed to stage cover art for {}: {}", clip.title, e);
            return CoverOutcome::WriteFailed;
        }

        match self.embedder.embed(audio_path, &image_path).await {
            Ok(()) => CoverOutcome::Embedded,
            Err(e) => {
                warn!("Failed to embed cover art in {}: {}", clip.title, e);
                CoverOutcome::EmbedFailed
            }
        }
    }
}

/// Name of the scratch directory for a playlist folder named `dir_name`
///
/// Normally `tmp`. A playlist that sanitizes to `tmp` (in any case, for
/// case-insensitive filesystems) gets `tmp-1`, `tmp-2`, ... instead, since the
/// scratch directory is deleted after the run.
fn tmp_dir_name(dir_name: &str) -> String {
    let mut candidate = TMP_DIR_NAME.to_string();
    let mut suffix = 0;
    while candidate.eq_ignore_ascii_case(dir_name) {
        suffix += 1;
        candidate = format!("{}-{}", TMP_DIR_NAME, suffix);
    }
    candidate
}
