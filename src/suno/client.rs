//! Suno playlist metadata client

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;
use url::Url;

use super::models::*;

/// Default Suno API host
pub const DEFAULT_API_BASE: &str = "https://studio-api.prod.suno.com";

/// Upper bound on pages requested for one playlist
const MAX_PAGES: usize = 200;

/// Playlist metadata could not be retrieved
///
/// Deliberately opaque: callers only learn that the fetch failed and why, in prose.
#[derive(Debug, Error)]
#[error("failed to fetch playlist: {reason}")]
pub struct PlaylistFetchError {
    reason: String,
}

impl PlaylistFetchError {
    fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Source of playlist metadata
#[async_trait]
pub trait PlaylistSource: Send + Sync {
    /// Resolve a playlist link into its descriptor and ordered clip list
    async fn fetch_playlist(&self, url: &str) -> Result<PlaylistData, PlaylistFetchError>;
}

/// HTTP client for the Suno playlist API
#[derive(Clone)]
pub struct SunoClient {
    api_base: String,
    http_client: Client,
}

impl SunoClient {
    /// Create a new client against `api_base`
    pub fn new(api_base: &str, user_agent: &str, timeout: Duration) -> reqwest::Result<Self> {
        let http_client = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()?;

        Ok(Self::with_client(api_base, http_client))
    }

    pub fn with_client(api_base: &str, http_client: Client) -> Self {
        Self {
            api_base: api_base.trim_end_matches('/').to_string(),
            http_client,
        }
    }

    fn page_url(&self, playlist_id: &str, page: usize) -> String {
        format!("{}/api/playlist/{}/?page={}", self.api_base, playlist_id, page)
    }

    async fn get_page(&self, playlist_id: &str, page: usize) -> Result<PlaylistPage, PlaylistFetchError> {
        let url = self.page_url(playlist_id, page);
        debug!("Fetching playlist page {}: {}", page, url);

        let response = self
            .http_client
            .get(&url)
            .send()
            .await
            .map_err(|e| PlaylistFetchError::new(format!("request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(PlaylistFetchError::new(format!(
                "playlist service returned HTTP {}",
                response.status()
            )));
        }

        response
            .json()
            .await
            .map_err(|e| PlaylistFetchError::new(format!("invalid playlist response: {}", e)))
    }
}

#[async_trait]
impl PlaylistSource for SunoClient {
    async fn fetch_playlist(&self, url: &str) -> Result<PlaylistData, PlaylistFetchError> {
        let playlist_id = parse_playlist_id(url)?;

        let first = self.get_page(&playlist_id, 1).await?;
        let total = first.num_total_results;
        let playlist = Playlist {
            id: first.id,
            name: first.name,
        };

        let mut clips: Vec<Clip> = first
            .playlist_clips
            .into_iter()
            .map(|entry| entry.clip.into())
            .collect();

        let mut page = 1;
        while total.is_some_and(|total| clips.len() < total) && page < MAX_PAGES {
            page += 1;
            let next = self.get_page(&playlist_id, page).await?;
            if next.playlist_clips.is_empty() {
                break;
            }
            clips.extend(next.playlist_clips.into_iter().map(|entry| Clip::from(entry.clip)));
        }

        debug!("Playlist {} has {} clips", playlist.name, clips.len());
        Ok(PlaylistData { playlist, clips })
    }
}

/// Extract the playlist id from a `https://suno.com/playlist/<id>` link or a bare id
pub fn parse_playlist_id(input: &str) -> Result<String, PlaylistFetchError> {
    let input = input.trim();

    let Ok(url) = Url::parse(input) else {
        let is_bare_id = !input.is_empty()
            && input
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-');
        return if is_bare_id {
            Ok(input.to_string())
        } else {
            Err(PlaylistFetchError::new(format!("not a playlist link: {}", input)))
        };
    };

    let segments: Vec<&str> = url
        .path_segments()
        .map(|s| s.filter(|seg| !seg.is_empty()).collect())
        .unwrap_or_default();

    segments
        .iter()
        .position(|seg| *seg == "playlist")
        .and_then(|idx| segments.get(idx + 1))
        .map(|id| id.to_string())
        .ok_or_else(|| PlaylistFetchError::new(format!("no playlist id in link: {}", input)))
}
