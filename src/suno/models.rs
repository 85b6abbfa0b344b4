//! Playlist and clip models, plus the Suno API response shapes they come from

use serde::{Deserialize, Serialize};

/// A playlist descriptor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Playlist {
    pub id: String,
    pub name: String,
}

/// One track of a playlist
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Clip {
    pub id: String,
    pub title: String,
    /// Free-text style descriptors
    pub tags: String,
    pub model_version: String,
    /// Length in seconds
    pub duration: f64,
    pub audio_url: String,
    /// May be empty when the service has no artwork
    pub image_url: String,
}

/// A playlist with its clips in playlist order
#[derive(Debug, Clone, PartialEq)]
pub struct PlaylistData {
    pub playlist: Playlist,
    pub clips: Vec<Clip>,
}

// Suno playlist endpoint (`/api/playlist/{id}/?page=N`)
#[derive(Debug, Clone, Deserialize)]
pub struct PlaylistPage {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub playlist_clips: Vec<PlaylistClipEntry>,
    #[serde(default)]
    pub num_total_results: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlaylistClipEntry {
    pub clip: ClipResponse,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ClipResponse {
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub audio_url: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub image_large_url: Option<String>,
    #[serde(default)]
    pub major_model_version: Option<String>,
    #[serde(default)]
    pub metadata: ClipMetadata,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClipMetadata {
    #[serde(default)]
    pub tags: Option<String>,
    #[serde(default)]
    pub duration: Option<f64>,
}

impl From<ClipResponse> for Clip {
    fn from(clip: ClipResponse) -> Self {
        let title = clip
            .title
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| "Untitled".to_string());

        Self {
            title,
            tags: clip.metadata.tags.unwrap_or_default(),
            model_version: clip.major_model_version.unwrap_or_default(),
            duration: clip.metadata.duration.unwrap_or(0.0).max(0.0),
            audio_url: clip.audio_url.unwrap_or_default(),
            // Prefer the large artwork when both are present
            image_url: clip
                .image_large_url
                .or(clip.image_url)
                .unwrap_or_default(),
            id: clip.id,
        }
    }
}
