//! Suno playlist metadata module

pub mod client;
pub mod models;

pub use client::{PlaylistSource, SunoClient, DEFAULT_API_BASE};
pub use models::{Clip, Playlist, PlaylistData};
