//! Playlist download pipeline

pub mod engine;
pub mod fetcher;
pub mod sink;
pub mod tracker;

pub use engine::{CoverOutcome, PlaylistDownloader, RunSummary};
pub use fetcher::HttpFetcher;
pub use tracker::{ClipStatus, ClipStatusTracker};
