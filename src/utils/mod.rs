//! Utility functions

pub mod cover_art;
mod duration;
mod sanitize;

pub use duration::format_duration;
pub use sanitize::{sanitize_filename, track_file_name};
