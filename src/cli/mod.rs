//! CLI module for sunodl

use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub mod commands;

#[derive(Parser, Debug)]
#[command(name = "sunodl", about = "Download Suno playlists as tagged MP3 files")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Download every song of a playlist
    Download {
        /// Playlist link (https://suno.com/playlist/<id>) or playlist id
        #[arg(value_name = "PLAYLIST")]
        url: String,

        /// Folder the playlist folder is created in (defaults to your music folder)
        #[arg(short, long, env = "SUNODL_OUTPUT")]
        output: Option<PathBuf>,

        /// Playlist API base URL
        #[arg(long, env = "SUNODL_API_BASE")]
        api_base: Option<String>,

        /// Downsize embedded cover art to fit this many pixels per side
        #[arg(long, value_name = "PIXELS")]
        cover_size: Option<u32>,
    },

    /// List the songs of a playlist without downloading
    Info {
        /// Playlist link or playlist id
        #[arg(value_name = "PLAYLIST")]
        url: String,

        /// Playlist API base URL
        #[arg(long, env = "SUNODL_API_BASE")]
        api_base: Option<String>,
    },

    /// Embed an image as the cover art of an existing audio file
    Embed {
        /// Audio file to modify in place
        audio: PathBuf,

        /// Cover image (JPEG, PNG, GIF, BMP or TIFF)
        image: PathBuf,

        /// Downsize the cover to fit this many pixels per side
        #[arg(long, value_name = "PIXELS")]
        cover_size: Option<u32>,
    },

    /// Generate shell completions
    Completion {
        /// Shell to generate completions for
        shell: clap_complete::Shell,
    },
}
