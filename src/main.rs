//! sunodl - Download Suno playlists as tagged MP3 files

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod cli;
mod config;
mod download;
mod suno;
mod utils;

#[cfg(test)]
mod testing;

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        "sunodl=debug,reqwest=debug"
    } else {
        "sunodl=info"
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    match cli.command {
        Commands::Download {
            url,
            output,
            api_base,
            cover_size,
        } => {
            cli::commands::download(url, output, api_base, cover_size).await?;
        }
        Commands::Info { url, api_base } => {
            cli::commands::info(url, api_base).await?;
        }
        Commands::Embed {
            audio,
            image,
            cover_size,
        } => {
            cli::commands::embed(audio, image, cover_size).await?;
        }
        Commands::Completion { shell } => {
            cli::commands::completion(shell);
        }
    }

    Ok(())
}
