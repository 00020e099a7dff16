//! Kino Embed CLI - Headless inspection of player embeds
//!
//! Features:
//! - Iframe source and target origin construction
//! - Viewport threshold parsing
//! - Placeholder markup rendering
//! - Inbound message classification and outbound command encoding

use clap::{Parser, Subcommand};
use kino_embed_core::EmbedAttributes;
use output::OutputFormat;
use tracing_subscriber::EnvFilter;

mod commands;
mod output;

/// Kino Embed CLI - Player embed toolkit
#[derive(Parser)]
#[command(name = "kino-embed-cli")]
#[command(author = "Purple Squirrel Media")]
#[command(version)]
#[command(about = "Inspect Kino iframe player embeds", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Output format (text, json)
    #[arg(short, long, default_value = "text")]
    format: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the iframe URL and target origin
    Source {
        /// Player api key (data-apikey)
        #[arg(long)]
        apikey: String,

        /// Video id (data-videoid)
        #[arg(long)]
        videoid: String,

        /// Player base URL override (data-iframe-src)
        #[arg(long)]
        iframe_src: Option<String>,

        /// Raw player config (data-config)
        #[arg(short, long)]
        config: Option<String>,

        /// Origin of the embedding page
        #[arg(long)]
        host_origin: Option<String>,
    },

    /// Parse the viewport autoplay threshold from a config string
    Viewport {
        /// Raw player config (data-config)
        config: String,

        /// Visibility ratio to test against the threshold
        #[arg(short, long)]
        ratio: Option<f64>,
    },

    /// Render the poster placeholder
    Placeholder {
        /// Poster image URL
        poster: String,

        /// Accessible label of the player
        #[arg(short, long)]
        aria_label: Option<String>,
    },

    /// Classify an inbound player message
    Classify {
        /// Message data as JSON
        message: String,
    },

    /// Encode an outbound control command
    Command {
        /// play, pause, mute, unmute, seek or viewport
        name: String,

        /// Seek position in seconds
        #[arg(long)]
        value: Option<f64>,

        /// Whether the player is in view (viewport)
        #[arg(long)]
        in_view: Option<bool>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let default = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)))
        .with_writer(std::io::stderr)
        .init();

    let format = OutputFormat::from(cli.format.as_str());

    match cli.command {
        Commands::Source { apikey, videoid, iframe_src, config, host_origin } => {
            let attrs = EmbedAttributes {
                api_key: Some(apikey),
                video_id: Some(videoid),
                iframe_src,
                config,
                ..Default::default()
            };
            commands::source(&attrs, host_origin.as_deref(), format)?;
        }
        Commands::Viewport { config, ratio } => {
            commands::viewport(&config, ratio, format)?;
        }
        Commands::Placeholder { poster, aria_label } => {
            commands::placeholder(&poster, aria_label.as_deref(), format)?;
        }
        Commands::Classify { message } => {
            commands::classify(&message, format)?;
        }
        Commands::Command { name, value, in_view } => {
            commands::command(&name, value, in_view, format)?;
        }
    }

    Ok(())
}
