//! Media Browser CLI
//!
//! Serves a media directory tree over HTTP, or prints listings and scans as
//! JSON.

use anyhow::Context;
use clap::{Parser, Subcommand};
use env_logger::Env;
use log::info;
use std::net::SocketAddr;
use std::path::PathBuf;

use media_browser::config::DEFAULT_BIND;
use media_browser::{router, BrowseConfig, MediaLibrary};

const ABOUT: &str = r#"
Media Browser - on-demand media directory browser

Examples:
  media_browser --root /photos                     serve /photos on 127.0.0.1:3000
  media_browser --root /photos serve -b 0.0.0.0:80 serve on another address
  media_browser --root /photos dirs 2024           list the directories in 2024
  media_browser --root /photos scan 2024 -R -l 20  first 20 media files below 2024
"#;

/// On-demand media directory browser
#[derive(Parser)]
#[command(name = "media_browser")]
#[command(author, version, about = ABOUT, long_about = None)]
struct Cli {
    /// Media root directory
    #[arg(short, long, env = "MEDIA_ROOT", global = true, default_value = ".")]
    root: PathBuf,

    /// Default page size
    #[arg(long, env = "MEDIA_PAGE_SIZE", global = true, default_value = "100")]
    page_size: usize,

    /// Maximum page size
    #[arg(long, env = "MEDIA_MAX_PAGE_SIZE", global = true, default_value = "1000")]
    max_page_size: usize,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the HTTP API (default)
    Serve {
        /// Address to listen on
        #[arg(short, long, env = "MEDIA_BIND", default_value = DEFAULT_BIND)]
        bind: SocketAddr,

        /// Directories included in the stats preview
        #[arg(long, default_value = "10")]
        stats_preview: usize,
    },
    /// Print the one-level directory listing of a path as JSON
    Dirs {
        /// Path relative to the root
        #[arg(default_value = "")]
        path: String,
    },
    /// Print a page of media files below a path as JSON
    Scan {
        /// Path relative to the root
        #[arg(default_value = "")]
        path: String,

        /// Descend into sub-directories
        #[arg(short = 'R', long)]
        recursive: bool,

        /// Page size
        #[arg(short, long)]
        limit: Option<String>,

        /// Number of items to skip
        #[arg(short, long)]
        offset: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let builder = BrowseConfig::builder()
        .root(cli.root)
        .default_limit(cli.page_size)
        .max_limit(cli.max_page_size);

    match cli.command {
        None => serve(builder.build()).await,
        Some(Commands::Serve {
            bind,
            stats_preview,
        }) => serve(builder.bind(bind).stats_preview(stats_preview).build()).await,
        Some(Commands::Dirs { path }) => {
            let library = open(builder.build())?;
            let directories = library.directories(&path)?;
            println!("{}", serde_json::to_string_pretty(&directories)?);
            Ok(())
        }
        Some(Commands::Scan {
            path,
            recursive,
            limit,
            offset,
        }) => {
            let library = open(builder.build())?;
            let offsets: Vec<&str> = offset.as_deref().into_iter().collect();
            let limits: Vec<&str> = limit.as_deref().into_iter().collect();
            let request = library.page_request(&offsets, &limits);
            let page = library.media_page(&path, recursive, request)?;
            println!("{}", serde_json::to_string_pretty(&page)?);
            Ok(())
        }
    }
}

fn open(config: BrowseConfig) -> anyhow::Result<MediaLibrary> {
    MediaLibrary::new(config.clone())
        .with_context(|| format!("Invalid media root: {:?}", config.root))
}

async fn serve(config: BrowseConfig) -> anyhow::Result<()> {
    let bind = config.bind;
    let library = open(config)?;
    info!("Media root: {}", library.root());
    if !library.root().as_path().is_dir() {
        log::warn!("Media root {} is not a directory; requests will return 404", library.root());
    }

    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .with_context(|| format!("Failed to bind {}", bind))?;
    info!("Listening on {}", bind);

    axum::serve(listener, router(library))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutting down");
    }
}
