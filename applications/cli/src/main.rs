/// Cloudstream - browse and manage a cloud music library from the terminal
use clap::{Args, Parser, Subcommand};
use cloudstream_cli::{Aggregate, App, CliConfig, GridQuery, TrackQuery};
use cloudstream_library::{SortDirection, SortField};
use cloudstream_metadata::CancellationFlag;
use std::io::Write;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "cloudstream")]
#[command(about = "Cloudstream Player library tools", long_about = None)]
struct Cli {
    /// Configuration file path (default: ./cloudstream.toml if present)
    #[arg(short, long, global = true, env = "CLOUDSTREAM_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Library summary counts
    Library,
    /// List tracks for the current filter and sort
    Tracks(TracksArgs),
    /// List artists
    Artists,
    /// List albums
    Albums {
        /// Lay albums out as a grid for a viewport this many pixels wide
        #[arg(long)]
        grid: Option<f64>,
        /// Grid viewport height in pixels
        #[arg(long, default_value_t = 900.0)]
        height: f64,
        /// Grid scroll offset in pixels
        #[arg(long, default_value_t = 0.0)]
        scroll: f64,
    },
    /// List genres
    Genres,
    /// List years
    Years,
    /// Manage playlists
    #[command(subcommand)]
    Playlist(PlaylistCommand),
    /// List one level of the B2 bucket
    Browse {
        /// Folder prefix, e.g. `2023/`
        #[arg(short, long, default_value = "")]
        prefix: String,
    },
    /// Import a local folder
    Import {
        /// Folder (or single file) to scan
        dir: PathBuf,
        /// Library document to merge the tracks into
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Re-read embedded artwork for the local tracks of a library document
    RescanArtwork {
        /// Library document to update in place
        document: PathBuf,
    },
    /// Offline cache maintenance
    #[command(subcommand)]
    Cache(CacheCommand),
    /// Print the effective configuration
    Config,
}

#[derive(Args)]
struct TracksArgs {
    /// Search title, artist, album and genre
    #[arg(short, long)]
    search: Option<String>,
    #[arg(long)]
    artist: Option<String>,
    #[arg(long)]
    album: Option<String>,
    #[arg(long)]
    genre: Option<String>,
    #[arg(long)]
    year: Option<u32>,
    /// Show a playlist instead of the filtered library
    #[arg(long, conflicts_with_all = ["search", "artist", "album", "genre", "year"])]
    playlist: Option<String>,
    /// title, artist, album, year, genre, duration, bitrate or trackNumber
    #[arg(long)]
    sort: Option<SortField>,
    /// asc or desc
    #[arg(long)]
    direction: Option<SortDirection>,
    /// First visible row
    #[arg(long, default_value_t = 0)]
    scroll: usize,
    /// Visible rows
    #[arg(long, default_value_t = 40)]
    rows: usize,
}

#[derive(Subcommand)]
enum PlaylistCommand {
    /// List playlists
    List,
    /// Create a playlist
    Create {
        name: String,
        /// Initial track ids
        tracks: Vec<String>,
    },
    /// Add tracks to a playlist
    Add { id: String, tracks: Vec<String> },
    /// Remove tracks from a playlist
    Remove { id: String, tracks: Vec<String> },
    /// Rename a playlist
    Rename { id: String, name: String },
    /// Delete a playlist
    Delete { id: String },
}

#[derive(Subcommand)]
enum CacheCommand {
    /// Cached file count and size
    Stats,
    /// Evict least recently used files
    Evict {
        /// Target size in bytes (default: cache.max_bytes)
        #[arg(long)]
        max_bytes: Option<u64>,
    },
    /// Remove every cached file
    Clear,
    /// Download a library track for offline playback
    Fetch { track_id: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr; stdout carries command output
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cloudstream=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let config = CliConfig::load(cli.config.as_deref())?;
    let app = App::new(config);
    let mut out = std::io::stdout().lock();

    // Commands that talk to the library or browse endpoints need a valid config
    let offline = matches!(
        cli.command,
        Commands::Config
            | Commands::Import { .. }
            | Commands::RescanArtwork { .. }
            | Commands::Cache(CacheCommand::Stats | CacheCommand::Evict { .. } | CacheCommand::Clear)
    );
    if !offline {
        app.config().validate()?;
    }

    match cli.command {
        Commands::Config => {
            let text = toml::to_string_pretty(app.config())?;
            out.write_all(text.as_bytes())?;
        }
        Commands::Library => app.library_summary(&mut out).await?,
        Commands::Tracks(args) => {
            let query = TrackQuery {
                search: args.search,
                artist: args.artist,
                album: args.album,
                genre: args.genre,
                year: args.year,
                playlist: args.playlist,
                sort: args.sort,
                direction: args.direction,
                scroll: args.scroll,
                rows: args.rows,
            };
            app.tracks(&query, &mut out).await?;
        }
        Commands::Artists => app.aggregate(Aggregate::Artists, None, &mut out).await?,
        Commands::Albums { grid, height, scroll } => {
            let grid = grid.map(|width| GridQuery { width, height, scroll });
            app.aggregate(Aggregate::Albums, grid, &mut out).await?;
        }
        Commands::Genres => app.aggregate(Aggregate::Genres, None, &mut out).await?,
        Commands::Years => app.aggregate(Aggregate::Years, None, &mut out).await?,
        Commands::Playlist(command) => match command {
            PlaylistCommand::List => app.playlist_list(&mut out).await?,
            PlaylistCommand::Create { name, tracks } => app.playlist_create(&name, &tracks, &mut out).await?,
            PlaylistCommand::Add { id, tracks } => app.playlist_add(&id, &tracks, &mut out).await?,
            PlaylistCommand::Remove { id, tracks } => app.playlist_remove(&id, &tracks, &mut out).await?,
            PlaylistCommand::Rename { id, name } => app.playlist_rename(&id, &name, &mut out).await?,
            PlaylistCommand::Delete { id } => app.playlist_delete(&id, &mut out).await?,
        },
        Commands::Browse { prefix } => app.browse(&prefix, &mut out).await?,
        Commands::Import { dir, output } => {
            let cancel = CancellationFlag::new();
            let on_interrupt = cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    tracing::warn!("Interrupted, stopping after the current batch");
                    on_interrupt.cancel();
                }
            });
            app.import(&dir, output.as_deref(), &cancel, &mut out).await?;
        }
        Commands::RescanArtwork { document } => app.rescan_artwork(&document, &mut out).await?,
        Commands::Cache(command) => match command {
            CacheCommand::Stats => app.cache_stats(&mut out)?,
            CacheCommand::Evict { max_bytes } => app.cache_evict(max_bytes, &mut out)?,
            CacheCommand::Clear => app.cache_clear(&mut out)?,
            CacheCommand::Fetch { track_id } => app.cache_fetch(&track_id, &mut out).await?,
        },
    }

    Ok(())
}
