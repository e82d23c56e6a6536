mod render;

use std::{path::PathBuf, sync::Arc, time::Duration};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tonearm_core::{
    Catalog, Config, CredentialManager, MusicCatalog as _, MusicStore, PlaybackProgress,
    SearchPreview, tc,
    tonearm_state::{Album, AlbumId, Artist, ArtistId, TrackId},
};
use tracing_subscriber::{layer::SubscriberExt as _, util::SubscriberInitExt as _};

/// Delay between simulated keystrokes for `preview`.
const KEYSTROKE: Duration = Duration::from_millis(80);

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the config file
    #[arg(long, default_value = Config::FILENAME)]
    config: PathBuf,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Search tracks, albums and artists
    Search {
        query: Vec<String>,

        /// Maximum number of results of each kind
        #[arg(long)]
        limit: Option<u32>,
    },
    /// Show the quick results a search box would offer while typing
    Preview { query: Vec<String> },
    /// Queue the tracks of an album
    Album {
        id: String,

        /// Advance this many tracks through the queue
        #[arg(long, default_value_t = 0)]
        skip: usize,
    },
    /// Queue an artist's top tracks and list their albums
    Artist { id: String },
    /// Show a single track
    Track {
        id: String,

        /// Simulate playback for this many seconds
        #[arg(long)]
        play_seconds: Option<u64>,
    },
    /// Queue recommendations
    Home { query: Vec<String> },
    /// Write a config file with default values
    InitConfig,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging()?;

    let config = Config::load(&args.config)
        .with_context(|| format!("Failed to load {}", args.config.display()))?;

    if let Command::InitConfig = args.command {
        anyhow::ensure!(
            !args.config.exists(),
            "{} already exists",
            args.config.display()
        );
        config.save(&args.config)?;
        println!("Wrote default config to {}", args.config.display());
        return Ok(());
    }
    anyhow::ensure!(
        config.has_credentials(),
        "No client credentials in {}; run `tonearm init-config` and fill in the [catalog] section",
        args.config.display()
    );

    let client = Arc::new(tc::Client::new(
        config.catalog.api_url.clone(),
        config.catalog.token_url.clone(),
        config.catalog.client_id.clone(),
        config.catalog.client_secret.clone(),
    ));
    let credentials = CredentialManager::new(client.clone());
    credentials
        .acquire()
        .await
        .context("Failed to authenticate with the catalog")?;

    let catalog = Arc::new(Catalog::new(
        client,
        credentials.clone(),
        config.catalog_settings(),
    ));
    let mut notices = catalog.subscribe_notices();
    let store = MusicStore::new(catalog.clone(), config.store_options());

    tracing::debug!("running {:?}", args.command);
    let result = run(args.command, args.json, &store, &catalog).await;

    while let Ok(notice) = notices.try_recv() {
        eprintln!("warning: {notice}");
    }
    credentials.release();
    result
}

fn init_logging() -> anyhow::Result<()> {
    let log_file = std::fs::File::create("tonearm.log")?;
    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::sync::Mutex::new(log_file))
        .with_ansi(false);

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(file_layer)
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("tonearm=info")),
        )
        .init();
    Ok(())
}

async fn run(
    command: Command,
    json: bool,
    store: &MusicStore,
    catalog: &Arc<Catalog>,
) -> anyhow::Result<()> {
    match command {
        Command::Search { query, limit } => {
            store.search(&query.join(" "), limit).await;
            let results = store.search_results();
            if json {
                render::json(&results)?;
            } else {
                render::search_results(&store.search_term(), &results);
            }
        }
        Command::Preview { query } => {
            let query = query.join(" ");
            let term = query.trim().to_string();
            anyhow::ensure!(!term.is_empty(), "Nothing to preview");

            let preview = SearchPreview::new(catalog.clone());
            let mut typed = String::new();
            for c in query.chars() {
                typed.push(c);
                preview.input(&typed);
                tokio::time::sleep(KEYSTROKE).await;
            }

            let mut states = preview.subscribe();
            let state = tokio::time::timeout(
                Duration::from_secs(10),
                states.wait_for(|state| state.term == term && !state.searching),
            )
            .await
            .context("Timed out waiting for preview results")??
            .clone();
            if json {
                render::json(&state.results)?;
            } else {
                render::preview(&state);
            }
        }
        Command::Album { id, skip } => {
            let id = AlbumId(id);
            let album = catalog.album(&id).await.unwrap_or_else(|| Album {
                id: id.clone(),
                ..Default::default()
            });
            store.select_album(&album).await;
            for _ in 0..skip {
                store.next_track();
            }
            if json {
                render::json(&store.track_queue())?;
            } else {
                render::queue(&store.snapshot());
            }
        }
        Command::Artist { id } => {
            let id = ArtistId(id);
            let artist = catalog.artist(&id).await.unwrap_or_else(|| Artist {
                id: id.clone(),
                ..Default::default()
            });
            store.select_artist(&artist).await;
            if json {
                render::json(&store.artist_albums())?;
            } else {
                render::artist(&store.snapshot());
            }
        }
        Command::Track { id, play_seconds } => {
            let track = catalog
                .track(&TrackId(id.clone()))
                .await
                .with_context(|| format!("Track {id} not found"))?;
            store.select_track(&track);
            if json {
                render::json(&track)?;
            } else {
                render::track(&track);
            }

            if let Some(seconds) = play_seconds {
                let progress = PlaybackProgress::new();
                progress.set_track(&track);
                progress.toggle_play();
                let mut interval = tokio::time::interval(Duration::from_secs(1));
                for _ in 0..=seconds {
                    interval.tick().await;
                    render::progress(&progress.state());
                }
            }
        }
        Command::Home { query } => {
            let query = query.join(" ");
            store.load_home_tracks(Some(&query)).await;
            if json {
                render::json(&store.track_queue())?;
            } else {
                render::queue(&store.snapshot());
            }
        }
        Command::InitConfig => {}
    }

    if let Some(error) = store.error() {
        anyhow::bail!("{error}");
    }
    Ok(())
}
