use clap::Parser;
use miette::{IntoDiagnostic, Result};
use rand::SeedableRng;
use rand::rngs::StdRng;
use register_drill::application::engine::GameEngine;
use register_drill::application::events::{GameEvent, Signal};
use register_drill::application::machine::RoundMachine;
use register_drill::config::{GameConfig, Mode};
use register_drill::domain::ports::{CatalogProviderBox, RankingStoreBox};
use register_drill::infrastructure::in_memory::{InMemoryCatalog, InMemoryRankingStore};
#[cfg(feature = "storage-rocksdb")]
use register_drill::infrastructure::rocksdb::RocksDBStore;
use register_drill::interfaces::csv::catalog_reader::CatalogReader;
use register_drill::interfaces::terminal::{Command, render_json, render_text};
use std::fs::File;
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Catalog CSV file (name,price,genre,image)
    catalog: PathBuf,

    /// Path to persistent ranking database (optional). If provided, uses RocksDB.
    #[arg(long)]
    db_path: Option<PathBuf>,

    /// Seed for order, wallet and payment draws. Random when omitted.
    #[arg(long)]
    seed: Option<u64>,

    #[arg(long, value_enum, default_value_t = Mode::Standard)]
    mode: Mode,

    /// JSON game config. Replaces the mode preset.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print signals as JSON lines instead of text.
    #[arg(long)]
    json: bool,

    /// Name recorded with rankings.
    #[arg(long)]
    player: Option<String>,
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()),
        )
        .init();
}

fn ranking_store(db_path: Option<PathBuf>) -> Result<RankingStoreBox> {
    #[cfg(feature = "storage-rocksdb")]
    if let Some(db_path) = db_path {
        let store = RocksDBStore::open(db_path).into_diagnostic()?;
        return Ok(Box::new(store));
    }

    #[cfg(not(feature = "storage-rocksdb"))]
    if db_path.is_some() {
        eprintln!(
            "WARNING: Persistent storage requested via --db-path, but 'storage-rocksdb' feature is not enabled. Falling back to In-Memory storage."
        );
    }

    Ok(Box::new(InMemoryRankingStore::new()))
}

fn print_signal(signal: &Signal, json: bool) {
    if json {
        match render_json(signal) {
            Ok(line) => println!("{line}"),
            Err(e) => tracing::warn!(error = %e, "Failed to encode signal"),
        }
    } else {
        println!("{}", render_text(signal));
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => GameConfig::from_json_file(path).into_diagnostic()?,
        None => GameConfig::for_mode(cli.mode),
    };
    if let Some(player) = cli.player {
        config.player = player;
    }

    // Load catalog
    let file = File::open(&cli.catalog).into_diagnostic()?;
    let items = CatalogReader::new(file).read_all().into_diagnostic()?;
    let catalog: CatalogProviderBox = Box::new(InMemoryCatalog::new(items));
    let items = catalog.menu_items().await.into_diagnostic()?;
    info!(items = items.len(), "catalog loaded");

    let rng = match cli.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let machine = RoundMachine::new(config, items, rng).into_diagnostic()?;
    let rankings = ranking_store(cli.db_path)?;

    let (engine, handle, mut signals) = GameEngine::new(machine, rankings);
    let game = tokio::spawn(engine.run());

    let json = cli.json;
    let printer = tokio::spawn(async move {
        while let Some(signal) = signals.recv().await {
            print_signal(&signal, json);
        }
    });

    // Operator input; EOF quits.
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.into_diagnostic()? {
        if line.trim().is_empty() {
            continue;
        }
        match line.parse::<Command>() {
            Ok(command) => {
                let event = GameEvent::from(command);
                let quit = event == GameEvent::Quit;
                if handle.send(event).is_err() || quit {
                    break;
                }
            }
            Err(e) => print_signal(
                &Signal::Rejected {
                    reason: e.to_string(),
                },
                json,
            ),
        }
    }
    // The loop may already be gone; either way it should stop.
    let _ = handle.quit();
    drop(handle);

    let session = game.await.into_diagnostic()?.into_diagnostic()?;
    printer.await.into_diagnostic()?;
    info!(
        score = session.score,
        lives = session.lives,
        rounds = session.rounds_played,
        "session closed"
    );

    Ok(())
}
