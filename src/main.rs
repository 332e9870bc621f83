//! Word Sprint - Unified CLI
//!
//! Seeds puzzles from curated words and serves the HTTP JSON API.

use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand};
use diesel::{Connection, SqliteConnection};
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use tracing::info;
use tracing_subscriber::EnvFilter;
use word_sprint::{
    CreatePuzzleRequest, PuzzleKind, PuzzleRepository, PuzzleService, ShiftDirection, Variant,
    router,
};

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Timed word-puzzle engine: cipher and scramble puzzles with hints,
/// penalties, and leaderboards.
#[derive(Debug, Parser)]
#[command(name = "word_sprint", version, about)]
struct Cli {
    /// Path to the SQLite database (falls back to DATABASE_URL, then
    /// word_sprint.db).
    #[arg(long, global = true)]
    db: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the HTTP JSON API.
    Serve {
        /// Bind address.
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
        /// Bind port (falls back to PORT, then 3000).
        #[arg(long)]
        port: Option<u16>,
    },
    /// Generate and persist a puzzle from a curated target word.
    Seed {
        /// Target word, uppercase A-Z (5 letters for cipher, 6 for
        /// scramble).
        word: String,
        /// Disguise variant.
        #[arg(long, default_value = "cipher")]
        variant: Variant,
        /// Calendar day (UTC), e.g. 2026-08-30. Defaults to today.
        #[arg(long)]
        date: Option<NaiveDate>,
        /// Hour-of-day bucket, 0-23.
        #[arg(long, default_value_t = 0)]
        slot: i32,
        /// Daily (unique per slot) or practice.
        #[arg(long, default_value = "daily")]
        kind: PuzzleKind,
        /// Author-supplied theme text.
        #[arg(long, default_value = "")]
        theme: String,
        /// Cipher only: fixed shift magnitude 1-25.
        #[arg(long)]
        shift: Option<u8>,
        /// Cipher only: fixed shift direction.
        #[arg(long)]
        direction: Option<ShiftDirection>,
        /// Cipher only: positions to leave unshifted.
        #[arg(long)]
        unshifted: Option<usize>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let db_path = cli
        .db
        .or_else(|| std::env::var("DATABASE_URL").ok())
        .unwrap_or_else(|| "word_sprint.db".to_string());

    run_migrations(&db_path)?;
    let service = PuzzleService::new(PuzzleRepository::new(db_path));

    match cli.command {
        Command::Serve { host, port } => serve(service, host, port).await,
        Command::Seed {
            word,
            variant,
            date,
            slot,
            kind,
            theme,
            shift,
            direction,
            unshifted,
        } => {
            let request = CreatePuzzleRequest {
                date: date.unwrap_or_else(|| Utc::now().date_naive()),
                slot,
                kind,
                variant,
                target_word: word,
                theme_hint: theme,
                shift,
                direction,
                unshifted_count: unshifted,
            };
            let view = service.create_puzzle(request)?;
            println!("{}", serde_json::to_string_pretty(&view)?);
            Ok(())
        }
    }
}

/// Applies pending migrations before any request touches the store.
fn run_migrations(db_path: &str) -> Result<()> {
    let mut conn = SqliteConnection::establish(db_path)
        .with_context(|| format!("failed to open database at '{db_path}'"))?;
    conn.run_pending_migrations(MIGRATIONS)
        .map_err(|err| anyhow::anyhow!("migrations failed: {err}"))?;
    info!(db_path, "Migrations applied");
    Ok(())
}

/// Runs the HTTP server until interrupted.
async fn serve(service: PuzzleService, host: String, port: Option<u16>) -> Result<()> {
    let port = port
        .or_else(|| std::env::var("PORT").ok().and_then(|p| p.parse().ok()))
        .unwrap_or(3000);

    let app = router(Arc::new(service));
    let listener = tokio::net::TcpListener::bind((host.as_str(), port)).await?;
    info!(%host, port, "Word Sprint API ready");
    axum::serve(listener, app).await?;
    Ok(())
}
