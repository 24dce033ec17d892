//! CLI administration tool for hoplink.
//!
//! Works directly against the PostgreSQL store, without going through HTTP.
//!
//! # Usage
//!
//! ```bash
//! # Show the identifier minted for a counter value
//! cargo run --bin hoplink-admin -- encode 1
//!
//! # Resolve a short identifier
//! cargo run --bin hoplink-admin -- lookup AQ
//!
//! # Shorten URLs
//! cargo run --bin hoplink-admin -- shorten example.com https://rust-lang.org
//!
//! # View statistics
//! cargo run --bin hoplink-admin -- stats
//!
//! # Check database connection
//! cargo run --bin hoplink-admin -- db check
//! ```
//!
//! # Environment Variables
//!
//! - `DATABASE_URL`: PostgreSQL connection string (or pass `--database-url`)

use hoplink::domain::repositories::StorageBackend;
use hoplink::infrastructure::persistence::{PgBackend, PgBackendOptions, connect_pool};
use hoplink::utils::code_generator::{encode_counter, is_valid_short_id};
use hoplink::utils::url_normalizer::normalize_url;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use sqlx::PgPool;
use std::sync::Arc;

/// CLI tool for managing hoplink.
#[derive(Parser)]
#[command(name = "hoplink-admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL", hide_env_values = true, global = true)]
    database_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level command groups.
#[derive(Subcommand)]
enum Commands {
    /// Print the short identifier for a counter value
    Encode {
        /// Counter value
        value: u64,
    },

    /// Look up the long URL behind a short identifier
    Lookup {
        short_id: String,
    },

    /// Shorten one or more URLs
    Shorten {
        #[arg(required = true)]
        urls: Vec<String>,
    },

    /// Show statistics
    Stats {
        /// Number of recent mappings to list
        #[arg(short, long, default_value_t = 10)]
        recent: i64,
    },

    /// Database operations
    Db {
        #[command(subcommand)]
        action: DbAction,
    },
}

/// Database operation subcommands.
#[derive(Subcommand)]
enum DbAction {
    /// Check database connection
    Check,

    /// Show database info
    Info,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let database_url = cli.database_url;

    match cli.command {
        Commands::Encode { value } => handle_encode(value),
        Commands::Lookup { short_id } => {
            let pool = connect(database_url).await?;
            handle_lookup(&pool, &short_id).await?;
        }
        Commands::Shorten { urls } => {
            let pool = connect(database_url).await?;
            handle_shorten(&pool, &urls).await?;
        }
        Commands::Stats { recent } => {
            let pool = connect(database_url).await?;
            handle_stats(&pool, recent).await?;
        }
        Commands::Db { action } => {
            let pool = connect(database_url).await?;
            handle_db_action(action, &pool).await?;
        }
    }

    Ok(())
}

async fn connect(database_url: Option<String>) -> Result<PgPool> {
    let database_url = database_url.context("DATABASE_URL must be set")?;
    connect_pool(&database_url, &PgBackendOptions::default()).await
}

fn backend(pool: &PgPool) -> PgBackend {
    PgBackend::new(Arc::new(pool.clone()))
}

/// Prints the identifier a counter value encodes to.
fn handle_encode(value: u64) {
    println!(
        "  {} → {}",
        value.to_string().bright_white(),
        encode_counter(value).bright_yellow().bold()
    );
}

/// Resolves a short identifier.
async fn handle_lookup(pool: &PgPool, short_id: &str) -> Result<()> {
    println!("{}", "🔎 Lookup".bright_blue().bold());
    println!();

    if !is_valid_short_id(short_id) {
        println!(
            "  {} is not a valid short identifier",
            short_id.red().bold()
        );
        return Ok(());
    }

    let long_url = backend(pool)
        .lookup(short_id)
        .await
        .map_err(|e| anyhow::anyhow!("Database error: {}", e))?;

    match long_url {
        Some(long_url) => println!("  {} → {}", short_id.cyan(), long_url.bright_white()),
        None => println!("{}", format!("  {short_id} not found").yellow()),
    }
    println!();

    Ok(())
}

/// Shortens URLs the same way the HTTP interface does.
async fn handle_shorten(pool: &PgPool, urls: &[String]) -> Result<()> {
    println!("{}", "🔗 Shorten".bright_blue().bold());
    println!();

    let mut long_urls = Vec::with_capacity(urls.len());
    for url in urls {
        match normalize_url(url) {
            Ok(long_url) => long_urls.push(long_url),
            Err(e) => anyhow::bail!("Invalid URL {url}: {e}"),
        }
    }

    let backend = backend(pool);
    backend
        .initialize()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to prepare database: {}", e))?;

    let resolved = backend
        .resolve_or_create_batch(&long_urls)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to shorten: {}", e))?;

    for (long_url, short_id) in &resolved {
        println!(
            "  {:<12} {}",
            short_id.bright_yellow().bold(),
            long_url.bright_white()
        );
    }
    println!();

    Ok(())
}

/// Displays counter value, mapping count and the most recent mappings.
async fn handle_stats(pool: &PgPool, recent: i64) -> Result<()> {
    println!("{}", "📊 Statistics".bright_blue().bold());
    println!();

    let backend = backend(pool);
    let counter = backend
        .counter()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to read counter: {}", e))?;
    let mappings = backend
        .count_mappings()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to count mappings: {}", e))?;

    println!(
        "  Counter:   {}",
        counter.to_string().bright_green().bold()
    );
    println!(
        "  Mappings:  {}",
        mappings.to_string().bright_green().bold()
    );
    println!();

    if recent <= 0 {
        return Ok(());
    }

    let latest = backend
        .recent_mappings(recent)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to list mappings: {}", e))?;

    if latest.is_empty() {
        println!("{}", "  No mappings yet".yellow());
        println!();
        return Ok(());
    }

    println!(
        "  {:<12} {:<20} {}",
        "Short ID".bright_white().bold(),
        "Created".bright_white().bold(),
        "Long URL".bright_white().bold()
    );
    println!("  {}", "─".repeat(75).bright_black());

    for mapping in &latest {
        let created = mapping
            .created_at
            .map(|at| at.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_default();

        println!(
            "  {:<12} {:<20} {}",
            mapping.short_id.cyan(),
            created.bright_black(),
            mapping.long_url
        );
    }
    println!();

    Ok(())
}

/// Handles database diagnostic commands.
async fn handle_db_action(action: DbAction, pool: &PgPool) -> Result<()> {
    match action {
        DbAction::Check => {
            println!("{}", "🔍 Checking database connection...".bright_blue());

            sqlx::query("SELECT 1").fetch_one(pool).await?;

            println!("{}", "✅ Database connection OK".green().bold());
        }
        DbAction::Info => {
            println!("{}", "ℹ️  Database Information".bright_blue().bold());
            println!();

            let version: String = sqlx::query_scalar("SELECT version()")
                .fetch_one(pool)
                .await?;

            println!("  PostgreSQL: {}", version.bright_white());
            println!();
        }
    }

    Ok(())
}
