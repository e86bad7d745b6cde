//! CLI administration tool for clickpath.
//!
//! Manages links and inspects the database without going through the HTTP
//! API. Link creation and deletion run through the same service as the
//! server, so validation rules and error messages match.
//!
//! # Usage
//!
//! ```bash
//! # List all links
//! cargo run --bin admin -- links list
//!
//! # Create a link with a random or custom code
//! cargo run --bin admin -- links create https://example.com/a/b
//! cargo run --bin admin -- links create https://example.com --code launch
//!
//! # Delete a link and its click history
//! cargo run --bin admin -- links delete 42
//!
//! # View statistics
//! cargo run --bin admin -- stats
//!
//! # Check database connection
//! cargo run --bin admin -- db check
//! ```
//!
//! # Environment Variables
//!
//! Same database settings as the server (`DATABASE_URL` or `DB_*`).

use clickpath::application::services::LinkService;
use clickpath::config::{self, StorageBackend};
use clickpath::infrastructure::change_feed::ChangeFeed;
use clickpath::domain::repositories::{ClickRepository, LinkRepository};
use clickpath::infrastructure::persistence::{PgClickRepository, PgLinkRepository};
use clickpath::server::connect_pool;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::Confirm;
use sqlx::PgPool;
use std::sync::Arc;

/// CLI tool for managing clickpath.
#[derive(Parser)]
#[command(name = "admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Top-level command groups.
#[derive(Subcommand)]
enum Commands {
    /// Manage short links
    Links {
        #[command(subcommand)]
        action: LinkAction,
    },

    /// Show statistics
    Stats,

    /// Database operations
    Db {
        #[command(subcommand)]
        action: DbAction,
    },
}

/// Link management subcommands.
#[derive(Subcommand)]
enum LinkAction {
    /// List all links, newest first
    List,

    /// Create a short link
    Create {
        /// Destination URL (http:// or https://)
        url: String,

        /// Custom short code (3-20 letters, digits, - or _)
        #[arg(short, long)]
        code: Option<String>,
    },

    /// Delete a link and its click events
    Delete {
        /// Link ID
        id: i64,

        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
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

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let config = config::load_from_env()?;
    if config.storage_backend != StorageBackend::Postgres {
        anyhow::bail!("admin works against PostgreSQL only, unset STORAGE_BACKEND=memory");
    }

    let pool = connect_pool(&config).await?;

    let shared_pool = Arc::new(pool.clone());
    let links = Arc::new(PgLinkRepository::new(shared_pool.clone()));
    let clicks = PgClickRepository::new(shared_pool);

    let service = LinkService::new(links.clone(), Arc::new(ChangeFeed::new()))
    .with_max_attempts(config.code_generation_attempts)
    .with_store_timeout(config.store_timeout());

    match cli.command {
        Commands::Links { action } => {
            handle_link_action(action, &service, links.as_ref(), &clicks).await?
        }
        Commands::Stats => handle_stats(&service, &pool).await?,
        Commands::Db { action } => handle_db_action(action, &pool).await?,
    }

    Ok(())
}

/// Dispatches link management commands.
async fn handle_link_action(
    action: LinkAction,
    service: &LinkService,
    links: &PgLinkRepository,
    clicks: &PgClickRepository,
) -> Result<()> {
    match action {
        LinkAction::List => list_links(service).await,
        LinkAction::Create { url, code } => create_link(service, url, code).await,
        LinkAction::Delete { id, yes } => delete_link(service, links, clicks, id, yes).await,
    }
}

/// Lists all links.
///
/// # Output Format
///
/// ```text
/// Links
///
///   ID    Code                 Clicks   Created            URL
///   ───────────────────────────────────────────────────────────────────────────
///   2     launch               14       2024-06-01 10:30   https://example.com
/// ```
async fn list_links(service: &LinkService) -> Result<()> {
    println!("{}", "Links".bright_blue().bold());
    println!();

    let links = service
        .list_links()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to list links: {}", e))?;

    if links.is_empty() {
        println!("{}", "  No links found".yellow());
        println!();
        println!(
            "  Create one with: {} admin links create <url>",
            "cargo run --bin".bright_cyan()
        );
        return Ok(());
    }

    println!(
        "  {:<5} {:<20} {:<8} {:<18} {}",
        "ID".bright_white().bold(),
        "Code".bright_white().bold(),
        "Clicks".bright_white().bold(),
        "Created".bright_white().bold(),
        "URL".bright_white().bold()
    );
    println!("  {}", "─".repeat(75).bright_black());

    for link in &links {
        println!(
            "  {:<5} {:<20} {:<8} {:<18} {}",
            link.id.to_string().bright_black(),
            link.short_code.cyan(),
            link.clicks.to_string().bright_green(),
            link.created_at
                .format("%Y-%m-%d %H:%M")
                .to_string()
                .bright_black(),
            link.original_url
        );
    }

    println!();
    println!("  Total: {}", links.len().to_string().bright_white().bold());
    println!();

    Ok(())
}

/// Creates a link through [`LinkService`], printing the assigned code.
async fn create_link(service: &LinkService, url: String, code: Option<String>) -> Result<()> {
    println!("{}", "Create Short Link".bright_blue().bold());
    println!();

    let link = service
        .create_link(url, code)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to create link: {}", e))?;

    println!("{}", "Link created".green().bold());
    println!("  ID:   {}", link.id.to_string().bright_black());
    println!("  Code: {}", link.short_code.bright_yellow().bold());
    println!("  URL:  {}", link.original_url.cyan());
    println!();

    Ok(())
}

/// Shows the link and its event count, then deletes it after confirmation
/// (default: No).
async fn delete_link(
    service: &LinkService,
    links: &PgLinkRepository,
    clicks: &PgClickRepository,
    id: i64,
    skip_confirm: bool,
) -> Result<()> {
    println!("{}", "Delete Short Link".bright_blue().bold());
    println!();

    let link = links
        .find_by_id(id)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to load link: {}", e))?
        .ok_or_else(|| anyhow::anyhow!("Link {} not found", id))?;

    let events = clicks
        .count_for_link(id)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to count click events: {}", e))?;

    println!("  Code:   {}", link.short_code.bright_yellow().bold());
    println!("  URL:    {}", link.original_url.cyan());
    println!("  Clicks: {}", link.clicks.to_string().bright_green());
    println!("  Events: {}", events.to_string().bright_green());
    println!();

    if !skip_confirm {
        let confirmed = Confirm::new()
            .with_prompt(format!("Delete link {id} and its {events} click events?"))
            .default(false)
            .interact()?;

        if !confirmed {
            println!("{}", "Cancelled".red());
            return Ok(());
        }
    }

    service
        .delete_link(id)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to delete link: {}", e))?;

    println!("{}", "Link deleted".green().bold());
    println!();

    Ok(())
}

/// Displays link, counter and event log totals.
///
/// The counter total and the event count can differ when best-effort event
/// writes failed.
async fn handle_stats(service: &LinkService, pool: &PgPool) -> Result<()> {
    println!("{}", "Statistics".bright_blue().bold());
    println!();

    let totals = service
        .totals()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to load totals: {}", e))?;

    let events_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM url_analytics")
        .fetch_one(pool)
        .await?;

    println!(
        "  Links:           {}",
        totals.total_links.to_string().bright_green().bold()
    );
    println!(
        "  Clicks:          {}",
        totals.total_clicks.to_string().bright_green().bold()
    );
    println!(
        "  Click events:    {}",
        events_count.to_string().bright_green().bold()
    );
    println!(
        "  Avg clicks/link: {}",
        format!("{:.2}", totals.average_clicks()).bright_green().bold()
    );
    println!();

    Ok(())
}

/// Handles database diagnostic commands.
async fn handle_db_action(action: DbAction, pool: &PgPool) -> Result<()> {
    match action {
        DbAction::Check => {
            println!("{}", "Checking database connection...".bright_blue());

            sqlx::query("SELECT 1")
                .fetch_one(pool)
                .await
                .context("Database check failed")?;

            println!("{}", "Database connection OK".green().bold());
        }
        DbAction::Info => {
            println!("{}", "Database Information".bright_blue().bold());
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
