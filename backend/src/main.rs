//! Secret Santa Backend Service
//!
//! Usage:
//!   secret-santa serve                 - Run migrations and the HTTP API
//!   secret-santa seed-family <csv>     - Seed one slug-routed family
//!   secret-santa import-pairs <csv>    - Replace the token-routed roster

use clap::{Parser, Subcommand};
use secret_santa_backend::config::{AppConfig, LogFormat};
use secret_santa_backend::database::{create_pool, run_migrations};
use secret_santa_backend::error::{AppError, AppResult};
use secret_santa_backend::{api, AppState};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use tokio::net::TcpListener;
use tracing::{error, info, warn};

#[derive(Parser)]
#[command(name = "secret-santa")]
#[command(about = "Gift exchange seeding and wishlist API")]
#[command(version)]
struct Cli {
    /// Migrations directory
    #[arg(long, env = "MIGRATIONS_DIR", default_value = "./migrations")]
    migrations: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run migrations and serve the HTTP API
    Serve {
        /// Port to listen on (overrides HTTP_PORT)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Seed a family from a CSV whose first line is the family slug
    SeedFamily {
        /// CSV file
        csv: PathBuf,
        /// Display name for a newly created family (defaults to the slug)
        #[arg(long)]
        family_name: Option<String>,
    },

    /// Replace every pair, token and participant wishlist from a giver/receiver CSV
    ImportPairs {
        /// CSV file
        csv: PathBuf,
        /// Directory for generated_links.txt / generated_links.csv (overrides LINKS_OUTPUT_DIR)
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> AppResult<()> {
    // Load environment variables first
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    // Load configuration
    let config = AppConfig::from_env().map_err(|e| {
        eprintln!("Configuration error: {}", e);
        AppError::Config(e)
    })?;

    init_tracing(&config);

    info!("Environment: {}", config.environment);
    info!("Log level: {}", config.log_level);

    // =========================================================================
    // DATABASE SETUP
    // =========================================================================
    info!("Connecting to database...");

    let pool = create_pool(&config.database).await.map_err(|e| {
        error!("Failed to create database pool: {}", e);
        AppError::Database(e)
    })?;

    info!("Database connection pool created successfully");
    info!("Max connections: {}", config.database.max_connections);

    info!("Running database migrations from {}...", cli.migrations);
    run_migrations(&pool, Some(&cli.migrations)).await.map_err(|e| {
        error!("Database migration failed: {}", e);
        AppError::Database(e)
    })?;

    info!("Database migrations completed successfully");

    let state = AppState::postgres(pool, config);

    match cli.command {
        Commands::Serve { port } => serve(state, port).await,
        Commands::SeedFamily { csv, family_name } => {
            seed_family(&state, &csv, family_name.as_deref()).await
        }
        Commands::ImportPairs { csv, output_dir } => {
            import_pairs(&state, &csv, output_dir).await
        }
    }
}

fn init_tracing(config: &AppConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!(
            "secret_santa_backend={level},secret_santa={level},sqlx=warn,tower_http=info",
            level = config.log_level
        )
        .into()
    });

    match config.log_format {
        LogFormat::Pretty => tracing_subscriber::fmt().with_env_filter(filter).init(),
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init(),
    }
}

async fn serve(state: AppState, port: Option<u16>) -> AppResult<()> {
    let port = port.unwrap_or(state.config.http_port);
    let environment = state.config.environment.clone();
    let base_url = state.config.base_url.clone();

    let addr: SocketAddr = format!("0.0.0.0:{}", port)
        .parse()
        .map_err(|e| AppError::Config(format!("Invalid HTTP address: {}", e)))?;

    let router = api::create_router(state);
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| AppError::Message(format!("Failed to bind HTTP server: {}", e)))?;

    info!("╔══════════════════════════════════════════════════════════╗");
    info!("║           Secret Santa Backend Ready!                     ║");
    info!("╠══════════════════════════════════════════════════════════╣");
    info!("║  HTTP API:     {}", addr);
    info!("║  Links base:   {}", base_url);
    info!("║  Environment:  {}", environment);
    info!("╚══════════════════════════════════════════════════════════╝");
    info!("Press Ctrl+C to shutdown gracefully");

    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!("Could not listen for shutdown signal: {}", e);
                std::future::pending::<()>().await;
            }
            info!("Shutdown signal received, shutting down gracefully...");
        })
        .await
        .map_err(|e| {
            error!("HTTP server error: {}", e);
            AppError::Io(e)
        })?;

    info!("Secret Santa backend shutdown complete");
    Ok(())
}

fn read_csv(path: &Path) -> AppResult<String> {
    info!("Reading CSV from: {}", path.display());
    std::fs::read_to_string(path).map_err(|e| {
        error!("Could not read {}: {}", path.display(), e);
        AppError::Io(e)
    })
}

async fn seed_family(state: &AppState, csv: &Path, family_name: Option<&str>) -> AppResult<()> {
    let raw = read_csv(csv)?;
    let report = state.seeding.seed_family(&raw, family_name).await?;

    if !report.skipped_rows.is_empty() || !report.dropped_pairs.is_empty() {
        warn!(
            "{} CSV rows skipped, {} pairs dropped",
            report.skipped_rows.len(),
            report.dropped_pairs.len()
        );
    }

    println!("Family: {} ({})", report.family.name, report.family.slug);
    println!("Shareable links:");
    for member in &report.members {
        println!("{}: {}", member.name, member.url);
    }

    Ok(())
}

async fn import_pairs(state: &AppState, csv: &Path, output_dir: Option<PathBuf>) -> AppResult<()> {
    let raw = read_csv(csv)?;
    let report = state.token_import.import(&raw).await?;

    if !report.skipped_rows.is_empty() {
        warn!("{} CSV rows were skipped", report.skipped_rows.len());
    }

    let dir = output_dir.unwrap_or_else(|| state.config.links_output_dir.clone());
    report.manifest.write_to(&dir)?;

    println!("{}", report.manifest.to_text());

    Ok(())
}
