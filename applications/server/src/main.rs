/// FreeTunes Server - music sharing REST API
use anyhow::Context;
use clap::{Parser, Subcommand};
use freetunes_core::{ReportId, ReportStatus, UserId};
use freetunes_server::{
    api,
    config::ServerConfig,
    services::{producer, AuthService, FileStorage, MemoryCache},
    state::AppState,
};
use freetunes_storage::{reports, users, Database};
use std::{
    net::SocketAddr,
    num::NonZeroUsize,
    path::{Path, PathBuf},
    sync::Arc,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "freetunes-server")]
#[command(about = "FreeTunes music sharing server", long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve,
    /// Hide a user and their content from public listings
    BanUser {
        /// User id
        id: String,
    },
    /// Lift a ban
    UnbanUser {
        /// User id
        id: String,
    },
    /// List song reports
    ListReports {
        /// Only reports with this status (pending, reviewed, resolved)
        #[arg(short, long)]
        status: Option<ReportStatus>,
    },
    /// Move a report to another status
    SetReportStatus {
        /// Report id
        id: String,
        /// New status (pending, reviewed, resolved)
        status: ReportStatus,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "freetunes_server=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let config = match cli.config.as_deref() {
        Some(path) => ServerConfig::load_from(path)?,
        None => ServerConfig::load()?,
    };

    match cli.command {
        Commands::Serve => serve(config).await?,
        Commands::BanUser { id } => set_banned(&config, &id, true).await?,
        Commands::UnbanUser { id } => set_banned(&config, &id, false).await?,
        Commands::ListReports { status } => list_reports(&config, status).await?,
        Commands::SetReportStatus { id, status } => {
            set_report_status(&config, &id, status).await?;
        }
    }

    Ok(())
}

async fn open_database(config: &ServerConfig) -> anyhow::Result<Database> {
    if let Some(parent) = sqlite_file(&config.storage.database_url).and_then(Path::parent) {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("creating {}", parent.display()))?;
        }
    }

    let db = Database::connect(&config.storage.database_url).await?;
    tracing::info!("Database connected");
    Ok(db)
}

/// File path of a `sqlite://` URL, `None` for in-memory databases
fn sqlite_file(url: &str) -> Option<&Path> {
    let path = url
        .strip_prefix("sqlite://")
        .or_else(|| url.strip_prefix("sqlite:"))?;
    let path = path.split('?').next().unwrap_or_default();
    (!path.is_empty() && path != ":memory:").then_some(Path::new(path))
}

async fn serve(config: ServerConfig) -> anyhow::Result<()> {
    config.validate()?;

    tracing::info!("Starting FreeTunes Server");
    tracing::info!("Host: {}", config.server.host);
    tracing::info!("Port: {}", config.server.port);

    let db = open_database(&config).await?;

    // Initialize file storage
    let file_storage = FileStorage::new(
        config.storage.upload_path.clone(),
        config.server.public_url.clone(),
    );
    file_storage.initialize().await?;
    tracing::info!("File storage initialized");

    // Initialize auth service
    let auth_service = AuthService::new(
        config.auth.jwt_secret.clone(),
        config.auth.jwt_expiration_hours,
        config.auth.jwt_refresh_expiration_days,
    );

    let capacity = NonZeroUsize::new(config.cache.capacity)
        .context("cache.capacity must be greater than zero")?;
    let cache = Arc::new(MemoryCache::new(capacity));
    let code_capacity = NonZeroUsize::new(config.cache.code_capacity)
        .context("cache.code_capacity must be greater than zero")?;
    let codes = Arc::new(MemoryCache::new(code_capacity));

    let producer = producer::from_settings(&config.broker);
    if config.broker.url.is_none() {
        tracing::warn!("No broker configured, outgoing messages are only logged");
    }

    let app_state = AppState::new(
        db.clone(),
        Arc::new(auth_service),
        Arc::new(file_storage),
        cache,
        codes,
        producer,
    );
    let app = api::router(app_state, &config.server);

    let addr = SocketAddr::from((
        config.server.host.parse::<std::net::IpAddr>()?,
        config.server.port,
    ));

    tracing::info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    db.close().await;
    tracing::info!("Server stopped");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        return;
    }
    tracing::info!("Shutdown signal received");
}

async fn set_banned(config: &ServerConfig, id: &str, banned: bool) -> anyhow::Result<()> {
    let db = open_database(config).await?;
    users::set_banned(db.pool(), &UserId::new(id), banned).await?;
    db.close().await;

    println!("{} {}", if banned { "Banned" } else { "Unbanned" }, id);
    Ok(())
}

async fn list_reports(config: &ServerConfig, status: Option<ReportStatus>) -> anyhow::Result<()> {
    let db = open_database(config).await?;
    let reports = reports::list(db.pool(), status).await?;
    db.close().await;

    println!("Reports:");
    for report in reports {
        println!(
            "  {} [{}] song={} by={} - {}",
            report.id, report.status, report.song_id, report.user_id, report.reason
        );
    }

    Ok(())
}

async fn set_report_status(
    config: &ServerConfig,
    id: &str,
    status: ReportStatus,
) -> anyhow::Result<()> {
    let db = open_database(config).await?;
    reports::set_status(db.pool(), &ReportId::new(id), status).await?;
    db.close().await;

    println!("Report {} is now {}", id, status);
    Ok(())
}
