//! cxperia-server - Main entry point
//!
//! Serves the brand dashboard API, the public experience viewer API and the
//! operator admin API from one SQLite database.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use cxperia_common::api::auth::{load_shared_secret, store_shared_secret};
use cxperia_common::config::{self, ServerConfig};
use cxperia_common::db::{init_database, Role};
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cxperia_server::{build_router, db, AppState};

/// Command-line arguments for cxperia-server
#[derive(Parser, Debug)]
#[command(name = "cxperia-server")]
#[command(about = "Cxperia product experience backend")]
#[command(version)]
struct Args {
    /// Address to listen on (overrides the config file)
    #[arg(short, long, env = "CXPERIA_BIND_ADDR")]
    bind: Option<String>,

    /// Folder holding cxperia.db (else CXPERIA_DATA_FOLDER, config, OS default)
    #[arg(short, long)]
    data_folder: Option<PathBuf>,

    /// Explicit config file
    #[arg(short, long, env = config::CONFIG_FILE_ENV)]
    config: Option<PathBuf>,

    /// Base URL of the public viewer encoded into QR codes
    #[arg(long, env = "CXPERIA_PUBLIC_BASE_URL")]
    public_base_url: Option<String>,

    /// Promote the account with this email to super_admin, then exit
    #[arg(long, value_name = "EMAIL")]
    bootstrap_admin: Option<String>,

    /// Replace the public viewer secret (0 disables the check), then exit
    #[arg(long, value_name = "SECRET", allow_negative_numbers = true)]
    set_public_secret: Option<i64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cxperia_server=info,cxperia_common=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    info!("Starting cxperia-server v{}", env!("CARGO_PKG_VERSION"));

    let mut server_config = ServerConfig::load(args.config.as_deref());
    if let Some(bind) = args.bind {
        server_config.bind_addr = bind;
    }
    if let Some(url) = args.public_base_url {
        server_config.public_base_url = url;
    }

    let data_folder = config::resolve_data_folder(args.data_folder.as_deref(), &server_config);
    std::fs::create_dir_all(&data_folder)
        .with_context(|| format!("Failed to create data folder {}", data_folder.display()))?;

    let db_path = data_folder.join(config::DATABASE_FILE);
    info!("Database path: {}", db_path.display());

    let pool = init_database(&db_path)
        .await
        .context("Failed to initialize database")?;
    info!("✓ Database ready");

    // One-shot maintenance commands
    if let Some(email) = args.bootstrap_admin {
        let email = email.trim().to_lowercase();
        let Some(profile) = db::profiles::get_profile_by_email(&pool, &email).await? else {
            bail!("No account with email {}", email);
        };
        db::profiles::set_role(&pool, &profile.id, Role::SuperAdmin).await?;
        info!("✓ {} is now super_admin", email);
        return Ok(());
    }
    if let Some(secret) = args.set_public_secret {
        store_shared_secret(&pool, secret)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to store public secret: {}", e))?;
        info!("✓ Public secret updated");
        return Ok(());
    }

    let shared_secret = load_shared_secret(&pool)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to load public secret: {}", e))?;
    if shared_secret == 0 {
        warn!("Public secret check disabled (api_shared_secret = 0)");
    } else {
        info!("✓ Loaded public secret");
    }

    match db::sessions::delete_expired_sessions(&pool).await {
        Ok(0) => {}
        Ok(n) => info!("Removed {} expired sessions", n),
        Err(e) => warn!("Could not prune expired sessions: {}", e),
    }

    let bind_addr = server_config.bind_addr.clone();
    if server_config.email.api_key.is_none() {
        info!("Email API key not configured; transactional email disabled");
    }

    let state = AppState::new(pool, server_config, shared_secret);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", bind_addr))?;
    info!("cxperia-server listening on http://{}", bind_addr);
    info!("Health check: http://{}/health", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
