use anyhow::Result;
use clap::{Parser, Subcommand};
use fbgate_auth::password;
use fbgate_config::{Config, LogConfig};
use fbgate_server::AppState;
use fbgate_store::{InMemoryAccountStore, InMemoryUserStore, SqliteAccountStore};
use fbgate_types::AccountStore;
use std::{io::BufRead as _, path::PathBuf, sync::Arc};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt as _, util::SubscriberInitExt as _};

#[derive(Parser, Debug)]
#[command(name = "fbgate", about = "fbgate: Facebook Graph API broker")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the HTTP server.
    Serve {
        /// Path to the YAML configuration file.
        #[arg(short, long, value_name = "FILE")]
        config: Option<PathBuf>,
        /// Override the listening port (default: 8000).
        #[arg(short, long)]
        port: Option<u16>,
        /// Override the listening address (default: 127.0.0.1).
        #[arg(long)]
        host: Option<String>,
    },
    /// Print a password hash suitable for a seed user's `password_hash`.
    HashPassword {
        /// Plaintext password; read from stdin when omitted.
        password: Option<String>,
        /// Produce a bcrypt hash instead of Argon2id.
        #[arg(long)]
        bcrypt: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { config, port, host } => cmd_serve(config, port, host).await,
        Commands::HashPassword { password, bcrypt } => cmd_hash_password(password, bcrypt),
    }
}

async fn cmd_serve(
    config_path: Option<PathBuf>,
    port: Option<u16>,
    host: Option<String>,
) -> Result<()> {
    let mut config =
        Config::load(config_path.as_deref()).map_err(|e| anyhow::anyhow!("config error: {e}"))?;
    if let Some(p) = port {
        config.port = p;
    }
    if let Some(h) = host {
        config.host = h;
    }
    init_tracing(&config.log);
    config.validate()?;

    let accounts: Arc<dyn AccountStore> = match &config.database {
        Some(url) => {
            tracing::info!(url = %url, "using sqlite account store");
            Arc::new(
                SqliteAccountStore::new(url)
                    .await
                    .map_err(|e| anyhow::anyhow!("database error: {e}"))?,
            )
        }
        None => Arc::new(InMemoryAccountStore::new()),
    };
    let state = AppState::new(&config, Arc::new(InMemoryUserStore::new()), accounts)?;
    let seeded = state.credentials.seed(&config.users).await?;
    tracing::info!(count = seeded, "seeded local accounts");

    let app = fbgate_server::make_router(state);
    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("fbgate listening on http://{addr}");
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "failed to listen for ctrl-c");
            }
        })
        .await?;
    Ok(())
}

fn cmd_hash_password(password: Option<String>, use_bcrypt: bool) -> Result<()> {
    let password = match password {
        Some(p) => p,
        None => {
            let mut line = String::new();
            std::io::stdin().lock().read_line(&mut line)?;
            line.trim_end_matches(['\r', '\n']).to_string()
        }
    };
    let hash = if use_bcrypt {
        password::hash_password_bcrypt(&password, password::BCRYPT_COST)?
    } else {
        password::hash_password(&password)?
    };
    println!("{hash}");
    Ok(())
}

/// `RUST_LOG` wins; otherwise the configured level.
fn init_tracing(log: &LogConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log.level));
    let registry = tracing_subscriber::registry().with(filter);
    if log.json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}
