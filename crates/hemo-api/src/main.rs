//! hemo-api server binary.
//!
//! Reads `config.toml` (or the path specified with `--config`), opens an
//! in-process SQLite store, and serves the JSON API over HTTP.
//!
//! # Provisioning the first admin
//!
//! Accounts register as donors; promotion is admin-only, so the first admin
//! has to come from outside the API:
//!
//! ```text
//! cargo run -p hemo-api --bin server -- --seed
//! ```
//!
//! reads the `[seed_admin]` section of the config file and exits.

use std::path::PathBuf;

use anyhow::Context as _;
use argon2::{password_hash::SaltString, Argon2, PasswordHasher};
use chrono::Utc;
use clap::Parser;
use rand_core::OsRng;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use hemo_api::{router, session::SessionKeys, AppState, ServerConfig};
use hemo_core::{
  account::{Account, AccountCredentials, AccountStatus, Role},
  store::AccountStore,
};
use hemo_store_sqlite::SqliteStore;

#[derive(Parser)]
#[command(author, version, about = "hemo donation-coordination server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  /// Provision the `[seed_admin]` account from the config file and exit.
  #[arg(long)]
  seed: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Initialise tracing.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  // Load configuration.
  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(config::Environment::with_prefix("HEMO"))
    .build()
    .context("failed to read config file")?;

  let server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;

  // Open SQLite store.
  let store = SqliteStore::open(&server_cfg.store_path)
    .await
    .with_context(|| format!("failed to open store at {:?}", server_cfg.store_path))?;

  if cli.seed {
    seed_admin(&store, &server_cfg).await?;
    return Ok(());
  }

  // Build application state.
  let keys = SessionKeys::new(&server_cfg.session_secret, server_cfg.session_ttl_hours);
  let state = AppState::new(store, keys);
  let app = router(state);

  let address = format!("{}:{}", server_cfg.host, server_cfg.port);
  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}

/// Create the configured admin account if it does not exist yet.
async fn seed_admin(store: &SqliteStore, cfg: &ServerConfig) -> anyhow::Result<()> {
  let Some(seed) = &cfg.seed_admin else {
    anyhow::bail!("no [seed_admin] section in the config file");
  };

  if store.find_by_email(&seed.email).await?.is_some() {
    tracing::info!("admin account {} already exists", seed.email);
    return Ok(());
  }

  let salt = SaltString::generate(&mut OsRng);
  let password_hash = Argon2::default()
    .hash_password(seed.password.as_bytes(), &salt)
    .map_err(|e| anyhow::anyhow!("argon2 error: {e}"))?
    .to_string();

  let account = Account {
    email:       seed.email.clone(),
    name:        seed.name.clone(),
    avatar:      None,
    blood_group: seed.blood_group.parse()?,
    district:    seed.district.clone(),
    upazila:     seed.upazila.clone(),
    role:        Role::Admin,
    status:      AccountStatus::Active,
    created_at:  Utc::now(),
    updated_at:  None,
  };
  store
    .insert_account(&AccountCredentials {
      account,
      password_hash,
    })
    .await?;

  tracing::info!("admin account {} created", seed.email);
  Ok(())
}
