mod admin;
mod app;
mod cache;
mod config;
mod debounce;
mod event;
mod portfolio;
mod render;
mod store;
mod ui;

use clap::Parser;
use color_eyre::Result;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "folio")]
#[command(about = "A terminal portfolio browser backed by a local project store")]
#[command(version)]
struct Args {
  /// Path to config file (default: $XDG_CONFIG_HOME/folio/config.yaml)
  #[arg(short, long)]
  config: Option<PathBuf>,

  /// Project database (overrides store.path)
  #[arg(long)]
  db: Option<PathBuf>,

  /// Start in admin mode
  #[arg(long)]
  admin: bool,

  /// Import projects and admins from a YAML file before starting
  #[arg(long)]
  seed: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
  color_eyre::install()?;

  let args = Args::parse();

  // The TUI owns stdout, so logs go to a file
  let log_dir = config::Config::data_dir();
  std::fs::create_dir_all(&log_dir)?;
  let (writer, _guard) = tracing_appender::non_blocking(tracing_appender::rolling::never(
    &log_dir,
    "folio.log",
  ));
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("folio=info")),
    )
    .with_writer(writer)
    .with_ansi(false)
    .init();

  let mut config = config::Config::load(args.config.as_deref())?;
  if let Some(db) = args.db {
    config.store.path = Some(db);
  }

  let store = Arc::new(store::SqliteStore::open(&config.store_path())?);

  if let Some(seed) = args.seed {
    let added = store::seed::Seed::load(&seed)?.apply(&store).await?;
    tracing::info!(added, path = %seed.display(), "seeded project store");
  }

  let admin = admin::AdminMode::new(args.admin);

  // Initialize and run the app
  let mut app = app::App::new(config, store, admin);
  app.run().await?;

  Ok(())
}
