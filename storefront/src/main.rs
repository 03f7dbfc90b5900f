// greenhouse_storefront/src/main.rs

use greenhouse_storefront::cart::{CartStorage, FileCartStorage, MemoryCartStorage};
use greenhouse_storefront::config::{AppConfig, LogFormat, StoreBackend};
use greenhouse_storefront::seed::seed_store;
use greenhouse_storefront::state::AppState;
use greenhouse_storefront::store::{MemoryStore, PgStore, Store};
use greenhouse_storefront::web::configure_app_routes;

use actix_web::{web as actix_data, App, HttpServer};
use std::io;
use std::sync::Arc;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::EnvFilter;

fn init_tracing(format: LogFormat) {
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
  match format {
    LogFormat::Json => tracing_subscriber::fmt().with_env_filter(filter).json().init(),
    LogFormat::Pretty => tracing_subscriber::fmt()
      .with_env_filter(filter)
      .with_span_events(FmtSpan::CLOSE)
      .init(),
  }
}

fn startup_error(context: &str, err: impl std::fmt::Display) -> io::Error {
  tracing::error!(error = %err, "{}", context);
  io::Error::new(io::ErrorKind::Other, format!("{}: {}", context, err))
}

#[actix_web::main]
async fn main() -> io::Result<()> {
  // Tracing is not up yet, so configuration errors go to stderr.
  let app_config = AppConfig::from_env().map_err(|e| {
    eprintln!("Configuration error: {}", e);
    io::Error::new(io::ErrorKind::InvalidInput, e.to_string())
  })?;
  init_tracing(app_config.log_format);
  tracing::info!("Starting greenhouse storefront server...");

  let store: Arc<dyn Store> = match app_config.store_backend {
    StoreBackend::Postgres => {
      let url = app_config.database_url.clone().unwrap_or_default();
      let pg = PgStore::connect(&url, app_config.database_max_connections)
        .await
        .map_err(|e| startup_error("Failed to connect to the database", e))?;
      tracing::info!("Successfully connected to the database.");
      Arc::new(pg)
    }
    StoreBackend::Memory => {
      tracing::warn!("Using the in-memory store; data is lost on restart.");
      Arc::new(MemoryStore::new())
    }
  };

  let cart_storage: Arc<dyn CartStorage> = match &app_config.cart_storage_dir {
    Some(dir) => {
      tracing::info!(dir = %dir.display(), "Persisting carts to disk.");
      Arc::new(FileCartStorage::new(dir.clone()))
    }
    None => Arc::new(MemoryCartStorage::new()),
  };

  if app_config.seed_db {
    seed_store(store.as_ref(), app_config.seed_admin_user_id)
      .await
      .map_err(|e| startup_error("Failed to seed the store", e))?;
  }

  let server_address = format!("{}:{}", app_config.server_host, app_config.server_port);
  let app_state = AppState::new(store, cart_storage, app_config);
  tracing::info!("Workflows registered; binding server to {}...", server_address);

  HttpServer::new(move || {
    App::new()
      .app_data(actix_data::Data::new(app_state.clone()))
      .wrap(tracing_actix_web::TracingLogger::default())
      .configure(configure_app_routes)
  })
  .bind(&server_address)?
  .run()
  .await
}
