// greenhouse_storefront/src/config.rs

use crate::cart::hub::DEFAULT_OPEN_CARTS;
use crate::errors::{AppError, Result};
use dotenvy::dotenv;
use std::env;
use std::path::PathBuf;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
  Postgres,
  Memory,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
  Pretty,
  Json,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
  pub server_host: String,
  pub server_port: u16,
  pub store_backend: StoreBackend,
  /// Required only for the Postgres backend.
  pub database_url: Option<String>,
  pub database_max_connections: u32,
  /// `None` keeps carts in process memory.
  pub cart_storage_dir: Option<PathBuf>,
  /// Cart stores kept open in memory before idle ones are dropped.
  pub cart_cache_capacity: usize,
  pub seed_db: bool,
  /// Profile promoted to admin when seeding.
  pub seed_admin_user_id: Option<Uuid>,
  pub log_format: LogFormat,
}

impl AppConfig {
  pub fn from_env() -> Result<Self> {
    dotenv().ok();

    let get_env = |var_name: &str| {
      env::var(var_name).map_err(|e| AppError::Config(format!("Missing environment variable '{}': {}", var_name, e)))
    };

    let server_host = get_env("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let server_port = get_env("SERVER_PORT")
      .unwrap_or_else(|_| "8080".to_string())
      .parse::<u16>()
      .map_err(|e| AppError::Config(format!("Invalid SERVER_PORT: {}", e)))?;

    let store_backend = match get_env("STORE_BACKEND")
      .unwrap_or_else(|_| "postgres".to_string())
      .to_ascii_lowercase()
      .as_str()
    {
      "postgres" => StoreBackend::Postgres,
      "memory" => StoreBackend::Memory,
      other => return Err(AppError::Config(format!("Invalid STORE_BACKEND '{}'", other))),
    };

    let database_url = get_env("DATABASE_URL").ok();
    if store_backend == StoreBackend::Postgres && database_url.is_none() {
      return Err(AppError::Config(
        "DATABASE_URL is required when STORE_BACKEND=postgres".to_string(),
      ));
    }
    let database_max_connections = get_env("DATABASE_MAX_CONNECTIONS")
      .unwrap_or_else(|_| "10".to_string())
      .parse::<u32>()
      .map_err(|e| AppError::Config(format!("Invalid DATABASE_MAX_CONNECTIONS: {}", e)))?;

    let cart_storage_dir = get_env("CART_STORAGE_DIR").ok().map(PathBuf::from);
    let cart_cache_capacity = get_env("CART_CACHE_CAPACITY")
      .unwrap_or_else(|_| DEFAULT_OPEN_CARTS.to_string())
      .parse::<usize>()
      .ok()
      .filter(|n| *n > 0)
      .ok_or_else(|| AppError::Config("CART_CACHE_CAPACITY must be a positive integer".to_string()))?;

    let seed_db = get_env("SEED_DB")
      .unwrap_or_else(|_| "false".to_string())
      .parse::<bool>()
      .map_err(|e| AppError::Config(format!("Invalid SEED_DB value: {}", e)))?;

    let seed_admin_user_id = match get_env("SEED_ADMIN_USER_ID") {
      Ok(raw) => Some(
        Uuid::parse_str(&raw).map_err(|e| AppError::Config(format!("Invalid SEED_ADMIN_USER_ID: {}", e)))?,
      ),
      Err(_) => None,
    };

    let log_format = match get_env("LOG_FORMAT").unwrap_or_else(|_| "pretty".to_string()).as_str() {
      "pretty" => LogFormat::Pretty,
      "json" => LogFormat::Json,
      other => return Err(AppError::Config(format!("Invalid LOG_FORMAT '{}'", other))),
    };

    tracing::info!("Application configuration loaded successfully.");

    Ok(Self {
      server_host,
      server_port,
      store_backend,
      database_url,
      database_max_connections,
      cart_storage_dir,
      cart_cache_capacity,
      seed_db,
      seed_admin_user_id,
      log_format,
    })
  }

  /// Configuration for tests and local runs: in-memory store and carts.
  pub fn in_memory() -> Self {
    Self {
      server_host: "127.0.0.1".to_string(),
      server_port: 8080,
      store_backend: StoreBackend::Memory,
      database_url: None,
      database_max_connections: 1,
      cart_storage_dir: None,
      cart_cache_capacity: DEFAULT_OPEN_CARTS,
      seed_db: false,
      seed_admin_user_id: None,
      log_format: LogFormat::Pretty,
    }
  }
}
