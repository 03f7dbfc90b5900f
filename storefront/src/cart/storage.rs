// greenhouse_storefront/src/cart/storage.rs

//! Where cart snapshots are persisted: one JSON array per key.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::PathBuf;
use thiserror::Error;
use tracing::debug;

use super::items::CartItem;

/// Base key every cart is stored under; owners get a suffix.
pub const CART_STORAGE_KEY: &str = "nursery_cart";

#[derive(Debug, Error)]
pub enum CartError {
  #[error("cart storage I/O failed: {0}")]
  Io(#[from] std::io::Error),

  #[error("cart data is not valid JSON: {0}")]
  Serialization(#[from] serde_json::Error),

  #[error("cart storage unavailable: {0}")]
  Unavailable(String),
}

#[async_trait]
pub trait CartStorage: Send + Sync {
  async fn load(&self, key: &str) -> Result<Option<Vec<CartItem>>, CartError>;
  async fn save(&self, key: &str, items: &[CartItem]) -> Result<(), CartError>;
}

/// Keeps serialized carts in a map, the way a browser keeps local storage.
#[derive(Default)]
pub struct MemoryCartStorage {
  entries: Mutex<HashMap<String, String>>,
}

impl MemoryCartStorage {
  pub fn new() -> Self {
    Self::default()
  }

  /// Raw stored JSON for `key`.
  pub fn raw(&self, key: &str) -> Option<String> {
    self.entries.lock().get(key).cloned()
  }
}

#[async_trait]
impl CartStorage for MemoryCartStorage {
  async fn load(&self, key: &str) -> Result<Option<Vec<CartItem>>, CartError> {
    let raw = self.entries.lock().get(key).cloned();
    raw.map(|json| serde_json::from_str(&json)).transpose().map_err(CartError::from)
  }

  async fn save(&self, key: &str, items: &[CartItem]) -> Result<(), CartError> {
    let json = serde_json::to_string(items)?;
    self.entries.lock().insert(key.to_string(), json);
    Ok(())
  }
}

/// One `<key>.json` file per cart inside `dir`.
pub struct FileCartStorage {
  dir: PathBuf,
}

impl FileCartStorage {
  pub fn new(dir: impl Into<PathBuf>) -> Self {
    Self { dir: dir.into() }
  }

  fn path_for(&self, key: &str) -> PathBuf {
    let safe: String = key
      .chars()
      .map(|c| if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') { c } else { '_' })
      .collect();
    self.dir.join(format!("{}.json", safe))
  }
}

#[async_trait]
impl CartStorage for FileCartStorage {
  async fn load(&self, key: &str) -> Result<Option<Vec<CartItem>>, CartError> {
    let path = self.path_for(key);
    match tokio::fs::read(&path).await {
      Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
      Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
      Err(e) => Err(e.into()),
    }
  }

  async fn save(&self, key: &str, items: &[CartItem]) -> Result<(), CartError> {
    tokio::fs::create_dir_all(&self.dir).await?;
    let path = self.path_for(key);
    let tmp = path.with_extension("json.tmp");
    tokio::fs::write(&tmp, serde_json::to_vec(items)?).await?;
    tokio::fs::rename(&tmp, &path).await?;
    debug!(path = %path.display(), lines = items.len(), "Cart persisted.");
    Ok(())
  }
}
