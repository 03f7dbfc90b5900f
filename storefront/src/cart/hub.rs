// greenhouse_storefront/src/cart/hub.rs

use parking_lot::Mutex;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

use super::storage::{CartError, CartStorage, CART_STORAGE_KEY};
use super::store::CartStore;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CartOwner {
  User(Uuid),
  Guest(String),
}

impl CartOwner {
  pub fn storage_key(&self) -> String {
    format!("{}.{}", CART_STORAGE_KEY, self)
  }
}

impl fmt::Display for CartOwner {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      CartOwner::User(id) => write!(f, "user:{}", id),
      CartOwner::Guest(session) => write!(f, "guest:{}", session),
    }
  }
}

pub const DEFAULT_OPEN_CARTS: usize = 10_000;

/// One lazily loaded [`CartStore`] per owner, all sharing one storage backend.
///
/// At most `capacity` stores stay open. Opening one more first drops every
/// store no request is holding; those reload from storage on next use, and
/// their `watch` subscribers stop receiving snapshots.
pub struct CartHub {
  storage: Arc<dyn CartStorage>,
  capacity: usize,
  carts: Mutex<HashMap<CartOwner, Arc<CartStore>>>,
}

impl CartHub {
  pub fn new(storage: Arc<dyn CartStorage>) -> Self {
    Self::with_capacity(storage, DEFAULT_OPEN_CARTS)
  }

  pub fn with_capacity(storage: Arc<dyn CartStorage>, capacity: usize) -> Self {
    Self {
      storage,
      capacity: capacity.max(1),
      carts: Mutex::new(HashMap::new()),
    }
  }

  pub fn open_carts(&self) -> usize {
    self.carts.lock().len()
  }

  pub async fn cart_for(&self, owner: &CartOwner) -> Result<Arc<CartStore>, CartError> {
    let existing = self.carts.lock().get(owner).cloned();
    if let Some(store) = existing {
      return Ok(store);
    }
    let loaded = Arc::new(CartStore::load(owner.storage_key(), self.storage.clone()).await?);

    let mut carts = self.carts.lock();
    // Another request may have opened the same cart while this one was loading.
    if let Some(store) = carts.get(owner) {
      return Ok(store.clone());
    }
    if carts.len() >= self.capacity {
      // Handles are only cloned under this lock, so a count of one means idle.
      let before = carts.len();
      carts.retain(|_, store| Arc::strong_count(store) > 1);
      debug!(evicted = before - carts.len(), "Idle cart stores evicted.");
    }
    carts.insert(owner.clone(), loaded.clone());
    debug!(%owner, "Cart store opened.");
    Ok(loaded)
  }
}
