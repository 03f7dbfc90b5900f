// greenhouse_storefront/src/cart/store.rs

//! Observable cart store.
//!
//! The in-memory snapshot is the source of truth and is published to every
//! subscriber through a `watch` channel. Each mutation then persists the full
//! item list; if that fails the previous snapshot is restored and republished.

use std::sync::Arc;
use tokio::sync::{watch, Mutex as AsyncMutex};
use tracing::{instrument, warn};
use uuid::Uuid;

use super::items::{Cart, CartItem};
use super::storage::{CartError, CartStorage};

pub struct CartStore {
  key: String,
  storage: Arc<dyn CartStorage>,
  tx: watch::Sender<Cart>,
  // Serializes mutate-then-persist so saves land in mutation order.
  write_lock: AsyncMutex<()>,
}

impl CartStore {
  /// Opens the cart stored under `key`, empty if nothing is stored yet.
  pub async fn load(key: impl Into<String>, storage: Arc<dyn CartStorage>) -> Result<Self, CartError> {
    let key = key.into();
    let cart = storage.load(&key).await?.map(Cart::from_items).unwrap_or_default();
    let (tx, _rx) = watch::channel(cart);
    Ok(Self {
      key,
      storage,
      tx,
      write_lock: AsyncMutex::new(()),
    })
  }

  pub fn key(&self) -> &str {
    &self.key
  }

  pub fn snapshot(&self) -> Cart {
    self.tx.borrow().clone()
  }

  pub fn subscribe(&self) -> watch::Receiver<Cart> {
    self.tx.subscribe()
  }

  #[instrument(name = "CartStore::update", skip(self, mutate), fields(key = %self.key))]
  pub async fn update<R: Send>(&self, mutate: impl FnOnce(&mut Cart) -> R + Send) -> Result<R, CartError> {
    let _guard = self.write_lock.lock().await;
    let previous = self.snapshot();
    let mut next = previous.clone();
    let out = mutate(&mut next);
    if next == previous {
      return Ok(out);
    }

    let items = next.items().to_vec();
    self.tx.send_replace(next);
    if let Err(e) = self.storage.save(&self.key, &items).await {
      warn!(error = %e, "Cart persistence failed; restoring previous snapshot.");
      self.tx.send_replace(previous);
      return Err(e);
    }
    Ok(out)
  }

  pub async fn add_item(&self, item: CartItem) -> Result<CartItem, CartError> {
    self.update(|cart| cart.add(item)).await
  }

  pub async fn set_quantity(&self, id: Uuid, quantity: u32) -> Result<bool, CartError> {
    self.update(|cart| cart.set_quantity(id, quantity)).await
  }

  pub async fn remove_item(&self, id: Uuid) -> Result<bool, CartError> {
    self.update(|cart| cart.remove(id)).await
  }

  pub async fn clear(&self) -> Result<(), CartError> {
    self.update(|cart| cart.clear()).await
  }

  /// Puts back a previous snapshot, e.g. when a flow that cleared the cart is undone.
  pub async fn restore(&self, cart: Cart) -> Result<(), CartError> {
    self.update(move |current| *current = cart).await
  }
}
