// tests/common/mod.rs
#![allow(dead_code)]

use async_trait::async_trait;
use greenhouse_storefront::cart::{CartError, CartItem, CartOwner, CartStorage, MemoryCartStorage};
use greenhouse_storefront::config::AppConfig;
use greenhouse_storefront::models::{Merchant, MerchantStatus, NewProduct, Product, UserProfile, UserRole};
use greenhouse_storefront::services::merchant_service::{self, MerchantRegistration};
use greenhouse_storefront::state::AppState;
use greenhouse_storefront::store::MemoryStore;
use once_cell::sync::Lazy;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::Level;
use uuid::Uuid;

static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  tracing_subscriber::fmt()
    .with_max_level(Level::DEBUG)
    .with_test_writer()
    .try_init()
    .ok();
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}

/// Cart storage whose saves can be made to fail on demand.
#[derive(Default)]
pub struct FlakyCartStorage {
  inner: MemoryCartStorage,
  fail_saves: AtomicBool,
}

impl FlakyCartStorage {
  pub fn set_failing(&self, failing: bool) {
    self.fail_saves.store(failing, Ordering::SeqCst);
  }

  pub fn raw(&self, key: &str) -> Option<String> {
    self.inner.raw(key)
  }
}

#[async_trait]
impl CartStorage for FlakyCartStorage {
  async fn load(&self, key: &str) -> Result<Option<Vec<CartItem>>, CartError> {
    self.inner.load(key).await
  }

  async fn save(&self, key: &str, items: &[CartItem]) -> Result<(), CartError> {
    if self.fail_saves.load(Ordering::SeqCst) {
      return Err(CartError::Unavailable("simulated storage outage".to_string()));
    }
    self.inner.save(key, items).await
  }
}

pub fn test_state() -> AppState {
  test_state_with(Arc::new(MemoryCartStorage::new()))
}

pub fn test_state_with(cart_storage: Arc<dyn CartStorage>) -> AppState {
  setup_tracing();
  AppState::new(Arc::new(MemoryStore::new()), cart_storage, AppConfig::in_memory())
}

pub async fn seed_product(state: &AppState, name: &str, price: i64, stock: i32, merchant_code: Option<&str>) -> Product {
  let new = NewProduct {
    name: name.to_string(),
    category: "Indoor".to_string(),
    description: None,
    price,
    stock_quantity: stock,
    image_url: None,
  };
  state
    .store
    .insert_product(&Product::from_new(new, merchant_code.map(str::to_string)))
    .await
    .expect("insert product")
}

/// Registers a merchant for a fresh user and approves it.
pub async fn approved_merchant(state: &AppState, business_name: &str) -> (Uuid, Merchant) {
  let user_id = Uuid::new_v4();
  let merchant = pending_merchant(state, user_id, business_name).await;
  let approved = merchant_service::set_merchant_status(state, &merchant.merchant_code, MerchantStatus::Approved)
    .await
    .expect("approve merchant");
  (user_id, approved)
}

pub async fn pending_merchant(state: &AppState, user_id: Uuid, business_name: &str) -> Merchant {
  merchant_service::register_merchant(
    state,
    user_id,
    &format!("{}@nursery.test", user_id.simple()),
    MerchantRegistration {
      business_name: business_name.to_string(),
      phone: None,
      address: None,
    },
  )
  .await
  .expect("register merchant")
}

pub async fn admin_user(state: &AppState) -> Uuid {
  let user_id = Uuid::new_v4();
  let now = chrono::Utc::now();
  state
    .store
    .upsert_profile(&UserProfile {
      user_id,
      email: "admin@nursery.test".to_string(),
      full_name: None,
      phone: None,
      role: UserRole::Admin,
      created_at: now,
      updated_at: now,
    })
    .await
    .expect("admin profile");
  user_id
}

pub fn cart_line(product: &Product, quantity: u32) -> CartItem {
  CartItem {
    id: product.id,
    name: product.name.clone(),
    category: product.category.clone(),
    price: product.price,
    quantity,
    image: product.image_url.clone(),
    year: None,
    size: None,
  }
}

pub async fn fill_cart(state: &AppState, owner: &CartOwner, lines: &[(&Product, u32)]) {
  let cart = state.carts.cart_for(owner).await.expect("open cart");
  for (product, quantity) in lines {
    cart.add_item(cart_line(product, *quantity)).await.expect("add to cart");
  }
}
