// greenhouse_storefront/src/store/mod.rs

//! Store access behind one trait.
//!
//! `PgStore` talks to Postgres through sqlx; `MemoryStore` keeps every table in
//! process memory and backs the tests and `STORE_BACKEND=memory`. Both give the
//! same guarantees: atomic code sequences, at most one request row per code, at
//! most one bid per (code, merchant), compare-and-set status writes, and a
//! selection commit that changes every row or none.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::models::{
  Merchant, MerchantStatus, Order, OrderStatus, Product, Quotation, QuotationStatus, Review, UserProfile,
};

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[derive(Debug, Error)]
pub enum StoreError {
  #[error("{0} not found")]
  NotFound(String),

  #[error("{0}")]
  Conflict(String),

  #[error("database error: {0}")]
  Database(#[from] sqlx::Error),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Default, Clone)]
pub struct ProductFilter {
  pub category: Option<String>,
  pub merchant_code: Option<String>,
  pub active_only: bool,
}

#[derive(Debug, Default, Clone)]
pub struct QuotationFilter {
  pub user_id: Option<Uuid>,
  pub is_user_request: Option<bool>,
  pub merchant_code: Option<String>,
  pub quotation_code: Option<String>,
  pub status: Option<QuotationStatus>,
}

#[derive(Debug, Default, Clone)]
pub struct OrderFilter {
  pub user_id: Option<Uuid>,
  pub merchant_code: Option<String>,
  pub quotation_code: Option<String>,
  pub status: Option<OrderStatus>,
}

/// Every write made when a buyer confirms a merchant selection.
#[derive(Debug, Clone)]
pub struct SelectionCommit {
  pub request_id: Uuid,
  pub quotation_code: String,
  /// Request status read before the commit; the commit fails if it changed.
  pub expected_status: QuotationStatus,
  pub selected_merchants: Vec<String>,
  pub orders: Vec<Order>,
  pub confirmed_at: DateTime<Utc>,
}

#[async_trait]
pub trait Store: Send + Sync {
  /// Next value of the (prefix, year) counter, starting at 1.
  async fn next_sequence(&self, prefix: &str, year: i32) -> StoreResult<i64>;

  // --- products ---
  async fn list_products(&self, filter: &ProductFilter) -> StoreResult<Vec<Product>>;
  async fn get_product(&self, id: Uuid) -> StoreResult<Option<Product>>;
  async fn get_products(&self, ids: &[Uuid]) -> StoreResult<Vec<Product>>;
  async fn insert_product(&self, product: &Product) -> StoreResult<Product>;
  async fn update_product(&self, product: &Product) -> StoreResult<Product>;

  // --- user profiles ---
  async fn get_profile(&self, user_id: Uuid) -> StoreResult<Option<UserProfile>>;
  async fn upsert_profile(&self, profile: &UserProfile) -> StoreResult<UserProfile>;

  // --- merchants ---
  async fn get_merchant(&self, merchant_code: &str) -> StoreResult<Option<Merchant>>;
  async fn get_merchant_by_user(&self, user_id: Uuid) -> StoreResult<Option<Merchant>>;
  async fn list_merchants(&self, status: Option<MerchantStatus>) -> StoreResult<Vec<Merchant>>;
  /// Conflict if the user already owns a merchant account.
  async fn insert_merchant(&self, merchant: &Merchant) -> StoreResult<Merchant>;
  async fn update_merchant_status(
    &self,
    merchant_code: &str,
    expected: MerchantStatus,
    next: MerchantStatus,
  ) -> StoreResult<Merchant>;

  // --- quotations ---
  /// Conflict if a request row with the same code, or a bid row for the same
  /// (code, merchant), already exists.
  async fn insert_quotation(&self, quotation: &Quotation) -> StoreResult<Quotation>;
  async fn delete_quotation(&self, id: Uuid) -> StoreResult<()>;
  async fn get_request(&self, quotation_code: &str) -> StoreResult<Option<Quotation>>;
  async fn list_bids(&self, quotation_code: &str) -> StoreResult<Vec<Quotation>>;
  async fn list_quotations(&self, filter: &QuotationFilter) -> StoreResult<Vec<Quotation>>;
  /// Inserts a priced bid row. Same conflicts as `insert_quotation`.
  async fn submit_bid(&self, bid: &Quotation) -> StoreResult<Quotation>;
  async fn update_quotation_status(
    &self,
    id: Uuid,
    expected: QuotationStatus,
    next: QuotationStatus,
  ) -> StoreResult<Quotation>;
  /// Applies a selection atomically and returns the inserted orders.
  async fn commit_selection(&self, commit: &SelectionCommit) -> StoreResult<Vec<Order>>;

  // --- orders ---
  /// Inserts all orders or none.
  async fn insert_orders(&self, orders: &[Order]) -> StoreResult<Vec<Order>>;
  async fn get_order(&self, id: Uuid) -> StoreResult<Option<Order>>;
  async fn list_orders(&self, filter: &OrderFilter) -> StoreResult<Vec<Order>>;
  async fn update_order_status(&self, id: Uuid, expected: OrderStatus, next: OrderStatus) -> StoreResult<Order>;

  // --- reviews ---
  async fn insert_review(&self, review: &Review) -> StoreResult<Review>;
  async fn list_reviews(&self, product_id: Uuid) -> StoreResult<Vec<Review>>;
}
