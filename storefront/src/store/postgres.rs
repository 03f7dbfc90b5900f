// greenhouse_storefront/src/store/postgres.rs

//! Postgres store over sqlx runtime queries. Schema: `storefront/schema.sql`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgConnection, PgPool, PgPoolOptions};
use sqlx::types::Json;
use sqlx::FromRow;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use super::{OrderFilter, ProductFilter, QuotationFilter, SelectionCommit, Store, StoreError, StoreResult};
use crate::models::{
  Merchant, MerchantStatus, Order, OrderLine, OrderStatus, Product, Quotation, QuotationItem, QuotationStatus, Review,
  UserProfile,
};

const PRODUCT_COLUMNS: &str = "id, name, category, description, price, stock_quantity, image_url, merchant_code, \
   is_active, created_at, updated_at";
const MERCHANT_COLUMNS: &str =
  "merchant_code, user_id, business_name, email, phone, address, status, created_at, updated_at";
const PROFILE_COLUMNS: &str = "user_id, email, full_name, phone, role, created_at, updated_at";
const QUOTATION_COLUMNS: &str = "id, quotation_code, user_id, merchant_code, is_user_request, items, unit_prices, \
   total_amount, status, estimated_delivery_days, selected_merchants, created_at, confirmed_at, order_placed_at, \
   updated_at";
const ORDER_COLUMNS: &str = "id, user_id, guest_email, quotation_code, merchant_code, total_amount, status, \
   cart_items, payment_reference, created_at, updated_at";
const REVIEW_COLUMNS: &str = "id, product_id, user_id, rating, comment, created_at";

const UNIQUE_VIOLATION: &str = "23505";
const DATATYPE_MISMATCH: &str = "42804";
const UNDEFINED_FUNCTION: &str = "42883";

#[derive(FromRow)]
struct QuotationRow {
  id: Uuid,
  quotation_code: String,
  user_id: Uuid,
  merchant_code: Option<String>,
  is_user_request: bool,
  items: Json<Vec<QuotationItem>>,
  unit_prices: Json<Vec<Option<i64>>>,
  total_amount: Option<i64>,
  status: QuotationStatus,
  estimated_delivery_days: Option<i32>,
  selected_merchants: Vec<String>,
  created_at: DateTime<Utc>,
  confirmed_at: Option<DateTime<Utc>>,
  order_placed_at: Option<DateTime<Utc>>,
  updated_at: DateTime<Utc>,
}

impl From<QuotationRow> for Quotation {
  fn from(row: QuotationRow) -> Self {
    Self {
      id: row.id,
      quotation_code: row.quotation_code,
      user_id: row.user_id,
      merchant_code: row.merchant_code,
      is_user_request: row.is_user_request,
      items: row.items.0,
      unit_prices: row.unit_prices.0,
      total_amount: row.total_amount,
      status: row.status,
      estimated_delivery_days: row.estimated_delivery_days,
      selected_merchants: row.selected_merchants,
      created_at: row.created_at,
      confirmed_at: row.confirmed_at,
      order_placed_at: row.order_placed_at,
      updated_at: row.updated_at,
    }
  }
}

#[derive(FromRow)]
struct OrderRow {
  id: Uuid,
  user_id: Option<Uuid>,
  guest_email: Option<String>,
  quotation_code: Option<String>,
  merchant_code: Option<String>,
  total_amount: i64,
  status: OrderStatus,
  cart_items: Json<Vec<OrderLine>>,
  payment_reference: Option<String>,
  created_at: DateTime<Utc>,
  updated_at: DateTime<Utc>,
}

impl From<OrderRow> for Order {
  fn from(row: OrderRow) -> Self {
    Self {
      id: row.id,
      user_id: row.user_id,
      guest_email: row.guest_email,
      quotation_code: row.quotation_code,
      merchant_code: row.merchant_code,
      total_amount: row.total_amount,
      status: row.status,
      cart_items: row.cart_items.0,
      payment_reference: row.payment_reference,
      created_at: row.created_at,
      updated_at: row.updated_at,
    }
  }
}

fn sql_state(err: &sqlx::Error) -> Option<String> {
  match err {
    sqlx::Error::Database(db_err) => db_err.code().map(|c| c.into_owned()),
    _ => None,
  }
}

/// Unique violations become `Conflict`; everything else stays a database error.
fn conflict_or_db(err: sqlx::Error, what: impl FnOnce() -> String) -> StoreError {
  if sql_state(&err).as_deref() == Some(UNIQUE_VIOLATION) {
    return StoreError::Conflict(what());
  }
  StoreError::Database(err)
}

fn quotation_conflict(q: &Quotation) -> String {
  if q.is_user_request {
    format!("quotation request {} already exists", q.quotation_code)
  } else {
    format!(
      "merchant {} already has a bid on {}",
      q.merchant_code.as_deref().unwrap_or("?"),
      q.quotation_code
    )
  }
}

async fn insert_order(conn: &mut PgConnection, order: &Order) -> StoreResult<()> {
  sqlx::query(
    "INSERT INTO orders (id, user_id, guest_email, quotation_code, merchant_code, total_amount, status, \
     cart_items, payment_reference, created_at, updated_at) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)",
  )
  .bind(order.id)
  .bind(order.user_id)
  .bind(&order.guest_email)
  .bind(&order.quotation_code)
  .bind(&order.merchant_code)
  .bind(order.total_amount)
  .bind(order.status)
  .bind(Json(&order.cart_items))
  .bind(&order.payment_reference)
  .bind(order.created_at)
  .bind(order.updated_at)
  .execute(conn)
  .await
  .map_err(|e| conflict_or_db(e, || format!("order {} already exists", order.id)))?;
  Ok(())
}

#[derive(Clone)]
pub struct PgStore {
  pool: PgPool,
}

impl PgStore {
  pub fn new(pool: PgPool) -> Self {
    Self { pool }
  }

  pub async fn connect(database_url: &str, max_connections: u32) -> StoreResult<Self> {
    let pool = PgPoolOptions::new()
      .max_connections(max_connections)
      .connect(database_url)
      .await?;
    info!(max_connections, "Connected to Postgres.");
    Ok(Self::new(pool))
  }

  pub fn pool(&self) -> &PgPool {
    &self.pool
  }

  async fn fetch_quotation(&self, id: Uuid) -> StoreResult<Option<Quotation>> {
    let row: Option<QuotationRow> =
      sqlx::query_as(&format!("SELECT {} FROM quotations WHERE id = $1", QUOTATION_COLUMNS))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
    Ok(row.map(Quotation::from))
  }

  async fn submit_bid_with_array(&self, bid: &Quotation) -> Result<Option<QuotationRow>, sqlx::Error> {
    sqlx::query_as(&format!(
      "SELECT {} FROM submit_merchant_bid($1, $2, $3, $4, $5, $6)",
      QUOTATION_COLUMNS
    ))
    .bind(bid.id)
    .bind(&bid.quotation_code)
    .bind(&bid.merchant_code)
    .bind(&bid.unit_prices)
    .bind(bid.total_amount)
    .bind(bid.estimated_delivery_days)
    .fetch_optional(&self.pool)
    .await
  }

  async fn submit_bid_with_json(&self, bid: &Quotation) -> StoreResult<Option<QuotationRow>> {
    let prices_json = serde_json::to_string(&bid.unit_prices)?;
    let row = sqlx::query_as(&format!(
      "SELECT {} FROM submit_merchant_bid_json($1, $2, $3, $4, $5, $6)",
      QUOTATION_COLUMNS
    ))
    .bind(bid.id)
    .bind(&bid.quotation_code)
    .bind(&bid.merchant_code)
    .bind(prices_json)
    .bind(bid.total_amount)
    .bind(bid.estimated_delivery_days)
    .fetch_optional(&self.pool)
    .await
    .map_err(|e| conflict_or_db(e, || quotation_conflict(bid)))?;
    Ok(row)
  }
}

#[async_trait]
impl Store for PgStore {
  #[instrument(name = "PgStore::next_sequence", skip(self))]
  async fn next_sequence(&self, prefix: &str, year: i32) -> StoreResult<i64> {
    let value: i64 = sqlx::query_scalar(
      "INSERT INTO code_sequences (prefix, year, last_value) VALUES ($1, $2, 1) \
       ON CONFLICT (prefix, year) DO UPDATE SET last_value = code_sequences.last_value + 1 \
       RETURNING last_value",
    )
    .bind(prefix)
    .bind(year)
    .fetch_one(&self.pool)
    .await?;
    Ok(value)
  }

  async fn list_products(&self, filter: &ProductFilter) -> StoreResult<Vec<Product>> {
    let products = sqlx::query_as(&format!(
      "SELECT {} FROM products WHERE ($1::text IS NULL OR category = $1) \
       AND ($2::text IS NULL OR merchant_code = $2) AND (NOT $3 OR is_active) ORDER BY name ASC",
      PRODUCT_COLUMNS
    ))
    .bind(&filter.category)
    .bind(&filter.merchant_code)
    .bind(filter.active_only)
    .fetch_all(&self.pool)
    .await?;
    Ok(products)
  }

  async fn get_product(&self, id: Uuid) -> StoreResult<Option<Product>> {
    let product = sqlx::query_as(&format!("SELECT {} FROM products WHERE id = $1", PRODUCT_COLUMNS))
      .bind(id)
      .fetch_optional(&self.pool)
      .await?;
    Ok(product)
  }

  async fn get_products(&self, ids: &[Uuid]) -> StoreResult<Vec<Product>> {
    let products = sqlx::query_as(&format!("SELECT {} FROM products WHERE id = ANY($1)", PRODUCT_COLUMNS))
      .bind(ids)
      .fetch_all(&self.pool)
      .await?;
    Ok(products)
  }

  async fn insert_product(&self, product: &Product) -> StoreResult<Product> {
    let stored = sqlx::query_as(&format!(
      "INSERT INTO products ({cols}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) RETURNING {cols}",
      cols = PRODUCT_COLUMNS
    ))
    .bind(product.id)
    .bind(&product.name)
    .bind(&product.category)
    .bind(&product.description)
    .bind(product.price)
    .bind(product.stock_quantity)
    .bind(&product.image_url)
    .bind(&product.merchant_code)
    .bind(product.is_active)
    .bind(product.created_at)
    .bind(product.updated_at)
    .fetch_one(&self.pool)
    .await
    .map_err(|e| conflict_or_db(e, || format!("product {} already exists", product.id)))?;
    Ok(stored)
  }

  async fn update_product(&self, product: &Product) -> StoreResult<Product> {
    let stored: Option<Product> = sqlx::query_as(&format!(
      "UPDATE products SET name = $2, category = $3, description = $4, price = $5, stock_quantity = $6, \
       image_url = $7, is_active = $8, updated_at = $9 WHERE id = $1 RETURNING {}",
      PRODUCT_COLUMNS
    ))
    .bind(product.id)
    .bind(&product.name)
    .bind(&product.category)
    .bind(&product.description)
    .bind(product.price)
    .bind(product.stock_quantity)
    .bind(&product.image_url)
    .bind(product.is_active)
    .bind(product.updated_at)
    .fetch_optional(&self.pool)
    .await?;
    stored.ok_or_else(|| StoreError::NotFound(format!("product {}", product.id)))
  }

  async fn get_profile(&self, user_id: Uuid) -> StoreResult<Option<UserProfile>> {
    let profile = sqlx::query_as(&format!("SELECT {} FROM user_profiles WHERE user_id = $1", PROFILE_COLUMNS))
      .bind(user_id)
      .fetch_optional(&self.pool)
      .await?;
    Ok(profile)
  }

  async fn upsert_profile(&self, profile: &UserProfile) -> StoreResult<UserProfile> {
    let stored = sqlx::query_as(&format!(
      "INSERT INTO user_profiles ({cols}) VALUES ($1, $2, $3, $4, $5, $6, $7) \
       ON CONFLICT (user_id) DO UPDATE SET email = EXCLUDED.email, full_name = EXCLUDED.full_name, \
       phone = EXCLUDED.phone, role = EXCLUDED.role, updated_at = EXCLUDED.updated_at RETURNING {cols}",
      cols = PROFILE_COLUMNS
    ))
    .bind(profile.user_id)
    .bind(&profile.email)
    .bind(&profile.full_name)
    .bind(&profile.phone)
    .bind(profile.role)
    .bind(profile.created_at)
    .bind(profile.updated_at)
    .fetch_one(&self.pool)
    .await?;
    Ok(stored)
  }

  async fn get_merchant(&self, merchant_code: &str) -> StoreResult<Option<Merchant>> {
    let merchant = sqlx::query_as(&format!(
      "SELECT {} FROM merchants WHERE merchant_code = $1",
      MERCHANT_COLUMNS
    ))
    .bind(merchant_code)
    .fetch_optional(&self.pool)
    .await?;
    Ok(merchant)
  }

  async fn get_merchant_by_user(&self, user_id: Uuid) -> StoreResult<Option<Merchant>> {
    let merchant = sqlx::query_as(&format!("SELECT {} FROM merchants WHERE user_id = $1", MERCHANT_COLUMNS))
      .bind(user_id)
      .fetch_optional(&self.pool)
      .await?;
    Ok(merchant)
  }

  async fn list_merchants(&self, status: Option<MerchantStatus>) -> StoreResult<Vec<Merchant>> {
    let merchants = sqlx::query_as(&format!(
      "SELECT {} FROM merchants WHERE ($1::merchant_status_enum IS NULL OR status = $1) ORDER BY created_at ASC",
      MERCHANT_COLUMNS
    ))
    .bind(status)
    .fetch_all(&self.pool)
    .await?;
    Ok(merchants)
  }

  async fn insert_merchant(&self, merchant: &Merchant) -> StoreResult<Merchant> {
    let stored = sqlx::query_as(&format!(
      "INSERT INTO merchants ({cols}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) RETURNING {cols}",
      cols = MERCHANT_COLUMNS
    ))
    .bind(&merchant.merchant_code)
    .bind(merchant.user_id)
    .bind(&merchant.business_name)
    .bind(&merchant.email)
    .bind(&merchant.phone)
    .bind(&merchant.address)
    .bind(merchant.status)
    .bind(merchant.created_at)
    .bind(merchant.updated_at)
    .fetch_one(&self.pool)
    .await
    .map_err(|e| conflict_or_db(e, || format!("user {} already has a merchant account", merchant.user_id)))?;
    Ok(stored)
  }

  #[instrument(name = "PgStore::update_merchant_status", skip(self))]
  async fn update_merchant_status(
    &self,
    merchant_code: &str,
    expected: MerchantStatus,
    next: MerchantStatus,
  ) -> StoreResult<Merchant> {
    let updated: Option<Merchant> = sqlx::query_as(&format!(
      "UPDATE merchants SET status = $3, updated_at = NOW() WHERE merchant_code = $1 AND status = $2 RETURNING {}",
      MERCHANT_COLUMNS
    ))
    .bind(merchant_code)
    .bind(expected)
    .bind(next)
    .fetch_optional(&self.pool)
    .await?;
    if let Some(m) = updated {
      return Ok(m);
    }
    if self.get_merchant(merchant_code).await?.is_some() {
      return Err(StoreError::Conflict(format!(
        "merchant {} changed status concurrently",
        merchant_code
      )));
    }
    Err(StoreError::NotFound(format!("merchant {}", merchant_code)))
  }

  async fn insert_quotation(&self, quotation: &Quotation) -> StoreResult<Quotation> {
    let row: QuotationRow = sqlx::query_as(&format!(
      "INSERT INTO quotations ({cols}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15) \
       RETURNING {cols}",
      cols = QUOTATION_COLUMNS
    ))
    .bind(quotation.id)
    .bind(&quotation.quotation_code)
    .bind(quotation.user_id)
    .bind(&quotation.merchant_code)
    .bind(quotation.is_user_request)
    .bind(Json(&quotation.items))
    .bind(Json(&quotation.unit_prices))
    .bind(quotation.total_amount)
    .bind(quotation.status)
    .bind(quotation.estimated_delivery_days)
    .bind(&quotation.selected_merchants)
    .bind(quotation.created_at)
    .bind(quotation.confirmed_at)
    .bind(quotation.order_placed_at)
    .bind(quotation.updated_at)
    .fetch_one(&self.pool)
    .await
    .map_err(|e| conflict_or_db(e, || quotation_conflict(quotation)))?;
    Ok(row.into())
  }

  async fn delete_quotation(&self, id: Uuid) -> StoreResult<()> {
    let result = sqlx::query("DELETE FROM quotations WHERE id = $1")
      .bind(id)
      .execute(&self.pool)
      .await?;
    if result.rows_affected() == 0 {
      return Err(StoreError::NotFound(format!("quotation {}", id)));
    }
    Ok(())
  }

  async fn get_request(&self, quotation_code: &str) -> StoreResult<Option<Quotation>> {
    let row: Option<QuotationRow> = sqlx::query_as(&format!(
      "SELECT {} FROM quotations WHERE quotation_code = $1 AND is_user_request = TRUE",
      QUOTATION_COLUMNS
    ))
    .bind(quotation_code)
    .fetch_optional(&self.pool)
    .await?;
    Ok(row.map(Quotation::from))
  }

  async fn list_bids(&self, quotation_code: &str) -> StoreResult<Vec<Quotation>> {
    let rows: Vec<QuotationRow> = sqlx::query_as(&format!(
      "SELECT {} FROM quotations WHERE quotation_code = $1 AND is_user_request = FALSE ORDER BY created_at ASC",
      QUOTATION_COLUMNS
    ))
    .bind(quotation_code)
    .fetch_all(&self.pool)
    .await?;
    Ok(rows.into_iter().map(Quotation::from).collect())
  }

  async fn list_quotations(&self, filter: &QuotationFilter) -> StoreResult<Vec<Quotation>> {
    let rows: Vec<QuotationRow> = sqlx::query_as(&format!(
      "SELECT {} FROM quotations WHERE ($1::uuid IS NULL OR user_id = $1) \
       AND ($2::bool IS NULL OR is_user_request = $2) \
       AND ($3::text IS NULL OR merchant_code = $3) \
       AND ($4::text IS NULL OR quotation_code = $4) \
       AND ($5::quotation_status_enum IS NULL OR status = $5) \
       ORDER BY created_at DESC",
      QUOTATION_COLUMNS
    ))
    .bind(filter.user_id)
    .bind(filter.is_user_request)
    .bind(&filter.merchant_code)
    .bind(&filter.quotation_code)
    .bind(filter.status)
    .fetch_all(&self.pool)
    .await?;
    Ok(rows.into_iter().map(Quotation::from).collect())
  }

  /// Inserts through `submit_merchant_bid` (prices as `bigint[]`), retrying with
  /// `submit_merchant_bid_json` (prices as JSON text) when the server rejects the
  /// array parameter's type.
  #[instrument(
    name = "PgStore::submit_bid",
    skip(self, bid),
    fields(quotation_code = %bid.quotation_code, merchant_code = ?bid.merchant_code)
  )]
  async fn submit_bid(&self, bid: &Quotation) -> StoreResult<Quotation> {
    let row = match self.submit_bid_with_array(bid).await {
      Ok(row) => row,
      Err(e) if matches!(sql_state(&e).as_deref(), Some(DATATYPE_MISMATCH) | Some(UNDEFINED_FUNCTION)) => {
        warn!(error = %e, "Array bid procedure rejected; falling back to JSON variant.");
        self.submit_bid_with_json(bid).await?
      }
      Err(e) => return Err(conflict_or_db(e, || quotation_conflict(bid))),
    };
    let row = row.ok_or_else(|| StoreError::NotFound(format!("quotation request {}", bid.quotation_code)))?;
    debug!(bid_id = %row.id, "Bid stored.");
    Ok(row.into())
  }

  async fn update_quotation_status(
    &self,
    id: Uuid,
    expected: QuotationStatus,
    next: QuotationStatus,
  ) -> StoreResult<Quotation> {
    let row: Option<QuotationRow> = sqlx::query_as(&format!(
      "UPDATE quotations SET status = $3, updated_at = NOW() WHERE id = $1 AND status = $2 RETURNING {}",
      QUOTATION_COLUMNS
    ))
    .bind(id)
    .bind(expected)
    .bind(next)
    .fetch_optional(&self.pool)
    .await?;
    if let Some(r) = row {
      return Ok(r.into());
    }
    if self.fetch_quotation(id).await?.is_some() {
      return Err(StoreError::Conflict(format!("quotation {} changed status concurrently", id)));
    }
    Err(StoreError::NotFound(format!("quotation {}", id)))
  }

  #[instrument(
    name = "PgStore::commit_selection",
    skip(self, commit),
    fields(quotation_code = %commit.quotation_code, orders = commit.orders.len())
  )]
  async fn commit_selection(&self, commit: &SelectionCommit) -> StoreResult<Vec<Order>> {
    let mut tx = self.pool.begin().await?;

    let confirmed = sqlx::query(
      "UPDATE quotations SET status = 'user_confirmed', selected_merchants = $2, confirmed_at = $3, \
       updated_at = NOW() WHERE id = $1 AND status = $4",
    )
    .bind(commit.request_id)
    .bind(&commit.selected_merchants)
    .bind(commit.confirmed_at)
    .bind(commit.expected_status)
    .execute(&mut *tx)
    .await?;
    if confirmed.rows_affected() == 0 {
      tx.rollback().await?;
      return Err(StoreError::Conflict(format!(
        "quotation {} is no longer {:?}",
        commit.quotation_code, commit.expected_status
      )));
    }

    // One bid row per (code, merchant), so every selected merchant must match.
    let bids = sqlx::query(
      "UPDATE quotations SET status = 'user_confirmed', confirmed_at = $3, updated_at = NOW() \
       WHERE quotation_code = $1 AND is_user_request = FALSE AND merchant_code = ANY($2) \
       AND status IN ('pending', 'approved')",
    )
    .bind(&commit.quotation_code)
    .bind(&commit.selected_merchants)
    .bind(commit.confirmed_at)
    .execute(&mut *tx)
    .await?;
    if bids.rows_affected() != commit.selected_merchants.len() as u64 {
      tx.rollback().await?;
      return Err(StoreError::Conflict(format!(
        "a selected bid on {} is no longer open",
        commit.quotation_code
      )));
    }

    for order in &commit.orders {
      insert_order(&mut *tx, order).await?;
    }

    sqlx::query(
      "UPDATE quotations SET status = 'order_placed', order_placed_at = NOW(), updated_at = NOW() WHERE id = $1",
    )
    .bind(commit.request_id)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    info!("Selection committed.");
    Ok(commit.orders.clone())
  }

  async fn insert_orders(&self, orders: &[Order]) -> StoreResult<Vec<Order>> {
    let mut tx = self.pool.begin().await?;
    for order in orders {
      insert_order(&mut *tx, order).await?;
    }
    tx.commit().await?;
    Ok(orders.to_vec())
  }

  async fn get_order(&self, id: Uuid) -> StoreResult<Option<Order>> {
    let row: Option<OrderRow> = sqlx::query_as(&format!("SELECT {} FROM orders WHERE id = $1", ORDER_COLUMNS))
      .bind(id)
      .fetch_optional(&self.pool)
      .await?;
    Ok(row.map(Order::from))
  }

  async fn list_orders(&self, filter: &OrderFilter) -> StoreResult<Vec<Order>> {
    let rows: Vec<OrderRow> = sqlx::query_as(&format!(
      "SELECT {} FROM orders WHERE ($1::uuid IS NULL OR user_id = $1) \
       AND ($2::text IS NULL OR merchant_code = $2) \
       AND ($3::text IS NULL OR quotation_code = $3) \
       AND ($4::order_status_enum IS NULL OR status = $4) \
       ORDER BY created_at DESC",
      ORDER_COLUMNS
    ))
    .bind(filter.user_id)
    .bind(&filter.merchant_code)
    .bind(&filter.quotation_code)
    .bind(filter.status)
    .fetch_all(&self.pool)
    .await?;
    Ok(rows.into_iter().map(Order::from).collect())
  }

  async fn update_order_status(&self, id: Uuid, expected: OrderStatus, next: OrderStatus) -> StoreResult<Order> {
    let row: Option<OrderRow> = sqlx::query_as(&format!(
      "UPDATE orders SET status = $3, updated_at = NOW() WHERE id = $1 AND status = $2 RETURNING {}",
      ORDER_COLUMNS
    ))
    .bind(id)
    .bind(expected)
    .bind(next)
    .fetch_optional(&self.pool)
    .await?;
    if let Some(r) = row {
      return Ok(r.into());
    }
    if self.get_order(id).await?.is_some() {
      return Err(StoreError::Conflict(format!("order {} changed status concurrently", id)));
    }
    Err(StoreError::NotFound(format!("order {}", id)))
  }

  async fn insert_review(&self, review: &Review) -> StoreResult<Review> {
    let stored = sqlx::query_as(&format!(
      "INSERT INTO reviews ({cols}) VALUES ($1, $2, $3, $4, $5, $6) RETURNING {cols}",
      cols = REVIEW_COLUMNS
    ))
    .bind(review.id)
    .bind(review.product_id)
    .bind(review.user_id)
    .bind(review.rating)
    .bind(&review.comment)
    .bind(review.created_at)
    .fetch_one(&self.pool)
    .await?;
    Ok(stored)
  }

  async fn list_reviews(&self, product_id: Uuid) -> StoreResult<Vec<Review>> {
    let reviews = sqlx::query_as(&format!(
      "SELECT {} FROM reviews WHERE product_id = $1 ORDER BY created_at DESC",
      REVIEW_COLUMNS
    ))
    .bind(product_id)
    .fetch_all(&self.pool)
    .await?;
    Ok(reviews)
  }
}
