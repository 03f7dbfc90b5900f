// greenhouse_storefront/src/store/memory.rs

//! In-process store. One mutex guards every table, so each call is atomic.

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use std::collections::HashMap;
use tracing::debug;
use uuid::Uuid;

use super::{OrderFilter, ProductFilter, QuotationFilter, SelectionCommit, Store, StoreError, StoreResult};
use crate::models::{
  Lifecycle, Merchant, MerchantStatus, Order, OrderStatus, Product, Quotation, QuotationStatus, Review, UserProfile,
};

#[derive(Default)]
struct Tables {
  sequences: HashMap<(String, i32), i64>,
  products: Vec<Product>,
  profiles: HashMap<Uuid, UserProfile>,
  merchants: Vec<Merchant>,
  quotations: Vec<Quotation>,
  orders: Vec<Order>,
  reviews: Vec<Review>,
}

impl Tables {
  fn check_quotation_unique(&self, q: &Quotation) -> StoreResult<()> {
    let clash = self.quotations.iter().any(|existing| {
      existing.quotation_code == q.quotation_code
        && existing.is_user_request == q.is_user_request
        && (q.is_user_request || existing.merchant_code == q.merchant_code)
    });
    if clash {
      let what = if q.is_user_request {
        format!("quotation request {} already exists", q.quotation_code)
      } else {
        format!(
          "merchant {} already has a bid on {}",
          q.merchant_code.as_deref().unwrap_or("?"),
          q.quotation_code
        )
      };
      return Err(StoreError::Conflict(what));
    }
    Ok(())
  }
}

#[derive(Default)]
pub struct MemoryStore {
  tables: Mutex<Tables>,
}

impl MemoryStore {
  pub fn new() -> Self {
    Self::default()
  }
}

#[async_trait]
impl Store for MemoryStore {
  async fn next_sequence(&self, prefix: &str, year: i32) -> StoreResult<i64> {
    let mut tables = self.tables.lock();
    let counter = tables.sequences.entry((prefix.to_string(), year)).or_insert(0);
    *counter += 1;
    Ok(*counter)
  }

  async fn list_products(&self, filter: &ProductFilter) -> StoreResult<Vec<Product>> {
    let tables = self.tables.lock();
    let mut products: Vec<Product> = tables
      .products
      .iter()
      .filter(|p| !filter.active_only || p.is_active)
      .filter(|p| filter.category.as_ref().map_or(true, |c| &p.category == c))
      .filter(|p| filter.merchant_code.is_none() || p.merchant_code == filter.merchant_code)
      .cloned()
      .collect();
    products.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(products)
  }

  async fn get_product(&self, id: Uuid) -> StoreResult<Option<Product>> {
    Ok(self.tables.lock().products.iter().find(|p| p.id == id).cloned())
  }

  async fn get_products(&self, ids: &[Uuid]) -> StoreResult<Vec<Product>> {
    let tables = self.tables.lock();
    Ok(tables.products.iter().filter(|p| ids.contains(&p.id)).cloned().collect())
  }

  async fn insert_product(&self, product: &Product) -> StoreResult<Product> {
    let mut tables = self.tables.lock();
    if tables.products.iter().any(|p| p.id == product.id) {
      return Err(StoreError::Conflict(format!("product {} already exists", product.id)));
    }
    tables.products.push(product.clone());
    Ok(product.clone())
  }

  async fn update_product(&self, product: &Product) -> StoreResult<Product> {
    let mut tables = self.tables.lock();
    let slot = tables
      .products
      .iter_mut()
      .find(|p| p.id == product.id)
      .ok_or_else(|| StoreError::NotFound(format!("product {}", product.id)))?;
    *slot = product.clone();
    Ok(product.clone())
  }

  async fn get_profile(&self, user_id: Uuid) -> StoreResult<Option<UserProfile>> {
    Ok(self.tables.lock().profiles.get(&user_id).cloned())
  }

  async fn upsert_profile(&self, profile: &UserProfile) -> StoreResult<UserProfile> {
    let mut tables = self.tables.lock();
    let stored = match tables.profiles.get(&profile.user_id) {
      Some(existing) => UserProfile {
        created_at: existing.created_at,
        ..profile.clone()
      },
      None => profile.clone(),
    };
    tables.profiles.insert(profile.user_id, stored.clone());
    Ok(stored)
  }

  async fn get_merchant(&self, merchant_code: &str) -> StoreResult<Option<Merchant>> {
    let tables = self.tables.lock();
    Ok(tables.merchants.iter().find(|m| m.merchant_code == merchant_code).cloned())
  }

  async fn get_merchant_by_user(&self, user_id: Uuid) -> StoreResult<Option<Merchant>> {
    let tables = self.tables.lock();
    Ok(tables.merchants.iter().find(|m| m.user_id == user_id).cloned())
  }

  async fn list_merchants(&self, status: Option<MerchantStatus>) -> StoreResult<Vec<Merchant>> {
    let tables = self.tables.lock();
    Ok(
      tables
        .merchants
        .iter()
        .filter(|m| status.map_or(true, |s| m.status == s))
        .cloned()
        .collect(),
    )
  }

  async fn insert_merchant(&self, merchant: &Merchant) -> StoreResult<Merchant> {
    let mut tables = self.tables.lock();
    if tables.merchants.iter().any(|m| m.user_id == merchant.user_id) {
      return Err(StoreError::Conflict(format!(
        "user {} already has a merchant account",
        merchant.user_id
      )));
    }
    if tables.merchants.iter().any(|m| m.merchant_code == merchant.merchant_code) {
      return Err(StoreError::Conflict(format!(
        "merchant code {} already exists",
        merchant.merchant_code
      )));
    }
    tables.merchants.push(merchant.clone());
    Ok(merchant.clone())
  }

  async fn update_merchant_status(
    &self,
    merchant_code: &str,
    expected: MerchantStatus,
    next: MerchantStatus,
  ) -> StoreResult<Merchant> {
    let mut tables = self.tables.lock();
    let merchant = tables
      .merchants
      .iter_mut()
      .find(|m| m.merchant_code == merchant_code)
      .ok_or_else(|| StoreError::NotFound(format!("merchant {}", merchant_code)))?;
    if merchant.status != expected {
      return Err(StoreError::Conflict(format!(
        "merchant {} is {}, expected {}",
        merchant_code,
        merchant.status.as_str(),
        expected.as_str()
      )));
    }
    merchant.status = next;
    merchant.updated_at = Utc::now();
    Ok(merchant.clone())
  }

  async fn insert_quotation(&self, quotation: &Quotation) -> StoreResult<Quotation> {
    let mut tables = self.tables.lock();
    tables.check_quotation_unique(quotation)?;
    tables.quotations.push(quotation.clone());
    Ok(quotation.clone())
  }

  async fn delete_quotation(&self, id: Uuid) -> StoreResult<()> {
    let mut tables = self.tables.lock();
    let before = tables.quotations.len();
    tables.quotations.retain(|q| q.id != id);
    if tables.quotations.len() == before {
      return Err(StoreError::NotFound(format!("quotation {}", id)));
    }
    Ok(())
  }

  async fn get_request(&self, quotation_code: &str) -> StoreResult<Option<Quotation>> {
    let tables = self.tables.lock();
    Ok(
      tables
        .quotations
        .iter()
        .find(|q| q.is_user_request && q.quotation_code == quotation_code)
        .cloned(),
    )
  }

  async fn list_bids(&self, quotation_code: &str) -> StoreResult<Vec<Quotation>> {
    let tables = self.tables.lock();
    Ok(
      tables
        .quotations
        .iter()
        .filter(|q| !q.is_user_request && q.quotation_code == quotation_code)
        .cloned()
        .collect(),
    )
  }

  async fn list_quotations(&self, filter: &QuotationFilter) -> StoreResult<Vec<Quotation>> {
    let tables = self.tables.lock();
    Ok(
      tables
        .quotations
        .iter()
        .rev()
        .filter(|q| filter.user_id.map_or(true, |u| q.user_id == u))
        .filter(|q| filter.is_user_request.map_or(true, |r| q.is_user_request == r))
        .filter(|q| filter.merchant_code.is_none() || q.merchant_code == filter.merchant_code)
        .filter(|q| filter.quotation_code.as_ref().map_or(true, |c| &q.quotation_code == c))
        .filter(|q| filter.status.map_or(true, |s| q.status == s))
        .cloned()
        .collect(),
    )
  }

  async fn submit_bid(&self, bid: &Quotation) -> StoreResult<Quotation> {
    self.insert_quotation(bid).await
  }

  async fn update_quotation_status(
    &self,
    id: Uuid,
    expected: QuotationStatus,
    next: QuotationStatus,
  ) -> StoreResult<Quotation> {
    let mut tables = self.tables.lock();
    let quotation = tables
      .quotations
      .iter_mut()
      .find(|q| q.id == id)
      .ok_or_else(|| StoreError::NotFound(format!("quotation {}", id)))?;
    if quotation.status != expected {
      return Err(StoreError::Conflict(format!(
        "quotation {} is {}, expected {}",
        quotation.quotation_code,
        quotation.status.as_str(),
        expected.as_str()
      )));
    }
    quotation.status = next;
    quotation.updated_at = Utc::now();
    Ok(quotation.clone())
  }

  async fn commit_selection(&self, commit: &SelectionCommit) -> StoreResult<Vec<Order>> {
    let mut tables = self.tables.lock();

    // Validate everything before the first write.
    let request = tables
      .quotations
      .iter()
      .find(|q| q.id == commit.request_id)
      .ok_or_else(|| StoreError::NotFound(format!("quotation {}", commit.quotation_code)))?;
    if request.status != commit.expected_status {
      return Err(StoreError::Conflict(format!(
        "quotation {} is {}, expected {}",
        commit.quotation_code,
        request.status.as_str(),
        commit.expected_status.as_str()
      )));
    }
    for merchant in &commit.selected_merchants {
      let open_bid = tables.quotations.iter().any(|q| {
        !q.is_user_request
          && q.quotation_code == commit.quotation_code
          && q.merchant_code.as_deref() == Some(merchant.as_str())
          && matches!(q.status, QuotationStatus::Pending | QuotationStatus::Approved)
      });
      if !open_bid {
        return Err(StoreError::Conflict(format!(
          "bid of {} on {} is no longer open",
          merchant, commit.quotation_code
        )));
      }
    }
    if commit.orders.iter().any(|o| tables.orders.iter().any(|e| e.id == o.id)) {
      return Err(StoreError::Conflict("order id already exists".to_string()));
    }

    let now = Utc::now();
    for q in tables.quotations.iter_mut() {
      if q.quotation_code != commit.quotation_code {
        continue;
      }
      if q.id == commit.request_id {
        q.status = QuotationStatus::OrderPlaced;
        q.selected_merchants = commit.selected_merchants.clone();
        q.confirmed_at = Some(commit.confirmed_at);
        q.order_placed_at = Some(now);
        q.updated_at = now;
      } else if !q.is_user_request
        && q.merchant_code.as_ref().is_some_and(|m| commit.selected_merchants.contains(m))
      {
        q.status = QuotationStatus::UserConfirmed;
        q.confirmed_at = Some(commit.confirmed_at);
        q.updated_at = now;
      }
    }
    tables.orders.extend(commit.orders.iter().cloned());
    debug!(
      quotation_code = %commit.quotation_code,
      orders = commit.orders.len(),
      "Selection committed to memory store."
    );
    Ok(commit.orders.clone())
  }

  async fn insert_orders(&self, orders: &[Order]) -> StoreResult<Vec<Order>> {
    let mut tables = self.tables.lock();
    if orders.iter().any(|o| tables.orders.iter().any(|e| e.id == o.id)) {
      return Err(StoreError::Conflict("order id already exists".to_string()));
    }
    tables.orders.extend(orders.iter().cloned());
    Ok(orders.to_vec())
  }

  async fn get_order(&self, id: Uuid) -> StoreResult<Option<Order>> {
    Ok(self.tables.lock().orders.iter().find(|o| o.id == id).cloned())
  }

  async fn list_orders(&self, filter: &OrderFilter) -> StoreResult<Vec<Order>> {
    let tables = self.tables.lock();
    Ok(
      tables
        .orders
        .iter()
        .rev()
        .filter(|o| filter.user_id.is_none() || o.user_id == filter.user_id)
        .filter(|o| filter.merchant_code.is_none() || o.merchant_code == filter.merchant_code)
        .filter(|o| filter.quotation_code.is_none() || o.quotation_code == filter.quotation_code)
        .filter(|o| filter.status.map_or(true, |s| o.status == s))
        .cloned()
        .collect(),
    )
  }

  async fn update_order_status(&self, id: Uuid, expected: OrderStatus, next: OrderStatus) -> StoreResult<Order> {
    let mut tables = self.tables.lock();
    let order = tables
      .orders
      .iter_mut()
      .find(|o| o.id == id)
      .ok_or_else(|| StoreError::NotFound(format!("order {}", id)))?;
    if order.status != expected {
      return Err(StoreError::Conflict(format!(
        "order {} is {}, expected {}",
        id,
        order.status.as_str(),
        expected.as_str()
      )));
    }
    order.status = next;
    order.updated_at = Utc::now();
    Ok(order.clone())
  }

  async fn insert_review(&self, review: &Review) -> StoreResult<Review> {
    let mut tables = self.tables.lock();
    tables.reviews.push(review.clone());
    Ok(review.clone())
  }

  async fn list_reviews(&self, product_id: Uuid) -> StoreResult<Vec<Review>> {
    let tables = self.tables.lock();
    Ok(
      tables
        .reviews
        .iter()
        .rev()
        .filter(|r| r.product_id == product_id)
        .cloned()
        .collect(),
    )
  }
}
