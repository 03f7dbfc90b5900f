// greenhouse_storefront/src/models/product.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Product {
  pub id: Uuid,
  pub name: String,
  pub category: String,
  pub description: Option<String>,
  /// Minor currency units.
  pub price: i64,
  pub stock_quantity: i32,
  pub image_url: Option<String>,
  /// `None` for house catalogue products.
  pub merchant_code: Option<String>,
  pub is_active: bool,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewProduct {
  pub name: String,
  pub category: String,
  pub description: Option<String>,
  pub price: i64,
  pub stock_quantity: i32,
  pub image_url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductUpdate {
  pub name: Option<String>,
  pub category: Option<String>,
  pub description: Option<String>,
  pub price: Option<i64>,
  pub stock_quantity: Option<i32>,
  pub image_url: Option<String>,
  pub is_active: Option<bool>,
}

impl Product {
  pub fn from_new(new: NewProduct, merchant_code: Option<String>) -> Self {
    let now = Utc::now();
    Self {
      id: Uuid::new_v4(),
      name: new.name,
      category: new.category,
      description: new.description,
      price: new.price,
      stock_quantity: new.stock_quantity,
      image_url: new.image_url,
      merchant_code,
      is_active: true,
      created_at: now,
      updated_at: now,
    }
  }

  pub fn apply(&mut self, update: ProductUpdate) {
    if let Some(name) = update.name {
      self.name = name;
    }
    if let Some(category) = update.category {
      self.category = category;
    }
    if update.description.is_some() {
      self.description = update.description;
    }
    if let Some(price) = update.price {
      self.price = price;
    }
    if let Some(stock) = update.stock_quantity {
      self.stock_quantity = stock;
    }
    if update.image_url.is_some() {
      self.image_url = update.image_url;
    }
    if let Some(active) = update.is_active {
      self.is_active = active;
    }
    self.updated_at = Utc::now();
  }
}
