// greenhouse_storefront/src/services/catalog_service.rs

//! Product catalogue, merchant-managed products and reviews.

use chrono::Utc;
use serde::Deserialize;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::errors::{AppError, Result};
use crate::models::{NewProduct, Product, ProductUpdate, Review, ReviewSummary};
use crate::services::merchant_service::require_approved;
use crate::state::AppState;
use crate::store::ProductFilter;

#[derive(Debug, Clone, Deserialize)]
pub struct NewReview {
  pub rating: i32,
  pub comment: Option<String>,
}

fn validate_product(product: &Product) -> Result<()> {
  if product.name.trim().is_empty() {
    return Err(AppError::Validation("Product name is required.".to_string()));
  }
  if product.category.trim().is_empty() {
    return Err(AppError::Validation("Product category is required.".to_string()));
  }
  if product.price < 0 {
    return Err(AppError::Validation("Price cannot be negative.".to_string()));
  }
  if product.stock_quantity < 0 {
    return Err(AppError::Validation("Stock cannot be negative.".to_string()));
  }
  Ok(())
}

pub async fn list_products(state: &AppState, category: Option<String>) -> Result<Vec<Product>> {
  let filter = ProductFilter {
    category,
    merchant_code: None,
    active_only: true,
  };
  Ok(state.store.list_products(&filter).await?)
}

pub async fn get_product(state: &AppState, id: Uuid) -> Result<Product> {
  state
    .store
    .get_product(id)
    .await?
    .filter(|p| p.is_active)
    .ok_or_else(|| AppError::NotFound(format!("Product with ID {} not found.", id)))
}

pub async fn list_merchant_products(state: &AppState, user_id: Uuid) -> Result<Vec<Product>> {
  let merchant = require_approved(state, user_id).await?;
  let filter = ProductFilter {
    merchant_code: Some(merchant.merchant_code),
    ..Default::default()
  };
  Ok(state.store.list_products(&filter).await?)
}

#[instrument(skip(state, new), fields(user_id = %user_id))]
pub async fn create_merchant_product(state: &AppState, user_id: Uuid, new: NewProduct) -> Result<Product> {
  let merchant = require_approved(state, user_id).await?;
  let product = Product::from_new(new, Some(merchant.merchant_code));
  validate_product(&product)?;
  let created = state.store.insert_product(&product).await?;
  info!(product_id = %created.id, "Merchant product created.");
  Ok(created)
}

#[instrument(skip(state, update), fields(user_id = %user_id))]
pub async fn update_merchant_product(
  state: &AppState,
  user_id: Uuid,
  product_id: Uuid,
  update: ProductUpdate,
) -> Result<Product> {
  let merchant = require_approved(state, user_id).await?;
  let mut product = state
    .store
    .get_product(product_id)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Product with ID {} not found.", product_id)))?;
  if product.merchant_code.as_deref() != Some(merchant.merchant_code.as_str()) {
    return Err(AppError::Forbidden("You can only edit your own products.".to_string()));
  }
  product.apply(update);
  validate_product(&product)?;
  Ok(state.store.update_product(&product).await?)
}

pub async fn list_reviews(state: &AppState, product_id: Uuid) -> Result<ReviewSummary> {
  let reviews = state.store.list_reviews(product_id).await?;
  Ok(ReviewSummary::from_reviews(reviews))
}

pub async fn add_review(state: &AppState, user_id: Uuid, product_id: Uuid, new: NewReview) -> Result<Review> {
  if !(1..=5).contains(&new.rating) {
    return Err(AppError::Validation("Rating must be between 1 and 5.".to_string()));
  }
  get_product(state, product_id).await?;
  let review = Review {
    id: Uuid::new_v4(),
    product_id,
    user_id,
    rating: new.rating,
    comment: new.comment.filter(|c| !c.trim().is_empty()),
    created_at: Utc::now(),
  };
  Ok(state.store.insert_review(&review).await?)
}
