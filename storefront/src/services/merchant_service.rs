// greenhouse_storefront/src/services/merchant_service.rs

//! Merchant accounts: registration, lookup and admin approval.

use chrono::Utc;
use serde::Deserialize;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::errors::{AppError, Result};
use crate::models::{Lifecycle, Merchant, MerchantStatus};
use crate::services::codes::{allocate_code, expect_code, CodePrefix};
use crate::state::AppState;

#[derive(Debug, Clone, Deserialize)]
pub struct MerchantRegistration {
  pub business_name: String,
  pub phone: Option<String>,
  pub address: Option<String>,
}

/// Creates a `pending` merchant account for `user_id`. One account per user.
#[instrument(skip(state, registration), fields(user_id = %user_id))]
pub async fn register_merchant(
  state: &AppState,
  user_id: Uuid,
  email: &str,
  registration: MerchantRegistration,
) -> Result<Merchant> {
  let business_name = registration.business_name.trim();
  if business_name.is_empty() {
    return Err(AppError::Validation("Business name is required.".to_string()));
  }
  if email.trim().is_empty() {
    return Err(AppError::Validation("A contact email is required.".to_string()));
  }
  if state.store.get_merchant_by_user(user_id).await?.is_some() {
    return Err(AppError::Conflict("This account is already registered as a merchant.".to_string()));
  }

  let merchant_code = allocate_code(state.store.as_ref(), CodePrefix::Merchant).await?;
  let now = Utc::now();
  let merchant = Merchant {
    merchant_code,
    user_id,
    business_name: business_name.to_string(),
    email: email.to_string(),
    phone: registration.phone,
    address: registration.address,
    status: MerchantStatus::Pending,
    created_at: now,
    updated_at: now,
  };
  let created = state.store.insert_merchant(&merchant).await?;
  info!(merchant_code = %created.merchant_code, "Merchant registered, awaiting approval.");
  Ok(created)
}

/// The merchant account owned by `user_id`.
pub async fn current_merchant(state: &AppState, user_id: Uuid) -> Result<Merchant> {
  state
    .store
    .get_merchant_by_user(user_id)
    .await?
    .ok_or_else(|| AppError::NotFound("No merchant account for this user.".to_string()))
}

/// Like [`current_merchant`] but also requires `approved` status.
pub async fn require_approved(state: &AppState, user_id: Uuid) -> Result<Merchant> {
  let merchant = state
    .store
    .get_merchant_by_user(user_id)
    .await?
    .ok_or_else(|| AppError::Forbidden("A merchant account is required.".to_string()))?;
  if !merchant.is_approved() {
    return Err(AppError::Forbidden(format!(
      "Merchant account {} is {}.",
      merchant.merchant_code,
      merchant.status.as_str()
    )));
  }
  Ok(merchant)
}

pub async fn list_merchants(state: &AppState, status: Option<MerchantStatus>) -> Result<Vec<Merchant>> {
  Ok(state.store.list_merchants(status).await?)
}

#[instrument(skip(state))]
pub async fn set_merchant_status(state: &AppState, merchant_code: &str, next: MerchantStatus) -> Result<Merchant> {
  expect_code(merchant_code, CodePrefix::Merchant)?;
  let merchant = state
    .store
    .get_merchant(merchant_code)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Merchant {} not found.", merchant_code)))?;
  let next = merchant.status.transition(next)?;
  let updated = state
    .store
    .update_merchant_status(merchant_code, merchant.status, next)
    .await?;
  info!(from = merchant.status.as_str(), to = next.as_str(), "Merchant status changed.");
  Ok(updated)
}
