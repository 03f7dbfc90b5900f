// greenhouse_storefront/src/services/order_service.rs

//! Order reads and status changes for buyers, merchants and admins. Every
//! status write is validated against the order transition table and applied
//! as a compare-and-set on the status that was read.

use tracing::{info, instrument};
use uuid::Uuid;

use crate::errors::{AppError, Result};
use crate::models::{Lifecycle, Order, OrderStatus};
use crate::services::merchant_service::current_merchant;
use crate::state::AppState;
use crate::store::OrderFilter;

async fn load_order(state: &AppState, id: Uuid) -> Result<Order> {
  state
    .store
    .get_order(id)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Order {} not found.", id)))
}

async fn transition_order(state: &AppState, order: &Order, next: OrderStatus) -> Result<Order> {
  let next = order.status.transition(next)?;
  let updated = state.store.update_order_status(order.id, order.status, next).await?;
  info!(order_id = %order.id, from = order.status.as_str(), to = next.as_str(), "Order status changed.");
  Ok(updated)
}

// --- buyer ---

pub async fn list_buyer_orders(state: &AppState, user_id: Uuid, status: Option<OrderStatus>) -> Result<Vec<Order>> {
  let filter = OrderFilter {
    user_id: Some(user_id),
    status,
    ..Default::default()
  };
  Ok(state.store.list_orders(&filter).await?)
}

pub async fn get_buyer_order(state: &AppState, user_id: Uuid, id: Uuid) -> Result<Order> {
  let order = load_order(state, id).await?;
  if order.user_id != Some(user_id) {
    return Err(AppError::Forbidden("This order belongs to another account.".to_string()));
  }
  Ok(order)
}

/// Buyers may cancel only orders the merchant has not confirmed yet.
#[instrument(skip(state))]
pub async fn cancel_buyer_order(state: &AppState, user_id: Uuid, id: Uuid) -> Result<Order> {
  let order = get_buyer_order(state, user_id, id).await?;
  if order.status != OrderStatus::Pending {
    return Err(AppError::Conflict(format!(
      "Only pending orders can be cancelled; this one is {}.",
      order.status.as_str()
    )));
  }
  transition_order(state, &order, OrderStatus::Cancelled).await
}

// --- merchant ---

pub async fn list_merchant_orders(
  state: &AppState,
  user_id: Uuid,
  status: Option<OrderStatus>,
) -> Result<Vec<Order>> {
  let merchant = current_merchant(state, user_id).await?;
  let filter = OrderFilter {
    merchant_code: Some(merchant.merchant_code),
    status,
    ..Default::default()
  };
  Ok(state.store.list_orders(&filter).await?)
}

#[instrument(skip(state))]
pub async fn update_merchant_order_status(
  state: &AppState,
  user_id: Uuid,
  id: Uuid,
  next: OrderStatus,
) -> Result<Order> {
  let merchant = current_merchant(state, user_id).await?;
  let order = load_order(state, id).await?;
  if order.merchant_code.as_deref() != Some(merchant.merchant_code.as_str()) {
    return Err(AppError::Forbidden("This order is addressed to another merchant.".to_string()));
  }
  if next == OrderStatus::Pending {
    return Err(AppError::Validation("Orders cannot be moved back to pending.".to_string()));
  }
  transition_order(state, &order, next).await
}

// --- admin ---

pub async fn list_all_orders(state: &AppState, status: Option<OrderStatus>) -> Result<Vec<Order>> {
  let filter = OrderFilter {
    status,
    ..Default::default()
  };
  Ok(state.store.list_orders(&filter).await?)
}

#[instrument(skip(state))]
pub async fn admin_update_order_status(state: &AppState, id: Uuid, next: OrderStatus) -> Result<Order> {
  let order = load_order(state, id).await?;
  transition_order(state, &order, next).await
}
