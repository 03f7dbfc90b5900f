// tests/checkout_tests.rs

mod common;

use common::*;
use greenhouse_flow::FlowState;
use greenhouse_storefront::cart::CartOwner;
use greenhouse_storefront::errors::AppError;
use greenhouse_storefront::flows::contexts::CheckoutCtxData;
use greenhouse_storefront::models::{Order, OrderStatus};
use greenhouse_storefront::state::AppState;
use greenhouse_storefront::store::{OrderFilter, QuotationFilter};
use std::sync::Arc;
use uuid::Uuid;

async fn checkout(
  state: &AppState,
  owner: &CartOwner,
  user_id: Option<Uuid>,
  guest_email: Option<&str>,
) -> Result<Vec<Order>, AppError> {
  let flow_state = FlowState::new(CheckoutCtxData::new(
    state.clone(),
    owner.clone(),
    user_id,
    guest_email.map(str::to_string),
    Some("pay_ref_123".to_string()),
  ));
  state.flows.run(flow_state.clone()).await?;
  let orders = flow_state.read().orders.clone();
  Ok(orders)
}

#[tokio::test]
async fn test_checkout_splits_orders_by_merchant() {
  let state = test_state();
  let buyer = Uuid::new_v4();
  let owner = CartOwner::User(buyer);
  let (_, merchant) = approved_merchant(&state, "Alpha Plants").await;
  let house = seed_product(&state, "Lavender", 900, 50, None).await;
  let sold_by_merchant = seed_product(&state, "Bonsai", 12000, 5, Some(&merchant.merchant_code)).await;
  fill_cart(&state, &owner, &[(&house, 4), (&sold_by_merchant, 1)]).await;

  let orders = checkout(&state, &owner, Some(buyer), None).await.expect("checkout");

  assert_eq!(orders.len(), 2);
  let house_order = orders.iter().find(|o| o.merchant_code.is_none()).unwrap();
  let merchant_order = orders.iter().find(|o| o.merchant_code.is_some()).unwrap();
  assert_eq!(house_order.total_amount, 3600);
  assert_eq!(merchant_order.total_amount, 12000);
  assert_eq!(merchant_order.merchant_code.as_deref(), Some(merchant.merchant_code.as_str()));
  for order in &orders {
    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(order.user_id, Some(buyer));
    assert_eq!(order.quotation_code, None);
    assert_eq!(order.payment_reference.as_deref(), Some("pay_ref_123"));
  }

  let cart = state.carts.cart_for(&owner).await.unwrap();
  assert!(cart.snapshot().is_empty());
}

#[tokio::test]
async fn test_guest_checkout_needs_email() {
  let state = test_state();
  let owner = CartOwner::Guest("guest-42".to_string());
  let p1 = seed_product(&state, "Fern", 2200, 10, None).await;
  fill_cart(&state, &owner, &[(&p1, 2)]).await;

  let err = checkout(&state, &owner, None, None).await.unwrap_err();
  assert!(matches!(err, AppError::Validation(_)));

  let orders = checkout(&state, &owner, None, Some("guest@nursery.test")).await.unwrap();
  assert_eq!(orders.len(), 1);
  assert_eq!(orders[0].user_id, None);
  assert_eq!(orders[0].guest_email.as_deref(), Some("guest@nursery.test"));
  assert_eq!(orders[0].total_amount, 4400);
}

#[tokio::test]
async fn test_checkout_rejects_empty_cart_and_short_stock() {
  let state = test_state();
  let buyer = Uuid::new_v4();
  let owner = CartOwner::User(buyer);

  let empty = checkout(&state, &owner, Some(buyer), None).await.unwrap_err();
  assert!(matches!(empty, AppError::Validation(_)));

  let scarce = seed_product(&state, "Olive Tree", 24000, 1, None).await;
  fill_cart(&state, &owner, &[(&scarce, 2)]).await;
  let short = checkout(&state, &owner, Some(buyer), None).await.unwrap_err();
  assert!(matches!(short, AppError::Validation(_)));
  assert!(state.store.list_orders(&OrderFilter::default()).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_failed_cart_clear_cancels_checkout_orders() {
  let storage = Arc::new(FlakyCartStorage::default());
  let state = test_state_with(storage.clone());
  let buyer = Uuid::new_v4();
  let owner = CartOwner::User(buyer);
  let p1 = seed_product(&state, "Monstera", 4500, 10, None).await;
  fill_cart(&state, &owner, &[(&p1, 2)]).await;

  storage.set_failing(true);
  let err = checkout(&state, &owner, Some(buyer), None).await.unwrap_err();
  assert!(matches!(err, AppError::Cart(_)));

  let orders = state.store.list_orders(&OrderFilter::default()).await.unwrap();
  assert_eq!(orders.len(), 1);
  assert_eq!(orders[0].status, OrderStatus::Cancelled);

  let cart = state.carts.cart_for(&owner).await.unwrap();
  assert_eq!(cart.snapshot().item_count(), 2, "cart keeps its items");
}

#[tokio::test]
async fn test_failed_cart_clear_removes_quotation_request() {
  let storage = Arc::new(FlakyCartStorage::default());
  let state = test_state_with(storage.clone());
  let buyer = Uuid::new_v4();
  let p1 = seed_product(&state, "Monstera", 4500, 10, None).await;
  fill_cart(&state, &CartOwner::User(buyer), &[(&p1, 3)]).await;

  storage.set_failing(true);
  let err = state.quotations().create_request(buyer, None).await.unwrap_err();
  assert!(matches!(err, AppError::Cart(_)));

  let rows = state.store.list_quotations(&QuotationFilter::default()).await.unwrap();
  assert!(rows.is_empty(), "request row is removed again");

  // The sequence still advanced, so the next code is never reused.
  storage.set_failing(false);
  let created = state.quotations().create_request(buyer, None).await.unwrap();
  assert!(created.quotation_code.ends_with("-0002"));
}

#[tokio::test]
async fn test_checkout_rejects_amounts_beyond_range() {
  let state = test_state();
  let buyer = Uuid::new_v4();
  let owner = CartOwner::User(buyer);
  let heirloom = seed_product(&state, "Heirloom Cycad", i64::MAX / 2, 10, None).await;
  fill_cart(&state, &owner, &[(&heirloom, 3)]).await;

  let err = checkout(&state, &owner, Some(buyer), None).await.unwrap_err();

  assert!(matches!(err, AppError::Validation(ref m) if m.contains("too large")), "got {:?}", err);
  let orders = state
    .store
    .list_orders(&OrderFilter {
      user_id: Some(buyer),
      ..Default::default()
    })
    .await
    .unwrap();
  assert!(orders.is_empty());
  let cart = state.carts.cart_for(&owner).await.unwrap();
  assert_eq!(cart.snapshot().item_count(), 3, "cart keeps its items");
  assert_eq!(cart.snapshot().total(), i64::MAX);
}
