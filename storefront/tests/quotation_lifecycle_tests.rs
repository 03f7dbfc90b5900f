// tests/quotation_lifecycle_tests.rs

mod common;

use chrono::{Datelike, Utc};
use common::*;
use greenhouse_storefront::cart::CartOwner;
use greenhouse_storefront::errors::AppError;
use greenhouse_storefront::models::{OrderStatus, QuotationItem, QuotationStatus};
use greenhouse_storefront::services::split::Selection;
use greenhouse_storefront::store::OrderFilter;
use serde_json::Map;
use std::collections::HashSet;
use uuid::Uuid;

fn selection(pairs: &[(usize, &str)]) -> Selection {
  pairs.iter().map(|(i, m)| (*i, m.to_string())).collect()
}

#[tokio::test]
async fn test_request_from_cart_creates_pending_row_and_clears_cart() {
  let state = test_state();
  let buyer = Uuid::new_v4();
  let p1 = seed_product(&state, "Monstera", 4500, 10, None).await;
  fill_cart(&state, &CartOwner::User(buyer), &[(&p1, 3)]).await;

  let created = state.quotations().create_request(buyer, None).await.expect("create request");

  assert!(created.is_user_request);
  assert_eq!(created.status, QuotationStatus::Pending);
  assert_eq!(created.items.len(), 1);
  assert_eq!(created.items[0].product_id, Some(p1.id));
  assert_eq!(created.items[0].quantity, 3);
  assert_eq!(created.items[0].name().as_deref(), Some("Monstera"));
  assert_eq!(created.quotation_code, format!("QTN-{}-0001", Utc::now().year()));

  let stored = state.store.get_request(&created.quotation_code).await.unwrap();
  assert_eq!(stored, Some(created));

  let cart = state.carts.cart_for(&CartOwner::User(buyer)).await.unwrap();
  assert!(cart.snapshot().is_empty(), "cart is cleared after the request");
}

#[tokio::test]
async fn test_request_with_empty_cart_is_rejected() {
  let state = test_state();
  let err = state.quotations().create_request(Uuid::new_v4(), None).await.unwrap_err();
  assert!(matches!(err, AppError::Validation(_)));
}

#[tokio::test]
async fn test_custom_item_request_leaves_cart_untouched() {
  let state = test_state();
  let buyer = Uuid::new_v4();
  let p1 = seed_product(&state, "Fern", 2200, 10, None).await;
  fill_cart(&state, &CartOwner::User(buyer), &[(&p1, 2)]).await;

  let mut attributes = Map::new();
  attributes.insert("name".to_string(), "Rare Agave".into());
  let custom = vec![QuotationItem {
    product_id: None,
    quantity: 4,
    attributes,
  }];
  let created = state.quotations().create_request(buyer, Some(custom)).await.unwrap();

  assert_eq!(created.items[0].product_id, None);
  assert_eq!(created.items[0].quantity, 4);
  let cart = state.carts.cart_for(&CartOwner::User(buyer)).await.unwrap();
  assert_eq!(cart.snapshot().item_count(), 2);
}

#[tokio::test]
async fn test_custom_items_with_zero_quantity_are_rejected() {
  let state = test_state();
  let custom = vec![QuotationItem {
    product_id: None,
    quantity: 0,
    attributes: Map::new(),
  }];
  let err = state
    .quotations()
    .create_request(Uuid::new_v4(), Some(custom))
    .await
    .unwrap_err();
  assert!(matches!(err, AppError::Validation(_)));
}

#[tokio::test]
async fn test_codes_are_unique_across_sequential_requests() {
  let state = test_state();
  let buyer = Uuid::new_v4();
  let p1 = seed_product(&state, "Lavender", 900, 100, None).await;

  let mut codes = HashSet::new();
  for _ in 0..5 {
    fill_cart(&state, &CartOwner::User(buyer), &[(&p1, 1)]).await;
    let created = state.quotations().create_request(buyer, None).await.unwrap();
    assert!(codes.insert(created.quotation_code));
  }
  let year = Utc::now().year();
  assert!(codes.contains(&format!("QTN-{}-0005", year)));
}

#[tokio::test]
async fn test_bid_computes_total_and_leaves_request_unchanged() {
  let state = test_state();
  let buyer = Uuid::new_v4();
  let p1 = seed_product(&state, "Monstera", 4500, 10, None).await;
  fill_cart(&state, &CartOwner::User(buyer), &[(&p1, 3)]).await;
  let request = state.quotations().create_request(buyer, None).await.unwrap();
  let (merchant_user, merchant) = approved_merchant(&state, "Green Thumb").await;

  let bid = state
    .quotations()
    .submit_bid(merchant_user, &request.quotation_code, vec![Some(50)], Some(7))
    .await
    .expect("submit bid");

  assert!(!bid.is_user_request);
  assert_eq!(bid.merchant_code.as_deref(), Some(merchant.merchant_code.as_str()));
  assert_eq!(bid.total_amount, Some(150));
  assert_eq!(bid.status, QuotationStatus::Pending);
  assert_eq!(bid.items, request.items);
  assert_eq!(bid.user_id, buyer);
  assert_eq!(bid.estimated_delivery_days, Some(7));

  let after = state.store.get_request(&request.quotation_code).await.unwrap().unwrap();
  assert_eq!(after.items, request.items);
  assert_eq!(after.status, QuotationStatus::Pending);
}

#[tokio::test]
async fn test_missing_and_null_prices_count_as_zero() {
  let state = test_state();
  let buyer = Uuid::new_v4();
  let a = seed_product(&state, "Maple", 18500, 10, None).await;
  let b = seed_product(&state, "Olive", 24000, 10, None).await;
  let c = seed_product(&state, "Fig", 6000, 10, None).await;
  fill_cart(&state, &CartOwner::User(buyer), &[(&a, 2), (&b, 3), (&c, 5)]).await;
  let request = state.quotations().create_request(buyer, None).await.unwrap();
  let (merchant_user, _) = approved_merchant(&state, "Sparse Prices").await;

  // Second price null, third missing.
  let bid = state
    .quotations()
    .submit_bid(merchant_user, &request.quotation_code, vec![Some(100), None], None)
    .await
    .unwrap();
  assert_eq!(bid.total_amount, Some(200));
}

#[tokio::test]
async fn test_duplicate_bid_is_a_conflict() {
  let state = test_state();
  let buyer = Uuid::new_v4();
  let p1 = seed_product(&state, "Monstera", 4500, 10, None).await;
  fill_cart(&state, &CartOwner::User(buyer), &[(&p1, 1)]).await;
  let request = state.quotations().create_request(buyer, None).await.unwrap();
  let (merchant_user, _) = approved_merchant(&state, "Eager").await;

  state
    .quotations()
    .submit_bid(merchant_user, &request.quotation_code, vec![Some(10)], None)
    .await
    .unwrap();
  let err = state
    .quotations()
    .submit_bid(merchant_user, &request.quotation_code, vec![Some(9)], None)
    .await
    .unwrap_err();
  assert!(matches!(err, AppError::Conflict(_)));
  assert_eq!(state.quotations().list_bids_for(&request.quotation_code).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_unapproved_merchant_cannot_bid() {
  let state = test_state();
  let buyer = Uuid::new_v4();
  let p1 = seed_product(&state, "Monstera", 4500, 10, None).await;
  fill_cart(&state, &CartOwner::User(buyer), &[(&p1, 1)]).await;
  let request = state.quotations().create_request(buyer, None).await.unwrap();

  let merchant_user = Uuid::new_v4();
  pending_merchant(&state, merchant_user, "Not Yet").await;
  let err = state
    .quotations()
    .submit_bid(merchant_user, &request.quotation_code, vec![Some(10)], None)
    .await
    .unwrap_err();
  assert!(matches!(err, AppError::Forbidden(_)));

  let stranger = state
    .quotations()
    .submit_bid(Uuid::new_v4(), &request.quotation_code, vec![Some(10)], None)
    .await
    .unwrap_err();
  assert!(matches!(stranger, AppError::Forbidden(_)));
}

#[tokio::test]
async fn test_bid_on_unknown_or_closed_request_fails() {
  let state = test_state();
  let (merchant_user, _) = approved_merchant(&state, "Late").await;
  let year = Utc::now().year();

  let missing = state
    .quotations()
    .submit_bid(merchant_user, &format!("QTN-{}-0999", year), vec![Some(1)], None)
    .await
    .unwrap_err();
  assert!(matches!(missing, AppError::NotFound(_)));

  let malformed = state
    .quotations()
    .submit_bid(merchant_user, "QTN-xx-1", vec![Some(1)], None)
    .await
    .unwrap_err();
  assert!(matches!(malformed, AppError::Validation(_)));

  let buyer = Uuid::new_v4();
  let p1 = seed_product(&state, "Fern", 2200, 10, None).await;
  fill_cart(&state, &CartOwner::User(buyer), &[(&p1, 1)]).await;
  let request = state.quotations().create_request(buyer, None).await.unwrap();
  state.quotations().close_request(buyer, &request.quotation_code).await.unwrap();
  let closed = state
    .quotations()
    .submit_bid(merchant_user, &request.quotation_code, vec![Some(1)], None)
    .await
    .unwrap_err();
  assert!(matches!(closed, AppError::Conflict(_)));
}

#[tokio::test]
async fn test_single_merchant_selection_places_one_order() {
  let state = test_state();
  let buyer = Uuid::new_v4();
  let p1 = seed_product(&state, "Monstera", 4500, 10, None).await;
  fill_cart(&state, &CartOwner::User(buyer), &[(&p1, 3)]).await;
  let request = state.quotations().create_request(buyer, None).await.unwrap();
  let (merchant_user, merchant) = approved_merchant(&state, "Green Thumb").await;
  state
    .quotations()
    .submit_bid(merchant_user, &request.quotation_code, vec![Some(50)], None)
    .await
    .unwrap();

  let outcome = state
    .quotations()
    .select_merchants(buyer, &request.quotation_code, selection(&[(0, &merchant.merchant_code)]))
    .await
    .expect("select merchants");

  assert!(!outcome.replayed);
  assert_eq!(outcome.orders.len(), 1);
  let order = &outcome.orders[0];
  assert_eq!(order.merchant_code.as_deref(), Some(merchant.merchant_code.as_str()));
  assert_eq!(order.total_amount, 150);
  assert_eq!(order.status, OrderStatus::Pending);
  assert_eq!(order.user_id, Some(buyer));
  assert_eq!(order.quotation_code.as_deref(), Some(request.quotation_code.as_str()));
  assert_eq!(order.cart_items.len(), 1);
  let line = &order.cart_items[0];
  assert_eq!((line.quantity, line.unit_price, line.price), (3, 50, 150));
  assert_eq!(line.selected_merchant.as_deref(), Some(merchant.merchant_code.as_str()));
  assert_eq!(line.item_index, Some(0));

  let placed = state.store.get_request(&request.quotation_code).await.unwrap().unwrap();
  assert_eq!(placed.status, QuotationStatus::OrderPlaced);
  assert_eq!(placed.selected_merchants, vec![merchant.merchant_code.clone()]);
  assert!(placed.confirmed_at.is_some());
  assert!(placed.order_placed_at.is_some());

  let bids = state.quotations().list_bids_for(&request.quotation_code).await.unwrap();
  assert_eq!(bids[0].status, QuotationStatus::UserConfirmed);
}

#[tokio::test]
async fn test_split_selection_creates_one_order_per_merchant() {
  let state = test_state();
  let buyer = Uuid::new_v4();
  let a = seed_product(&state, "Maple", 18500, 10, None).await;
  let b = seed_product(&state, "Olive", 24000, 10, None).await;
  fill_cart(&state, &CartOwner::User(buyer), &[(&a, 2), (&b, 3)]).await;
  let request = state.quotations().create_request(buyer, None).await.unwrap();

  let (user_a, merchant_a) = approved_merchant(&state, "Alpha Plants").await;
  let (user_b, merchant_b) = approved_merchant(&state, "Beta Gardens").await;
  let (user_c, merchant_c) = approved_merchant(&state, "Gamma Roots").await;
  let code = request.quotation_code.clone();
  state.quotations().submit_bid(user_a, &code, vec![Some(100), Some(900)], None).await.unwrap();
  state.quotations().submit_bid(user_b, &code, vec![Some(800), Some(200)], None).await.unwrap();
  state.quotations().submit_bid(user_c, &code, vec![Some(1), Some(1)], None).await.unwrap();

  let outcome = state
    .quotations()
    .select_merchants(
      buyer,
      &code,
      selection(&[(0, &merchant_a.merchant_code), (1, &merchant_b.merchant_code)]),
    )
    .await
    .unwrap();

  assert_eq!(outcome.orders.len(), 2);
  let order_a = outcome
    .orders
    .iter()
    .find(|o| o.merchant_code.as_deref() == Some(merchant_a.merchant_code.as_str()))
    .unwrap();
  let order_b = outcome
    .orders
    .iter()
    .find(|o| o.merchant_code.as_deref() == Some(merchant_b.merchant_code.as_str()))
    .unwrap();
  assert_eq!(order_a.total_amount, 200);
  assert_eq!(order_a.cart_items.len(), 1);
  assert_eq!(order_a.cart_items[0].product_id, Some(a.id));
  assert_eq!(order_b.total_amount, 600);
  assert_eq!(order_b.cart_items.len(), 1);
  assert_eq!(order_b.cart_items[0].product_id, Some(b.id));

  let placed = state.store.get_request(&code).await.unwrap().unwrap();
  assert_eq!(
    placed.selected_merchants,
    vec![merchant_a.merchant_code.clone(), merchant_b.merchant_code.clone()]
  );

  let bids = state.quotations().list_bids_for(&code).await.unwrap();
  let status_of = |m: &str| bids.iter().find(|b| b.merchant_code.as_deref() == Some(m)).unwrap().status;
  assert_eq!(status_of(&merchant_a.merchant_code), QuotationStatus::UserConfirmed);
  assert_eq!(status_of(&merchant_b.merchant_code), QuotationStatus::UserConfirmed);
  assert_eq!(status_of(&merchant_c.merchant_code), QuotationStatus::Pending);
}

#[tokio::test]
async fn test_same_merchant_for_several_items_groups_into_one_order() {
  let state = test_state();
  let buyer = Uuid::new_v4();
  let a = seed_product(&state, "Maple", 18500, 10, None).await;
  let b = seed_product(&state, "Olive", 24000, 10, None).await;
  fill_cart(&state, &CartOwner::User(buyer), &[(&a, 1), (&b, 2)]).await;
  let request = state.quotations().create_request(buyer, None).await.unwrap();
  let (user_a, merchant_a) = approved_merchant(&state, "Alpha Plants").await;
  state
    .quotations()
    .submit_bid(user_a, &request.quotation_code, vec![Some(10), Some(20)], None)
    .await
    .unwrap();

  let outcome = state
    .quotations()
    .select_merchants(
      buyer,
      &request.quotation_code,
      selection(&[(0, &merchant_a.merchant_code), (1, &merchant_a.merchant_code)]),
    )
    .await
    .unwrap();
  assert_eq!(outcome.orders.len(), 1);
  assert_eq!(outcome.orders[0].total_amount, 50);
  assert_eq!(outcome.orders[0].cart_items.len(), 2);
}

#[tokio::test]
async fn test_repeated_selection_replays_existing_orders() {
  let state = test_state();
  let buyer = Uuid::new_v4();
  let p1 = seed_product(&state, "Monstera", 4500, 10, None).await;
  fill_cart(&state, &CartOwner::User(buyer), &[(&p1, 3)]).await;
  let request = state.quotations().create_request(buyer, None).await.unwrap();
  let (merchant_user, merchant) = approved_merchant(&state, "Green Thumb").await;
  state
    .quotations()
    .submit_bid(merchant_user, &request.quotation_code, vec![Some(50)], None)
    .await
    .unwrap();
  let pick = selection(&[(0, &merchant.merchant_code)]);

  let first = state
    .quotations()
    .select_merchants(buyer, &request.quotation_code, pick.clone())
    .await
    .unwrap();
  let second = state
    .quotations()
    .select_merchants(buyer, &request.quotation_code, pick)
    .await
    .unwrap();

  assert!(second.replayed);
  let first_ids: HashSet<Uuid> = first.orders.iter().map(|o| o.id).collect();
  let second_ids: HashSet<Uuid> = second.orders.iter().map(|o| o.id).collect();
  assert_eq!(first_ids, second_ids);

  let all = state
    .store
    .list_orders(&OrderFilter {
      quotation_code: Some(request.quotation_code.clone()),
      ..Default::default()
    })
    .await
    .unwrap();
  assert_eq!(all.len(), 1, "no extra orders written on replay");
}

#[tokio::test]
async fn test_invalid_selections_write_nothing() {
  let state = test_state();
  let buyer = Uuid::new_v4();
  let p1 = seed_product(&state, "Monstera", 4500, 10, None).await;
  fill_cart(&state, &CartOwner::User(buyer), &[(&p1, 1)]).await;
  let request = state.quotations().create_request(buyer, None).await.unwrap();
  let code = request.quotation_code.clone();
  let (merchant_user, merchant) = approved_merchant(&state, "Green Thumb").await;
  let (_, silent) = approved_merchant(&state, "Silent").await;
  state.quotations().submit_bid(merchant_user, &code, vec![Some(5)], None).await.unwrap();

  let empty = state.quotations().select_merchants(buyer, &code, Selection::new()).await.unwrap_err();
  assert!(matches!(empty, AppError::Validation(_)));

  let out_of_range = state
    .quotations()
    .select_merchants(buyer, &code, selection(&[(3, &merchant.merchant_code)]))
    .await
    .unwrap_err();
  assert!(matches!(out_of_range, AppError::Validation(_)));

  let no_bid = state
    .quotations()
    .select_merchants(buyer, &code, selection(&[(0, &silent.merchant_code)]))
    .await
    .unwrap_err();
  assert!(matches!(no_bid, AppError::Validation(_)));

  let not_owner = state
    .quotations()
    .select_merchants(Uuid::new_v4(), &code, selection(&[(0, &merchant.merchant_code)]))
    .await
    .unwrap_err();
  assert!(matches!(not_owner, AppError::Forbidden(_)));

  let untouched = state.store.get_request(&code).await.unwrap().unwrap();
  assert_eq!(untouched.status, QuotationStatus::Pending);
  assert!(state.store.list_orders(&OrderFilter::default()).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_selection_on_closed_request_is_a_conflict() {
  let state = test_state();
  let buyer = Uuid::new_v4();
  let p1 = seed_product(&state, "Monstera", 4500, 10, None).await;
  fill_cart(&state, &CartOwner::User(buyer), &[(&p1, 1)]).await;
  let request = state.quotations().create_request(buyer, None).await.unwrap();
  let (merchant_user, merchant) = approved_merchant(&state, "Green Thumb").await;
  state
    .quotations()
    .submit_bid(merchant_user, &request.quotation_code, vec![Some(5)], None)
    .await
    .unwrap();
  state.quotations().close_request(buyer, &request.quotation_code).await.unwrap();

  let err = state
    .quotations()
    .select_merchants(buyer, &request.quotation_code, selection(&[(0, &merchant.merchant_code)]))
    .await
    .unwrap_err();
  assert!(matches!(err, AppError::Conflict(_)));
}

#[tokio::test]
async fn test_available_queue_excludes_answered_requests() {
  let state = test_state();
  let buyer = Uuid::new_v4();
  let p1 = seed_product(&state, "Monstera", 4500, 50, None).await;
  let mut codes = Vec::new();
  for _ in 0..3 {
    fill_cart(&state, &CartOwner::User(buyer), &[(&p1, 1)]).await;
    codes.push(state.quotations().create_request(buyer, None).await.unwrap().quotation_code);
  }
  let (merchant_user, _) = approved_merchant(&state, "Queue").await;

  state.quotations().submit_bid(merchant_user, &codes[0], vec![Some(1)], None).await.unwrap();
  let declined = state.quotations().close_for_merchant(merchant_user, &codes[1]).await.unwrap();
  assert_eq!(declined.status, QuotationStatus::Closed);
  assert!(declined.unit_prices.is_empty());

  let available = state.quotations().available_for_merchant(merchant_user).await.unwrap();
  let available: Vec<&str> = available.iter().map(|q| q.quotation_code.as_str()).collect();
  assert_eq!(available, vec![codes[2].as_str()]);

  // Declining records a closed bid but the buyer sees no new offer.
  let summaries = state.quotations().list_requests(buyer, None).await.unwrap();
  let declined_summary = summaries.iter().find(|s| s.request.quotation_code == codes[1]).unwrap();
  assert_eq!(declined_summary.bid_count, 0);
  let bid_summary = summaries.iter().find(|s| s.request.quotation_code == codes[0]).unwrap();
  assert_eq!(bid_summary.bid_count, 1);
}

#[tokio::test]
async fn test_merchant_closes_own_bid_once() {
  let state = test_state();
  let buyer = Uuid::new_v4();
  let p1 = seed_product(&state, "Monstera", 4500, 10, None).await;
  fill_cart(&state, &CartOwner::User(buyer), &[(&p1, 1)]).await;
  let request = state.quotations().create_request(buyer, None).await.unwrap();
  let (merchant_user, merchant) = approved_merchant(&state, "Closer").await;
  state
    .quotations()
    .submit_bid(merchant_user, &request.quotation_code, vec![Some(5)], None)
    .await
    .unwrap();

  let closed = state
    .quotations()
    .close_for_merchant(merchant_user, &request.quotation_code)
    .await
    .unwrap();
  assert_eq!(closed.status, QuotationStatus::Closed);
  assert!(state
    .quotations()
    .close_for_merchant(merchant_user, &request.quotation_code)
    .await
    .is_err());

  // A closed bid can no longer be selected.
  let err = state
    .quotations()
    .select_merchants(buyer, &request.quotation_code, selection(&[(0, &merchant.merchant_code)]))
    .await
    .unwrap_err();
  assert!(matches!(err, AppError::Validation(_)));
}

#[tokio::test]
async fn test_get_quotation_is_owner_only() {
  let state = test_state();
  let buyer = Uuid::new_v4();
  let p1 = seed_product(&state, "Monstera", 4500, 10, None).await;
  fill_cart(&state, &CartOwner::User(buyer), &[(&p1, 1)]).await;
  let request = state.quotations().create_request(buyer, None).await.unwrap();
  let (merchant_user, _) = approved_merchant(&state, "Visible").await;
  state
    .quotations()
    .submit_bid(merchant_user, &request.quotation_code, vec![Some(5)], None)
    .await
    .unwrap();

  let found = state.quotations().get_quotation(buyer, &request.quotation_code).await.unwrap();
  assert_eq!(found.request.id, request.id);
  assert_eq!(found.bids.len(), 1);

  let err = state
    .quotations()
    .get_quotation(Uuid::new_v4(), &request.quotation_code)
    .await
    .unwrap_err();
  assert!(matches!(err, AppError::Forbidden(_)));
}

#[tokio::test]
async fn test_admin_moderation_follows_transition_table() {
  let state = test_state();
  let buyer = Uuid::new_v4();
  let p1 = seed_product(&state, "Monstera", 4500, 10, None).await;
  fill_cart(&state, &CartOwner::User(buyer), &[(&p1, 1)]).await;
  let request = state.quotations().create_request(buyer, None).await.unwrap();
  let code = request.quotation_code.clone();

  let waiting = state
    .quotations()
    .admin_set_status(&code, QuotationStatus::WaitingForAdmin)
    .await
    .unwrap();
  assert_eq!(waiting.status, QuotationStatus::WaitingForAdmin);

  let not_allowed = state
    .quotations()
    .admin_set_status(&code, QuotationStatus::OrderPlaced)
    .await
    .unwrap_err();
  assert!(matches!(not_allowed, AppError::Validation(_)));

  let rejected = state
    .quotations()
    .admin_set_status(&code, QuotationStatus::Rejected)
    .await
    .unwrap();
  assert_eq!(rejected.status, QuotationStatus::Rejected);

  let terminal = state
    .quotations()
    .admin_set_status(&code, QuotationStatus::Approved)
    .await
    .unwrap_err();
  assert!(matches!(terminal, AppError::Conflict(_)));
}

#[tokio::test]
async fn test_bid_total_overflow_is_rejected() {
  let state = test_state();
  let buyer = Uuid::new_v4();
  let custom = vec![QuotationItem {
    product_id: None,
    quantity: 3,
    attributes: Map::new(),
  }];
  let request = state.quotations().create_request(buyer, Some(custom)).await.unwrap();
  let (merchant_user, merchant) = approved_merchant(&state, "Big Spender").await;

  let err = state
    .quotations()
    .submit_bid(merchant_user, &request.quotation_code, vec![Some(i64::MAX / 2)], None)
    .await
    .unwrap_err();

  assert!(matches!(err, AppError::Validation(ref m) if m.contains("too large")), "got {:?}", err);
  let bids = state.store.list_bids(&request.quotation_code).await.unwrap();
  assert!(bids.iter().all(|b| b.merchant_code.as_deref() != Some(merchant.merchant_code.as_str())));
}

#[tokio::test]
async fn test_selection_commit_rejects_bid_closed_after_loading() {
  let state = test_state();
  let buyer = Uuid::new_v4();
  let p1 = seed_product(&state, "Olive", 9000, 10, None).await;
  fill_cart(&state, &CartOwner::User(buyer), &[(&p1, 2)]).await;
  let request = state.quotations().create_request(buyer, None).await.unwrap();
  let (merchant_user, merchant) = approved_merchant(&state, "Slow Grower").await;
  state
    .quotations()
    .submit_bid(merchant_user, &request.quotation_code, vec![Some(80)], None)
    .await
    .unwrap();

  let loaded_bids = state.store.list_bids(&request.quotation_code).await.unwrap();
  let bid = loaded_bids[0].clone();
  state
    .store
    .update_quotation_status(bid.id, QuotationStatus::Pending, QuotationStatus::Closed)
    .await
    .unwrap();

  let err = state
    .quotations()
    .create_orders_from_selection(&request, &loaded_bids, &selection(&[(0, &merchant.merchant_code)]))
    .await
    .unwrap_err();

  assert!(matches!(err, AppError::Conflict(_)), "got {:?}", err);
  let orders = state
    .store
    .list_orders(&OrderFilter {
      quotation_code: Some(request.quotation_code.clone()),
      ..Default::default()
    })
    .await
    .unwrap();
  assert!(orders.is_empty());
  let after = state.store.get_request(&request.quotation_code).await.unwrap().unwrap();
  assert_eq!(after.status, QuotationStatus::Pending);
}
