// greenhouse_storefront/src/flows/contexts.rs

//! Context data for every storefront workflow. Handlers receive these wrapped in
//! `greenhouse_flow::FlowState`; callers read the outputs back after the run.

use std::sync::Arc;
use uuid::Uuid;

use crate::cart::{Cart, CartItem, CartOwner, CartStore};
use crate::models::{Merchant, Order, OrderLine, Product, Quotation, QuotationItem};
use crate::services::split::Selection;
use crate::state::AppState;

#[derive(Clone)]
pub struct AddToCartCtxData {
  pub app_state: AppState,
  pub owner: CartOwner,
  pub product_id: Uuid,
  pub quantity: i64,
  pub product: Option<Product>,
  pub cart: Option<Arc<CartStore>>,
  pub updated_cart_item: Option<CartItem>,
}

impl AddToCartCtxData {
  pub fn new(app_state: AppState, owner: CartOwner, product_id: Uuid, quantity: i64) -> Self {
    Self {
      app_state,
      owner,
      product_id,
      quantity,
      product: None,
      cart: None,
      updated_cart_item: None,
    }
  }
}

#[derive(Clone)]
pub struct QuotationRequestCtxData {
  pub app_state: AppState,
  pub user_id: Uuid,
  /// Explicit items for plants not in the catalogue. When set the cart is
  /// neither read nor cleared.
  pub custom_items: Option<Vec<QuotationItem>>,
  pub cart: Option<Arc<CartStore>>,
  pub items: Vec<QuotationItem>,
  pub quotation_code: Option<String>,
  pub created: Option<Quotation>,
}

impl QuotationRequestCtxData {
  pub fn new(app_state: AppState, user_id: Uuid, custom_items: Option<Vec<QuotationItem>>) -> Self {
    Self {
      app_state,
      user_id,
      custom_items,
      cart: None,
      items: Vec::new(),
      quotation_code: None,
      created: None,
    }
  }
}

#[derive(Clone)]
pub struct BidCtxData {
  pub app_state: AppState,
  pub merchant_user_id: Uuid,
  pub quotation_code: String,
  pub unit_prices: Vec<Option<i64>>,
  pub estimated_delivery_days: Option<i32>,
  pub merchant: Option<Merchant>,
  pub request: Option<Quotation>,
  pub total_amount: Option<i64>,
  pub created_bid: Option<Quotation>,
}

impl BidCtxData {
  pub fn new(
    app_state: AppState,
    merchant_user_id: Uuid,
    quotation_code: String,
    unit_prices: Vec<Option<i64>>,
    estimated_delivery_days: Option<i32>,
  ) -> Self {
    Self {
      app_state,
      merchant_user_id,
      quotation_code,
      unit_prices,
      estimated_delivery_days,
      merchant: None,
      request: None,
      total_amount: None,
      created_bid: None,
    }
  }
}

#[derive(Clone)]
pub struct SelectionCtxData {
  pub app_state: AppState,
  pub buyer_id: Uuid,
  pub quotation_code: String,
  pub selection: Selection,
  pub request: Option<Quotation>,
  pub bids: Vec<Quotation>,
  pub orders: Vec<Order>,
  /// The request was already `order_placed`; `orders` are the existing ones.
  pub replayed: bool,
}

impl SelectionCtxData {
  pub fn new(app_state: AppState, buyer_id: Uuid, quotation_code: String, selection: Selection) -> Self {
    Self {
      app_state,
      buyer_id,
      quotation_code,
      selection,
      request: None,
      bids: Vec::new(),
      orders: Vec::new(),
      replayed: false,
    }
  }
}

#[derive(Clone)]
pub struct CheckoutCtxData {
  pub app_state: AppState,
  pub owner: CartOwner,
  pub user_id: Option<Uuid>,
  pub guest_email: Option<String>,
  /// Opaque reference handed back by the external payment widget.
  pub payment_reference: Option<String>,
  pub cart: Option<Arc<CartStore>>,
  pub cart_snapshot: Cart,
  pub priced_lines: Vec<OrderLine>,
  pub orders: Vec<Order>,
}

impl CheckoutCtxData {
  pub fn new(
    app_state: AppState,
    owner: CartOwner,
    user_id: Option<Uuid>,
    guest_email: Option<String>,
    payment_reference: Option<String>,
  ) -> Self {
    Self {
      app_state,
      owner,
      user_id,
      guest_email,
      payment_reference,
      cart: None,
      cart_snapshot: Cart::default(),
      priced_lines: Vec::new(),
      orders: Vec::new(),
    }
  }
}
