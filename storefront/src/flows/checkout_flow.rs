// greenhouse_storefront/src/flows/checkout_flow.rs

use std::collections::{BTreeMap, HashMap};

use crate::errors::AppError;
use crate::flows::contexts::CheckoutCtxData;
use crate::models::{Lifecycle, Order, OrderLine, OrderStatus, Product};
use crate::services::pricing::line_total;
use greenhouse_flow::{FlowState, Flows, StepControl, Workflow};
use serde_json::{Map, Value};
use tracing::{error, info, warn};
use uuid::Uuid;

pub fn register_checkout_flow(flows: &Flows<AppError>) {
  let mut p = Workflow::<CheckoutCtxData, AppError>::new(&[
    ("load_cart", false, None),
    ("price_cart_lines", false, None),
    ("create_orders", false, None),
    ("clear_cart", false, None),
  ]);

  // Step 1: the cart must hold something, and guests must leave a contact email.
  p.on_root("load_cart", |ctx_data: FlowState<CheckoutCtxData>| {
    Box::pin(async move {
      let (owner, user_id, guest_email, carts) = {
        let guard = ctx_data.read();
        (
          guard.owner.clone(),
          guard.user_id,
          guard.guest_email.clone(),
          guard.app_state.carts.clone(),
        )
      };

      let has_email = guest_email.as_deref().is_some_and(|e| e.contains('@'));
      if user_id.is_none() && !has_email {
        return Err(AppError::Validation(
          "Guest checkout needs a valid contact email.".to_string(),
        ));
      }

      let cart = carts.cart_for(&owner).await?;
      let snapshot = cart.snapshot();
      if snapshot.is_empty() {
        warn!("Checkout ({}): cart is empty.", owner);
        return Err(AppError::Validation("Your cart is empty.".to_string()));
      }

      let mut guard = ctx_data.write();
      guard.cart_snapshot = snapshot;
      guard.cart = Some(cart);
      Ok(StepControl::Continue)
    })
  });

  // Step 2: prices always come from the catalogue, never from the stored cart.
  p.on_root("price_cart_lines", |ctx_data: FlowState<CheckoutCtxData>| {
    Box::pin(async move {
      let (cart, store) = {
        let guard = ctx_data.read();
        (guard.cart_snapshot.clone(), guard.app_state.store.clone())
      };

      let ids: Vec<Uuid> = cart.items().iter().map(|i| i.id).collect();
      let products: HashMap<Uuid, Product> = store
        .get_products(&ids)
        .await?
        .into_iter()
        .map(|p| (p.id, p))
        .collect();

      let mut lines = Vec::with_capacity(cart.items().len());
      for item in cart.items() {
        let product = products
          .get(&item.id)
          .filter(|p| p.is_active)
          .ok_or_else(|| AppError::Validation(format!("'{}' is no longer available.", item.name)))?;
        if i64::from(item.quantity) > i64::from(product.stock_quantity) {
          return Err(AppError::Validation(format!(
            "Insufficient stock for '{}'. Only {} available.",
            product.name, product.stock_quantity
          )));
        }
        let mut attributes = Map::new();
        attributes.insert("category".to_string(), Value::String(product.category.clone()));
        lines.push(OrderLine {
          product_id: Some(product.id),
          name: Some(product.name.clone()),
          quantity: item.quantity,
          unit_price: product.price,
          price: line_total(product.price, item.quantity)?,
          item_index: None,
          quotation_code: None,
          selected_merchant: product.merchant_code.clone(),
          attributes,
        });
      }

      ctx_data.write().priced_lines = lines;
      Ok(StepControl::Continue)
    })
  });

  // Step 3: one pending order per merchant (house products group under `None`).
  p.on_root("create_orders", |ctx_data: FlowState<CheckoutCtxData>| {
    Box::pin(async move {
      let (orders, store) = {
        let guard = ctx_data.read();
        let mut groups: BTreeMap<Option<String>, Vec<OrderLine>> = BTreeMap::new();
        for line in &guard.priced_lines {
          groups.entry(line.selected_merchant.clone()).or_default().push(line.clone());
        }
        let orders: Vec<Order> = groups
          .into_iter()
          .map(|(merchant_code, lines)| -> Result<Order, AppError> {
            let mut order = Order::pending(merchant_code, lines)?;
            order.user_id = guard.user_id;
            order.guest_email = guard.guest_email.clone();
            order.payment_reference = guard.payment_reference.clone();
            Ok(order)
          })
          .collect::<Result<Vec<Order>, AppError>>()?;
        (orders, guard.app_state.store.clone())
      };

      let created = store.insert_orders(&orders).await?;
      info!("Checkout: created {} order(s).", created.len());
      ctx_data.write().orders = created;
      Ok::<_, AppError>(StepControl::Continue)
    })
  });

  p.compensate_root("create_orders", |ctx_data: FlowState<CheckoutCtxData>| {
    Box::pin(async move {
      let (orders, store) = {
        let guard = ctx_data.read();
        (guard.orders.clone(), guard.app_state.store.clone())
      };
      for order in orders {
        warn!("Checkout: cancelling order {} after a later step failed.", order.id);
        let next = order.status.transition(OrderStatus::Cancelled)?;
        store.update_order_status(order.id, order.status, next).await?;
      }
      ctx_data.write().orders.clear();
      Ok::<_, AppError>(())
    })
  });

  p.on_root("clear_cart", |ctx_data: FlowState<CheckoutCtxData>| {
    Box::pin(async move {
      let cart = ctx_data.read().cart.clone();
      if let Some(cart) = cart {
        if let Err(e) = cart.clear().await {
          error!("Checkout: failed to clear cart {}: {}", cart.key(), e);
          return Err(e.into());
        }
      }
      Ok::<_, AppError>(StepControl::Continue)
    })
  });

  flows.register(p);
  info!("Checkout flow registered.");
}
