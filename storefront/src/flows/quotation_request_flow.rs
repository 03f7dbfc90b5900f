// greenhouse_storefront/src/flows/quotation_request_flow.rs

use crate::cart::CartOwner;
use crate::errors::AppError;
use crate::flows::cart_flow::cart_item_attributes;
use crate::flows::contexts::QuotationRequestCtxData;
use crate::models::{Quotation, QuotationItem};
use crate::services::codes::{allocate_code, CodePrefix};
use greenhouse_flow::{FlowState, Flows, SkipCondition, StepControl, Workflow};
use std::sync::Arc;
use tracing::{error, info, warn};

pub fn register_quotation_request_flow(flows: &Flows<AppError>) {
  // Custom item requests leave the cart alone.
  let skip_when_custom: SkipCondition<QuotationRequestCtxData> =
    Arc::new(|state: FlowState<QuotationRequestCtxData>| state.read().custom_items.is_some());

  let mut p = Workflow::<QuotationRequestCtxData, AppError>::new(&[
    ("collect_request_items", false, None),
    ("allocate_quotation_code", false, None),
    ("insert_request_row", false, None),
    ("clear_cart", false, Some(skip_when_custom)),
  ]);

  p.on_root("collect_request_items", |ctx_data: FlowState<QuotationRequestCtxData>| {
    Box::pin(async move {
      let (user_id, custom_items, carts) = {
        let guard = ctx_data.read();
        (guard.user_id, guard.custom_items.clone(), guard.app_state.carts.clone())
      };

      if let Some(items) = custom_items {
        if items.is_empty() {
          return Err(AppError::Validation("A quotation needs at least one item.".to_string()));
        }
        if items.iter().any(|item| item.quantity == 0) {
          return Err(AppError::Validation("Item quantities must be positive.".to_string()));
        }
        ctx_data.write().items = items;
        return Ok(StepControl::Continue);
      }

      let cart = carts.cart_for(&CartOwner::User(user_id)).await?;
      let snapshot = cart.snapshot();
      if snapshot.is_empty() {
        warn!("Quotation Request (User {}): cart is empty.", user_id);
        return Err(AppError::Validation("Your cart is empty.".to_string()));
      }

      let items: Vec<QuotationItem> = snapshot
        .items()
        .iter()
        .map(|line| QuotationItem {
          product_id: Some(line.id),
          quantity: line.quantity,
          attributes: cart_item_attributes(line),
        })
        .collect();

      let mut guard = ctx_data.write();
      guard.items = items;
      guard.cart = Some(cart);
      Ok(StepControl::Continue)
    })
  });

  p.on_root("allocate_quotation_code", |ctx_data: FlowState<QuotationRequestCtxData>| {
    Box::pin(async move {
      let store = ctx_data.read().app_state.store.clone();
      let code = allocate_code(store.as_ref(), CodePrefix::Quotation).await?;
      ctx_data.write().quotation_code = Some(code);
      Ok::<_, AppError>(StepControl::Continue)
    })
  });

  p.on_root("insert_request_row", |ctx_data: FlowState<QuotationRequestCtxData>| {
    Box::pin(async move {
      let (request, store) = {
        let guard = ctx_data.read();
        let code = guard
          .quotation_code
          .clone()
          .ok_or_else(|| AppError::Internal("quotation code not allocated".to_string()))?;
        (
          Quotation::new_request(code, guard.user_id, guard.items.clone()),
          guard.app_state.store.clone(),
        )
      };

      let created = store.insert_quotation(&request).await?;
      info!(
        "Quotation Request (User {}): created {} with {} item(s).",
        created.user_id,
        created.quotation_code,
        created.items.len()
      );
      ctx_data.write().created = Some(created);
      Ok::<_, AppError>(StepControl::Continue)
    })
  });

  p.compensate_root("insert_request_row", |ctx_data: FlowState<QuotationRequestCtxData>| {
    Box::pin(async move {
      let (created, store) = {
        let guard = ctx_data.read();
        (guard.created.clone(), guard.app_state.store.clone())
      };
      if let Some(created) = created {
        warn!("Quotation Request: removing {} after a later step failed.", created.quotation_code);
        store.delete_quotation(created.id).await?;
        ctx_data.write().created = None;
      }
      Ok::<_, AppError>(())
    })
  });

  p.on_root("clear_cart", |ctx_data: FlowState<QuotationRequestCtxData>| {
    Box::pin(async move {
      let cart = ctx_data.read().cart.clone();
      if let Some(cart) = cart {
        if let Err(e) = cart.clear().await {
          error!("Quotation Request: failed to clear cart {}: {}", cart.key(), e);
          return Err(e.into());
        }
      }
      Ok::<_, AppError>(StepControl::Continue)
    })
  });

  flows.register(p);
  info!("Quotation Request flow registered.");
}
