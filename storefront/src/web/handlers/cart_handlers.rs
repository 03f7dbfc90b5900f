// greenhouse_storefront/src/web/handlers/cart_handlers.rs

use actix_web::{web, HttpResponse};
use greenhouse_flow::{FlowOutcome, FlowState};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::cart::Cart;
use crate::errors::AppError;
use crate::flows::contexts::AddToCartCtxData;
use crate::state::AppState;
use crate::web::extractors::Shopper;

#[derive(Deserialize, Debug)]
pub struct AddToCartRequestPayload {
  pub product_id: Uuid,
  pub quantity: i64,
}

#[derive(Deserialize, Debug)]
pub struct SetQuantityPayload {
  pub quantity: u32,
}

fn cart_body(cart: &Cart) -> serde_json::Value {
  json!({
    "items": cart.items(),
    "item_count": cart.item_count(),
    "total": cart.total(),
  })
}

#[instrument(name = "handler::get_cart", skip(app_state, shopper), fields(owner = %shopper.owner))]
pub async fn get_cart_handler(app_state: web::Data<AppState>, shopper: Shopper) -> Result<HttpResponse, AppError> {
  let cart = app_state.carts.cart_for(&shopper.owner).await?;
  Ok(HttpResponse::Ok().json(cart_body(&cart.snapshot())))
}

#[instrument(
  name = "handler::add_to_cart",
  skip(app_state, req_payload, shopper),
  fields(owner = %shopper.owner, product_id = %req_payload.product_id, quantity = %req_payload.quantity)
)]
pub async fn add_to_cart_handler(
  app_state: web::Data<AppState>,
  req_payload: web::Json<AddToCartRequestPayload>,
  shopper: Shopper,
) -> Result<HttpResponse, AppError> {
  let payload = req_payload.into_inner();
  let flow_state = FlowState::new(AddToCartCtxData::new(
    app_state.get_ref().clone(),
    shopper.owner.clone(),
    payload.product_id,
    payload.quantity,
  ));

  match app_state.flows.run(flow_state.clone()).await? {
    FlowOutcome::Completed => {
      let (item, cart) = {
        let guard = flow_state.read();
        (guard.updated_cart_item.clone(), guard.cart.clone())
      };
      let item = item.ok_or_else(|| {
        warn!("Add to Cart flow completed for {} without an updated item.", shopper.owner);
        AppError::Internal("Cart update completed, but item details are unavailable.".to_string())
      })?;
      info!("Add to cart successful for {}: {} x {}.", shopper.owner, item.quantity, item.id);
      let snapshot = cart.map(|c| c.snapshot()).unwrap_or_default();
      Ok(HttpResponse::Ok().json(json!({
        "message": "Item added to cart successfully.",
        "cart_item": item,
        "cart": cart_body(&snapshot),
      })))
    }
    FlowOutcome::Stopped => {
      warn!("Add to Cart flow for {} was stopped by a handler.", shopper.owner);
      Err(AppError::Internal("Process to add item to cart was halted.".to_string()))
    }
  }
}

#[instrument(name = "handler::set_cart_quantity", skip(app_state, path, payload, shopper), fields(owner = %shopper.owner))]
pub async fn set_cart_quantity_handler(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
  payload: web::Json<SetQuantityPayload>,
  shopper: Shopper,
) -> Result<HttpResponse, AppError> {
  let product_id = path.into_inner();
  let cart = app_state.carts.cart_for(&shopper.owner).await?;
  if !cart.set_quantity(product_id, payload.quantity).await? {
    return Err(AppError::NotFound(format!("Product {} is not in the cart.", product_id)));
  }
  Ok(HttpResponse::Ok().json(cart_body(&cart.snapshot())))
}

#[instrument(name = "handler::remove_cart_item", skip(app_state, path, shopper), fields(owner = %shopper.owner))]
pub async fn remove_cart_item_handler(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
  shopper: Shopper,
) -> Result<HttpResponse, AppError> {
  let cart = app_state.carts.cart_for(&shopper.owner).await?;
  cart.remove_item(path.into_inner()).await?;
  Ok(HttpResponse::Ok().json(cart_body(&cart.snapshot())))
}

#[instrument(name = "handler::clear_cart", skip(app_state, shopper), fields(owner = %shopper.owner))]
pub async fn clear_cart_handler(app_state: web::Data<AppState>, shopper: Shopper) -> Result<HttpResponse, AppError> {
  let cart = app_state.carts.cart_for(&shopper.owner).await?;
  cart.clear().await?;
  Ok(HttpResponse::NoContent().finish())
}
