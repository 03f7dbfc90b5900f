// greenhouse_storefront/src/web/handlers/checkout_handlers.rs

use actix_web::{web, HttpResponse};
use greenhouse_flow::{FlowOutcome, FlowState};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument, warn};

use crate::errors::AppError;
use crate::flows::contexts::CheckoutCtxData;
use crate::state::AppState;
use crate::web::extractors::Shopper;
use crate::web::views::{views, OrderView};

#[derive(Deserialize, Debug, Default)]
pub struct CheckoutRequestPayload {
  /// Required for guests; ignored for signed-in buyers.
  pub guest_email: Option<String>,
  /// Reference returned by the external payment widget.
  pub payment_reference: Option<String>,
}

#[instrument(name = "handler::checkout", skip(app_state, req_payload, shopper), fields(owner = %shopper.owner))]
pub async fn checkout_handler(
  app_state: web::Data<AppState>,
  req_payload: web::Json<CheckoutRequestPayload>,
  shopper: Shopper,
) -> Result<HttpResponse, AppError> {
  let payload = req_payload.into_inner();
  let (user_id, guest_email) = match &shopper.user {
    Some(user) => (Some(user.user_id), None),
    None => (None, payload.guest_email.map(|e| e.trim().to_string())),
  };

  let flow_state = FlowState::new(CheckoutCtxData::new(
    app_state.get_ref().clone(),
    shopper.owner.clone(),
    user_id,
    guest_email,
    payload.payment_reference,
  ));

  match app_state.flows.run(flow_state.clone()).await? {
    FlowOutcome::Completed => {
      let orders = flow_state.read().orders.clone();
      info!("Checkout for {} placed {} order(s).", shopper.owner, orders.len());
      Ok(HttpResponse::Created().json(json!({
        "message": "Order placed successfully.",
        "orders": views::<_, OrderView>(orders),
      })))
    }
    FlowOutcome::Stopped => {
      warn!("Checkout flow for {} was stopped by a handler.", shopper.owner);
      Err(AppError::Internal("Checkout was halted.".to_string()))
    }
  }
}
