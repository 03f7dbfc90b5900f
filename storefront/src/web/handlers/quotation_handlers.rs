// greenhouse_storefront/src/web/handlers/quotation_handlers.rs

//! Buyer side of the quotation lifecycle.

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument};

use crate::errors::AppError;
use crate::models::{QuotationItem, QuotationStatus};
use crate::services::split::Selection;
use crate::state::AppState;
use crate::web::extractors::AuthenticatedUser;
use crate::web::handlers::StatusQuery;
use crate::web::views::{views, OrderView, QuotationView, RequestSummaryView};

#[derive(Deserialize, Debug, Default)]
pub struct CreateQuotationPayload {
  /// Custom items; when absent the request is built from the buyer's cart.
  #[serde(default)]
  pub items: Option<Vec<QuotationItem>>,
}

#[derive(Deserialize, Debug)]
pub struct SelectMerchantsPayload {
  /// Item index -> merchant code.
  pub selections: Selection,
}

#[instrument(name = "handler::create_quotation", skip(app_state, payload, auth_user), fields(user_id = %auth_user.user_id))]
pub async fn create_quotation_handler(
  app_state: web::Data<AppState>,
  payload: web::Json<CreateQuotationPayload>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let created = app_state
    .quotations()
    .create_request(auth_user.user_id, payload.into_inner().items)
    .await?;
  info!("Quotation {} requested.", created.quotation_code);
  Ok(HttpResponse::Created().json(json!({
    "message": "Quotation request submitted.",
    "quotation": QuotationView::from(created),
  })))
}

#[instrument(name = "handler::list_my_quotations", skip(app_state, query, auth_user), fields(user_id = %auth_user.user_id))]
pub async fn list_my_quotations_handler(
  app_state: web::Data<AppState>,
  query: web::Query<StatusQuery<QuotationStatus>>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let requests = app_state
    .quotations()
    .list_requests(auth_user.user_id, query.into_inner().status)
    .await?;
  Ok(HttpResponse::Ok().json(json!({ "quotations": views::<_, RequestSummaryView>(requests) })))
}

#[instrument(name = "handler::get_quotation", skip(app_state, path, auth_user), fields(user_id = %auth_user.user_id))]
pub async fn get_quotation_handler(
  app_state: web::Data<AppState>,
  path: web::Path<String>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let found = app_state
    .quotations()
    .get_quotation(auth_user.user_id, &path.into_inner())
    .await?;
  Ok(HttpResponse::Ok().json(json!({
    "quotation": QuotationView::from(found.request),
    "bids": views::<_, QuotationView>(found.bids),
  })))
}

#[instrument(name = "handler::select_merchants", skip(app_state, path, payload, auth_user), fields(user_id = %auth_user.user_id))]
pub async fn select_merchants_handler(
  app_state: web::Data<AppState>,
  path: web::Path<String>,
  payload: web::Json<SelectMerchantsPayload>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let code = path.into_inner();
  let outcome = app_state
    .quotations()
    .select_merchants(auth_user.user_id, &code, payload.into_inner().selections)
    .await?;
  let body = json!({
    "quotation_code": code,
    "replayed": outcome.replayed,
    "orders": views::<_, OrderView>(outcome.orders),
  });
  if outcome.replayed {
    Ok(HttpResponse::Ok().json(body))
  } else {
    Ok(HttpResponse::Created().json(body))
  }
}

#[instrument(name = "handler::close_quotation", skip(app_state, path, auth_user), fields(user_id = %auth_user.user_id))]
pub async fn close_quotation_handler(
  app_state: web::Data<AppState>,
  path: web::Path<String>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let closed = app_state
    .quotations()
    .close_request(auth_user.user_id, &path.into_inner())
    .await?;
  Ok(HttpResponse::Ok().json(json!({ "quotation": QuotationView::from(closed) })))
}
