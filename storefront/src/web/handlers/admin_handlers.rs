// greenhouse_storefront/src/web/handlers/admin_handlers.rs

//! Admin back-office. Every handler first checks the caller's profile role.

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use tracing::instrument;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::{MerchantStatus, OrderStatus, QuotationStatus};
use crate::services::profile_service::require_admin;
use crate::services::{merchant_service, order_service};
use crate::state::AppState;
use crate::web::extractors::AuthenticatedUser;
use crate::web::handlers::{StatusChange, StatusQuery};
use crate::web::views::{views, MerchantView, OrderView, QuotationView};

#[derive(Deserialize, Debug)]
pub struct AdminQuotationQuery {
  pub status: Option<QuotationStatus>,
  /// Include merchant bids as well as buyer requests.
  #[serde(default)]
  pub include_bids: bool,
}

#[instrument(name = "handler::admin_list_merchants", skip(app_state, query, auth_user), fields(user_id = %auth_user.user_id))]
pub async fn list_merchants_handler(
  app_state: web::Data<AppState>,
  query: web::Query<StatusQuery<MerchantStatus>>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  require_admin(&app_state, auth_user.user_id).await?;
  let merchants = merchant_service::list_merchants(&app_state, query.into_inner().status).await?;
  Ok(HttpResponse::Ok().json(json!({ "merchants": views::<_, MerchantView>(merchants) })))
}

#[instrument(name = "handler::admin_set_merchant_status", skip(app_state, path, payload, auth_user), fields(user_id = %auth_user.user_id))]
pub async fn set_merchant_status_handler(
  app_state: web::Data<AppState>,
  path: web::Path<String>,
  payload: web::Json<StatusChange<MerchantStatus>>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  require_admin(&app_state, auth_user.user_id).await?;
  let merchant =
    merchant_service::set_merchant_status(&app_state, &path.into_inner(), payload.into_inner().status).await?;
  Ok(HttpResponse::Ok().json(json!({ "merchant": MerchantView::from(merchant) })))
}

#[instrument(name = "handler::admin_list_quotations", skip(app_state, query, auth_user), fields(user_id = %auth_user.user_id))]
pub async fn list_quotations_handler(
  app_state: web::Data<AppState>,
  query: web::Query<AdminQuotationQuery>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  require_admin(&app_state, auth_user.user_id).await?;
  let query = query.into_inner();
  let quotations = app_state
    .quotations()
    .list_all(query.status, !query.include_bids)
    .await?;
  Ok(HttpResponse::Ok().json(json!({ "quotations": views::<_, QuotationView>(quotations) })))
}

#[instrument(name = "handler::admin_set_quotation_status", skip(app_state, path, payload, auth_user), fields(user_id = %auth_user.user_id))]
pub async fn set_quotation_status_handler(
  app_state: web::Data<AppState>,
  path: web::Path<String>,
  payload: web::Json<StatusChange<QuotationStatus>>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  require_admin(&app_state, auth_user.user_id).await?;
  let quotation = app_state
    .quotations()
    .admin_set_status(&path.into_inner(), payload.into_inner().status)
    .await?;
  Ok(HttpResponse::Ok().json(json!({ "quotation": QuotationView::from(quotation) })))
}

#[instrument(name = "handler::admin_list_orders", skip(app_state, query, auth_user), fields(user_id = %auth_user.user_id))]
pub async fn list_orders_handler(
  app_state: web::Data<AppState>,
  query: web::Query<StatusQuery<OrderStatus>>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  require_admin(&app_state, auth_user.user_id).await?;
  let orders = order_service::list_all_orders(&app_state, query.into_inner().status).await?;
  Ok(HttpResponse::Ok().json(json!({ "orders": views::<_, OrderView>(orders) })))
}

#[instrument(name = "handler::admin_set_order_status", skip(app_state, path, payload, auth_user), fields(user_id = %auth_user.user_id))]
pub async fn set_order_status_handler(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
  payload: web::Json<StatusChange<OrderStatus>>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  require_admin(&app_state, auth_user.user_id).await?;
  let order = order_service::admin_update_order_status(&app_state, path.into_inner(), payload.into_inner().status).await?;
  Ok(HttpResponse::Ok().json(json!({ "order": OrderView::from(order) })))
}
