// greenhouse_storefront/src/web/handlers/merchant_handlers.rs

//! Merchant back-office: account, products, bidding queue and incoming orders.

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::{NewProduct, OrderStatus, ProductUpdate, QuotationStatus};
use crate::services::merchant_service::{self, MerchantRegistration};
use crate::services::{catalog_service, order_service};
use crate::state::AppState;
use crate::web::extractors::AuthenticatedUser;
use crate::web::handlers::{StatusChange, StatusQuery};
use crate::web::views::{views, MerchantView, OrderView, QuotationView};

#[derive(Deserialize, Debug)]
pub struct SubmitBidPayload {
  /// Positional to the request's items; `null` entries count as zero.
  pub unit_prices: Vec<Option<i64>>,
  pub estimated_delivery_days: Option<i32>,
}

#[instrument(name = "handler::register_merchant", skip(app_state, payload, auth_user), fields(user_id = %auth_user.user_id))]
pub async fn register_merchant_handler(
  app_state: web::Data<AppState>,
  payload: web::Json<MerchantRegistration>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  if !auth_user.verified {
    return Err(AppError::Forbidden("Verify your email before registering as a merchant.".to_string()));
  }
  let merchant =
    merchant_service::register_merchant(&app_state, auth_user.user_id, &auth_user.email, payload.into_inner()).await?;
  Ok(HttpResponse::Created().json(json!({ "merchant": MerchantView::from(merchant) })))
}

#[instrument(name = "handler::merchant_me", skip(app_state, auth_user), fields(user_id = %auth_user.user_id))]
pub async fn merchant_me_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let merchant = merchant_service::current_merchant(&app_state, auth_user.user_id).await?;
  Ok(HttpResponse::Ok().json(json!({ "merchant": MerchantView::from(merchant) })))
}

#[instrument(name = "handler::list_merchant_products", skip(app_state, auth_user), fields(user_id = %auth_user.user_id))]
pub async fn list_merchant_products_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let products = catalog_service::list_merchant_products(&app_state, auth_user.user_id).await?;
  Ok(HttpResponse::Ok().json(json!({ "products": products })))
}

#[instrument(name = "handler::create_merchant_product", skip(app_state, payload, auth_user), fields(user_id = %auth_user.user_id))]
pub async fn create_merchant_product_handler(
  app_state: web::Data<AppState>,
  payload: web::Json<NewProduct>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let product = catalog_service::create_merchant_product(&app_state, auth_user.user_id, payload.into_inner()).await?;
  Ok(HttpResponse::Created().json(json!({ "product": product })))
}

#[instrument(name = "handler::update_merchant_product", skip(app_state, path, payload, auth_user), fields(user_id = %auth_user.user_id))]
pub async fn update_merchant_product_handler(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
  payload: web::Json<ProductUpdate>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let product = catalog_service::update_merchant_product(
    &app_state,
    auth_user.user_id,
    path.into_inner(),
    payload.into_inner(),
  )
  .await?;
  Ok(HttpResponse::Ok().json(json!({ "product": product })))
}

#[instrument(name = "handler::available_quotations", skip(app_state, auth_user), fields(user_id = %auth_user.user_id))]
pub async fn available_quotations_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let available = app_state.quotations().available_for_merchant(auth_user.user_id).await?;
  Ok(HttpResponse::Ok().json(json!({ "quotations": views::<_, QuotationView>(available) })))
}

#[instrument(name = "handler::list_merchant_bids", skip(app_state, query, auth_user), fields(user_id = %auth_user.user_id))]
pub async fn list_merchant_bids_handler(
  app_state: web::Data<AppState>,
  query: web::Query<StatusQuery<QuotationStatus>>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let bids = app_state
    .quotations()
    .list_merchant_bids(auth_user.user_id, query.into_inner().status)
    .await?;
  Ok(HttpResponse::Ok().json(json!({ "bids": views::<_, QuotationView>(bids) })))
}

#[instrument(name = "handler::submit_bid", skip(app_state, path, payload, auth_user), fields(user_id = %auth_user.user_id))]
pub async fn submit_bid_handler(
  app_state: web::Data<AppState>,
  path: web::Path<String>,
  payload: web::Json<SubmitBidPayload>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let payload = payload.into_inner();
  let bid = app_state
    .quotations()
    .submit_bid(
      auth_user.user_id,
      &path.into_inner(),
      payload.unit_prices,
      payload.estimated_delivery_days,
    )
    .await?;
  info!("Bid {} submitted on {}.", bid.id, bid.quotation_code);
  Ok(HttpResponse::Created().json(json!({ "bid": QuotationView::from(bid) })))
}

#[instrument(name = "handler::merchant_close_quotation", skip(app_state, path, auth_user), fields(user_id = %auth_user.user_id))]
pub async fn close_merchant_quotation_handler(
  app_state: web::Data<AppState>,
  path: web::Path<String>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let closed = app_state
    .quotations()
    .close_for_merchant(auth_user.user_id, &path.into_inner())
    .await?;
  Ok(HttpResponse::Ok().json(json!({ "bid": QuotationView::from(closed) })))
}

#[instrument(name = "handler::list_merchant_orders", skip(app_state, query, auth_user), fields(user_id = %auth_user.user_id))]
pub async fn list_merchant_orders_handler(
  app_state: web::Data<AppState>,
  query: web::Query<StatusQuery<OrderStatus>>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let orders = order_service::list_merchant_orders(&app_state, auth_user.user_id, query.into_inner().status).await?;
  Ok(HttpResponse::Ok().json(json!({ "orders": views::<_, OrderView>(orders) })))
}

#[instrument(name = "handler::update_merchant_order", skip(app_state, path, payload, auth_user), fields(user_id = %auth_user.user_id))]
pub async fn update_merchant_order_status_handler(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
  payload: web::Json<StatusChange<OrderStatus>>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let order = order_service::update_merchant_order_status(
    &app_state,
    auth_user.user_id,
    path.into_inner(),
    payload.into_inner().status,
  )
  .await?;
  Ok(HttpResponse::Ok().json(json!({ "order": OrderView::from(order) })))
}
