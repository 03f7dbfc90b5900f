// greenhouse_storefront/src/web/handlers/order_handlers.rs

use actix_web::{web, HttpResponse};
use serde_json::json;
use tracing::instrument;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::OrderStatus;
use crate::services::order_service;
use crate::state::AppState;
use crate::web::extractors::AuthenticatedUser;
use crate::web::handlers::StatusQuery;
use crate::web::views::{views, OrderView};

#[instrument(name = "handler::list_orders", skip(app_state, query, auth_user), fields(user_id = %auth_user.user_id))]
pub async fn list_orders_handler(
  app_state: web::Data<AppState>,
  query: web::Query<StatusQuery<OrderStatus>>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let orders = order_service::list_buyer_orders(&app_state, auth_user.user_id, query.into_inner().status).await?;
  Ok(HttpResponse::Ok().json(json!({ "orders": views::<_, OrderView>(orders) })))
}

#[instrument(name = "handler::get_order", skip(app_state, path, auth_user), fields(user_id = %auth_user.user_id))]
pub async fn get_order_handler(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let order = order_service::get_buyer_order(&app_state, auth_user.user_id, path.into_inner()).await?;
  Ok(HttpResponse::Ok().json(json!({ "order": OrderView::from(order) })))
}

#[instrument(name = "handler::cancel_order", skip(app_state, path, auth_user), fields(user_id = %auth_user.user_id))]
pub async fn cancel_order_handler(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let order = order_service::cancel_buyer_order(&app_state, auth_user.user_id, path.into_inner()).await?;
  Ok(HttpResponse::Ok().json(json!({ "order": OrderView::from(order) })))
}
