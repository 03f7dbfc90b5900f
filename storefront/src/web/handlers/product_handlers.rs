// greenhouse_storefront/src/web/handlers/product_handlers.rs

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::errors::AppError;
use crate::services::catalog_service::{self, NewReview};
use crate::state::AppState;
use crate::web::extractors::AuthenticatedUser;

#[derive(Deserialize, Debug)]
pub struct ListProductsQuery {
  pub category: Option<String>,
}

#[instrument(name = "handler::list_products", skip(app_state, query))]
pub async fn list_products_handler(
  app_state: web::Data<AppState>,
  query: web::Query<ListProductsQuery>,
) -> Result<HttpResponse, AppError> {
  let products = catalog_service::list_products(&app_state, query.into_inner().category).await?;
  info!("Fetched {} products.", products.len());
  Ok(HttpResponse::Ok().json(json!({ "products": products })))
}

#[instrument(name = "handler::get_product", skip(app_state, path), fields(product_id = %path.as_ref()))]
pub async fn get_product_handler(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
  let product = catalog_service::get_product(&app_state, path.into_inner()).await?;
  Ok(HttpResponse::Ok().json(json!({ "product": product })))
}

#[instrument(name = "handler::list_reviews", skip(app_state, path), fields(product_id = %path.as_ref()))]
pub async fn list_reviews_handler(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
  let summary = catalog_service::list_reviews(&app_state, path.into_inner()).await?;
  Ok(HttpResponse::Ok().json(summary))
}

#[instrument(
  name = "handler::add_review",
  skip(app_state, path, payload, auth_user),
  fields(user_id = %auth_user.user_id, product_id = %path.as_ref())
)]
pub async fn add_review_handler(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
  payload: web::Json<NewReview>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let review = catalog_service::add_review(&app_state, auth_user.user_id, path.into_inner(), payload.into_inner()).await?;
  Ok(HttpResponse::Created().json(json!({ "review": review })))
}
