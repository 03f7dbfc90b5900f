// greenhouse_storefront/src/web/handlers/profile_handlers.rs

use actix_web::{web, HttpResponse};
use serde_json::json;
use tracing::instrument;

use crate::errors::AppError;
use crate::services::profile_service::{self, ProfileUpdate};
use crate::state::AppState;
use crate::web::extractors::AuthenticatedUser;

#[instrument(name = "handler::get_profile", skip(app_state, auth_user), fields(user_id = %auth_user.user_id))]
pub async fn get_profile_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let profile = profile_service::get_profile(&app_state, auth_user.user_id).await?;
  Ok(HttpResponse::Ok().json(json!({ "profile": profile })))
}

#[instrument(name = "handler::upsert_profile", skip(app_state, payload, auth_user), fields(user_id = %auth_user.user_id))]
pub async fn upsert_profile_handler(
  app_state: web::Data<AppState>,
  payload: web::Json<ProfileUpdate>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let profile =
    profile_service::upsert_profile(&app_state, auth_user.user_id, &auth_user.email, payload.into_inner()).await?;
  Ok(HttpResponse::Ok().json(json!({ "profile": profile })))
}
