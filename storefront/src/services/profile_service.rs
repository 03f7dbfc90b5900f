// greenhouse_storefront/src/services/profile_service.rs

use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use crate::errors::{AppError, Result};
use crate::models::{UserProfile, UserRole};
use crate::state::AppState;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileUpdate {
  pub full_name: Option<String>,
  pub phone: Option<String>,
}

pub async fn get_profile(state: &AppState, user_id: Uuid) -> Result<UserProfile> {
  state
    .store
    .get_profile(user_id)
    .await?
    .ok_or_else(|| AppError::NotFound("Profile not found.".to_string()))
}

/// Creates or updates the caller's profile. The role is never changed here and
/// the email always comes from the identity provider.
pub async fn upsert_profile(state: &AppState, user_id: Uuid, email: &str, update: ProfileUpdate) -> Result<UserProfile> {
  if email.trim().is_empty() {
    return Err(AppError::Validation("The identity carries no email address.".to_string()));
  }
  let now = Utc::now();
  let profile = match state.store.get_profile(user_id).await? {
    Some(existing) => UserProfile {
      email: email.to_string(),
      full_name: update.full_name.or(existing.full_name),
      phone: update.phone.or(existing.phone),
      updated_at: now,
      ..existing
    },
    None => UserProfile {
      user_id,
      email: email.to_string(),
      full_name: update.full_name,
      phone: update.phone,
      role: UserRole::Buyer,
      created_at: now,
      updated_at: now,
    },
  };
  Ok(state.store.upsert_profile(&profile).await?)
}

pub async fn require_admin(state: &AppState, user_id: Uuid) -> Result<UserProfile> {
  match state.store.get_profile(user_id).await? {
    Some(profile) if profile.role == UserRole::Admin => Ok(profile),
    _ => Err(AppError::Forbidden("Administrator access required.".to_string())),
  }
}
