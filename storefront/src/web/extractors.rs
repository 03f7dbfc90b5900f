// greenhouse_storefront/src/web/extractors.rs

//! Identity extractors.
//!
//! Authentication happens at the identity provider's gateway, which forwards
//! the verified identity as `X-User-ID`, `X-User-Email` and `X-User-Verified`.
//! Guests carry an opaque `X-Guest-Session` instead.

use actix_web::{dev::Payload, FromRequest, HttpRequest};
use futures_util::future::{ready, Ready};
use tracing::warn;
use uuid::Uuid;

use crate::cart::CartOwner;
use crate::errors::AppError;

pub const USER_ID_HEADER: &str = "X-User-ID";
pub const USER_EMAIL_HEADER: &str = "X-User-Email";
pub const USER_VERIFIED_HEADER: &str = "X-User-Verified";
pub const GUEST_SESSION_HEADER: &str = "X-Guest-Session";

const MAX_GUEST_SESSION_LEN: usize = 64;

#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
  pub user_id: Uuid,
  pub email: String,
  pub verified: bool,
}

fn header<'a>(req: &'a HttpRequest, name: &str) -> Option<&'a str> {
  req.headers().get(name).and_then(|v| v.to_str().ok())
}

fn authenticated_user(req: &HttpRequest) -> Option<AuthenticatedUser> {
  let user_id = header(req, USER_ID_HEADER).and_then(|v| Uuid::parse_str(v).ok())?;
  Some(AuthenticatedUser {
    user_id,
    email: header(req, USER_EMAIL_HEADER).unwrap_or_default().to_string(),
    verified: header(req, USER_VERIFIED_HEADER).is_some_and(|v| v.eq_ignore_ascii_case("true")),
  })
}

fn guest_session(req: &HttpRequest) -> Option<String> {
  header(req, GUEST_SESSION_HEADER)
    .filter(|s| !s.is_empty() && s.len() <= MAX_GUEST_SESSION_LEN)
    .filter(|s| s.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'))
    .map(str::to_string)
}

impl FromRequest for AuthenticatedUser {
  type Error = AppError;
  type Future = Ready<Result<Self, Self::Error>>;

  fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
    ready(authenticated_user(req).ok_or_else(|| {
      warn!("AuthenticatedUser extractor: missing or invalid {} header.", USER_ID_HEADER);
      AppError::Auth("Sign in to continue.".to_string())
    }))
  }
}

/// Whoever owns the cart of this request: the signed-in user, or else the guest session.
#[derive(Debug, Clone)]
pub struct Shopper {
  pub owner: CartOwner,
  pub user: Option<AuthenticatedUser>,
}

impl FromRequest for Shopper {
  type Error = AppError;
  type Future = Ready<Result<Self, Self::Error>>;

  fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
    if let Some(user) = authenticated_user(req) {
      return ready(Ok(Shopper {
        owner: CartOwner::User(user.user_id),
        user: Some(user),
      }));
    }
    ready(
      guest_session(req)
        .map(|session| Shopper {
          owner: CartOwner::Guest(session),
          user: None,
        })
        .ok_or_else(|| {
          warn!("Shopper extractor: neither a user nor a valid guest session.");
          AppError::Auth(format!("Sign in or send a valid {} header.", GUEST_SESSION_HEADER))
        }),
    )
  }
}
