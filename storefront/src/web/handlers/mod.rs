// greenhouse_storefront/src/web/handlers/mod.rs

pub mod admin_handlers;
pub mod cart_handlers;
pub mod checkout_handlers;
pub mod merchant_handlers;
pub mod order_handlers;
pub mod product_handlers;
pub mod profile_handlers;
pub mod quotation_handlers;

use serde::Deserialize;

/// `?status=<value>` filter shared by the list endpoints.
#[derive(Debug, Deserialize)]
pub struct StatusQuery<S> {
  pub status: Option<S>,
}

/// Body of the status-change endpoints.
#[derive(Debug, Deserialize)]
pub struct StatusChange<S> {
  pub status: S,
}
