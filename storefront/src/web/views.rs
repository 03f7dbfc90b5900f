// greenhouse_storefront/src/web/views.rs

//! Response bodies: the stored rows plus the display badge of their status.

use serde::Serialize;

use crate::models::{Lifecycle, Merchant, Order, Quotation, StatusBadge};
use crate::services::quotation_service::RequestSummary;

#[derive(Debug, Serialize)]
pub struct QuotationView {
  #[serde(flatten)]
  pub quotation: Quotation,
  pub status_badge: StatusBadge,
}

impl From<Quotation> for QuotationView {
  fn from(quotation: Quotation) -> Self {
    let status_badge = quotation.status.badge();
    Self { quotation, status_badge }
  }
}

#[derive(Debug, Serialize)]
pub struct RequestSummaryView {
  #[serde(flatten)]
  pub summary: RequestSummary,
  pub status_badge: StatusBadge,
}

impl From<RequestSummary> for RequestSummaryView {
  fn from(summary: RequestSummary) -> Self {
    let status_badge = summary.request.status.badge();
    Self { summary, status_badge }
  }
}

#[derive(Debug, Serialize)]
pub struct OrderView {
  #[serde(flatten)]
  pub order: Order,
  pub status_badge: StatusBadge,
}

impl From<Order> for OrderView {
  fn from(order: Order) -> Self {
    let status_badge = order.status.badge();
    Self { order, status_badge }
  }
}

#[derive(Debug, Serialize)]
pub struct MerchantView {
  #[serde(flatten)]
  pub merchant: Merchant,
  pub status_badge: StatusBadge,
}

impl From<Merchant> for MerchantView {
  fn from(merchant: Merchant) -> Self {
    let status_badge = merchant.status.badge();
    Self { merchant, status_badge }
  }
}

pub fn views<T, V: From<T>>(rows: Vec<T>) -> Vec<V> {
  rows.into_iter().map(V::from).collect()
}
