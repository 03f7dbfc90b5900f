// greenhouse_storefront/src/models/quotation.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sqlx::Type as SqlxType;
use uuid::Uuid;

use super::status::{BadgeColor, Lifecycle, StatusBadge};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, SqlxType)]
#[sqlx(type_name = "quotation_status_enum", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum QuotationStatus {
  Pending,
  WaitingForAdmin,
  Approved,
  UserConfirmed,
  OrderPlaced,
  Rejected,
  Closed,
}

impl Lifecycle for QuotationStatus {
  const ENTITY: &'static str = "quotation";

  fn as_str(self) -> &'static str {
    match self {
      QuotationStatus::Pending => "pending",
      QuotationStatus::WaitingForAdmin => "waiting_for_admin",
      QuotationStatus::Approved => "approved",
      QuotationStatus::UserConfirmed => "user_confirmed",
      QuotationStatus::OrderPlaced => "order_placed",
      QuotationStatus::Rejected => "rejected",
      QuotationStatus::Closed => "closed",
    }
  }

  fn allowed_next(self) -> &'static [Self] {
    use QuotationStatus::*;
    match self {
      Pending => &[WaitingForAdmin, Approved, UserConfirmed, Rejected, Closed],
      WaitingForAdmin => &[Approved, Rejected, Closed],
      Approved => &[UserConfirmed, Rejected, Closed],
      UserConfirmed => &[OrderPlaced],
      OrderPlaced | Rejected | Closed => &[],
    }
  }

  fn badge(self) -> StatusBadge {
    match self {
      QuotationStatus::Pending => StatusBadge::new("Pending", BadgeColor::Yellow),
      QuotationStatus::WaitingForAdmin => StatusBadge::new("Waiting for admin", BadgeColor::Gray),
      QuotationStatus::Approved => StatusBadge::new("Approved", BadgeColor::Blue),
      QuotationStatus::UserConfirmed => StatusBadge::new("Confirmed", BadgeColor::Indigo),
      QuotationStatus::OrderPlaced => StatusBadge::new("Order placed", BadgeColor::Green),
      QuotationStatus::Rejected => StatusBadge::new("Rejected", BadgeColor::Red),
      QuotationStatus::Closed => StatusBadge::new("Closed", BadgeColor::Gray),
    }
  }
}

/// One requested line. `product_id` is `None` for items outside the catalogue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuotationItem {
  pub product_id: Option<Uuid>,
  pub quantity: u32,
  /// Descriptive fields such as name, category, size and year.
  #[serde(default)]
  pub attributes: Map<String, Value>,
}

impl QuotationItem {
  pub fn name(&self) -> Option<String> {
    self.attributes.get("name").and_then(Value::as_str).map(str::to_string)
  }
}

/// A buyer's request (`is_user_request = true`) or a merchant's bid on it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quotation {
  pub id: Uuid,
  pub quotation_code: String,
  pub user_id: Uuid,
  pub merchant_code: Option<String>,
  pub is_user_request: bool,
  pub items: Vec<QuotationItem>,
  /// Bids only; positional to `items`. Entries may be missing or null.
  pub unit_prices: Vec<Option<i64>>,
  pub total_amount: Option<i64>,
  pub status: QuotationStatus,
  pub estimated_delivery_days: Option<i32>,
  pub selected_merchants: Vec<String>,
  pub created_at: DateTime<Utc>,
  pub confirmed_at: Option<DateTime<Utc>>,
  pub order_placed_at: Option<DateTime<Utc>>,
  pub updated_at: DateTime<Utc>,
}

impl Quotation {
  pub fn new_request(quotation_code: String, user_id: Uuid, items: Vec<QuotationItem>) -> Self {
    let now = Utc::now();
    Self {
      id: Uuid::new_v4(),
      quotation_code,
      user_id,
      merchant_code: None,
      is_user_request: true,
      items,
      unit_prices: Vec::new(),
      total_amount: None,
      status: QuotationStatus::Pending,
      estimated_delivery_days: None,
      selected_merchants: Vec::new(),
      created_at: now,
      confirmed_at: None,
      order_placed_at: None,
      updated_at: now,
    }
  }

  /// A bid row answering `request`, with the request's items copied over.
  pub fn new_bid(
    request: &Quotation,
    merchant_code: String,
    unit_prices: Vec<Option<i64>>,
    total_amount: Option<i64>,
    estimated_delivery_days: Option<i32>,
    status: QuotationStatus,
  ) -> Self {
    let now = Utc::now();
    Self {
      id: Uuid::new_v4(),
      quotation_code: request.quotation_code.clone(),
      user_id: request.user_id,
      merchant_code: Some(merchant_code),
      is_user_request: false,
      items: request.items.clone(),
      unit_prices,
      total_amount,
      status,
      estimated_delivery_days,
      selected_merchants: Vec::new(),
      created_at: now,
      confirmed_at: None,
      order_placed_at: None,
      updated_at: now,
    }
  }

  /// Unit price at `index`; missing and null entries count as zero.
  pub fn unit_price_at(&self, index: usize) -> i64 {
    self.unit_prices.get(index).copied().flatten().unwrap_or(0)
  }
}

/// A request row together with the bids received for it.
#[derive(Debug, Clone, Serialize)]
pub struct QuotationWithBids {
  pub request: Quotation,
  pub bids: Vec<Quotation>,
}
