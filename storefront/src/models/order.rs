// greenhouse_storefront/src/models/order.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sqlx::Type as SqlxType;
use uuid::Uuid;

use super::status::{BadgeColor, Lifecycle, StatusBadge};
use crate::errors::Result;
use crate::services::pricing::sum_amounts;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, SqlxType)]
#[sqlx(type_name = "order_status_enum", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
  Pending,
  Confirmed,
  Shipped,
  Delivered,
  Cancelled,
}

impl Lifecycle for OrderStatus {
  const ENTITY: &'static str = "order";

  fn as_str(self) -> &'static str {
    match self {
      OrderStatus::Pending => "pending",
      OrderStatus::Confirmed => "confirmed",
      OrderStatus::Shipped => "shipped",
      OrderStatus::Delivered => "delivered",
      OrderStatus::Cancelled => "cancelled",
    }
  }

  fn allowed_next(self) -> &'static [Self] {
    use OrderStatus::*;
    match self {
      Pending => &[Confirmed, Cancelled],
      Confirmed => &[Shipped, Cancelled],
      Shipped => &[Delivered],
      Delivered | Cancelled => &[],
    }
  }

  fn badge(self) -> StatusBadge {
    match self {
      OrderStatus::Pending => StatusBadge::new("Pending", BadgeColor::Yellow),
      OrderStatus::Confirmed => StatusBadge::new("Confirmed", BadgeColor::Blue),
      OrderStatus::Shipped => StatusBadge::new("Shipped", BadgeColor::Indigo),
      OrderStatus::Delivered => StatusBadge::new("Delivered", BadgeColor::Green),
      OrderStatus::Cancelled => StatusBadge::new("Cancelled", BadgeColor::Red),
    }
  }
}

/// A purchased line with its resolved price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderLine {
  pub product_id: Option<Uuid>,
  pub name: Option<String>,
  pub quantity: u32,
  pub unit_price: i64,
  /// `unit_price * quantity`.
  pub price: i64,
  /// Position of the line in the originating quotation request.
  pub item_index: Option<usize>,
  pub quotation_code: Option<String>,
  pub selected_merchant: Option<String>,
  #[serde(default)]
  pub attributes: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
  pub id: Uuid,
  pub user_id: Option<Uuid>,
  pub guest_email: Option<String>,
  pub quotation_code: Option<String>,
  pub merchant_code: Option<String>,
  pub total_amount: i64,
  pub status: OrderStatus,
  pub cart_items: Vec<OrderLine>,
  pub payment_reference: Option<String>,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

impl Order {
  /// A `pending` order whose total is the sum of `lines`.
  pub fn pending(merchant_code: Option<String>, cart_items: Vec<OrderLine>) -> Result<Self> {
    let now = Utc::now();
    let total_amount = sum_amounts(cart_items.iter().map(|l| l.price))?;
    Ok(Self {
      id: Uuid::new_v4(),
      user_id: None,
      guest_email: None,
      quotation_code: None,
      merchant_code,
      total_amount,
      status: OrderStatus::Pending,
      cart_items,
      payment_reference: None,
      created_at: now,
      updated_at: now,
    })
  }
}
