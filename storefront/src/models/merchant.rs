// greenhouse_storefront/src/models/merchant.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type as SqlxType};
use uuid::Uuid;

use super::status::{BadgeColor, Lifecycle, StatusBadge};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, SqlxType)]
#[sqlx(type_name = "merchant_status_enum", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum MerchantStatus {
  Pending,
  Approved,
  Rejected,
  Blocked,
}

impl Lifecycle for MerchantStatus {
  const ENTITY: &'static str = "merchant";

  fn as_str(self) -> &'static str {
    match self {
      MerchantStatus::Pending => "pending",
      MerchantStatus::Approved => "approved",
      MerchantStatus::Rejected => "rejected",
      MerchantStatus::Blocked => "blocked",
    }
  }

  fn allowed_next(self) -> &'static [Self] {
    use MerchantStatus::*;
    match self {
      Pending => &[Approved, Rejected],
      Approved => &[Blocked],
      Blocked => &[Approved],
      Rejected => &[Approved],
    }
  }

  fn badge(self) -> StatusBadge {
    match self {
      MerchantStatus::Pending => StatusBadge::new("Pending review", BadgeColor::Yellow),
      MerchantStatus::Approved => StatusBadge::new("Approved", BadgeColor::Green),
      MerchantStatus::Rejected => StatusBadge::new("Rejected", BadgeColor::Red),
      MerchantStatus::Blocked => StatusBadge::new("Blocked", BadgeColor::Gray),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Merchant {
  pub merchant_code: String,
  pub user_id: Uuid,
  pub business_name: String,
  pub email: String,
  pub phone: Option<String>,
  pub address: Option<String>,
  pub status: MerchantStatus,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

impl Merchant {
  pub fn is_approved(&self) -> bool {
    self.status == MerchantStatus::Approved
  }
}
