// greenhouse_storefront/src/models/review.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Review {
  pub id: Uuid,
  pub product_id: Uuid,
  pub user_id: Uuid,
  /// 1 to 5.
  pub rating: i32,
  pub comment: Option<String>,
  pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReviewSummary {
  pub reviews: Vec<Review>,
  pub average_rating: Option<f64>,
}

impl ReviewSummary {
  pub fn from_reviews(reviews: Vec<Review>) -> Self {
    let average_rating = if reviews.is_empty() {
      None
    } else {
      let sum: i64 = reviews.iter().map(|r| r.rating as i64).sum();
      Some(sum as f64 / reviews.len() as f64)
    };
    Self { reviews, average_rating }
  }
}
