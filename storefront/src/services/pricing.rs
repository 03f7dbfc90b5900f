// greenhouse_storefront/src/services/pricing.rs

//! Money arithmetic. Amounts are `i64` minor units and every product and sum
//! is checked; an amount outside `i64` is rejected rather than wrapped.

use tracing::warn;

use crate::errors::{AppError, Result};
use crate::models::QuotationItem;

fn amount_too_large() -> AppError {
  AppError::Validation("Amount too large.".to_string())
}

/// `unit_price * quantity`.
pub fn line_total(unit_price: i64, quantity: u32) -> Result<i64> {
  unit_price.checked_mul(i64::from(quantity)).ok_or_else(amount_too_large)
}

/// Sum of `amounts`.
pub fn sum_amounts(amounts: impl IntoIterator<Item = i64>) -> Result<i64> {
  amounts
    .into_iter()
    .try_fold(0i64, |acc, amount| acc.checked_add(amount))
    .ok_or_else(amount_too_large)
}

/// `Σ unit_price[i] * items[i].quantity`.
///
/// Prices are positional. A missing or null price counts as zero; a length
/// mismatch is tolerated and only logged.
pub fn bid_total(items: &[QuotationItem], unit_prices: &[Option<i64>]) -> Result<i64> {
  if unit_prices.len() != items.len() {
    warn!(
      items = items.len(),
      prices = unit_prices.len(),
      "Bid price count does not match item count; missing prices count as zero."
    );
  }
  let lines = items
    .iter()
    .enumerate()
    .map(|(i, item)| line_total(unit_prices.get(i).copied().flatten().unwrap_or(0), item.quantity))
    .collect::<Result<Vec<i64>>>()?;
  sum_amounts(lines)
}
