// greenhouse_storefront/src/services/split.rs

//! Turns a buyer's per-item merchant selection into one order per merchant.

use std::collections::BTreeMap;

use crate::errors::{AppError, Result};
use crate::models::{Order, OrderLine, Quotation, QuotationStatus};
use crate::services::pricing::line_total;

/// Item index in the request -> chosen merchant code.
pub type Selection = BTreeMap<usize, String>;

#[derive(Debug, Clone)]
pub struct SplitPlan {
  /// Distinct merchants, in order of their first selected item.
  pub selected_merchants: Vec<String>,
  /// One pending order per entry of `selected_merchants`, same order.
  pub orders: Vec<Order>,
}

pub fn distinct_merchants(selection: &Selection) -> Vec<String> {
  let mut merchants: Vec<String> = Vec::new();
  for merchant in selection.values() {
    if !merchants.contains(merchant) {
      merchants.push(merchant.clone());
    }
  }
  merchants
}

fn open_bid_of<'a>(bids: &'a [Quotation], merchant_code: &str) -> Option<&'a Quotation> {
  bids.iter().find(|b| {
    !b.is_user_request && b.merchant_code.as_deref() == Some(merchant_code) && b.status != QuotationStatus::Closed
  })
}

pub fn validate_selection(request: &Quotation, bids: &[Quotation], selection: &Selection) -> Result<()> {
  if selection.is_empty() {
    return Err(AppError::Validation(
      "Select a merchant for at least one item.".to_string(),
    ));
  }
  if let Some((&index, _)) = selection.iter().find(|&(&i, _)| i >= request.items.len()) {
    return Err(AppError::Validation(format!(
      "Item index {} is out of range; the request has {} items.",
      index,
      request.items.len()
    )));
  }
  for merchant in distinct_merchants(selection) {
    if open_bid_of(bids, &merchant).is_none() {
      return Err(AppError::Validation(format!(
        "Merchant {} has no open bid on {}.",
        merchant, request.quotation_code
      )));
    }
  }
  Ok(())
}

/// Builds one line per selected item, priced from the chosen merchant's bid at
/// the item's position, and groups the lines into one order per merchant.
pub fn build_split_plan(request: &Quotation, bids: &[Quotation], selection: &Selection) -> Result<SplitPlan> {
  validate_selection(request, bids, selection)?;

  let mut lines_by_merchant: BTreeMap<&str, Vec<OrderLine>> = BTreeMap::new();
  for (&index, merchant) in selection {
    let item = &request.items[index];
    let bid = open_bid_of(bids, merchant)
      .ok_or_else(|| AppError::Validation(format!("Merchant {} has no open bid.", merchant)))?;
    let unit_price = bid.unit_price_at(index);
    lines_by_merchant.entry(merchant.as_str()).or_default().push(OrderLine {
      product_id: item.product_id,
      name: item.name(),
      quantity: item.quantity,
      unit_price,
      price: line_total(unit_price, item.quantity)?,
      item_index: Some(index),
      quotation_code: Some(request.quotation_code.clone()),
      selected_merchant: Some(merchant.clone()),
      attributes: item.attributes.clone(),
    });
  }

  let selected_merchants = distinct_merchants(selection);
  let orders = selected_merchants
    .iter()
    .map(|merchant| -> Result<Order> {
      let lines = lines_by_merchant.remove(merchant.as_str()).unwrap_or_default();
      let mut order = Order::pending(Some(merchant.clone()), lines)?;
      order.user_id = Some(request.user_id);
      order.quotation_code = Some(request.quotation_code.clone());
      Ok(order)
    })
    .collect::<Result<Vec<Order>>>()?;

  Ok(SplitPlan {
    selected_merchants,
    orders,
  })
}
