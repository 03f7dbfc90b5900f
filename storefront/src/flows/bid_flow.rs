// greenhouse_storefront/src/flows/bid_flow.rs

use crate::errors::AppError;
use crate::flows::contexts::BidCtxData;
use crate::models::{Lifecycle, Quotation, QuotationStatus};
use crate::services::codes::{expect_code, CodePrefix};
use crate::services::pricing::bid_total;
use crate::store::QuotationFilter;
use greenhouse_flow::{FlowState, Flows, StepControl, Workflow};
use tracing::{info, warn};

pub fn register_bid_flow(flows: &Flows<AppError>) {
  let mut p = Workflow::<BidCtxData, AppError>::new(&[
    ("resolve_approved_merchant", false, None),
    ("load_open_request", false, None),
    ("check_not_already_bid", false, None),
    ("price_bid", false, None),
    ("insert_bid_row", false, None),
  ]);

  p.on_root("resolve_approved_merchant", |ctx_data: FlowState<BidCtxData>| {
    Box::pin(async move {
      let (user_id, store) = {
        let guard = ctx_data.read();
        (guard.merchant_user_id, guard.app_state.store.clone())
      };

      let merchant = store
        .get_merchant_by_user(user_id)
        .await?
        .ok_or_else(|| AppError::Forbidden("Only registered merchants can submit bids.".to_string()))?;
      if !merchant.is_approved() {
        warn!(
          "Bid: merchant {} is {} and cannot bid.",
          merchant.merchant_code,
          merchant.status.as_str()
        );
        return Err(AppError::Forbidden(format!(
          "Merchant account {} is not approved.",
          merchant.merchant_code
        )));
      }

      ctx_data.write().merchant = Some(merchant);
      Ok(StepControl::Continue)
    })
  });

  p.on_root("load_open_request", |ctx_data: FlowState<BidCtxData>| {
    Box::pin(async move {
      let (code, store) = {
        let guard = ctx_data.read();
        (guard.quotation_code.clone(), guard.app_state.store.clone())
      };
      expect_code(&code, CodePrefix::Quotation)?;

      let request = store
        .get_request(&code)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Quotation {} not found.", code)))?;
      if request.status != QuotationStatus::Pending {
        return Err(AppError::Conflict(format!(
          "Quotation {} is {} and no longer accepts bids.",
          code,
          request.status.as_str()
        )));
      }

      ctx_data.write().request = Some(request);
      Ok(StepControl::Continue)
    })
  });

  p.on_root("check_not_already_bid", |ctx_data: FlowState<BidCtxData>| {
    Box::pin(async move {
      let (filter, store) = {
        let guard = ctx_data.read();
        let filter = QuotationFilter {
          is_user_request: Some(false),
          merchant_code: guard.merchant.as_ref().map(|m| m.merchant_code.clone()),
          quotation_code: Some(guard.quotation_code.clone()),
          ..Default::default()
        };
        (filter, guard.app_state.store.clone())
      };

      if !store.list_quotations(&filter).await?.is_empty() {
        return Err(AppError::Conflict(format!(
          "A bid for {} was already submitted by this merchant.",
          filter.quotation_code.unwrap_or_default()
        )));
      }
      Ok::<_, AppError>(StepControl::Continue)
    })
  });

  p.on_root("price_bid", |ctx_data: FlowState<BidCtxData>| {
    Box::pin(async move {
      let mut guard = ctx_data.write();
      let total = match guard.request.as_ref() {
        Some(request) => bid_total(&request.items, &guard.unit_prices)?,
        None => return Err(AppError::Internal("request not loaded before pricing".to_string())),
      };
      guard.total_amount = Some(total);
      Ok(StepControl::Continue)
    })
  });

  p.on_root("insert_bid_row", |ctx_data: FlowState<BidCtxData>| {
    Box::pin(async move {
      let (bid, store) = {
        let guard = ctx_data.read();
        let (request, merchant) = match (guard.request.as_ref(), guard.merchant.as_ref()) {
          (Some(r), Some(m)) => (r, m),
          _ => return Err(AppError::Internal("bid context incomplete".to_string())),
        };
        let bid = Quotation::new_bid(
          request,
          merchant.merchant_code.clone(),
          guard.unit_prices.clone(),
          guard.total_amount,
          guard.estimated_delivery_days,
          QuotationStatus::Pending,
        );
        (bid, guard.app_state.store.clone())
      };

      let created = store.submit_bid(&bid).await?;
      info!(
        "Bid: merchant {} bid {} on {}.",
        created.merchant_code.as_deref().unwrap_or("?"),
        created.total_amount.unwrap_or(0),
        created.quotation_code
      );
      ctx_data.write().created_bid = Some(created);
      Ok(StepControl::Continue)
    })
  });

  flows.register(p);
  info!("Bid flow registered.");
}
