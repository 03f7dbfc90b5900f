// greenhouse_storefront/src/services/quotation_service.rs

//! Every read and write of the quotation lifecycle goes through
//! [`QuotationService`]: buyer requests, merchant bids, the buyer's merchant
//! selection and the admin/close status moves.

use std::collections::HashSet;

use chrono::Utc;
use greenhouse_flow::FlowState;
use serde::Serialize;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::errors::{AppError, Result};
use crate::flows::contexts::{BidCtxData, QuotationRequestCtxData, SelectionCtxData};
use crate::models::{Lifecycle, Order, Quotation, QuotationItem, QuotationStatus, QuotationWithBids};
use crate::services::codes::{expect_code, CodePrefix};
use crate::services::merchant_service::{current_merchant, require_approved};
use crate::services::split::{build_split_plan, Selection};
use crate::state::AppState;
use crate::store::{QuotationFilter, SelectionCommit};

/// A buyer's request with the number of bids it has received.
#[derive(Debug, Clone, Serialize)]
pub struct RequestSummary {
  #[serde(flatten)]
  pub request: Quotation,
  pub bid_count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct SelectionOutcome {
  pub orders: Vec<Order>,
  /// `true` when the selection had already been placed and nothing was written.
  pub replayed: bool,
}

/// Pending requests the merchant has not answered yet, by code.
pub fn available_requests(pending_requests: Vec<Quotation>, own_bids: &[Quotation]) -> Vec<Quotation> {
  let answered: HashSet<&str> = own_bids.iter().map(|b| b.quotation_code.as_str()).collect();
  pending_requests
    .into_iter()
    .filter(|r| r.is_user_request && !answered.contains(r.quotation_code.as_str()))
    .collect()
}

#[derive(Clone)]
pub struct QuotationService {
  app_state: AppState,
}

impl QuotationService {
  pub fn new(app_state: AppState) -> Self {
    Self { app_state }
  }

  async fn load_request(&self, code: &str) -> Result<Quotation> {
    expect_code(code, CodePrefix::Quotation)?;
    self
      .app_state
      .store
      .get_request(code)
      .await?
      .ok_or_else(|| AppError::NotFound(format!("Quotation {} not found.", code)))
  }

  async fn transition(&self, quotation: &Quotation, next: QuotationStatus) -> Result<Quotation> {
    let next = quotation.status.transition(next)?;
    let updated = self
      .app_state
      .store
      .update_quotation_status(quotation.id, quotation.status, next)
      .await?;
    info!(
      quotation_code = %quotation.quotation_code,
      from = quotation.status.as_str(),
      to = next.as_str(),
      "Quotation status changed."
    );
    Ok(updated)
  }

  // --- buyer ---

  /// Creates a request from the buyer's cart, or from `custom_items` when given.
  #[instrument(skip(self, custom_items))]
  pub async fn create_request(&self, user_id: Uuid, custom_items: Option<Vec<QuotationItem>>) -> Result<Quotation> {
    let state = FlowState::new(QuotationRequestCtxData::new(self.app_state.clone(), user_id, custom_items));
    self.app_state.flows.run(state.clone()).await?;
    let created = state.read().created.clone();
    created.ok_or_else(|| AppError::Internal("quotation request flow produced no row".to_string()))
  }

  /// The request and its bids. Only the requester may read it.
  pub async fn get_quotation(&self, user_id: Uuid, code: &str) -> Result<QuotationWithBids> {
    let request = self.load_request(code).await?;
    if request.user_id != user_id {
      return Err(AppError::Forbidden("This quotation belongs to another account.".to_string()));
    }
    let bids = self.list_bids_for(code).await?;
    Ok(QuotationWithBids { request, bids })
  }

  pub async fn list_bids_for(&self, code: &str) -> Result<Vec<Quotation>> {
    Ok(self.app_state.store.list_bids(code).await?)
  }

  pub async fn list_requests(&self, user_id: Uuid, status: Option<QuotationStatus>) -> Result<Vec<RequestSummary>> {
    let store = &self.app_state.store;
    let requests = store
      .list_quotations(&QuotationFilter {
        user_id: Some(user_id),
        is_user_request: Some(true),
        status,
        ..Default::default()
      })
      .await?;
    let bids = store
      .list_quotations(&QuotationFilter {
        user_id: Some(user_id),
        is_user_request: Some(false),
        ..Default::default()
      })
      .await?;

    Ok(
      requests
        .into_iter()
        .map(|request| {
          let bid_count = bids
            .iter()
            .filter(|b| b.quotation_code == request.quotation_code && b.status != QuotationStatus::Closed)
            .count();
          RequestSummary { request, bid_count }
        })
        .collect(),
    )
  }

  #[instrument(skip(self))]
  pub async fn close_request(&self, user_id: Uuid, code: &str) -> Result<Quotation> {
    let request = self.load_request(code).await?;
    if request.user_id != user_id {
      return Err(AppError::Forbidden("You can only close your own quotations.".to_string()));
    }
    self.transition(&request, QuotationStatus::Closed).await
  }

  #[instrument(skip(self, selection))]
  pub async fn select_merchants(&self, buyer_id: Uuid, code: &str, selection: Selection) -> Result<SelectionOutcome> {
    let state = FlowState::new(SelectionCtxData::new(
      self.app_state.clone(),
      buyer_id,
      code.to_string(),
      selection,
    ));
    self.app_state.flows.run(state.clone()).await?;
    let guard = state.read();
    Ok(SelectionOutcome {
      orders: guard.orders.clone(),
      replayed: guard.replayed,
    })
  }

  /// Builds the per-merchant orders for `selection` and commits them together
  /// with every status change in one store transaction.
  pub async fn create_orders_from_selection(
    &self,
    request: &Quotation,
    bids: &[Quotation],
    selection: &Selection,
  ) -> Result<Vec<Order>> {
    let plan = build_split_plan(request, bids, selection)?;
    let commit = SelectionCommit {
      request_id: request.id,
      quotation_code: request.quotation_code.clone(),
      expected_status: request.status,
      selected_merchants: plan.selected_merchants,
      orders: plan.orders,
      confirmed_at: Utc::now(),
    };
    Ok(self.app_state.store.commit_selection(&commit).await?)
  }

  // --- merchant ---

  /// Pending requests this merchant has neither bid on nor declined.
  pub async fn available_for_merchant(&self, user_id: Uuid) -> Result<Vec<Quotation>> {
    let merchant = require_approved(&self.app_state, user_id).await?;
    let store = &self.app_state.store;
    let pending = store
      .list_quotations(&QuotationFilter {
        is_user_request: Some(true),
        status: Some(QuotationStatus::Pending),
        ..Default::default()
      })
      .await?;
    let own_bids = store
      .list_quotations(&QuotationFilter {
        is_user_request: Some(false),
        merchant_code: Some(merchant.merchant_code),
        ..Default::default()
      })
      .await?;
    Ok(available_requests(pending, &own_bids))
  }

  pub async fn list_merchant_bids(&self, user_id: Uuid, status: Option<QuotationStatus>) -> Result<Vec<Quotation>> {
    let merchant = current_merchant(&self.app_state, user_id).await?;
    Ok(
      self
        .app_state
        .store
        .list_quotations(&QuotationFilter {
          is_user_request: Some(false),
          merchant_code: Some(merchant.merchant_code),
          status,
          ..Default::default()
        })
        .await?,
    )
  }

  #[instrument(skip(self, unit_prices))]
  pub async fn submit_bid(
    &self,
    merchant_user_id: Uuid,
    code: &str,
    unit_prices: Vec<Option<i64>>,
    estimated_delivery_days: Option<i32>,
  ) -> Result<Quotation> {
    if estimated_delivery_days.is_some_and(|d| d < 0) {
      return Err(AppError::Validation("Delivery days cannot be negative.".to_string()));
    }
    if unit_prices.iter().flatten().any(|p| *p < 0) {
      return Err(AppError::Validation("Unit prices cannot be negative.".to_string()));
    }
    let state = FlowState::new(BidCtxData::new(
      self.app_state.clone(),
      merchant_user_id,
      code.to_string(),
      unit_prices,
      estimated_delivery_days,
    ));
    self.app_state.flows.run(state.clone()).await?;
    let created = state.read().created_bid.clone();
    created.ok_or_else(|| AppError::Internal("bid flow produced no row".to_string()))
  }

  /// Closes the merchant's bid on `code`. Without a bid the request is declined
  /// by recording a closed bid row, which drops it from the merchant's queue.
  #[instrument(skip(self))]
  pub async fn close_for_merchant(&self, user_id: Uuid, code: &str) -> Result<Quotation> {
    let merchant = current_merchant(&self.app_state, user_id).await?;
    let request = self.load_request(code).await?;
    let store = &self.app_state.store;

    let own_bid = store
      .list_bids(code)
      .await?
      .into_iter()
      .find(|b| b.merchant_code.as_deref() == Some(merchant.merchant_code.as_str()));
    if let Some(bid) = own_bid {
      return self.transition(&bid, QuotationStatus::Closed).await;
    }

    if request.status != QuotationStatus::Pending {
      return Err(AppError::Conflict(format!(
        "Quotation {} is {} and cannot be declined.",
        code,
        request.status.as_str()
      )));
    }
    warn!(merchant_code = %merchant.merchant_code, "Merchant declined quotation without bidding.");
    let declined = Quotation::new_bid(
      &request,
      merchant.merchant_code,
      Vec::new(),
      None,
      None,
      QuotationStatus::Closed,
    );
    Ok(store.insert_quotation(&declined).await?)
  }

  // --- admin ---

  pub async fn list_all(&self, status: Option<QuotationStatus>, requests_only: bool) -> Result<Vec<Quotation>> {
    Ok(
      self
        .app_state
        .store
        .list_quotations(&QuotationFilter {
          is_user_request: requests_only.then_some(true),
          status,
          ..Default::default()
        })
        .await?,
    )
  }

  /// Admin moderation of a request: `waiting_for_admin`, `approved` or `rejected`.
  #[instrument(skip(self))]
  pub async fn admin_set_status(&self, code: &str, next: QuotationStatus) -> Result<Quotation> {
    if !matches!(
      next,
      QuotationStatus::WaitingForAdmin | QuotationStatus::Approved | QuotationStatus::Rejected
    ) {
      return Err(AppError::Validation(format!(
        "Admins cannot set a quotation to {}.",
        next.as_str()
      )));
    }
    let request = self.load_request(code).await?;
    self.transition(&request, next).await
  }
}
