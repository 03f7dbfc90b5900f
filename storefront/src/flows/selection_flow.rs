// greenhouse_storefront/src/flows/selection_flow.rs

use crate::errors::AppError;
use crate::flows::contexts::SelectionCtxData;
use crate::models::{Lifecycle, QuotationStatus};
use crate::services::codes::{expect_code, CodePrefix};
use crate::services::split;
use crate::store::OrderFilter;
use greenhouse_flow::{FlowState, Flows, StepControl, Workflow};
use tracing::{info, warn};

pub fn register_selection_flow(flows: &Flows<AppError>) {
  let mut p = Workflow::<SelectionCtxData, AppError>::new(&[
    ("load_request_and_bids", false, None),
    ("validate_selection", false, None),
    ("commit_selection", false, None),
  ]);

  p.on_root("load_request_and_bids", |ctx_data: FlowState<SelectionCtxData>| {
    Box::pin(async move {
      let (buyer_id, code, store) = {
        let guard = ctx_data.read();
        (guard.buyer_id, guard.quotation_code.clone(), guard.app_state.store.clone())
      };
      expect_code(&code, CodePrefix::Quotation)?;

      let request = store
        .get_request(&code)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Quotation {} not found.", code)))?;
      if request.user_id != buyer_id {
        warn!("Selection: user {} does not own {}.", buyer_id, code);
        return Err(AppError::Forbidden("You can only select merchants for your own quotations.".to_string()));
      }

      if request.status == QuotationStatus::OrderPlaced {
        let filter = OrderFilter {
          quotation_code: Some(code.clone()),
          ..Default::default()
        };
        let orders = store.list_orders(&filter).await?;
        info!(
          "Selection: {} already has {} order(s); returning them unchanged.",
          code,
          orders.len()
        );
        let mut guard = ctx_data.write();
        guard.request = Some(request);
        guard.orders = orders;
        guard.replayed = true;
        return Ok(StepControl::Stop);
      }

      let bids = store.list_bids(&code).await?;
      let mut guard = ctx_data.write();
      guard.request = Some(request);
      guard.bids = bids;
      Ok(StepControl::Continue)
    })
  });

  p.on_root("validate_selection", |ctx_data: FlowState<SelectionCtxData>| {
    Box::pin(async move {
      let guard = ctx_data.read();
      let request = guard
        .request
        .as_ref()
        .ok_or_else(|| AppError::Internal("request not loaded before validation".to_string()))?;
      request.status.transition(QuotationStatus::UserConfirmed)?;
      split::validate_selection(request, &guard.bids, &guard.selection)?;
      Ok::<_, AppError>(StepControl::Continue)
    })
  });

  p.on_root("commit_selection", |ctx_data: FlowState<SelectionCtxData>| {
    Box::pin(async move {
      let (request, bids, selection, app_state) = {
        let guard = ctx_data.read();
        let request = guard
          .request
          .clone()
          .ok_or_else(|| AppError::Internal("request not loaded before commit".to_string()))?;
        (request, guard.bids.clone(), guard.selection.clone(), guard.app_state.clone())
      };

      let orders = app_state
        .quotations()
        .create_orders_from_selection(&request, &bids, &selection)
        .await?;
      info!(
        "Selection: {} split into {} order(s).",
        request.quotation_code,
        orders.len()
      );
      ctx_data.write().orders = orders;
      Ok::<_, AppError>(StepControl::Continue)
    })
  });

  flows.register(p);
  info!("Selection flow registered.");
}
