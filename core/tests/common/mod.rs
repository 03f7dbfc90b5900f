// tests/common/mod.rs
#![allow(dead_code)]

use greenhouse_flow::{FlowError, FlowState, StepControl};
use once_cell::sync::Lazy;
use std::future::Future;
use std::pin::Pin;
use tracing::Level;

pub type StepFuture = Pin<Box<dyn Future<Output = Result<StepControl, TestError>> + Send>>;
pub type CompensationFuture = Pin<Box<dyn Future<Output = Result<(), TestError>> + Send>>;

/// Stand-in for a business context: a ledger of reservations that steps append
/// to and compensations remove from.
#[derive(Clone, Debug, Default)]
pub struct LedgerContext {
  pub reserved: Vec<String>,
  pub released: Vec<String>,
  pub steps_executed: Vec<String>,
  pub stop_at: Option<String>,
}

#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum TestError {
  #[error("workflow error: {0}")]
  Flow(String),

  #[error("step failed: {0}")]
  Step(String),
}

impl From<FlowError> for TestError {
  fn from(fe: FlowError) -> Self {
    TestError::Flow(format!("{:?}", fe))
  }
}

/// Handler that records the step and reserves `item`, stopping if the context says so.
pub fn reserve_handler(
  step_name: &'static str,
  item: &'static str,
) -> impl Fn(FlowState<LedgerContext>) -> StepFuture + Send + Sync + 'static {
  move |state: FlowState<LedgerContext>| -> StepFuture {
    Box::pin(async move {
      let mut guard = state.write();
      guard.steps_executed.push(step_name.to_string());
      guard.reserved.push(item.to_string());
      if guard.stop_at.as_deref() == Some(step_name) {
        return Ok(StepControl::Stop);
      }
      Ok(StepControl::Continue)
    })
  }
}

pub fn failing_handler(
  step_name: &'static str,
  message: &'static str,
) -> impl Fn(FlowState<LedgerContext>) -> StepFuture + Send + Sync + 'static {
  move |state: FlowState<LedgerContext>| -> StepFuture {
    Box::pin(async move {
      state.write().steps_executed.push(step_name.to_string());
      Err(TestError::Step(message.to_string()))
    })
  }
}

/// Compensation that releases `item`.
pub fn release_compensation(
  item: &'static str,
) -> impl Fn(FlowState<LedgerContext>) -> CompensationFuture + Send + Sync + 'static {
  move |state: FlowState<LedgerContext>| -> CompensationFuture {
    Box::pin(async move {
      let mut guard = state.write();
      guard.reserved.retain(|r| r != item);
      guard.released.push(item.to_string());
      Ok(())
    })
  }
}

static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  tracing_subscriber::fmt()
    .with_max_level(Level::DEBUG)
    .with_test_writer()
    .try_init()
    .ok();
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}
