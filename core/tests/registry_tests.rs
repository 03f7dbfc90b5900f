// tests/registry_tests.rs
mod common;

use common::*;
use greenhouse_flow::{FlowError, FlowOutcome, FlowState, Flows, StepControl, Workflow};
use serial_test::serial;

#[derive(Clone, Debug, Default)]
struct OtherContext {
  touched: bool,
}

fn ledger_workflow() -> Workflow<LedgerContext, TestError> {
  let mut wf = Workflow::<LedgerContext, TestError>::new(&[("reserve", false, None)]);
  wf.on_root("reserve", reserve_handler("reserve", "stock"));
  wf
}

#[tokio::test]
#[serial]
async fn dispatches_by_context_type() {
  setup_tracing();
  let flows = Flows::<TestError>::new();
  flows.register(ledger_workflow());

  let mut other = Workflow::<OtherContext, TestError>::new(&[("touch", false, None)]);
  other.on_root("touch", |state: FlowState<OtherContext>| {
    Box::pin(async move {
      state.write().touched = true;
      Ok::<_, TestError>(StepControl::Continue)
    })
  });
  flows.register(other);

  let ledger = FlowState::new(LedgerContext::default());
  let other_state = FlowState::new(OtherContext::default());

  assert_eq!(flows.run(ledger.clone()).await.unwrap(), FlowOutcome::Completed);
  assert_eq!(flows.run(other_state.clone()).await.unwrap(), FlowOutcome::Completed);

  assert_eq!(ledger.read().reserved, vec!["stock"]);
  assert!(other_state.read().touched);
}

#[tokio::test]
#[serial]
async fn unregistered_context_type_is_an_error() {
  setup_tracing();
  let flows = Flows::<TestError>::new();
  assert!(!flows.is_registered::<OtherContext>());

  let err = flows.run(FlowState::new(OtherContext::default())).await.unwrap_err();
  match err {
    TestError::Flow(msg) => assert!(msg.contains("NotRegistered"), "unexpected message: {}", msg),
    other => panic!("expected a flow error, got {:?}", other),
  }
}

#[tokio::test]
#[serial]
async fn later_registration_replaces_earlier() {
  setup_tracing();
  let flows = Flows::<TestError>::new();
  flows.register(ledger_workflow());

  let mut replacement = Workflow::<LedgerContext, TestError>::new(&[("reserve", false, None)]);
  replacement.on_root("reserve", reserve_handler("reserve", "replacement"));
  flows.register(replacement);

  let state = FlowState::new(LedgerContext::default());
  flows.run(state.clone()).await.unwrap();
  assert_eq!(state.read().reserved, vec!["replacement"]);
}

#[tokio::test]
#[serial]
async fn handler_errors_surface_through_app_error() {
  setup_tracing();
  let flows = Flows::<TestError>::new();
  let mut wf = Workflow::<LedgerContext, TestError>::new(&[("reserve", false, None)]);
  wf.on_root("reserve", failing_handler("reserve", "nope"));
  flows.register(wf);

  let err = flows.run(FlowState::new(LedgerContext::default())).await.unwrap_err();
  assert_eq!(err, TestError::Step("nope".to_string()));
}

#[tokio::test]
#[serial]
async fn default_registry_uses_flow_error() {
  setup_tracing();
  let flows: Flows = Flows::default();
  let mut wf = Workflow::<OtherContext, FlowError>::new(&[("touch", false, None)]);
  wf.on_root("touch", |state: FlowState<OtherContext>| {
    Box::pin(async move {
      state.write().touched = true;
      Ok::<_, FlowError>(StepControl::Continue)
    })
  });
  flows.register(wf);

  assert!(flows.is_registered::<OtherContext>());
  let state = FlowState::new(OtherContext::default());
  flows.run(state.clone()).await.unwrap();
  assert!(state.read().touched);
}
