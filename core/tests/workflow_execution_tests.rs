// tests/workflow_execution_tests.rs
mod common;

use common::*;
use greenhouse_flow::{FlowOutcome, FlowState, SkipCondition, StepControl, Workflow};
use serial_test::serial;
use std::sync::Arc;

fn three_step_workflow() -> Workflow<LedgerContext, TestError> {
  let mut wf = Workflow::<LedgerContext, TestError>::new(&[
    ("reserve_stock", false, None),
    ("reserve_slot", false, None),
    ("confirm", false, None),
  ]);
  wf.on_root("reserve_stock", reserve_handler("reserve_stock", "stock"));
  wf.on_root("reserve_slot", reserve_handler("reserve_slot", "slot"));
  wf.on_root("confirm", reserve_handler("confirm", "confirmation"));
  wf
}

#[tokio::test]
#[serial]
async fn steps_run_in_declared_order() {
  setup_tracing();
  let wf = three_step_workflow();
  let state = FlowState::new(LedgerContext::default());

  let outcome = wf.run(state.clone()).await.unwrap();

  assert_eq!(outcome, FlowOutcome::Completed);
  let ctx = state.read();
  assert_eq!(ctx.steps_executed, vec!["reserve_stock", "reserve_slot", "confirm"]);
  assert_eq!(ctx.reserved, vec!["stock", "slot", "confirmation"]);
}

#[tokio::test]
#[serial]
async fn before_on_after_phases_run_in_order() {
  setup_tracing();
  let mut wf = Workflow::<LedgerContext, TestError>::new(&[("only", false, None)]);
  wf.after_root("only", reserve_handler("after", "a"));
  wf.on_root("only", reserve_handler("on_first", "o1"));
  wf.before_root("only", reserve_handler("before", "b"));
  wf.on_root("only", reserve_handler("on_second", "o2"));

  let state = FlowState::new(LedgerContext::default());
  wf.run(state.clone()).await.unwrap();

  assert_eq!(state.read().steps_executed, vec!["before", "on_first", "on_second", "after"]);
}

#[tokio::test]
#[serial]
async fn stop_halts_remaining_steps() {
  setup_tracing();
  let wf = three_step_workflow();
  let state = FlowState::new(LedgerContext {
    stop_at: Some("reserve_slot".to_string()),
    ..Default::default()
  });

  let outcome = wf.run(state.clone()).await.unwrap();

  assert_eq!(outcome, FlowOutcome::Stopped);
  assert_eq!(state.read().steps_executed, vec!["reserve_stock", "reserve_slot"]);
}

#[tokio::test]
#[serial]
async fn handler_error_is_returned_to_caller() {
  setup_tracing();
  let mut wf = Workflow::<LedgerContext, TestError>::new(&[("first", false, None), ("second", false, None)]);
  wf.on_root("first", failing_handler("first", "out of stock"));
  wf.on_root("second", reserve_handler("second", "never"));

  let state = FlowState::new(LedgerContext::default());
  let err = wf.run(state.clone()).await.unwrap_err();

  assert_eq!(err, TestError::Step("out of stock".to_string()));
  assert_eq!(state.read().steps_executed, vec!["first"]);
}

#[tokio::test]
#[serial]
async fn skip_condition_bypasses_step() {
  setup_tracing();
  let skip_slot: SkipCondition<LedgerContext> =
    Arc::new(|state: FlowState<LedgerContext>| state.read().reserved.contains(&"stock".to_string()));
  let mut wf = Workflow::<LedgerContext, TestError>::new(&[
    ("reserve_stock", false, None),
    ("reserve_slot", false, Some(skip_slot)),
    ("confirm", false, None),
  ]);
  wf.on_root("reserve_stock", reserve_handler("reserve_stock", "stock"));
  wf.on_root("reserve_slot", reserve_handler("reserve_slot", "slot"));
  wf.on_root("confirm", reserve_handler("confirm", "confirmation"));

  let state = FlowState::new(LedgerContext::default());
  wf.run(state.clone()).await.unwrap();

  assert_eq!(state.read().steps_executed, vec!["reserve_stock", "confirm"]);
}

#[tokio::test]
#[serial]
async fn missing_handler_on_required_step_fails() {
  setup_tracing();
  let mut wf = Workflow::<LedgerContext, TestError>::new(&[("first", false, None), ("unwired", false, None)]);
  wf.on_root("first", reserve_handler("first", "x"));

  let state = FlowState::new(LedgerContext::default());
  let err = wf.run(state).await.unwrap_err();

  match err {
    TestError::Flow(msg) => assert!(msg.contains("HandlerMissing"), "unexpected message: {}", msg),
    other => panic!("expected a flow error, got {:?}", other),
  }
}

#[tokio::test]
#[serial]
async fn optional_step_without_handler_is_skipped() {
  setup_tracing();
  let mut wf = Workflow::<LedgerContext, TestError>::new(&[("maybe", true, None), ("last", false, None)]);
  wf.on_root("last", reserve_handler("last", "x"));

  let state = FlowState::new(LedgerContext::default());
  let outcome = wf.run(state.clone()).await.unwrap();

  assert_eq!(outcome, FlowOutcome::Completed);
  assert_eq!(state.read().steps_executed, vec!["last"]);
}

#[tokio::test]
#[serial]
async fn inserted_step_runs_after_anchor() {
  setup_tracing();
  let mut wf = three_step_workflow();
  wf.insert_after_step("reserve_stock", "audit", false, None).unwrap();
  wf.on_root("audit", reserve_handler("audit", "audit_entry"));

  assert_eq!(wf.step_names(), vec!["reserve_stock", "audit", "reserve_slot", "confirm"]);

  let state = FlowState::new(LedgerContext::default());
  wf.run(state.clone()).await.unwrap();
  assert_eq!(
    state.read().steps_executed,
    vec!["reserve_stock", "audit", "reserve_slot", "confirm"]
  );
}

#[tokio::test]
#[serial]
async fn structural_edits_reject_unknown_or_duplicate_steps() {
  let mut wf = three_step_workflow();
  assert!(wf.insert_after_step("nope", "x", false, None).is_err());
  assert!(wf.insert_after_step("confirm", "reserve_slot", false, None).is_err());
  assert!(wf.remove_step("nope").is_err());
  assert!(wf.set_skip_condition("nope", None).is_err());
}

#[tokio::test]
#[serial]
async fn removed_step_no_longer_runs() {
  setup_tracing();
  let mut wf = three_step_workflow();
  wf.remove_step("reserve_slot").unwrap();

  let state = FlowState::new(LedgerContext::default());
  wf.run(state.clone()).await.unwrap();
  assert_eq!(state.read().steps_executed, vec!["reserve_stock", "confirm"]);
}

#[tokio::test]
#[serial]
async fn set_skip_condition_applies_on_next_run() {
  setup_tracing();
  let mut wf = three_step_workflow();
  wf.set_skip_condition("confirm", Some(Arc::new(|_s: FlowState<LedgerContext>| true)))
    .unwrap();

  let state = FlowState::new(LedgerContext::default());
  wf.run(state.clone()).await.unwrap();
  assert_eq!(state.read().steps_executed, vec!["reserve_stock", "reserve_slot"]);
}

#[tokio::test]
#[serial]
async fn handlers_may_await_between_lock_scopes() {
  setup_tracing();
  let mut wf = Workflow::<LedgerContext, TestError>::new(&[("slow", false, None)]);
  wf.on_root("slow", |state: FlowState<LedgerContext>| {
    Box::pin(async move {
      let already = state.read().reserved.len();
      tokio::time::sleep(std::time::Duration::from_millis(5)).await;
      state.write().reserved.push(format!("after_{}", already));
      Ok::<_, TestError>(StepControl::Continue)
    })
  });

  let state = FlowState::new(LedgerContext::default());
  wf.run(state.clone()).await.unwrap();
  assert_eq!(state.read().reserved, vec!["after_0"]);
}

#[test]
#[should_panic(expected = "not defined")]
fn registering_handler_for_unknown_step_panics() {
  let mut wf = Workflow::<LedgerContext, TestError>::new(&[("known", false, None)]);
  wf.on_root("unknown", reserve_handler("unknown", "x"));
}
