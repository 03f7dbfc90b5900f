// tests/state_tests.rs
mod common;

use common::*;
use greenhouse_flow::FlowState;

#[test]
fn clones_share_the_same_data() {
  let state = FlowState::new(LedgerContext::default());
  let handle = state.clone();
  handle.write().reserved.push("stock".to_string());
  assert_eq!(state.read().reserved, vec!["stock"]);
}

#[test]
fn view_narrows_the_read_guard() {
  let state = FlowState::new(LedgerContext {
    reserved: vec!["a".to_string(), "b".to_string()],
    ..Default::default()
  });
  let reserved = state.view(|c| &c.reserved);
  assert_eq!(reserved.len(), 2);
}

#[test]
fn snapshot_is_detached_from_the_state() {
  let state = FlowState::new(LedgerContext::default());
  let snap = state.snapshot();
  state.write().reserved.push("later".to_string());
  assert!(snap.reserved.is_empty());
  assert_eq!(state.read().reserved.len(), 1);
}

#[test]
fn default_state_wraps_default_data() {
  let state: FlowState<LedgerContext> = FlowState::default();
  assert!(state.read().steps_executed.is_empty());
  assert!(state.read().stop_at.is_none());
}
