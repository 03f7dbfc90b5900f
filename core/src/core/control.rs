// greenhouse_flow/src/core/control.rs

//! Flow-control signals returned by handlers, and the outcome of a whole run.

/// Returned by a step handler to tell the runner what to do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepControl {
  /// Run the remaining handlers of this step, then the following steps.
  Continue,
  /// Halt the run here. Nothing further executes and nothing is compensated.
  Stop,
}

/// Outcome of a run that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowOutcome {
  /// Every non-skipped step ran.
  Completed,
  /// A handler returned `StepControl::Stop`.
  Stopped,
}
