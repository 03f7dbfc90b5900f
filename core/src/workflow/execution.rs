// greenhouse_flow/src/workflow/execution.rs

//! `Workflow::run()`: executes steps in order and compensates completed steps on
//! failure.

use crate::core::control::{FlowOutcome, StepControl};
use crate::core::handler::Handler;
use crate::core::state::FlowState;
use crate::error::FlowError;
use crate::workflow::definition::Workflow;
use tracing::{event, instrument, span, Level};

enum PhaseResult<Err> {
  Continue,
  Stopped,
  Failed(Err),
}

impl<TData, Err> Workflow<TData, Err>
where
  TData: 'static + Send + Sync,
  Err: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  async fn run_phase(
    &self,
    phase: &'static str,
    handlers: Option<&Vec<Handler<TData, Err>>>,
    state: &FlowState<TData>,
  ) -> PhaseResult<Err> {
    let Some(handlers) = handlers else {
      return PhaseResult::Continue;
    };
    for (handler_idx, handler_fn) in handlers.iter().enumerate() {
      event!(Level::TRACE, phase, handler_index = handler_idx, "Executing handler.");
      match handler_fn(state.clone()).await {
        Ok(StepControl::Continue) => {}
        Ok(StepControl::Stop) => {
          event!(Level::INFO, phase, "Workflow stopped by a handler.");
          return PhaseResult::Stopped;
        }
        Err(e) => {
          event!(Level::ERROR, phase, error = %e, "Handler failed.");
          return PhaseResult::Failed(e);
        }
      }
    }
    PhaseResult::Continue
  }

  /// Runs the compensations of `completed` steps, newest first.
  ///
  /// A failing compensation is logged and does not stop the others.
  async fn compensate(&self, completed: &[&str], state: &FlowState<TData>) {
    for step_name in completed.iter().rev() {
      let Some(compensator) = self.compensations.get(*step_name) else {
        continue;
      };
      event!(Level::WARN, step_name, "Compensating completed step.");
      if let Err(e) = compensator(state.clone()).await {
        event!(Level::ERROR, step_name, error = %e, "Compensation failed; state may need manual repair.");
      }
    }
  }

  /// Executes the workflow against `state`.
  ///
  /// On a handler error every previously completed step is compensated and the
  /// handler's error is returned. A `Stop` ends the run without compensation.
  #[instrument(
    name = "Workflow::run",
    skip_all,
    fields(
      context_type = %std::any::type_name::<TData>(),
      num_steps = self.steps.len(),
    ),
    err(Display)
  )]
  pub async fn run(&self, state: FlowState<TData>) -> Result<FlowOutcome, Err> {
    event!(Level::DEBUG, "Workflow execution starting.");
    let mut completed: Vec<&str> = Vec::with_capacity(self.steps.len());

    for (step_idx, step_def) in self.steps.iter().enumerate() {
      let step_name = step_def.name.as_str();
      let step_span = span!(
        Level::INFO,
        "workflow_step",
        step_name,
        step_index = step_idx,
        optional = step_def.optional
      );
      // Entered only around synchronous sections; the span is not held across awaits.
      {
        let _guard = step_span.enter();
        event!(Level::DEBUG, "Processing step.");
      }

      if let Some(skip_if) = &step_def.skip_if {
        if skip_if(state.clone()) {
          let _guard = step_span.enter();
          event!(Level::INFO, "Step skipped by its skip condition.");
          continue;
        }
      }

      let has_handlers = [&self.before, &self.on, &self.after]
        .iter()
        .any(|map| map.get(step_name).is_some_and(|v| !v.is_empty()));

      if !has_handlers {
        if step_def.optional {
          continue;
        }
        {
          let _guard = step_span.enter();
          event!(Level::ERROR, "Non-optional step has no handlers.");
        }
        self.compensate(&completed, &state).await;
        return Err(Err::from(FlowError::HandlerMissing {
          step_name: step_def.name.clone(),
        }));
      }

      for (phase, handlers) in [
        ("before", self.before.get(step_name)),
        ("on", self.on.get(step_name)),
        ("after", self.after.get(step_name)),
      ] {
        match self.run_phase(phase, handlers, &state).await {
          PhaseResult::Continue => {}
          PhaseResult::Stopped => return Ok(FlowOutcome::Stopped),
          PhaseResult::Failed(e) => {
            self.compensate(&completed, &state).await;
            return Err(e);
          }
        }
      }

      completed.push(step_name);
    }

    event!(Level::DEBUG, "Workflow execution completed.");
    Ok(FlowOutcome::Completed)
  }
}
