// greenhouse_flow/src/lib.rs

//! Greenhouse Flow: asynchronous, type-safe step workflows.
//!
//! A `Workflow<TData, Err>` is an ordered list of named steps run against a shared
//! `FlowState<TData>`. Each step can carry:
//!  - `before` / `on` / `after` handlers (async, returning `StepControl`),
//!  - an `optional` flag and a `skip_if` predicate,
//!  - one compensation handler, run in reverse order when a later step fails.
//!
//! Workflows are registered in a `Flows` registry keyed by their context type and
//! dispatched with `flows.run(state).await`.

pub mod core;
pub mod error;
pub mod registry;
pub mod workflow;

pub use crate::core::control::{FlowOutcome, StepControl};
pub use crate::core::handler::{Compensator, Handler};
pub use crate::core::state::FlowState;
pub use crate::core::step::{SkipCondition, StepDef};

pub use crate::workflow::definition::Workflow;

pub use crate::error::{FlowError, FlowResult};

pub use crate::registry::Flows;

/*
    Typical use:
    1. Define a context struct `MyCtx` holding the inputs and the outputs of the process.
    2. Build a `Workflow<MyCtx, MyError>` from step names.
    3. Attach handlers with `.on_root()`, `.before_root()`, `.after_root()`, and
       rollback actions with `.compensate_root()`.
    4. Register it: `flows.register(workflow)`.
    5. Run it: `flows.run(FlowState::new(ctx)).await`, then read outputs back from the state.
*/
