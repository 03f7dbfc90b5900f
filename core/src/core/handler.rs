// greenhouse_flow/src/core/handler.rs

//! Boxed handler types stored by a `Workflow`.

use crate::core::control::StepControl;
use crate::core::state::FlowState;
use std::future::Future;
use std::pin::Pin;

pub type BoxFuture<T> = Pin<Box<dyn Future<Output = T> + Send>>;

/// A step handler: takes a clone of the run's `FlowState` and resolves to a
/// `StepControl` or the workflow's error type.
///
/// Handlers read what they need under a short lock, drop the guard, do their I/O,
/// then take a write lock to store results.
pub type Handler<TData, Err> = Box<dyn Fn(FlowState<TData>) -> BoxFuture<Result<StepControl, Err>> + Send + Sync>;

/// Undo action for a step that completed before a later step failed.
pub type Compensator<TData, Err> = Box<dyn Fn(FlowState<TData>) -> BoxFuture<Result<(), Err>> + Send + Sync>;
