pub mod control;
pub mod handler;
pub mod state;
pub mod step;

pub use control::{FlowOutcome, StepControl};
pub use handler::{Compensator, Handler};
pub use state::FlowState;
pub use step::StepDef;
