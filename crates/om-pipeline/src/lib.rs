//! The orchestration pipeline: a fixed directed sequence of stages threaded
//! through an immutable state value.

mod orchestrator;
mod state;

pub use orchestrator::{Orchestrator, PipelineAbort};
pub use state::{PipelineInput, PipelineState, Stage};
