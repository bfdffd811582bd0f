//! climada-kit Workflow
//!
//! Types describing what the runner executes and what it records:
//!
//! - [`WorkflowSpec`]: one script in the run, fixed before the run starts
//! - [`WorkflowResult`]: the immutable outcome of attempting one spec
//! - [`FailureReason`]: why a result is not [`WorkflowStatus::Passed`]
//!
//! The [`catalog`] module holds the built-in list of kit workflows and
//! directory discovery.

pub mod catalog;
mod error;
mod reason;
mod result;
mod spec;

pub use error::WorkflowError;
pub use reason::FailureReason;
pub use result::{WorkflowResult, WorkflowStatus};
pub use spec::WorkflowSpec;
