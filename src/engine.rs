//! Evaluation engine.
//!
//! [`ActionContext`] owns the registry and the input tracker of one session and
//! turns the current input state into at most one fired action per call to
//! [`ActionContext::evaluate_and_perform_actions`]. Target search and execution
//! go through the traits in [`collaborators`].

pub mod collaborators;
pub mod context;

pub use collaborators::{
    ActionExecutor, ExecutionRequest, KeywordPolicy, NoTargets, PairedTarget, TargetQuery,
    TargetRef, TargetResolver,
};
pub use context::{ActionContext, EvaluationOutcome, FiredAction};
