//! Contracts for the host-side collaborators of the evaluation engine.
//!
//! The engine never touches the game world. Locating a paired target and
//! performing the chosen form are delegated to implementations of
//! [`TargetResolver`] and [`ActionExecutor`].

use crate::action::{Action, AssociatedIdle, FormKind, FormRef, KeywordRef, SearchMode};
use crate::error::Result;

/// Opaque reference to an object in the game world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TargetRef(pub u32);

/// How a candidate's keywords are matched against the required ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "config", derive(serde::Deserialize))]
#[cfg_attr(feature = "config", serde(rename_all = "lowercase"))]
pub enum KeywordPolicy {
    /// Candidate must carry every required keyword.
    #[default]
    All,
    /// Candidate must carry at least one required keyword.
    Any,
}

/// Parameters for a paired-target search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetQuery<'a> {
    pub mode: SearchMode,
    pub distance: f32,
    pub keywords: &'a [KeywordRef],
    pub policy: KeywordPolicy,
}

impl<'a> TargetQuery<'a> {
    /// Query for `action`, or `None` when its search is disabled.
    pub fn for_action(action: &'a Action, policy: KeywordPolicy) -> Option<Self> {
        let distance = action.paired_search.distance()?;
        Some(Self {
            mode: action.paired_search.mode(),
            distance,
            keywords: &action.paired_target_keywords,
            policy,
        })
    }

    /// Whether a candidate carrying `candidate_keywords` passes the keyword filter.
    /// An empty requirement accepts every candidate.
    pub fn accepts(&self, candidate_keywords: &[KeywordRef]) -> bool {
        if self.keywords.is_empty() {
            return true;
        }
        match self.policy {
            KeywordPolicy::All => self
                .keywords
                .iter()
                .all(|required| candidate_keywords.contains(required)),
            KeywordPolicy::Any => self
                .keywords
                .iter()
                .any(|required| candidate_keywords.contains(required)),
        }
    }
}

/// Result of the paired-target step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PairedTarget {
    /// The action has no search configured.
    NotSearched,
    /// A search ran and nothing qualified.
    NotFound,
    Found(TargetRef),
}

impl PairedTarget {
    pub fn target(&self) -> Option<TargetRef> {
        match self {
            Self::Found(target) => Some(*target),
            _ => None,
        }
    }
}

/// Everything the executor needs to perform a fired action.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExecutionRequest {
    pub form: FormRef,
    /// Set only when `form` is an Action-type form.
    pub assoc_idle: Option<AssociatedIdle>,
    pub target: PairedTarget,
}

impl ExecutionRequest {
    pub fn new(form: FormRef, assoc_idle: AssociatedIdle, target: PairedTarget) -> Self {
        let assoc_idle = (form.kind == FormKind::Action).then_some(assoc_idle);
        Self {
            form,
            assoc_idle,
            target,
        }
    }
}

/// Spatial search against the game world.
pub trait TargetResolver {
    /// Return at most one target satisfying `query`.
    fn resolve(&mut self, query: &TargetQuery<'_>) -> Option<TargetRef>;
}

/// Performs idles and actions in the game.
///
/// Completion is reported out of band, through
/// [`ActionContext::on_action_completed`](crate::engine::ActionContext::on_action_completed).
pub trait ActionExecutor {
    fn perform(&mut self, request: &ExecutionRequest) -> Result<()>;
}

/// Resolver for hosts without spatial search; every query finds nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoTargets;

impl TargetResolver for NoTargets {
    fn resolve(&mut self, _query: &TargetQuery<'_>) -> Option<TargetRef> {
        None
    }
}
