//! # keyaction - Hold-Duration Input Bindings for Game Actions
//!
//! Maps keyboard and gamepad codes, held for a configurable time, to idles and
//! actions in a host game. Bindings carry a priority and an optional paired
//! target search; on every evaluation at most one binding wins.
//!
//! ## Architecture
//!
//! - [`action`] - Action records and their value types
//! - [`registry`] - Priority-ordered, deduplicated action store
//! - [`input`] - Held-key tracking with duplicate-trigger filtering
//! - [`engine`] - Resolution algorithm and host collaborator traits
//! - [`session`] - Single-owner tokio worker around one context
//! - [`config`] - Settings, form table and JSON action files (feature `config`)
//! - [`error`] - Centralized error types and handling

// Core modules
pub mod action;
pub mod error;
pub mod registry;

// Input and evaluation
pub mod engine;
pub mod input;

// Host integration
#[cfg(feature = "config")]
pub mod config;
pub mod session;

// Re-export commonly used types for convenience
pub use error::{KeyActionError, Result};

// Public API surface for external usage
pub use action::{Action, FormKind, FormRef, InputCode, PairedSearch, SearchMode};
pub use engine::{ActionContext, ActionExecutor, EvaluationOutcome, TargetResolver};
pub use registry::ActionRegistry;

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
