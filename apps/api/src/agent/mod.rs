//! Agent action catalogue and dispatcher.
//!
//! The assistant (and the `/api/agent/actions` route) names an action by
//! string; the name is resolved once into `ActionKind`, the payload into a
//! typed `AgentAction`, and execution is an exhaustive match. Every dispatch
//! leaves one row in the audit log.

pub mod actions;
pub mod dispatcher;

pub use actions::{supported_actions, ActionKind, ActionSpec, AgentAction};
pub use dispatcher::dispatch;
