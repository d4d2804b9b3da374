//! Application state and event handling.
//!
//! The [`Controller`] is the single owner of the campaign. Views read from
//! it and call its methods in response to user events; rewrite completions
//! arrive through [`crate::rewrite::RewriteDispatcher`] and are applied with
//! [`Controller::complete_rewrite`].

pub mod action;
pub mod controller;

pub use action::{ActionKind, LastAction, FEEDBACK_WINDOW};
pub use controller::{Controller, LoadOutcome, RewriteApplied, TargetField, View};
