//! Last-action feedback.
//!
//! A single record of the most recent user action replaces per-button
//! "copied!" flags. A view shows feedback for an action while it is both the
//! latest action and younger than [`FEEDBACK_WINDOW`].

use std::time::{Duration, SystemTime};

use crate::model::TargetId;

/// How long feedback for an action stays visible.
pub const FEEDBACK_WINDOW: Duration = Duration::from_secs(2);

/// Kind of action that produced feedback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    /// The share link was copied
    CopyLink,
    /// A target's mail action was opened
    OpenMail,
    /// A rewrite result was applied to a target's body
    Rewrite,
}

/// The most recent action and when it happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LastAction {
    /// `None` for campaign-wide actions such as copying the share link
    pub target_id: Option<TargetId>,
    pub kind: ActionKind,
    pub at: SystemTime,
}

impl LastAction {
    pub fn new(kind: ActionKind, target_id: Option<TargetId>, at: SystemTime) -> Self {
        Self { target_id, kind, at }
    }

    /// Whether this record should still show feedback for `kind` on
    /// `target_id` at time `now`.
    pub fn is_active(&self, kind: ActionKind, target_id: Option<&TargetId>, now: SystemTime) -> bool {
        if self.kind != kind || self.target_id.as_ref() != target_id {
            return false;
        }

        // A clock that went backwards counts as still fresh.
        let age = now.duration_since(self.at).unwrap_or_default();
        age < FEEDBACK_WINDOW
    }
}
