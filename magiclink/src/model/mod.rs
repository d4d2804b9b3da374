//! Campaign data model.
//!
//! The campaign is the single source of truth: a title, default
//! subject/body and an ordered list of targets.

pub mod campaign;
pub mod seed;

pub use campaign::{Campaign, Target, TargetId};
pub use seed::seed_campaign;
