//! Magic Link - shareable advocacy email campaigns.
//!
//! A campaign (title, default subject/body, list of MPs to write to) travels
//! entirely inside a share link's URL fragment. Whoever opens the link gets
//! one `mailto:` action per target that opens their own mail client with
//! everything filled in.
//!
//! ## Architecture
//!
//! ```text
//! page address → codec::decode → app::Controller → mail::build_mailto → mailto: URI
//!                                      │
//!                                      └─ codec::share_url → page address#token
//! ```
//!
//! Body text can be rewritten in a chosen tone by an external collaborator
//! (see [`rewrite`]); everything else is synchronous and pure.

pub mod app;
pub mod codec;
pub mod config;
pub mod mail;
pub mod model;
pub mod rewrite;
pub mod telemetry;
pub mod util;

// Re-export commonly used types
pub use app::{ActionKind, Controller, LoadOutcome, RewriteApplied, TargetField, View};
pub use codec::{decode, encode, share_url, DecodeError, Fragment, LinkError};
pub use config::Config;
pub use mail::{build_mailto, MailAction};
pub use model::{seed_campaign, Campaign, Target, TargetId};
pub use rewrite::{
    GeminiRewriter, RewriteCompletion, RewriteDispatcher, RewriteError, RewriteRequest, Rewriter,
    Tone,
};
