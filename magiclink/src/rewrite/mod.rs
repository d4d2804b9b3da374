//! Text-rewrite collaborator.
//!
//! Rewriting is an external capability, `(text, tone) -> text`, that may
//! fail. The [`Rewriter`] trait is the seam; [`GeminiRewriter`] is the HTTP
//! implementation and [`RewriteDispatcher`] runs requests concurrently and
//! hands completions back to the controller.
//!
//! ## Flow
//!
//! ```text
//! Controller::begin_rewrite → RewriteDispatcher → Rewriter → mpsc → Controller::complete_rewrite
//! ```

pub mod dispatcher;
pub mod gemini;

use std::fmt;
use std::future::Future;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use dispatcher::{RewriteCompletion, RewriteDispatcher, RewriteRequest};
pub use gemini::GeminiRewriter;

/// Tone requested for a rewrite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    Professional,
    Urgent,
    Empathetic,
    Concise,
}

impl Tone {
    pub const ALL: [Tone; 4] = [Tone::Professional, Tone::Urgent, Tone::Empathetic, Tone::Concise];

    pub fn as_str(&self) -> &'static str {
        match self {
            Tone::Professional => "professional",
            Tone::Urgent => "urgent",
            Tone::Empathetic => "empathetic",
            Tone::Concise => "concise",
        }
    }
}

impl fmt::Display for Tone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tone {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Tone::ALL
            .into_iter()
            .find(|tone| tone.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown tone `{}`", s))
    }
}

/// Failure of the rewrite collaborator.
#[derive(Debug, Error)]
pub enum RewriteError {
    #[error("rewrite service is not configured (API_KEY missing)")]
    NotConfigured,

    #[error("rewrite request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("rewrite service returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("rewrite response was malformed: {0}")]
    Malformed(String),
}

/// An external text transform.
pub trait Rewriter: Send + Sync {
    /// Rewrite `text` in the given tone.
    fn rewrite(
        &self,
        text: &str,
        tone: Tone,
    ) -> impl Future<Output = Result<String, RewriteError>> + Send;
}
