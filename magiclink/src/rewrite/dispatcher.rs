//! Concurrent rewrite dispatch.
//!
//! Each request runs on its own tokio task. Completions come back over an
//! unbounded mpsc channel in whatever order the collaborator finishes, keyed
//! by the target id and request sequence number captured when the request
//! was made.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use super::{RewriteError, Rewriter, Tone};
use crate::model::TargetId;

/// A rewrite the controller has accepted and marked in flight.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewriteRequest {
    pub target_id: TargetId,
    /// Controller-assigned, increases with every accepted request
    pub seq: u64,
    /// Text to rewrite, captured at request time
    pub text: String,
    pub tone: Tone,
}

/// Result of one rewrite, addressed to the requesting target.
#[derive(Debug)]
pub struct RewriteCompletion {
    pub target_id: TargetId,
    /// Sequence number of the request this answers
    pub seq: u64,
    pub outcome: Result<String, RewriteError>,
}

/// Runs rewrite requests against a shared collaborator.
pub struct RewriteDispatcher<R> {
    rewriter: Arc<R>,
    tx: mpsc::UnboundedSender<RewriteCompletion>,
}

impl<R> Clone for RewriteDispatcher<R> {
    fn clone(&self) -> Self {
        Self {
            rewriter: Arc::clone(&self.rewriter),
            tx: self.tx.clone(),
        }
    }
}

impl<R: Rewriter + 'static> RewriteDispatcher<R> {
    /// Create a dispatcher and the receiver its completions arrive on.
    pub fn new(rewriter: R) -> (Self, mpsc::UnboundedReceiver<RewriteCompletion>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let dispatcher = Self {
            rewriter: Arc::new(rewriter),
            tx,
        };
        (dispatcher, rx)
    }

    /// Start a rewrite. Must be called inside a tokio runtime.
    pub fn dispatch(&self, request: RewriteRequest) -> JoinHandle<()> {
        let rewriter = Arc::clone(&self.rewriter);
        let tx = self.tx.clone();

        info!(
            target_id = %request.target_id,
            seq = request.seq,
            tone = %request.tone,
            "rewrite_dispatched"
        );

        tokio::spawn(async move {
            let outcome = rewriter.rewrite(&request.text, request.tone).await;

            let completion = RewriteCompletion {
                target_id: request.target_id,
                seq: request.seq,
                outcome,
            };

            if let Err(e) = tx.send(completion) {
                debug!(target_id = %e.0.target_id, "rewrite_completion_dropped");
            }
        })
    }
}
