//! Application controller.
//!
//! Holds the one in-memory campaign and everything transient around it:
//! the active view, the last-action feedback record and the set of targets
//! with a rewrite in flight. Views read through the controller and every
//! change goes through one of its methods.
//!
//! Targets are addressed by id. When decoded data contains duplicate ids,
//! updates, removals and rewrite results apply to the first target in list
//! order with that id. Removing a target cancels its outstanding rewrite, so
//! the result never lands on a later target sharing the id.
//!
//! Every accepted rewrite gets a fresh sequence number. A completion is
//! applied only while its number is the one recorded for the target.

use std::collections::HashMap;
use std::time::SystemTime;

use tracing::{debug, error, info, warn};

use super::action::{ActionKind, LastAction};
use crate::codec::{decode, fragment_of, share_url, DecodeError, Fragment, LinkError};
use crate::mail::{build_mail_actions, build_mailto, resolve_body, MailAction};
use crate::model::{seed_campaign, Campaign, Target, TargetId};
use crate::rewrite::{RewriteCompletion, RewriteRequest, Tone};

/// Which presentation of the campaign is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    /// Author's editing view
    Builder,
    /// Read-mostly view for someone who opened a shared link
    Follower,
}

/// Result of looking for a shared campaign in the page address.
#[derive(Debug)]
pub enum LoadOutcome {
    /// No token present; the existing campaign stays
    NoSharedCampaign,
    /// The shared campaign replaced the existing one
    Loaded,
    /// The token was malformed; the existing campaign stays
    Rejected(DecodeError),
}

/// Editable per-target field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetField {
    Name,
    Email,
    Subject,
    Body,
    Constituency,
}

/// What happened to a rewrite completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RewriteApplied {
    /// The target's body was replaced
    Applied,
    /// The collaborator failed; the body is unchanged
    Failed,
    /// The target no longer exists or the request was not in flight
    Discarded,
}

/// Owner of the campaign and the transient UI state around it.
#[derive(Debug)]
pub struct Controller {
    campaign: Campaign,
    view: View,
    last_action: Option<LastAction>,
    /// Target id → sequence number of its outstanding rewrite
    rewrites_in_flight: HashMap<TargetId, u64>,
    next_rewrite_seq: u64,
}

impl Default for Controller {
    fn default() -> Self {
        Self::new()
    }
}

impl Controller {
    /// Start with the built-in example campaign in the follower view.
    pub fn new() -> Self {
        Self::with_campaign(seed_campaign())
    }

    pub fn with_campaign(campaign: Campaign) -> Self {
        Self {
            campaign,
            view: View::Follower,
            last_action: None,
            rewrites_in_flight: HashMap::new(),
            next_rewrite_seq: 0,
        }
    }

    pub fn campaign(&self) -> &Campaign {
        &self.campaign
    }

    pub fn view(&self) -> View {
        self.view
    }

    pub fn set_view(&mut self, view: View) {
        self.view = view;
    }

    pub fn last_action(&self) -> Option<&LastAction> {
        self.last_action.as_ref()
    }

    // =========================================================================
    // Loading and sharing
    // =========================================================================

    /// Load a shared campaign from the page address, if it carries one.
    pub fn load_location(&mut self, page_address: &str) -> Result<LoadOutcome, LinkError> {
        let fragment = fragment_of(page_address)?;
        Ok(self.load_fragment(fragment))
    }

    /// Apply the load policy to an already-extracted fragment.
    ///
    /// A decoded campaign replaces the current one and switches to the
    /// follower view. A malformed token is logged and otherwise ignored.
    pub fn load_fragment(&mut self, fragment: Fragment) -> LoadOutcome {
        let token = match fragment {
            Fragment::Absent => {
                debug!("campaign_fragment_absent");
                return LoadOutcome::NoSharedCampaign;
            }
            Fragment::Token(token) => token,
        };

        match decode(&token) {
            Ok(campaign) => {
                info!(
                    title = %campaign.title,
                    targets = campaign.mps.len(),
                    "campaign_loaded_from_link"
                );
                self.replace_campaign(campaign);
                self.view = View::Follower;
                LoadOutcome::Loaded
            }
            Err(e) => {
                error!(
                    error = %e,
                    token_length = token.len(),
                    "campaign_decode_failed"
                );
                LoadOutcome::Rejected(e)
            }
        }
    }

    /// Replace the whole campaign.
    ///
    /// Outstanding rewrites belong to the old campaign and are forgotten;
    /// their completions will be discarded.
    pub fn replace_campaign(&mut self, campaign: Campaign) {
        let duplicates = campaign.duplicate_ids();
        if !duplicates.is_empty() {
            warn!(
                duplicate_ids = ?duplicates,
                "campaign_duplicate_target_ids"
            );
        }

        self.campaign = campaign;
        self.rewrites_in_flight.clear();
    }

    /// Build the share link for the current campaign and record the copy.
    pub fn share_link(&mut self, page_address: &str) -> Result<String, LinkError> {
        let link = share_url(page_address, &self.campaign)?;

        info!(
            targets = self.campaign.mps.len(),
            link_length = link.len(),
            "campaign_share_link_built"
        );

        self.record_action(ActionKind::CopyLink, None);
        Ok(link)
    }

    // =========================================================================
    // Editing
    // =========================================================================

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.campaign.title = title.into();
    }

    pub fn set_global_subject(&mut self, subject: impl Into<String>) {
        self.campaign.global_subject = subject.into();
    }

    pub fn set_global_body(&mut self, body: impl Into<String>) {
        self.campaign.global_body = body.into();
    }

    /// Append a blank target with a fresh id.
    pub fn add_target(&mut self) -> TargetId {
        let id = self.campaign.fresh_target_id();
        self.campaign.mps.push(Target::blank(id.clone()));

        debug!(target_id = %id, "target_added");
        id
    }

    /// Set one field of the first target with `id`. Returns false if there
    /// is no such target.
    pub fn update_target(&mut self, id: &TargetId, field: TargetField, value: impl Into<String>) -> bool {
        let Some(target) = self.campaign.target_mut(id) else {
            debug!(target_id = %id, field = ?field, "target_update_missing");
            return false;
        };

        let value = value.into();
        match field {
            TargetField::Name => target.name = value,
            TargetField::Email => target.email = value,
            TargetField::Subject => target.subject = Some(value),
            TargetField::Body => target.body = Some(value),
            TargetField::Constituency => target.constituency = Some(value),
        }
        true
    }

    /// Remove the first target with `id`.
    pub fn remove_target(&mut self, id: &TargetId) -> Option<Target> {
        let index = self.campaign.mps.iter().position(|t| &t.id == id)?;
        let removed = self.campaign.mps.remove(index);
        let cancelled = self.rewrites_in_flight.remove(id);

        debug!(
            target_id = %id,
            rewrite_cancelled = cancelled.is_some(),
            "target_removed"
        );
        Some(removed)
    }

    // =========================================================================
    // Mail actions
    // =========================================================================

    /// Follower-view actions for every target.
    pub fn mail_actions(&self) -> Vec<MailAction> {
        build_mail_actions(&self.campaign)
    }

    /// The `mailto:` URI for a target, recording that it was opened.
    pub fn open_mail(&mut self, id: &TargetId) -> Option<String> {
        let uri = build_mailto(&self.campaign, self.campaign.target(id)?);
        self.record_action(ActionKind::OpenMail, Some(id.clone()));
        Some(uri)
    }

    // =========================================================================
    // Feedback
    // =========================================================================

    pub fn record_action(&mut self, kind: ActionKind, target_id: Option<TargetId>) {
        self.last_action = Some(LastAction::new(kind, target_id, SystemTime::now()));
    }

    /// Whether feedback for `kind` on `target_id` should be shown at `now`.
    pub fn feedback_active(&self, kind: ActionKind, target_id: Option<&TargetId>, now: SystemTime) -> bool {
        self.last_action
            .as_ref()
            .map(|a| a.is_active(kind, target_id, now))
            .unwrap_or(false)
    }

    // =========================================================================
    // Rewrites
    // =========================================================================

    pub fn rewrite_in_flight(&self, id: &TargetId) -> bool {
        self.rewrites_in_flight.contains_key(id)
    }

    /// Accept a rewrite of the target's effective body.
    ///
    /// Returns `None` when the target does not exist or already has a
    /// rewrite outstanding.
    pub fn begin_rewrite(&mut self, id: &TargetId, tone: Tone) -> Option<RewriteRequest> {
        if self.rewrites_in_flight.contains_key(id) {
            debug!(target_id = %id, "rewrite_already_in_flight");
            return None;
        }

        let target = self.campaign.target(id)?;
        let text = resolve_body(&self.campaign, target).to_string();

        let seq = self.next_rewrite_seq;
        self.next_rewrite_seq += 1;
        self.rewrites_in_flight.insert(id.clone(), seq);

        Some(RewriteRequest {
            target_id: id.clone(),
            seq,
            text,
            tone,
        })
    }

    /// Apply a finished rewrite to the target that asked for it.
    pub fn complete_rewrite(&mut self, completion: RewriteCompletion) -> RewriteApplied {
        let RewriteCompletion {
            target_id,
            seq,
            outcome,
        } = completion;

        if self.rewrites_in_flight.get(&target_id) != Some(&seq) {
            debug!(
                target_id = %target_id,
                seq = seq,
                current_seq = ?self.rewrites_in_flight.get(&target_id),
                "rewrite_not_in_flight"
            );
            return RewriteApplied::Discarded;
        }
        self.rewrites_in_flight.remove(&target_id);

        let text = match outcome {
            Ok(text) => text,
            Err(e) => {
                warn!(target_id = %target_id, error = %e, "rewrite_failed");
                return RewriteApplied::Failed;
            }
        };

        let Some(target) = self.campaign.target_mut(&target_id) else {
            debug!(target_id = %target_id, "rewrite_target_gone");
            return RewriteApplied::Discarded;
        };

        target.body = Some(text);
        info!(target_id = %target_id, "rewrite_applied");

        self.record_action(ActionKind::Rewrite, Some(target_id));
        RewriteApplied::Applied
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::time::Duration;

    use tokio::sync::oneshot;

    use super::*;
    use crate::codec::encode;
    use crate::rewrite::{RewriteDispatcher, RewriteError, Rewriter};

    const PAGE: &str = "https://campaign.example/";

    fn id(s: &str) -> TargetId {
        TargetId::from(s)
    }

    fn campaign_with(ids: &[&str]) -> Campaign {
        Campaign {
            title: "Test".to_string(),
            global_subject: "Subject".to_string(),
            global_body: "Global body".to_string(),
            mps: ids
                .iter()
                .map(|i| Target {
                    id: id(i),
                    name: i.to_string(),
                    email: format!("{}@example.com", i),
                    subject: None,
                    body: Some(format!("body {}", i)),
                    constituency: None,
                })
                .collect(),
        }
    }

    fn body_of(controller: &Controller, target: &str) -> Option<String> {
        controller.campaign().target(&id(target)).unwrap().body.clone()
    }

    /// Rewriter whose calls finish only when the test releases them.
    struct GatedRewriter {
        gates: Mutex<HashMap<String, oneshot::Receiver<Result<String, RewriteError>>>>,
    }

    impl GatedRewriter {
        fn new() -> (Self, HashMap<String, oneshot::Sender<Result<String, RewriteError>>>) {
            Self::for_texts(&["body a", "body b", "body x"])
        }

        fn for_texts(
            texts: &[&str],
        ) -> (Self, HashMap<String, oneshot::Sender<Result<String, RewriteError>>>) {
            let mut gates = HashMap::new();
            let mut releases = HashMap::new();
            for text in texts {
                let (tx, rx) = oneshot::channel();
                gates.insert(text.to_string(), rx);
                releases.insert(text.to_string(), tx);
            }
            (Self { gates: Mutex::new(gates) }, releases)
        }
    }

    impl Rewriter for GatedRewriter {
        async fn rewrite(&self, text: &str, _tone: Tone) -> Result<String, RewriteError> {
            let gate = { self.gates.lock().unwrap().remove(text) };
            match gate {
                Some(rx) => rx
                    .await
                    .unwrap_or_else(|_| Err(RewriteError::Malformed("gate dropped".to_string()))),
                None => Err(RewriteError::Malformed(format!("no gate for {}", text))),
            }
        }
    }

    #[test]
    fn test_new_uses_seed_and_follower_view() {
        let controller = Controller::new();

        assert_eq!(controller.campaign(), &seed_campaign());
        assert_eq!(controller.view(), View::Follower);
        assert!(controller.last_action().is_none());
    }

    #[test]
    fn test_load_without_fragment_keeps_seed() {
        let mut controller = Controller::new();
        controller.set_view(View::Builder);

        let outcome = controller.load_location(PAGE).unwrap();

        assert!(matches!(outcome, LoadOutcome::NoSharedCampaign));
        assert_eq!(controller.campaign(), &seed_campaign());
        assert_eq!(controller.view(), View::Builder);
    }

    #[test]
    fn test_load_valid_token_replaces_campaign() {
        let shared = campaign_with(&["a", "b"]);
        let mut controller = Controller::new();
        controller.set_view(View::Builder);

        let outcome = controller
            .load_location(&format!("{}#{}", PAGE, encode(&shared)))
            .unwrap();

        assert!(matches!(outcome, LoadOutcome::Loaded));
        assert_eq!(controller.campaign(), &shared);
        assert_eq!(controller.view(), View::Follower);
    }

    #[test]
    fn test_load_malformed_token_keeps_state() {
        let mut controller = Controller::new();
        controller.set_view(View::Builder);

        let outcome = controller
            .load_location(&format!("{}#not-a-valid-token", PAGE))
            .unwrap();

        assert!(matches!(outcome, LoadOutcome::Rejected(_)));
        assert_eq!(controller.campaign(), &seed_campaign());
        assert_eq!(controller.view(), View::Builder);
    }

    #[test]
    fn test_load_corrupted_token_keeps_state() {
        let mut controller = Controller::new();
        let token = format!("{}corruption", encode(&campaign_with(&["a"])));

        let outcome = controller.load_fragment(Fragment::Token(token));

        assert!(matches!(outcome, LoadOutcome::Rejected(_)));
        assert_eq!(controller.campaign(), &seed_campaign());
    }

    #[test]
    fn test_share_link_round_trip_and_feedback() {
        let mut controller = Controller::new();
        controller.set_title("Edited title");

        let link = controller.share_link("https://campaign.example/app?x=1").unwrap();

        let mut reader = Controller::with_campaign(campaign_with(&[]));
        assert!(matches!(
            reader.load_location(&link).unwrap(),
            LoadOutcome::Loaded
        ));
        assert_eq!(reader.campaign(), controller.campaign());

        let now = SystemTime::now();
        assert!(controller.feedback_active(ActionKind::CopyLink, None, now));
        assert!(!controller.feedback_active(
            ActionKind::CopyLink,
            None,
            now + Duration::from_secs(3)
        ));
    }

    #[test]
    fn test_add_update_remove_target() {
        let mut controller = Controller::with_campaign(campaign_with(&["a"]));

        let new_id = controller.add_target();
        assert_eq!(controller.campaign().mps.len(), 2);
        assert_ne!(new_id, id("a"));

        assert!(controller.update_target(&new_id, TargetField::Name, "New MP"));
        assert!(controller.update_target(&new_id, TargetField::Email, "new@example.com"));
        assert!(controller.update_target(&new_id, TargetField::Subject, "Own subject"));

        let added = controller.campaign().target(&new_id).unwrap();
        assert_eq!(added.name, "New MP");
        assert_eq!(added.email, "new@example.com");
        assert_eq!(added.subject.as_deref(), Some("Own subject"));

        let removed = controller.remove_target(&id("a")).unwrap();
        assert_eq!(removed.id, id("a"));
        assert_eq!(controller.campaign().mps.len(), 1);
        assert!(controller.remove_target(&id("a")).is_none());
        assert!(!controller.update_target(&id("a"), TargetField::Name, "gone"));
    }

    #[test]
    fn test_duplicate_ids_first_match() {
        let mut controller = Controller::with_campaign(campaign_with(&["dup", "dup"]));

        controller.update_target(&id("dup"), TargetField::Name, "changed");
        assert_eq!(controller.campaign().mps[0].name, "changed");
        assert_eq!(controller.campaign().mps[1].name, "dup");

        controller.remove_target(&id("dup"));
        assert_eq!(controller.campaign().mps.len(), 1);
        assert_eq!(controller.campaign().mps[0].name, "dup");
    }

    #[test]
    fn test_open_mail_records_action() {
        let mut controller = Controller::with_campaign(campaign_with(&["a"]));

        let uri = controller.open_mail(&id("a")).unwrap();

        assert!(uri.starts_with("mailto:a@example.com?"));
        assert!(controller.feedback_active(ActionKind::OpenMail, Some(&id("a")), SystemTime::now()));
        assert!(controller.open_mail(&id("missing")).is_none());
    }

    #[test]
    fn test_mail_actions_follow_campaign() {
        let controller = Controller::with_campaign(campaign_with(&["a", "b"]));

        let actions = controller.mail_actions();

        assert_eq!(actions.len(), 2);
        assert_eq!(actions[1].target_id, id("b"));
    }

    #[test]
    fn test_begin_rewrite_refuses_duplicate() {
        let mut controller = Controller::with_campaign(campaign_with(&["a"]));

        let request = controller.begin_rewrite(&id("a"), Tone::Urgent).unwrap();
        assert_eq!(request.text, "body a");
        assert!(controller.rewrite_in_flight(&id("a")));

        assert!(controller.begin_rewrite(&id("a"), Tone::Concise).is_none());
        assert!(controller.begin_rewrite(&id("missing"), Tone::Concise).is_none());
    }

    #[test]
    fn test_begin_rewrite_uses_global_body_fallback() {
        let mut campaign = campaign_with(&["a"]);
        campaign.mps[0].body = Some(String::new());
        let mut controller = Controller::with_campaign(campaign);

        let request = controller.begin_rewrite(&id("a"), Tone::Empathetic).unwrap();

        assert_eq!(request.text, "Global body");
    }

    #[test]
    fn test_failed_rewrite_leaves_body() {
        let mut controller = Controller::with_campaign(campaign_with(&["a"]));
        let request = controller.begin_rewrite(&id("a"), Tone::Urgent).unwrap();

        let applied = controller.complete_rewrite(RewriteCompletion {
            target_id: id("a"),
            seq: request.seq,
            outcome: Err(RewriteError::NotConfigured),
        });

        assert_eq!(applied, RewriteApplied::Failed);
        assert_eq!(body_of(&controller, "a").as_deref(), Some("body a"));
        assert!(!controller.rewrite_in_flight(&id("a")));
    }

    #[test]
    fn test_completion_not_in_flight_discarded() {
        let mut controller = Controller::with_campaign(campaign_with(&["a"]));

        let applied = controller.complete_rewrite(RewriteCompletion {
            target_id: id("a"),
            seq: 0,
            outcome: Ok("unsolicited".to_string()),
        });

        assert_eq!(applied, RewriteApplied::Discarded);
        assert_eq!(body_of(&controller, "a").as_deref(), Some("body a"));
    }

    #[tokio::test]
    async fn test_concurrent_independent_rewrites() {
        let mut controller = Controller::with_campaign(campaign_with(&["a", "b"]));
        let (rewriter, mut releases) = GatedRewriter::new();
        let (dispatcher, mut rx) = RewriteDispatcher::new(rewriter);

        let req_a = controller.begin_rewrite(&id("a"), Tone::Urgent).unwrap();
        let req_b = controller.begin_rewrite(&id("b"), Tone::Urgent).unwrap();
        dispatcher.dispatch(req_a);
        dispatcher.dispatch(req_b);

        // B resolves first
        releases
            .remove("body b")
            .unwrap()
            .send(Ok("rewritten b".to_string()))
            .unwrap();
        let first = rx.recv().await.unwrap();
        assert_eq!(first.target_id, id("b"));
        assert_eq!(controller.complete_rewrite(first), RewriteApplied::Applied);

        assert_eq!(body_of(&controller, "b").as_deref(), Some("rewritten b"));
        assert_eq!(body_of(&controller, "a").as_deref(), Some("body a"));
        assert!(controller.rewrite_in_flight(&id("a")));

        releases
            .remove("body a")
            .unwrap()
            .send(Ok("rewritten a".to_string()))
            .unwrap();
        let second = rx.recv().await.unwrap();
        assert_eq!(controller.complete_rewrite(second), RewriteApplied::Applied);

        assert_eq!(body_of(&controller, "a").as_deref(), Some("rewritten a"));
        assert!(!controller.rewrite_in_flight(&id("a")));
        assert!(controller.feedback_active(ActionKind::Rewrite, Some(&id("a")), SystemTime::now()));
    }

    #[tokio::test]
    async fn test_rewrite_for_deleted_target_discarded() {
        let mut controller = Controller::with_campaign(campaign_with(&["x", "y"]));
        let (rewriter, mut releases) = GatedRewriter::new();
        let (dispatcher, mut rx) = RewriteDispatcher::new(rewriter);

        let request = controller.begin_rewrite(&id("x"), Tone::Concise).unwrap();
        dispatcher.dispatch(request);

        controller.remove_target(&id("x"));
        let before = controller.campaign().clone();

        releases
            .remove("body x")
            .unwrap()
            .send(Ok("rewritten x".to_string()))
            .unwrap();
        let completion = rx.recv().await.unwrap();

        assert_eq!(controller.complete_rewrite(completion), RewriteApplied::Discarded);
        assert_eq!(controller.campaign(), &before);
        assert!(controller.last_action().is_none());
    }

    #[tokio::test]
    async fn test_replace_campaign_discards_outstanding_rewrites() {
        let mut controller = Controller::with_campaign(campaign_with(&["a"]));
        let (rewriter, mut releases) = GatedRewriter::new();
        let (dispatcher, mut rx) = RewriteDispatcher::new(rewriter);

        let old = controller.begin_rewrite(&id("a"), Tone::Urgent).unwrap();
        dispatcher.dispatch(old.clone());
        controller.replace_campaign(campaign_with(&["a"]));

        // A fresh rewrite for the same id in the replacement campaign
        let fresh = controller.begin_rewrite(&id("a"), Tone::Concise).unwrap();
        assert_ne!(fresh.seq, old.seq);

        releases
            .remove("body a")
            .unwrap()
            .send(Ok("stale".to_string()))
            .unwrap();
        let completion = rx.recv().await.unwrap();

        assert_eq!(controller.complete_rewrite(completion), RewriteApplied::Discarded);
        assert_eq!(body_of(&controller, "a").as_deref(), Some("body a"));
        assert!(controller.rewrite_in_flight(&id("a")));

        // The fresh request still applies when it finishes
        let applied = controller.complete_rewrite(RewriteCompletion {
            target_id: id("a"),
            seq: fresh.seq,
            outcome: Ok("fresh".to_string()),
        });

        assert_eq!(applied, RewriteApplied::Applied);
        assert_eq!(body_of(&controller, "a").as_deref(), Some("fresh"));
        assert!(!controller.rewrite_in_flight(&id("a")));
    }

    #[test]
    fn test_remove_duplicate_cancels_rewrite() {
        let mut controller = Controller::with_campaign(campaign_with(&["dup", "dup"]));
        let request = controller.begin_rewrite(&id("dup"), Tone::Urgent).unwrap();

        controller.remove_target(&id("dup"));
        assert!(!controller.rewrite_in_flight(&id("dup")));

        let applied = controller.complete_rewrite(RewriteCompletion {
            target_id: id("dup"),
            seq: request.seq,
            outcome: Ok("meant for the removed target".to_string()),
        });

        assert_eq!(applied, RewriteApplied::Discarded);
        assert_eq!(body_of(&controller, "dup").as_deref(), Some("body dup"));
    }
}
