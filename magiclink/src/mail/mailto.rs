//! `mailto:` URI construction for one target of a campaign.

use serde::Serialize;

use super::recipients::split_recipients;
use crate::model::{Campaign, Target, TargetId};

/// Label shown for targets that have no name.
pub const UNNAMED_TARGET: &str = "MP Name";

/// Two-level field resolution: a non-empty override wins, otherwise the
/// campaign default is used.
///
/// An override that is present but empty counts as "no override", so an
/// author cannot deliberately send an empty subject to one target while the
/// campaign has a default.
pub fn resolve<'a>(override_value: Option<&'a str>, default: &'a str) -> &'a str {
    match override_value {
        Some(value) if !value.is_empty() => value,
        _ => default,
    }
}

/// Subject used for `target`.
pub fn resolve_subject<'a>(campaign: &'a Campaign, target: &'a Target) -> &'a str {
    resolve(target.subject.as_deref(), &campaign.global_subject)
}

/// Body used for `target`.
pub fn resolve_body<'a>(campaign: &'a Campaign, target: &'a Target) -> &'a str {
    resolve(target.body.as_deref(), &campaign.global_body)
}

/// Build the `mailto:` URI for `target`.
///
/// Recipients are comma-joined with surrounding whitespace removed; subject
/// and body are percent-encoded with space as `%20`. An empty address list
/// still produces a URI.
///
/// Addresses are never validated, but each one is percent-escaped for the
/// URI with `@` kept literal: `a+tag@x.com` becomes `a%2Btag@x.com` and
/// `not an address` becomes `not%20an%20address`. Mail clients decode these
/// back to the text the author typed.
pub fn build_mailto(campaign: &Campaign, target: &Target) -> String {
    let recipients = split_recipients(&target.email)
        .into_iter()
        .map(escape_address)
        .collect::<Vec<_>>()
        .join(",");

    format!(
        "mailto:{}?subject={}&body={}",
        recipients,
        urlencoding::encode(resolve_subject(campaign, target)),
        urlencoding::encode(resolve_body(campaign, target)),
    )
}

/// Escape one address for the recipient part of the URI, keeping `@`.
fn escape_address(address: &str) -> String {
    urlencoding::encode(address).replace("%40", "@")
}

/// One follower-view mail action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MailAction {
    pub target_id: TargetId,
    /// Display name, falling back to [`UNNAMED_TARGET`]
    pub name: String,
    pub uri: String,
    /// Normalized recipient list
    pub recipients: Vec<String>,
    pub is_group: bool,
}

impl MailAction {
    pub fn new(campaign: &Campaign, target: &Target) -> Self {
        let recipients: Vec<String> = split_recipients(&target.email)
            .into_iter()
            .map(str::to_string)
            .collect();

        let name = if target.name.is_empty() {
            UNNAMED_TARGET.to_string()
        } else {
            target.name.clone()
        };

        Self {
            target_id: target.id.clone(),
            name,
            uri: build_mailto(campaign, target),
            is_group: recipients.len() > 1,
            recipients,
        }
    }

    /// False when the URI would open a draft with nobody in the To field.
    pub fn has_recipients(&self) -> bool {
        !self.recipients.is_empty()
    }
}

/// Mail actions for every target, in display order.
pub fn build_mail_actions(campaign: &Campaign) -> Vec<MailAction> {
    campaign
        .mps
        .iter()
        .map(|target| MailAction::new(campaign, target))
        .collect()
}
