//! Campaign and target types.
//!
//! These are the exact shapes carried inside a share-link token, so the
//! serde field names match the wire format used by existing links.

use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Opaque identifier of a target within a campaign.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TargetId(String);

impl TargetId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a fresh id of the form `<unix-millis>-<4 hex digits>`.
    ///
    /// Callers that need uniqueness within a campaign must still check the
    /// result against the ids already present.
    pub fn generate() -> Self {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis();
        let suffix: u16 = rand::thread_rng().gen();
        Self(format!("{}-{:04x}", millis, suffix))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TargetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TargetId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// One addressable entry in a campaign: a single MP or a group of addresses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Target {
    pub id: TargetId,
    /// Display label, may be empty
    pub name: String,
    /// One or more addresses separated by `;` or `,`
    pub email: String,
    /// Overrides the campaign subject when non-empty
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    /// Overrides the campaign body when non-empty
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constituency: Option<String>,
}

impl Target {
    /// Create a blank target, as added from the builder view.
    pub fn blank(id: TargetId) -> Self {
        Self {
            id,
            name: String::new(),
            email: String::new(),
            subject: Some(String::new()),
            body: Some(String::new()),
            constituency: None,
        }
    }
}

/// The complete shareable unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Campaign {
    pub title: String,
    pub global_subject: String,
    pub global_body: String,
    /// Targets in display order
    pub mps: Vec<Target>,
}

impl Campaign {
    /// First target with the given id.
    pub fn target(&self, id: &TargetId) -> Option<&Target> {
        self.mps.iter().find(|t| &t.id == id)
    }

    /// First target with the given id, mutably.
    pub fn target_mut(&mut self, id: &TargetId) -> Option<&mut Target> {
        self.mps.iter_mut().find(|t| &t.id == id)
    }

    /// Ids that occur more than once, in first-seen order.
    pub fn duplicate_ids(&self) -> Vec<TargetId> {
        let mut seen = std::collections::HashSet::new();
        let mut dupes = Vec::new();

        for target in &self.mps {
            if !seen.insert(&target.id) && !dupes.contains(&target.id) {
                dupes.push(target.id.clone());
            }
        }

        dupes
    }

    /// Generate an id that no target in this campaign currently uses.
    pub fn fresh_target_id(&self) -> TargetId {
        loop {
            let id = TargetId::generate();
            if self.target(&id).is_none() {
                return id;
            }
        }
    }
}
