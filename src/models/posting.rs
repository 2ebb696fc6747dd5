//! Posting model and its embedded staffing policy snapshot.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::invite::Invite;

/// Lifecycle state for an overtime posting.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PostingState {
    /// Posting is accepting invites.
    Open,
    /// Posting has been staffed.
    Filled,
    /// Posting was withdrawn or completed.
    Closed,
}

/// Overtime-shift posting as returned by the data gateway.
///
/// The open-posting query nests the posting's invite rotation up to the
/// gateway's fixed sub-listing page size. The escalation flag is the only
/// field this service mutates, and only from `false` to `true`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Posting {
    /// Unique record identifier.
    pub id: String,
    /// Owning organization identifier.
    pub org_id: String,
    /// Human-readable shift title.
    pub title: String,
    /// User who created the posting; escalation notices go to them.
    pub created_by: String,
    /// Scheduled shift start, when set.
    #[serde(default)]
    pub starts_at: Option<DateTime<Utc>>,
    /// Record creation time.
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    /// Opaque staffing-policy document, parsed on demand.
    #[serde(default)]
    pub policy: serde_json::Value,
    /// Whether the posting has been flagged for human intervention.
    #[serde(default)]
    pub needs_escalation: bool,
    /// Current lifecycle state.
    pub state: PostingState,
    /// Invite rotation nested in the listing response.
    #[serde(default, deserialize_with = "super::deserialize_nested_items")]
    pub invites: Vec<Invite>,
}

impl Posting {
    /// Base time the invite rotation is offset from: the shift start,
    /// falling back to the record creation time.
    #[must_use]
    pub fn base_time(&self) -> Option<DateTime<Utc>> {
        self.starts_at.or(self.created_at)
    }

    /// Parse the policy snapshot from the posting's current document.
    #[must_use]
    pub fn policy_snapshot(&self) -> PolicySnapshot {
        PolicySnapshot::parse(&self.policy)
    }
}

/// Staffing policy parsed from a posting's opaque policy document.
///
/// Re-parsed on every scan from the posting's current value; a malformed
/// document degrades to the default snapshot rather than failing the scan.
///
/// An *absent* invite delay means the rotation carries no derived
/// schedule; an explicit delay of zero means every invite fires at the
/// posting's base time. The two are distinct, so the field stays optional.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PolicySnapshot {
    /// Absolute deadline after which the posting escalates unconditionally.
    #[serde(default)]
    pub response_deadline: Option<DateTime<Utc>>,
    /// Minutes between consecutive rotation invites, when configured.
    #[serde(default)]
    pub invite_delay_minutes: Option<i64>,
}

impl PolicySnapshot {
    /// Parse a policy document, degrading to the default snapshot on error.
    ///
    /// Negative invite delays are clamped to zero.
    #[must_use]
    pub fn parse(document: &serde_json::Value) -> Self {
        let mut snapshot: Self = match serde_json::from_value(document.clone()) {
            Ok(snapshot) => snapshot,
            Err(err) => {
                warn!(%err, "malformed policy snapshot, using defaults");
                Self::default()
            }
        };
        if let Some(delay) = snapshot.invite_delay_minutes {
            if delay < 0 {
                warn!(
                    invite_delay_minutes = delay,
                    "negative invite delay clamped to zero"
                );
                snapshot.invite_delay_minutes = Some(0);
            }
        }
        snapshot
    }
}
