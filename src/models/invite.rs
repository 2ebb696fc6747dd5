//! Invite model for a posting's rotation sequence.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Response status for one rotation invite.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InviteStatus {
    /// Offered, awaiting a response.
    Pending,
    /// Officer accepted the shift; the posting is satisfied.
    Accepted,
    /// Officer declined the shift.
    Declined,
    /// Queued in the rotation, not yet offered.
    Ordered,
    /// Offer window lapsed without a response.
    Expired,
}

/// One offer of a posting to one officer.
///
/// Sequence numbers are 1-based and unique per posting; uniqueness is an
/// upstream invariant, not enforced here.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Invite {
    /// Unique record identifier.
    pub id: String,
    /// Owning posting identifier.
    pub posting_id: String,
    /// Current response status.
    pub status: InviteStatus,
    /// Position in the rotation, starting at 1.
    pub sequence: u32,
    /// Explicit offer time overriding the derived rotation schedule.
    #[serde(default)]
    pub scheduled_at: Option<DateTime<Utc>>,
}
