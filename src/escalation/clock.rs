//! Rotation clock: when is a posting's current invite round exhausted?

use chrono::{DateTime, Duration, Utc};

use crate::models::invite::Invite;
use crate::models::posting::{PolicySnapshot, Posting};

/// Latest moment any invite in the rotation could still be active.
///
/// Each invite's effective time is its explicit `scheduled_at` when set,
/// otherwise derived from the posting's base time offset by
/// `(sequence - 1) * invite_delay_minutes`. An explicit zero delay
/// collapses every derived time onto the base time; an unconfigured delay
/// derives nothing. Invites with neither an explicit time nor a derivable
/// one contribute nothing; an empty rotation yields `None` and the posting
/// is never escalated on rotation grounds.
#[must_use]
pub fn latest_invite_deadline(
    posting: &Posting,
    invites: &[Invite],
    policy: &PolicySnapshot,
) -> Option<DateTime<Utc>> {
    let base = posting.base_time();
    invites
        .iter()
        .filter_map(|invite| effective_time(invite, base, policy.invite_delay_minutes))
        .max()
}

fn effective_time(
    invite: &Invite,
    base: Option<DateTime<Utc>>,
    delay_minutes: Option<i64>,
) -> Option<DateTime<Utc>> {
    if let Some(at) = invite.scheduled_at {
        return Some(at);
    }
    let base = base?;
    let offset = i64::from(invite.sequence.saturating_sub(1));
    let delay = offset
        .checked_mul(delay_minutes?)
        .and_then(Duration::try_minutes)?;
    base.checked_add_signed(delay)
}
