//! Unit tests for the rotation clock.
//!
//! Validates the per-invite effective-time rules and the max-across-invites
//! deadline, including the explicit-zero versus unconfigured delay split.

use chrono::{DateTime, Duration, TimeZone, Utc};

use shift_sentinel::escalation::clock::latest_invite_deadline;
use shift_sentinel::models::invite::{Invite, InviteStatus};
use shift_sentinel::models::posting::{PolicySnapshot, Posting, PostingState};

fn base() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).single().unwrap()
}

fn posting(starts_at: Option<DateTime<Utc>>, created_at: Option<DateTime<Utc>>) -> Posting {
    Posting {
        id: "p1".into(),
        org_id: "org-1".into(),
        title: "Harbor Patrol Overtime".into(),
        created_by: "supervisor-1".into(),
        starts_at,
        created_at,
        policy: serde_json::Value::Null,
        needs_escalation: false,
        state: PostingState::Open,
        invites: Vec::new(),
    }
}

fn invite(sequence: u32, scheduled_at: Option<DateTime<Utc>>) -> Invite {
    Invite {
        id: format!("i{sequence}"),
        posting_id: "p1".into(),
        status: InviteStatus::Pending,
        sequence,
        scheduled_at,
    }
}

fn policy(delay_minutes: Option<i64>) -> PolicySnapshot {
    PolicySnapshot {
        response_deadline: None,
        invite_delay_minutes: delay_minutes,
    }
}

#[test]
fn empty_rotation_yields_none() {
    let posting = posting(Some(base()), None);
    assert_eq!(
        latest_invite_deadline(&posting, &[], &policy(Some(30))),
        None
    );
}

#[test]
fn explicit_schedule_wins_over_derivation() {
    let posting = posting(Some(base()), None);
    let explicit = base() + Duration::hours(6);
    let invites = vec![invite(1, Some(explicit))];
    assert_eq!(
        latest_invite_deadline(&posting, &invites, &policy(Some(30))),
        Some(explicit)
    );
}

#[test]
fn derived_deadline_follows_sequence_formula() {
    let posting = posting(Some(base()), None);

    // Each sequence k alone resolves to T + (k-1)*d.
    for sequence in 1..=4_u32 {
        let invites = vec![invite(sequence, None)];
        let expected = base() + Duration::minutes(30 * i64::from(sequence - 1));
        assert_eq!(
            latest_invite_deadline(&posting, &invites, &policy(Some(30))),
            Some(expected),
            "sequence {sequence}"
        );
    }

    // The full rotation resolves to the last invite's window.
    let invites = vec![invite(1, None), invite(2, None), invite(3, None)];
    assert_eq!(
        latest_invite_deadline(&posting, &invites, &policy(Some(30))),
        Some(base() + Duration::minutes(60))
    );
}

#[test]
fn zero_delay_resolves_every_invite_to_base() {
    let posting = posting(Some(base()), None);
    let invites = vec![invite(1, None), invite(2, None), invite(5, None)];
    assert_eq!(
        latest_invite_deadline(&posting, &invites, &policy(Some(0))),
        Some(base())
    );
}

#[test]
fn unconfigured_delay_contributes_nothing() {
    let posting = posting(Some(base()), None);
    let invites = vec![invite(1, None), invite(2, None)];
    assert_eq!(latest_invite_deadline(&posting, &invites, &policy(None)), None);
}

#[test]
fn missing_base_time_contributes_nothing() {
    let posting = posting(None, None);
    let invites = vec![invite(1, None)];
    assert_eq!(
        latest_invite_deadline(&posting, &invites, &policy(Some(30))),
        None
    );

    // An explicit schedule still counts without any base time.
    let explicit = base() + Duration::hours(1);
    let invites = vec![invite(1, None), invite(2, Some(explicit))];
    assert_eq!(
        latest_invite_deadline(&posting, &invites, &policy(Some(30))),
        Some(explicit)
    );
}

#[test]
fn start_time_preferred_over_creation_time() {
    let created = base() - Duration::days(1);
    let posting = posting(Some(base()), Some(created));
    let invites = vec![invite(1, None)];
    assert_eq!(
        latest_invite_deadline(&posting, &invites, &policy(Some(30))),
        Some(base())
    );
}

#[test]
fn creation_time_is_the_fallback_base() {
    let created = base() - Duration::days(1);
    let posting = posting(None, Some(created));
    let invites = vec![invite(1, None)];
    assert_eq!(
        latest_invite_deadline(&posting, &invites, &policy(Some(30))),
        Some(created)
    );
}

#[test]
fn result_is_max_across_mixed_invites() {
    let posting = posting(Some(base()), None);
    let early_explicit = base() + Duration::minutes(10);
    let invites = vec![
        invite(1, Some(early_explicit)),
        invite(4, None), // derives base + 90min, the max
        invite(2, None),
    ];
    assert_eq!(
        latest_invite_deadline(&posting, &invites, &policy(Some(30))),
        Some(base() + Duration::minutes(90))
    );
}
