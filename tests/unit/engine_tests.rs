//! Unit tests for the escalation transition rule.
//!
//! `EscalationEngine::evaluate` is pure, so the precedence order is
//! checked here with a pinned clock; the full scan paths live in the
//! integration suite.

use chrono::{DateTime, Duration, TimeZone, Utc};
use serde_json::json;

use shift_sentinel::escalation::engine::{EscalationEngine, EscalationReason};
use shift_sentinel::models::invite::{Invite, InviteStatus};
use shift_sentinel::models::posting::{Posting, PostingState};

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).single().unwrap()
}

fn posting(invites: Vec<Invite>) -> Posting {
    Posting {
        id: "p1".into(),
        org_id: "org-1".into(),
        title: "Harbor Patrol Overtime".into(),
        created_by: "supervisor-1".into(),
        starts_at: None,
        created_at: Some(now() - Duration::days(1)),
        policy: serde_json::Value::Null,
        needs_escalation: false,
        state: PostingState::Open,
        invites,
    }
}

fn invite(status: InviteStatus, sequence: u32) -> Invite {
    Invite {
        id: format!("i{sequence}"),
        posting_id: "p1".into(),
        status,
        sequence,
        scheduled_at: None,
    }
}

#[test]
fn already_flagged_posting_is_skipped() {
    let mut posting = posting(vec![invite(InviteStatus::Pending, 1)]);
    posting.needs_escalation = true;
    posting.policy = json!({ "responseDeadline": (now() - Duration::hours(1)).to_rfc3339() });
    assert_eq!(EscalationEngine::evaluate(&posting, now()), None);
}

#[test]
fn posting_without_invites_is_skipped() {
    let mut posting = posting(Vec::new());
    posting.policy = json!({ "responseDeadline": (now() - Duration::hours(1)).to_rfc3339() });
    assert_eq!(EscalationEngine::evaluate(&posting, now()), None);
}

#[test]
fn accepted_invite_short_circuits_everything() {
    let mut posting = posting(vec![
        invite(InviteStatus::Accepted, 1),
        invite(InviteStatus::Expired, 2),
    ]);
    posting.policy = json!({
        "responseDeadline": (now() - Duration::hours(3)).to_rfc3339(),
        "inviteDelayMinutes": 0,
    });
    assert_eq!(EscalationEngine::evaluate(&posting, now()), None);
}

#[test]
fn past_deadline_escalates_with_deadline_reason() {
    let mut posting = posting(vec![invite(InviteStatus::Pending, 1)]);
    posting.policy = json!({ "responseDeadline": (now() - Duration::minutes(1)).to_rfc3339() });
    assert_eq!(
        EscalationEngine::evaluate(&posting, now()),
        Some(EscalationReason::Deadline)
    );
}

#[test]
fn deadline_takes_precedence_over_rotation() {
    let mut posting = posting(vec![invite(InviteStatus::Pending, 1)]);
    posting.starts_at = Some(now() - Duration::hours(2));
    posting.policy = json!({
        "responseDeadline": (now() - Duration::hours(1)).to_rfc3339(),
        "inviteDelayMinutes": 30,
    });
    assert_eq!(
        EscalationEngine::evaluate(&posting, now()),
        Some(EscalationReason::Deadline)
    );
}

#[test]
fn lapsed_rotation_escalates_when_deadline_is_still_open() {
    let mut posting = posting(vec![
        invite(InviteStatus::Declined, 1),
        invite(InviteStatus::Pending, 2),
    ]);
    posting.starts_at = Some(now() - Duration::minutes(45));
    posting.policy = json!({
        "responseDeadline": (now() + Duration::hours(4)).to_rfc3339(),
        "inviteDelayMinutes": 30,
    });
    assert_eq!(
        EscalationEngine::evaluate(&posting, now()),
        Some(EscalationReason::RotationExhausted)
    );
}

#[test]
fn no_deadline_and_unconfigured_rotation_never_escalates() {
    let posting = posting(vec![invite(InviteStatus::Pending, 1)]);
    assert_eq!(EscalationEngine::evaluate(&posting, now()), None);
}

#[test]
fn malformed_policy_still_allows_explicit_schedules() {
    let mut posting = posting(vec![invite(InviteStatus::Pending, 1)]);
    posting.policy = json!("not an object");
    posting.invites[0].scheduled_at = Some(now() - Duration::minutes(10));
    assert_eq!(
        EscalationEngine::evaluate(&posting, now()),
        Some(EscalationReason::RotationExhausted)
    );
}

#[test]
fn reason_labels_are_stable() {
    assert_eq!(EscalationReason::Deadline.to_string(), "deadline");
    assert_eq!(
        EscalationReason::RotationExhausted.to_string(),
        "rotation-exhausted"
    );
}
