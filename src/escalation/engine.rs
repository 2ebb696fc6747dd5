//! Escalation engine: scans open postings and flags the ones whose
//! deadline or invite rotation has lapsed without an acceptance.

use std::fmt::{Display, Formatter};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::dispatch::NotificationDispatcher;
use crate::gateway::data::DataGateway;
use crate::models::dispatch::DispatchRequest;
use crate::models::invite::InviteStatus;
use crate::models::posting::Posting;
use crate::Result;

use super::clock;

/// Why a posting was flagged for human intervention.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EscalationReason {
    /// The policy's explicit response deadline passed.
    Deadline,
    /// The last-scheduled invite's window passed.
    RotationExhausted,
}

impl Display for EscalationReason {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Deadline => write!(f, "deadline"),
            Self::RotationExhausted => write!(f, "rotation-exhausted"),
        }
    }
}

/// Structured outcome of one scan invocation.
///
/// Always produced, even on total failure; `error` is set only when the
/// scan could not fetch anything at all.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ScanSummary {
    /// Postings examined this scan.
    pub processed: usize,
    /// Postings flagged this scan.
    pub escalated: usize,
    /// Total-failure diagnostic, absent on any partial or full success.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Scans open postings on a fixed cadence and escalates lapsed ones.
///
/// Holds no state between scans beyond the escalation flag persisted
/// through the data gateway; every evaluation re-reads the posting's
/// current policy document.
pub struct EscalationEngine {
    data: Arc<dyn DataGateway>,
    dispatcher: Arc<NotificationDispatcher>,
    page_size: usize,
    max_postings: usize,
}

impl EscalationEngine {
    /// Create an engine over the data gateway and dispatcher.
    #[must_use]
    pub fn new(
        data: Arc<dyn DataGateway>,
        dispatcher: Arc<NotificationDispatcher>,
        page_size: usize,
        max_postings: usize,
    ) -> Self {
        Self {
            data,
            dispatcher,
            page_size,
            max_postings,
        }
    }

    /// Decide whether a posting needs escalation at `now`.
    ///
    /// Precedence: an already-flagged posting, an empty rotation, or any
    /// accepted invite short-circuits to no transition; then the explicit
    /// response deadline, then the rotation deadline.
    #[must_use]
    pub fn evaluate(posting: &Posting, now: DateTime<Utc>) -> Option<EscalationReason> {
        if posting.needs_escalation {
            return None;
        }
        if posting.invites.is_empty() {
            return None;
        }
        if posting
            .invites
            .iter()
            .any(|invite| invite.status == InviteStatus::Accepted)
        {
            return None;
        }

        let policy = posting.policy_snapshot();
        if let Some(deadline) = policy.response_deadline {
            if now > deadline {
                return Some(EscalationReason::Deadline);
            }
        }
        if let Some(deadline) = clock::latest_invite_deadline(posting, &posting.invites, &policy) {
            if now > deadline {
                return Some(EscalationReason::RotationExhausted);
            }
        }
        None
    }

    /// Run one full scan: fetch all pages, evaluate each posting, flag and
    /// notify the lapsed ones.
    ///
    /// Never returns an error: per-posting failures are logged and the
    /// scan continues; a listing failure before anything was fetched is
    /// reported through the summary's `error` field.
    pub async fn scan(&self) -> ScanSummary {
        let (postings, fetch_error) = self.fetch_open_postings().await;
        if let Some(error) = fetch_error {
            return ScanSummary {
                processed: 0,
                escalated: 0,
                error: Some(error),
            };
        }

        let now = Utc::now();
        let mut processed = 0_usize;
        let mut escalated = 0_usize;
        for posting in &postings {
            processed += 1;
            match self.process_posting(posting, now).await {
                Ok(true) => escalated += 1,
                Ok(false) => {}
                Err(err) => {
                    warn!(posting_id = %posting.id, %err, "posting evaluation failed, continuing");
                }
            }
        }

        info!(processed, escalated, "escalation scan completed");
        ScanSummary {
            processed,
            escalated,
            error: None,
        }
    }

    /// Evaluate one posting; on timeout, persist the flag and notify the
    /// creator.
    ///
    /// The flag write is the success criterion: its failure surfaces as an
    /// error (the posting stays unflagged and is retried next scan), while
    /// a notification failure is logged and the posting still counts as
    /// escalated.
    async fn process_posting(&self, posting: &Posting, now: DateTime<Utc>) -> Result<bool> {
        let Some(reason) = Self::evaluate(posting, now) else {
            return Ok(false);
        };

        info!(posting_id = %posting.id, %reason, "posting timed out, escalating");
        self.data.set_needs_escalation(&posting.id).await?;
        self.notify_creator(posting, reason).await;
        Ok(true)
    }

    /// Best-effort escalation notice to the posting's creator.
    async fn notify_creator(&self, posting: &Posting, reason: EscalationReason) {
        let cause = match reason {
            EscalationReason::Deadline => "its response deadline has passed",
            EscalationReason::RotationExhausted => "its invite rotation is exhausted",
        };
        let request = DispatchRequest {
            recipients: vec![posting.created_by.clone()],
            org_id: Some(posting.org_id.clone()),
            title: "Overtime posting needs attention".into(),
            body: format!(
                "\"{}\" has no accepted invites and {cause}. Manual assignment is required.",
                posting.title
            ),
            category: Some("escalation".into()),
            posting_id: Some(posting.id.clone()),
            metadata: None,
        };

        let result = self.dispatcher.dispatch(&request).await;
        if result.delivered == 0 {
            warn!(
                posting_id = %posting.id,
                message = result.message.as_deref().unwrap_or("publish failures"),
                "escalation notice not delivered"
            );
        }
    }

    /// Exhaust the open-posting listing before processing, bounded by the
    /// configured cap.
    ///
    /// A page failure mid-listing degrades to the pages already fetched;
    /// a failure before anything was fetched is a total failure and is
    /// returned as the error string.
    async fn fetch_open_postings(&self) -> (Vec<Posting>, Option<String>) {
        let mut postings: Vec<Posting> = Vec::new();
        let mut next_token: Option<String> = None;
        loop {
            let page = match self
                .data
                .list_open_postings(self.page_size, next_token)
                .await
            {
                Ok(page) => page,
                Err(err) => {
                    if postings.is_empty() {
                        return (postings, Some(err.to_string()));
                    }
                    warn!(%err, "posting listing page failed, processing partial results");
                    break;
                }
            };
            postings.extend(page.items);
            if postings.len() >= self.max_postings {
                warn!(
                    cap = self.max_postings,
                    "open posting cap reached, truncating scan"
                );
                postings.truncate(self.max_postings);
                break;
            }
            match page.next_token {
                Some(token) => next_token = Some(token),
                None => break,
            }
        }
        (postings, None)
    }
}
