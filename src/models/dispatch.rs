//! Dispatch request and result types for the notification surface.

use serde::{Deserialize, Serialize};

/// Recipient marker addressing every endpoint in the request's organization.
pub const BROADCAST: &str = "*";

/// An on-demand notification dispatch request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DispatchRequest {
    /// Target user identifiers, or [`BROADCAST`] for an org-wide send.
    pub recipients: Vec<String>,
    /// Organization scope, required for broadcast resolution.
    #[serde(default)]
    pub org_id: Option<String>,
    /// Notification title.
    pub title: String,
    /// Notification body; also the envelope's plain-text default.
    pub body: String,
    /// Optional notification category tag.
    #[serde(default)]
    pub category: Option<String>,
    /// Posting the notification refers to, when any.
    #[serde(default)]
    pub posting_id: Option<String>,
    /// Structured metadata forwarded in platform payloads.
    #[serde(default)]
    pub metadata: Option<serde_json::Value>,
}

/// Aggregate outcome of one dispatch call.
///
/// `success` reflects input validation only; individual delivery failures
/// are visible through `delivered` falling short of the resolved endpoint
/// count, never as a failed result.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DispatchResult {
    /// Whether the request was well-formed.
    pub success: bool,
    /// Endpoints successfully published to.
    pub delivered: usize,
    /// Size of the deduplicated input recipient set.
    pub recipient_count: usize,
    /// Human-readable reason, set only on validation failure or when no
    /// active endpoint was available.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl DispatchResult {
    /// Build a failed result for a request rejected before any I/O.
    #[must_use]
    pub fn rejected(recipient_count: usize, message: impl Into<String>) -> Self {
        Self {
            success: false,
            delivered: 0,
            recipient_count,
            message: Some(message.into()),
        }
    }
}
