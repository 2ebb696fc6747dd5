//! Device endpoint model for push delivery.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Device platform for a registered push endpoint.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum Platform {
    /// Apple Push Notification service devices.
    Ios,
    /// Firebase Cloud Messaging devices.
    Android,
}

/// A device-specific address capable of receiving a push notification.
///
/// Created by the external device-registration flow. The cached platform
/// endpoint ARN is the only field this service writes, materialized lazily
/// on first dispatch and persisted back through the data gateway.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Endpoint {
    /// Unique record identifier.
    pub id: String,
    /// Owning user identifier.
    pub user_id: String,
    /// Owning organization, when scoped.
    #[serde(default)]
    pub org_id: Option<String>,
    /// Raw device token from platform registration.
    pub device_token: String,
    /// Device platform; `None` when missing or unrecognized upstream.
    #[serde(default, deserialize_with = "super::deserialize_platform")]
    pub platform: Option<Platform>,
    /// Whether the device opted into notifications; absent means enabled.
    #[serde(default)]
    pub enabled: Option<bool>,
    /// Cached platform endpoint ARN, populated on first dispatch.
    #[serde(default)]
    pub platform_endpoint_arn: Option<String>,
    /// Last successful delivery time.
    #[serde(default)]
    pub last_used_at: Option<DateTime<Utc>>,
}

impl Endpoint {
    /// Whether the endpoint may be dispatched to.
    ///
    /// Only an explicit `enabled = false` excludes an endpoint.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.enabled != Some(false)
    }

    /// Resolve the device platform, defaulting to iOS when unset.
    ///
    /// The fallback mirrors upstream registration behavior; it is logged so
    /// misregistered Android devices remain visible in diagnostics.
    #[must_use]
    pub fn platform_or_default(&self) -> Platform {
        self.platform.unwrap_or_else(|| {
            warn!(endpoint_id = %self.id, "endpoint has no recognized platform, assuming iOS");
            Platform::Ios
        })
    }
}
