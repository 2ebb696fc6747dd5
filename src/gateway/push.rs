//! Push gateway: platform endpoint registration and message publish.

use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::config::PushConfig;
use crate::{AppError, Result};

/// Structure flag marking a publish body as a JSON-composite message.
pub const MESSAGE_STRUCTURE_JSON: &str = "json";

/// Platform-keyed message envelope for one publish call.
///
/// `default` carries the plain-text fallback; the platform variants are
/// pre-serialized JSON payload strings, included when built.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MessageEnvelope {
    /// Plain-text fallback, always the notification body.
    pub default: String,
    /// Serialized iOS payload.
    #[serde(rename = "APNS", skip_serializing_if = "Option::is_none")]
    pub apns: Option<String>,
    /// Serialized Android payload.
    #[serde(rename = "GCM", skip_serializing_if = "Option::is_none")]
    pub gcm: Option<String>,
}

/// Platform-scoped endpoint registration and message publish.
pub trait PushGateway: Send + Sync {
    /// Register a device token under a platform application, returning the
    /// opaque platform endpoint identifier.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Push`](crate::AppError::Push) if registration fails, or
    /// [`AppError::Parse`](crate::AppError::Parse) if the response lacks an identifier.
    fn create_platform_endpoint(
        &self,
        application_arn: &str,
        device_token: &str,
    ) -> Pin<Box<dyn Future<Output = Result<String>> + Send + '_>>;

    /// Publish a JSON-composite message to one platform endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Push`](crate::AppError::Push) if the publish fails.
    fn publish(
        &self,
        target_arn: &str,
        message: &MessageEnvelope,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>>;
}

/// Production push gateway client over HTTP.
#[derive(Clone)]
pub struct HttpPushGateway {
    http: reqwest::Client,
    endpoint: String,
}

impl HttpPushGateway {
    /// Create a client from validated configuration.
    #[must_use]
    pub fn new(config: &PushConfig, http: reqwest::Client) -> Self {
        Self {
            http,
            endpoint: config.endpoint.clone(),
        }
    }
}

impl PushGateway for HttpPushGateway {
    fn create_platform_endpoint(
        &self,
        application_arn: &str,
        device_token: &str,
    ) -> Pin<Box<dyn Future<Output = Result<String>> + Send + '_>> {
        let application_arn = application_arn.to_owned();
        let device_token = device_token.to_owned();
        Box::pin(async move {
            let response: CreateEndpointResponse = self
                .http
                .post(format!("{}/platform-endpoints", self.endpoint))
                .json(&json!({
                    "applicationArn": application_arn,
                    "deviceToken": device_token,
                }))
                .send()
                .await
                .map_err(|err| AppError::Push(format!("endpoint registration failed: {err}")))?
                .error_for_status()
                .map_err(|err| AppError::Push(format!("endpoint registration rejected: {err}")))?
                .json()
                .await
                .map_err(|err| AppError::Parse(format!("unreadable registration response: {err}")))?;

            response
                .endpoint_arn
                .filter(|arn| !arn.is_empty())
                .ok_or_else(|| {
                    AppError::Parse("registration response missing endpointArn".into())
                })
        })
    }

    fn publish(
        &self,
        target_arn: &str,
        message: &MessageEnvelope,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        let target_arn = target_arn.to_owned();
        let message = message.clone();
        Box::pin(async move {
            let body = serde_json::to_string(&message)?;
            self.http
                .post(format!("{}/publish", self.endpoint))
                .json(&json!({
                    "targetArn": target_arn,
                    "message": body,
                    "messageStructure": MESSAGE_STRUCTURE_JSON,
                }))
                .send()
                .await
                .map_err(|err| AppError::Push(format!("publish failed: {err}")))?
                .error_for_status()
                .map_err(|err| AppError::Push(format!("publish rejected: {err}")))?;
            Ok(())
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateEndpointResponse {
    #[serde(default)]
    endpoint_arn: Option<String>,
}
