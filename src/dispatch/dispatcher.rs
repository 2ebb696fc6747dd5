//! Notification dispatcher: validation, payload construction, and
//! per-endpoint publish with an aggregate result.

use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;

use crate::gateway::push::PushGateway;
use crate::models::dispatch::{DispatchRequest, DispatchResult, BROADCAST};

use super::payload;
use super::resolver::EndpointResolver;

/// Publishes one message per resolved, enabled endpoint.
///
/// `dispatch` never returns an error: malformed input yields a failed
/// result before any I/O, and every per-endpoint failure is caught,
/// logged, and reflected in the delivered count.
pub struct NotificationDispatcher {
    resolver: EndpointResolver,
    push: Arc<dyn PushGateway>,
}

impl NotificationDispatcher {
    /// Create a dispatcher over a resolver and the push gateway.
    #[must_use]
    pub fn new(resolver: EndpointResolver, push: Arc<dyn PushGateway>) -> Self {
        Self { resolver, push }
    }

    /// Resolve recipients and publish the notification to each endpoint.
    pub async fn dispatch(&self, request: &DispatchRequest) -> DispatchResult {
        let recipients: BTreeSet<String> = request
            .recipients
            .iter()
            .filter(|recipient| !recipient.trim().is_empty())
            .cloned()
            .collect();

        if recipients.is_empty() {
            return DispatchResult::rejected(0, "no recipients provided");
        }
        if request.title.trim().is_empty() {
            return DispatchResult::rejected(recipients.len(), "title must not be empty");
        }
        if request.body.trim().is_empty() {
            return DispatchResult::rejected(recipients.len(), "body must not be empty");
        }

        let recipient_count = recipients.len();
        let broadcast_only = recipients.len() == 1 && recipients.contains(BROADCAST);
        if broadcast_only && request.org_id.is_none() {
            warn!("broadcast-only dispatch without org id resolves to no endpoints");
        }

        let dispatch_id = Uuid::new_v4();
        let extras = payload::extra_fields(
            request.category.as_deref(),
            request.posting_id.as_deref(),
            request.metadata.as_ref(),
        );
        let envelope = match payload::build_envelope(&request.title, &request.body, &extras) {
            Ok(envelope) => envelope,
            Err(err) => {
                warn!(%dispatch_id, %err, "failed to build notification payload");
                return DispatchResult {
                    success: true,
                    delivered: 0,
                    recipient_count,
                    message: Some("failed to build notification payload".into()),
                };
            }
        };

        let endpoints = self
            .resolver
            .resolve(&recipients, request.org_id.as_deref())
            .await;
        if endpoints.is_empty() {
            info!(%dispatch_id, recipient_count, "no active endpoints resolved");
            return DispatchResult {
                success: true,
                delivered: 0,
                recipient_count,
                message: Some("no active endpoints for the requested recipients".into()),
            };
        }

        let mut attempted = 0_usize;
        let mut delivered = 0_usize;
        for endpoint in &endpoints {
            let Some(target_arn) = self.resolver.ensure_endpoint_arn(endpoint).await else {
                continue;
            };
            attempted += 1;
            match self.push.publish(&target_arn, &envelope).await {
                Ok(()) => delivered += 1,
                Err(err) => {
                    warn!(%dispatch_id, endpoint_id = %endpoint.id, %err, "publish failed");
                }
            }
        }

        info!(
            %dispatch_id,
            recipient_count,
            resolved = endpoints.len(),
            attempted,
            delivered,
            "dispatch completed"
        );

        let message = (attempted == 0)
            .then(|| "no deliverable endpoints (missing platform configuration)".into());
        DispatchResult {
            success: true,
            delivered,
            recipient_count,
            message,
        }
    }
}
