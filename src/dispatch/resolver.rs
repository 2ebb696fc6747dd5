//! Recipient-to-endpoint resolution with lazy platform ARN materialization.

use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;

use futures_util::future::join_all;
use tracing::{debug, warn};

use crate::config::{DispatchConfig, PushConfig};
use crate::gateway::data::DataGateway;
use crate::gateway::push::PushGateway;
use crate::models::dispatch::BROADCAST;
use crate::models::endpoint::Endpoint;

/// Resolves a recipient set into deduplicated, delivery-eligible endpoints.
///
/// All lookups run concurrently and degrade independently: a failed fetch
/// contributes nothing and never aborts a sibling lookup.
pub struct EndpointResolver {
    data: Arc<dyn DataGateway>,
    push: Arc<dyn PushGateway>,
    push_config: PushConfig,
    limits: DispatchConfig,
}

impl EndpointResolver {
    /// Create a resolver over the two gateways.
    #[must_use]
    pub fn new(
        data: Arc<dyn DataGateway>,
        push: Arc<dyn PushGateway>,
        push_config: PushConfig,
        limits: DispatchConfig,
    ) -> Self {
        Self {
            data,
            push,
            push_config,
            limits,
        }
    }

    /// Resolve a deduplicated recipient set to active endpoints.
    ///
    /// The broadcast marker expands to an org-scoped paginated listing
    /// (bounded by the configured cap); concrete user ids resolve through
    /// bounded single-page lookups. Results merge with first-occurrence-wins
    /// dedup by endpoint id, then endpoints explicitly disabled are dropped.
    pub async fn resolve(
        &self,
        recipients: &BTreeSet<String>,
        org_id: Option<&str>,
    ) -> Vec<Endpoint> {
        let wants_broadcast = recipients.iter().any(|r| r.as_str() == BROADCAST);
        let user_ids: Vec<&String> = recipients
            .iter()
            .filter(|r| r.as_str() != BROADCAST)
            .collect();

        let broadcast_lookup = async {
            if !wants_broadcast {
                return Vec::new();
            }
            match org_id {
                Some(org) => self.fetch_org_endpoints(org).await,
                None => {
                    warn!("broadcast requested without an org scope, resolving to nothing");
                    Vec::new()
                }
            }
        };
        let user_lookups = join_all(
            user_ids
                .into_iter()
                .map(|user| self.fetch_user_endpoints(user)),
        );

        let (broadcast_endpoints, user_endpoints) = tokio::join!(broadcast_lookup, user_lookups);

        let mut seen: HashSet<String> = HashSet::new();
        let mut resolved = Vec::new();
        for endpoint in user_endpoints
            .into_iter()
            .flatten()
            .chain(broadcast_endpoints)
        {
            if !endpoint.is_active() {
                debug!(endpoint_id = %endpoint.id, "endpoint disabled, dropped");
                continue;
            }
            if seen.insert(endpoint.id.clone()) {
                resolved.push(endpoint);
            }
        }
        resolved
    }

    /// Return the endpoint's platform ARN, registering and caching one when
    /// absent.
    ///
    /// Skips the endpoint (returns `None`) when its platform has no
    /// configured application ARN or when registration or persistence
    /// fails; each skip is logged, never fatal.
    pub async fn ensure_endpoint_arn(&self, endpoint: &Endpoint) -> Option<String> {
        if let Some(arn) = endpoint
            .platform_endpoint_arn
            .as_ref()
            .filter(|arn| !arn.is_empty())
        {
            return Some(arn.clone());
        }

        let platform = endpoint.platform_or_default();
        let Some(application_arn) = self.push_config.application_arn(platform) else {
            warn!(
                endpoint_id = %endpoint.id,
                ?platform,
                "no application ARN configured for platform, skipping endpoint"
            );
            return None;
        };

        let arn = match self
            .push
            .create_platform_endpoint(application_arn, &endpoint.device_token)
            .await
        {
            Ok(arn) => arn,
            Err(err) => {
                warn!(endpoint_id = %endpoint.id, %err, "platform endpoint registration failed");
                return None;
            }
        };

        if let Err(err) = self.data.set_endpoint_arn(&endpoint.id, &arn).await {
            warn!(endpoint_id = %endpoint.id, %err, "failed to persist endpoint ARN, skipping");
            return None;
        }

        Some(arn)
    }

    /// Org-wide paginated listing, capped at the configured maximum.
    async fn fetch_org_endpoints(&self, org_id: &str) -> Vec<Endpoint> {
        let mut endpoints = Vec::new();
        let mut next_token: Option<String> = None;
        loop {
            let page = match self
                .data
                .list_endpoints_by_org(org_id, self.limits.broadcast_page_size, next_token)
                .await
            {
                Ok(page) => page,
                Err(err) => {
                    warn!(org_id, %err, "broadcast endpoint listing failed, using partial results");
                    break;
                }
            };
            endpoints.extend(page.items);
            if endpoints.len() >= self.limits.broadcast_max_endpoints {
                warn!(
                    org_id,
                    cap = self.limits.broadcast_max_endpoints,
                    "broadcast endpoint cap reached, truncating"
                );
                endpoints.truncate(self.limits.broadcast_max_endpoints);
                break;
            }
            match page.next_token {
                Some(token) => next_token = Some(token),
                None => break,
            }
        }
        endpoints
    }

    /// Single bounded page of one user's endpoints; failures degrade to
    /// an empty contribution.
    async fn fetch_user_endpoints(&self, user_id: &str) -> Vec<Endpoint> {
        match self
            .data
            .list_endpoints_by_user(user_id, self.limits.user_page_limit)
            .await
        {
            Ok(endpoints) => endpoints,
            Err(err) => {
                warn!(user_id, %err, "user endpoint lookup failed, contributing none");
                Vec::new()
            }
        }
    }
}
