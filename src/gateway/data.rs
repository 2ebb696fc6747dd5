//! Remote data gateway: typed query/mutation access to postings, invites,
//! and device endpoints over a GraphQL-style JSON protocol.

use std::future::Future;
use std::pin::Pin;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;

use crate::config::DataGatewayConfig;
use crate::models::endpoint::Endpoint;
use crate::models::posting::Posting;
use crate::{AppError, Result};

use super::Page;

/// Typed access to the remote record store.
///
/// List operations are cursor-paginated ([`Page`]); callers continue while
/// a token is present. The two mutations cover the only fields this
/// service writes: a posting's escalation flag and an endpoint's cached
/// platform ARN.
pub trait DataGateway: Send + Sync {
    /// List open postings not yet flagged for escalation, invites nested.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Gateway`](crate::AppError::Gateway) if the query fails.
    fn list_open_postings(
        &self,
        limit: usize,
        next_token: Option<String>,
    ) -> Pin<Box<dyn Future<Output = Result<Page<Posting>>> + Send + '_>>;

    /// List device endpoints registered under an organization.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Gateway`](crate::AppError::Gateway) if the query fails.
    fn list_endpoints_by_org(
        &self,
        org_id: &str,
        limit: usize,
        next_token: Option<String>,
    ) -> Pin<Box<dyn Future<Output = Result<Page<Endpoint>>> + Send + '_>>;

    /// List device endpoints registered by one user (single bounded page).
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Gateway`](crate::AppError::Gateway) if the query fails.
    fn list_endpoints_by_user(
        &self,
        user_id: &str,
        limit: usize,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<Endpoint>>> + Send + '_>>;

    /// Flag a posting as needing human intervention.
    ///
    /// The flag is monotonic; this service never writes `false`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Gateway`](crate::AppError::Gateway) if the mutation fails.
    fn set_needs_escalation(
        &self,
        posting_id: &str,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>>;

    /// Persist a resolved platform endpoint ARN onto an endpoint record.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Gateway`](crate::AppError::Gateway) if the mutation fails.
    fn set_endpoint_arn(
        &self,
        endpoint_id: &str,
        arn: &str,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>>;
}

const LIST_OPEN_POSTINGS: &str = "query ListOpenPostings($limit: Int!, $nextToken: String) {\
 listPostings(filter: {state: {eq: OPEN}, needsEscalation: {eq: false}},\
 limit: $limit, nextToken: $nextToken) {\
 items { id orgId title createdBy startsAt createdAt policy needsEscalation state\
 invites { items { id postingId status sequence scheduledAt } } }\
 nextToken } }";

const ENDPOINTS_BY_ORG: &str = "query EndpointsByOrg($orgId: ID!, $limit: Int!, $nextToken: String) {\
 endpointsByOrg(orgId: $orgId, limit: $limit, nextToken: $nextToken) {\
 items { id userId orgId deviceToken platform enabled platformEndpointArn lastUsedAt }\
 nextToken } }";

const ENDPOINTS_BY_USER: &str = "query EndpointsByUser($userId: ID!, $limit: Int!) {\
 endpointsByUser(userId: $userId, limit: $limit) {\
 items { id userId orgId deviceToken platform enabled platformEndpointArn lastUsedAt }\
 nextToken } }";

const SET_NEEDS_ESCALATION: &str = "mutation SetNeedsEscalation($id: ID!) {\
 updatePosting(input: {id: $id, needsEscalation: true}) { id needsEscalation } }";

const SET_ENDPOINT_ARN: &str = "mutation SetEndpointArn($id: ID!, $arn: String!) {\
 updateEndpoint(input: {id: $id, platformEndpointArn: $arn}) { id platformEndpointArn } }";

/// Production data gateway client over HTTP.
#[derive(Clone)]
pub struct HttpDataGateway {
    http: reqwest::Client,
    endpoint: String,
    region: String,
    api_key: String,
}

impl HttpDataGateway {
    /// Create a client from validated configuration.
    #[must_use]
    pub fn new(config: &DataGatewayConfig, http: reqwest::Client) -> Self {
        Self {
            http,
            endpoint: config.endpoint.clone(),
            region: config.region.clone(),
            api_key: config.api_key.clone(),
        }
    }

    /// Execute one query/mutation and unwrap its data payload.
    async fn execute<T: DeserializeOwned>(
        &self,
        query: &'static str,
        variables: serde_json::Value,
    ) -> Result<T> {
        let response = self
            .http
            .post(&self.endpoint)
            .header("x-api-key", &self.api_key)
            .header("x-gateway-region", &self.region)
            .json(&json!({ "query": query, "variables": variables }))
            .send()
            .await
            .map_err(|err| AppError::Gateway(format!("request failed: {err}")))?
            .error_for_status()
            .map_err(|err| AppError::Gateway(format!("gateway returned error status: {err}")))?;

        let envelope: GraphQlResponse<T> = response
            .json()
            .await
            .map_err(|err| AppError::Gateway(format!("unreadable gateway response: {err}")))?;

        if !envelope.errors.is_empty() {
            let messages: Vec<String> = envelope.errors.into_iter().map(|e| e.message).collect();
            return Err(AppError::Gateway(messages.join("; ")));
        }

        envelope
            .data
            .ok_or_else(|| AppError::Gateway("gateway response missing data".into()))
    }
}

impl DataGateway for HttpDataGateway {
    fn list_open_postings(
        &self,
        limit: usize,
        next_token: Option<String>,
    ) -> Pin<Box<dyn Future<Output = Result<Page<Posting>>> + Send + '_>> {
        Box::pin(async move {
            let data: ListPostingsData = self
                .execute(
                    LIST_OPEN_POSTINGS,
                    json!({ "limit": limit, "nextToken": next_token }),
                )
                .await?;
            Ok(data.list_postings)
        })
    }

    fn list_endpoints_by_org(
        &self,
        org_id: &str,
        limit: usize,
        next_token: Option<String>,
    ) -> Pin<Box<dyn Future<Output = Result<Page<Endpoint>>> + Send + '_>> {
        let org_id = org_id.to_owned();
        Box::pin(async move {
            let data: EndpointsByOrgData = self
                .execute(
                    ENDPOINTS_BY_ORG,
                    json!({ "orgId": org_id, "limit": limit, "nextToken": next_token }),
                )
                .await?;
            Ok(data.endpoints_by_org)
        })
    }

    fn list_endpoints_by_user(
        &self,
        user_id: &str,
        limit: usize,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<Endpoint>>> + Send + '_>> {
        let user_id = user_id.to_owned();
        Box::pin(async move {
            let data: EndpointsByUserData = self
                .execute(
                    ENDPOINTS_BY_USER,
                    json!({ "userId": user_id, "limit": limit }),
                )
                .await?;
            Ok(data.endpoints_by_user.items)
        })
    }

    fn set_needs_escalation(
        &self,
        posting_id: &str,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        let posting_id = posting_id.to_owned();
        Box::pin(async move {
            let _: serde_json::Value = self
                .execute(SET_NEEDS_ESCALATION, json!({ "id": posting_id }))
                .await?;
            Ok(())
        })
    }

    fn set_endpoint_arn(
        &self,
        endpoint_id: &str,
        arn: &str,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        let endpoint_id = endpoint_id.to_owned();
        let arn = arn.to_owned();
        Box::pin(async move {
            let _: serde_json::Value = self
                .execute(SET_ENDPOINT_ARN, json!({ "id": endpoint_id, "arn": arn }))
                .await?;
            Ok(())
        })
    }
}

#[derive(Debug, Deserialize)]
struct GraphQlResponse<T> {
    #[serde(default = "Option::default")]
    data: Option<T>,
    #[serde(default = "Vec::new")]
    errors: Vec<GraphQlError>,
}

#[derive(Debug, Deserialize)]
struct GraphQlError {
    message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListPostingsData {
    list_postings: Page<Posting>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EndpointsByOrgData {
    endpoints_by_org: Page<Endpoint>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EndpointsByUserData {
    endpoints_by_user: Page<Endpoint>,
}
