//! Client for the remote citizen-registry service
//!
//! [`RegistryClient`] mediates every call to the registry API: it lazily
//! builds an authenticated operation client on first use, sends the
//! configured subscription and registry-configuration identifiers with every
//! request, and maps the service's status codes onto a small result
//! vocabulary. 404 is a normal outcome for callers probing whether a record
//! exists and becomes `None`; any other non-200 answer to a lookup or event
//! query means the subscription or configuration is wrong and becomes a
//! [`RegistryClientError::Configuration`].

use crate::config::ClientConfig;
use crate::error::{RegistryClientError, Result};
use crate::models::{
    CitizenDetail, CitizenEvent, CitizenSummary, RegistryProfile, SubscribedCitizenEventPage,
    SubscriptionRequest,
};
use crate::registry::auth::{CredentialProvider, CredentialProviderFactory};
use chrono::NaiveDate;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tokio::sync::OnceCell;
use url::Url;
use uuid::Uuid;

const SUBSCRIPTION_HEADER: &str = "x-subscription-id";
const CONFIGURATION_PARAM: &str = "configurationId";

/// Raised for non-200/404 answers when the service sent no textual body.
const FALLBACK_MESSAGE: &str =
    "the registry service rejected the request; check the subscription and registry configuration";

/// Client for the citizen-registry service.
///
/// The transport handle is supplied by the caller and stays under the
/// caller's lifetime management; this client never shuts it down. The
/// credential-provider factory is consulted exactly once, on the first
/// operation call, so issuance failures surface there rather than at
/// construction.
pub struct RegistryClient {
    transport: Client,
    factory: Arc<dyn CredentialProviderFactory>,
    config: ClientConfig,
    inner: OnceCell<OperationClient>,
}

impl RegistryClient {
    pub fn new(
        transport: Client,
        factory: Arc<dyn CredentialProviderFactory>,
        config: ClientConfig,
    ) -> Self {
        Self {
            transport,
            factory,
            config,
            inner: OnceCell::new(),
        }
    }

    /// Returns the memoized operation client, constructing it on first use.
    ///
    /// The once-cell serializes racing first callers, so the factory is
    /// never invoked twice even under concurrent first use.
    async fn operation_client(&self) -> Result<&OperationClient> {
        self.inner
            .get_or_try_init(|| async {
                tracing::debug!("constructing authenticated operation client");
                let credentials = self.factory.obtain(&self.transport).await?;
                Ok(OperationClient {
                    http: self.transport.clone(),
                    credentials,
                    config: self.config.clone(),
                })
            })
            .await
    }

    /// Looks up the condensed record for a registry number.
    ///
    /// Returns `None` when the registry holds no record for the number.
    pub async fn citizen_by_cpr(&self, cpr: &str) -> Result<Option<CitizenSummary>> {
        require_cpr(cpr)?;
        tracing::debug!("looking up citizen by registry number");
        self.lookup(&["v1", "citizens", cpr]).await
    }

    /// Looks up the full record for a registry number.
    pub async fn citizen_detail_by_cpr(&self, cpr: &str) -> Result<Option<CitizenDetail>> {
        require_cpr(cpr)?;
        tracing::debug!("looking up citizen detail by registry number");
        self.lookup(&["v1", "citizens", cpr, "details"]).await
    }

    /// Looks up the condensed record for an opaque citizen identifier.
    pub async fn citizen_by_id(&self, id: Uuid) -> Result<Option<CitizenSummary>> {
        tracing::debug!("looking up citizen by identifier");
        self.lookup(&["v1", "citizens", "by-id", &id.to_string()])
            .await
    }

    /// Looks up the full record for an opaque citizen identifier.
    pub async fn citizen_detail_by_id(&self, id: Uuid) -> Result<Option<CitizenDetail>> {
        tracing::debug!("looking up citizen detail by identifier");
        self.lookup(&["v1", "citizens", "by-id", &id.to_string(), "details"])
            .await
    }

    /// Retrieves every registry integration profile available to the
    /// subscription.
    ///
    /// Unlike the lookups, this performs no status branching: the body is
    /// decoded as-is and transport or serialization failures propagate
    /// unmapped.
    pub async fn configurations(&self) -> Result<Vec<RegistryProfile>> {
        tracing::debug!("listing registry configurations");
        let client = self.operation_client().await?;
        let response = client
            .request(Method::GET, &["v1", "configurations"])
            .await?
            .send()
            .await?;
        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// Subscribes to change events for a registry number.
    ///
    /// Returns whether the service accepted the subscription; non-success
    /// statuses become `false`, never an error.
    pub async fn subscribe_by_cpr(&self, cpr: &str) -> Result<bool> {
        require_cpr(cpr)?;
        tracing::debug!("subscribing by registry number");
        self.subscribe(&["v1", "subscriptions", "cpr", cpr]).await
    }

    /// Subscribes to change events for an opaque citizen identifier.
    pub async fn subscribe_by_id(&self, id: Uuid) -> Result<bool> {
        tracing::debug!("subscribing by identifier");
        self.subscribe(&["v1", "subscriptions", "by-id", &id.to_string()])
            .await
    }

    /// Removes the subscription for a registry number. Same boolean
    /// contract as the subscribe calls.
    pub async fn unsubscribe_by_cpr(&self, cpr: &str) -> Result<bool> {
        require_cpr(cpr)?;
        tracing::debug!("unsubscribing by registry number");
        let client = self.operation_client().await?;
        let response = client
            .request(Method::DELETE, &["v1", "subscriptions", "cpr", cpr])
            .await?
            .send()
            .await?;
        Ok(response.status().is_success())
    }

    /// Removes the subscription for an opaque citizen identifier.
    pub async fn unsubscribe_by_id(&self, id: Uuid) -> Result<bool> {
        tracing::debug!("unsubscribing by identifier");
        let client = self.operation_client().await?;
        let response = client
            .request(
                Method::DELETE,
                &["v1", "subscriptions", "by-id", &id.to_string()],
            )
            .await?
            .send()
            .await?;
        Ok(response.status().is_success())
    }

    /// Retrieves registry events in the given date window.
    ///
    /// Returns `None` when the service reports no events page for the
    /// window (404).
    pub async fn events(
        &self,
        from: NaiveDate,
        to: NaiveDate,
        page: u32,
        page_size: u32,
    ) -> Result<Option<Vec<CitizenEvent>>> {
        require_page(page)?;
        tracing::debug!("listing registry events");
        let client = self.operation_client().await?;
        let response = client
            .request(Method::GET, &["v1", "events"])
            .await?
            .query(&paging(from, to, page, page_size))
            .send()
            .await?;
        decode_optional(response).await
    }

    /// Retrieves events for subscribed records in the given date window,
    /// wrapped in a paginated envelope.
    pub async fn subscribed_events(
        &self,
        from: NaiveDate,
        to: NaiveDate,
        page: u32,
        page_size: u32,
    ) -> Result<Option<SubscribedCitizenEventPage>> {
        require_page(page)?;
        tracing::debug!("listing subscribed registry events");
        let client = self.operation_client().await?;
        let response = client
            .request(Method::GET, &["v1", "events", "subscribed"])
            .await?
            .query(&paging(from, to, page, page_size))
            .send()
            .await?;
        decode_optional(response).await
    }

    async fn lookup<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<Option<T>> {
        let client = self.operation_client().await?;
        let response = client.request(Method::GET, segments).await?.send().await?;
        decode_optional(response).await
    }

    async fn subscribe(&self, segments: &[&str]) -> Result<bool> {
        let body = SubscriptionRequest {
            configuration_id: self.config.configuration_id().to_string(),
        };
        let client = self.operation_client().await?;
        let response = client
            .request(Method::POST, segments)
            .await?
            .json(&body)
            .send()
            .await?;
        Ok(response.status().is_success())
    }
}

/// Authenticated handle used for every remote invocation.
///
/// Created once per [`RegistryClient`] and reused; the credential provider
/// and base address are never re-derived after construction.
struct OperationClient {
    http: Client,
    credentials: Arc<dyn CredentialProvider>,
    config: ClientConfig,
}

impl OperationClient {
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.config.base_address().clone();
        // The base address is validated as a base URL at configuration time.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn request(&self, method: Method, segments: &[&str]) -> Result<RequestBuilder> {
        let token = self.credentials.bearer_token().await?;
        Ok(self
            .http
            .request(method, self.endpoint(segments))
            .bearer_auth(token)
            .header(SUBSCRIPTION_HEADER, self.config.subscription_id())
            .query(&[(CONFIGURATION_PARAM, self.config.configuration_id())]))
    }
}

/// Shared status-to-outcome mapping for lookups and event queries.
///
/// 200 decodes the body, 404 is the deliberate absent result, anything
/// else is a configuration error carrying the service's own message when
/// it sent one.
async fn decode_optional<T: DeserializeOwned>(response: Response) -> Result<Option<T>> {
    match response.status() {
        StatusCode::OK => {
            let body = response.text().await?;
            Ok(Some(serde_json::from_str(&body)?))
        }
        StatusCode::NOT_FOUND => Ok(None),
        status => Err(configuration_failure(status, response).await),
    }
}

async fn configuration_failure(status: StatusCode, response: Response) -> RegistryClientError {
    let message = response
        .text()
        .await
        .ok()
        .map(|body| body.trim().to_string())
        .filter(|body| !body.is_empty())
        .unwrap_or_else(|| FALLBACK_MESSAGE.to_string());
    tracing::warn!(%status, "registry rejected the request");
    RegistryClientError::Configuration(message)
}

fn require_cpr(cpr: &str) -> Result<()> {
    if cpr.trim().is_empty() {
        return Err(RegistryClientError::Validation(
            "registry number must not be empty".to_string(),
        ));
    }
    Ok(())
}

fn require_page(page: u32) -> Result<()> {
    if page < 1 {
        return Err(RegistryClientError::Validation(
            "page number must be at least 1".to_string(),
        ));
    }
    Ok(())
}

fn paging(from: NaiveDate, to: NaiveDate, page: u32, page_size: u32) -> [(String, String); 4] {
    [
        ("from".to_string(), from.to_string()),
        ("to".to_string(), to.to_string()),
        ("page".to_string(), page.to_string()),
        ("pageSize".to_string(), page_size.to_string()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::auth::StaticTokenCredentials;

    fn operation_client(base: &str) -> OperationClient {
        OperationClient {
            http: Client::new(),
            credentials: Arc::new(StaticTokenCredentials::new("token")),
            config: ClientConfig::new("sub-1", "cfg-1", Url::parse(base).unwrap()).unwrap(),
        }
    }

    #[test]
    fn endpoint_joins_segments_under_base_path() {
        let client = operation_client("https://registry.example.com/api");
        let url = client.endpoint(&["v1", "citizens", "0101701234"]);
        assert_eq!(url.as_str(), "https://registry.example.com/api/v1/citizens/0101701234");
    }

    #[test]
    fn endpoint_escapes_unsafe_segment_characters() {
        let client = operation_client("https://registry.example.com");
        let url = client.endpoint(&["v1", "citizens", "01 01"]);
        assert_eq!(url.path(), "/v1/citizens/01%2001");
    }

    #[test]
    fn paging_parameters_use_iso_dates() {
        let from = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let to = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();
        let params = paging(from, to, 2, 50);
        assert_eq!(params[0], ("from".to_string(), "2024-01-01".to_string()));
        assert_eq!(params[1], ("to".to_string(), "2024-01-31".to_string()));
        assert_eq!(params[2], ("page".to_string(), "2".to_string()));
        assert_eq!(params[3], ("pageSize".to_string(), "50".to_string()));
    }

    #[test]
    fn blank_registry_number_is_a_validation_error() {
        assert!(matches!(
            require_cpr("   "),
            Err(RegistryClientError::Validation(_))
        ));
        assert!(require_cpr("0101701234").is_ok());
    }

    #[test]
    fn zero_page_is_a_validation_error() {
        assert!(matches!(
            require_page(0),
            Err(RegistryClientError::Validation(_))
        ));
        assert!(require_page(1).is_ok());
    }
}
