//! Authentication seam for registry access
//!
//! The client never mints tokens itself. It asks a [`CredentialProviderFactory`]
//! for a [`CredentialProvider`] exactly once, on the first operation call,
//! and from then on requests a bearer token from that provider for every
//! outbound call. Token-issuance failures propagate to the caller unmapped.

use crate::error::{RegistryClientError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::sync::Arc;
use url::Url;

/// Mints bearer tokens used to authorize registry requests.
#[async_trait]
pub trait CredentialProvider: Send + Sync {
    async fn bearer_token(&self) -> Result<String>;
}

/// Derives a [`CredentialProvider`] from the shared transport handle.
///
/// Called at most once per [`RegistryClient`](crate::RegistryClient)
/// lifetime; the produced provider is reused for every subsequent call.
#[async_trait]
pub trait CredentialProviderFactory: Send + Sync {
    async fn obtain(&self, transport: &Client) -> Result<Arc<dyn CredentialProvider>>;
}

/// Credential provider for a pre-issued, long-lived token.
///
/// Doubles as its own factory, for callers that already hold a token and
/// have no issuance step.
#[derive(Debug, Clone)]
pub struct StaticTokenCredentials {
    token: String,
}

impl StaticTokenCredentials {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

#[async_trait]
impl CredentialProvider for StaticTokenCredentials {
    async fn bearer_token(&self) -> Result<String> {
        Ok(self.token.clone())
    }
}

#[async_trait]
impl CredentialProviderFactory for StaticTokenCredentials {
    async fn obtain(&self, _transport: &Client) -> Result<Arc<dyn CredentialProvider>> {
        Ok(Arc::new(self.clone()))
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    token: Option<String>,
    access_token: Option<String>,
}

/// Factory that exchanges basic-auth credentials for a bearer token at a
/// token endpoint, using the transport handle supplied by the client.
pub struct TokenEndpointCredentials {
    endpoint: Url,
    username: String,
    password: String,
}

impl TokenEndpointCredentials {
    pub fn new(endpoint: Url, username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            endpoint,
            username: username.into(),
            password: password.into(),
        }
    }
}

#[async_trait]
impl CredentialProviderFactory for TokenEndpointCredentials {
    async fn obtain(&self, transport: &Client) -> Result<Arc<dyn CredentialProvider>> {
        let response = transport
            .get(self.endpoint.clone())
            .basic_auth(&self.username, Some(&self.password))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(RegistryClientError::Credential(format!(
                "token endpoint rejected the request with status {}",
                response.status()
            )));
        }

        let token_response: TokenResponse = response.json().await?;
        let token = token_response
            .token
            .or(token_response.access_token)
            .ok_or_else(|| {
                RegistryClientError::Credential(
                    "token endpoint response contained no token".to_string(),
                )
            })?;

        Ok(Arc::new(StaticTokenCredentials::new(token)))
    }
}
