//! Citizen Registry Client Library
//!
//! Async client for a subscription-based citizen-registry service: citizen
//! lookups by registry number or opaque identifier, configuration
//! discovery, event subscription management, and paginated event retrieval.
//!
//! The caller supplies the HTTP transport and a credential-provider
//! factory; the client authenticates lazily on first use and translates the
//! service's status codes into typed results ("found" / "not found" /
//! "misconfigured").
//!
//! ```no_run
//! use cpr_registry_client::{ClientConfig, RegistryClient, StaticTokenCredentials};
//! use std::sync::Arc;
//! use url::Url;
//!
//! # async fn run() -> cpr_registry_client::Result<()> {
//! let config = ClientConfig::new(
//!     "my-subscription",
//!     "my-registry-configuration",
//!     Url::parse("https://registry.example.com/api").unwrap(),
//! )?;
//! let client = RegistryClient::new(
//!     reqwest::Client::new(),
//!     Arc::new(StaticTokenCredentials::new("token")),
//!     config,
//! );
//!
//! match client.citizen_by_cpr("0101701234").await? {
//!     Some(citizen) => println!("found: {:?}", citizen.name),
//!     None => println!("no such record"),
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod models;
pub mod registry;

pub use config::ClientConfig;
pub use error::{RegistryClientError, Result};
pub use models::{
    CitizenDetail, CitizenEvent, CitizenSummary, RegistryProfile, SubscribedCitizenEventPage,
    SubscriptionRequest,
};
pub use registry::{
    CredentialProvider, CredentialProviderFactory, RegistryClient, StaticTokenCredentials,
    TokenEndpointCredentials,
};
