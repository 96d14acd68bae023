//! Error handling module for the registry client

use thiserror::Error;

pub type Result<T> = std::result::Result<T, RegistryClientError>;

/// Errors surfaced by [`RegistryClient`](crate::RegistryClient) operations.
///
/// `Configuration` is the only error this crate synthesizes itself, raised
/// when the remote service rejects a lookup or event query with a status
/// other than 200 or 404. Everything else passes through from the
/// collaborator that produced it.
#[derive(Debug, Error)]
pub enum RegistryClientError {
    /// A required input was missing or malformed; raised before any network call.
    #[error("validation error: {0}")]
    Validation(String),
    /// The credential-provider factory could not issue a usable token.
    #[error("credential error: {0}")]
    Credential(String),
    /// The remote service rejected the call for a reason other than "record
    /// not found". Carries the textual response body verbatim when the
    /// service supplied one.
    #[error("registry configuration error: {0}")]
    Configuration(String),
    /// Transport-level failure from the HTTP client.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    /// A response body could not be parsed into the expected shape.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<url::ParseError> for RegistryClientError {
    fn from(err: url::ParseError) -> Self {
        RegistryClientError::Validation(err.to_string())
    }
}
