//! Registry client module
//!
//! Contains the client for the remote citizen-registry service and the
//! credential seam it authenticates through.

pub mod auth;
pub mod client;

pub use auth::{
    CredentialProvider, CredentialProviderFactory, StaticTokenCredentials,
    TokenEndpointCredentials,
};
pub use client::RegistryClient;
