//! Configuration module for the registry client

use crate::error::{RegistryClientError, Result};
use url::Url;

/// Immutable configuration supplied once at client construction.
///
/// All three values must be present before any operation is invoked; a
/// blank identifier or a non-base address is a caller error and is rejected
/// here rather than surfacing as a runtime fault later.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    subscription_id: String,
    configuration_id: String,
    base_address: Url,
}

impl ClientConfig {
    pub fn new(
        subscription_id: impl Into<String>,
        configuration_id: impl Into<String>,
        base_address: Url,
    ) -> Result<Self> {
        let subscription_id = subscription_id.into();
        let configuration_id = configuration_id.into();

        if subscription_id.trim().is_empty() {
            return Err(RegistryClientError::Validation(
                "subscription identifier must not be empty".to_string(),
            ));
        }
        if configuration_id.trim().is_empty() {
            return Err(RegistryClientError::Validation(
                "registry configuration identifier must not be empty".to_string(),
            ));
        }
        if base_address.cannot_be_a_base() {
            return Err(RegistryClientError::Validation(format!(
                "base address cannot be used as a base URL: {}",
                base_address
            )));
        }

        // Normalize to a trailing slash so endpoint joins keep the full path.
        let mut base_address = base_address;
        if !base_address.path().ends_with('/') {
            let path = format!("{}/", base_address.path());
            base_address.set_path(&path);
        }

        Ok(Self {
            subscription_id,
            configuration_id,
            base_address,
        })
    }

    pub fn subscription_id(&self) -> &str {
        &self.subscription_id
    }

    pub fn configuration_id(&self) -> &str {
        &self.configuration_id
    }

    pub fn base_address(&self) -> &Url {
        &self.base_address
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn accepts_complete_configuration() {
        let config =
            ClientConfig::new("sub-1", "cfg-1", url("https://registry.example.com/api")).unwrap();
        assert_eq!(config.subscription_id(), "sub-1");
        assert_eq!(config.configuration_id(), "cfg-1");
    }

    #[test]
    fn rejects_blank_subscription_id() {
        let err = ClientConfig::new("  ", "cfg-1", url("https://registry.example.com"))
            .unwrap_err();
        assert!(matches!(err, RegistryClientError::Validation(_)));
    }

    #[test]
    fn rejects_blank_configuration_id() {
        let err =
            ClientConfig::new("sub-1", "", url("https://registry.example.com")).unwrap_err();
        assert!(matches!(err, RegistryClientError::Validation(_)));
    }

    #[test]
    fn rejects_non_base_address() {
        let err = ClientConfig::new("sub-1", "cfg-1", url("mailto:registry@example.com"))
            .unwrap_err();
        assert!(matches!(err, RegistryClientError::Validation(_)));
    }

    #[test]
    fn normalizes_base_address_to_trailing_slash() {
        let config =
            ClientConfig::new("sub-1", "cfg-1", url("https://registry.example.com/api/v2"))
                .unwrap();
        assert_eq!(config.base_address().path(), "/api/v2/");

        let already = ClientConfig::new("sub-1", "cfg-1", url("https://registry.example.com/"))
            .unwrap();
        assert_eq!(already.base_address().path(), "/");
    }
}
