use std::time::Duration;

use crate::credential::EnvCredentials;

/// Settings for talking to the model service.
///
/// Holds no secrets: the credential is looked up per call through
/// [`ClientConfig::credentials`].
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// Base URL of the model API, without a trailing slash.
    pub endpoint: String,
    /// Model identifier (e.g. `gemini-3-flash-preview`).
    pub model: String,
    /// Upper bound on a single generation call.
    pub timeout: Duration,
    /// Sampling temperature; `None` leaves the service default.
    pub temperature: Option<f32>,
    /// Environment variables consulted for the credential, in order.
    pub credential_vars: Vec<String>,
}

impl ClientConfig {
    pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";
    pub const DEFAULT_MODEL: &str = "gemini-3-flash-preview";
    pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

    /// Build a config for an explicit endpoint (useful for tests and CLI flags).
    pub fn with_endpoint(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            ..Self::default()
        }
    }

    /// Credential source reading [`Self::credential_vars`].
    pub fn credentials(&self) -> EnvCredentials {
        if self.credential_vars.is_empty() {
            EnvCredentials::default()
        } else {
            EnvCredentials::new(self.credential_vars.iter().cloned())
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: Self::DEFAULT_ENDPOINT.to_string(),
            model: Self::DEFAULT_MODEL.to_string(),
            timeout: Duration::from_secs(Self::DEFAULT_TIMEOUT_SECS),
            temperature: None,
            credential_vars: EnvCredentials::DEFAULT_VARS
                .iter()
                .map(|v| v.to_string())
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cfg = ClientConfig::default();
        assert_eq!(cfg.endpoint, ClientConfig::DEFAULT_ENDPOINT);
        assert_eq!(cfg.model, "gemini-3-flash-preview");
        assert_eq!(cfg.timeout, Duration::from_secs(30));
        assert_eq!(cfg.credential_vars[0], "LUDICA_API_KEY");
    }

    #[test]
    fn with_endpoint_strips_trailing_slash() {
        let cfg = ClientConfig::with_endpoint("http://127.0.0.1:9999/v1beta/");
        assert_eq!(cfg.endpoint, "http://127.0.0.1:9999/v1beta");
        assert_eq!(cfg.model, ClientConfig::DEFAULT_MODEL);
    }

    #[test]
    fn empty_credential_vars_fall_back_to_defaults() {
        let cfg = ClientConfig {
            credential_vars: vec![],
            ..ClientConfig::default()
        };
        assert_eq!(cfg.credentials().vars(), EnvCredentials::DEFAULT_VARS);
    }
}
