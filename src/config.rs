//! Client configuration: layered settings (base URL plus auth/timeout knobs
//! read once at construction), generalized with
//! retry and default-header layers the pipeline consumes.

use crate::model::HeaderMap;
use crate::retry::RetryConfig;
use std::time::Duration;
use url::Url;

#[derive(Clone, Debug)]
pub struct Credential {
    pub scheme: &'static str,
    pub value: String,
}

impl Credential {
    pub fn bearer(token: impl Into<String>) -> Self { Credential { scheme: "Bearer", value: token.into() } }

    pub fn basic(username: &str, password: &str) -> Self {
        let encoded = base64::Engine::encode(&base64::engine::general_purpose::STANDARD, format!("{}:{}", username, password));
        Credential { scheme: "Basic", value: encoded }
    }

    pub fn header_value(&self) -> String { format!("{} {}", self.scheme, self.value) }
}

#[derive(Clone, Debug)]
pub struct ClientConfig {
    pub base_url: Url,
    pub timeout: Duration,
    pub retry: RetryConfig,
    pub default_headers: HeaderMap,
    pub credential: Option<Credential>,
    pub user_agent: String,
    pub transport_supports_patch: bool,
}

pub struct ClientConfigBuilder {
    base_url: Url,
    timeout: Duration,
    retry: RetryConfig,
    default_headers: HeaderMap,
    credential: Option<Credential>,
    user_agent: String,
    transport_supports_patch: bool,
}

impl ClientConfigBuilder {
    pub fn new(base_url: Url) -> Self {
        ClientConfigBuilder {
            base_url,
            timeout: Duration::from_secs(30),
            retry: RetryConfig::default(),
            default_headers: HeaderMap::new(),
            credential: None,
            user_agent: concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")).to_owned(),
            transport_supports_patch: false,
        }
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    pub fn default_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.default_headers.set(name, value.into());
        self
    }

    pub fn credential(mut self, credential: Credential) -> Self {
        self.credential = Some(credential);
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn transport_supports_patch(mut self, supports: bool) -> Self {
        self.transport_supports_patch = supports;
        self
    }

    pub fn build(self) -> ClientConfig {
        ClientConfig {
            base_url: self.base_url,
            timeout: self.timeout,
            retry: self.retry,
            default_headers: self.default_headers,
            credential: self.credential,
            user_agent: self.user_agent,
            transport_supports_patch: self.transport_supports_patch,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bearer_credential_formats_authorization_value() {
        let cred = Credential::bearer("tok123");
        assert_eq!(cred.header_value(), "Bearer tok123");
    }

    #[test]
    fn builder_defaults_are_reasonable() {
        let config = ClientConfigBuilder::new(Url::parse("https://example.com").unwrap()).build();
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert!(config.default_headers.is_empty());
        assert!(config.credential.is_none());
    }
}
