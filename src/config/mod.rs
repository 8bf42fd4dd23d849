//! Stack configuration
//!
//! Everything the tool needs is frozen into a [`StackConfig`] once, right
//! after argument parsing, and handed to each component at construction.

use std::fmt;
use std::time::Duration;

use reqwest::Url;

use crate::cli::StackArgs;
use crate::error::{Result, StackError};
use crate::readiness::policy::MAX_RETRY_DELAY;
use crate::readiness::RetryBudget;

/// Elasticsearch HTTP port
pub const ELASTICSEARCH_HTTP_PORT: u16 = 9200;
/// Elasticsearch transport port
pub const ELASTICSEARCH_TRANSPORT_PORT: u16 = 9300;
/// Kibana port
pub const KIBANA_PORT: u16 = 5601;
/// Fleet Server port
pub const FLEET_SERVER_PORT: u16 = 8220;

/// Upper bound accepted for a single Kibana request
pub const MAX_REQUEST_TIMEOUT: Duration = Duration::from_secs(24 * 60 * 60);

/// Kibana refuses shorter encryption keys at boot.
const MIN_ENCRYPTION_KEY_LEN: usize = 32;

/// Username/password pair sent as HTTP basic auth on the Kibana API calls.
/// The readiness probe goes out without it.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Settings for the Kibana HTTP client
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HttpSettings {
    pub request_timeout: Duration,
    pub verify_tls: bool,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(30),
            verify_tls: false,
        }
    }
}

/// Immutable configuration for one invocation
#[derive(Debug, Clone)]
pub struct StackConfig {
    /// Image tag for all three services, also sent as `kbn-version`
    pub stack_version: String,
    pub credentials: Credentials,
    /// Kibana base URL without a trailing slash
    pub kibana_url: String,
    pub network: String,
    pub encryption_key: String,
    pub readiness: RetryBudget,
    pub http: HttpSettings,
}

impl Default for StackConfig {
    fn default() -> Self {
        Self {
            stack_version: "7.17.9".to_string(),
            credentials: Credentials::new("elastic", "password"),
            kibana_url: format!("http://localhost:{KIBANA_PORT}"),
            network: "elastic".to_string(),
            encryption_key: "elastic-container-local-encryption-key".to_string(),
            readiness: RetryBudget::default(),
            http: HttpSettings::default(),
        }
    }
}

impl StackConfig {
    /// Build and validate the configuration from parsed CLI/env arguments
    pub fn from_args(args: &StackArgs) -> Result<Self> {
        let config = Self {
            stack_version: args.stack_version.trim().to_string(),
            credentials: Credentials::new(args.username.clone(), args.password.clone()),
            kibana_url: args.kibana_url.trim().trim_end_matches('/').to_string(),
            network: args.network.trim().to_string(),
            encryption_key: args.encryption_key.clone(),
            readiness: RetryBudget::new(args.max_attempts, Duration::from_secs(args.retry_delay)),
            http: HttpSettings {
                request_timeout: Duration::from_secs(args.request_timeout),
                verify_tls: args.verify_tls,
            },
        };
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the stack cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.stack_version.is_empty() {
            return Err(StackError::Config("stack version must not be empty".to_string()));
        }
        if self.credentials.username.is_empty() {
            return Err(StackError::Config("username must not be empty".to_string()));
        }
        if self.credentials.password.is_empty() {
            return Err(StackError::Config("password must not be empty".to_string()));
        }
        if self.network.is_empty() {
            return Err(StackError::Config("network name must not be empty".to_string()));
        }
        if self.readiness.max_attempts == 0 {
            return Err(StackError::Config(
                "max attempts must be at least 1".to_string(),
            ));
        }
        if self.readiness.delay > MAX_RETRY_DELAY {
            return Err(StackError::Config(format!(
                "retry delay must be at most {} seconds",
                MAX_RETRY_DELAY.as_secs()
            )));
        }
        if self.http.request_timeout.is_zero() {
            return Err(StackError::Config(
                "request timeout must be at least 1 second".to_string(),
            ));
        }
        if self.http.request_timeout > MAX_REQUEST_TIMEOUT {
            return Err(StackError::Config(format!(
                "request timeout must be at most {} seconds",
                MAX_REQUEST_TIMEOUT.as_secs()
            )));
        }
        if self.encryption_key.len() < MIN_ENCRYPTION_KEY_LEN {
            return Err(StackError::Config(format!(
                "encryption key must be at least {} characters",
                MIN_ENCRYPTION_KEY_LEN
            )));
        }

        let url = Url::parse(&self.kibana_url).map_err(|e| {
            StackError::Config(format!("invalid Kibana URL '{}': {}", self.kibana_url, e))
        })?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(StackError::Config(format!(
                "Kibana URL must use http or https, got '{}'",
                url.scheme()
            )));
        }

        Ok(())
    }

    /// Image reference for an Elastic product at the configured version
    pub fn image(&self, repository: &str) -> String {
        format!("docker.elastic.co/{}:{}", repository, self.stack_version)
    }
}
