//! Groupware connector configuration
//!
//! Configuration is loaded once per connector instance and validated at
//! construction; a malformed setup fails before any sync run starts.

use serde::{Deserialize, Serialize};

use groupsync_connector::config::{ConnectionSettings, ConnectorConfig, TlsConfig, REDACTED};
use groupsync_connector::error::{ConnectorError, ConnectorResult};

use crate::resolver::ResolutionPolicy;

/// `limit` sent on list requests unless configured; asks for everything in one page.
pub const DEFAULT_PAGE_LIMIT: u32 = i32::MAX as u32;

/// Directory lookups allowed in flight while resolving one membership batch.
pub const DEFAULT_LOOKUP_CONCURRENCY: usize = 8;

/// Attribute names the group service writes by default.
pub const DEFAULT_WRITABLE_ATTRIBUTES: &[&str] = &["name", "email", "members"];

/// Configuration for the groupware group connector.
#[derive(Clone, Serialize, Deserialize)]
pub struct GroupwareConfig {
    /// Base URL of the groupware platform (e.g., "https://groupware.example.com").
    pub base_url: String,

    /// Basic authentication username.
    pub username: String,

    /// Basic authentication password.
    #[serde(default)]
    pub password: String,

    /// Connection settings (timeouts).
    #[serde(default)]
    pub connection: ConnectionSettings,

    /// TLS configuration.
    #[serde(default)]
    pub tls: TlsConfig,

    /// `limit` sent on list requests.
    #[serde(default = "default_page_limit")]
    pub page_limit: u32,

    /// Maximum concurrent user/group lookups per membership batch.
    #[serde(default = "default_lookup_concurrency")]
    pub lookup_concurrency: usize,

    /// Attribute names reported as writable to the synchronization engine.
    #[serde(default = "default_writable_attributes")]
    pub writable_attributes: Vec<String>,

    /// How emails are classified when adding members.
    #[serde(default)]
    pub add_resolution: ResolutionPolicy,
}

fn default_page_limit() -> u32 {
    DEFAULT_PAGE_LIMIT
}

fn default_lookup_concurrency() -> usize {
    DEFAULT_LOOKUP_CONCURRENCY
}

fn default_writable_attributes() -> Vec<String> {
    DEFAULT_WRITABLE_ATTRIBUTES
        .iter()
        .map(|s| (*s).to_string())
        .collect()
}

impl std::fmt::Debug for GroupwareConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GroupwareConfig")
            .field("base_url", &self.base_url)
            .field("username", &self.username)
            .field("password", &REDACTED)
            .field("connection", &self.connection)
            .field("tls", &self.tls)
            .field("page_limit", &self.page_limit)
            .field("lookup_concurrency", &self.lookup_concurrency)
            .field("writable_attributes", &self.writable_attributes)
            .field("add_resolution", &self.add_resolution)
            .finish()
    }
}

impl GroupwareConfig {
    /// Create a new config with required fields.
    pub fn new(
        base_url: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            username: username.into(),
            password: password.into(),
            connection: ConnectionSettings::default(),
            tls: TlsConfig::default(),
            page_limit: default_page_limit(),
            lookup_concurrency: default_lookup_concurrency(),
            writable_attributes: default_writable_attributes(),
            add_resolution: ResolutionPolicy::default(),
        }
    }

    /// Parse and validate a JSON configuration document.
    pub fn from_json(value: serde_json::Value) -> ConnectorResult<Self> {
        let config: Self = serde_json::from_value(value).map_err(|e| {
            ConnectorError::invalid_configuration(format!("malformed groupware config: {e}"))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Set connection settings.
    pub fn with_connection(mut self, connection: ConnectionSettings) -> Self {
        self.connection = connection;
        self
    }

    /// Set TLS configuration.
    pub fn with_tls(mut self, tls: TlsConfig) -> Self {
        self.tls = tls;
        self
    }

    /// Set the list page limit.
    pub fn with_page_limit(mut self, limit: u32) -> Self {
        self.page_limit = limit;
        self
    }

    /// Set the number of concurrent directory lookups.
    pub fn with_lookup_concurrency(mut self, concurrency: usize) -> Self {
        self.lookup_concurrency = concurrency;
        self
    }

    /// Set the add-direction resolution policy.
    pub fn with_add_resolution(mut self, policy: ResolutionPolicy) -> Self {
        self.add_resolution = policy;
        self
    }

    /// Set the writable attribute names.
    pub fn with_writable_attributes(mut self, attributes: Vec<String>) -> Self {
        self.writable_attributes = attributes;
        self
    }
}

impl ConnectorConfig for GroupwareConfig {
    fn validate(&self) -> ConnectorResult<()> {
        let url = url::Url::parse(&self.base_url).map_err(|e| {
            ConnectorError::invalid_configuration(format!(
                "invalid base_url '{}': {e}",
                self.base_url
            ))
        })?;

        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(ConnectorError::invalid_configuration(format!(
                "unsupported base_url scheme: {}",
                url.scheme()
            )));
        }

        if url.host_str().is_none() {
            return Err(ConnectorError::invalid_configuration(
                "base_url has no host",
            ));
        }

        if self.username.trim().is_empty() {
            return Err(ConnectorError::invalid_configuration(
                "username is required",
            ));
        }

        if self.page_limit == 0 {
            return Err(ConnectorError::invalid_configuration(
                "page_limit must be greater than zero",
            ));
        }

        if self.lookup_concurrency == 0 {
            return Err(ConnectorError::invalid_configuration(
                "lookup_concurrency must be greater than zero",
            ));
        }

        self.tls.validate_security();
        Ok(())
    }

    fn redacted(&self) -> Self {
        Self {
            password: REDACTED.to_string(),
            ..self.clone()
        }
    }
}
