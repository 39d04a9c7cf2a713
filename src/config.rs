//! Configuration for ts3query
//!
//! Centralized configuration with sensible defaults. [`Config`] drives the
//! ServerQuery (TCP) transport, [`HttpConfig`] the WebQuery (HTTP) transport.
//! Both are passed explicitly to the transport constructors.

use crate::error::{QueryError, Result};

/// Default ServerQuery port
pub const DEFAULT_PORT: u16 = 10011;

/// Main configuration for a ServerQuery session
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Connection Configuration
    // -------------------------------------------------------------------------
    /// Server address (`host` or `host:port`)
    pub address: String,

    /// Dial timeout (milliseconds)
    pub dial_timeout_ms: u64,

    /// Read timeout (milliseconds, 0 disables)
    pub read_timeout_ms: u64,

    /// Write timeout (milliseconds, 0 disables)
    pub write_timeout_ms: u64,

    // -------------------------------------------------------------------------
    // Session Configuration
    // -------------------------------------------------------------------------
    /// Query login name; no login is attempted when `None`
    pub username: Option<String>,

    /// Query login password
    pub password: Option<String>,

    /// Virtual server selected after connecting
    pub virtual_server: u64,

    /// Keep-alive interval for `Client::connect_shared` (milliseconds, 0 disables)
    pub keepalive_interval_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            address: format!("127.0.0.1:{}", DEFAULT_PORT),
            dial_timeout_ms: 1000,
            read_timeout_ms: 5000,
            write_timeout_ms: 5000,
            username: None,
            password: None,
            virtual_server: 1,
            keepalive_interval_ms: 240_000, // server drops idle sessions after 5 minutes
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Address with the default query port appended when none is given
    pub fn socket_address(&self) -> String {
        let address = self.address.trim();
        if has_port(address) {
            address.to_string()
        } else if address.contains(':') && !address.starts_with('[') {
            format!("[{}]:{}", address, DEFAULT_PORT)
        } else {
            format!("{}:{}", address, DEFAULT_PORT)
        }
    }

    /// Check the configuration for values that can never work
    pub fn validate(&self) -> Result<()> {
        if self.address.trim().is_empty() {
            return Err(QueryError::Config("address must not be empty".to_string()));
        }
        if self.dial_timeout_ms == 0 {
            return Err(QueryError::Config("dial timeout must be non-zero".to_string()));
        }
        if self.username.is_some() != self.password.is_some() {
            return Err(QueryError::Config(
                "username and password must be given together".to_string(),
            ));
        }
        Ok(())
    }
}

/// `host:port`, `[v6]:port` have a port; a bare IPv6 literal does not
fn has_port(address: &str) -> bool {
    if let Some(rest) = address.strip_prefix('[') {
        return rest.contains("]:");
    }
    address.matches(':').count() == 1
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the server address
    pub fn address(mut self, address: impl Into<String>) -> Self {
        self.config.address = address.into();
        self
    }

    /// Set the dial timeout (in milliseconds)
    pub fn dial_timeout_ms(mut self, ms: u64) -> Self {
        self.config.dial_timeout_ms = ms;
        self
    }

    /// Set the read timeout (in milliseconds)
    pub fn read_timeout_ms(mut self, ms: u64) -> Self {
        self.config.read_timeout_ms = ms;
        self
    }

    /// Set the write timeout (in milliseconds)
    pub fn write_timeout_ms(mut self, ms: u64) -> Self {
        self.config.write_timeout_ms = ms;
        self
    }

    /// Set the query login credentials
    pub fn credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.config.username = Some(username.into());
        self.config.password = Some(password.into());
        self
    }

    /// Set the virtual server to select after connecting
    pub fn virtual_server(mut self, sid: u64) -> Self {
        self.config.virtual_server = sid;
        self
    }

    /// Set the keep-alive interval (in milliseconds)
    pub fn keepalive_interval_ms(mut self, ms: u64) -> Self {
        self.config.keepalive_interval_ms = ms;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}

/// Configuration for the WebQuery (HTTP) transport
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// API key sent in the `x-api-key` header
    pub api_key: String,

    /// Host and optional port, without scheme (e.g. `localhost:10080`)
    pub base_url: String,

    /// Use https instead of http
    pub use_https: bool,

    /// Virtual server addressed by non-global commands
    pub virtual_server: u64,

    /// Request timeout (milliseconds)
    pub timeout_ms: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: "127.0.0.1:10080".to_string(),
            use_https: false,
            virtual_server: 1,
            timeout_ms: 10_000,
        }
    }
}

impl HttpConfig {
    /// Create a new HTTP config builder
    pub fn builder() -> HttpConfigBuilder {
        HttpConfigBuilder::default()
    }

    /// `http` or `https`
    pub fn scheme(&self) -> &'static str {
        if self.use_https {
            "https"
        } else {
            "http"
        }
    }

    /// Check the configuration for values that can never work
    pub fn validate(&self) -> Result<()> {
        if self.api_key.is_empty() {
            return Err(QueryError::Config("api key must not be empty".to_string()));
        }
        if self.base_url.is_empty() || self.base_url.contains("://") {
            return Err(QueryError::Config(format!(
                "base url must be a bare host[:port], got {:?}",
                self.base_url
            )));
        }
        Ok(())
    }
}

/// Builder for HttpConfig
#[derive(Default)]
pub struct HttpConfigBuilder {
    config: HttpConfig,
}

impl HttpConfigBuilder {
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.config.api_key = key.into();
        self
    }

    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn use_https(mut self, enabled: bool) -> Self {
        self.config.use_https = enabled;
        self
    }

    pub fn virtual_server(mut self, sid: u64) -> Self {
        self.config.virtual_server = sid;
        self
    }

    pub fn timeout_ms(mut self, ms: u64) -> Self {
        self.config.timeout_ms = ms;
        self
    }

    pub fn build(self) -> HttpConfig {
        self.config
    }
}
