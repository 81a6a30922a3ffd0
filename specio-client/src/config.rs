//! Transport configuration.

use std::env;
use std::time::Duration;

/// Transport configuration.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Default request timeout.
    pub timeout: Duration,
    /// Connection timeout.
    pub connect_timeout: Duration,
    /// Default headers for all requests.
    pub default_headers: Vec<(String, String)>,
    /// User agent string.
    pub user_agent: String,
    /// Enable gzip compression.
    pub gzip: bool,
    /// Enable brotli compression.
    pub brotli: bool,
    /// Follow redirects.
    pub follow_redirects: bool,
    /// Maximum redirects to follow.
    pub max_redirects: usize,
    /// Reject responses with a 4xx or 5xx status.
    pub error_for_status: bool,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            default_headers: Vec::new(),
            user_agent: format!("specio-client/{}", env!("CARGO_PKG_VERSION")),
            gzip: true,
            brotli: true,
            follow_redirects: true,
            max_redirects: 10,
            error_for_status: true,
        }
    }
}

impl TransportConfig {
    /// Create a new configuration builder.
    pub fn builder() -> TransportConfigBuilder {
        TransportConfigBuilder::default()
    }

    /// Create configuration from environment variables.
    ///
    /// - `SPECIO_TIMEOUT_SECS` - request timeout in seconds
    /// - `SPECIO_CONNECT_TIMEOUT_SECS` - connection timeout in seconds
    /// - `SPECIO_USER_AGENT` - user agent string
    /// - `SPECIO_ERROR_FOR_STATUS=1|0` - reject 4xx/5xx responses
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Create configuration from any key-value source using the
    /// [`from_env`](Self::from_env) variable names.
    ///
    /// Missing or unparsable values keep their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let secs = |key: &str| {
            lookup(key)
                .and_then(|v| v.trim().parse().ok())
                .map(Duration::from_secs)
        };

        let timeout = secs("SPECIO_TIMEOUT_SECS").unwrap_or(defaults.timeout);
        let connect_timeout =
            secs("SPECIO_CONNECT_TIMEOUT_SECS").unwrap_or(defaults.connect_timeout);

        let user_agent = lookup("SPECIO_USER_AGENT").unwrap_or(defaults.user_agent);

        let error_for_status = lookup("SPECIO_ERROR_FOR_STATUS")
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(defaults.error_for_status);

        Self {
            timeout,
            connect_timeout,
            user_agent,
            error_for_status,
            ..defaults
        }
    }
}

/// Builder for transport configuration.
#[derive(Debug, Default)]
pub struct TransportConfigBuilder {
    config: TransportConfig,
}

impl TransportConfigBuilder {
    /// Set the default request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Set the connection timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.config.connect_timeout = timeout;
        self
    }

    /// Add a default header for all requests.
    pub fn default_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.default_headers.push((name.into(), value.into()));
        self
    }

    /// Set the user agent string.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    /// Enable or disable gzip compression.
    pub fn gzip(mut self, enable: bool) -> Self {
        self.config.gzip = enable;
        self
    }

    /// Enable or disable brotli compression.
    pub fn brotli(mut self, enable: bool) -> Self {
        self.config.brotli = enable;
        self
    }

    /// Enable or disable following redirects.
    pub fn follow_redirects(mut self, enable: bool) -> Self {
        self.config.follow_redirects = enable;
        self
    }

    /// Set the maximum number of redirects to follow.
    pub fn max_redirects(mut self, max: usize) -> Self {
        self.config.max_redirects = max;
        self
    }

    /// Reject or accept 4xx/5xx responses.
    pub fn error_for_status(mut self, enable: bool) -> Self {
        self.config.error_for_status = enable;
        self
    }

    /// Build the configuration.
    pub fn build(self) -> TransportConfig {
        self.config
    }
}
