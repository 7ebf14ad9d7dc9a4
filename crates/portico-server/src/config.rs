//! Server configuration.
//!
//! Configuration is an explicit value passed to [`Server::new`]
//! (crate::Server::new); there is no process-wide server state.

use std::net::SocketAddr;
use std::time::Duration;

/// Default bind address.
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8081";

/// Default drain timeout in seconds.
pub const DEFAULT_DRAIN_TIMEOUT_SECS: u64 = 30;

/// Default per-request timeout in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Settings for one server instance.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use portico_server::ServerConfig;
///
/// let config = ServerConfig::builder()
///     .bind_addr("127.0.0.1:8081")
///     .drain_timeout(Duration::from_secs(10))
///     .build();
///
/// assert_eq!(config.bind_addr(), "127.0.0.1:8081");
/// ```
#[derive(Debug, Clone)]
pub struct ServerConfig {
    bind_addr: String,
    drain_timeout: Duration,
    request_timeout: Duration,
}

impl ServerConfig {
    /// Creates a configuration builder with defaults.
    #[must_use]
    pub fn builder() -> ServerConfigBuilder {
        ServerConfigBuilder::default()
    }

    /// Returns the configured bind address string.
    #[must_use]
    pub fn bind_addr(&self) -> &str {
        &self.bind_addr
    }

    /// Parses the bind address.
    pub fn socket_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        self.bind_addr.parse()
    }

    /// How long draining waits for in-flight connections on shutdown.
    #[must_use]
    pub fn drain_timeout(&self) -> Duration {
        self.drain_timeout
    }

    /// The deadline applied to each handler invocation.
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// Builder for [`ServerConfig`].
#[derive(Debug, Clone)]
pub struct ServerConfigBuilder {
    bind_addr: String,
    drain_timeout: Duration,
    request_timeout: Duration,
}

impl ServerConfigBuilder {
    /// Sets the bind address (e.g. `"0.0.0.0:8081"`).
    #[must_use]
    pub fn bind_addr(mut self, addr: impl Into<String>) -> Self {
        self.bind_addr = addr.into();
        self
    }

    /// Sets the drain timeout.
    #[must_use]
    pub fn drain_timeout(mut self, timeout: Duration) -> Self {
        self.drain_timeout = timeout;
        self
    }

    /// Sets the per-request timeout.
    #[must_use]
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Builds the configuration.
    #[must_use]
    pub fn build(self) -> ServerConfig {
        ServerConfig {
            bind_addr: self.bind_addr,
            drain_timeout: self.drain_timeout,
            request_timeout: self.request_timeout,
        }
    }
}

impl Default for ServerConfigBuilder {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            drain_timeout: Duration::from_secs(DEFAULT_DRAIN_TIMEOUT_SECS),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.bind_addr(), DEFAULT_BIND_ADDR);
        assert_eq!(
            config.drain_timeout(),
            Duration::from_secs(DEFAULT_DRAIN_TIMEOUT_SECS)
        );
        assert_eq!(
            config.request_timeout(),
            Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS)
        );
    }

    #[test]
    fn builder_overrides() {
        let config = ServerConfig::builder()
            .bind_addr("127.0.0.1:9000")
            .drain_timeout(Duration::from_secs(5))
            .request_timeout(Duration::from_secs(2))
            .build();

        assert_eq!(config.bind_addr(), "127.0.0.1:9000");
        assert_eq!(config.drain_timeout(), Duration::from_secs(5));
        assert_eq!(config.request_timeout(), Duration::from_secs(2));
    }

    #[test]
    fn socket_addr_parsing() {
        let config = ServerConfig::builder().bind_addr("127.0.0.1:8081").build();
        let addr = config.socket_addr().unwrap();
        assert_eq!(addr.port(), 8081);
        assert!(addr.ip().is_loopback());

        let config = ServerConfig::builder().bind_addr("nonsense").build();
        assert!(config.socket_addr().is_err());
    }
}
