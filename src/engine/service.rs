//! Service descriptors
//!
//! A service is a container whose last exec is a long-running process
//! reachable over the network. Building one starts nothing; the engine
//! starts it the first time its endpoint is resolved or a container bound
//! to it runs.

use crate::engine::container::Container;
use std::fmt;

/// Options for resolving a service endpoint
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EndpointOpts {
    /// URL scheme to prefix (e.g. "tcp"); bare `host:port` when `None`
    pub scheme: Option<String>,
    /// Port to use; defaults to the first exposed port
    pub port: Option<u16>,
}

impl EndpointOpts {
    pub fn with_scheme(scheme: impl Into<String>) -> Self {
        Self {
            scheme: Some(scheme.into()),
            port: None,
        }
    }
}

/// Handle to a not-yet-started service
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Service {
    container: Container,
}

impl Service {
    pub fn new(container: Container) -> Self {
        Self { container }
    }

    pub fn container(&self) -> &Container {
        &self.container
    }

    pub fn exposed_ports(&self) -> &[u16] {
        self.container.exposed_ports()
    }

    /// Port an endpoint lookup resolves to
    pub fn endpoint_port(&self, opts: &EndpointOpts) -> Option<u16> {
        opts.port.or_else(|| self.exposed_ports().first().copied())
    }
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.container.image().unwrap_or("scratch"))
    }
}

/// Format an endpoint address for `host:port` with an optional scheme
pub fn format_endpoint(scheme: Option<&str>, host: &str, port: u16) -> String {
    match scheme {
        Some(scheme) => format!("{}://{}:{}", scheme, host, port),
        None => format!("{}:{}", host, port),
    }
}
