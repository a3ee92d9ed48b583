//! Binding the docker sidecar to a container

use crate::engine::{Container, ContainerEngine, EndpointOpts, Service};
use crate::error::{GostageError, GostageResult};
use crate::golang::constants::{DOCKER_ALIAS, DOCKER_HOST_ENV};

/// Outcome of attaching the docker sidecar during preparation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Attachment {
    /// Sidecar bound as `docker`, `DOCKER_HOST` set
    Attached { container: Container, endpoint: String },
    /// Endpoint resolution failed; the container has no sidecar
    Degraded { container: Container, reason: String },
}

impl Attachment {
    pub fn container(&self) -> &Container {
        match self {
            Attachment::Attached { container, .. } | Attachment::Degraded { container, .. } => {
                container
            }
        }
    }

    pub fn into_container(self) -> Container {
        match self {
            Attachment::Attached { container, .. } | Attachment::Degraded { container, .. } => {
                container
            }
        }
    }

    pub fn is_attached(&self) -> bool {
        matches!(self, Attachment::Attached { .. })
    }

    /// Resolved `DOCKER_HOST`, when attached
    pub fn endpoint(&self) -> Option<&str> {
        match self {
            Attachment::Attached { endpoint, .. } => Some(endpoint.as_str()),
            Attachment::Degraded { .. } => None,
        }
    }

    /// The container to run; with `require_docker` a degraded attachment is an error
    pub fn resolve(self, require_docker: bool) -> GostageResult<Container> {
        match self {
            Attachment::Degraded { reason, .. } if require_docker => {
                Err(GostageError::DaemonUnavailable(reason))
            }
            other => Ok(other.into_container()),
        }
    }
}

/// Bind `service` to a copy of `container` as peer `docker`, with
/// `DOCKER_HOST` pointing at its tcp endpoint. `container` is never
/// modified; on failure nothing is returned but the error.
pub async fn attach_service(
    engine: &dyn ContainerEngine,
    container: &Container,
    service: Service,
) -> GostageResult<Container> {
    bind(engine, container, service)
        .await
        .map(|(attached, _)| attached)
}

pub(crate) async fn bind(
    engine: &dyn ContainerEngine,
    container: &Container,
    service: Service,
) -> GostageResult<(Container, String)> {
    let endpoint = engine
        .endpoint(&service, &EndpointOpts::with_scheme("tcp"))
        .await
        .map_err(|e| match e {
            e @ GostageError::EndpointResolutionFailed { .. } => e,
            other => GostageError::EndpointResolutionFailed {
                service: service.to_string(),
                reason: other.to_string(),
            },
        })?;

    let attached = container
        .clone()
        .with_service_binding(DOCKER_ALIAS, service)
        .with_env_variable(DOCKER_HOST_ENV, endpoint.as_str());

    Ok((attached, endpoint))
}
