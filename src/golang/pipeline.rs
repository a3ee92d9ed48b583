//! Preparation pipeline
//!
//! Every build, test and vulncheck runs through `prepare`: the project is
//! copied to `/src`, the workdir set, and a fresh docker sidecar attached.
//! Nothing is memoized; each call provisions its own service descriptor.

use crate::engine::ContainerEngine;
use crate::golang::attach::{bind, Attachment};
use crate::golang::constants::PROJ_MOUNT;
use crate::golang::provision::docker_service;
use crate::golang::state::BuildState;
use tracing::{debug, warn};

/// Assemble the container an operation runs in.
///
/// Endpoint resolution failure does not abort: the result is
/// `Attachment::Degraded` carrying the unattached container, and the
/// caller chooses whether to continue.
pub async fn prepare(
    engine: &dyn ContainerEngine,
    state: &BuildState,
    docker_version: &str,
) -> Attachment {
    let container = state
        .container()
        .clone()
        .with_directory(PROJ_MOUNT, state.project_or_default())
        .with_workdir(PROJ_MOUNT);

    match bind(engine, &container, docker_service(docker_version)).await {
        Ok((container, endpoint)) => {
            debug!("Docker sidecar attached at {}", endpoint);
            Attachment::Attached {
                container,
                endpoint,
            }
        }
        Err(e) => {
            warn!("Continuing without docker sidecar: {}", e);
            Attachment::Degraded {
                container,
                reason: e.to_string(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::testing::FakeEngine;
    use crate::engine::{Directory, Op};

    fn copied_project(attachment: &Attachment) -> Option<&Directory> {
        attachment.container().ops().iter().find_map(|op| match op {
            Op::CopyDirectory { path, source } if path == "/src" => Some(source),
            _ => None,
        })
    }

    #[tokio::test]
    async fn prepare_attaches_sidecar() {
        let engine = FakeEngine::new();
        let state = BuildState::new("1.23.4").with_project(Directory::host("/work/app"));

        let attachment = prepare(&engine, &state, "24.0").await;

        assert!(attachment.is_attached());
        assert_eq!(attachment.endpoint(), Some("tcp://dind.fake:2375"));
        let ctr = attachment.container();
        assert_eq!(ctr.workdir(), Some("/src"));
        assert_eq!(copied_project(&attachment), Some(&Directory::host("/work/app")));
        assert!(ctr.service_binding("docker").is_some());
        assert_eq!(ctr.env_variable("DOCKER_HOST"), Some("tcp://dind.fake:2375"));
    }

    #[tokio::test]
    async fn prepare_degrades_but_keeps_project() {
        let engine = FakeEngine::new().failing_endpoint("boom");
        let state = BuildState::new("1.23.4").with_project(Directory::host("/work/app"));

        let attachment = prepare(&engine, &state, "24.0").await;

        match &attachment {
            Attachment::Degraded { reason, .. } => assert!(reason.contains("boom")),
            other => panic!("expected degraded attachment, got {:?}", other),
        }
        let ctr = attachment.container();
        assert_eq!(ctr.workdir(), Some("/src"));
        assert_eq!(copied_project(&attachment), Some(&Directory::host("/work/app")));
        assert!(ctr.service_bindings().is_empty());
        assert!(ctr.env_variable("DOCKER_HOST").is_none());
    }

    #[tokio::test]
    async fn prepare_does_not_touch_state() {
        let engine = FakeEngine::new();
        let state = BuildState::new("1.23.4").with_project(Directory::host("/work/app"));
        let before = state.clone();

        prepare(&engine, &state, "24.0").await;

        assert_eq!(state, before);
    }

    #[tokio::test]
    async fn every_prepare_resolves_a_new_endpoint() {
        let engine = FakeEngine::new();
        let state = BuildState::new("1.23.4").with_project(Directory::host("/work/app"));

        prepare(&engine, &state, "24.0").await;
        prepare(&engine, &state, "24.0").await;

        assert_eq!(engine.endpoint_calls(), 2);
    }

    #[tokio::test]
    async fn prepare_without_project_uses_default() {
        let engine = FakeEngine::new();
        let state = BuildState::new("1.23.4");

        let attachment = prepare(&engine, &state, "24.0").await;

        assert_eq!(copied_project(&attachment), Some(&state.default_project()));
    }
}
