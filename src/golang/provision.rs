//! Docker-in-Docker sidecar

use crate::cache::{CacheSharing, CacheVolume};
use crate::engine::{Container, ExecOpts, Service};
use crate::golang::constants::{DOCKERD_PORT, DOCKER_DATA_PATH};

/// Describe a dockerd service for `version`.
///
/// Nothing starts here; the engine starts the daemon the first time its
/// endpoint is resolved or a container bound to it runs. The data
/// directory lives in the `<version>-docker-lib` cache, so every session
/// using the same docker version shares one volume.
pub fn docker_service(version: &str) -> Service {
    let tcp_host = format!("--host=tcp://0.0.0.0:{}", DOCKERD_PORT);

    Container::from_image(format!("docker:{}-dind", version))
        .with_mounted_cache(
            DOCKER_DATA_PATH,
            CacheVolume::docker_lib(version),
            CacheSharing::Private,
        )
        .with_exposed_port(DOCKERD_PORT)
        .with_exec_opts(
            [
                "dockerd",
                tcp_host.as_str(),
                "--host=unix:///var/run/docker.sock",
                "--tls=false",
            ],
            ExecOpts {
                insecure_root_capabilities: true,
            },
        )
        .as_service()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Mount;

    #[test]
    fn service_is_pure() {
        assert_eq!(docker_service("24.0"), docker_service("24.0"));
        assert_ne!(docker_service("24.0"), docker_service("25.0"));
    }

    #[test]
    fn service_descriptor() {
        let svc = docker_service("24.0");
        let ctr = svc.container();

        assert_eq!(ctr.image(), Some("docker:24.0-dind"));
        assert_eq!(svc.exposed_ports(), &[2375]);

        match ctr.mount_at("/var/lib/docker") {
            Some(Mount::Cache {
                volume, sharing, ..
            }) => {
                assert_eq!(volume.name(), "24.0-docker-lib");
                assert_eq!(*sharing, CacheSharing::Private);
            }
            other => panic!("unexpected mount: {:?}", other),
        }

        let step = ctr.last_exec().unwrap();
        assert_eq!(
            step.args,
            vec![
                "dockerd",
                "--host=tcp://0.0.0.0:2375",
                "--host=unix:///var/run/docker.sock",
                "--tls=false",
            ]
        );
        assert!(step.insecure_root_capabilities);
        assert!(ctr.needs_privileges());
    }
}
