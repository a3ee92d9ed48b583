//! Build state: the base container plus the project being built
//!
//! The state is an immutable value. Setters return a new state, so two
//! callers holding the same state never observe each other's changes.

use crate::cache::{CacheSharing, CacheVolume};
use crate::engine::{Container, Directory};
use crate::golang::constants::{GO_BUILD_CACHE_PATH, GO_MOD_CACHE_PATH, PROJ_MOUNT};
use tracing::warn;

/// `golang:<version>` with no caches mounted
pub fn base_image(version: &str) -> Container {
    Container::from_image(format!("golang:{}", version))
}

/// `golang:<version>` with the shared module and build caches mounted
pub fn base_container(version: &str) -> Container {
    with_go_caches(base_image(version))
}

/// Mount the Go module and build caches into `container`
pub fn with_go_caches(container: Container) -> Container {
    container
        .with_mounted_cache(GO_MOD_CACHE_PATH, CacheVolume::go_mod(), CacheSharing::Shared)
        .with_mounted_cache(
            GO_BUILD_CACHE_PATH,
            CacheVolume::go_build(),
            CacheSharing::Shared,
        )
}

/// `base` with `<project>/vendor` mounted and vendoring enabled
pub fn vendored(base: Container, project: &Directory) -> Container {
    base.with_mounted_directory(vendor_mount(), project.directory("vendor"))
        .with_env_variable("GOFLAGS", "-mod=vendor")
}

fn vendor_mount() -> String {
    format!("{}/vendor", PROJ_MOUNT)
}

/// Current container and project
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildState {
    container: Container,
    project: Option<Directory>,
}

impl BuildState {
    /// State on the cached base image for `version`, with no project bound
    pub fn new(version: &str) -> Self {
        Self::from_container(base_container(version))
    }

    /// State on an existing container, with no project bound
    pub fn from_container(container: Container) -> Self {
        Self {
            container,
            project: None,
        }
    }

    pub fn container(&self) -> &Container {
        &self.container
    }

    /// The bound project, if any
    pub fn project(&self) -> Option<&Directory> {
        self.project.as_ref()
    }

    /// Bind a project tree. Not validated; a bad tree fails when mounted.
    pub fn with_project(self, project: Directory) -> Self {
        Self {
            project: Some(project),
            ..self
        }
    }

    /// Replace the container
    pub fn with_container(self, container: Container) -> Self {
        Self { container, ..self }
    }

    /// Directory used when no project is bound: `/src` of the current container
    pub fn default_project(&self) -> Directory {
        self.container.directory(PROJ_MOUNT)
    }

    /// The bound project, or the default with a warning
    pub fn project_or_default(&self) -> Directory {
        self.project_or_in(&self.container)
    }

    /// The bound project, or `/src` of `container` with a warning
    fn project_or_in(&self, container: &Container) -> Directory {
        match &self.project {
            Some(project) => project.clone(),
            None => {
                warn!("No project bound, using {} of {}", PROJ_MOUNT, container.describe());
                container.directory(PROJ_MOUNT)
            }
        }
    }

    /// Replace the container with the cached base image for `version`
    pub fn base(self, version: &str) -> Self {
        self.with_container(base_container(version))
    }

    /// Replace the container with the vendored base image for `version`.
    ///
    /// Without a bound project the default project is bound first.
    pub fn base_vendored(self, version: &str) -> Self {
        self.vendored_on(base_container(version))
    }

    /// Replace the container with `base` plus the project's vendor tree.
    ///
    /// Without a bound project, `/src` of `base` itself becomes the project.
    pub fn vendored_on(self, base: Container) -> Self {
        let project = self.project_or_in(&base);
        let container = vendored(base, &project);
        self.with_project(project).with_container(container)
    }
}
