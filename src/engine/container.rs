//! Lazy container descriptors
//!
//! A `Container` describes an image plus the mounts, environment and
//! ordered steps to apply to it. Nothing runs until a `ContainerEngine`
//! materializes it. Every `with_*` method returns a new descriptor; the
//! receiver is consumed, so callers clone when they need to keep the
//! original around.

use crate::cache::{CacheSharing, CacheVolume};
use crate::engine::directory::{Directory, File};
use crate::engine::service::Service;
use std::collections::BTreeMap;

/// Options for a single `with_exec` step
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ExecOpts {
    /// Run the command with full root capabilities (privileged)
    pub insecure_root_capabilities: bool,
}

/// A command recorded on a container, with the environment it will see
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ExecStep {
    /// Command and arguments, passed to the engine without a shell
    pub args: Vec<String>,
    /// Environment at the time the step was recorded
    pub env: BTreeMap<String, String>,
    /// Working directory at the time the step was recorded
    pub workdir: Option<String>,
    /// Whether the step needs a privileged exec
    pub insecure_root_capabilities: bool,
}

impl ExecStep {
    /// Space-joined command line, for logs and error messages
    pub fn command_line(&self) -> String {
        self.args.join(" ")
    }
}

/// A mount attached when the container is created
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Mount {
    /// Named persistent cache volume
    Cache {
        path: String,
        volume: CacheVolume,
        sharing: CacheSharing,
    },
    /// Directory bind-mounted into the container
    Directory { path: String, source: Directory },
}

impl Mount {
    /// Mount target inside the container
    pub fn path(&self) -> &str {
        match self {
            Mount::Cache { path, .. } | Mount::Directory { path, .. } => path,
        }
    }
}

/// A peer service reachable from the container under `alias`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ServiceBinding {
    pub alias: String,
    pub service: Service,
}

/// An ordered step applied after the container starts
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Op {
    /// Run a command
    Exec(ExecStep),
    /// Copy the contents of a directory to `path`
    CopyDirectory { path: String, source: Directory },
    /// Write a new file at `path`
    NewFile { path: String, contents: String },
}

/// Immutable container descriptor
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Container {
    image: Option<String>,
    env: BTreeMap<String, String>,
    workdir: Option<String>,
    mounts: Vec<Mount>,
    exposed_ports: Vec<u16>,
    bindings: Vec<ServiceBinding>,
    ops: Vec<Op>,
}

impl Container {
    /// Empty container with no base image
    pub fn new() -> Self {
        Self::default()
    }

    /// Container built from `image`
    pub fn from_image(image: impl Into<String>) -> Self {
        Self {
            image: Some(image.into()),
            ..Self::default()
        }
    }

    /// Replace the base image
    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }

    pub fn with_env_variable(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(name.into(), value.into());
        self
    }

    pub fn with_workdir(mut self, path: impl Into<String>) -> Self {
        self.workdir = Some(path.into());
        self
    }

    /// Mount a cache volume at `path`. A later mount on the same path replaces it.
    pub fn with_mounted_cache(
        mut self,
        path: impl Into<String>,
        volume: CacheVolume,
        sharing: CacheSharing,
    ) -> Self {
        let path = path.into();
        self.mounts.retain(|m| m.path() != path);
        self.mounts.push(Mount::Cache {
            path,
            volume,
            sharing,
        });
        self
    }

    /// Mount a directory at `path`. A later mount on the same path replaces it.
    pub fn with_mounted_directory(mut self, path: impl Into<String>, source: Directory) -> Self {
        let path = path.into();
        self.mounts.retain(|m| m.path() != path);
        self.mounts.push(Mount::Directory { path, source });
        self
    }

    /// Copy a directory's contents into the container filesystem at `path`
    pub fn with_directory(mut self, path: impl Into<String>, source: Directory) -> Self {
        self.ops.push(Op::CopyDirectory {
            path: path.into(),
            source,
        });
        self
    }

    pub fn with_new_file(mut self, path: impl Into<String>, contents: impl Into<String>) -> Self {
        self.ops.push(Op::NewFile {
            path: path.into(),
            contents: contents.into(),
        });
        self
    }

    pub fn with_exposed_port(mut self, port: u16) -> Self {
        if !self.exposed_ports.contains(&port) {
            self.exposed_ports.push(port);
        }
        self
    }

    /// Bind `service` as a peer reachable under `alias`
    pub fn with_service_binding(mut self, alias: impl Into<String>, service: Service) -> Self {
        let alias = alias.into();
        self.bindings.retain(|b| b.alias != alias);
        self.bindings.push(ServiceBinding { alias, service });
        self
    }

    pub fn with_exec<S: Into<String>>(self, args: impl IntoIterator<Item = S>) -> Self {
        self.with_exec_opts(args, ExecOpts::default())
    }

    pub fn with_exec_opts<S: Into<String>>(
        mut self,
        args: impl IntoIterator<Item = S>,
        opts: ExecOpts,
    ) -> Self {
        let step = ExecStep {
            args: args.into_iter().map(Into::into).collect(),
            env: self.env.clone(),
            workdir: self.workdir.clone(),
            insecure_root_capabilities: opts.insecure_root_capabilities,
        };
        self.ops.push(Op::Exec(step));
        self
    }

    /// Directory at `path` inside this container (after all steps ran)
    pub fn directory(&self, path: impl Into<String>) -> Directory {
        Directory::from_container(self.clone(), path)
    }

    /// File at `path` inside this container (after all steps ran)
    pub fn file(&self, path: impl Into<String>) -> File {
        File::new(self.clone(), path)
    }

    /// Turn this container into a service; its last exec is the service command
    pub fn as_service(self) -> Service {
        Service::new(self)
    }

    pub fn image(&self) -> Option<&str> {
        self.image.as_deref()
    }

    pub fn env(&self) -> &BTreeMap<String, String> {
        &self.env
    }

    pub fn env_variable(&self, name: &str) -> Option<&str> {
        self.env.get(name).map(String::as_str)
    }

    pub fn workdir(&self) -> Option<&str> {
        self.workdir.as_deref()
    }

    pub fn mounts(&self) -> &[Mount] {
        &self.mounts
    }

    /// Mount whose target is exactly `path`
    pub fn mount_at(&self, path: &str) -> Option<&Mount> {
        self.mounts.iter().find(|m| m.path() == path)
    }

    pub fn exposed_ports(&self) -> &[u16] {
        &self.exposed_ports
    }

    pub fn service_bindings(&self) -> &[ServiceBinding] {
        &self.bindings
    }

    /// Service bound under `alias`
    pub fn service_binding(&self, alias: &str) -> Option<&Service> {
        self.bindings
            .iter()
            .find(|b| b.alias == alias)
            .map(|b| &b.service)
    }

    pub fn ops(&self) -> &[Op] {
        &self.ops
    }

    /// Exec steps in the order they will run
    pub fn exec_steps(&self) -> impl Iterator<Item = &ExecStep> {
        self.ops.iter().filter_map(|op| match op {
            Op::Exec(step) => Some(step),
            _ => None,
        })
    }

    pub fn last_exec(&self) -> Option<&ExecStep> {
        self.exec_steps().last()
    }

    /// Whether any step needs a privileged container
    pub fn needs_privileges(&self) -> bool {
        self.exec_steps().any(|s| s.insecure_root_capabilities)
    }

    /// Split off the trailing exec step, if the container ends with one
    pub(crate) fn split_last_exec(&self) -> Option<(Container, ExecStep)> {
        match self.ops.last() {
            Some(Op::Exec(step)) => {
                let mut prefix = self.clone();
                prefix.ops.pop();
                Some((prefix, step.clone()))
            }
            _ => None,
        }
    }

    /// Short human-readable description for logs
    pub fn describe(&self) -> String {
        match (&self.image, self.last_exec()) {
            (Some(image), Some(step)) => format!("{} ({})", image, step.command_line()),
            (Some(image), None) => image.clone(),
            (None, _) => "scratch".to_string(),
        }
    }
}

/// Join a container path with a relative component.
///
/// Leading `./` and `/` on `rel` are ignored; `.` and an empty string
/// resolve to `base` itself.
pub fn join_path(base: &str, rel: &str) -> String {
    let mut rel = rel;
    while let Some(rest) = rel.strip_prefix("./") {
        rel = rest;
    }
    let rel = rel.trim_start_matches('/');
    if rel.is_empty() || rel == "." {
        return base.to_string();
    }
    format!("{}/{}", base.trim_end_matches('/'), rel)
}
