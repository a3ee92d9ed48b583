//! Container engine abstraction
//!
//! Provides a trait for materializing container descriptors that can be
//! implemented by different backends (the Docker or Podman CLI, or an
//! in-memory fake in tests).

use crate::engine::container::Container;
use crate::engine::directory::{Directory, File};
use crate::engine::service::{EndpointOpts, Service};
use crate::error::GostageResult;
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::Path;

/// Information about a named volume
#[derive(Debug, Clone)]
pub struct VolumeInfo {
    /// Volume name
    pub name: String,
    /// Volume labels
    pub labels: HashMap<String, String>,
}

/// Abstract container engine interface
///
/// Every method that evaluates a descriptor runs all of its steps; a
/// failing step aborts the call. Cancellation is inherited from the
/// caller: dropping the future abandons the work.
#[async_trait]
pub trait ContainerEngine: Send + Sync {
    /// Check if the engine is available on this system
    async fn is_available(&self) -> GostageResult<bool>;

    /// Ensure the engine is ready to run containers
    async fn ensure_ready(&self) -> GostageResult<()>;

    /// Start `service` if needed and return its reachable address
    async fn endpoint(&self, service: &Service, opts: &EndpointOpts) -> GostageResult<String>;

    /// Run all steps of `container` and return the last command's stdout
    async fn stdout(&self, container: &Container) -> GostageResult<String>;

    /// Write the contents of `dir` to `dest` on the host
    async fn export_directory(&self, dir: &Directory, dest: &Path) -> GostageResult<()>;

    /// Write `file` to `dest` on the host
    async fn export_file(&self, file: &File, dest: &Path) -> GostageResult<()>;

    /// Names of the top-level entries of `dir`, sorted
    async fn entries(&self, dir: &Directory) -> GostageResult<Vec<String>>;

    /// Run `container` and commit the result as image `tag`; returns the image ID
    async fn publish(&self, container: &Container, tag: &str) -> GostageResult<String>;

    /// List volumes carrying `label`
    async fn volume_list(&self, label: &str) -> GostageResult<Vec<VolumeInfo>>;

    /// Remove a volume
    async fn volume_remove(&self, name: &str) -> GostageResult<()>;

    /// Stop services and release resources started by this engine
    async fn shutdown(&self) -> GostageResult<()>;

    /// Get the human-readable engine name for display
    fn runtime_name(&self) -> &'static str;
}
