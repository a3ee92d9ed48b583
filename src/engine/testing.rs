//! Recording engine for unit tests
//!
//! Nothing is executed. Every descriptor the code under test evaluates is
//! recorded so tests can inspect images, mounts, env and commands.

use crate::engine::container::Container;
use crate::engine::directory::{Directory, DirectorySource, File};
use crate::engine::runtime::{ContainerEngine, VolumeInfo};
use crate::engine::service::{format_endpoint, EndpointOpts, Service};
use crate::error::{GostageError, GostageResult};
use async_trait::async_trait;
use futures_util::future::try_join_all;
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

type Responder = Box<dyn Fn(&Container) -> GostageResult<String> + Send + Sync>;

/// Host name the fake resolves every service to
pub(crate) const FAKE_SERVICE_HOST: &str = "dind.fake";

pub(crate) struct FakeEngine {
    evaluated: Mutex<Vec<Container>>,
    volumes: Mutex<Vec<VolumeInfo>>,
    endpoint_calls: AtomicUsize,
    endpoint_failure: Option<String>,
    responder: Responder,
    shut_down: AtomicBool,
}

impl FakeEngine {
    pub(crate) fn new() -> Self {
        Self {
            evaluated: Mutex::new(Vec::new()),
            volumes: Mutex::new(Vec::new()),
            endpoint_calls: AtomicUsize::new(0),
            endpoint_failure: None,
            responder: Box::new(|_| Ok(String::new())),
            shut_down: AtomicBool::new(false),
        }
    }

    /// Make every endpoint lookup fail with `reason`
    pub(crate) fn failing_endpoint(mut self, reason: impl Into<String>) -> Self {
        self.endpoint_failure = Some(reason.into());
        self
    }

    /// Decide the stdout (or failure) of each evaluated container
    pub(crate) fn with_responder<F>(mut self, responder: F) -> Self
    where
        F: Fn(&Container) -> GostageResult<String> + Send + Sync + 'static,
    {
        self.responder = Box::new(responder);
        self
    }

    pub(crate) fn with_volume(self, name: &str, labels: HashMap<String, String>) -> Self {
        self.lock_volumes().push(VolumeInfo {
            name: name.to_string(),
            labels,
        });
        self
    }

    /// Containers evaluated so far, in order
    pub(crate) fn evaluated(&self) -> Vec<Container> {
        self.lock_evaluated().clone()
    }

    pub(crate) fn last_evaluated(&self) -> Option<Container> {
        self.lock_evaluated().last().cloned()
    }

    pub(crate) fn endpoint_calls(&self) -> usize {
        self.endpoint_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn volume_names(&self) -> Vec<String> {
        self.lock_volumes().iter().map(|v| v.name.clone()).collect()
    }

    pub(crate) fn was_shut_down(&self) -> bool {
        self.shut_down.load(Ordering::SeqCst)
    }

    fn record(&self, container: &Container) {
        self.lock_evaluated().push(container.clone());
    }

    fn lock_evaluated(&self) -> std::sync::MutexGuard<'_, Vec<Container>> {
        self.evaluated.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn lock_volumes(&self) -> std::sync::MutexGuard<'_, Vec<VolumeInfo>> {
        self.volumes.lock().unwrap_or_else(|e| e.into_inner())
    }

    async fn materialize_file(&self, file: &File) -> GostageResult<()> {
        tokio::task::yield_now().await;
        self.record(file.container());
        Ok(())
    }
}

#[async_trait]
impl ContainerEngine for FakeEngine {
    async fn is_available(&self) -> GostageResult<bool> {
        Ok(true)
    }

    async fn ensure_ready(&self) -> GostageResult<()> {
        Ok(())
    }

    async fn endpoint(&self, service: &Service, opts: &EndpointOpts) -> GostageResult<String> {
        self.endpoint_calls.fetch_add(1, Ordering::SeqCst);

        if let Some(reason) = &self.endpoint_failure {
            return Err(GostageError::EndpointResolutionFailed {
                service: service.to_string(),
                reason: reason.clone(),
            });
        }

        let port = service
            .endpoint_port(opts)
            .ok_or_else(|| GostageError::EndpointResolutionFailed {
                service: service.to_string(),
                reason: "service exposes no ports".to_string(),
            })?;
        Ok(format_endpoint(opts.scheme.as_deref(), FAKE_SERVICE_HOST, port))
    }

    async fn stdout(&self, container: &Container) -> GostageResult<String> {
        self.record(container);
        (self.responder)(container)
    }

    async fn export_directory(&self, dir: &Directory, dest: &Path) -> GostageResult<()> {
        if let DirectorySource::Container { container, .. } = dir.source() {
            self.record(container);
        }
        tokio::fs::create_dir_all(dest)
            .await
            .map_err(|e| GostageError::io("creating export directory", e))
    }

    async fn export_file(&self, file: &File, dest: &Path) -> GostageResult<()> {
        self.record(file.container());
        tokio::fs::write(dest, b"")
            .await
            .map_err(|e| GostageError::io("writing exported file", e))
    }

    async fn entries(&self, dir: &Directory) -> GostageResult<Vec<String>> {
        try_join_all(dir.files().iter().map(|(_, file)| self.materialize_file(file))).await?;

        let mut names: Vec<String> = dir
            .files()
            .iter()
            .filter_map(|(path, _)| path.trim_start_matches('/').split('/').next())
            .map(str::to_string)
            .collect();
        names.sort();
        names.dedup();
        Ok(names)
    }

    async fn publish(&self, container: &Container, tag: &str) -> GostageResult<String> {
        self.record(container);
        Ok(format!("sha256:fake-{}", tag))
    }

    async fn volume_list(&self, label: &str) -> GostageResult<Vec<VolumeInfo>> {
        Ok(self
            .lock_volumes()
            .iter()
            .filter(|v| v.labels.contains_key(label))
            .cloned()
            .collect())
    }

    async fn volume_remove(&self, name: &str) -> GostageResult<()> {
        let mut volumes = self.lock_volumes();
        let before = volumes.len();
        volumes.retain(|v| v.name != name);
        if volumes.len() == before {
            return Err(GostageError::command_exec(
                "volume rm",
                format!("no such volume: {}", name),
            ));
        }
        Ok(())
    }

    async fn shutdown(&self) -> GostageResult<()> {
        self.shut_down.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn runtime_name(&self) -> &'static str {
        "Fake"
    }
}
