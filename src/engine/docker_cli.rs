//! Container engine driven through the Docker (or Podman) CLI
//!
//! Each descriptor is materialized as a real container that idles on
//! `tail -f /dev/null` while its steps are applied with `exec` and `cp`.
//! Services run on a per-process network; consumers reach them through
//! `--add-host <alias>:<ip>`.

use crate::cache::{CacheSharing, CacheVolume};
use crate::config::schema::EngineConfig;
use crate::engine::container::{join_path, Container, ExecStep, Mount, Op};
use crate::engine::directory::{Directory, DirectorySource, File};
use crate::engine::runtime::{ContainerEngine, VolumeInfo};
use crate::engine::service::{format_endpoint, EndpointOpts, Service};
use crate::engine::{copy_tree, error_tail};
use crate::error::{GostageError, GostageResult};
use async_trait::async_trait;
use futures_util::future::{try_join_all, BoxFuture};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::process::{Output, Stdio};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::process::Command;
use tokio::sync::{Mutex, OnceCell};
use tokio::time::Instant;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Keeps a materialized container alive while steps are applied
const KEEPALIVE: [&str; 3] = ["tail", "-f", "/dev/null"];

#[derive(Debug, Clone)]
struct RunningService {
    id: String,
    name: String,
    ip: String,
}

#[derive(Debug, Default)]
struct CreateOpts {
    name: Option<String>,
    privileged: bool,
}

struct Materialized {
    id: String,
    stdout: String,
}

/// Volumes handed out to private cache mounts
#[derive(Debug, Default)]
struct PrivateMounts {
    /// Volumes mounted directly by one of our containers
    claimed: HashSet<String>,
    /// Per-container copies, removed on shutdown
    copies: Vec<String>,
}

/// Container engine using the `docker` or `podman` command line
pub struct CliEngine {
    binary: String,
    config: EngineConfig,
    network: OnceCell<String>,
    /// One slot per descriptor; concurrent lookups wait on the same start
    services: Mutex<HashMap<Service, Arc<OnceCell<RunningService>>>>,
    private: Mutex<PrivateMounts>,
    scratch: TempDir,
}

impl CliEngine {
    /// Create a new CLI engine
    pub fn new(config: &EngineConfig) -> GostageResult<Self> {
        let scratch = tempfile::Builder::new()
            .prefix("gostage-")
            .tempdir()
            .map_err(|e| GostageError::io("creating scratch directory", e))?;

        Ok(Self {
            binary: config.binary.clone(),
            config: config.clone(),
            network: OnceCell::new(),
            services: Mutex::new(HashMap::new()),
            private: Mutex::new(PrivateMounts::default()),
            scratch,
        })
    }

    /// Check if the engine CLI is installed
    async fn installed(&self) -> bool {
        Command::new(&self.binary)
            .arg("--version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .map(|s| s.success())
            .unwrap_or(false)
    }

    /// Execute an engine command and return the output
    async fn exec<S: AsRef<str>>(&self, args: &[S]) -> GostageResult<Output> {
        let args: Vec<&str> = args.iter().map(AsRef::as_ref).collect();
        debug!("Executing: {} {:?}", self.binary, args);

        Command::new(&self.binary)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| GostageError::command_failed(format!("{} {:?}", self.binary, args), e))
    }

    /// Execute an engine command, failing on a non-zero exit; returns trimmed stdout
    async fn exec_checked<S: AsRef<str>>(&self, args: &[S]) -> GostageResult<String> {
        let output = self.exec(args).await?;

        if output.status.success() {
            Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
        } else {
            let subcommand = args.first().map(AsRef::as_ref).unwrap_or_default();
            Err(GostageError::command_exec(
                format!("{} {}", self.binary, subcommand),
                String::from_utf8_lossy(&output.stderr),
            ))
        }
    }

    /// Pull an image unless it exists locally
    async fn ensure_image(&self, image: &str) -> GostageResult<()> {
        if self.exec(&["image", "inspect", image]).await?.status.success() {
            return Ok(());
        }

        info!("Pulling image: {}", image);
        let output = self.exec(&["pull", image]).await?;

        if output.status.success() {
            Ok(())
        } else {
            Err(GostageError::ImagePull {
                image: image.to_string(),
                reason: String::from_utf8_lossy(&output.stderr).to_string(),
            })
        }
    }

    /// Network shared by all containers this engine starts
    async fn network(&self) -> GostageResult<&str> {
        let name = self
            .network
            .get_or_try_init(|| async {
                let name = format!("{}-{}", self.config.network_prefix, short_id());
                self.exec_checked(&["network", "create", name.as_str()])
                    .await?;
                debug!("Created network {}", name);
                Ok::<_, GostageError>(name)
            })
            .await?;
        Ok(name.as_str())
    }

    /// Create a labelled cache volume unless it already exists
    async fn ensure_volume(&self, volume: &CacheVolume) -> GostageResult<()> {
        if self.volume_exists(volume.name()).await? {
            return Ok(());
        }

        let mut args = vec!["volume".to_string(), "create".to_string()];
        for (key, value) in volume.labels() {
            args.push("--label".to_string());
            args.push(format!("{}={}", key, value));
        }
        args.push(volume.name().to_string());

        let output = self.exec(&args).await?;
        // Lost a creation race with a concurrent container
        if !output.status.success() && !self.volume_exists(volume.name()).await? {
            return Err(GostageError::CacheVolumeCreate {
                name: volume.name().to_string(),
                reason: String::from_utf8_lossy(&output.stderr).to_string(),
            });
        }

        debug!("Created cache volume {}", volume.name());
        Ok(())
    }

    async fn volume_exists(&self, name: &str) -> GostageResult<bool> {
        Ok(self.exec(&["volume", "inspect", name]).await?.status.success())
    }

    /// Whether a running container has `name` mounted
    async fn volume_in_use(&self, name: &str) -> GostageResult<bool> {
        let filter = format!("volume={}", name);
        let ids = self
            .exec_checked(&["ps", "-q", "--filter", filter.as_str()])
            .await?;
        Ok(!ids.is_empty())
    }

    /// Name of the volume to mount for a cache under `sharing`.
    ///
    /// A private mount of a volume that is already in use gets its own
    /// copy, removed on shutdown. A locked mount waits until no running
    /// container has the volume mounted.
    async fn cache_source(
        &self,
        volume: &CacheVolume,
        sharing: CacheSharing,
    ) -> GostageResult<String> {
        self.ensure_volume(volume).await?;

        match sharing {
            CacheSharing::Shared => Ok(volume.name().to_string()),
            CacheSharing::Locked => {
                self.wait_unused(volume.name()).await?;
                Ok(volume.name().to_string())
            }
            CacheSharing::Private => {
                let mut private = self.private.lock().await;
                if !private.claimed.contains(volume.name())
                    && !self.volume_in_use(volume.name()).await?
                {
                    private.claimed.insert(volume.name().to_string());
                    return Ok(volume.name().to_string());
                }

                let copy = volume.private_copy(&short_id());
                self.ensure_volume(&copy).await?;
                info!("Cache {} is in use, mounting {}", volume.name(), copy.name());
                private.copies.push(copy.name().to_string());
                Ok(copy.name().to_string())
            }
        }
    }

    async fn wait_unused(&self, name: &str) -> GostageResult<()> {
        let timeout = Duration::from_secs(self.config.cache_lock_timeout_secs);
        let interval = Duration::from_millis(self.config.service_ready_interval_ms.max(1));
        let started = Instant::now();

        while self.volume_in_use(name).await? {
            if started.elapsed() >= timeout {
                return Err(GostageError::CacheLocked {
                    name: name.to_string(),
                    waited_secs: timeout.as_secs(),
                });
            }
            debug!("Cache volume {} is locked, waiting", name);
            tokio::time::sleep(interval).await;
        }

        Ok(())
    }

    fn scratch_path(&self) -> PathBuf {
        self.scratch.path().join(Uuid::new_v4().simple().to_string())
    }

    /// Create and start a container with its mounts, bindings and env, but
    /// without applying any steps.
    fn create_and_start<'a>(
        &'a self,
        container: &'a Container,
        opts: CreateOpts,
    ) -> BoxFuture<'a, GostageResult<String>> {
        Box::pin(async move {
            let image = container.image().ok_or(GostageError::MissingImage)?;
            self.ensure_image(image).await?;
            let network = self.network().await?.to_string();

            let mut args = vec!["create".to_string(), "--network".to_string(), network];

            if let Some(name) = opts.name {
                args.push("--name".to_string());
                args.push(name);
            }
            if opts.privileged || container.needs_privileges() {
                args.push("--privileged".to_string());
            }

            for mount in container.mounts() {
                let spec = match mount {
                    Mount::Cache {
                        path,
                        volume,
                        sharing,
                    } => {
                        let source = self.cache_source(volume, *sharing).await?;
                        format!("{}:{}", source, path)
                    }
                    Mount::Directory { path, source } => {
                        let host = self.resolve_directory(source).await?;
                        format!("{}:{}", host.display(), path)
                    }
                };
                args.push("-v".to_string());
                args.push(spec);
            }

            for port in container.exposed_ports() {
                args.push("--expose".to_string());
                args.push(port.to_string());
            }

            for binding in container.service_bindings() {
                let running = self.start_service(&binding.service).await?;
                args.push("--add-host".to_string());
                args.push(format!("{}:{}", binding.alias, running.ip));
            }

            for (k, v) in container.env() {
                args.push("-e".to_string());
                args.push(format!("{}={}", k, v));
            }
            if let Some(workdir) = container.workdir() {
                args.push("-w".to_string());
                args.push(workdir.to_string());
            }

            args.push("--entrypoint".to_string());
            args.push(KEEPALIVE[0].to_string());
            args.push(image.to_string());
            args.extend(KEEPALIVE[1..].iter().map(|s| s.to_string()));

            let id = self
                .exec_checked(&args)
                .await
                .map_err(|e| GostageError::ContainerStart(e.to_string()))?;

            if let Err(e) = self.exec_checked(&["start", id.as_str()]).await {
                self.remove(&id).await;
                return Err(GostageError::ContainerStart(e.to_string()));
            }

            debug!("Container started: {} ({})", short(&id), container.describe());
            Ok(id)
        })
    }

    /// Run every step of `container`; the caller removes the returned container
    async fn materialize(&self, container: &Container) -> GostageResult<Materialized> {
        let id = self
            .create_and_start(container, CreateOpts::default())
            .await?;

        match self.apply_ops(&id, container.ops()).await {
            Ok(stdout) => Ok(Materialized { id, stdout }),
            Err(e) => {
                self.remove(&id).await;
                Err(e)
            }
        }
    }

    /// Apply steps in order; returns stdout of the last exec
    async fn apply_ops(&self, id: &str, ops: &[Op]) -> GostageResult<String> {
        let mut stdout = String::new();

        for op in ops {
            match op {
                Op::Exec(step) => {
                    stdout = self.run_step(id, step, false).await?;
                }
                Op::CopyDirectory { path, source } => {
                    let host = self.resolve_directory(source).await?;
                    self.exec_checked(&["exec", id, "mkdir", "-p", path.as_str()])
                        .await?;
                    let src = format!("{}/.", host.display());
                    let dest = format!("{}:{}", id, path);
                    self.exec_checked(&["cp", src.as_str(), dest.as_str()])
                        .await?;
                }
                Op::NewFile { path, contents } => {
                    let local = self.scratch_path();
                    tokio::fs::write(&local, contents)
                        .await
                        .map_err(|e| GostageError::io(format!("staging {}", path), e))?;
                    if let Some(parent) = Path::new(path).parent().and_then(Path::to_str) {
                        if !parent.is_empty() && parent != "/" {
                            self.exec_checked(&["exec", id, "mkdir", "-p", parent])
                                .await?;
                        }
                    }
                    let src = local.display().to_string();
                    let dest = format!("{}:{}", id, path);
                    self.exec_checked(&["cp", src.as_str(), dest.as_str()])
                        .await?;
                }
            }
        }

        Ok(stdout)
    }

    /// Run one exec step inside container `id`
    async fn run_step(&self, id: &str, step: &ExecStep, detach: bool) -> GostageResult<String> {
        let mut args = vec!["exec".to_string()];

        if detach {
            args.push("-d".to_string());
        }
        if step.insecure_root_capabilities {
            args.push("--privileged".to_string());
        }
        if let Some(workdir) = &step.workdir {
            args.push("-w".to_string());
            args.push(workdir.clone());
        }
        for (k, v) in &step.env {
            args.push("-e".to_string());
            args.push(format!("{}={}", k, v));
        }
        args.push(id.to_string());
        args.extend(step.args.iter().cloned());

        debug!("Running in {}: {}", short(id), step.command_line());
        let output = self.exec(&args).await?;
        let stdout = String::from_utf8_lossy(&output.stdout).to_string();

        if output.status.success() {
            Ok(stdout)
        } else {
            Err(GostageError::ExecFailed {
                command: step.command_line(),
                code: output.status.code().unwrap_or(-1),
                stdout,
                stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            })
        }
    }

    /// Start `service` unless an identical descriptor is already running.
    ///
    /// Concurrent callers for the same descriptor share one start. A failed
    /// start leaves the slot empty so the next caller retries.
    fn start_service<'a>(
        &'a self,
        service: &'a Service,
    ) -> BoxFuture<'a, GostageResult<RunningService>> {
        Box::pin(async move {
            let slot = self
                .services
                .lock()
                .await
                .entry(service.clone())
                .or_default()
                .clone();

            if let Some(running) = slot.get() {
                debug!("Reusing service {} ({})", service, running.name);
                return Ok(running.clone());
            }

            let running = slot.get_or_try_init(|| self.launch(service)).await?;
            Ok(running.clone())
        })
    }

    async fn launch(&self, service: &Service) -> GostageResult<RunningService> {
        let (prefix, command) = service.container().split_last_exec().ok_or_else(|| {
            GostageError::ServiceStart(format!("{} has no command to run", service))
        })?;

        let name = format!("{}-svc-{}", self.config.network_prefix, short_id());
        let opts = CreateOpts {
            name: Some(name.clone()),
            privileged: command.insecure_root_capabilities,
        };
        let id = self.create_and_start(&prefix, opts).await?;

        let started = async {
            self.apply_ops(&id, prefix.ops()).await?;
            self.run_step(&id, &command, true).await?;
            self.wait_ready(&id, service).await?;
            self.container_ip(&id).await
        }
        .await;

        match started {
            Ok(ip) => {
                info!("Service {} started as {}", service, name);
                Ok(RunningService { id, name, ip })
            }
            Err(e) => {
                self.remove(&id).await;
                Err(e)
            }
        }
    }

    /// Probe each exposed port from inside the service until it accepts connections
    async fn wait_ready(&self, id: &str, service: &Service) -> GostageResult<()> {
        let interval = Duration::from_millis(self.config.service_ready_interval_ms);
        let attempts = self.config.service_ready_attempts.max(1);

        for port in service.exposed_ports() {
            let port_arg = port.to_string();
            let mut ready = false;

            for attempt in 1..=attempts {
                if !self.is_running(id).await? {
                    let logs = self.exec(&["logs", "--tail", "50", id]).await?;
                    let tail = error_tail(
                        &String::from_utf8_lossy(&logs.stdout),
                        &String::from_utf8_lossy(&logs.stderr),
                    );
                    return Err(GostageError::ServiceStart(format!(
                        "{} exited:\n{}",
                        service, tail
                    )));
                }

                let probe = self
                    .exec(&["exec", id, "nc", "-z", "127.0.0.1", port_arg.as_str()])
                    .await?;
                match probe.status.code() {
                    Some(0) => {
                        ready = true;
                        break;
                    }
                    Some(126) | Some(127) => {
                        debug!("No nc in {}, skipping readiness probe", service);
                        ready = true;
                        break;
                    }
                    _ => {
                        debug!("Port {} of {} not ready (attempt {})", port, service, attempt);
                        tokio::time::sleep(interval).await;
                    }
                }
            }

            if !ready {
                return Err(GostageError::ServiceStart(format!(
                    "{} did not open port {} after {} attempts",
                    service, port, attempts
                )));
            }
        }

        Ok(())
    }

    async fn is_running(&self, id: &str) -> GostageResult<bool> {
        let state = self
            .exec_checked(&["inspect", "--format", "{{.State.Running}}", id])
            .await?;
        Ok(state == "true")
    }

    async fn container_ip(&self, id: &str) -> GostageResult<String> {
        let ips = self
            .exec_checked(&[
                "inspect",
                "--format",
                "{{range .NetworkSettings.Networks}}{{.IPAddress}} {{end}}",
                id,
            ])
            .await?;

        ips.split_whitespace()
            .next()
            .map(str::to_string)
            .ok_or_else(|| GostageError::ServiceStart(format!("{} has no IP address", short(id))))
    }

    /// Resolve a directory descriptor to a path on the host.
    ///
    /// Plain host directories are used in place; everything else is
    /// materialized under the scratch directory.
    fn resolve_directory<'a>(
        &'a self,
        dir: &'a Directory,
    ) -> BoxFuture<'a, GostageResult<PathBuf>> {
        Box::pin(async move {
            if let Some(host) = dir.as_host_path() {
                return host
                    .canonicalize()
                    .map_err(|_| GostageError::PathNotFound(host.clone()));
            }

            let target = self.scratch_path();
            tokio::fs::create_dir_all(&target)
                .await
                .map_err(|e| GostageError::io("creating scratch directory", e))?;

            let base = match dir.source() {
                DirectorySource::Empty => target,
                DirectorySource::Host(root) => {
                    let src = match dir.subpath() {
                        Some(sub) => root.join(sub),
                        None => root.clone(),
                    };
                    if !src.is_dir() {
                        return Err(GostageError::PathNotFound(src));
                    }
                    copy_tree(&src, &target).await?;
                    target
                }
                DirectorySource::Git { url, branch } => {
                    clone_branch(url, branch, &target).await?;
                    let base = match dir.subpath() {
                        Some(sub) => target.join(sub),
                        None => target,
                    };
                    if !base.is_dir() {
                        return Err(GostageError::PathNotFound(base));
                    }
                    base
                }
                DirectorySource::Container { container, path } => {
                    let root = absolute_in(container, path);
                    let src = match dir.subpath() {
                        Some(sub) => join_path(&root, sub),
                        None => root,
                    };
                    let m = self.materialize(container).await?;
                    let from = format!("{}:{}/.", m.id, src.trim_end_matches('/'));
                    let to = target.display().to_string();
                    let copied = self.exec_checked(&["cp", from.as_str(), to.as_str()]).await;
                    self.remove(&m.id).await;
                    copied?;
                    target
                }
            };

            try_join_all(dir.files().iter().map(|(path, file)| {
                let dest = base.join(path.trim_start_matches('/'));
                async move { self.copy_file_out(file, &dest).await }
            }))
            .await?;

            Ok(base)
        })
    }

    async fn copy_file_out(&self, file: &File, dest: &Path) -> GostageResult<()> {
        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| GostageError::io(format!("creating {}", parent.display()), e))?;
        }

        let m = self.materialize(file.container()).await?;
        let from = format!("{}:{}", m.id, absolute_in(file.container(), file.path()));
        let to = dest.display().to_string();
        let copied = self.exec_checked(&["cp", from.as_str(), to.as_str()]).await;
        self.remove(&m.id).await;
        copied.map(|_| ())
    }

    /// Commit container `id`, restoring the entrypoint and cmd of `image`
    async fn commit(&self, id: &str, image: &str, tag: &str) -> GostageResult<String> {
        let entrypoint = self
            .exec_checked(&["image", "inspect", "--format", "{{json .Config.Entrypoint}}", image])
            .await?;
        let cmd = self
            .exec_checked(&["image", "inspect", "--format", "{{json .Config.Cmd}}", image])
            .await?;

        let args = vec![
            "commit".to_string(),
            "--change".to_string(),
            format!("ENTRYPOINT {}", exec_form(&entrypoint)?),
            "--change".to_string(),
            format!("CMD {}", exec_form(&cmd)?),
            id.to_string(),
            tag.to_string(),
        ];
        self.exec_checked(&args).await
    }

    /// Force-remove a container, logging failures
    async fn remove(&self, id: &str) {
        match self.exec(&["rm", "-f", id]).await {
            Ok(output) if output.status.success() => debug!("Removed container {}", short(id)),
            Ok(output) => warn!(
                "Failed to remove container {}: {}",
                short(id),
                String::from_utf8_lossy(&output.stderr).trim()
            ),
            Err(e) => warn!("Failed to remove container {}: {}", short(id), e),
        }
    }
}

#[async_trait]
impl ContainerEngine for CliEngine {
    async fn is_available(&self) -> GostageResult<bool> {
        if !self.installed().await {
            return Ok(false);
        }
        Ok(self.exec(&["info"]).await?.status.success())
    }

    async fn ensure_ready(&self) -> GostageResult<()> {
        if !self.installed().await {
            return Err(GostageError::EngineNotFound {
                binary: self.binary.clone(),
            });
        }

        let output = self.exec(&["info"]).await?;
        if !output.status.success() {
            return Err(GostageError::EngineUnavailable(
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            ));
        }

        Ok(())
    }

    async fn endpoint(&self, service: &Service, opts: &EndpointOpts) -> GostageResult<String> {
        let port = service
            .endpoint_port(opts)
            .ok_or_else(|| GostageError::EndpointResolutionFailed {
                service: service.to_string(),
                reason: "service exposes no ports".to_string(),
            })?;

        let running = self.start_service(service).await.map_err(|e| {
            GostageError::EndpointResolutionFailed {
                service: service.to_string(),
                reason: e.to_string(),
            }
        })?;

        Ok(format_endpoint(opts.scheme.as_deref(), &running.ip, port))
    }

    async fn stdout(&self, container: &Container) -> GostageResult<String> {
        let m = self.materialize(container).await?;
        self.remove(&m.id).await;
        Ok(m.stdout)
    }

    async fn export_directory(&self, dir: &Directory, dest: &Path) -> GostageResult<()> {
        let src = self.resolve_directory(dir).await?;
        copy_tree(&src, dest).await?;
        info!("Exported {} to {}", dir, dest.display());
        Ok(())
    }

    async fn export_file(&self, file: &File, dest: &Path) -> GostageResult<()> {
        self.copy_file_out(file, dest).await?;
        info!("Exported {} to {}", file.path(), dest.display());
        Ok(())
    }

    async fn entries(&self, dir: &Directory) -> GostageResult<Vec<String>> {
        let path = self.resolve_directory(dir).await?;
        let mut reader = tokio::fs::read_dir(&path)
            .await
            .map_err(|e| GostageError::io(format!("reading {}", path.display()), e))?;

        let mut names = Vec::new();
        while let Some(entry) = reader
            .next_entry()
            .await
            .map_err(|e| GostageError::io("reading directory entry", e))?
        {
            names.push(entry.file_name().to_string_lossy().to_string());
        }
        names.sort();
        Ok(names)
    }

    async fn publish(&self, container: &Container, tag: &str) -> GostageResult<String> {
        let image = container.image().ok_or(GostageError::MissingImage)?;
        let m = self.materialize(container).await?;
        let result = self.commit(&m.id, image, tag).await;
        self.remove(&m.id).await;
        let image_id = result?;
        info!("Published {} as {}", short(&image_id), tag);
        Ok(image_id)
    }

    async fn volume_list(&self, label: &str) -> GostageResult<Vec<VolumeInfo>> {
        let filter = format!("label={}", label);
        let names = self
            .exec_checked(&["volume", "ls", "--filter", filter.as_str(), "--format", "{{.Name}}"])
            .await?;

        let mut volumes = Vec::new();
        for name in names.lines().map(str::trim).filter(|n| !n.is_empty()) {
            let raw = self
                .exec_checked(&["volume", "inspect", "--format", "{{json .Labels}}", name])
                .await?;
            let labels: Option<HashMap<String, String>> = serde_json::from_str(&raw)?;
            volumes.push(VolumeInfo {
                name: name.to_string(),
                labels: labels.unwrap_or_default(),
            });
        }

        Ok(volumes)
    }

    async fn volume_remove(&self, name: &str) -> GostageResult<()> {
        debug!("Removing volume: {}", name);
        self.exec_checked(&["volume", "rm", name]).await.map(|_| ())
    }

    async fn shutdown(&self) -> GostageResult<()> {
        let services: Vec<RunningService> = self
            .services
            .lock()
            .await
            .drain()
            .filter_map(|(_, slot)| slot.get().cloned())
            .collect();
        let copies = {
            let mut private = self.private.lock().await;
            private.claimed.clear();
            std::mem::take(&mut private.copies)
        };

        if self.config.keep_services {
            for running in &services {
                info!("Leaving service {} running", running.name);
            }
            return Ok(());
        }

        for running in &services {
            self.remove(&running.id).await;
        }

        for volume in &copies {
            if let Err(e) = self.volume_remove(volume).await {
                warn!("Failed to remove cache copy {}: {}", volume, e);
            }
        }

        if let Some(network) = self.network.get() {
            if let Err(e) = self.exec_checked(&["network", "rm", network.as_str()]).await {
                warn!("Failed to remove network {}: {}", network, e);
            }
        }

        Ok(())
    }

    fn runtime_name(&self) -> &'static str {
        if self.binary.ends_with("podman") {
            "Podman CLI"
        } else {
            "Docker CLI"
        }
    }
}

/// Shallow-clone `branch` of `url` into `target`
async fn clone_branch(url: &str, branch: &str, target: &Path) -> GostageResult<()> {
    info!("Cloning {} ({})", url, branch);

    let output = Command::new("git")
        .args(["clone", "--depth", "1", "--branch", branch, url])
        .arg(target)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await
        .map_err(|e| GostageError::command_failed("git clone", e))?;

    if output.status.success() {
        Ok(())
    } else {
        Err(GostageError::command_exec(
            format!("git clone {}", url),
            String::from_utf8_lossy(&output.stderr),
        ))
    }
}

/// Resolve a relative path against the container's working directory
fn absolute_in(container: &Container, path: &str) -> String {
    if path.starts_with('/') {
        path.to_string()
    } else {
        join_path(container.workdir().unwrap_or("/"), path)
    }
}

/// Render an image config value (`null`, string or array) in exec form
fn exec_form(raw: &str) -> GostageResult<String> {
    let value: serde_json::Value = serde_json::from_str(raw)?;
    let items = match value {
        serde_json::Value::Null => serde_json::Value::Array(Vec::new()),
        serde_json::Value::String(s) => {
            serde_json::Value::Array(vec![serde_json::Value::String(s)])
        }
        other => other,
    };
    Ok(serde_json::to_string(&items)?)
}

fn short_id() -> String {
    Uuid::new_v4().simple().to_string()[..12].to_string()
}

fn short(id: &str) -> &str {
    &id[..12.min(id.len())]
}
