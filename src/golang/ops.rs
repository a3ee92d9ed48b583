//! Go operations: build, test, lint, vulnerability scan
//!
//! Each operation rebinds the project if a source is given, prepares the
//! container through the pipeline, appends its command and evaluates it.
//! Arguments are passed to the engine as-is, without a shell.

use crate::config::schema::GolangConfig;
use crate::config::Config;
use crate::engine::{join_path, Container, ContainerEngine, Directory, Service};
use crate::error::GostageResult;
use crate::golang::attach::attach_service;
use crate::golang::constants::{
    DEFAULT_DOCKER_VERSION, GOVULNCHECK_PKG, INSTALL_PATH, OUT_DIR, PROJ_MOUNT, REMOTE_OUT_DIR,
};
use crate::golang::pipeline::prepare;
use crate::golang::platform::{host_goarch, host_goos};
use crate::golang::provision::docker_service;
use crate::golang::state::{base_container, base_image, BuildState};
use std::sync::Arc;
use tracing::info;

/// Options for `build` and `build_container`
#[derive(Debug, Clone, Default)]
pub struct BuildOpts {
    /// Project to build; the bound project when `None`
    pub source: Option<Directory>,
    /// Extra arguments to `go build`
    pub args: Vec<String>,
    /// `GOARCH`; host architecture when `None`
    pub arch: Option<String>,
    /// `GOOS`; host OS when `None`
    pub os: Option<String>,
}

/// Options for `test`
#[derive(Debug, Clone)]
pub struct TestOpts {
    pub source: Option<Directory>,
    pub component: String,
    pub coverage_location: String,
    pub timeout: String,
}

impl Default for TestOpts {
    fn default() -> Self {
        Self {
            source: None,
            component: "./...".to_string(),
            coverage_location: "./".to_string(),
            timeout: "180s".to_string(),
        }
    }
}

/// Options for `golangci_lint`
#[derive(Debug, Clone)]
pub struct LintOpts {
    pub source: Option<Directory>,
    /// Package pattern; selects the directory the linter runs in
    pub component: String,
    pub timeout: String,
}

impl Default for LintOpts {
    fn default() -> Self {
        Self {
            source: None,
            component: "./...".to_string(),
            timeout: "5m".to_string(),
        }
    }
}

/// Options for `vulncheck`
#[derive(Debug, Clone)]
pub struct VulncheckOpts {
    pub source: Option<Directory>,
    pub component: String,
}

impl Default for VulncheckOpts {
    fn default() -> Self {
        Self {
            source: None,
            component: "./...".to_string(),
        }
    }
}

/// Options for `build_remote`
#[derive(Debug, Clone, Default)]
pub struct RemoteBuildOpts {
    /// Repository without scheme, e.g. `github.com/acme/tool`
    pub remote: String,
    /// Branch to check out
    pub reference: String,
    /// Package to build
    pub module: String,
    pub arch: Option<String>,
    pub platform: Option<String>,
}

/// Result of a vulnerability scan
#[derive(Debug, Clone)]
pub struct VulncheckReport {
    /// govulncheck output
    pub output: String,
    /// The prepared container with govulncheck installed; adopt it with
    /// `Golang::with_container` to skip the install next time
    pub container: Container,
}

/// Go build helper bound to an engine
#[derive(Clone)]
pub struct Golang {
    engine: Arc<dyn ContainerEngine>,
    state: BuildState,
    settings: GolangConfig,
    caches: bool,
}

impl Golang {
    /// Helper on `golang:<version>` with default settings
    pub fn new(engine: Arc<dyn ContainerEngine>) -> Self {
        Self::from_config(engine, &Config::default())
    }

    /// Helper configured from `config` (Go version, images, cache and
    /// sidecar policy). The vendored base is applied once a project is bound.
    pub fn from_config(engine: Arc<dyn ContainerEngine>, config: &Config) -> Self {
        let settings = config.golang.clone();
        let caches = config.cache.enabled;
        let container = if caches {
            base_container(&settings.version)
        } else {
            base_image(&settings.version)
        };

        Self {
            engine,
            state: BuildState::from_container(container),
            settings,
            caches,
        }
    }

    pub fn engine(&self) -> &Arc<dyn ContainerEngine> {
        &self.engine
    }

    pub fn state(&self) -> &BuildState {
        &self.state
    }

    pub fn settings(&self) -> &GolangConfig {
        &self.settings
    }

    /// The build container
    pub fn container(&self) -> &Container {
        self.state.container()
    }

    /// The project directory; `/src` of the container when none is bound
    pub fn project(&self) -> Directory {
        self.state.project_or_default()
    }

    pub fn with_project(self, project: Directory) -> Self {
        Self {
            state: self.state.with_project(project),
            ..self
        }
    }

    /// Bring your own container
    pub fn with_container(self, container: Container) -> Self {
        Self {
            state: self.state.with_container(container),
            ..self
        }
    }

    /// Rebuild the container on `golang:<version>`
    pub fn base(self, version: &str) -> Self {
        let container = self.base_for(version);
        Self {
            state: self.state.with_container(container),
            ..self
        }
    }

    /// Rebuild the container on `golang:<version>` with the project's
    /// vendor directory and `GOFLAGS=-mod=vendor`
    pub fn base_vendored(self, version: &str) -> Self {
        let container = self.base_for(version);
        Self {
            state: self.state.vendored_on(container),
            ..self
        }
    }

    fn base_for(&self, version: &str) -> Container {
        if self.caches {
            base_container(version)
        } else {
            base_image(version)
        }
    }

    /// Docker-in-Docker service for `version`
    pub fn service(&self, version: &str) -> Service {
        docker_service(version)
    }

    /// Attach a fresh docker sidecar to `container`
    pub async fn attach(&self, container: &Container) -> GostageResult<Container> {
        let version = self.docker_version();
        attach_service(self.engine.as_ref(), container, docker_service(version)).await
    }

    /// Build the project; returns `/out/`
    pub async fn build(&self, opts: &BuildOpts) -> GostageResult<Directory> {
        Ok(self.compile(opts).await?.directory(OUT_DIR))
    }

    /// Build the project and copy the output to `/usr/local/bin/` of `base`
    /// (`golang.build_base` when `None`)
    pub async fn build_container(
        &self,
        opts: &BuildOpts,
        base: Option<Container>,
    ) -> GostageResult<Container> {
        let out = self.build(opts).await?;
        let base = base.unwrap_or_else(|| Container::from_image(&self.settings.build_base));
        Ok(base.with_directory(INSTALL_PATH, out))
    }

    /// Run `go test`; returns its output. On failure the error carries the
    /// captured output (`GostageError::captured_output`).
    pub async fn test(&self, opts: &TestOpts) -> GostageResult<String> {
        let state = self.state_for(&opts.source);
        let command = [
            "go",
            "test",
            opts.component.as_str(),
            "-coverprofile",
            opts.coverage_location.as_str(),
            "-timeout",
            opts.timeout.as_str(),
            "-v",
        ];

        info!("Testing {}", opts.component);
        let container = self.prepare(&state).await?.with_exec(command);
        self.engine.stdout(&container).await
    }

    /// Install govulncheck, then scan `component`
    pub async fn vulncheck(&self, opts: &VulncheckOpts) -> GostageResult<VulncheckReport> {
        let state = self.state_for(&opts.source);
        let installed = self
            .prepare(&state)
            .await?
            .with_exec(["go", "install", GOVULNCHECK_PKG]);

        let scan_state = state.with_container(installed.clone());
        let scan = self
            .prepare(&scan_state)
            .await?
            .with_exec(["govulncheck", opts.component.as_str()]);

        info!("Scanning {} for vulnerabilities", opts.component);
        let output = self.engine.stdout(&scan).await?;
        Ok(VulncheckReport {
            output,
            container: installed,
        })
    }

    /// Run golangci-lint on the project, mounted at `/src` of the lint image.
    /// No sidecar is attached.
    pub async fn golangci_lint(&self, opts: &LintOpts) -> GostageResult<String> {
        let project = self.state_for(&opts.source).project_or_default();
        let container = Container::from_image(&self.settings.lint_image)
            .with_mounted_directory(PROJ_MOUNT, project)
            .with_workdir(lint_workdir(&opts.component))
            .with_exec(["golangci-lint", "run", "-v", "--timeout", opts.timeout.as_str()]);

        info!("Linting {}", opts.component);
        self.engine.stdout(&container).await
    }

    /// Clone `https://<remote>` at `reference` and build `module`; returns
    /// `/src/build/`
    pub async fn build_remote(&self, opts: &RemoteBuildOpts) -> GostageResult<Directory> {
        let tree = Directory::git(format!("https://{}", opts.remote), opts.reference.as_str());
        let state = self.state.clone().with_project(tree);
        let (arch, os) = target(&opts.arch, &opts.platform);

        info!(
            "Building {} from {}@{} for {}/{}",
            opts.module, opts.remote, opts.reference, os, arch
        );
        let container = self
            .prepare(&state)
            .await?
            .with_env_variable("GOARCH", arch)
            .with_env_variable("GOOS", os)
            .with_exec(["go", "build", "-o", REMOTE_OUT_DIR, opts.module.as_str()]);

        Ok(container.directory(format!("{}/{}", PROJ_MOUNT, REMOTE_OUT_DIR)))
    }

    async fn compile(&self, opts: &BuildOpts) -> GostageResult<Container> {
        let state = self.state_for(&opts.source);
        let (arch, os) = target(&opts.arch, &opts.os);

        let mut command = vec!["go".to_string(), "build".to_string(), "-o".to_string()];
        command.push(OUT_DIR.to_string());
        command.extend(opts.args.iter().cloned());

        info!("Building for {}/{}", os, arch);
        Ok(self
            .prepare(&state)
            .await?
            .with_env_variable("GOARCH", arch)
            .with_env_variable("GOOS", os)
            .with_exec(command))
    }

    async fn prepare(&self, state: &BuildState) -> GostageResult<Container> {
        prepare(self.engine.as_ref(), state, self.docker_version())
            .await
            .resolve(self.settings.require_docker)
    }

    fn state_for(&self, source: &Option<Directory>) -> BuildState {
        match source {
            Some(dir) => self.state.clone().with_project(dir.clone()),
            None => self.state.clone(),
        }
    }

    /// Sidecar docker version, falling back to the default when unset
    pub fn docker_version(&self) -> &str {
        if self.settings.docker_version.is_empty() {
            DEFAULT_DOCKER_VERSION
        } else {
            self.settings.docker_version.as_str()
        }
    }
}

/// `GOARCH`/`GOOS`, defaulting to the host's
fn target(arch: &Option<String>, os: &Option<String>) -> (String, String) {
    (
        arch.clone().unwrap_or_else(|| host_goarch().to_string()),
        os.clone().unwrap_or_else(|| host_goos().to_string()),
    )
}

/// Directory golangci-lint runs in for a package pattern: `./...` is the
/// project root, `./pkg/api/...` is `/src/pkg/api`
pub fn lint_workdir(component: &str) -> String {
    let dir = component.trim_end_matches("...").trim_end_matches('/');
    join_path(PROJ_MOUNT, dir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::testing::FakeEngine;
    use crate::engine::{DirectorySource, Mount, Op};
    use crate::error::GostageError;

    fn golang(engine: &Arc<FakeEngine>) -> Golang {
        let engine: Arc<dyn ContainerEngine> = engine.clone();
        Golang::new(engine).with_project(Directory::host("/work/app"))
    }

    fn source_container(dir: &Directory) -> &Container {
        match dir.source() {
            DirectorySource::Container { container, .. } => container,
            other => panic!("expected container directory, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn build_sets_target_env_before_exec() {
        let engine = Arc::new(FakeEngine::new());
        let opts = BuildOpts {
            args: vec!["./cmd/app".to_string()],
            arch: Some("arm64".to_string()),
            os: Some("linux".to_string()),
            ..BuildOpts::default()
        };

        let out = golang(&engine).build(&opts).await.unwrap();

        let DirectorySource::Container { container, path } = out.source() else {
            panic!("expected container directory");
        };
        assert_eq!(path, "/out/");
        let step = container.last_exec().unwrap();
        assert_eq!(step.args, vec!["go", "build", "-o", "/out/", "./cmd/app"]);
        assert_eq!(step.env.get("GOARCH").map(String::as_str), Some("arm64"));
        assert_eq!(step.env.get("GOOS").map(String::as_str), Some("linux"));
        assert_eq!(step.workdir.as_deref(), Some("/src"));
    }

    #[tokio::test]
    async fn build_defaults_to_host_target() {
        let engine = Arc::new(FakeEngine::new());
        let out = golang(&engine).build(&BuildOpts::default()).await.unwrap();

        let step = source_container(&out).last_exec().unwrap().clone();
        assert_eq!(step.env.get("GOARCH").map(String::as_str), Some(host_goarch()));
        assert_eq!(step.env.get("GOOS").map(String::as_str), Some(host_goos()));
    }

    #[tokio::test]
    async fn build_source_overrides_bound_project() {
        let engine = Arc::new(FakeEngine::new());
        let opts = BuildOpts {
            source: Some(Directory::host("/other")),
            ..BuildOpts::default()
        };

        let helper = golang(&engine);
        let out = helper.build(&opts).await.unwrap();

        let copied = source_container(&out).ops().iter().find_map(|op| match op {
            Op::CopyDirectory { path, source } if path == "/src" => Some(source.clone()),
            _ => None,
        });
        assert_eq!(copied, Some(Directory::host("/other")));
        // the helper keeps its own project
        assert_eq!(helper.project(), Directory::host("/work/app"));
    }

    #[tokio::test]
    async fn build_container_copies_into_install_path() {
        let engine = Arc::new(FakeEngine::new());
        let ctr = golang(&engine)
            .build_container(&BuildOpts::default(), None)
            .await
            .unwrap();

        assert_eq!(ctr.image(), Some("ubuntu:latest"));
        match ctr.ops().last() {
            Some(Op::CopyDirectory { path, source }) => {
                assert_eq!(path, "/usr/local/bin/");
                assert!(matches!(
                    source.source(),
                    DirectorySource::Container { path, .. } if path == "/out/"
                ));
            }
            other => panic!("unexpected op: {:?}", other),
        }

        let custom = golang(&engine)
            .build_container(&BuildOpts::default(), Some(Container::from_image("alpine:3.18")))
            .await
            .unwrap();
        assert_eq!(custom.image(), Some("alpine:3.18"));
    }

    #[tokio::test]
    async fn test_runs_go_test_and_returns_output() {
        let engine = Arc::new(FakeEngine::new().with_responder(|_| {
            Ok(concat!(
                "=== RUN   TestAdd\n",
                "--- PASS: TestAdd (0.00s)\n",
                "PASS\n",
                "ok  \texample.com/app\t0.01s\n",
            )
            .to_string())
        }));
        let opts = TestOpts {
            timeout: "30s".to_string(),
            ..TestOpts::default()
        };

        let output = golang(&engine).test(&opts).await.unwrap();

        assert!(output.contains("PASS"));
        let ctr = engine.last_evaluated().unwrap();
        assert_eq!(
            ctr.last_exec().unwrap().args,
            vec!["go", "test", "./...", "-coverprofile", "./", "-timeout", "30s", "-v"]
        );
        assert_eq!(ctr.env_variable("DOCKER_HOST"), Some("tcp://dind.fake:2375"));
    }

    #[tokio::test]
    async fn test_failure_carries_compiler_output() {
        let engine = Arc::new(FakeEngine::new().with_responder(|ctr| {
            Err(GostageError::ExecFailed {
                command: ctr.last_exec().unwrap().command_line(),
                code: 1,
                stdout: "FAIL\texample.com/app [build failed]\n".to_string(),
                stderr: "./main.go:5:2: undefined: fmt.Printn\n".to_string(),
            })
        }));

        let err = golang(&engine).test(&TestOpts::default()).await.unwrap_err();

        let output = err.captured_output().unwrap();
        assert!(output.contains("undefined: fmt.Printn"));
        assert!(output.contains("FAIL"));
    }

    #[tokio::test]
    async fn test_continues_without_sidecar() {
        let engine = Arc::new(FakeEngine::new().failing_endpoint("no privileged containers"));

        golang(&engine).test(&TestOpts::default()).await.unwrap();

        let ctr = engine.last_evaluated().unwrap();
        assert!(ctr.env_variable("DOCKER_HOST").is_none());
        assert_eq!(ctr.workdir(), Some("/src"));
    }

    #[tokio::test]
    async fn strict_policy_fails_without_sidecar() {
        let engine = Arc::new(FakeEngine::new().failing_endpoint("no privileged containers"));
        let mut config = Config::default();
        config.golang.require_docker = true;
        let dyn_engine: Arc<dyn ContainerEngine> = engine.clone();
        let helper = Golang::from_config(dyn_engine, &config).with_project(Directory::host("/p"));

        let err = helper.test(&TestOpts::default()).await.unwrap_err();

        assert!(matches!(err, GostageError::DaemonUnavailable(_)));
        assert!(engine.evaluated().is_empty());
    }

    #[tokio::test]
    async fn vulncheck_installs_then_scans() {
        let engine = Arc::new(
            FakeEngine::new().with_responder(|_| Ok("No vulnerabilities found.".to_string())),
        );
        let opts = VulncheckOpts {
            component: "./cmd/...".to_string(),
            ..VulncheckOpts::default()
        };

        let report = golang(&engine).vulncheck(&opts).await.unwrap();

        assert_eq!(report.output, "No vulnerabilities found.");
        assert_eq!(
            report.container.last_exec().unwrap().args,
            vec!["go", "install", "golang.org/x/vuln/cmd/govulncheck@latest"]
        );

        let scanned = engine.last_evaluated().unwrap();
        let commands: Vec<String> = scanned.exec_steps().map(|s| s.command_line()).collect();
        assert_eq!(
            commands,
            vec![
                "go install golang.org/x/vuln/cmd/govulncheck@latest",
                "govulncheck ./cmd/...",
            ]
        );
        // each preparation resolved its own sidecar
        assert_eq!(engine.endpoint_calls(), 2);
    }

    #[tokio::test]
    async fn lint_mounts_project_without_sidecar() {
        let engine = Arc::new(FakeEngine::new());
        let opts = LintOpts {
            component: "./pkg/api/...".to_string(),
            ..LintOpts::default()
        };

        golang(&engine).golangci_lint(&opts).await.unwrap();

        let ctr = engine.last_evaluated().unwrap();
        assert_eq!(ctr.image(), Some("golangci/golangci-lint:latest"));
        assert_eq!(ctr.workdir(), Some("/src/pkg/api"));
        assert!(matches!(
            ctr.mount_at("/src"),
            Some(Mount::Directory { source, .. }) if *source == Directory::host("/work/app")
        ));
        assert_eq!(
            ctr.last_exec().unwrap().args,
            vec!["golangci-lint", "run", "-v", "--timeout", "5m"]
        );
        assert!(ctr.service_bindings().is_empty());
        assert_eq!(engine.endpoint_calls(), 0);
    }

    #[test]
    fn lint_workdir_from_component() {
        assert_eq!(lint_workdir("./..."), "/src");
        assert_eq!(lint_workdir("."), "/src");
        assert_eq!(lint_workdir(""), "/src");
        assert_eq!(lint_workdir("pkg/api"), "/src/pkg/api");
        assert_eq!(lint_workdir("./cmd/..."), "/src/cmd");
    }

    #[tokio::test]
    async fn build_remote_clones_and_builds() {
        let engine = Arc::new(FakeEngine::new());
        let opts = RemoteBuildOpts {
            remote: "github.com/acme/tool".to_string(),
            reference: "main".to_string(),
            module: "./cmd/tool".to_string(),
            arch: Some("amd64".to_string()),
            platform: Some("linux".to_string()),
        };

        let out = golang(&engine).build_remote(&opts).await.unwrap();

        let DirectorySource::Container { container, path } = out.source() else {
            panic!("expected container directory");
        };
        assert_eq!(path, "/src/build/");
        assert_eq!(
            container.last_exec().unwrap().args,
            vec!["go", "build", "-o", "build/", "./cmd/tool"]
        );
        let cloned = container.ops().iter().find_map(|op| match op {
            Op::CopyDirectory { source, .. } => Some(source.clone()),
            _ => None,
        });
        assert_eq!(
            cloned,
            Some(Directory::git("https://github.com/acme/tool", "main"))
        );
    }

    #[tokio::test]
    async fn attach_uses_configured_docker_version() {
        let engine = Arc::new(FakeEngine::new());
        let mut config = Config::default();
        config.golang.docker_version = "25.0".to_string();
        let dyn_engine: Arc<dyn ContainerEngine> = engine.clone();
        let helper = Golang::from_config(dyn_engine, &config);

        let attached = helper
            .attach(&Container::from_image("alpine:3.18"))
            .await
            .unwrap();

        assert_eq!(attached.service_binding("docker"), Some(&docker_service("25.0")));
        assert_eq!(helper.service("24.0"), docker_service("24.0"));
    }

    #[test]
    fn caches_can_be_disabled() {
        let mut config = Config::default();
        config.cache.enabled = false;
        let engine: Arc<dyn ContainerEngine> = Arc::new(FakeEngine::new());
        let helper = Golang::from_config(engine, &config);

        assert!(helper.container().mounts().is_empty());
        assert!(helper.base("1.22.0").container().mounts().is_empty());
    }

    #[test]
    fn vendored_base_uses_bound_project() {
        let engine: Arc<dyn ContainerEngine> = Arc::new(FakeEngine::new());
        let helper = Golang::new(engine)
            .with_project(Directory::host("/work/app"))
            .base_vendored("1.23.4");

        assert_eq!(helper.container().env_variable("GOFLAGS"), Some("-mod=vendor"));
        assert!(helper.container().mount_at("/src/vendor").is_some());
        assert_eq!(helper.project(), Directory::host("/work/app"));
    }
}
