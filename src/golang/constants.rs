//! Fixed paths, images and defaults

/// Default Go version (tag of the `golang` image)
pub const DEFAULT_GO: &str = "1.23.4";

/// Where the project is placed inside build containers
pub const PROJ_MOUNT: &str = "/src";

/// `go build` output directory
pub const OUT_DIR: &str = "/out/";

/// golangci-lint image
pub const LINT_IMAGE: &str = "golangci/golangci-lint:latest";

/// Port dockerd listens on inside the sidecar
pub const DOCKERD_PORT: u16 = 2375;

/// Default version of the Docker-in-Docker sidecar
pub const DEFAULT_DOCKER_VERSION: &str = "24.0";

/// Base image for `build_container` when none is given
pub const BUILD_CONTAINER_BASE: &str = "ubuntu:latest";

/// Where `build_container` installs the build output
pub const INSTALL_PATH: &str = "/usr/local/bin/";

/// Go module cache mount
pub const GO_MOD_CACHE_PATH: &str = "/go/pkg/mod";

/// Go build cache mount
pub const GO_BUILD_CACHE_PATH: &str = "/root/.cache/go-build";

/// Docker daemon data directory inside the sidecar
pub const DOCKER_DATA_PATH: &str = "/var/lib/docker";

/// Alias the sidecar is bound under
pub const DOCKER_ALIAS: &str = "docker";

/// Environment variable pointing docker clients at the sidecar
pub const DOCKER_HOST_ENV: &str = "DOCKER_HOST";

/// Package installed before a vulnerability scan
pub const GOVULNCHECK_PKG: &str = "golang.org/x/vuln/cmd/govulncheck@latest";

/// Output directory of `build_remote`, relative to the project
pub const REMOTE_OUT_DIR: &str = "build/";
