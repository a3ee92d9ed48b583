//! Configuration schema for gostage
//!
//! Configuration is stored at `~/.config/gostage/config.toml`

use crate::golang::constants::{
    BUILD_CONTAINER_BASE, DEFAULT_DOCKER_VERSION, DEFAULT_GO, LINT_IMAGE,
};
use serde::{Deserialize, Serialize};

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,

    /// Container engine settings
    pub engine: EngineConfig,

    /// Go toolchain settings
    pub golang: GolangConfig,

    /// Cache settings
    pub cache: CacheConfig,
}

/// General application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Enable verbose logging
    pub verbose: bool,

    /// Log format: "text" or "json"
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            verbose: false,
            log_format: "text".to_string(),
        }
    }
}

/// Container engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Engine CLI to drive: "docker" or "podman"
    pub binary: String,

    /// Prefix for the per-process network and service container names
    pub network_prefix: String,

    /// How many times to probe a service port before giving up
    pub service_ready_attempts: u32,

    /// Delay between service readiness probes
    pub service_ready_interval_ms: u64,

    /// Leave service containers running on exit (for debugging)
    pub keep_services: bool,

    /// How long a locked cache mount waits for other users of the volume
    pub cache_lock_timeout_secs: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            binary: "docker".to_string(),
            network_prefix: "gostage".to_string(),
            service_ready_attempts: 60,
            service_ready_interval_ms: 500,
            keep_services: false,
            cache_lock_timeout_secs: 300,
        }
    }
}

/// Go toolchain configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GolangConfig {
    /// Go version (tag of the `golang` image)
    pub version: String,

    /// Docker version of the dind sidecar
    pub docker_version: String,

    /// golangci-lint image
    pub lint_image: String,

    /// Default base image for build-container
    pub build_base: String,

    /// Mount the project's vendor directory and build with -mod=vendor
    pub vendor: bool,

    /// Fail operations when the docker sidecar cannot be attached
    pub require_docker: bool,
}

impl Default for GolangConfig {
    fn default() -> Self {
        Self {
            version: DEFAULT_GO.to_string(),
            docker_version: DEFAULT_DOCKER_VERSION.to_string(),
            lint_image: LINT_IMAGE.to_string(),
            build_base: BUILD_CONTAINER_BASE.to_string(),
            vendor: false,
            require_docker: false,
        }
    }
}

/// Cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Mount the Go module and build caches (default: true)
    pub enabled: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}
