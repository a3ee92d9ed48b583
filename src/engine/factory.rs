//! Engine factory
//!
//! Picks the engine implementation from the configured CLI binary.

use crate::config::Config;
use crate::engine::docker_cli::CliEngine;
use crate::engine::runtime::ContainerEngine;
use crate::error::{GostageError, GostageResult};
use std::path::Path;
use std::sync::Arc;

/// Supported engine CLIs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineKind {
    Docker,
    Podman,
}

impl EngineKind {
    /// Classify an engine binary by its file name (`docker`, `/usr/bin/podman`, ...)
    pub fn detect(binary: &str) -> Option<Self> {
        let name = Path::new(binary).file_stem()?.to_str()?;
        match name {
            "docker" => Some(EngineKind::Docker),
            "podman" => Some(EngineKind::Podman),
            _ => None,
        }
    }

    /// Get a human-readable engine name
    pub fn name(&self) -> &'static str {
        match self {
            EngineKind::Docker => "Docker",
            EngineKind::Podman => "Podman",
        }
    }
}

/// Create the container engine named by `config.engine.binary`
pub fn create_engine(config: &Config) -> GostageResult<Arc<dyn ContainerEngine>> {
    match EngineKind::detect(&config.engine.binary) {
        Some(_) => Ok(Arc::new(CliEngine::new(&config.engine)?)),
        None => Err(GostageError::User(format!(
            "Unsupported engine binary '{}'; expected docker or podman",
            config.engine.binary
        ))),
    }
}
