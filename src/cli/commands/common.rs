//! Helpers shared by the Go commands

use crate::cli::args::ProjectArgs;
use crate::config::Config;
use crate::engine::{create_engine, ContainerEngine, Directory};
use crate::error::{GostageError, GostageResult};
use crate::golang::Golang;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

/// Apply command-line overrides on top of the loaded configuration
pub fn apply_overrides(config: &Config, project: &ProjectArgs) -> Config {
    let mut config = config.clone();
    if let Some(version) = &project.go_version {
        config.golang.version = version.clone();
    }
    if project.vendor {
        config.golang.vendor = true;
    }
    if project.require_docker {
        config.golang.require_docker = true;
    }
    config
}

/// Create the engine and make sure it answers
pub async fn connect(config: &Config) -> GostageResult<Arc<dyn ContainerEngine>> {
    let engine = create_engine(config)?;
    engine.ensure_ready().await?;
    debug!("Using {}", engine.runtime_name());
    Ok(engine)
}

/// Absolute project directory; the current directory when `source` is unset
pub fn project_dir(source: Option<&Path>) -> GostageResult<PathBuf> {
    let dir = match source {
        Some(path) => path.to_path_buf(),
        None => std::env::current_dir()
            .map_err(|e| GostageError::io("getting current directory", e))?,
    };

    let dir = dir
        .canonicalize()
        .map_err(|_| GostageError::PathNotFound(dir.clone()))?;

    if !dir.join("go.mod").is_file() {
        warn!("No go.mod in {}", dir.display());
    }
    Ok(dir)
}

/// `Golang` helper bound to the project at `dir`
pub fn project_golang(
    engine: Arc<dyn ContainerEngine>,
    config: &Config,
    dir: &Path,
) -> GostageResult<Golang> {
    let golang = Golang::from_config(engine, config).with_project(Directory::host(dir));

    if !config.golang.vendor {
        return Ok(golang);
    }

    let vendor = dir.join("vendor");
    if !vendor.is_dir() {
        return Err(GostageError::User(format!(
            "Vendored build requested but {} does not exist. Run: go mod vendor",
            vendor.display()
        )));
    }
    let version = config.golang.version.clone();
    Ok(golang.base_vendored(&version))
}

/// Tear the engine down, keeping the operation's error if there was one
pub async fn finish<T>(
    engine: &Arc<dyn ContainerEngine>,
    result: GostageResult<T>,
) -> GostageResult<T> {
    if let Err(e) = engine.shutdown().await {
        warn!("Engine cleanup failed: {}", e);
    }
    result
}

/// Relative output paths resolve against the current directory
pub fn output_path(path: &Path) -> GostageResult<PathBuf> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    let cwd = std::env::current_dir()
        .map_err(|e| GostageError::io("getting current directory", e))?;
    Ok(cwd.join(path))
}
