//! Error types for gostage
//!
//! All modules use `GostageResult<T>` as their return type.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for gostage operations
pub type GostageResult<T> = Result<T, GostageError>;

/// All errors that can occur in gostage
#[derive(Error, Debug)]
pub enum GostageError {
    // Engine errors
    #[error("Container engine not found: {binary}. Install Docker or Podman, or set engine.binary")]
    EngineNotFound { binary: String },

    #[error("Container engine is not responding: {0}")]
    EngineUnavailable(String),

    #[error("Image pull failed: {image}: {reason}")]
    ImagePull { image: String, reason: String },

    #[error("Container has no base image; call from() before executing it")]
    MissingImage,

    #[error("Container failed to start: {0}")]
    ContainerStart(String),

    #[error("Command failed in container: {command}, exit code: {code}")]
    ExecFailed {
        command: String,
        code: i32,
        stdout: String,
        stderr: String,
    },

    #[error("Service failed to start: {0}")]
    ServiceStart(String),

    #[error("Failed to resolve endpoint of service {service}: {reason}")]
    EndpointResolutionFailed { service: String, reason: String },

    #[error("Docker daemon could not be attached: {0}")]
    DaemonUnavailable(String),

    // Cache errors
    #[error("Failed to create cache volume {name}: {reason}")]
    CacheVolumeCreate { name: String, reason: String },

    #[error("Cache volume {name} is still in use after {waited_secs}s")]
    CacheLocked { name: String, waited_secs: u64 },

    // Configuration errors
    #[error("Invalid configuration at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    #[error("Failed to create config directory {path}: {source}")]
    ConfigDirCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // IO errors
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Path not found: {0}")]
    PathNotFound(PathBuf),

    // Process errors
    #[error("Command failed: {command}")]
    CommandFailed {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Command execution error: {command}, stderr: {stderr}")]
    CommandExecution { command: String, stderr: String },

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    // General errors
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("{0}")]
    User(String),
}

impl GostageError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create a command failed error
    pub fn command_failed(command: impl Into<String>, source: std::io::Error) -> Self {
        Self::CommandFailed {
            command: command.into(),
            source,
        }
    }

    /// Create a command execution error
    pub fn command_exec(command: impl Into<String>, stderr: impl Into<String>) -> Self {
        Self::CommandExecution {
            command: command.into(),
            stderr: stderr.into(),
        }
    }

    /// Output captured from a failed in-container command, if any.
    ///
    /// Test, lint and vulncheck report their tool output together with the
    /// error, so callers can show compiler diagnostics or failing tests.
    pub fn captured_output(&self) -> Option<String> {
        match self {
            Self::ExecFailed { stdout, stderr, .. } => {
                let mut out = stdout.clone();
                if !stderr.is_empty() {
                    if !out.is_empty() && !out.ends_with('\n') {
                        out.push('\n');
                    }
                    out.push_str(stderr);
                }
                Some(out)
            }
            _ => None,
        }
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::EngineNotFound { .. } => {
                Some("Install Docker from https://docs.docker.com/get-docker/")
            }
            Self::EngineUnavailable(_) => {
                Some("Start the Docker daemon, then run: gostage status")
            }
            Self::DaemonUnavailable(_) => Some(concat!(
                "Privileged containers are required for the dind sidecar; ",
                "or set golang.require_docker = false"
            )),
            Self::MissingImage => Some("Use Container::from_image(\"<image>\")"),
            Self::CacheLocked { .. } => Some(concat!(
                "Wait for other gostage runs to finish, ",
                "or raise engine.cache_lock_timeout_secs"
            )),
            _ => None,
        }
    }
}
