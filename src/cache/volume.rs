//! Cache volume naming and labels
//!
//! Volumes are keyed by name only, so every session (and every Go version)
//! that asks for `gomodcache` gets the same volume. The docker-lib volume is
//! keyed by daemon version, giving one per distinct docker version.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Go module cache volume name
pub const GO_MOD_CACHE: &str = "gomodcache";
/// Go build cache volume name
pub const GO_BUILD_CACHE: &str = "gobuildcache";
/// Suffix of the per-version docker data volume
pub const DOCKER_LIB_SUFFIX: &str = "-docker-lib";

/// Volume label keys used to track cache metadata
pub mod labels {
    /// Marks volume as a gostage cache
    pub const GOSTAGE_CACHE: &str = "io.gostage.cache";
    /// The cache kind (gomod, gobuild, docker-lib)
    pub const KIND: &str = "io.gostage.cache.kind";
    /// Creation timestamp (RFC3339)
    pub const CREATED_AT: &str = "io.gostage.cache.created_at";
}

/// What a cache volume holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CacheKind {
    /// Go module download cache (`/go/pkg/mod`)
    GoMod,
    /// Go build cache (`/root/.cache/go-build`)
    GoBuild,
    /// Docker daemon data directory (`/var/lib/docker`)
    DockerLib,
    /// Any other named cache
    Other,
}

impl CacheKind {
    /// Classify a volume by its name
    pub fn of(name: &str) -> Self {
        match name {
            GO_MOD_CACHE => Self::GoMod,
            GO_BUILD_CACHE => Self::GoBuild,
            n if n.ends_with(DOCKER_LIB_SUFFIX) && n.len() > DOCKER_LIB_SUFFIX.len() => {
                Self::DockerLib
            }
            _ => Self::Other,
        }
    }

    /// Convert to label value
    pub fn as_label(&self) -> &'static str {
        match self {
            Self::GoMod => "gomod",
            Self::GoBuild => "gobuild",
            Self::DockerLib => "docker-lib",
            Self::Other => "other",
        }
    }

    /// Parse from label value
    pub fn from_label(s: &str) -> Self {
        match s {
            "gomod" => Self::GoMod,
            "gobuild" => Self::GoBuild,
            "docker-lib" => Self::DockerLib,
            _ => Self::Other,
        }
    }
}

impl fmt::Display for CacheKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_label())
    }
}

/// How concurrent containers may share a cache mount
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheSharing {
    /// Any number of containers may use it at once
    #[default]
    Shared,
    /// One container at a time; others wait
    Locked,
    /// Each container gets its own copy
    Private,
}

impl fmt::Display for CacheSharing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Shared => write!(f, "shared"),
            Self::Locked => write!(f, "locked"),
            Self::Private => write!(f, "private"),
        }
    }
}

/// A named persistent cache volume
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheVolume {
    name: String,
}

impl CacheVolume {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// The Go module cache
    pub fn go_mod() -> Self {
        Self::new(GO_MOD_CACHE)
    }

    /// The Go build cache
    pub fn go_build() -> Self {
        Self::new(GO_BUILD_CACHE)
    }

    /// Docker data directory volume for daemon `version`
    pub fn docker_lib(version: &str) -> Self {
        Self::new(format!("{}{}", version, DOCKER_LIB_SUFFIX))
    }

    /// A per-container copy of this volume, tagged with `id`.
    ///
    /// The copy keeps the kind of the original, so a copy of
    /// `24.0-docker-lib` is still a docker-lib volume.
    pub fn private_copy(&self, id: &str) -> Self {
        match self.name.strip_suffix(DOCKER_LIB_SUFFIX) {
            Some(version) if !version.is_empty() => {
                Self::new(format!("{}-{}{}", version, id, DOCKER_LIB_SUFFIX))
            }
            _ => Self::new(format!("{}-{}", self.name, id)),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> CacheKind {
        CacheKind::of(&self.name)
    }

    /// Generate labels for volume creation
    pub fn labels(&self) -> HashMap<String, String> {
        let mut labels = HashMap::new();
        labels.insert(labels::GOSTAGE_CACHE.to_string(), "true".to_string());
        labels.insert(labels::KIND.to_string(), self.kind().as_label().to_string());
        labels.insert(labels::CREATED_AT.to_string(), Utc::now().to_rfc3339());
        labels
    }
}

/// A cache volume found on the engine
#[derive(Debug, Clone, Serialize)]
pub struct CacheEntry {
    /// Volume name
    pub name: String,
    /// What the volume holds
    pub kind: CacheKind,
    /// When the volume was created, if recorded
    pub created_at: Option<DateTime<Utc>>,
}

impl CacheEntry {
    /// Try to parse from volume labels
    pub fn from_labels(name: &str, labels: &HashMap<String, String>) -> Option<Self> {
        // Must be a gostage cache
        if labels.get(labels::GOSTAGE_CACHE).map(String::as_str) != Some("true") {
            return None;
        }

        let kind = labels
            .get(labels::KIND)
            .map(|s| CacheKind::from_label(s))
            .unwrap_or_else(|| CacheKind::of(name));

        let created_at = labels
            .get(labels::CREATED_AT)
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|dt| dt.with_timezone(&Utc));

        Some(Self {
            name: name.to_string(),
            kind,
            created_at,
        })
    }
}
