//! Directory and file references
//!
//! Like containers, these are descriptors: a host path, a git checkout or a
//! path inside some container. The engine resolves them when they are
//! mounted, copied or exported.

use crate::engine::container::{join_path, Container};
use std::fmt;
use std::path::{Path, PathBuf};

/// Where a directory's contents come from
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DirectorySource {
    /// Empty directory
    Empty,
    /// Directory on the host running gostage
    Host(PathBuf),
    /// Shallow clone of a git branch
    Git { url: String, branch: String },
    /// Directory inside a container, after its steps ran
    Container {
        container: Box<Container>,
        path: String,
    },
}

/// A directory reference, optionally narrowed to a subpath and overlaid
/// with extra files
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Directory {
    source: DirectorySource,
    subpath: Option<String>,
    files: Vec<(String, File)>,
}

impl Directory {
    /// An empty directory
    pub fn empty() -> Self {
        Self::with_source(DirectorySource::Empty)
    }

    /// A directory on the host
    pub fn host(path: impl Into<PathBuf>) -> Self {
        Self::with_source(DirectorySource::Host(path.into()))
    }

    /// The tree of `branch` in the repository at `url`
    pub fn git(url: impl Into<String>, branch: impl Into<String>) -> Self {
        Self::with_source(DirectorySource::Git {
            url: url.into(),
            branch: branch.into(),
        })
    }

    /// `path` inside `container`
    pub fn from_container(container: Container, path: impl Into<String>) -> Self {
        Self::with_source(DirectorySource::Container {
            container: Box::new(container),
            path: path.into(),
        })
    }

    fn with_source(source: DirectorySource) -> Self {
        Self {
            source,
            subpath: None,
            files: Vec::new(),
        }
    }

    /// Subdirectory `path` of this directory.
    ///
    /// Overlay files outside `path` are dropped; those inside it are
    /// re-rooted.
    pub fn directory(&self, path: &str) -> Directory {
        let rel = join_path("", path).trim_start_matches('/').to_string();
        if rel.is_empty() {
            return self.clone();
        }
        let joined = match &self.subpath {
            Some(sub) => join_path(sub, &rel),
            None => rel.clone(),
        };
        let prefix = format!("{}/", rel);
        let files = self
            .files
            .iter()
            .filter_map(|(p, f)| {
                p.trim_start_matches('/')
                    .strip_prefix(&prefix)
                    .map(|rest| (rest.to_string(), f.clone()))
            })
            .collect();

        Directory {
            source: self.source.clone(),
            subpath: Some(joined),
            files,
        }
    }

    /// This directory with `file` placed at `path`
    pub fn with_file(mut self, path: impl Into<String>, file: File) -> Self {
        let path = path.into();
        self.files.retain(|(p, _)| *p != path);
        self.files.push((path, file));
        self
    }

    pub fn source(&self) -> &DirectorySource {
        &self.source
    }

    /// Subpath relative to the source root, without a leading slash
    pub fn subpath(&self) -> Option<&str> {
        self.subpath.as_deref()
    }

    /// Overlay files, keyed by path relative to this directory
    pub fn files(&self) -> &[(String, File)] {
        &self.files
    }

    /// Host path if this is an unmodified host directory
    pub fn as_host_path(&self) -> Option<PathBuf> {
        match (&self.source, self.files.is_empty()) {
            (DirectorySource::Host(root), true) => Some(match &self.subpath {
                Some(sub) => root.join(sub),
                None => root.clone(),
            }),
            _ => None,
        }
    }
}

impl fmt::Display for Directory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.source {
            DirectorySource::Empty => write!(f, "<empty>")?,
            DirectorySource::Host(path) => write!(f, "{}", path.display())?,
            DirectorySource::Git { url, branch } => write!(f, "{}#{}", url, branch)?,
            DirectorySource::Container { container, path } => {
                write!(f, "{}:{}", container.image().unwrap_or("scratch"), path)?
            }
        }
        if let Some(sub) = &self.subpath {
            write!(f, "/{}", sub)?;
        }
        if !self.files.is_empty() {
            write!(f, " (+{} files)", self.files.len())?;
        }
        Ok(())
    }
}

/// A single file inside a container
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct File {
    container: Box<Container>,
    path: String,
}

impl File {
    pub fn new(container: Container, path: impl Into<String>) -> Self {
        Self {
            container: Box::new(container),
            path: path.into(),
        }
    }

    pub fn container(&self) -> &Container {
        &self.container
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// File name component of the path
    pub fn name(&self) -> &str {
        Path::new(&self.path)
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(&self.path)
    }
}
