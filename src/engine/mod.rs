//! Container engine layer
//!
//! Descriptors (`Container`, `Directory`, `File`, `Service`) are plain
//! values built with `with_*` methods. A `ContainerEngine` materializes
//! them:
//! - `CliEngine`: drives the Docker or Podman CLI
//! - `testing::FakeEngine`: records descriptors in memory (tests only)

pub mod container;
pub mod directory;
mod docker_cli;
mod factory;
mod runtime;
pub mod service;

#[cfg(test)]
pub(crate) mod testing;

pub use container::{join_path, Container, ExecOpts, ExecStep, Mount, Op};
pub use directory::{Directory, DirectorySource, File};
pub use docker_cli::CliEngine;
pub use factory::{create_engine, EngineKind};
pub use runtime::{ContainerEngine, VolumeInfo};
pub use service::{EndpointOpts, Service};

use crate::error::{GostageError, GostageResult};
use std::io;
use std::path::Path;

/// Max number of output lines to include in error messages.
const ERROR_TAIL_LINES: usize = 50;

/// Last `ERROR_TAIL_LINES` lines of combined stdout and stderr
pub(crate) fn error_tail(stdout: &str, stderr: &str) -> String {
    let lines: Vec<&str> = stdout.lines().chain(stderr.lines()).collect();
    let start = lines.len().saturating_sub(ERROR_TAIL_LINES);
    lines[start..].join("\n")
}

/// Recursively copy the contents of `src` into `dest`
pub(crate) async fn copy_tree(src: &Path, dest: &Path) -> GostageResult<()> {
    let (src, dest) = (src.to_path_buf(), dest.to_path_buf());
    let context = format!("copying {} to {}", src.display(), dest.display());

    tokio::task::spawn_blocking(move || copy_tree_blocking(&src, &dest))
        .await
        .map_err(|e| GostageError::Internal(format!("copy task failed: {}", e)))?
        .map_err(|e| GostageError::io(context, e))
}

fn copy_tree_blocking(src: &Path, dest: &Path) -> io::Result<()> {
    std::fs::create_dir_all(dest)?;

    for entry in std::fs::read_dir(src)? {
        let entry = entry?;
        let file_type = entry.file_type()?;
        let target = dest.join(entry.file_name());

        if file_type.is_dir() {
            copy_tree_blocking(&entry.path(), &target)?;
        } else if file_type.is_symlink() {
            copy_symlink(&entry.path(), &target)?;
        } else {
            std::fs::copy(entry.path(), &target)?;
        }
    }

    Ok(())
}

#[cfg(unix)]
fn copy_symlink(src: &Path, dest: &Path) -> io::Result<()> {
    let link = std::fs::read_link(src)?;
    if dest.symlink_metadata().is_ok() {
        std::fs::remove_file(dest)?;
    }
    std::os::unix::fs::symlink(link, dest)
}

#[cfg(not(unix))]
fn copy_symlink(src: &Path, dest: &Path) -> io::Result<()> {
    std::fs::copy(src, dest).map(|_| ())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn error_tail_keeps_short_output() {
        assert_eq!(error_tail("a\nb", "c"), "a\nb\nc");
        assert_eq!(error_tail("", ""), "");
    }

    #[test]
    fn error_tail_truncates_long_output() {
        let stdout: String = (0..80).map(|i| format!("line {}\n", i)).collect();
        let tail = error_tail(&stdout, "");
        assert_eq!(tail.lines().count(), ERROR_TAIL_LINES);
        assert!(tail.starts_with("line 30"));
        assert!(tail.ends_with("line 79"));
    }

    #[tokio::test]
    async fn copy_tree_copies_nested_files() {
        let src = TempDir::new().unwrap();
        let dest = TempDir::new().unwrap();
        std::fs::create_dir_all(src.path().join("cmd/app")).unwrap();
        std::fs::write(src.path().join("go.mod"), "module example.com/app\n").unwrap();
        std::fs::write(src.path().join("cmd/app/main.go"), "package main\n").unwrap();

        copy_tree(src.path(), &dest.path().join("out")).await.unwrap();

        let copied = std::fs::read_to_string(dest.path().join("out/cmd/app/main.go")).unwrap();
        assert_eq!(copied, "package main\n");
        assert!(dest.path().join("out/go.mod").is_file());
    }

    #[tokio::test]
    async fn copy_tree_missing_source_is_io_error() {
        let dest = TempDir::new().unwrap();
        let err = copy_tree(&dest.path().join("nope"), dest.path())
            .await
            .unwrap_err();
        assert!(matches!(err, GostageError::Io { .. }));
    }
}
