//! Directory tarballs and multi-container sync

use crate::engine::{Container, ContainerEngine, Directory, File};
use crate::error::GostageResult;
use tracing::debug;

/// Image used to build tarballs
pub const TAR_IMAGE: &str = "alpine:3.18";

const ASSETS_MOUNT: &str = "/assets";
const TARBALL: &str = "out.tar.gz";
const SYNC_FILE: &str = "/syncfile";

/// Gzipped tarball of `dir`, built in an alpine container
pub fn tar(dir: Directory) -> File {
    Container::from_image(TAR_IMAGE)
        .with_mounted_directory(ASSETS_MOUNT, dir)
        .with_exec(["tar", "czf", TARBALL, ASSETS_MOUNT])
        .file(TARBALL)
}

/// Evaluate `containers` concurrently.
///
/// Each container writes a marker file; the markers are collected into one
/// directory as `syncfile<i>`, and reading its entries forces every
/// container to finish first. Returns the entry names.
pub async fn multisync(
    engine: &dyn ContainerEngine,
    containers: &[Container],
) -> GostageResult<Vec<String>> {
    let aggregate = containers
        .iter()
        .enumerate()
        .fold(Directory::empty(), |dir, (i, container)| {
            let marked = container.clone().with_new_file(SYNC_FILE, "");
            dir.with_file(format!("{}{}", SYNC_FILE, i), marked.file(SYNC_FILE))
        });

    debug!("Syncing {} containers", containers.len());
    engine.entries(&aggregate).await
}
