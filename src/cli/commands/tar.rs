//! Tar command - pack a directory into a gzipped tarball

use super::common::{connect, finish, output_path};
use crate::cli::args::TarArgs;
use crate::config::Config;
use crate::engine::Directory;
use crate::error::{GostageError, GostageResult};
use crate::sync;
use crate::ui::{self, TaskSpinner, UiContext};

/// Execute the tar command
pub async fn execute(args: TarArgs, config: &Config) -> GostageResult<()> {
    let ctx = UiContext::detect();
    let dir = args
        .dir
        .canonicalize()
        .map_err(|_| GostageError::PathNotFound(args.dir.clone()))?;
    let output = output_path(&args.output)?;

    let engine = connect(config).await?;
    let tarball = sync::tar(Directory::host(&dir));

    let mut spinner = TaskSpinner::new(&ctx);
    spinner.start(&format!("Packing {}...", dir.display()));
    let result = engine.export_file(&tarball, &output).await;
    spinner.finish(&result, "Tarball written", "Packing failed");

    finish(&engine, result).await?;
    ui::step_ok_detail(&ctx, "Tarball", &output.display().to_string());
    Ok(())
}
