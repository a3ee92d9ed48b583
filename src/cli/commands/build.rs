//! Build command - compile the project and export the binaries

use super::common::{apply_overrides, connect, finish, output_path, project_dir, project_golang};
use crate::cli::args::BuildArgs;
use crate::config::Config;
use crate::error::GostageResult;
use crate::golang::BuildOpts;
use crate::ui::{self, TaskSpinner, UiContext};

/// Execute the build command
pub async fn execute(args: BuildArgs, config: &Config) -> GostageResult<()> {
    let ctx = UiContext::detect();
    let config = apply_overrides(config, &args.project);
    let dir = project_dir(args.project.source.as_deref())?;
    let output = output_path(&args.output)?;

    let engine = connect(&config).await?;
    let golang = project_golang(engine.clone(), &config, &dir)?;
    let opts = BuildOpts {
        source: None,
        args: args.args,
        arch: args.arch,
        os: args.os,
    };

    let mut spinner = TaskSpinner::new(&ctx);
    spinner.start(&format!("Building {}...", dir.display()));
    let result = async {
        let out = golang.build(&opts).await?;
        engine.export_directory(&out, &output).await
    }
    .await;
    spinner.finish(&result, "Build finished", "Build failed");

    finish(&engine, result).await?;
    ui::step_ok_detail(&ctx, "Binaries exported", &output.display().to_string());
    Ok(())
}
