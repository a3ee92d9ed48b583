//! Build-container command - compile into a runnable image

use super::common::{apply_overrides, connect, finish, project_dir, project_golang};
use crate::cli::args::BuildContainerArgs;
use crate::config::Config;
use crate::engine::Container;
use crate::error::GostageResult;
use crate::golang::BuildOpts;
use crate::ui::{self, TaskSpinner, UiContext};

/// Execute the build-container command
pub async fn execute(args: BuildContainerArgs, config: &Config) -> GostageResult<()> {
    let ctx = UiContext::detect();
    let config = apply_overrides(config, &args.project);
    let dir = project_dir(args.project.source.as_deref())?;

    let engine = connect(&config).await?;
    let golang = project_golang(engine.clone(), &config, &dir)?;
    let opts = BuildOpts {
        source: None,
        args: args.args,
        arch: args.arch,
        os: args.os,
    };
    let base = args.base.map(Container::from_image);

    let mut spinner = TaskSpinner::new(&ctx);
    spinner.start(&format!("Building image {}...", args.tag));
    let result = async {
        let image = golang.build_container(&opts, base).await?;
        engine.publish(&image, &args.tag).await
    }
    .await;
    spinner.finish(&result, "Image built", "Image build failed");

    let id = finish(&engine, result).await?;
    ui::step_ok_detail(&ctx, &format!("Tagged {}", args.tag), &id);
    println!("{}", id);
    Ok(())
}
