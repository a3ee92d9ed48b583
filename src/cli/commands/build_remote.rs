//! Build-remote command - clone a repository and build a module from it

use super::common::{connect, finish, output_path};
use crate::cli::args::BuildRemoteArgs;
use crate::config::Config;
use crate::error::GostageResult;
use crate::golang::{Golang, RemoteBuildOpts};
use crate::ui::{self, TaskSpinner, UiContext};

/// Execute the build-remote command
pub async fn execute(args: BuildRemoteArgs, config: &Config) -> GostageResult<()> {
    let ctx = UiContext::detect();
    let mut config = config.clone();
    if let Some(version) = args.go_version {
        config.golang.version = version;
    }
    let output = output_path(&args.output)?;

    let engine = connect(&config).await?;
    let golang = Golang::from_config(engine.clone(), &config);
    let opts = RemoteBuildOpts {
        remote: args.remote,
        reference: args.reference,
        module: args.module,
        arch: args.arch,
        platform: args.platform,
    };

    let mut spinner = TaskSpinner::new(&ctx);
    spinner.start(&format!("Building {} from {}@{}...", opts.module, opts.remote, opts.reference));
    let result = async {
        let out = golang.build_remote(&opts).await?;
        engine.export_directory(&out, &output).await
    }
    .await;
    spinner.finish(&result, "Build finished", "Build failed");

    finish(&engine, result).await?;
    ui::step_ok_detail(&ctx, "Binaries exported", &output.display().to_string());
    Ok(())
}
