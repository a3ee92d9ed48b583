//! Test command - go test with a Docker sidecar

use super::common::{apply_overrides, connect, finish, project_dir, project_golang};
use crate::cli::args::TestArgs;
use crate::config::Config;
use crate::error::GostageResult;
use crate::golang::TestOpts;
use crate::ui::{TaskSpinner, UiContext};

/// Execute the test command
pub async fn execute(args: TestArgs, config: &Config) -> GostageResult<()> {
    let ctx = UiContext::detect();
    let config = apply_overrides(config, &args.project);
    let dir = project_dir(args.project.source.as_deref())?;

    let engine = connect(&config).await?;
    let golang = project_golang(engine.clone(), &config, &dir)?;
    let opts = TestOpts {
        source: None,
        component: args.component,
        coverage_location: args.coverage_location,
        timeout: args.timeout,
    };

    let mut spinner = TaskSpinner::new(&ctx);
    spinner.start(&format!("Running go test {}...", opts.component));
    let result = golang.test(&opts).await;
    spinner.finish(&result, "Tests passed", "Tests failed");

    let output = finish(&engine, result).await?;
    print!("{}", output);
    Ok(())
}
