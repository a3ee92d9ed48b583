//! Lint command - golangci-lint on the project

use super::common::{apply_overrides, connect, finish, project_dir, project_golang};
use crate::cli::args::LintArgs;
use crate::config::Config;
use crate::error::GostageResult;
use crate::golang::LintOpts;
use crate::ui::{TaskSpinner, UiContext};

/// Execute the lint command
pub async fn execute(args: LintArgs, config: &Config) -> GostageResult<()> {
    let ctx = UiContext::detect();
    let config = apply_overrides(config, &args.project);
    let dir = project_dir(args.project.source.as_deref())?;

    let engine = connect(&config).await?;
    let golang = project_golang(engine.clone(), &config, &dir)?;
    let opts = LintOpts {
        source: None,
        component: args.component,
        timeout: args.timeout,
    };

    let mut spinner = TaskSpinner::new(&ctx);
    spinner.start(&format!("Linting {}...", opts.component));
    let result = golang.golangci_lint(&opts).await;
    spinner.finish(&result, "No lint issues", "Lint failed");

    let output = finish(&engine, result).await?;
    print!("{}", output);
    Ok(())
}
