//! Vulncheck command - govulncheck on the project

use super::common::{apply_overrides, connect, finish, project_dir, project_golang};
use crate::cli::args::VulncheckArgs;
use crate::config::Config;
use crate::error::GostageResult;
use crate::golang::VulncheckOpts;
use crate::ui::{TaskSpinner, UiContext};

/// Execute the vulncheck command
pub async fn execute(args: VulncheckArgs, config: &Config) -> GostageResult<()> {
    let ctx = UiContext::detect();
    let config = apply_overrides(config, &args.project);
    let dir = project_dir(args.project.source.as_deref())?;

    let engine = connect(&config).await?;
    let golang = project_golang(engine.clone(), &config, &dir)?;
    let opts = VulncheckOpts {
        source: None,
        component: args.component,
    };

    let mut spinner = TaskSpinner::new(&ctx);
    spinner.start(&format!("Scanning {} with govulncheck...", opts.component));
    let result = golang.vulncheck(&opts).await;
    spinner.finish(&result, "No vulnerabilities found", "Vulnerability scan failed");

    let report = finish(&engine, result).await?;
    print!("{}", report.output);
    Ok(())
}
