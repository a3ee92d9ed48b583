//! Service command - start a Docker-in-Docker sidecar

use super::common::{connect, finish};
use crate::cli::args::ServiceArgs;
use crate::config::Config;
use crate::engine::EndpointOpts;
use crate::error::{GostageError, GostageResult};
use crate::golang::Golang;
use crate::ui::{self, TaskSpinner, UiContext};

/// Execute the service command
pub async fn execute(args: ServiceArgs, config: &Config) -> GostageResult<()> {
    let ctx = UiContext::detect();
    let engine = connect(config).await?;
    let golang = Golang::from_config(engine.clone(), config);
    let version = sidecar_version(args.docker_version, &golang);
    let service = golang.service(&version);

    let mut spinner = TaskSpinner::new(&ctx);
    spinner.start(&format!("Starting docker:{}-dind...", version));
    let result = engine
        .endpoint(&service, &EndpointOpts::with_scheme("tcp"))
        .await;
    spinner.finish(&result, "Docker daemon ready", "Docker daemon failed to start");

    let endpoint = match result {
        Ok(endpoint) => endpoint,
        Err(e) => return finish(&engine, Err(e)).await,
    };
    println!("{}", endpoint);

    let waited = if args.wait {
        ui::remark(&ctx, "Press Ctrl-C to stop the daemon");
        tokio::signal::ctrl_c()
            .await
            .map_err(|e| GostageError::io("waiting for Ctrl-C", e))
    } else {
        if config.engine.keep_services {
            ui::remark(&ctx, "engine.keep_services is set; the daemon keeps running");
        }
        Ok(())
    };

    finish(&engine, waited).await
}

/// Version given on the command line, else the helper's
fn sidecar_version(requested: Option<String>, golang: &Golang) -> String {
    requested
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| golang.docker_version().to_string())
}
