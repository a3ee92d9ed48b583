//! Status command - check the container engine and settings

use crate::cache::labels;
use crate::config::Config;
use crate::engine::{create_engine, ContainerEngine};
use crate::error::{GostageError, GostageResult};
use console::{style, Emoji};

static CHECK: Emoji<'_, '_> = Emoji("✓ ", "[OK] ");
static CROSS: Emoji<'_, '_> = Emoji("✗ ", "[FAIL] ");
static WARN: Emoji<'_, '_> = Emoji("⚠ ", "[WARN] ");

/// Execute the status command
pub async fn execute(config: &Config) -> GostageResult<()> {
    println!("{}", style("gostage status").bold().cyan());
    println!();

    println!("{}", style("Engine:").bold());
    let engine = match create_engine(config) {
        Ok(engine) => engine,
        Err(e) => {
            println!("  {} {}", CROSS, e);
            return finish(false);
        }
    };

    let ready = check_engine(engine.as_ref(), &config.engine.binary).await;

    println!();
    println!("{}", style("Go toolchain:").bold());
    println!("  {} golang:{}", CHECK, config.golang.version);
    println!("  {} docker:{}-dind sidecar", CHECK, config.golang.docker_version);
    println!("  {} {}", CHECK, config.golang.lint_image);
    if config.golang.require_docker {
        println!("  {} Sidecar required (golang.require_docker)", WARN);
    }

    if ready {
        println!();
        println!("{}", style("Caches:").bold());
        check_caches(engine.as_ref(), config).await;
    }

    println!();
    finish(ready)
}

async fn check_engine(engine: &dyn ContainerEngine, binary: &str) -> bool {
    match engine.ensure_ready().await {
        Ok(()) => {
            println!("  {} {} ({})", CHECK, engine.runtime_name(), binary);
            true
        }
        Err(GostageError::EngineNotFound { .. }) => {
            println!(
                "  {} {} not found - install Docker or Podman, or set engine.binary",
                CROSS, binary
            );
            false
        }
        Err(e) => {
            println!("  {} {} not responding: {}", CROSS, binary, e);
            false
        }
    }
}

async fn check_caches(engine: &dyn ContainerEngine, config: &Config) {
    if !config.cache.enabled {
        println!("  {} Disabled (cache.enabled = false)", WARN);
        return;
    }

    match engine.volume_list(labels::GOSTAGE_CACHE).await {
        Ok(volumes) => println!("  {} {} cache volume(s)", CHECK, volumes.len()),
        Err(e) => println!("  {} Could not list volumes: {}", WARN, e),
    }
}

fn finish(all_ok: bool) -> GostageResult<()> {
    if all_ok {
        println!("{}", style("All critical checks passed").green().bold());
    } else {
        println!(
            "{}",
            style("Some checks failed - see above for details").yellow().bold()
        );
    }
    Ok(())
}
