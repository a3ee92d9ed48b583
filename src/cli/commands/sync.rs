//! Sync command - run several containers and wait for all of them

use super::common::{connect, finish};
use crate::cli::args::SyncArgs;
use crate::config::Config;
use crate::engine::Container;
use crate::error::GostageResult;
use crate::sync::multisync;
use crate::ui::{TaskSpinner, UiContext};

/// Execute the sync command
pub async fn execute(args: SyncArgs, config: &Config) -> GostageResult<()> {
    let ctx = UiContext::detect();
    let containers = containers_for(&args.images, &args.command);

    let engine = connect(config).await?;

    let mut spinner = TaskSpinner::new(&ctx);
    spinner.start(&format!("Running {} container(s)...", containers.len()));
    let result = multisync(engine.as_ref(), &containers).await;
    spinner.finish(&result, "All containers finished", "Sync failed");

    for entry in finish(&engine, result).await? {
        println!("{}", entry);
    }
    Ok(())
}

fn containers_for(images: &[String], command: &[String]) -> Vec<Container> {
    images
        .iter()
        .map(|image| {
            let container = Container::from_image(image.as_str());
            if command.is_empty() {
                container
            } else {
                container.with_exec(command.iter().cloned())
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_container_per_image() {
        let images = vec!["alpine:3.18".to_string(), "busybox".to_string()];
        let command = vec!["echo".to_string(), "hi".to_string()];

        let containers = containers_for(&images, &command);
        assert_eq!(containers.len(), 2);
        assert_eq!(containers[1].image(), Some("busybox"));
        assert_eq!(
            containers[0].last_exec().map(|s| s.command_line()),
            Some("echo hi".to_string())
        );
    }

    #[test]
    fn no_command_means_no_exec() {
        let containers = containers_for(&["alpine:3.18".to_string()], &[]);
        assert!(containers[0].last_exec().is_none());
    }
}
