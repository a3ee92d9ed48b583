//! Cache command - list and remove cache volumes

use crate::cache::{labels, CacheEntry};
use crate::cli::args::{CacheAction, CacheArgs, OutputFormat};
use crate::config::Config;
use crate::engine::{create_engine, ContainerEngine};
use crate::error::GostageResult;
use crate::ui::{self, CountProgress, UiContext};
use chrono::{Duration, Utc};
use console::style;

/// Execute the cache command
pub async fn execute(args: CacheArgs, config: &Config) -> GostageResult<()> {
    let engine = create_engine(config)?;
    engine.ensure_ready().await?;

    match args.action {
        CacheAction::List { format } => list_caches(engine.as_ref(), format).await,
        CacheAction::Clear { yes, older_than } => {
            clear_caches(engine.as_ref(), yes, older_than).await
        }
    }
}

async fn cache_entries(engine: &dyn ContainerEngine) -> GostageResult<Vec<CacheEntry>> {
    let mut entries: Vec<CacheEntry> = engine
        .volume_list(labels::GOSTAGE_CACHE)
        .await?
        .iter()
        .filter_map(|v| CacheEntry::from_labels(&v.name, &v.labels))
        .collect();
    entries.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(entries)
}

async fn list_caches(engine: &dyn ContainerEngine, format: OutputFormat) -> GostageResult<()> {
    let caches = cache_entries(engine).await?;

    if caches.is_empty() && format != OutputFormat::Json {
        println!("No cache volumes found.");
        return Ok(());
    }

    match format {
        OutputFormat::Table => print_cache_table(&caches),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&caches)?),
        OutputFormat::Plain => {
            for cache in &caches {
                println!("{}", cache.name);
            }
        }
    }

    Ok(())
}

fn print_cache_table(caches: &[CacheEntry]) {
    println!("{:<32} {:<12} {:<20}", "VOLUME", "KIND", "CREATED");
    println!("{}", "-".repeat(64));

    for cache in caches {
        let created = cache
            .created_at
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<32} {:<12} {:<20}",
            cache.name,
            cache.kind.as_label(),
            created
        );
    }

    println!();
    println!("Total: {} cache(s)", caches.len());
}

/// Volumes to remove: all of them, or those created more than `days` ago.
/// Volumes without a creation time are only removed without an age filter.
fn select_for_removal(caches: Vec<CacheEntry>, older_than: Option<u32>) -> Vec<CacheEntry> {
    let Some(days) = older_than else {
        return caches;
    };
    let cutoff = Utc::now() - Duration::days(i64::from(days));
    caches
        .into_iter()
        .filter(|c| c.created_at.is_some_and(|t| t < cutoff))
        .collect()
}

async fn clear_caches(
    engine: &dyn ContainerEngine,
    skip_confirm: bool,
    older_than: Option<u32>,
) -> GostageResult<()> {
    let ctx = UiContext::detect().with_auto_yes(skip_confirm);
    let volumes = select_for_removal(cache_entries(engine).await?, older_than);

    if volumes.is_empty() {
        println!("No cache volumes to clear.");
        return Ok(());
    }

    println!("This will remove {} cache volume(s):", volumes.len());
    for vol in &volumes {
        println!("  {} {}", style("•").red(), vol.name);
    }
    println!();

    if !ui::confirm(&ctx, "Remove these volumes?", false).await? {
        println!("Aborted.");
        return Ok(());
    }

    let mut progress = CountProgress::new(&ctx, "Removing", volumes.len());
    let mut removed = 0;
    for vol in &volumes {
        match engine.volume_remove(&vol.name).await {
            Ok(()) => removed += 1,
            Err(e) => ui::step_error_detail(
                &ctx,
                &format!("Failed to remove {}", vol.name),
                &e.to_string(),
            ),
        }
        progress.inc(&vol.name);
    }
    progress.finish();

    println!("{} cleared {} cache(s)", style("✓").green(), removed);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{CacheKind, CacheVolume};
    use crate::engine::testing::FakeEngine;
    use std::collections::HashMap;

    fn entry(name: &str, age_days: Option<i64>) -> CacheEntry {
        CacheEntry {
            name: name.to_string(),
            kind: CacheKind::of(name),
            created_at: age_days.map(|d| Utc::now() - Duration::days(d)),
        }
    }

    #[test]
    fn select_all_without_age_filter() {
        let caches = vec![entry("gomodcache", None), entry("gobuildcache", Some(1))];
        assert_eq!(select_for_removal(caches, None).len(), 2);
    }

    #[test]
    fn select_only_old_volumes() {
        let caches = vec![
            entry("gomodcache", Some(30)),
            entry("gobuildcache", Some(1)),
            entry("24.0-docker-lib", None),
        ];
        let selected = select_for_removal(caches, Some(7));
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].name, "gomodcache");
    }

    #[tokio::test]
    async fn entries_skip_foreign_volumes() {
        let engine = FakeEngine::new()
            .with_volume("gobuildcache", CacheVolume::go_build().labels())
            .with_volume("gomodcache", CacheVolume::go_mod().labels())
            .with_volume("postgres-data", HashMap::new());

        let entries = cache_entries(&engine).await.unwrap();
        let names: Vec<&str> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["gobuildcache", "gomodcache"]);
        assert_eq!(entries[1].kind, CacheKind::GoMod);
    }

    #[tokio::test]
    async fn clear_with_yes_removes_everything() {
        let engine = FakeEngine::new()
            .with_volume("gomodcache", CacheVolume::go_mod().labels())
            .with_volume("24.0-docker-lib", CacheVolume::docker_lib("24.0").labels());

        clear_caches(&engine, true, None).await.unwrap();
        assert!(engine.volume_names().is_empty());
    }

    #[tokio::test]
    async fn clear_keeps_recent_volumes() {
        let engine = FakeEngine::new().with_volume("gomodcache", CacheVolume::go_mod().labels());

        clear_caches(&engine, true, Some(7)).await.unwrap();
        assert_eq!(engine.volume_names(), vec!["gomodcache"]);
    }
}
