//! Config command - show or edit configuration

use crate::cli::args::{ConfigAction, ConfigArgs};
use crate::config::{Config, ConfigManager, LOCAL_CONFIG_FILE};
use crate::error::{GostageError, GostageResult};
use crate::ui::{self, UiContext};
use std::path::Path;
use tokio::fs;

/// Value type of a settable key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum KeyKind {
    Bool,
    Int,
    Text,
}

/// Every key `config set` accepts
const KEYS: &[(&str, KeyKind)] = &[
    ("general.verbose", KeyKind::Bool),
    ("general.log_format", KeyKind::Text),
    ("engine.binary", KeyKind::Text),
    ("engine.network_prefix", KeyKind::Text),
    ("engine.service_ready_attempts", KeyKind::Int),
    ("engine.service_ready_interval_ms", KeyKind::Int),
    ("engine.keep_services", KeyKind::Bool),
    ("engine.cache_lock_timeout_secs", KeyKind::Int),
    ("golang.version", KeyKind::Text),
    ("golang.docker_version", KeyKind::Text),
    ("golang.lint_image", KeyKind::Text),
    ("golang.build_base", KeyKind::Text),
    ("golang.vendor", KeyKind::Bool),
    ("golang.require_docker", KeyKind::Bool),
    ("cache.enabled", KeyKind::Bool),
];

/// Execute the config command
pub async fn execute(
    args: ConfigArgs,
    config: &Config,
    manager: &ConfigManager,
) -> GostageResult<()> {
    match args.action {
        None | Some(ConfigAction::Show) => show_config(config)?,
        Some(ConfigAction::Path) => println!("{}", manager.path().display()),
        Some(ConfigAction::Init { force }) => init_config(manager, force).await?,
        Some(ConfigAction::Set { key, value, local }) => {
            if local {
                let cwd = std::env::current_dir()
                    .map_err(|e| GostageError::io("getting current directory", e))?;
                set_local_value(&cwd.join(LOCAL_CONFIG_FILE), &key, &value).await?
            } else {
                set_value(manager, config, &key, &value).await?
            }
        }
    }

    Ok(())
}

fn show_config(config: &Config) -> GostageResult<()> {
    println!("{}", toml::to_string_pretty(config)?);
    Ok(())
}

async fn init_config(manager: &ConfigManager, force: bool) -> GostageResult<()> {
    let ctx = UiContext::detect();
    let path = manager.path();

    if path.exists() && !force {
        ui::step_warn_hint(
            &ctx,
            &format!("Config already exists at {}", path.display()),
            "Use --force to overwrite",
        );
        return Ok(());
    }

    manager.save(&Config::default()).await?;
    ui::step_ok_detail(&ctx, "Configuration initialized", &path.display().to_string());
    Ok(())
}

async fn set_value(
    manager: &ConfigManager,
    config: &Config,
    key: &str,
    value: &str,
) -> GostageResult<()> {
    let ctx = UiContext::detect();
    let config = apply_key(config.clone(), key, value)?;
    manager.save(&config).await?;
    ui::step_ok(&ctx, &format!("Set {} = {}", key, value));
    Ok(())
}

/// Return `config` with `key` set to `value`
fn apply_key(mut config: Config, key: &str, value: &str) -> GostageResult<Config> {
    match key {
        "general.verbose" => config.general.verbose = parse_bool(value)?,
        "general.log_format" => config.general.log_format = parse_log_format(value)?,
        "engine.binary" => config.engine.binary = value.to_string(),
        "engine.network_prefix" => config.engine.network_prefix = value.to_string(),
        "engine.service_ready_attempts" => config.engine.service_ready_attempts = parse_num(value)?,
        "engine.service_ready_interval_ms" => {
            config.engine.service_ready_interval_ms = parse_num(value)?
        }
        "engine.keep_services" => config.engine.keep_services = parse_bool(value)?,
        "engine.cache_lock_timeout_secs" => {
            config.engine.cache_lock_timeout_secs = parse_num(value)?
        }
        "golang.version" => config.golang.version = value.to_string(),
        "golang.docker_version" => config.golang.docker_version = value.to_string(),
        "golang.lint_image" => config.golang.lint_image = value.to_string(),
        "golang.build_base" => config.golang.build_base = value.to_string(),
        "golang.vendor" => config.golang.vendor = parse_bool(value)?,
        "golang.require_docker" => config.golang.require_docker = parse_bool(value)?,
        "cache.enabled" => config.cache.enabled = parse_bool(value)?,
        _ => return Err(unknown_key(key)),
    }
    Ok(config)
}

/// Write only the given key to the project-local config
async fn set_local_value(path: &Path, key: &str, value: &str) -> GostageResult<()> {
    let ctx = UiContext::detect();
    let kind = key_kind(key)?;

    let mut doc: toml::Value = if path.exists() {
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| GostageError::io(format!("reading {}", path.display()), e))?;
        content
            .parse()
            .map_err(|e: toml::de::Error| GostageError::ConfigInvalid {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?
    } else {
        toml::Value::Table(toml::map::Map::new())
    };

    set_toml_value(&mut doc, key, typed_value(kind, value)?)?;

    let content = toml::to_string_pretty(&doc)?;
    fs::write(path, content)
        .await
        .map_err(|e| GostageError::io(format!("writing {}", path.display()), e))?;

    ui::step_ok(&ctx, &format!("Set {} = {} in {}", key, value, path.display()));
    Ok(())
}

fn key_kind(key: &str) -> GostageResult<KeyKind> {
    KEYS.iter()
        .find(|(k, _)| *k == key)
        .map(|(_, kind)| *kind)
        .ok_or_else(|| unknown_key(key))
}

fn typed_value(kind: KeyKind, value: &str) -> GostageResult<toml::Value> {
    Ok(match kind {
        KeyKind::Bool => toml::Value::Boolean(parse_bool(value)?),
        KeyKind::Int => toml::Value::Integer(parse_num(value)?),
        KeyKind::Text => toml::Value::String(value.to_string()),
    })
}

/// Set a dot-separated key in a TOML tree, creating tables as needed
fn set_toml_value(doc: &mut toml::Value, key: &str, value: toml::Value) -> GostageResult<()> {
    let (tables, leaf) = match key.rsplit_once('.') {
        Some((tables, leaf)) => (tables.split('.').collect::<Vec<_>>(), leaf),
        None => (Vec::new(), key),
    };

    let mut current = doc;
    for part in tables {
        current = current
            .as_table_mut()
            .ok_or_else(|| GostageError::User(format!("Expected table at key: {}", part)))?
            .entry(part)
            .or_insert_with(|| toml::Value::Table(toml::map::Map::new()));
    }

    current
        .as_table_mut()
        .ok_or_else(|| GostageError::User(format!("Expected table for key: {}", key)))?
        .insert(leaf.to_string(), value);
    Ok(())
}

fn unknown_key(key: &str) -> GostageError {
    let valid: Vec<&str> = KEYS.iter().map(|(k, _)| *k).collect();
    GostageError::User(format!(
        "Unknown config key: {}. Valid keys: {}",
        key,
        valid.join(", ")
    ))
}

fn parse_bool(value: &str) -> GostageResult<bool> {
    match value.to_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(GostageError::User(format!(
            "Invalid boolean value: {}. Use true/false",
            value
        ))),
    }
}

fn parse_num<T: std::str::FromStr>(value: &str) -> GostageResult<T> {
    value
        .parse()
        .map_err(|_| GostageError::User(format!("Invalid number: {}", value)))
}

fn parse_log_format(value: &str) -> GostageResult<String> {
    match value {
        "text" | "json" => Ok(value.to_string()),
        _ => Err(GostageError::User(format!(
            "Invalid log format: {}. Use text or json",
            value
        ))),
    }
}
