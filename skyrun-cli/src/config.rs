//! Effective simulation config: defaults, then an optional JSON file, then
//! environment overrides. The result is always validated.

use anyhow::{Context, Result};
use skyrun_core::SimConfig;
use std::env;
use std::fs;
use std::path::Path;

pub const ENV_MAX_LEVEL: &str = "SKYRUN_MAX_LEVEL";
pub const ENV_LEVEL_SECONDS: &str = "SKYRUN_LEVEL_SECONDS";
pub const ENV_FPS: &str = "SKYRUN_FPS";

pub fn load_config(path: Option<&Path>) -> Result<SimConfig> {
    load_config_with(path, |name| env::var(name).ok())
}

pub fn load_config_with(
    path: Option<&Path>,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<SimConfig> {
    let mut config = match path {
        Some(path) => read_config_file(path)?,
        None => SimConfig::default(),
    };

    config.max_level = read_u32(&lookup, ENV_MAX_LEVEL, config.max_level);
    config.level_seconds = read_u32(&lookup, ENV_LEVEL_SECONDS, config.level_seconds);
    config.frames_per_second = read_u32(&lookup, ENV_FPS, config.frames_per_second);

    config
        .validate()
        .context("invalid simulation config")?;
    Ok(config)
}

fn read_config_file(path: &Path) -> Result<SimConfig> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("failed reading config {}", path.display()))?;
    serde_json::from_str(&data)
        .with_context(|| format!("failed parsing config {}", path.display()))
}

fn read_u32(lookup: &impl Fn(&str) -> Option<String>, name: &str, default: u32) -> u32 {
    let Some(raw) = lookup(name) else {
        return default;
    };
    match raw.trim().parse::<u32>() {
        Ok(value) if value > 0 => value,
        _ => {
            tracing::warn!(name, value = raw.as_str(), default, "ignoring invalid env override");
            default
        }
    }
}
