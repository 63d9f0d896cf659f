//! Deployment settings for the client: which backend to talk to and which
//! download mode the page starts in.

use anyhow::{Context, Result, anyhow, bail};
use std::{
    collections::HashMap,
    env, fs,
    path::{Path, PathBuf},
};

use crate::controller::Mode;

pub const DEFAULT_ENV_PATH: &str = ".env";
pub const DEFAULT_API_BASE_URL: &str = "https://ytdownloader-production-cb83.up.railway.app";
pub const API_BASE_URL_KEY: &str = "YTDL_API_BASE_URL";
pub const INITIAL_MODE_KEY: &str = "YTDL_INITIAL_MODE";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSettings {
    pub api_base_url: String,
    pub initial_mode: Mode,
}

pub fn load_settings() -> Result<ClientSettings> {
    resolve_settings(SettingsOverrides::default())
}

#[derive(Debug, Clone, Default)]
pub struct SettingsOverrides {
    pub api_base_url: Option<String>,
    pub initial_mode: Option<Mode>,
    pub env_path: Option<PathBuf>,
}

pub fn resolve_settings(overrides: SettingsOverrides) -> Result<ClientSettings> {
    let env_path = overrides
        .env_path
        .as_deref()
        .unwrap_or_else(|| Path::new(DEFAULT_ENV_PATH));
    let file_vars = read_env_file(env_path)?;
    build_settings_with_overrides(&file_vars, env_var_string, overrides)
}

#[cfg(test)]
fn build_settings(
    file_vars: &HashMap<String, String>,
    env_lookup: impl Fn(&str) -> Option<String>,
) -> Result<ClientSettings> {
    build_settings_with_overrides(file_vars, env_lookup, SettingsOverrides::default())
}

fn build_settings_with_overrides(
    file_vars: &HashMap<String, String>,
    env_lookup: impl Fn(&str) -> Option<String>,
    overrides: SettingsOverrides,
) -> Result<ClientSettings> {
    let api_base_url = overrides
        .api_base_url
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .or_else(|| lookup_value(API_BASE_URL_KEY, file_vars, &env_lookup))
        .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string());
    let api_base_url = normalize_base_url(&api_base_url)?;

    let initial_mode = match overrides.initial_mode {
        Some(mode) => mode,
        None => match lookup_value(INITIAL_MODE_KEY, file_vars, &env_lookup) {
            Some(raw) => Mode::parse(&raw)
                .ok_or_else(|| anyhow!("{INITIAL_MODE_KEY} must be video or audio, got {raw}"))?,
            None => Mode::default(),
        },
    };

    Ok(ClientSettings {
        api_base_url,
        initial_mode,
    })
}

fn normalize_base_url(value: &str) -> Result<String> {
    if !(value.starts_with("http://") || value.starts_with("https://")) {
        bail!("{API_BASE_URL_KEY} must start with http:// or https://, got {value}");
    }
    Ok(value.trim_end_matches('/').to_string())
}

fn env_var_string(key: &str) -> Option<String> {
    env::var(key).ok().and_then(|value| {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

fn lookup_value(
    key: &str,
    file_vars: &HashMap<String, String>,
    env_lookup: &impl Fn(&str) -> Option<String>,
) -> Option<String> {
    env_lookup(key).or_else(|| {
        file_vars
            .get(key)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    })
}

pub fn read_env_file(path: &Path) -> Result<HashMap<String, String>> {
    let mut vars = HashMap::new();
    if !path.exists() {
        return Ok(vars);
    }
    let content =
        fs::read_to_string(path).with_context(|| format!("Reading {}", path.display()))?;
    for line in content.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let line = trimmed.strip_prefix("export ").unwrap_or(trimmed);
        let Some((key, value_raw)) = line.split_once('=') else {
            continue;
        };
        let key = key.trim();
        if key.is_empty() {
            continue;
        }
        let value = value_raw.trim();
        let value = value
            .strip_prefix('"')
            .and_then(|value| value.strip_suffix('"'))
            .or_else(|| {
                value
                    .strip_prefix('\'')
                    .and_then(|value| value.strip_suffix('\''))
            })
            .unwrap_or(value);
        vars.insert(key.to_string(), value.to_string());
    }
    Ok(vars)
}
