use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use dialoguer::{Password, theme::ColorfulTheme};
use serde::{Deserialize, Serialize};

use crate::palette::Palette;
use crate::utils::{get_data_dir, strip_controls_and_escapes, trim_line};

pub const API_KEY_ENV: &str = "STUDYAID_OPENAI_API_KEY";

const SETTINGS_FILE_NAME: &str = "settings.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiKeySource {
    Environment,
    SettingsFile,
}

impl ApiKeySource {
    pub fn description(&self) -> &'static str {
        match self {
            ApiKeySource::Environment => "environment variable",
            ApiKeySource::SettingsFile => "local settings file",
        }
    }
}

/// Remote model used for each capability.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelIds {
    pub summary: String,
    pub questions: String,
    pub fill_mask: String,
}

impl Default for ModelIds {
    fn default() -> Self {
        Self {
            summary: "gpt-5-nano".to_string(),
            questions: "gpt-5-mini".to_string(),
            fill_mask: "gpt-5-nano".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    openai_key: Option<String>,
    #[serde(default)]
    pub models: ModelIds,
}

impl Settings {
    fn has_customizations(&self) -> bool {
        self.openai_key.is_some() || self.models != ModelIds::default()
    }
}

#[derive(Debug)]
pub struct ApiKeyLookup {
    pub api_key: Option<String>,
    pub source: Option<ApiKeySource>,
}

pub fn settings_path() -> Result<PathBuf> {
    Ok(get_data_dir()?.join(SETTINGS_FILE_NAME))
}

pub fn load_settings() -> Result<Settings> {
    let path = settings_path()?;
    Ok(read_settings(&path)?.unwrap_or_default())
}

pub fn store_api_key(api_key: &str) -> Result<()> {
    store_api_key_at(&settings_path()?, api_key)
}

pub fn clear_api_key() -> Result<bool> {
    clear_api_key_at(&settings_path()?)
}

/// The environment variable wins over the settings file.
pub fn resolve_api_key() -> Result<ApiKeyLookup> {
    resolve_api_key_with(env::var(API_KEY_ENV).ok(), &settings_path()?)
}

pub fn prompt_for_api_key() -> Result<String> {
    println!(
        "{} (https://platform.openai.com/account/api-keys) to enable model-backed summaries.",
        Palette::paint(Palette::SUCCESS, "Enter your OpenAI API key")
    );
    println!(
        "{}",
        Palette::dim("Leave the field blank to keep using offline generation.")
    );
    let raw = Password::with_theme(&ColorfulTheme::default())
        .with_prompt("API Key")
        .allow_empty_password(true)
        .interact()
        .context("Failed to read API key")?;

    Ok(strip_controls_and_escapes(&raw))
}

fn store_api_key_at(path: &Path, api_key: &str) -> Result<()> {
    let trimmed = trim_line(api_key).context("Cannot store an empty API key")?;

    let mut settings = read_settings(path)?.unwrap_or_default();
    settings.openai_key = Some(trimmed.to_string());
    write_settings(path, &settings)
}

fn clear_api_key_at(path: &Path) -> Result<bool> {
    let Some(mut settings) = read_settings(path)? else {
        return Ok(false);
    };
    if settings.openai_key.take().is_none() {
        return Ok(false);
    }

    if settings.has_customizations() {
        write_settings(path, &settings)?;
    } else {
        fs::remove_file(path).with_context(|| {
            format!("Failed to remove empty settings file at {}", path.display())
        })?;
    }
    Ok(true)
}

fn resolve_api_key_with(env_value: Option<String>, path: &Path) -> Result<ApiKeyLookup> {
    if let Some(value) = env_value
        && let Some(key) = trim_line(&value)
    {
        return Ok(ApiKeyLookup {
            api_key: Some(key.to_string()),
            source: Some(ApiKeySource::Environment),
        });
    }

    let stored = read_settings(path)?
        .and_then(|settings| settings.openai_key)
        .and_then(|key| trim_line(&key).map(str::to_string));

    Ok(match stored {
        Some(key) => ApiKeyLookup {
            api_key: Some(key),
            source: Some(ApiKeySource::SettingsFile),
        },
        None => ApiKeyLookup {
            api_key: None,
            source: None,
        },
    })
}

fn read_settings(path: &Path) -> Result<Option<Settings>> {
    match fs::read_to_string(path) {
        Ok(contents) => parse_settings(&contents, path).map(Some),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(err) => {
            Err(err).with_context(|| format!("Failed to read settings at {}", path.display()))
        }
    }
}

fn write_settings(path: &Path, settings: &Settings) -> Result<()> {
    let contents = format!("{}\n", serde_json::to_string_pretty(settings)?);
    fs::write(path, contents)
        .with_context(|| format!("Failed to write settings at {}", path.display()))
}

fn parse_settings(contents: &str, path: &Path) -> Result<Settings> {
    if contents.trim().is_empty() {
        return Ok(Settings::default());
    }
    serde_json::from_str(contents)
        .with_context(|| format!("Failed to parse settings at {}", path.display()))
}
