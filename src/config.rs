use anyhow::{Context, Result};
use chrono::NaiveDate;
use directories::{BaseDirs, ProjectDirs};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

const DEFAULT_BIRTH_DATE: &str = "2000-01-01";
const DEFAULT_DEATH_DATE: &str = "2080-01-01";
const DEFAULT_DIARY_DIR: &str = "~/.life-calendar/diary";
const DEFAULT_TEMPLATE: &str = "~/.life-calendar/template.md";
const LOCAL_CONFIG: &str = "life-calendar.yml";

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid {field} format (use YYYY-MM-DD): {value}")]
    InvalidDate { field: &'static str, value: String },
    #[error("config file not found: {0}")]
    Missing(PathBuf),
}

/// On-disk shape of `config.yml`. Every field is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RawConfig {
    pub birth_date: Option<String>,
    pub death_date: Option<String>,
    pub editor: Option<String>,
    pub diary_dir: Option<String>,
    pub diary_template: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub birth: NaiveDate,
    pub death: NaiveDate,
    pub death_label: String,
    pub editor: String,
    pub diary_dir: PathBuf,
    pub diary_template: PathBuf,
    pub template_fallback: Option<PathBuf>,
}

impl Config {
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let raw = match locate_config(explicit)? {
            Some(path) => {
                tracing::info!(path = %path.display(), "loading config");
                let data = fs::read_to_string(&path)
                    .with_context(|| format!("reading {:?}", path))?;
                serde_yaml::from_str(&data)
                    .with_context(|| format!("parsing config file {:?}", path))?
            }
            None => {
                tracing::info!("no config file found, using environment and defaults");
                RawConfig::default()
            }
        };
        let home = BaseDirs::new().map(|dirs| dirs.home_dir().to_path_buf());
        let config = Config::resolve(raw, |name| env::var(name).ok(), home.as_deref())?;
        Ok(config)
    }

    /// Layers environment overrides over the file values and defaults.
    pub fn resolve(
        raw: RawConfig,
        env: impl Fn(&str) -> Option<String>,
        home: Option<&Path>,
    ) -> Result<Self, ConfigError> {
        let var = |name: &str| env(name).filter(|v| !v.trim().is_empty());
        let birth_str = var("LIFE_CALENDAR_BIRTH_DATE")
            .or(raw.birth_date)
            .unwrap_or_else(|| DEFAULT_BIRTH_DATE.to_string());
        let death_str = var("LIFE_CALENDAR_DEATH_DATE")
            .or(raw.death_date)
            .unwrap_or_else(|| DEFAULT_DEATH_DATE.to_string());
        let editor = var("LIFE_CALENDAR_EDITOR")
            .or(raw.editor)
            .or_else(|| var("VISUAL"))
            .or_else(|| var("EDITOR"))
            .unwrap_or_else(|| "vi".to_string());
        let diary_dir = var("LIFE_CALENDAR_DIARY_DIR")
            .or(raw.diary_dir)
            .unwrap_or_else(|| DEFAULT_DIARY_DIR.to_string());
        let diary_template = var("LIFE_CALENDAR_DIARY_TEMPLATE")
            .or(raw.diary_template)
            .unwrap_or_else(|| DEFAULT_TEMPLATE.to_string());
        let template_fallback = var("LIFE_CALENDAR_DIARY_TEMPLATE_FALLBACK")
            .map(|p| expand_home(&p, home));

        Ok(Config {
            birth: parse_date("birth_date", &birth_str)?,
            death: parse_date("death_date", &death_str)?,
            death_label: death_str,
            editor,
            diary_dir: expand_home(&diary_dir, home),
            diary_template: expand_home(&diary_template, home),
            template_fallback,
        })
    }
}

pub fn parse_date(field: &'static str, value: &str) -> Result<NaiveDate, ConfigError> {
    let invalid = || ConfigError::InvalidDate {
        field,
        value: value.to_string(),
    };
    let bytes = value.as_bytes();
    if bytes.len() != 10 || bytes[4] != b'-' || bytes[7] != b'-' {
        return Err(invalid());
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| invalid())
}

/// Expands a bare `~` or a `~/` prefix. `~user` paths are left as written.
pub fn expand_home(path: &str, home: Option<&Path>) -> PathBuf {
    let Some(home) = home else {
        return PathBuf::from(path);
    };
    if path == "~" {
        return home.to_path_buf();
    }
    match path.strip_prefix("~/") {
        Some(rest) => home.join(rest.trim_start_matches('/')),
        None => PathBuf::from(path),
    }
}

fn locate_config(explicit: Option<&Path>) -> Result<Option<PathBuf>> {
    if let Some(path) = explicit {
        if !path.exists() {
            return Err(ConfigError::Missing(path.to_path_buf()).into());
        }
        return Ok(Some(path.to_path_buf()));
    }
    let local = env::current_dir()?.join(LOCAL_CONFIG);
    if local.exists() {
        return Ok(Some(local));
    }
    Ok(global_config_path().filter(|p| p.exists()))
}

fn global_config_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "life-calendar").map(|dirs| dirs.config_dir().join("config.yml"))
}
