//! Optional config file with defaults for the CLI.
//!
//! The file lives at `$XDG_CONFIG_HOME/bookshelf/config.toml` (or
//! `$HOME/.config/bookshelf/config.toml`) and holds flat `key = value` lines:
//!
//! ```toml
//! api_url = "https://library.example/api"
//! email = "ann@example.com"
//! name = "Ann"
//! loan_days = 14   # default due date offset
//! ```

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, anyhow, bail};
use bookshelf_core::session::DEFAULT_TOKEN_ENV;
use bookshelf_core::store::{DEFAULT_CONNECT_TIMEOUT_SECS, DEFAULT_READ_TIMEOUT_SECS};
use url::Url;

use crate::cli::Cli;

const APP_DIR: &str = "bookshelf";
const CONFIG_FILE: &str = "config.toml";

pub(crate) const DEFAULT_API_URL: &str = "http://localhost:5000";
pub(crate) const DEFAULT_LOAN_DAYS: u32 = 7;
pub(crate) const DEFAULT_TICK_MS: u64 = 1_000;

/// Values read from the config file; every key is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct FileConfig {
    pub(crate) api_url: Option<String>,
    pub(crate) email: Option<String>,
    pub(crate) name: Option<String>,
    /// Environment variable holding the bearer token.
    pub(crate) token_env: Option<String>,
    pub(crate) loan_days: Option<u32>,
    pub(crate) connect_timeout_secs: Option<u64>,
    pub(crate) read_timeout_secs: Option<u64>,
    /// Countdown refresh period for `watch`.
    pub(crate) tick_ms: Option<u64>,
}

impl FileConfig {
    fn validate(&self) -> Result<()> {
        if let Some(api_url) = &self.api_url {
            validate_api_url(api_url)?;
        }
        if let Some(days) = self.loan_days
            && !(1..=365).contains(&days)
        {
            bail!("Invalid config value for `loan_days`: {days}. Expected range: 1..=365");
        }
        if let Some(tick) = self.tick_ms
            && !(100..=60_000).contains(&tick)
        {
            bail!("Invalid config value for `tick_ms`: {tick}. Expected range: 100..=60000");
        }
        validate_timeout_secs("connect_timeout_secs", self.connect_timeout_secs)?;
        validate_timeout_secs("read_timeout_secs", self.read_timeout_secs)?;
        if let Some(var) = &self.token_env
            && var.trim().is_empty()
        {
            bail!("Invalid config value for `token_env`: must not be empty");
        }
        Ok(())
    }
}

fn validate_timeout_secs(field: &str, value: Option<u64>) -> Result<()> {
    let Some(value) = value else {
        return Ok(());
    };
    if !(1..=3600).contains(&value) {
        bail!("Invalid config value for `{field}`: {value}. Expected range: 1..=3600");
    }
    Ok(())
}

fn validate_api_url(raw: &str) -> Result<()> {
    let url = Url::parse(raw).with_context(|| format!("Invalid `api_url`: '{raw}'"))?;
    if !matches!(url.scheme(), "http" | "https") {
        bail!("Invalid `api_url`: '{raw}' must use http or https");
    }
    Ok(())
}

/// Effective settings after merging CLI flags, file values, and defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Settings {
    pub(crate) api_url: String,
    pub(crate) email: Option<String>,
    pub(crate) name: Option<String>,
    pub(crate) token_env: String,
    pub(crate) loan_days: u32,
    pub(crate) connect_timeout_secs: u64,
    pub(crate) read_timeout_secs: u64,
    pub(crate) tick: Duration,
}

impl Settings {
    /// CLI flags win over file values; defaults fill the rest.
    pub(crate) fn resolve(cli: &Cli, file: Option<&FileConfig>) -> Result<Self> {
        let file = file.cloned().unwrap_or_default();
        let api_url = cli
            .api_url
            .clone()
            .or(file.api_url)
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());
        validate_api_url(&api_url)?;

        Ok(Self {
            api_url,
            email: cli.email.clone().or(file.email),
            name: cli.name.clone().or(file.name),
            token_env: file
                .token_env
                .unwrap_or_else(|| DEFAULT_TOKEN_ENV.to_string()),
            loan_days: file.loan_days.unwrap_or(DEFAULT_LOAN_DAYS),
            connect_timeout_secs: file
                .connect_timeout_secs
                .unwrap_or(DEFAULT_CONNECT_TIMEOUT_SECS),
            read_timeout_secs: file.read_timeout_secs.unwrap_or(DEFAULT_READ_TIMEOUT_SECS),
            tick: Duration::from_millis(file.tick_ms.unwrap_or(DEFAULT_TICK_MS)),
        })
    }
}

/// Config file location and contents, if one was found.
#[derive(Debug, Clone)]
pub(crate) struct LoadedConfig {
    pub(crate) path: Option<PathBuf>,
    pub(crate) config: Option<FileConfig>,
}

/// Resolves the config path.
///
/// Priority:
/// 1. `$XDG_CONFIG_HOME/bookshelf/config.toml`
/// 2. `$HOME/.config/bookshelf/config.toml`
pub(crate) fn resolve_default_config_path() -> Option<PathBuf> {
    if let Some(base) = non_empty_env("XDG_CONFIG_HOME") {
        return Some(PathBuf::from(base).join(APP_DIR).join(CONFIG_FILE));
    }
    let home = non_empty_env("HOME")?;
    Some(
        PathBuf::from(home)
            .join(".config")
            .join(APP_DIR)
            .join(CONFIG_FILE),
    )
}

fn non_empty_env(name: &str) -> Option<std::ffi::OsString> {
    env::var_os(name).filter(|value| !value.is_empty())
}

/// Loads the config file from its default location, if present.
pub(crate) fn load_default_file_config() -> Result<LoadedConfig> {
    let path = resolve_default_config_path();
    let config = match path.as_deref() {
        Some(existing) if existing.exists() => Some(load_file_config(existing)?),
        _ => None,
    };
    Ok(LoadedConfig { path, config })
}

pub(crate) fn load_file_config(path: &Path) -> Result<FileConfig> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file '{}'", path.display()))?;
    parse_config_str(&raw)
        .with_context(|| format!("Failed to parse config file '{}'", path.display()))
}

fn parse_config_str(raw: &str) -> Result<FileConfig> {
    let mut cfg = FileConfig::default();
    for (index, raw_line) in raw.lines().enumerate() {
        let line_no = index + 1;
        let line = strip_inline_comment(raw_line).trim();
        if line.is_empty() {
            continue;
        }
        let Some((key, value)) = line.split_once('=') else {
            bail!("Invalid config syntax on line {line_no}: expected key = value");
        };
        let key = key.trim();
        let value = value.trim();
        let context = || format!("Invalid `{key}` value on line {line_no}");

        match key {
            "api_url" => cfg.api_url = Some(parse_string(value).with_context(context)?),
            "email" => cfg.email = Some(parse_string(value).with_context(context)?),
            "name" => cfg.name = Some(parse_string(value).with_context(context)?),
            "token_env" => cfg.token_env = Some(parse_string(value).with_context(context)?),
            "loan_days" => {
                let days = parse_unsigned(value).with_context(context)?;
                cfg.loan_days = Some(
                    u32::try_from(days)
                        .map_err(|_| anyhow!("loan_days out of range for u32"))
                        .with_context(context)?,
                );
            }
            "connect_timeout_secs" => {
                cfg.connect_timeout_secs = Some(parse_unsigned(value).with_context(context)?);
            }
            "read_timeout_secs" => {
                cfg.read_timeout_secs = Some(parse_unsigned(value).with_context(context)?);
            }
            "tick_ms" => cfg.tick_ms = Some(parse_unsigned(value).with_context(context)?),
            unknown => bail!("Unknown configuration key: '{unknown}' on line {line_no}"),
        }
    }
    cfg.validate()?;
    Ok(cfg)
}

fn strip_inline_comment(line: &str) -> &str {
    let mut quoted = false;
    for (index, ch) in line.char_indices() {
        match ch {
            '"' => quoted = !quoted,
            '#' if !quoted => return &line[..index],
            _ => {}
        }
    }
    line
}

fn parse_string(raw: &str) -> Result<String> {
    raw.strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
        .map(str::to_string)
        .ok_or_else(|| anyhow!("Expected double-quoted string"))
}

fn parse_unsigned(raw: &str) -> Result<u64> {
    let token = raw.trim();
    if token.is_empty() {
        bail!("Expected integer value");
    }
    if token.starts_with('-') {
        bail!("Expected non-negative integer");
    }
    Ok(token.parse::<u64>()?)
}
