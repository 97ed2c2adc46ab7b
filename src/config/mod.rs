#![forbid(unsafe_code)]

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::error::TaskdeckError;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub storage: StorageConfig,
    pub fetch: FetchConfig,
    pub ui: UiConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StorageConfig {
    pub enabled: bool,
    pub dir: String,
    pub file: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            dir: "~/.local/share/taskdeck".to_owned(),
            file: "taskdeck.json".to_owned(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FetchConfig {
    pub delay_ms: u64,
    pub fail: bool,
    pub failure_message: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            delay_ms: 800,
            fail: false,
            failure_message: "task service unavailable".to_owned(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct UiConfig {
    pub icons: bool,
    pub default_filter: String,
    pub tick_ms: u64,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            icons: true,
            default_filter: "all".to_owned(),
            tick_ms: 200,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ConfigPaths {
    pub config_file: PathBuf,
}

pub fn default_paths() -> anyhow::Result<ConfigPaths> {
    let unix = home_config_path_unix();
    if !cfg!(windows) {
        return Ok(ConfigPaths { config_file: unix });
    }

    // Windows: prefer the Unix-style path if present for portability.
    if unix.exists() {
        return Ok(ConfigPaths { config_file: unix });
    }

    let proj = ProjectDirs::from("com", "taskdeck", "taskdeck")
        .context("failed to determine platform config directory")?;
    Ok(ConfigPaths {
        config_file: proj.config_dir().join("config.toml"),
    })
}

fn home_config_path_unix() -> PathBuf {
    let home = home_dir().unwrap_or_else(|| PathBuf::from("~"));
    home.join(".config").join("taskdeck").join("config.toml")
}

fn home_dir() -> Option<PathBuf> {
    if let Some(v) = std::env::var_os("HOME") {
        return Some(PathBuf::from(v));
    }
    if let Some(v) = std::env::var_os("USERPROFILE") {
        return Some(PathBuf::from(v));
    }
    let drive = std::env::var_os("HOMEDRIVE");
    let path = std::env::var_os("HOMEPATH");
    match (drive, path) {
        (Some(d), Some(p)) => Some(PathBuf::from(d).join(PathBuf::from(p))),
        _ => None,
    }
}

#[must_use]
pub fn expand_tilde(input: &str) -> String {
    if let Some(rest) = input.strip_prefix("~/")
        && let Some(home) = home_dir()
    {
        return home.join(rest).to_string_lossy().to_string();
    }
    input.to_owned()
}

pub fn expand_path(input: &str) -> anyhow::Result<PathBuf> {
    let expanded = expand_env_vars(&expand_tilde(input));
    let p = PathBuf::from(expanded);
    if p.is_absolute() {
        return Ok(p);
    }
    let cwd = std::env::current_dir().context("failed to get current directory")?;
    Ok(cwd.join(p))
}

fn expand_env_vars(input: &str) -> String {
    // Expand $VAR and ${VAR}. Leave unknown vars untouched.
    let re = regex::Regex::new(r"\$\{?([A-Za-z_][A-Za-z0-9_]*)\}?")
        .unwrap_or_else(|_| regex::Regex::new("$^").unwrap());
    re.replace_all(input, |caps: &regex::Captures<'_>| {
        let key = &caps[1];
        std::env::var(key).unwrap_or_else(|_| caps[0].to_owned())
    })
    .to_string()
}

pub fn load() -> anyhow::Result<(Config, toml_edit::DocumentMut, ConfigPaths)> {
    let paths = default_paths()?;
    let (doc, cfg) = load_from_file(&paths.config_file)?;
    cfg.validate()?;
    Ok((cfg, doc, paths))
}

pub fn list_resolved_toml() -> anyhow::Result<String> {
    let (cfg, _doc, _paths) = load()?;
    Ok(toml::to_string_pretty(&cfg)?)
}

pub fn get_value_string(key: &str) -> anyhow::Result<Option<String>> {
    let paths = default_paths()?;
    get_value_string_at_path(&paths.config_file, key)
}

pub fn set_value_string(key: &str, value: &str) -> anyhow::Result<()> {
    let paths = default_paths()?;
    set_value_string_at_path(&paths.config_file, key, value)
}

fn load_from_file(path: &Path) -> anyhow::Result<(toml_edit::DocumentMut, Config)> {
    if !path.exists() {
        return Ok((toml_edit::DocumentMut::new(), Config::default()));
    }
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;

    let doc = raw
        .parse::<toml_edit::DocumentMut>()
        .with_context(|| format!("failed to parse TOML in {}", path.display()))?;

    let cfg: Config = toml::from_str(&raw)
        .with_context(|| format!("failed to deserialize TOML in {}", path.display()))?;
    Ok((doc, cfg))
}

pub fn get_value_string_at_path(path: &Path, key: &str) -> anyhow::Result<Option<String>> {
    let (_doc, cfg) = load_from_file(path)?;
    cfg.validate()?;

    if key_type(key).is_none() {
        return Err(TaskdeckError::InvalidConfigKey(key.to_owned()).into());
    }
    let value = lookup_value(&cfg, key);
    Ok(value.map(format_value_for_stdout))
}

pub fn set_value_string_at_path(path: &Path, key: &str, value: &str) -> anyhow::Result<()> {
    let (mut doc, cfg) = load_from_file(path)?;
    cfg.validate()?;

    let value_item = parse_value(key, value)?;
    apply_set(&mut doc, key, value_item)?;

    // Validate by re-parsing the updated doc into a Config.
    let new_raw = doc.to_string();
    let new_cfg: Config = toml::from_str(&new_raw)
        .with_context(|| format!("config update produced invalid TOML for {}", path.display()))?;
    new_cfg.validate()?;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    std::fs::write(path, new_raw.as_bytes())
        .with_context(|| format!("failed to write {}", path.display()))?;

    Ok(())
}

impl Config {
    pub fn validate(&self) -> Result<(), TaskdeckError> {
        if self.storage.dir.trim().is_empty() {
            return Err(TaskdeckError::Config(
                "storage.dir must not be empty".to_owned(),
            ));
        }
        if self.storage.file.trim().is_empty() {
            return Err(TaskdeckError::Config(
                "storage.file must not be empty".to_owned(),
            ));
        }
        if self.storage.file.contains('/') || self.storage.file.contains('\\') {
            return Err(TaskdeckError::Config(
                "storage.file must be a bare file name".to_owned(),
            ));
        }
        if self.ui.tick_ms == 0 {
            return Err(TaskdeckError::Config("ui.tick_ms must be >= 1".to_owned()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum KeyType {
    Bool,
    Int,
    String,
}

fn key_type(key: &str) -> Option<KeyType> {
    Some(match key {
        "storage.dir" | "storage.file" | "fetch.failure_message" | "ui.default_filter" => {
            KeyType::String
        }

        "storage.enabled" | "fetch.fail" | "ui.icons" => KeyType::Bool,

        "fetch.delay_ms" | "ui.tick_ms" => KeyType::Int,

        _ => return None,
    })
}

fn parse_value(key: &str, value: &str) -> anyhow::Result<toml_edit::Item> {
    let key_type = key_type(key).ok_or_else(|| TaskdeckError::InvalidConfigKey(key.to_owned()))?;
    let item = match key_type {
        KeyType::Bool => toml_edit::value(parse_bool(value).map_err(|msg| {
            TaskdeckError::InvalidConfigValue {
                key: key.to_owned(),
                msg,
            }
        })?),
        KeyType::Int => toml_edit::value(parse_int(value).map_err(|msg| {
            TaskdeckError::InvalidConfigValue {
                key: key.to_owned(),
                msg,
            }
        })?),
        KeyType::String => toml_edit::value(value),
    };
    Ok(item)
}

fn parse_bool(s: &str) -> Result<bool, String> {
    match s.trim() {
        "true" => Ok(true),
        "false" => Ok(false),
        other => Err(format!("expected true|false, got '{other}'")),
    }
}

fn parse_int(s: &str) -> Result<i64, String> {
    s.trim()
        .parse::<i64>()
        .map_err(|e| format!("expected integer, got '{s}': {e}"))
}

fn apply_set(
    doc: &mut toml_edit::DocumentMut,
    key: &str,
    value: toml_edit::Item,
) -> anyhow::Result<()> {
    let parts: Vec<&str> = key.split('.').filter(|p| !p.is_empty()).collect();
    if parts.is_empty() {
        return Err(TaskdeckError::InvalidConfigKey(key.to_owned()).into());
    }

    let mut cur = doc.as_table_mut();
    for seg in &parts[..parts.len().saturating_sub(1)] {
        if !cur.contains_key(seg) {
            let mut t = toml_edit::Table::new();
            t.set_implicit(true);
            cur.insert(seg, toml_edit::Item::Table(t));
        }
        cur = cur[seg].as_table_mut().ok_or_else(|| {
            TaskdeckError::Config(format!("cannot set {key}: '{seg}' is not a table"))
        })?;
    }

    let leaf = parts[parts.len() - 1];
    cur.insert(leaf, value);
    Ok(())
}

fn lookup_value(cfg: &Config, key: &str) -> Option<serde_json::Value> {
    let mut v = serde_json::to_value(cfg).ok()?;
    for seg in key.split('.').filter(|s| !s.is_empty()) {
        match v {
            serde_json::Value::Object(mut map) => {
                v = map.remove(seg)?;
            }
            _ => return None,
        }
    }
    Some(v)
}

fn format_value_for_stdout(v: serde_json::Value) -> String {
    match v {
        serde_json::Value::Null => "null".to_owned(),
        serde_json::Value::Bool(b) => b.to_string(),
        serde_json::Value::Number(n) => n.to_string(),
        serde_json::Value::String(s) => s,
        other => serde_json::to_string_pretty(&other).unwrap_or_else(|_| other.to_string()),
    }
}
