//! XML configuration support.
//! - Loads settings from config.xml (quick_xml + serde).
//! - Unknown elements are rejected so typos surface instead of being ignored.
//! - A missing default file means "use defaults"; a missing explicit
//!   `$POSIX_FS_CONFIG` file is an error.

use anyhow::{Context, Result, anyhow};
use quick_xml::de::from_str as from_xml_str;
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::paths::{CONFIG_ENV, config_path};
use super::types::{Config, LogLevel, parse_dir_mode};

/// Struct mirroring the XML config for deserialization.
#[derive(Debug, Deserialize)]
#[serde(rename = "config")]
#[serde(deny_unknown_fields)]
struct XmlConfig {
    log_level: Option<String>,
    log_file: Option<String>,
    json: Option<bool>,
    dir_mode: Option<String>,
}

fn apply_xml(parsed: XmlConfig, cfg: &mut Config) -> Result<()> {
    if let Some(s) = parsed.log_level.as_deref() {
        cfg.log_level = s.parse::<LogLevel>().map_err(|e| anyhow!(e))?;
    }
    if let Some(s) = parsed.log_file.as_deref() {
        let trimmed = s.trim();
        if !trimmed.is_empty() {
            cfg.log_file = Some(PathBuf::from(trimmed));
        }
    }
    if let Some(json) = parsed.json {
        cfg.json = json;
    }
    if let Some(s) = parsed.dir_mode.as_deref() {
        cfg.dir_mode = parse_dir_mode(s).map_err(|e| anyhow!(e))?;
    }
    Ok(())
}

/// Load a Config from a specific XML file. Fields left out keep their defaults;
/// an empty file yields `Config::default()`.
pub fn load_config_from_xml_path(path: &Path) -> Result<Config> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("read config xml '{}'", path.display()))?;
    let mut cfg = Config::default();
    if contents.trim().is_empty() {
        return Ok(cfg);
    }
    let parsed: XmlConfig = from_xml_str(&contents)
        .with_context(|| format!("parse config xml '{}'", path.display()))?;
    apply_xml(parsed, &mut cfg)
        .with_context(|| format!("invalid value in config xml '{}'", path.display()))?;
    debug!(path = %path.display(), "loaded config");
    Ok(cfg)
}

/// Resolve and load the effective config file.
///
/// Returns the config together with the file it came from (`None` when
/// running on built-in defaults).
pub fn load_config() -> Result<(Config, Option<PathBuf>)> {
    let explicit = env::var_os(CONFIG_ENV).is_some_and(|p| !p.is_empty());
    let Some(path) = config_path() else {
        return Ok((Config::default(), None));
    };
    if !explicit && !path.exists() {
        return Ok((Config::default(), None));
    }
    let cfg = load_config_from_xml_path(&path)?;
    Ok((cfg, Some(path)))
}
