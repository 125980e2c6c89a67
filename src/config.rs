//! Configuration loading for super-hooks
//!
//! Loads configuration from the pyproject.toml [tool.super-hooks] section

use crate::locator::{BaseClasses, DEFAULT_BASE_CLASS};
use crate::rules::get_all_rule_ids;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

const TOOL_SECTION: &str = "super-hooks";

const DEFAULT_EXCLUDES: &[&str] = &[
    ".venv",
    "venv",
    "__pycache__",
    ".git",
    ".tox",
    "build",
    "dist",
    ".pytest_cache",
    ".ruff_cache",
    "node_modules",
    ".mypy_cache",
];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid TOML in {path}: {source}")]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// The [tool.super-hooks] table
#[derive(Debug, Deserialize, Serialize, Default, Clone, PartialEq, Eq)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct Config {
    /// Replaces the recognized test base classes
    #[serde(default, alias = "base_classes")]
    pub base_classes: Option<Vec<String>>,

    /// Added to the recognized test base classes
    #[serde(default, alias = "extend_base_classes")]
    pub extend_base_classes: Vec<String>,

    /// Rules to enable (empty means all rules, or use ["ALL"])
    #[serde(default)]
    pub enable: Vec<String>,

    #[serde(default)]
    pub disable: Vec<String>,

    /// Directory or file names skipped while walking
    #[serde(default)]
    pub exclude: Vec<String>,
}

/// Command line values that can override the config file
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    pub base_classes: Vec<String>,
    pub extend_base_classes: Vec<String>,
    pub enable: Vec<String>,
    pub disable: Vec<String>,
    pub exclude: Vec<String>,
}

/// Settings after config and CLI have been combined
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub base_classes: BaseClasses,
    /// `None` runs every rule
    pub enable: Option<Vec<String>>,
    pub exclude: Vec<String>,
}

/// Find the closest pyproject.toml with a [tool.super-hooks] section, walking up
pub fn find_config_pyproject_toml(start_path: &Path) -> Option<PathBuf> {
    let mut current = if start_path.is_file() {
        start_path.parent()?
    } else {
        start_path
    };

    loop {
        let pyproject = current.join("pyproject.toml");
        if pyproject.is_file() {
            let has_section = std::fs::read_to_string(&pyproject)
                .ok()
                .and_then(|content| toml::from_str::<toml::Value>(&content).ok())
                .is_some_and(|value| {
                    value
                        .get("tool")
                        .and_then(|tool| tool.get(TOOL_SECTION))
                        .is_some()
                });
            if has_section {
                return Some(pyproject);
            }
        }

        current = current.parent()?;
    }
}

/// Load configuration.
///
/// With an explicit `path` the file must be readable and valid; a missing
/// [tool.super-hooks] section there just means defaults. Without one, the
/// nearest pyproject.toml carrying the section is used, if any.
pub fn load_config(path: Option<&Path>) -> Result<Option<Config>, ConfigError> {
    let config_path = match path {
        Some(p) => p.to_path_buf(),
        None => {
            let Ok(cwd) = std::env::current_dir() else {
                return Ok(None);
            };
            match find_config_pyproject_toml(&cwd) {
                Some(found) => found,
                None => return Ok(None),
            }
        }
    };

    let content = std::fs::read_to_string(&config_path).map_err(|source| ConfigError::Read {
        path: config_path.clone(),
        source,
    })?;
    parse_config(&content).map_err(|source| ConfigError::Toml {
        path: config_path,
        source,
    })
}

/// Parse the [tool.super-hooks] table out of pyproject.toml contents
pub fn parse_config(content: &str) -> Result<Option<Config>, toml::de::Error> {
    let value: toml::Value = toml::from_str(content)?;
    let Some(section) = value.get("tool").and_then(|tool| tool.get(TOOL_SECTION)) else {
        return Ok(None);
    };
    let config: Config = section.clone().try_into()?;
    Ok(Some(config))
}

/// Merge config file settings with command line arguments.
/// CLI arguments take precedence.
pub fn merge_config(config: Option<&Config>, cli: &CliOverrides) -> ResolvedConfig {
    let cli_rules = !cli.enable.is_empty() || !cli.disable.is_empty();

    let mut enable = None;
    if cli_rules {
        enable = resolve_rules(&cli.enable, &cli.disable);
    } else if let Some(cfg) = config {
        enable = resolve_rules(&cfg.enable, &cfg.disable);
    }

    let mut base_classes = if !cli.base_classes.is_empty() {
        BaseClasses::new(split_list(&cli.base_classes))
    } else if let Some(names) = config.and_then(|cfg| cfg.base_classes.as_ref()) {
        BaseClasses::new(split_list(names))
    } else {
        BaseClasses::new([DEFAULT_BASE_CLASS])
    };
    if let Some(cfg) = config {
        base_classes.extend(split_list(&cfg.extend_base_classes));
    }
    base_classes.extend(split_list(&cli.extend_base_classes));

    let mut exclude: Vec<String> = config
        .map(|cfg| cfg.exclude.clone())
        .unwrap_or_default();
    exclude.extend(split_list(&cli.exclude));
    for default in DEFAULT_EXCLUDES {
        if !exclude.iter().any(|e| e == default) {
            exclude.push(default.to_string());
        }
    }

    ResolvedConfig {
        base_classes,
        enable,
        exclude,
    }
}

/// Turn enable/disable lists into the ids to run. `None` means every rule.
fn resolve_rules(enable: &[String], disable: &[String]) -> Option<Vec<String>> {
    let enable: Vec<String> = split_list(enable).map(|id| id.to_uppercase()).collect();
    let disable: Vec<String> = split_list(disable).map(|id| id.to_uppercase()).collect();

    if enable.is_empty() && disable.is_empty() {
        return None;
    }

    let base = if enable.is_empty() || enable.iter().any(|id| id == "ALL") {
        get_all_rule_ids()
    } else {
        enable
    };
    Some(base.into_iter().filter(|id| !disable.contains(id)).collect())
}

/// Flatten values that may be repeated or comma-separated
fn split_list(values: &[String]) -> impl Iterator<Item = String> + '_ {
    values
        .iter()
        .flat_map(|value| value.split(','))
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(String::from)
}
