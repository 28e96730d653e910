//! TOML-based engine configuration.
//!
//! Holds every tunable of the proposal engine:
//! - Age bounds for the duration model
//! - Category skip rules and ignored module types
//! - Relax break sizing
//!
//! Configuration is stored at `~/.config/learnplan/config.toml`. A loaded
//! [`Config`] is treated as immutable and handed to each component.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::data_dir;
use crate::error::{ConfigError, Result};

/// Learner age bounds. Ages outside are clamped, never rejected.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LimitsConfig {
    #[serde(default = "default_min_age")]
    pub min_age: u32,
    #[serde(default = "default_max_age")]
    pub max_age: u32,
}

/// Category skip rules.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RulesConfig {
    /// Drop categories whose practice work is already passed.
    #[serde(default = "default_true")]
    pub skip_passed_categories: bool,
    /// Drop categories that contain no practice activity.
    #[serde(default)]
    pub skip_categories_without_practice: bool,
    /// Drop categories whose accumulated attempts exceed this ceiling.
    #[serde(default = "default_max_category_attempts")]
    pub max_category_attempts: u32,
    /// Module names never proposed (e.g. "forum").
    #[serde(default)]
    pub ignored_modules: Vec<String>,
}

/// Relax break sizing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RelaxConfig {
    /// Leftover free minutes per relax item.
    #[serde(default = "default_relax_minimum_minutes")]
    pub minimum_minutes: u32,
    /// Fixed length of one relax break.
    #[serde(default = "default_relax_duration_minutes")]
    pub duration_minutes: u32,
    #[serde(default)]
    pub min_count: u32,
    #[serde(default = "default_relax_max_count")]
    pub max_count: u32,
}

/// Engine configuration.
///
/// Serialized to/from TOML at `~/.config/learnplan/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Config {
    #[serde(default)]
    pub limits: LimitsConfig,
    #[serde(default)]
    pub rules: RulesConfig,
    #[serde(default)]
    pub relax: RelaxConfig,
}

fn default_min_age() -> u32 {
    5
}
fn default_max_age() -> u32 {
    100
}
fn default_true() -> bool {
    true
}
fn default_max_category_attempts() -> u32 {
    10
}
fn default_relax_minimum_minutes() -> u32 {
    15
}
fn default_relax_duration_minutes() -> u32 {
    10
}
fn default_relax_max_count() -> u32 {
    8
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            min_age: default_min_age(),
            max_age: default_max_age(),
        }
    }
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            skip_passed_categories: true,
            skip_categories_without_practice: false,
            max_category_attempts: default_max_category_attempts(),
            ignored_modules: Vec::new(),
        }
    }
}

impl Default for RelaxConfig {
    fn default() -> Self {
        Self {
            minimum_minutes: default_relax_minimum_minutes(),
            duration_minutes: default_relax_duration_minutes(),
            min_count: 0,
            max_count: default_relax_max_count(),
        }
    }
}

impl LimitsConfig {
    pub fn clamp_age(&self, age: u32) -> u32 {
        age.clamp(self.min_age, self.max_age.max(self.min_age))
    }
}

impl RelaxConfig {
    pub fn clamp_count(&self, count: u32) -> u32 {
        count.clamp(self.min_count, self.max_count.max(self.min_count))
    }
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut parts = key.split('.').peekable();
        if parts.peek().is_none() || key.is_empty() {
            return Err(unknown());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            if parts.peek().is_some() {
                current = current.get_mut(part).ok_or_else(unknown)?;
                continue;
            }

            let obj = current.as_object_mut().ok_or_else(unknown)?;
            let existing = obj.get(part).ok_or_else(unknown)?;

            let new_value = match existing {
                serde_json::Value::Bool(_) => serde_json::Value::Bool(
                    value
                        .parse::<bool>()
                        .map_err(|e| invalid(e.to_string()))?,
                ),
                serde_json::Value::Number(_) => {
                    let n = value
                        .parse::<u64>()
                        .map_err(|_| invalid(format!("cannot parse '{value}' as number")))?;
                    serde_json::Value::Number(n.into())
                }
                serde_json::Value::Array(_) => serde_json::Value::Array(
                    value
                        .split(',')
                        .map(str::trim)
                        .filter(|s| !s.is_empty())
                        .map(|s| serde_json::Value::String(s.to_string()))
                        .collect(),
                ),
                _ => serde_json::Value::String(value.into()),
            };

            obj.insert(part.to_string(), new_value);
            return Ok(());
        }

        Err(unknown())
    }

    fn path() -> Result<PathBuf> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from disk, writing the defaults if no file exists yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self> {
        let path = Self::path()?;
        match std::fs::read_to_string(&path) {
            Ok(content) => toml::from_str(&content).map_err(|e| {
                ConfigError::LoadFailed {
                    path,
                    message: e.to_string(),
                }
                .into()
            }),
            Err(_) => {
                let cfg = Self::default();
                cfg.save()?;
                Ok(cfg)
            }
        }
    }

    /// Persist to disk.
    pub fn save(&self) -> Result<()> {
        let path = Self::path()?;
        let content = toml::to_string_pretty(self).map_err(|e| ConfigError::SaveFailed {
            path: path.clone(),
            message: e.to_string(),
        })?;
        std::fs::write(&path, content)?;
        Ok(())
    }

    /// Load from disk, returning default on error.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "falling back to default configuration");
            Self::default()
        })
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by dot-separated key. The caller decides whether
    /// to [`save`](Self::save) the result.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let mut json = serde_json::to_value(&*self)?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        *self = serde_json::from_value(json)?;
        Ok(())
    }
}
