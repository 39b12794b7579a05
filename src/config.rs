//! Configuration loading and management
//!
//! Handles parsing of the optional `ted` TOML configuration file, given with
//! `--config` or `$TED_CONFIG`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::query::{Filter, Order};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Listing defaults
    #[serde(default)]
    pub list: ListConfig,

    /// Defaults for new tasks
    #[serde(default)]
    pub tasks: TasksConfig,
}

/// Listing defaults; also what the shell's reset commands restore
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListConfig {
    /// Default filter expression (`& tags`, `| tags`, `/ regex`)
    #[serde(default)]
    pub filter: String,

    /// Default order expression
    #[serde(default = "default_order")]
    pub order: String,

    /// Default number of tasks listed
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_order() -> String {
    "-pri".to_string()
}

fn default_limit() -> usize {
    10
}

impl Default for ListConfig {
    fn default() -> Self {
        Self {
            filter: String::new(),
            order: default_order(),
            limit: default_limit(),
        }
    }
}

impl ListConfig {
    pub fn parsed_filter(&self) -> Result<Filter> {
        self.filter
            .parse()
            .map_err(|err| Error::InvalidConfig(format!("list.filter: {err}")))
    }

    pub fn parsed_order(&self) -> Result<Order> {
        self.order
            .parse()
            .map_err(|err| Error::InvalidConfig(format!("list.order: {err}")))
    }
}

/// Defaults for tasks created without an editor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TasksConfig {
    /// Priority of new tasks
    #[serde(default = "default_priority")]
    pub priority: String,

    /// Description of new tasks
    #[serde(default = "default_description")]
    pub description: String,

    /// Title placeholder in the editor template
    #[serde(default = "default_title")]
    pub title: String,
}

fn default_priority() -> String {
    "5".to_string()
}

fn default_description() -> String {
    "No description".to_string()
}

fn default_title() -> String {
    "No title".to_string()
}

impl Default for TasksConfig {
    fn default() -> Self {
        Self {
            priority: default_priority(),
            description: default_description(),
            title: default_title(),
        }
    }
}

impl TasksConfig {
    fn validate(&self) -> Result<()> {
        let pri = self.priority.trim();
        if pri.is_empty() || pri.contains(char::is_whitespace) {
            return Err(Error::InvalidConfig(
                "tasks.priority must be a single non-empty token".to_string(),
            ));
        }
        Ok(())
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from `path` if given, or return defaults
    pub fn load_or_default(path: Option<&PathBuf>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    fn validate(&self) -> Result<()> {
        self.list.parsed_filter()?;
        self.list.parsed_order()?;
        self.tasks.validate()?;
        Ok(())
    }
}
