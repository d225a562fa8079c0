//! The config module provides the configuration spec and parsing logic.
//!
//! Every key is optional. A missing config file at the default location simply yields the
//! defaults, while unrecognized keys are logged and ignored so that typos are visible.

use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::{DubplateExpectedError, Result};

pub const CONFIG_PATH_ENV: &str = "DUBPLATE_CONFIG_PATH";

const DEFAULT_DATABASE_FILENAME: &str = "dubplates.db";
const DEFAULT_EXPORT_PATH: &str = "export.txt";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogOutput {
    File,
    Stderr,
    Off,
}

impl LogOutput {
    fn parse(value: &str) -> Option<Self> {
        match value {
            "file" => Some(LogOutput::File),
            "stderr" => Some(LogOutput::Stderr),
            "off" => Some(LogOutput::Off),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_path: PathBuf,
    pub export_path: PathBuf,
    pub log_output: LogOutput,
    pub log_dir: PathBuf,
    /// Keys present in the file that we do not understand. Reported once logging is up.
    pub unrecognized_keys: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RawConfig {
    database_path: Option<String>,
    export_path: Option<String>,
    log_output: Option<String>,
    log_dir: Option<String>,
    #[serde(flatten)]
    unknown: BTreeMap<String, toml::Value>,
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", "dubplate-collector")
}

fn expand_path(value: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(value).into_owned())
}

/// `$DUBPLATE_CONFIG_PATH` if set, otherwise `config.toml` in the platform config directory.
pub fn default_config_path() -> Option<PathBuf> {
    if let Some(p) = env::var_os(CONFIG_PATH_ENV) {
        return Some(PathBuf::from(p));
    }
    project_dirs().map(|d| d.config_dir().join("config.toml"))
}

impl Default for Config {
    fn default() -> Self {
        let dirs = project_dirs();
        let database_path = dirs
            .as_ref()
            .map(|d| d.data_dir().join(DEFAULT_DATABASE_FILENAME))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATABASE_FILENAME));
        let log_dir = dirs
            .as_ref()
            .map(|d| d.state_dir().unwrap_or(d.cache_dir()).to_path_buf())
            .unwrap_or_else(|| PathBuf::from("."));
        Config {
            database_path,
            export_path: PathBuf::from(DEFAULT_EXPORT_PATH),
            log_output: LogOutput::File,
            log_dir,
            unrecognized_keys: Vec::new(),
        }
    }
}

impl Config {
    pub fn warn_unrecognized_keys(&self) {
        for key in &self.unrecognized_keys {
            warn!("Unrecognized option in configuration file: {}", key);
        }
    }

    /// Parse the configuration. An explicitly passed path must exist; the default path may be
    /// absent, in which case defaults are used.
    pub fn parse(config_path_override: Option<&Path>) -> Result<Config> {
        let (cfgpath, required) = match config_path_override {
            Some(p) => (Some(p.to_path_buf()), true),
            None => (default_config_path(), env::var_os(CONFIG_PATH_ENV).is_some()),
        };

        let Some(cfgpath) = cfgpath else {
            debug!("no configuration directory available, using defaults");
            return Ok(Config::default());
        };

        if !cfgpath.exists() {
            if required {
                return Err(DubplateExpectedError::ConfigNotFound { path: cfgpath }.into());
            }
            debug!("no configuration file at {}, using defaults", cfgpath.display());
            return Ok(Config::default());
        }

        let contents = fs::read_to_string(&cfgpath)?;
        Self::from_toml(&cfgpath, &contents)
    }

    /// Parse configuration text. `cfgpath` is only used in error messages.
    pub fn from_toml(cfgpath: &Path, contents: &str) -> Result<Config> {
        let raw: RawConfig = toml::from_str(contents).map_err(|e| DubplateExpectedError::ConfigDecode {
            path: cfgpath.to_path_buf(),
            message: e.message().to_string(),
        })?;

        let mut config = Config::default();
        config.unrecognized_keys = raw.unknown.into_keys().collect();
        if let Some(p) = raw.database_path {
            config.database_path = expand_path(&p);
        }
        if let Some(p) = raw.export_path {
            config.export_path = expand_path(&p);
        }
        if let Some(p) = raw.log_dir {
            config.log_dir = expand_path(&p);
        }
        if let Some(v) = raw.log_output {
            config.log_output = LogOutput::parse(&v).ok_or_else(|| DubplateExpectedError::InvalidConfigValue {
                key: "log_output".to_string(),
                message: format!("must be one of \"file\", \"stderr\", \"off\": got {v:?}"),
            })?;
        }
        Ok(config)
    }
}
