use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::warn;

use crate::export::OutputFormat;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// `tracing` filter directive, overridden by `RUST_LOG`
    #[serde(default)]
    pub log_filter: Option<String>,

    #[serde(default = "default_true")]
    pub include_system_specs: bool,

    /// Files or directories holding specification JSON
    #[serde(default)]
    pub spec_paths: Vec<String>,

    #[serde(default)]
    pub output: OutputFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_filter: None,
            include_system_specs: true,
            spec_paths: Vec::new(),
            output: OutputFormat::default(),
        }
    }
}

impl Config {
    /// Configured spec paths with `~` expanded
    pub fn spec_roots(&self) -> Vec<PathBuf> {
        self.spec_paths
            .iter()
            .map(|path| path.trim())
            .filter(|path| !path.is_empty())
            .map(expand_home)
            .collect()
    }
}

fn default_true() -> bool {
    true
}

pub fn load() -> Config {
    let Some(path) = config_path() else {
        return Config::default();
    };
    load_from(&path)
}

/// Read a config file; a missing or broken file gives the defaults
pub fn load_from(path: &Path) -> Config {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(_) => return Config::default(),
    };
    match toml::from_str::<Config>(&content) {
        Ok(config) => config,
        Err(err) => {
            warn!(path = %path.display(), "ignoring malformed config: {err}");
            Config::default()
        }
    }
}

pub fn config_path() -> Option<PathBuf> {
    if let Some(path) = std::env::var_os("SPECDEC_CONFIG").map(PathBuf::from) {
        return Some(path);
    }
    if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME").map(PathBuf::from) {
        return Some(xdg.join("specdec").join("config.toml"));
    }
    if let Some(home) = std::env::var_os("HOME").map(PathBuf::from) {
        return Some(home.join(".config").join("specdec").join("config.toml"));
    }

    directories::ProjectDirs::from("io", "specdec", "specdec")
        .map(|dirs| dirs.config_dir().join("config.toml"))
}

fn expand_home(path: &str) -> PathBuf {
    match path.strip_prefix("~/") {
        Some(rest) => std::env::var_os("HOME")
            .map(|home| PathBuf::from(home).join(rest))
            .unwrap_or_else(|| PathBuf::from(path)),
        None => PathBuf::from(path),
    }
}
