use serde::Deserialize;
use std::path::Path;
use tracing::{debug, warn};

pub const CONFIG_FILE: &str = "mappath.toml";

/// Directory names that are never descended into, on top of dot-directories.
pub const ALWAYS_EXCLUDED: &[&str] = &["node_modules", ".git", "dist", "out", "build"];

/// Optional `mappath.toml` at the project root.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScanConfig {
    /// Extra directory names to skip entirely.
    pub exclude: Vec<String>,
    /// Extra ignore patterns, same syntax as `.gitignore` lines.
    pub ignore: Vec<String>,
}

impl ScanConfig {
    /// Returns the default configuration if the file is missing, unreadable or malformed.
    pub fn load(root: &Path) -> Self {
        let config_path = root.join(CONFIG_FILE);

        if !config_path.exists() {
            return Self::default();
        }

        match std::fs::read_to_string(&config_path) {
            Ok(contents) => match toml::from_str::<Self>(&contents) {
                Ok(config) => {
                    debug!("Loaded {}: {config:?}", config_path.display());
                    config
                }
                Err(err) => {
                    warn!("Failed to parse {}: {err}. Using defaults.", config_path.display());
                    Self::default()
                }
            },
            Err(err) => {
                warn!("Failed to read {}: {err}. Using defaults.", config_path.display());
                Self::default()
            }
        }
    }

    /// Adds CLI `--exclude` values, skipping ones already present.
    pub fn with_excludes<I>(mut self, extra: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        for name in extra {
            if !self.exclude.contains(&name) {
                self.exclude.push(name);
            }
        }
        self
    }

    /// Built-in excluded directory names followed by the configured ones.
    pub fn excluded_dirs(&self) -> Vec<String> {
        let mut dirs: Vec<String> = ALWAYS_EXCLUDED.iter().map(|d| d.to_string()).collect();
        for name in &self.exclude {
            if !dirs.contains(name) {
                dirs.push(name.clone());
            }
        }
        dirs
    }
}
