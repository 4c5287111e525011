//! Configuration management for lineage queries
//!
//! Supports loading configuration from:
//! - Default values
//! - Config file (lineage.toml)
//! - Environment variables (LINEAGE__*)
//!
//! ## Example config file (lineage.toml):
//! ```toml
//! [query]
//! include_processes = false
//! condensed_display_name = "Condensed"
//!
//! [graph]
//! snapshot_dir = "./snapshots"
//! skip_prefixes = ["archive/"]
//!
//! [logging]
//! level = "lineage_graph=debug,info"
//! ```

use config_crate::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::graph::LoadConfig;

/// Main configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LineageConfig {
    /// Query defaults
    #[serde(default)]
    pub query: QueryConfig,

    /// Where the in-memory graph is loaded from
    #[serde(default)]
    pub graph: GraphConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Query defaults
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryConfig {
    /// Keep `Process` vertices in results unless the caller says otherwise
    #[serde(default = "default_true")]
    pub include_processes: bool,

    /// Display name given to condensed source/destination nodes
    #[serde(default = "default_condensed_display_name")]
    pub condensed_display_name: String,
}

/// Snapshot location for [`crate::graph::MemoryGraph`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphConfig {
    #[serde(default)]
    pub snapshot_dir: Option<PathBuf>,

    /// Snapshot paths to skip, relative to `snapshot_dir`
    #[serde(default = "default_skip_prefixes")]
    pub skip_prefixes: Vec<String>,

    /// Reject snapshots with edges to unknown vertices
    #[serde(default)]
    pub strict_edges: bool,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// `EnvFilter` directive, e.g. `info` or `lineage_graph=debug`
    #[serde(default = "default_log_level")]
    pub level: String,
}

// Default value functions
fn default_true() -> bool {
    true
}

fn default_condensed_display_name() -> String {
    "Condensed".to_string()
}

fn default_skip_prefixes() -> Vec<String> {
    LoadConfig::default().skip_prefixes
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            include_processes: true,
            condensed_display_name: default_condensed_display_name(),
        }
    }
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            snapshot_dir: None,
            skip_prefixes: default_skip_prefixes(),
            strict_edges: false,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: default_log_level() }
    }
}

impl LineageConfig {
    /// Load configuration from default locations
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(None)
    }

    /// Load configuration, adding an explicit file on top of the defaults
    pub fn load_from(config_path: Option<&str>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();

        for location in ["lineage.toml", ".lineage.toml", "config/lineage.toml"] {
            builder = builder.add_source(File::with_name(location).required(false));
        }

        if let Some(config_dir) = directories::ProjectDirs::from("dev", "familiar", "lineage") {
            let xdg_config = config_dir.config_dir().join("lineage.toml");
            if xdg_config.exists() {
                builder = builder.add_source(File::from(xdg_config).required(false));
            }
        }

        if let Some(path) = config_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        // LINEAGE__QUERY__INCLUDE_PROCESSES=false
        builder = builder.add_source(
            Environment::with_prefix("LINEAGE")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        builder.build()?.try_deserialize()
    }

    /// Save configuration to a file
    pub fn save(&self, path: &str) -> std::io::Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        std::fs::write(path, content)
    }

    /// Snapshot directory, resolved against the working directory
    pub fn snapshot_dir(&self) -> Option<PathBuf> {
        self.graph.snapshot_dir.as_ref().map(|p| {
            if p.is_absolute() {
                p.clone()
            } else {
                std::env::current_dir().unwrap_or_default().join(p)
            }
        })
    }

    /// Loader settings derived from the `[graph]` section
    pub fn load_config(&self) -> LoadConfig {
        LoadConfig {
            skip_prefixes: self.graph.skip_prefixes.clone(),
            strict_edges: self.graph.strict_edges,
            ..LoadConfig::default()
        }
    }
}
